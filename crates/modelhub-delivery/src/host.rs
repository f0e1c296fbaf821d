//! Host device detection and fullscreen layout rules

use serde::{Deserialize, Serialize};

/// What we know about the browser the viewer runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostEnvironment {
    pub is_ios: bool,
}

impl HostEnvironment {
    /// Detect the host from a user-agent string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let is_ios = ["iPhone", "iPad", "iPod"].iter().any(|d| user_agent.contains(d));
        Self { is_ios }
    }

    /// Like [`HostEnvironment::from_user_agent`], also treating iPadOS (which
    /// reports a desktop Mac user agent) as iOS when the device has a touch screen.
    pub fn from_user_agent_and_touch(user_agent: &str, max_touch_points: u32) -> Self {
        let mut host = Self::from_user_agent(user_agent);
        if user_agent.contains("Macintosh") && max_touch_points > 1 {
            host.is_ios = true;
        }
        host
    }

    /// iOS Safari has no element Fullscreen API, so the viewer fakes it.
    pub fn uses_custom_fullscreen(&self) -> bool {
        self.is_ios
    }
}

/// Current fullscreen flags of a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FullscreenState {
    /// The viewer fills the page through its own styling
    pub custom: bool,
    /// The browser Fullscreen API is active
    pub native: bool,
}

/// How the loading overlay's container is sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayLayout {
    /// Cover the full viewport height
    FullViewport,
    /// Normal box constrained by the viewer's aspect ratio
    AspectBox { aspect_ratio: f32 },
}

impl OverlayLayout {
    pub fn resolve(host: &HostEnvironment, fullscreen: FullscreenState, aspect_ratio: f32) -> Self {
        if (host.uses_custom_fullscreen() && fullscreen.custom) || fullscreen.native {
            OverlayLayout::FullViewport
        } else {
            OverlayLayout::AspectBox { aspect_ratio }
        }
    }

    /// CSS declarations for the container
    pub fn css(&self) -> String {
        match self {
            // dvh follows Safari's collapsing toolbars.
            OverlayLayout::FullViewport => "position: fixed; inset: 0; width: 100vw; height: 100dvh;".to_string(),
            OverlayLayout::AspectBox { aspect_ratio } => {
                format!("position: relative; width: 100%; aspect-ratio: {};", aspect_ratio)
            }
        }
    }
}
