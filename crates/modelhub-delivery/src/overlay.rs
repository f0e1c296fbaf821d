//! Viewer loading overlay

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Seconds to show only the spinner before switching to a progress bar
    pub grace_delay: f32,
    /// Seconds the overlay takes to fade out once hidden
    pub fade_duration: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            grace_delay: 0.3,
            fade_duration: 0.3,
        }
    }
}

/// What the overlay is drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayContent {
    Spinner,
    Progress { fraction: f32 },
    /// Loading failed; shows a retry button
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayView {
    Hidden,
    Shown(OverlayContent),
    FadingOut { content: OverlayContent, opacity: f32 },
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Hidden,
    Visible { elapsed: f32, bar_unlocked: bool },
    FadingOut { remaining: f32, content: OverlayContent },
    Failed,
}

/// Loading overlay for a model viewer.
///
/// Shows a spinner as soon as it becomes visible and switches to a progress
/// bar only if the download is still running after the grace delay, so
/// cached models never flash a bar.
pub struct LoadingOverlay {
    config: OverlayConfig,
    stage: Stage,
    visible: bool,
    downloading: bool,
    /// Highest fraction reported in this visible period
    fraction: f32,
}

impl LoadingOverlay {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            stage: Stage::Hidden,
            visible: false,
            downloading: false,
            fraction: 0.0,
        }
    }

    /// Feed the latest inputs.
    pub fn set_state(&mut self, visible: bool, downloading: bool, fraction: f32) {
        if matches!(self.stage, Stage::Failed) {
            return;
        }

        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };

        if visible && !self.visible {
            self.stage = Stage::Visible {
                elapsed: 0.0,
                bar_unlocked: false,
            };
            self.fraction = fraction;
        } else if !visible && self.visible {
            let content = self.content();
            debug!("Loading overlay fading out");
            self.stage = if self.config.fade_duration > 0.0 {
                Stage::FadingOut {
                    remaining: self.config.fade_duration,
                    content,
                }
            } else {
                Stage::Hidden
            };
        }

        self.visible = visible;
        self.downloading = downloading;
        if visible && downloading {
            self.fraction = self.fraction.max(fraction);
        }
        self.unlock_bar();
    }

    /// Loading failed; stay on screen with a retry control until `retry`.
    pub fn set_failed(&mut self) {
        self.stage = Stage::Failed;
        self.visible = true;
        self.downloading = false;
    }

    /// The user pressed retry. Returns `false` if nothing had failed.
    pub fn retry(&mut self) -> bool {
        if !matches!(self.stage, Stage::Failed) {
            return false;
        }
        self.stage = Stage::Hidden;
        self.visible = false;
        self.fraction = 0.0;
        true
    }

    /// Advance timers
    pub fn update(&mut self, delta: f32) {
        match &mut self.stage {
            Stage::Visible { elapsed, .. } => *elapsed += delta,
            Stage::FadingOut { remaining, .. } => {
                *remaining -= delta;
                if *remaining <= 0.0 {
                    self.stage = Stage::Hidden;
                }
            }
            Stage::Hidden | Stage::Failed => {}
        }
        self.unlock_bar();
    }

    fn unlock_bar(&mut self) {
        let grace = self.config.grace_delay;
        let downloading = self.downloading;
        if let Stage::Visible { elapsed, bar_unlocked } = &mut self.stage {
            if !*bar_unlocked && downloading && *elapsed >= grace {
                *bar_unlocked = true;
            }
        }
    }

    fn content(&self) -> OverlayContent {
        match self.stage {
            Stage::Visible { bar_unlocked: true, .. } if self.downloading => OverlayContent::Progress {
                fraction: self.fraction,
            },
            Stage::FadingOut { content, .. } => content,
            Stage::Failed => OverlayContent::Failed,
            _ => OverlayContent::Spinner,
        }
    }

    pub fn view(&self) -> OverlayView {
        match self.stage {
            Stage::Hidden => OverlayView::Hidden,
            Stage::FadingOut { remaining, content } => OverlayView::FadingOut {
                content,
                opacity: (remaining / self.config.fade_duration).clamp(0.0, 1.0),
            },
            _ => OverlayView::Shown(self.content()),
        }
    }

    /// Whether the overlay is mounted at all
    pub fn is_mounted(&self) -> bool {
        !matches!(self.stage, Stage::Hidden)
    }
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(overlay: &mut LoadingOverlay, delta: f32, views: &mut Vec<OverlayView>) {
        overlay.update(delta);
        views.push(overlay.view());
    }

    #[test]
    fn test_hidden_when_invisible() {
        let mut overlay = LoadingOverlay::default();
        overlay.set_state(false, true, 0.5);
        assert_eq!(overlay.view(), OverlayView::Hidden);
        assert!(!overlay.is_mounted());
    }

    #[test]
    fn test_fast_download_never_shows_bar() {
        let mut overlay = LoadingOverlay::default();
        let mut views = Vec::new();

        overlay.set_state(true, true, 0.0);
        views.push(overlay.view());
        step(&mut overlay, 0.1, &mut views);
        overlay.set_state(true, true, 0.9);
        step(&mut overlay, 0.1, &mut views);
        overlay.set_state(true, false, 1.0);
        step(&mut overlay, 0.2, &mut views);
        step(&mut overlay, 0.5, &mut views);

        assert_eq!(views[0], OverlayView::Shown(OverlayContent::Spinner));
        assert!(views
            .iter()
            .all(|v| !matches!(v, OverlayView::Shown(OverlayContent::Progress { .. }))));
    }

    #[test]
    fn test_slow_download_shows_monotonic_bar() {
        let mut overlay = LoadingOverlay::default();
        overlay.set_state(true, true, 0.05);
        overlay.update(0.2);
        assert_eq!(overlay.view(), OverlayView::Shown(OverlayContent::Spinner));

        overlay.update(0.15);
        assert_eq!(
            overlay.view(),
            OverlayView::Shown(OverlayContent::Progress { fraction: 0.05 })
        );

        let mut last = 0.0;
        for reported in [0.2, 0.4, 0.3, 0.8, 1.2] {
            overlay.set_state(true, true, reported);
            overlay.update(0.05);
            match overlay.view() {
                OverlayView::Shown(OverlayContent::Progress { fraction }) => {
                    assert!(fraction >= last);
                    assert!(fraction <= 1.0);
                    last = fraction;
                }
                other => panic!("expected progress bar, got {:?}", other),
            }
        }
        assert_eq!(last, 1.0);

        // Download done, viewer initializing.
        overlay.set_state(true, false, 1.0);
        assert_eq!(overlay.view(), OverlayView::Shown(OverlayContent::Spinner));
    }

    #[test]
    fn test_fades_out_before_unmount() {
        let mut overlay = LoadingOverlay::default();
        overlay.set_state(true, false, 0.0);
        overlay.update(0.1);
        overlay.set_state(false, false, 0.0);

        match overlay.view() {
            OverlayView::FadingOut { content, opacity } => {
                assert_eq!(content, OverlayContent::Spinner);
                assert!((opacity - 1.0).abs() < 1e-6);
            }
            other => panic!("expected fade out, got {:?}", other),
        }

        overlay.update(0.15);
        match overlay.view() {
            OverlayView::FadingOut { opacity, .. } => assert!((opacity - 0.5).abs() < 1e-4),
            other => panic!("expected fade out, got {:?}", other),
        }

        overlay.update(0.2);
        assert_eq!(overlay.view(), OverlayView::Hidden);
        assert!(!overlay.is_mounted());
    }

    #[test]
    fn test_reshown_during_fade_restarts() {
        let mut overlay = LoadingOverlay::default();
        overlay.set_state(true, true, 0.7);
        overlay.update(0.5);
        overlay.set_state(false, false, 1.0);
        overlay.update(0.1);

        overlay.set_state(true, true, 0.1);
        assert_eq!(overlay.view(), OverlayView::Shown(OverlayContent::Spinner));
        overlay.update(0.3);
        assert_eq!(
            overlay.view(),
            OverlayView::Shown(OverlayContent::Progress { fraction: 0.1 })
        );
    }

    #[test]
    fn test_failure_is_terminal_until_retry() {
        let mut overlay = LoadingOverlay::default();
        overlay.set_state(true, true, 0.4);
        overlay.set_failed();
        overlay.set_state(false, false, 0.0);
        overlay.update(5.0);
        assert_eq!(overlay.view(), OverlayView::Shown(OverlayContent::Failed));

        assert!(overlay.retry());
        assert!(!overlay.retry());
        assert_eq!(overlay.view(), OverlayView::Hidden);
    }
}
