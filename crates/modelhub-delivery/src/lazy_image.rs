//! Viewport-gated image with a skeleton placeholder

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::viewport::{IntersectionObserver, Observation, Rect};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LazyImageConfig {
    /// Fraction of the image box that must be visible before loading starts
    pub threshold: f32,
    /// Placeholder-to-image cross-fade in seconds
    pub fade_duration: f32,
}

impl Default for LazyImageConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            fade_duration: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageState {
    /// Not yet visible; only the pulsing placeholder is drawn
    Placeholder,
    /// Source attached, waiting for the load event
    Loading,
    /// Loaded, cross-fading from placeholder (0.0) to image (1.0)
    FadingIn { progress: f32 },
    Shown,
    /// The image failed to load; the placeholder stays, without pulsing
    Failed,
}

/// An image whose real source is attached only after it first scrolls into view.
pub struct LazyImage {
    src: String,
    bounds: Rect,
    state: ImageState,
    fade_duration: f32,
    observation: Option<Observation>,
}

impl LazyImage {
    /// Mount the image and start observing its box.
    pub fn mount(
        src: impl Into<String>,
        bounds: Rect,
        observer: &IntersectionObserver,
        config: &LazyImageConfig,
    ) -> Self {
        let mut image = Self {
            src: src.into(),
            bounds,
            state: ImageState::Placeholder,
            fade_duration: config.fade_duration,
            observation: Some(observer.observe(bounds, config.threshold)),
        };
        image.poll_visibility();
        image
    }

    /// Attach the source if the image has become visible. Returns `true` the
    /// one time the source gets attached.
    pub fn poll_visibility(&mut self) -> bool {
        let intersected = self
            .observation
            .as_ref()
            .is_some_and(|obs| obs.has_intersected());

        if intersected && self.state == ImageState::Placeholder {
            self.observation = None;
            self.state = ImageState::Loading;
            debug!("Attaching image source {}", self.src);
            return true;
        }
        false
    }

    /// Source to render, or `None` while only the placeholder is shown.
    pub fn src(&self) -> Option<&str> {
        match self.state {
            ImageState::Placeholder => None,
            _ => Some(&self.src),
        }
    }

    pub fn state(&self) -> ImageState {
        self.state
    }

    /// The image's load event fired.
    pub fn on_load(&mut self) {
        if self.state == ImageState::Loading {
            self.state = if self.fade_duration > 0.0 {
                ImageState::FadingIn { progress: 0.0 }
            } else {
                ImageState::Shown
            };
        }
    }

    /// The image's error event fired.
    pub fn on_error(&mut self) {
        if self.state == ImageState::Loading {
            self.state = ImageState::Failed;
        }
    }

    /// Advance the cross-fade
    pub fn update(&mut self, delta: f32) {
        if let ImageState::FadingIn { progress } = self.state {
            let next = progress + delta / self.fade_duration;
            self.state = if next >= 1.0 {
                ImageState::Shown
            } else {
                ImageState::FadingIn { progress: next }
            };
        }
    }

    /// Opacity of the real image
    pub fn image_opacity(&self) -> f32 {
        match self.state {
            ImageState::FadingIn { progress } => progress,
            ImageState::Shown => 1.0,
            _ => 0.0,
        }
    }

    /// Opacity of the placeholder block
    pub fn placeholder_opacity(&self) -> f32 {
        match self.state {
            ImageState::Failed => 1.0,
            _ => 1.0 - self.image_opacity(),
        }
    }

    /// Whether the placeholder should animate its pulse
    pub fn placeholder_pulsing(&self) -> bool {
        matches!(self.state, ImageState::Placeholder | ImageState::Loading)
    }

    /// Box occupied by both placeholder and image, so nothing shifts on load.
    pub fn layout_box(&self) -> Rect {
        self.bounds
    }

    /// Whether the image is still registered with the observer
    pub fn is_observing(&self) -> bool {
        self.observation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);
    const BELOW_FOLD: Rect = Rect::new(0.0, 1200.0, 300.0, 200.0);

    #[test]
    fn test_src_attached_after_intersection() {
        let observer = IntersectionObserver::new(SCREEN);
        let mut image = LazyImage::mount("thumb.webp", BELOW_FOLD, &observer, &LazyImageConfig::default());
        assert_eq!(image.src(), None);
        assert_eq!(image.layout_box(), BELOW_FOLD);
        assert!(!image.poll_visibility());

        observer.set_viewport(Rect::new(0.0, 600.0, 1000.0, 800.0));
        assert!(image.poll_visibility());
        assert_eq!(image.src(), Some("thumb.webp"));
        assert!(!image.is_observing());
        assert_eq!(observer.active_targets(), 0);

        // One-shot.
        assert!(!image.poll_visibility());
    }

    #[test]
    fn test_already_visible_loads_immediately() {
        let observer = IntersectionObserver::new(SCREEN);
        let image = LazyImage::mount(
            "hero.webp",
            Rect::new(0.0, 0.0, 300.0, 200.0),
            &observer,
            &LazyImageConfig::default(),
        );
        assert_eq!(image.state(), ImageState::Loading);
    }

    #[test]
    fn test_cross_fade_after_load() {
        let observer = IntersectionObserver::new(SCREEN);
        let mut image = LazyImage::mount(
            "a.webp",
            Rect::new(0.0, 0.0, 100.0, 100.0),
            &observer,
            &LazyImageConfig::default(),
        );
        assert_eq!(image.image_opacity(), 0.0);
        assert!(image.placeholder_pulsing());

        image.on_load();
        image.update(0.15);
        assert!((image.image_opacity() - 0.5).abs() < 1e-4);
        assert!((image.placeholder_opacity() - 0.5).abs() < 1e-4);

        image.update(0.2);
        assert_eq!(image.state(), ImageState::Shown);
        assert_eq!(image.placeholder_opacity(), 0.0);
    }

    #[test]
    fn test_load_before_visible_is_ignored() {
        let observer = IntersectionObserver::new(SCREEN);
        let mut image = LazyImage::mount("a.webp", BELOW_FOLD, &observer, &LazyImageConfig::default());
        image.on_load();
        assert_eq!(image.state(), ImageState::Placeholder);
    }

    #[test]
    fn test_unmount_before_intersection_releases_observer() {
        let observer = IntersectionObserver::new(SCREEN);
        let images: Vec<_> = (0..5)
            .map(|i| {
                let bounds = Rect::new(0.0, 2000.0 + i as f32 * 250.0, 300.0, 200.0);
                LazyImage::mount(format!("{}.webp", i), bounds, &observer, &LazyImageConfig::default())
            })
            .collect();
        assert_eq!(observer.active_targets(), 5);
        drop(images);
        assert_eq!(observer.active_targets(), 0);
    }

    #[test]
    fn test_error_keeps_placeholder() {
        let observer = IntersectionObserver::new(SCREEN);
        let mut image = LazyImage::mount(
            "missing.webp",
            Rect::new(0.0, 0.0, 100.0, 100.0),
            &observer,
            &LazyImageConfig::default(),
        );
        image.on_error();
        assert_eq!(image.state(), ImageState::Failed);
        assert_eq!(image.placeholder_opacity(), 1.0);
        assert!(!image.placeholder_pulsing());
    }
}
