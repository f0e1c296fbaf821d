//! Multi-stage progress of a model viewer

use tracing::{debug, warn};

use crate::overlay::LoadingOverlay;

/// Loading phases of a model viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    /// Fetching the model bytes
    Downloading,
    /// Bytes received, viewer parsing and uploading the scene
    Initializing,
    Ready,
    Error,
}

impl LoadPhase {
    /// Get a human-readable description of this phase
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Waiting...",
            Self::Downloading => "Downloading model...",
            Self::Initializing => "Preparing viewer...",
            Self::Ready => "Ready",
            Self::Error => "Failed to load model",
        }
    }

    /// Whether the loading overlay should be on screen
    pub fn shows_overlay(&self) -> bool {
        matches!(self, Self::Downloading | Self::Initializing)
    }
}

/// Snapshot of a viewer's loading progress.
///
/// `download_fraction` is only meaningful while downloading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerLoadProgress {
    pub phase: LoadPhase,
    pub download_fraction: f32,
}

impl Default for ViewerLoadProgress {
    fn default() -> Self {
        Self {
            phase: LoadPhase::Idle,
            download_fraction: 0.0,
        }
    }
}

/// Tracks progress transitions for one viewer and rejects out-of-order events.
#[derive(Debug, Default)]
pub struct ViewerProgress {
    current: ViewerLoadProgress,
    error: Option<String>,
}

impl ViewerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> ViewerLoadProgress {
        self.current
    }

    pub fn phase(&self) -> LoadPhase {
        self.current.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn start_download(&mut self) -> bool {
        self.transition(LoadPhase::Idle, LoadPhase::Downloading)
    }

    /// Report downloaded bytes. Unknown totals leave the fraction unchanged.
    pub fn report_download(&mut self, loaded: u64, total: Option<u64>) {
        if self.current.phase != LoadPhase::Downloading {
            return;
        }
        if let Some(total) = total.filter(|&t| t > 0) {
            let fraction = (loaded as f64 / total as f64).clamp(0.0, 1.0) as f32;
            self.current.download_fraction = self.current.download_fraction.max(fraction);
        }
    }

    pub fn finish_download(&mut self) -> bool {
        let moved = self.transition(LoadPhase::Downloading, LoadPhase::Initializing);
        if moved {
            self.current.download_fraction = 1.0;
        }
        moved
    }

    pub fn mark_ready(&mut self) -> bool {
        self.transition(LoadPhase::Initializing, LoadPhase::Ready)
    }

    /// Any phase can fail.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Viewer failed during {:?}: {}", self.current.phase, reason);
        self.current.phase = LoadPhase::Error;
        self.error = Some(reason);
    }

    /// Manual retry after an error. Returns `false` if not in the error phase.
    pub fn retry(&mut self) -> bool {
        if self.current.phase != LoadPhase::Error {
            return false;
        }
        self.current = ViewerLoadProgress::default();
        self.error = None;
        true
    }

    /// Inputs for the loading overlay: `(visible, downloading, fraction)`
    pub fn overlay_inputs(&self) -> (bool, bool, f32) {
        (
            self.current.phase.shows_overlay(),
            self.current.phase == LoadPhase::Downloading,
            self.current.download_fraction,
        )
    }

    /// Push the current state into an overlay.
    pub fn apply_to(&self, overlay: &mut LoadingOverlay) {
        if self.current.phase == LoadPhase::Error {
            overlay.set_failed();
        } else {
            let (visible, downloading, fraction) = self.overlay_inputs();
            overlay.set_state(visible, downloading, fraction);
        }
    }

    fn transition(&mut self, from: LoadPhase, to: LoadPhase) -> bool {
        if self.current.phase != from {
            debug!("Ignoring {:?} -> {:?} while {:?}", from, to, self.current.phase);
            return false;
        }
        self.current.phase = to;
        if to == LoadPhase::Downloading {
            self.current.download_fraction = 0.0;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{OverlayContent, OverlayView};

    #[test]
    fn test_happy_path() {
        let mut progress = ViewerProgress::new();
        assert!(progress.start_download());
        progress.report_download(50, Some(200));
        assert_eq!(progress.progress().download_fraction, 0.25);
        progress.report_download(10, Some(200));
        assert_eq!(progress.progress().download_fraction, 0.25);
        progress.report_download(10, None);
        assert_eq!(progress.progress().download_fraction, 0.25);

        assert!(progress.finish_download());
        assert_eq!(progress.overlay_inputs(), (true, false, 1.0));
        assert!(progress.mark_ready());
        assert_eq!(progress.overlay_inputs().0, false);
    }

    #[test]
    fn test_out_of_order_events_ignored() {
        let mut progress = ViewerProgress::new();
        assert!(!progress.mark_ready());
        assert!(!progress.finish_download());
        assert_eq!(progress.phase(), LoadPhase::Idle);
        assert!(!progress.retry());
    }

    #[test]
    fn test_error_needs_manual_retry() {
        let mut progress = ViewerProgress::new();
        let mut overlay = LoadingOverlay::default();
        progress.start_download();
        progress.apply_to(&mut overlay);

        progress.fail("network error");
        progress.apply_to(&mut overlay);
        assert_eq!(progress.error(), Some("network error"));
        assert!(!progress.start_download());
        overlay.update(10.0);
        assert_eq!(overlay.view(), OverlayView::Shown(OverlayContent::Failed));

        assert!(progress.retry());
        assert!(overlay.retry());
        assert!(progress.start_download());
        progress.apply_to(&mut overlay);
        assert_eq!(overlay.view(), OverlayView::Shown(OverlayContent::Spinner));
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(LoadPhase::Downloading.description(), "Downloading model...");
        assert!(!LoadPhase::Ready.shows_overlay());
    }
}
