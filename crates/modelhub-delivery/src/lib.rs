//! Modelhub Delivery - Progressive asset delivery
//!
//! Decides when previews start loading and how their progress is shown:
//! - Images attach their source only once they scroll into view
//! - Grid items reveal strictly in index order
//! - The viewer loading overlay separates download from initialization

pub mod host;
pub mod lazy_image;
pub mod overlay;
pub mod progress;
pub mod reveal;
pub mod viewport;

pub use host::{FullscreenState, HostEnvironment, OverlayLayout};
pub use lazy_image::{ImageState, LazyImage, LazyImageConfig};
pub use overlay::{LoadingOverlay, OverlayConfig, OverlayContent, OverlayView};
pub use progress::{LoadPhase, ViewerLoadProgress, ViewerProgress};
pub use reveal::{LoadSlot, RevealGate};
pub use viewport::{IntersectionObserver, Observation, Rect};
