//! Modelhub Viewer - Viewer library loading
//!
//! The 3D viewer component is a heavy third-party script. This crate makes
//! sure it is fetched at most once per page, no matter how many viewers are
//! mounted or when they ask for it.

pub mod error;
pub mod fetcher;
pub mod loader;

pub use error::LibraryLoadError;
pub use fetcher::HttpLibraryFetcher;
pub use loader::{LibraryFetcher, LibraryState, LoadStrategy, LoaderConfig, ReadySignal, ViewerLibraryLoader};
