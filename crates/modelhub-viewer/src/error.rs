use thiserror::Error;

/// Errors surfaced to callers waiting on the viewer library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryLoadError {
    #[error("Failed to fetch viewer library: {0}")]
    Fetch(String),

    #[error("Viewer library server error ({status})")]
    ServerError { status: u16 },

    #[error("Viewer library loader was dropped before the load finished")]
    Abandoned,
}

impl From<reqwest::Error> for LibraryLoadError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            LibraryLoadError::ServerError {
                status: status.as_u16(),
            }
        } else {
            LibraryLoadError::Fetch(err.to_string())
        }
    }
}
