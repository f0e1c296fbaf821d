/// Errors that can occur while converting an uploaded mesh.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("unsupported file format '{filename}' (expected .stl or .obj)")]
    UnsupportedFormat { filename: String },

    #[error("failed to parse '{filename}': {reason}")]
    ParseFailure { filename: String, reason: String },

    #[error("failed to serialize scene: {0}")]
    SerializeFailure(String),

    #[error("'{filename}' is {size} bytes, limit is {limit} bytes")]
    FileTooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },
}

impl ConvertError {
    pub(crate) fn parse(filename: &str, reason: impl Into<String>) -> Self {
        ConvertError::ParseFailure {
            filename: filename.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the user can fix this by choosing a different file.
    pub fn is_user_correctable(&self) -> bool {
        !matches!(self, ConvertError::SerializeFailure(_))
    }

    /// Message shown to the user when an upload is blocked by this error.
    pub fn user_message(&self) -> String {
        match self {
            ConvertError::UnsupportedFormat { .. } => {
                "Please choose an .stl or .obj file.".to_string()
            }
            ConvertError::ParseFailure { .. } => {
                "This file could not be read as a 3D model. Please try a different file.".to_string()
            }
            ConvertError::SerializeFailure(_) => {
                "Something went wrong while preparing your model. Please try again, or refresh the page."
                    .to_string()
            }
            ConvertError::FileTooLarge { limit, .. } => {
                format!("Files must be smaller than {} MB.", limit / (1024 * 1024))
            }
        }
    }
}
