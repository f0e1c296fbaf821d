use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// An uploaded file as received from the file picker or a drop event.
///
/// Bytes are always the raw buffer; text formats are decoded by the parser.
#[derive(Debug, Clone)]
pub struct RawAsset {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl RawAsset {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }
}

/// Mesh source formats the converter can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    Stl,
    Obj,
}

impl MeshFormat {
    /// Pick a parser from the filename extension, ignoring case.
    pub fn from_filename(filename: &str) -> Result<Self, ConvertError> {
        match extension_of(filename).as_deref() {
            Some("stl") => Ok(MeshFormat::Stl),
            Some("obj") => Ok(MeshFormat::Obj),
            _ => Err(ConvertError::UnsupportedFormat {
                filename: filename.to_string(),
            }),
        }
    }
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Which files the upload form accepts before handing them to the converter.
///
/// Archives are accepted here so the form can take packaged uploads, but the
/// converter itself only handles bare meshes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPolicy {
    /// Accepted extensions, lowercase and without the dot
    pub accepted_extensions: Vec<String>,
    /// Largest accepted upload in bytes
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            accepted_extensions: vec!["stl".into(), "obj".into(), "zip".into()],
            max_bytes: 100 * 1024 * 1024,
        }
    }
}

impl UploadPolicy {
    /// Validate a selected file before any parsing happens.
    pub fn check(&self, filename: &str, size: u64) -> Result<(), ConvertError> {
        let accepted = extension_of(filename)
            .map(|ext| self.accepted_extensions.iter().any(|a| *a == ext))
            .unwrap_or(false);

        if !accepted {
            return Err(ConvertError::UnsupportedFormat {
                filename: filename.to_string(),
            });
        }

        if size > self.max_bytes {
            return Err(ConvertError::FileTooLarge {
                filename: filename.to_string(),
                size,
                limit: self.max_bytes,
            });
        }

        Ok(())
    }

    /// `accept` attribute value for the file picker.
    pub fn accept_attribute(&self) -> String {
        self.accepted_extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(",")
    }
}
