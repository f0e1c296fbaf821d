use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Immutable binary payload tagged with a MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Arc<[u8]>,
    mime: &'static str,
}

impl Blob {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime: &'static str) -> Self {
        Self {
            bytes: bytes.into(),
            mime,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A revocable local URL that resolves to a blob while it is live.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live object URLs. Clones share the same table.
///
/// URLs stay valid until the owner revokes them; the registry never expires
/// anything on its own.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    urls: Arc<Mutex<HashMap<String, Blob>>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob and return a fresh URL for it.
    pub fn create(&self, blob: Blob) -> ObjectUrl {
        let url = format!("blob:modelhub/{}", Uuid::new_v4());
        debug!("Created object URL {} ({} bytes, {})", url, blob.len(), blob.mime());
        self.urls.lock().insert(url.clone(), blob);
        ObjectUrl(url)
    }

    /// Look up the blob behind a URL, if it has not been revoked.
    pub fn resolve(&self, url: &ObjectUrl) -> Option<Blob> {
        self.urls.lock().get(&url.0).cloned()
    }

    /// Release a URL. Returns `false` if it was already revoked or unknown.
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        let removed = self.urls.lock().remove(&url.0).is_some();
        if removed {
            debug!("Revoked object URL {}", url);
        }
        removed
    }

    /// Number of URLs that have not been revoked.
    pub fn live_count(&self) -> usize {
        self.urls.lock().len()
    }
}
