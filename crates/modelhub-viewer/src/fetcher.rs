use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::error::LibraryLoadError;
use crate::loader::LibraryFetcher;

/// Fetches the viewer library script over HTTP.
pub struct HttpLibraryFetcher {
    client: Client,
    url: String,
}

impl HttpLibraryFetcher {
    pub fn new(url: impl Into<String>) -> Result<Self, LibraryLoadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LibraryLoadError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl LibraryFetcher for HttpLibraryFetcher {
    async fn fetch(&self) -> Result<(), LibraryLoadError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LibraryLoadError::ServerError {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(LibraryLoadError::Fetch(format!("{} returned an empty body", self.url)));
        }

        info!("Fetched viewer library from {} ({} bytes)", self.url, body.len());
        Ok(())
    }
}
