pub mod http;

use crate::cli::Session;
use crate::models::bookmark::BookmarkPayload;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use self::http::HttpBookmarkClient;

#[derive(Debug, Error)]
pub enum BookmarkApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API request failed with status {status}: {body}")]
    Api {
        status: u16,
        body: String,
    },
    #[error("Invalid response body: {0}")]
    Decode(String),
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

/// Remote bookmark store.
#[async_trait]
pub trait BookmarkApi: Send + Sync {
    /// Never fails: transport and HTTP errors come back as a payload with
    /// `success: Some(false)` and `failure` set.
    async fn fetch_bookmarks(&self, session: &Session) -> BookmarkPayload;

    /// Fire-and-forget. Implementations log their own failures.
    async fn delete_bookmark(&self, session: &Session, query_id: &str);
}

pub fn new_client(base_url: &str) -> Result<Arc<dyn BookmarkApi>, BookmarkApiError> {
    let client = HttpBookmarkClient::new(base_url)?;
    Ok(Arc::new(client))
}
