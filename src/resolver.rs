//! Signed URL resolution for summary audio

use async_trait::async_trait;

use crate::error::ResolveError;

/// A time-limited playable URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    /// The URL to hand to the device
    pub signed_url: String,
}

impl SignedUrl {
    /// Wrap a signed URL
    pub fn new(signed_url: impl Into<String>) -> Self {
        Self {
            signed_url: signed_url.into(),
        }
    }
}

/// Backend capability exchanging a master brief id for a signed URL
///
/// URLs expire, so callers must not cache results across `play()` calls.
#[async_trait]
pub trait SignedUrlResolver: Send + Sync {
    /// Sign the audio of `master_brief_id`
    async fn resolve(&self, master_brief_id: &str) -> Result<SignedUrl, ResolveError>;
}
