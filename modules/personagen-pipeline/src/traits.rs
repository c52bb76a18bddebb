// Trait abstractions for the pipeline's two external collaborators.
//
// SourceAdapter — one per platform; owns handle validation and the mapping
//   from platform-native items to CanonicalPost.
// NarrativeGenerator — the remote text/image model behind the persona step.
//
// Both enable deterministic testing with MockAdapter and MockGenerator:
// no network, no API keys.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use gemini_client::{GeminiClient, MediaPart};
use personagen_common::{CanonicalPost, PipelineError, Platform};

#[derive(Debug, Error)]
pub enum SourceError {
    /// Malformed handle, rejected before any remote call.
    #[error("Invalid {platform} handle: {handle}")]
    InvalidHandle { platform: Platform, handle: String },

    #[error(transparent)]
    Apify(#[from] apify_client::ApifyError),
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch recent posts for one handle as canonical records with raw
    /// timestamps. `since` and `limit` are advisory filters honored by the
    /// platform actor where it supports them.
    async fn query(
        &self,
        handle: &str,
        since: NaiveDate,
        limit: u32,
    ) -> Result<Vec<CanonicalPost>, SourceError>;
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// One JSON-formatted text blob per generated candidate.
    async fn generate_from_images(
        &self,
        prompt: &str,
        images: &[MediaPart],
    ) -> Result<Vec<String>, PipelineError>;

    async fn generate_from_audio(
        &self,
        prompt: &str,
        audio: &MediaPart,
    ) -> Result<String, PipelineError>;
}

#[async_trait]
impl NarrativeGenerator for GeminiClient {
    async fn generate_from_images(
        &self,
        prompt: &str,
        images: &[MediaPart],
    ) -> Result<Vec<String>, PipelineError> {
        GeminiClient::generate_from_images(self, prompt, images)
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))
    }

    async fn generate_from_audio(
        &self,
        prompt: &str,
        audio: &MediaPart,
    ) -> Result<String, PipelineError> {
        GeminiClient::generate_from_audio(self, prompt, audio)
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))
    }
}
