// Test mocks for the pipeline's trait boundaries.
//
// MockAdapter (SourceAdapter) — canned posts, optional failure and delay.
// MockGenerator (NarrativeGenerator) — canned response blobs.
//
// Plus helpers for constructing CanonicalPost fixtures and a request that
// supplies a handle for every platform.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use apify_client::ApifyError;
use gemini_client::MediaPart;
use personagen_common::{CanonicalPost, PipelineError, Platform, PostType, Timestamp};

use crate::traits::{NarrativeGenerator, SourceAdapter, SourceError};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn raw_post(platform: Platform, post_type: PostType, timestamp: &str) -> CanonicalPost {
    CanonicalPost {
        post_type,
        content_urls: Vec::new(),
        platform,
        timestamp: Timestamp::Raw(timestamp.to_string()),
        location: None,
    }
}

pub fn photo_post(platform: Platform, url: &str) -> CanonicalPost {
    CanonicalPost {
        post_type: PostType::Photo,
        content_urls: vec![url.to_string()],
        platform,
        timestamp: Timestamp::Raw("2024-01-01T12:00:00.000Z".to_string()),
        location: None,
    }
}

pub fn request_for_all() -> crate::aggregator::AggregationRequest {
    crate::aggregator::AggregationRequest {
        x_handle: Some("somebody".to_string()),
        instagram_username: Some("somebody".to_string()),
        facebook_username: Some("somebody".to_string()),
        linkedin_username: Some("somebody".to_string()),
        newer_than: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        max_posts: 10,
    }
}

// ---------------------------------------------------------------------------
// MockAdapter
// ---------------------------------------------------------------------------

pub struct MockAdapter {
    platform: Platform,
    posts: Vec<CanonicalPost>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockAdapter {
    pub fn returning(platform: Platform, posts: Vec<CanonicalPost>) -> Self {
        Self {
            platform,
            posts,
            fail: false,
            delay: None,
        }
    }

    pub fn failing(platform: Platform) -> Self {
        Self {
            platform,
            posts: Vec::new(),
            fail: true,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn query(
        &self,
        _handle: &str,
        _since: NaiveDate,
        _limit: u32,
    ) -> Result<Vec<CanonicalPost>, SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(SourceError::Apify(ApifyError::RunFailed(
                "MOCK-FAILED".to_string(),
            )));
        }
        Ok(self.posts.clone())
    }
}

// ---------------------------------------------------------------------------
// MockGenerator
// ---------------------------------------------------------------------------

pub struct MockGenerator {
    responses: Vec<String>,
    fail: bool,
    /// Image counts per call, for asserting batch shapes.
    pub calls: Mutex<Vec<usize>>,
}

impl MockGenerator {
    pub fn returning(responses: Vec<String>) -> Self {
        Self {
            responses,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            responses: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for MockGenerator {
    async fn generate_from_images(
        &self,
        _prompt: &str,
        images: &[MediaPart],
    ) -> Result<Vec<String>, PipelineError> {
        self.calls.lock().unwrap().push(images.len());
        if self.fail {
            return Err(PipelineError::Generation("MOCK-FAILED".to_string()));
        }
        Ok(self.responses.clone())
    }

    async fn generate_from_audio(
        &self,
        _prompt: &str,
        _audio: &MediaPart,
    ) -> Result<String, PipelineError> {
        if self.fail {
            return Err(PipelineError::Generation("MOCK-FAILED".to_string()));
        }
        Ok(self.responses.first().cloned().unwrap_or_default())
    }
}
