//! Per-platform source adapters.
//!
//! Each adapter validates its handle syntactically before issuing any remote
//! call, drives the platform's Apify actor through `ApifyClient`, and owns
//! the mapping from platform-native items onto `CanonicalPost`. Timestamps
//! stay in their raw phase here; canonicalization happens in the aggregator.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use apify_client::types::{FacebookPost, InstagramPost, LinkedInPost, Tweet, TweetMedia};
use apify_client::{ApifyClient, ApifyError};
use personagen_common::{CanonicalPost, Platform, PostType, Timestamp};

use crate::traits::{SourceAdapter, SourceError};

static X_HANDLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^@?\w{1,15}$").unwrap());
static INSTAGRAM_USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]{1,30}$").unwrap());
static FACEBOOK_USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.\-]{1,75}$").unwrap());
static LINKEDIN_USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-]{1,100}$").unwrap());

/// A run that never attached a dataset means the actor matched nothing.
fn empty_on_no_dataset<T>(result: apify_client::Result<Vec<T>>) -> Result<Vec<T>, SourceError> {
    match result {
        Err(ApifyError::NoDataset) => {
            debug!("Run produced no dataset; treating as empty result set");
            Ok(Vec::new())
        }
        other => other.map_err(SourceError::from),
    }
}

fn invalid_handle(platform: Platform, handle: &str) -> SourceError {
    SourceError::InvalidHandle {
        platform,
        handle: handle.to_string(),
    }
}

fn cutoff_string(since: NaiveDate) -> String {
    since.format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// X / Twitter
// ---------------------------------------------------------------------------

pub struct XAdapter {
    client: Arc<ApifyClient>,
}

impl XAdapter {
    pub fn new(client: Arc<ApifyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for XAdapter {
    fn platform(&self) -> Platform {
        Platform::X
    }

    async fn query(
        &self,
        handle: &str,
        _since: NaiveDate,
        limit: u32,
    ) -> Result<Vec<CanonicalPost>, SourceError> {
        let handle = handle.trim();
        if !X_HANDLE.is_match(handle) {
            return Err(invalid_handle(Platform::X, handle));
        }

        // The tweet actor has no server-side date filter; the cutoff is
        // advisory for this source.
        let tweets = empty_on_no_dataset(
            self.client
                .scrape_tweets(handle.trim_start_matches('@'), limit)
                .await,
        )?;
        Ok(tweets.into_iter().flat_map(map_tweet).collect())
    }
}

/// One canonical post per media entity, covering both the tweet's own
/// entities and any quoted tweet's.
fn map_tweet(tweet: Tweet) -> Vec<CanonicalPost> {
    let Some(created_at) = tweet.created_at else {
        return Vec::new();
    };

    let mut media: Vec<TweetMedia> = tweet
        .entities
        .and_then(|e| e.media)
        .unwrap_or_default();
    if let Some(quoted) = tweet.quoted_status {
        media.extend(quoted.entities.and_then(|e| e.media).unwrap_or_default());
    }

    media
        .into_iter()
        .map(|med| {
            let (post_type, content_urls) = match med.media_type.as_str() {
                "photo" => (
                    PostType::Photo,
                    med.media_url_https.into_iter().collect(),
                ),
                "video" => {
                    let mp4 = med
                        .video_info
                        .iter()
                        .flat_map(|vi| vi.variants.iter())
                        .find(|v| v.content_type == "video/mp4")
                        .map(|v| v.url.clone());
                    (PostType::Video, mp4.into_iter().collect())
                }
                _ => (PostType::Unknown, Vec::new()),
            };
            CanonicalPost {
                post_type,
                content_urls,
                platform: Platform::X,
                timestamp: Timestamp::Raw(created_at.clone()),
                location: None,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Instagram
// ---------------------------------------------------------------------------

pub struct InstagramAdapter {
    client: Arc<ApifyClient>,
}

impl InstagramAdapter {
    pub fn new(client: Arc<ApifyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for InstagramAdapter {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn query(
        &self,
        handle: &str,
        since: NaiveDate,
        limit: u32,
    ) -> Result<Vec<CanonicalPost>, SourceError> {
        let username = handle.trim();
        if !INSTAGRAM_USERNAME.is_match(username) {
            return Err(invalid_handle(Platform::Instagram, username));
        }

        let profile_url = format!("https://www.instagram.com/{username}/");
        let posts = empty_on_no_dataset(
            self.client
                .scrape_instagram_posts(&profile_url, limit, Some(&cutoff_string(since)))
                .await,
        )?;
        Ok(posts.into_iter().filter_map(map_instagram_post).collect())
    }
}

fn map_instagram_post(item: InstagramPost) -> Option<CanonicalPost> {
    let timestamp = item.timestamp?;
    let (post_type, content_urls) = match item.post_type.as_deref() {
        Some("Image") => (PostType::Photo, item.display_url.into_iter().collect()),
        Some("Video") => (PostType::Video, item.video_url.into_iter().collect()),
        Some("Sidecar") => (PostType::Sidecar, item.images.unwrap_or_default()),
        _ => return None,
    };
    Some(CanonicalPost {
        post_type,
        content_urls,
        platform: Platform::Instagram,
        timestamp: Timestamp::Raw(timestamp),
        location: item.location_name,
    })
}

// ---------------------------------------------------------------------------
// Facebook
// ---------------------------------------------------------------------------

pub struct FacebookAdapter {
    client: Arc<ApifyClient>,
}

impl FacebookAdapter {
    pub fn new(client: Arc<ApifyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for FacebookAdapter {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn query(
        &self,
        handle: &str,
        since: NaiveDate,
        limit: u32,
    ) -> Result<Vec<CanonicalPost>, SourceError> {
        let username = handle.trim();
        if !FACEBOOK_USERNAME.is_match(username) {
            return Err(invalid_handle(Platform::Facebook, username));
        }

        let page_url = format!("https://www.facebook.com/{username}/");
        let posts = empty_on_no_dataset(
            self.client
                .scrape_facebook_posts(&page_url, limit, Some(&cutoff_string(since)))
                .await,
        )?;
        Ok(posts.into_iter().flat_map(map_facebook_post).collect())
    }
}

/// The Facebook actor reports photo attachments under `media` with a
/// GraphQL `__typename`; the URI lives under `image` or `photo_image`
/// depending on post vintage.
fn map_facebook_post(item: FacebookPost) -> Vec<CanonicalPost> {
    let Some(time) = item.time else {
        return Vec::new();
    };

    item.media
        .unwrap_or_default()
        .into_iter()
        .filter_map(|med| {
            if med.typename.as_deref() != Some("Photo") {
                return None;
            }
            let uri = med.image.or(med.photo_image)?.uri;
            Some(CanonicalPost {
                post_type: PostType::Photo,
                content_urls: vec![uri],
                platform: Platform::Facebook,
                timestamp: Timestamp::Raw(time.clone()),
                location: None,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// LinkedIn
// ---------------------------------------------------------------------------

/// Cookie-authenticated; only constructed when session cookies are
/// configured. Cookie refresh is out of scope.
pub struct LinkedInAdapter {
    client: Arc<ApifyClient>,
    cookies: serde_json::Value,
}

impl LinkedInAdapter {
    pub fn new(client: Arc<ApifyClient>, cookies_json: &str) -> anyhow::Result<Self> {
        let cookies: serde_json::Value = serde_json::from_str(cookies_json)
            .map_err(|e| anyhow::anyhow!("LINKEDIN_COOKIES is not valid JSON: {e}"))?;
        Ok(Self { client, cookies })
    }
}

#[async_trait]
impl SourceAdapter for LinkedInAdapter {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    async fn query(
        &self,
        handle: &str,
        _since: NaiveDate,
        limit: u32,
    ) -> Result<Vec<CanonicalPost>, SourceError> {
        let username = handle.trim();
        if !LINKEDIN_USERNAME.is_match(username) {
            return Err(invalid_handle(Platform::LinkedIn, username));
        }

        let profile_url = format!("https://www.linkedin.com/in/{username}");
        let posts = empty_on_no_dataset(
            self.client
                .scrape_linkedin_posts(&profile_url, limit, self.cookies.clone())
                .await,
        )?;
        Ok(posts.into_iter().filter_map(map_linkedin_post).collect())
    }
}

fn map_linkedin_post(item: LinkedInPost) -> Option<CanonicalPost> {
    let timestamp = item.posted_at_iso?;
    let (post_type, content_urls) = match item.post_type.as_deref() {
        Some("image") => (PostType::Photo, item.images.unwrap_or_default()),
        Some("document") => (
            PostType::Document,
            item.document.map(|d| d.cover_pages).unwrap_or_default(),
        ),
        _ => return None,
    };
    Some(CanonicalPost {
        post_type,
        content_urls,
        platform: Platform::LinkedIn,
        timestamp: Timestamp::Raw(timestamp),
        location: item.location,
    })
}
