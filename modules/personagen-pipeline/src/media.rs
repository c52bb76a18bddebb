//! Media selection and preparation.
//!
//! Filters the merged post list down to photo-bearing posts, pulls each
//! content URL into a scoped temp file, decodes it, and forces a uniform
//! 8-bit RGB layout before handing the batch to the narrative generator.

use std::io::Write;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use gemini_client::MediaPart;
use personagen_common::{CanonicalPost, PipelineError, Platform, PostType, Timestamp};

use crate::traits::NarrativeGenerator;

/// One preparable media item: a single content URL plus the post context the
/// generator prompt may want.
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub url: String,
    pub platform: Platform,
    pub timestamp: Timestamp,
    pub location: Option<String>,
    pub post_type: PostType,
}

/// Filter to photo posts and fan out one item per content URL. Type
/// normalization happened at canonical-post construction; this is a single
/// case-insensitive comparison against the canonical Photo tag.
pub fn select_photo_media(posts: &[CanonicalPost]) -> Vec<MediaItem> {
    posts
        .iter()
        .filter(|post| {
            post.post_type
                .as_str()
                .eq_ignore_ascii_case(PostType::Photo.as_str())
        })
        .flat_map(|post| {
            post.content_urls.iter().map(move |url| MediaItem {
                url: url.clone(),
                platform: post.platform,
                timestamp: post.timestamp.clone(),
                location: post.location.clone(),
                post_type: post.post_type,
            })
        })
        .collect()
}

/// Aggregate outcome of a preparation pass: per-item failures are isolated,
/// not fatal, and reported here.
#[derive(Debug, Default)]
pub struct MediaReport {
    pub prepared: usize,
    pub failures: Vec<(String, PipelineError)>,
}

pub struct MediaPreparer {
    http: reqwest::Client,
}

impl Default for MediaPreparer {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaPreparer {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Download and decode one image into an 8-bit RGB JPEG part. The temp
    /// file is removed when this function returns, on success and failure
    /// alike.
    async fn prepare_one(&self, item: &MediaItem) -> Result<MediaPart, PipelineError> {
        let download_err = |message: String| PipelineError::MediaDownload {
            url: item.url.clone(),
            message,
        };
        let decode_err = |message: String| PipelineError::MediaDecode {
            url: item.url.clone(),
            message,
        };

        let resp = self
            .http
            .get(&item.url)
            .send()
            .await
            .map_err(|e| download_err(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(download_err(format!("HTTP status {}", resp.status())));
        }
        let bytes = resp.bytes().await.map_err(|e| download_err(e.to_string()))?;

        let mut tmp = NamedTempFile::new().map_err(|e| download_err(e.to_string()))?;
        tmp.write_all(&bytes).map_err(|e| download_err(e.to_string()))?;

        let decoded = image::open(tmp.path()).map_err(|e| decode_err(e.to_string()))?;
        // Heterogeneous source formats (16-bit PNG, palette GIF, HEIF
        // re-encodes) all collapse to 8-bit-per-channel RGB here.
        let rgb = decoded.to_rgb8();

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, 90)
            .encode_image(&DynamicImage::ImageRgb8(rgb))
            .map_err(|e| decode_err(e.to_string()))?;

        Ok(MediaPart::jpeg(jpeg))
    }

    /// Prepare every item, isolating per-item failures: a bad download or
    /// decode is logged, recorded in the report and skipped.
    pub async fn prepare(&self, items: &[MediaItem]) -> (Vec<MediaPart>, MediaReport) {
        let mut parts = Vec::new();
        let mut report = MediaReport::default();

        for item in items {
            match self.prepare_one(item).await {
                Ok(part) => {
                    report.prepared += 1;
                    parts.push(part);
                }
                Err(e) => {
                    warn!(url = item.url.as_str(), error = %e, "Skipping media item");
                    report.failures.push((item.url.clone(), e));
                }
            }
        }

        (parts, report)
    }
}

/// Run the photo subset of a merged post list through the narrative
/// generator. Generator failure is fatal; per-image failures are not.
pub async fn describe_photos<G: NarrativeGenerator + ?Sized>(
    generator: &G,
    preparer: &MediaPreparer,
    prompt: &str,
    posts: &[CanonicalPost],
) -> Result<(Vec<String>, MediaReport), PipelineError> {
    let items = select_photo_media(posts);
    info!(photos = items.len(), "Selected photo media for narrative generation");

    let (parts, report) = preparer.prepare(&items).await;
    if parts.is_empty() {
        info!("No decodable photos; skipping generator call");
        return Ok((Vec::new(), report));
    }

    let texts = generator.generate_from_images(prompt, &parts).await?;
    Ok((texts, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{photo_post, raw_post};

    #[test]
    fn only_photo_posts_survive_selection() {
        let posts = vec![
            photo_post(Platform::Instagram, "https://ig.example/a.jpg"),
            raw_post(Platform::Instagram, PostType::Video, "2024-01-01T12:00:00.000Z"),
            raw_post(Platform::X, PostType::Unknown, "2024-01-01T12:00:00.000Z"),
        ];

        let items = select_photo_media(&posts);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://ig.example/a.jpg");
        assert_eq!(items[0].post_type, PostType::Photo);
    }

    #[test]
    fn sidecar_is_excluded_even_with_content_urls() {
        let mut post = raw_post(Platform::Instagram, PostType::Sidecar, "2024-01-01T12:00:00.000Z");
        post.content_urls = vec![
            "https://ig.example/1.jpg".to_string(),
            "https://ig.example/2.jpg".to_string(),
            "https://ig.example/3.jpg".to_string(),
        ];

        assert!(select_photo_media(&[post]).is_empty());
    }

    #[test]
    fn each_content_url_becomes_its_own_item() {
        let mut post = photo_post(Platform::LinkedIn, "https://li.example/1.jpg");
        post.content_urls.push("https://li.example/2.jpg".to_string());
        post.location = Some("Berlin".to_string());

        let items = select_photo_media(&[post]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].url, "https://li.example/2.jpg");
        assert_eq!(items[1].location.as_deref(), Some("Berlin"));
    }

    #[test]
    fn posts_without_urls_contribute_no_items() {
        let mut post = photo_post(Platform::X, "unused");
        post.content_urls.clear();
        assert!(select_photo_media(&[post]).is_empty());
    }

    #[tokio::test]
    async fn generator_is_skipped_when_nothing_decodes() {
        use crate::testing::MockGenerator;

        // URL that will fail to download — the per-item failure must be
        // recorded, and the generator must not be invoked.
        let posts = vec![photo_post(Platform::X, "http://127.0.0.1:1/unreachable.jpg")];
        let generator = MockGenerator::failing();

        let (texts, report) =
            describe_photos(&generator, &MediaPreparer::new(), "prompt", &posts)
                .await
                .unwrap();
        assert!(texts.is_empty());
        assert_eq!(report.prepared, 0);
        assert_eq!(report.failures.len(), 1);
    }
}
