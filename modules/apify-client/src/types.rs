use serde::{Deserialize, Serialize};

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Metadata for an actor run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    /// Absent when the run never attached a dataset.
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: Option<String>,
}

/// Standard proxy block shared by every actor input.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyConfiguration {
    #[serde(rename = "useApifyProxy")]
    pub use_apify_proxy: bool,
}

impl Default for ProxyConfiguration {
    fn default() -> Self {
        Self { use_apify_proxy: true }
    }
}

// --- X / Twitter ---

/// Input for the quacker/twitter-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct TweetScraperInput {
    pub handles: Vec<String>,
    #[serde(rename = "tweetsDesired")]
    pub tweets_desired: u32,
    #[serde(rename = "proxyConfig")]
    pub proxy_config: ProxyConfiguration,
}

/// A single tweet from the Apify dataset, narrowed to the media-bearing
/// fields the aggregation pipeline consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub created_at: Option<String>,
    pub entities: Option<TweetEntities>,
    pub quoted_status: Option<Box<QuotedStatus>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotedStatus {
    pub entities: Option<TweetEntities>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweetEntities {
    pub media: Option<Vec<TweetMedia>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweetMedia {
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(rename = "media_url_https")]
    pub media_url_https: Option<String>,
    pub video_info: Option<VideoInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoInfo {
    pub variants: Vec<VideoVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoVariant {
    pub content_type: String,
    pub url: String,
}

// --- Instagram ---

/// Input for the apify/instagram-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct InstagramScraperInput {
    #[serde(rename = "directUrls")]
    pub direct_urls: Vec<String>,
    #[serde(rename = "resultsType")]
    pub results_type: String,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
    #[serde(rename = "onlyPostsNewerThan", skip_serializing_if = "Option::is_none")]
    pub only_posts_newer_than: Option<String>,
    #[serde(rename = "proxyConfiguration")]
    pub proxy_configuration: ProxyConfiguration,
}

/// A single Instagram post from the Apify dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct InstagramPost {
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    #[serde(rename = "displayUrl")]
    pub display_url: Option<String>,
    #[serde(rename = "videoUrl")]
    pub video_url: Option<String>,
    /// Sidecar child image URLs.
    pub images: Option<Vec<String>>,
    pub timestamp: Option<String>,
    #[serde(rename = "locationName")]
    pub location_name: Option<String>,
}

// --- Facebook ---

/// Input for the apify/facebook-posts-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct FacebookScraperInput {
    #[serde(rename = "startUrls")]
    pub start_urls: Vec<StartUrl>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
    #[serde(rename = "maxPosts")]
    pub max_posts: u32,
    #[serde(rename = "onlyPostsNewerThan", skip_serializing_if = "Option::is_none")]
    pub only_posts_newer_than: Option<String>,
    #[serde(rename = "proxyConfiguration")]
    pub proxy_configuration: ProxyConfiguration,
}

/// A start URL entry for Facebook scraper input.
#[derive(Debug, Clone, Serialize)]
pub struct StartUrl {
    pub url: String,
}

/// A single Facebook post from the Apify dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct FacebookPost {
    pub time: Option<String>,
    pub media: Option<Vec<FacebookMedia>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacebookMedia {
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub image: Option<FacebookImage>,
    /// Some media payloads carry the URI under `photo_image` instead.
    pub photo_image: Option<FacebookImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacebookImage {
    pub uri: String,
}

// --- LinkedIn ---

/// Input for the curious_coder/linkedin-post-search-scraper actor.
/// Cookie-authenticated; the cookie array is passed through verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedInScraperInput {
    pub urls: Vec<String>,
    #[serde(rename = "maxPosts")]
    pub max_posts: u32,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
    pub cookie: serde_json::Value,
    #[serde(rename = "proxyConfiguration")]
    pub proxy_configuration: ProxyConfiguration,
}

/// A single LinkedIn post from the Apify dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkedInPost {
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub images: Option<Vec<String>>,
    pub document: Option<LinkedInDocument>,
    #[serde(rename = "postedAtISO")]
    pub posted_at_iso: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkedInDocument {
    #[serde(rename = "coverPages")]
    pub cover_pages: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instagram_input_uses_apify_wire_names() {
        let input = InstagramScraperInput {
            direct_urls: vec!["https://www.instagram.com/someone/".to_string()],
            results_type: "posts".to_string(),
            results_limit: 5,
            only_posts_newer_than: Some("2024-01-01".to_string()),
            proxy_configuration: ProxyConfiguration::default(),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["directUrls"][0], "https://www.instagram.com/someone/");
        assert_eq!(json["resultsLimit"], 5);
        assert_eq!(json["onlyPostsNewerThan"], "2024-01-01");
        assert_eq!(json["proxyConfiguration"]["useApifyProxy"], true);
    }

    #[test]
    fn absent_cutoff_is_omitted_from_facebook_input() {
        let input = FacebookScraperInput {
            start_urls: vec![StartUrl { url: "https://www.facebook.com/page/".to_string() }],
            results_limit: 10,
            max_posts: 10,
            only_posts_newer_than: None,
            proxy_configuration: ProxyConfiguration::default(),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("onlyPostsNewerThan").is_none());
    }

    #[test]
    fn tweet_media_deserializes_photo_and_video() {
        let raw = serde_json::json!({
            "created_at": "Wed Oct 11 12:00:00 +0000 2023",
            "entities": {
                "media": [
                    { "type": "photo", "media_url_https": "https://pbs.example/p.jpg" },
                    {
                        "type": "video",
                        "video_info": {
                            "variants": [
                                { "content_type": "application/x-mpegURL", "url": "https://v.example/pl.m3u8" },
                                { "content_type": "video/mp4", "url": "https://v.example/v.mp4" }
                            ]
                        }
                    }
                ]
            }
        });
        let tweet: Tweet = serde_json::from_value(raw).unwrap();
        let media = tweet.entities.unwrap().media.unwrap();
        assert_eq!(media[0].media_type, "photo");
        assert_eq!(media[1].video_info.as_ref().unwrap().variants[1].url, "https://v.example/v.mp4");
    }
}
