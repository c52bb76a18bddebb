pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    FacebookPost, FacebookScraperInput, InstagramPost, InstagramScraperInput, LinkedInPost,
    LinkedInScraperInput, ProxyConfiguration, RunData, StartUrl, Tweet, TweetScraperInput,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor path for quacker/twitter-scraper.
const TWEET_SCRAPER: &str = "quacker~twitter-scraper";

/// Actor path for apify/instagram-scraper.
const INSTAGRAM_SCRAPER: &str = "apify~instagram-scraper";

/// Actor path for apify/facebook-posts-scraper.
const FACEBOOK_POSTS_SCRAPER: &str = "apify~facebook-posts-scraper";

/// Actor path for curious_coder/linkedin-post-search-scraper.
const LINKEDIN_POST_SCRAPER: &str = "curious_coder~linkedin-post-search-scraper";

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    /// Start an actor run. Returns immediately with run metadata.
    async fn start_run<I: Serialize>(&self, actor: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", BASE_URL, actor);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", BASE_URL, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApifyError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed(api_resp.data.status));
                }
                _ => {
                    tracing::debug!(run_id, status = %api_resp.data.status, "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json", BASE_URL, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Run an actor end-to-end: start, poll to completion, fetch the default
    /// dataset. Fails with `NoDataset` if the run finished without one.
    async fn run_and_collect<I: Serialize, T: DeserializeOwned>(
        &self,
        actor: &str,
        input: &I,
    ) -> Result<Vec<T>> {
        let run = self.start_run(actor, input).await?;
        tracing::info!(run_id = %run.id, actor, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        let dataset_id = completed.default_dataset_id.ok_or(ApifyError::NoDataset)?;
        tracing::info!(run_id = %completed.id, dataset_id = %dataset_id, "Run completed, fetching results");

        self.get_dataset_items(&dataset_id).await
    }

    /// Scrape recent tweets for a handle. The tweet-scraper actor has no
    /// server-side date filter, so the cutoff is enforced by the caller.
    pub async fn scrape_tweets(&self, handle: &str, limit: u32) -> Result<Vec<Tweet>> {
        tracing::info!(handle, limit, "Starting X/Twitter scrape");

        let input = TweetScraperInput {
            handles: vec![handle.to_string()],
            tweets_desired: limit,
            proxy_config: ProxyConfiguration::default(),
        };

        let tweets: Vec<Tweet> = self.run_and_collect(TWEET_SCRAPER, &input).await?;
        tracing::info!(count = tweets.len(), "Fetched tweets");
        Ok(tweets)
    }

    /// Scrape Instagram profile posts newer than the given `YYYY-MM-DD` date.
    pub async fn scrape_instagram_posts(
        &self,
        profile_url: &str,
        limit: u32,
        newer_than: Option<&str>,
    ) -> Result<Vec<InstagramPost>> {
        tracing::info!(profile_url, limit, "Starting Instagram profile scrape");

        let input = InstagramScraperInput {
            direct_urls: vec![profile_url.to_string()],
            results_type: "posts".to_string(),
            results_limit: limit,
            only_posts_newer_than: newer_than.map(str::to_string),
            proxy_configuration: ProxyConfiguration::default(),
        };

        let posts: Vec<InstagramPost> = self.run_and_collect(INSTAGRAM_SCRAPER, &input).await?;
        tracing::info!(count = posts.len(), "Fetched Instagram posts");
        Ok(posts)
    }

    /// Scrape Facebook page posts newer than the given `YYYY-MM-DD` date.
    pub async fn scrape_facebook_posts(
        &self,
        page_url: &str,
        limit: u32,
        newer_than: Option<&str>,
    ) -> Result<Vec<FacebookPost>> {
        tracing::info!(page_url, limit, "Starting Facebook page scrape");

        let input = FacebookScraperInput {
            start_urls: vec![StartUrl {
                url: page_url.to_string(),
            }],
            results_limit: limit,
            max_posts: limit,
            only_posts_newer_than: newer_than.map(str::to_string),
            proxy_configuration: ProxyConfiguration::default(),
        };

        let posts: Vec<FacebookPost> = self.run_and_collect(FACEBOOK_POSTS_SCRAPER, &input).await?;
        tracing::info!(count = posts.len(), "Fetched Facebook posts");
        Ok(posts)
    }

    /// Scrape LinkedIn profile posts. Requires the caller's session cookie
    /// array; cookie refresh is out of scope.
    pub async fn scrape_linkedin_posts(
        &self,
        profile_url: &str,
        limit: u32,
        cookies: serde_json::Value,
    ) -> Result<Vec<LinkedInPost>> {
        tracing::info!(profile_url, limit, "Starting LinkedIn profile scrape");

        let input = LinkedInScraperInput {
            urls: vec![profile_url.to_string()],
            max_posts: limit,
            results_limit: limit,
            cookie: cookies,
            proxy_configuration: ProxyConfiguration::default(),
        };

        let posts: Vec<LinkedInPost> = self.run_and_collect(LINKEDIN_POST_SCRAPER, &input).await?;
        tracing::info!(count = posts.len(), "Fetched LinkedIn posts");
        Ok(posts)
    }
}
