//! Aggregation orchestrator.
//!
//! Fans out to every configured source adapter whose handle was supplied,
//! under a bounded concurrency limit, and merges the results. A failing
//! adapter is recovered locally and contributes no posts; a timestamp that
//! cannot be canonicalized is fatal to the run.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use personagen_common::{CanonicalPost, PipelineError, Platform};

use crate::traits::{SourceAdapter, SourceError};

/// Per-platform query parameters for one aggregation run. The cutoff date is
/// supplied by the caller and evaluated per invocation, never captured at
/// process start.
#[derive(Debug, Clone)]
pub struct AggregationRequest {
    pub x_handle: Option<String>,
    pub instagram_username: Option<String>,
    pub facebook_username: Option<String>,
    pub linkedin_username: Option<String>,
    pub newer_than: NaiveDate,
    pub max_posts: u32,
}

impl AggregationRequest {
    pub fn handle_for(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::X => self.x_handle.as_deref(),
            Platform::Instagram => self.instagram_username.as_deref(),
            Platform::Facebook => self.facebook_username.as_deref(),
            Platform::LinkedIn => self.linkedin_username.as_deref(),
        }
    }
}

pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, concurrency: usize) -> Self {
        Self {
            adapters,
            concurrency: concurrency.max(1),
        }
    }

    /// Produce the union of canonical posts from all adapters with a handle.
    /// Adapters without a handle are skipped, not invoked.
    pub async fn aggregate(
        &self,
        request: &AggregationRequest,
    ) -> Result<Vec<CanonicalPost>, PipelineError> {
        let since = request.newer_than;
        let limit = request.max_posts;

        let jobs: Vec<(Arc<dyn SourceAdapter>, String)> = self
            .adapters
            .iter()
            .filter_map(|adapter| {
                request
                    .handle_for(adapter.platform())
                    .map(|handle| (Arc::clone(adapter), handle.to_string()))
            })
            .collect();

        if jobs.is_empty() {
            info!("No handles supplied; nothing to aggregate");
            return Ok(Vec::new());
        }

        info!(
            sources = jobs.len(),
            concurrency = self.concurrency,
            %since,
            limit,
            "Fanning out to source adapters"
        );

        // Bounded fan-out. `buffered` polls up to `concurrency` queries at
        // once but yields in submission order, so the merged list stays
        // deterministic regardless of completion order.
        let outcomes: Vec<(Platform, Result<Vec<CanonicalPost>, SourceError>)> =
            stream::iter(jobs.into_iter().map(|(adapter, handle)| async move {
                let platform = adapter.platform();
                let outcome = adapter.query(&handle, since, limit).await;
                (platform, outcome)
            }))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut merged = Vec::new();
        for (platform, outcome) in outcomes {
            match outcome {
                Ok(posts) => {
                    debug!(%platform, count = posts.len(), "Source adapter returned posts");
                    merged.extend(posts);
                }
                Err(e) => {
                    warn!(%platform, error = %e, "Source adapter failed; contributing no posts");
                }
            }
        }

        for post in &mut merged {
            post.canonicalize_timestamp()?;
        }

        info!(count = merged.len(), "Aggregation complete");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{photo_post, raw_post, request_for_all, MockAdapter};
    use personagen_common::{PostType, Timestamp};
    use std::time::Duration;

    #[tokio::test]
    async fn failing_adapter_does_not_abort_the_others() {
        let aggregator = Aggregator::new(
            vec![
                Arc::new(MockAdapter::returning(
                    Platform::X,
                    vec![photo_post(Platform::X, "https://x.example/1.jpg")],
                )),
                Arc::new(MockAdapter::failing(Platform::Instagram)),
                Arc::new(MockAdapter::returning(
                    Platform::Facebook,
                    vec![photo_post(Platform::Facebook, "https://fb.example/2.jpg")],
                )),
            ],
            4,
        );

        let posts = aggregator.aggregate(&request_for_all()).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].platform, Platform::X);
        assert_eq!(posts[1].platform, Platform::Facebook);
    }

    #[tokio::test]
    async fn submission_order_is_preserved_despite_completion_order() {
        // The first adapter finishes last; the merge must still lead with it.
        let aggregator = Aggregator::new(
            vec![
                Arc::new(
                    MockAdapter::returning(
                        Platform::X,
                        vec![photo_post(Platform::X, "https://x.example/slow.jpg")],
                    )
                    .with_delay(Duration::from_millis(50)),
                ),
                Arc::new(MockAdapter::returning(
                    Platform::Instagram,
                    vec![photo_post(Platform::Instagram, "https://ig.example/fast.jpg")],
                )),
            ],
            4,
        );

        let posts = aggregator.aggregate(&request_for_all()).await.unwrap();
        assert_eq!(posts[0].platform, Platform::X);
        assert_eq!(posts[1].platform, Platform::Instagram);
    }

    #[tokio::test]
    async fn adapters_without_a_handle_are_skipped() {
        let aggregator = Aggregator::new(
            vec![
                Arc::new(MockAdapter::returning(
                    Platform::X,
                    vec![photo_post(Platform::X, "https://x.example/1.jpg")],
                )),
                Arc::new(MockAdapter::returning(
                    Platform::LinkedIn,
                    vec![photo_post(Platform::LinkedIn, "https://li.example/never.jpg")],
                )),
            ],
            4,
        );

        let mut request = request_for_all();
        request.linkedin_username = None;

        let posts = aggregator.aggregate(&request).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].platform, Platform::X);
    }

    #[tokio::test]
    async fn all_adapters_failing_yields_an_empty_list_not_an_error() {
        let aggregator = Aggregator::new(
            vec![
                Arc::new(MockAdapter::failing(Platform::X)),
                Arc::new(MockAdapter::failing(Platform::Instagram)),
            ],
            4,
        );

        let posts = aggregator.aggregate(&request_for_all()).await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn merged_timestamps_are_canonical() {
        let aggregator = Aggregator::new(
            vec![Arc::new(MockAdapter::returning(
                Platform::X,
                vec![raw_post(Platform::X, PostType::Photo, "Wed Oct 11 12:00:00 +0000 2023")],
            ))],
            4,
        );

        let posts = aggregator.aggregate(&request_for_all()).await.unwrap();
        assert!(posts[0].timestamp.is_canonical());
        assert_eq!(
            serde_json::to_value(&posts[0].timestamp).unwrap(),
            "2023-10-11T12:00:00.000Z"
        );
    }

    #[tokio::test]
    async fn one_unparseable_timestamp_aborts_the_run() {
        let aggregator = Aggregator::new(
            vec![
                Arc::new(MockAdapter::returning(
                    Platform::X,
                    vec![photo_post(Platform::X, "https://x.example/ok.jpg")],
                )),
                Arc::new(MockAdapter::returning(
                    Platform::Instagram,
                    vec![raw_post(Platform::Instagram, PostType::Photo, "not-a-date")],
                )),
            ],
            4,
        );

        let err = aggregator.aggregate(&request_for_all()).await.unwrap_err();
        match err {
            PipelineError::TimestampFormat(e) => assert_eq!(e.0, "not-a-date"),
            other => panic!("expected TimestampFormat, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bounded_concurrency_still_drains_all_adapters() {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(MockAdapter::returning(
                Platform::X,
                vec![photo_post(Platform::X, "https://x.example/1.jpg")],
            )),
            Arc::new(MockAdapter::returning(
                Platform::Instagram,
                vec![photo_post(Platform::Instagram, "https://ig.example/2.jpg")],
            )),
            Arc::new(MockAdapter::returning(
                Platform::Facebook,
                vec![photo_post(Platform::Facebook, "https://fb.example/3.jpg")],
            )),
            Arc::new(MockAdapter::returning(
                Platform::LinkedIn,
                vec![photo_post(Platform::LinkedIn, "https://li.example/4.jpg")],
            )),
        ];

        let aggregator = Aggregator::new(adapters, 1);
        let posts = aggregator.aggregate(&request_for_all()).await.unwrap();
        assert_eq!(posts.len(), 4);
    }

    #[test]
    fn empty_timestamp_field_check() {
        // Raw phase survives serialization untouched.
        let ts = Timestamp::Raw("Wed Oct 11 12:00:00 +0000 2023".to_string());
        assert_eq!(
            serde_json::to_value(&ts).unwrap(),
            "Wed Oct 11 12:00:00 +0000 2023"
        );
    }
}
