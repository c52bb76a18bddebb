pub mod aggregator;
pub mod media;
pub mod persona;
pub mod sources;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use aggregator::{AggregationRequest, Aggregator};
pub use traits::{NarrativeGenerator, SourceAdapter, SourceError};
