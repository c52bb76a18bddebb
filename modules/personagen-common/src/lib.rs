pub mod config;
pub mod error;
pub mod timestamp;
pub mod types;

pub use config::Config;
pub use error::{PipelineError, TimestampFormatError};
pub use timestamp::{canonicalize, format_canonical};
pub use types::*;
