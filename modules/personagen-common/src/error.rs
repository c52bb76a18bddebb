use thiserror::Error;

/// No accepted pattern matched the source-native timestamp string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Timestamp format not recognized: {0}")]
pub struct TimestampFormatError(pub String);

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    TimestampFormat(#[from] TimestampFormatError),

    #[error("Media download failed for {url}: {message}")]
    MediaDownload { url: String, message: String },

    #[error("Image decode failed for {url}: {message}")]
    MediaDecode { url: String, message: String },

    #[error("Narrative generation failed: {0}")]
    Generation(String),

    #[error("Persona parse error: {0}")]
    PersonaParse(String),
}
