use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimestampFormatError;
use crate::timestamp::{canonicalize, format_canonical};

/// Canonical post type shared by every platform. Each source adapter owns
/// the mapping from its platform's type strings onto this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostType {
    Photo,
    Video,
    Sidecar,
    Document,
    Unknown,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Photo => "Photo",
            PostType::Video => "Video",
            PostType::Sidecar => "Sidecar",
            PostType::Document => "Document",
            PostType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Originating platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    X,
    Instagram,
    Facebook,
    LinkedIn,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Platform::X => "x",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::LinkedIn => "linkedin",
        };
        f.write_str(s)
    }
}

/// A post timestamp in one of two phases: raw as reported by the source, or
/// canonicalized to a UTC instant. Keeping the phases distinct means a failed
/// canonicalization can be attributed to the specific offending string.
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamp {
    Raw(String),
    Canonical(DateTime<Utc>),
}

impl Timestamp {
    /// Rewrite a raw timestamp in place to its canonical form. No-op when
    /// already canonical.
    pub fn canonicalize(&mut self) -> Result<(), TimestampFormatError> {
        if let Timestamp::Raw(raw) = self {
            *self = Timestamp::Canonical(canonicalize(raw)?);
        }
        Ok(())
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, Timestamp::Canonical(_))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Timestamp::Raw(raw) => serializer.serialize_str(raw),
            Timestamp::Canonical(dt) => serializer.serialize_str(&format_canonical(dt)),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        // Round-trip check: a string that parses and reformats to itself is
        // already canonical; anything else is still in its raw phase.
        match canonicalize(&s) {
            Ok(dt) if format_canonical(&dt) == s => Ok(Timestamp::Canonical(dt)),
            _ => Ok(Timestamp::Raw(s)),
        }
    }
}

/// The unified record all source adapters produce. `content_urls` may be
/// empty (not every matched post carries resolvable media); order matters,
/// the first URL is the primary one for single-media posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalPost {
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub content_urls: Vec<String>,
    #[serde(rename = "social_media")]
    pub platform: Platform,
    pub timestamp: Timestamp,
    pub location: Option<String>,
}

impl CanonicalPost {
    pub fn canonicalize_timestamp(&mut self) -> Result<(), TimestampFormatError> {
        self.timestamp.canonicalize()
    }
}

/// Structured extraction of a narrative-generator response. A label absent
/// from the generator output maps to `None`, never to an empty collection,
/// so callers can tell "not provided" from "provided but empty".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaRecord {
    pub user_id: String,
    pub interests: Option<Vec<String>>,
    pub personality_traits: Option<Vec<String>>,
    pub hobbies: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub values: Option<Vec<String>>,
    pub emotions: Option<Vec<String>>,
    pub experiences: Option<Vec<String>>,
    pub age_group: Option<String>,
    pub gender: Option<String>,
    pub transcribed_text: Option<String>,
    pub confidence: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_post_serializes_with_wire_field_names() {
        let post = CanonicalPost {
            post_type: PostType::Photo,
            content_urls: vec!["https://example.com/a.jpg".to_string()],
            platform: Platform::Instagram,
            timestamp: Timestamp::Canonical(canonicalize("2024-01-01T12:00:00.000Z").unwrap()),
            location: None,
        };

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["type"], "Photo");
        assert_eq!(json["social_media"], "instagram");
        assert_eq!(json["timestamp"], "2024-01-01T12:00:00.000Z");
        assert!(json["location"].is_null());
        assert_eq!(json["content_urls"][0], "https://example.com/a.jpg");
    }

    #[test]
    fn timestamp_deserializes_into_the_right_phase() {
        let canonical: Timestamp = serde_json::from_str("\"2024-01-01T12:00:00.000Z\"").unwrap();
        assert!(canonical.is_canonical());

        let raw: Timestamp = serde_json::from_str("\"Wed Oct 11 12:00:00 +0000 2023\"").unwrap();
        assert!(!raw.is_canonical());
    }

    #[test]
    fn canonicalize_is_a_one_time_rewrite() {
        let mut ts = Timestamp::Raw("Wed Oct 11 12:00:00 +0000 2023".to_string());
        ts.canonicalize().unwrap();
        let first = ts.clone();
        ts.canonicalize().unwrap();
        assert_eq!(ts, first);
    }

    #[test]
    fn raw_timestamp_failure_names_the_post() {
        let mut post = CanonicalPost {
            post_type: PostType::Video,
            content_urls: vec![],
            platform: Platform::X,
            timestamp: Timestamp::Raw("garbage".to_string()),
            location: None,
        };
        let err = post.canonicalize_timestamp().unwrap_err();
        assert_eq!(err.0, "garbage");
    }
}
