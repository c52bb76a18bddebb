//! Persona extraction from labeled generator output.
//!
//! The generator is prompted to answer in `Label: value` lines. Each
//! recognized label is captured independently; a label missing from the text
//! maps to `None`, never to an empty collection, so callers can distinguish
//! "not provided" from "provided but empty".

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use personagen_common::{PersonaRecord, PipelineError};

const LABELS: &[&str] = &[
    "Interests",
    "Personality Traits",
    "Hobbies",
    "Skills",
    "Values",
    "Emotions",
    "Age Group",
    "Gender",
    "Experiences",
    "Transcribed Text",
    "Confidence",
];

static LABEL_PATTERNS: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    LABELS
        .iter()
        .map(|label| (*label, Regex::new(&format!(r"{label}:\s*(.+)")).unwrap()))
        .collect()
});

fn capture(text: &str, label: &str) -> Option<String> {
    LABEL_PATTERNS[label]
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn capture_list(text: &str, label: &str) -> Option<Vec<String>> {
    capture(text, label).map(|value| value.split(',').map(|s| s.trim().to_string()).collect())
}

/// Parse the generator's labeled response into a persona record for
/// `user_id`. Fails only when no recognized label appears at all.
pub fn extract_persona(response_text: &str, user_id: &str) -> Result<PersonaRecord, PipelineError> {
    if !LABELS
        .iter()
        .any(|label| LABEL_PATTERNS[label].is_match(response_text))
    {
        return Err(PipelineError::PersonaParse(format!(
            "no recognized labels in generator output for {user_id}"
        )));
    }

    let confidence = capture(response_text, "Confidence")
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(0);

    Ok(PersonaRecord {
        user_id: user_id.to_string(),
        interests: capture_list(response_text, "Interests"),
        personality_traits: capture_list(response_text, "Personality Traits"),
        hobbies: capture_list(response_text, "Hobbies"),
        skills: capture_list(response_text, "Skills"),
        values: capture_list(response_text, "Values"),
        emotions: capture_list(response_text, "Emotions"),
        experiences: capture_list(response_text, "Experiences"),
        age_group: capture(response_text, "Age Group"),
        gender: capture(response_text, "Gender"),
        transcribed_text: capture(response_text, "Transcribed Text"),
        confidence,
    })
}
