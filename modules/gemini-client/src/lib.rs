pub mod error;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::MediaPart;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::debug;

use types::*;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for the Gemini generateContent endpoint. Media is inlined as
/// base64 parts; no file upload round-trip.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            http: reqwest::Client::new(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|e| GeminiError::Api {
                status: 0,
                message: format!("invalid API key header: {e}"),
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        debug!(model = %self.model, "Gemini generateContent request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response.json().await?)
    }

    fn candidate_texts(response: GenerateContentResponse) -> Vec<String> {
        response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect()
    }

    /// Generate narrative text for a batch of images. Returns one JSON text
    /// blob per candidate; JSON output is requested via the response mime type.
    pub async fn generate_from_images(
        &self,
        prompt: &str,
        images: &[MediaPart],
    ) -> Result<Vec<String>> {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        for image in images {
            parts.push(Part::Inline {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: BASE64.encode(&image.data),
                },
            });
        }

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
            }),
        };

        let response = self.generate(&request).await?;
        let texts = Self::candidate_texts(response);
        if texts.is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(texts)
    }

    fn audio_request(prompt: &str, audio: &MediaPart) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: audio.mime_type.clone(),
                            data: BASE64.encode(&audio.data),
                        },
                    },
                ],
            }],
            generation_config: None,
        }
    }

    /// Generate narrative text (transcription, persona cues) from one audio blob.
    pub async fn generate_from_audio(&self, prompt: &str, audio: &MediaPart) -> Result<String> {
        let request = Self::audio_request(prompt, audio);

        let response = self.generate(&request).await?;
        Self::candidate_texts(response)
            .into_iter()
            .next()
            .ok_or(GeminiError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_request_inlines_the_blob_after_the_prompt() {
        let audio = MediaPart {
            mime_type: "audio/mp3".to_string(),
            data: b"hello".to_vec(),
        };
        let request = GeminiClient::audio_request("transcribe this", &audio);

        let json = serde_json::to_value(&request).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "transcribe this");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "audio/mp3");
        assert_eq!(parts[1]["inlineData"]["data"], "aGVsbG8=");
        assert!(json.get("generationConfig").is_none());
    }
}
