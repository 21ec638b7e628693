/// Gemini client: the single point of entry for all generative-AI calls in Folio.
///
/// No other module may call the Gemini API directly. The upload pipeline depends on the
/// `ResumeParser` trait, which this client implements.
///
/// Model: gemini-2.0-flash (hardcoded so parsed output stays comparable across uploads)
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod handlers;
pub mod prompts;

use prompts::RESUME_EXTRACTION_PROMPT;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// The model used for all resume parsing.
pub const MODEL: &str = "gemini-2.0-flash";
const MAX_RETRIES: u32 = 3;
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Model returned no text content")]
    EmptyContent { full_response: Value },

    #[error("Model output is not valid JSON: {source}")]
    Parse {
        raw_text: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GeminiError {
    /// Whether another attempt could succeed.
    fn is_transient(&self) -> bool {
        match self {
            GeminiError::Http(_) => true,
            GeminiError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Turns an uploaded resume into structured JSON.
///
/// Carried in `AppState` as `Arc<dyn ResumeParser>`.
#[async_trait]
pub trait ResumeParser: Send + Sync {
    async fn parse(&self, file: &[u8], mime_type: &str) -> Result<Value, GeminiError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GEMINI_API_BASE.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, MODEL)
    }

    /// Sends the extraction prompt plus the file inline and returns the raw response body.
    /// Retries on 429, 5xx and transport errors with exponential backoff.
    pub async fn generate(&self, file: &[u8], mime_type: &str) -> Result<Value, GeminiError> {
        if self.api_key.is_empty() {
            return Err(GeminiError::MissingApiKey);
        }

        let mime_type = if mime_type.is_empty() {
            FALLBACK_MIME_TYPE
        } else {
            mime_type
        };

        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![
                    RequestPart::Text {
                        text: RESUME_EXTRACTION_PROMPT,
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type,
                            data: general_purpose::STANDARD.encode(file),
                        },
                    },
                ],
            }],
        };

        let mut last_error: Option<GeminiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.send_once(&request_body).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() => {
                    warn!("Gemini API call failed: {e}");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(GeminiError::Api {
            status: 429,
            body: format!("Rate limited after {MAX_RETRIES} retries"),
        }))
    }

    async fn send_once(&self, request_body: &GenerateContentRequest<'_>) -> Result<Value, GeminiError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        if let Some(usage) = body.get("usageMetadata") {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, output_tokens={}",
                usage["promptTokenCount"], usage["candidatesTokenCount"]
            );
        }
        Ok(body)
    }
}

#[async_trait]
impl ResumeParser for GeminiClient {
    async fn parse(&self, file: &[u8], mime_type: &str) -> Result<Value, GeminiError> {
        let response = self.generate(file, mime_type).await?;
        extract_json(response)
    }
}

/// Pulls the first candidate's text out of a generateContent response and parses it as JSON.
pub fn extract_json(response: Value) -> Result<Value, GeminiError> {
    let text = match response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
    {
        Some(text) if !text.is_empty() => strip_json_fences(text),
        _ => {
            return Err(GeminiError::EmptyContent {
                full_response: response,
            })
        }
    };

    serde_json::from_str(&text).map_err(|source| GeminiError::Parse {
        raw_text: text,
        source,
    })
}

/// Removes every ```json and ``` fence marker, wherever it appears, then trims.
fn strip_json_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn candidate(text: &str) -> Value {
        json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}],
            "usageMetadata": {"promptTokenCount": 812, "candidatesTokenCount": 240}
        })
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_from_candidate() {
        let parsed = extract_json(candidate("```json\n{\"name\": \"Ada Lovelace\"}\n```")).unwrap();
        assert_eq!(parsed["name"], "Ada Lovelace");
    }

    #[test]
    fn test_extract_json_without_candidates() {
        let response = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        match extract_json(response.clone()) {
            Err(GeminiError::EmptyContent { full_response }) => assert_eq!(full_response, response),
            other => panic!("expected EmptyContent, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_json_keeps_raw_text_on_parse_failure() {
        match extract_json(candidate("Sorry, I cannot read this file.")) {
            Err(GeminiError::Parse { raw_text, .. }) => {
                assert_eq!(raw_text, "Sorry, I cannot read this file.")
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![
                    RequestPart::Text { text: "prompt" },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: "application/pdf",
                            data: general_purpose::STANDARD.encode(b"%PDF"),
                        },
                    },
                ],
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(
            value["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "application/pdf"
        );
        assert_eq!(value["contents"][0]["parts"][1]["inlineData"]["data"], "JVBERg==");
    }

    #[tokio::test]
    async fn test_parse_against_mock_server() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-2.0-flash:generateContent")
                    .header("x-goog-api-key", "test-key")
                    .body_contains("\"mimeType\":\"text/plain\"")
                    .body_contains("\"data\":\"SGVsbG8=\"");
                then.status(200).json_body(candidate(
                    "```json\n{\"name\": \"Grace Hopper\", \"skills\": [\"COBOL\"]}\n```",
                ));
            })
            .await;

        let client = GeminiClient::with_base_url("test-key".to_string(), server.base_url());
        let parsed = client.parse(b"Hello", "text/plain").await.unwrap();

        mock.assert_async().await;
        assert_eq!(parsed["name"], "Grace Hopper");
        assert_eq!(parsed["skills"][0], "COBOL");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(400).body("{\"error\": {\"message\": \"bad mime\"}}");
            })
            .await;

        let client = GeminiClient::with_base_url("test-key".to_string(), server.base_url());
        let err = client.parse(b"x", "image/gif").await.unwrap_err();

        mock.assert_hits_async(1).await;
        match err {
            GeminiError::Api { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("bad mime"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_short_circuits() {
        let client = GeminiClient::with_base_url(String::new(), "http://127.0.0.1:9".to_string());
        assert!(matches!(
            client.parse(b"x", "text/plain").await,
            Err(GeminiError::MissingApiKey)
        ));
    }
}
