//! Gemini `generateContent` client

use super::{GeneratorError, TextGenerator};
use crate::config::AiConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, instrument};

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Gemini text generator
pub struct GeminiGenerator {
    api_key: SecretString,
    client: Client,
    base_url: String,
    model: String,
}

impl fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiGenerator {
    /// Create a generator from configuration
    ///
    /// Returns `NotConfigured` when no usable API key is present.
    pub fn new(config: &AiConfig) -> Result<Self, GeneratorError> {
        let api_key = config.api_key().ok_or(GeneratorError::NotConfigured)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeneratorError::Transient(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::new(api_key.to_string()),
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn map_api_error(status: StatusCode, response_text: &str) -> GeneratorError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_string(), |e| e.message);

        match status {
            StatusCode::TOO_MANY_REQUESTS => GeneratorError::Quota(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GeneratorError::NotConfigured,
            _ => GeneratorError::Transient(format!("Gemini API error ({}): {}", status, message)),
        }
    }

    fn extract_text(response: GeminiResponse) -> Result<String, GeneratorError> {
        if let Some(error) = response.error {
            return Err(GeneratorError::Transient(format!(
                "Gemini API error: {}",
                error.message
            )));
        }

        response
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| GeneratorError::Transient("No content in Gemini response".to_string()))
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.expose_secret().as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| GeneratorError::Transient(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| GeneratorError::Transient(format!("Failed to read response: {}", e.without_url())))?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status, &response_text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = %e, "Failed to parse Gemini response");
            GeneratorError::Transient(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = Self::extract_text(parsed)?;
        debug!(response_len = text.len(), "Received text from Gemini");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> AiConfig {
        AiConfig {
            api_key: Some(SecretString::new("test-key".to_string())),
            base_url: server.uri(),
            timeout_secs: 5,
            ..AiConfig::default()
        }
    }

    fn text_response(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
    }

    #[test]
    fn test_requires_api_key() {
        let result = GeminiGenerator::new(&AiConfig::default());
        assert_eq!(result.err(), Some(GeneratorError::NotConfigured));
    }

    #[test]
    fn test_debug_hides_key() {
        let config = AiConfig {
            api_key: Some(SecretString::new("very-secret".to_string())),
            ..AiConfig::default()
        };
        let generator = GeminiGenerator::new(&config).unwrap();
        assert!(!format!("{:?}", generator).contains("very-secret"));
    }

    #[tokio::test]
    async fn test_generate_returns_first_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "make a plan" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("[{\"exercise\": []}]")))
            .expect(1)
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&config_for(&server)).unwrap();
        let text = generator.generate("make a plan").await.unwrap();
        assert_eq!(text, "[{\"exercise\": []}]");
    }

    #[tokio::test]
    async fn test_quota_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Resource has been exhausted. Please retry in 6.4s." }
            })))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&config_for(&server)).unwrap();
        match generator.generate("hello").await {
            Err(GeneratorError::Quota(message)) => assert!(message.contains("exhausted")),
            other => panic!("expected quota error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&config_for(&server)).unwrap();
        assert!(matches!(
            generator.generate("hello").await,
            Err(GeneratorError::Transient(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_key_is_not_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "message": "API key not valid" }
            })))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&config_for(&server)).unwrap();
        assert_eq!(
            generator.generate("hello").await,
            Err(GeneratorError::NotConfigured)
        );
    }

    #[tokio::test]
    async fn test_empty_candidates_are_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&config_for(&server)).unwrap();
        assert!(matches!(
            generator.generate("hello").await,
            Err(GeneratorError::Transient(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transient() {
        let config = AiConfig {
            api_key: Some(SecretString::new("test-key".to_string())),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..AiConfig::default()
        };

        let generator = GeminiGenerator::new(&config).unwrap();
        assert!(matches!(
            generator.generate("hello").await,
            Err(GeneratorError::Transient(_))
        ));
    }
}
