//! Anthropic Messages API client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::{ChatRole, ChatTurn, GatewayError, ModelGateway};

const API_BASE: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-haiku-4-5";

/// Gateway speaking the Anthropic Messages API.
///
/// Our role vocabulary matches this vendor's, so turns pass through
/// untranslated.
#[derive(Clone)]
pub struct AnthropicGateway {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicGateway {
    /// Create a new gateway with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the model for this gateway.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_headers(&self) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| GatewayError::Config(format!("Invalid API key: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    fn build_request(&self, system: &str, turns: &[ChatTurn], max_tokens: usize) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            max_tokens,
            system: system.to_string(),
            messages: turns
                .iter()
                .map(|t| ApiMessage {
                    role: match t.role {
                        ChatRole::User => "user",
                        ChatRole::Assistant => "assistant",
                    },
                    content: t.text.clone(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl ModelGateway for AnthropicGateway {
    async fn generate(
        &self,
        system: &str,
        turns: &[ChatTurn],
        max_tokens: usize,
    ) -> Result<String, GatewayError> {
        let request = self.build_request(system, turns, max_tokens);
        let headers = self.build_headers()?;

        let response = self
            .client
            .post(format!("{API_BASE}/messages"))
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status,
                message: body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        tracing::debug!(
            input_tokens = api_response.usage.input_tokens,
            output_tokens = api_response.usage.output_tokens,
            "anthropic reply received"
        );

        let text: String = api_response
            .content
            .iter()
            .filter_map(|block| match block {
                ApiContent::Text { text } => Some(text.as_str()),
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(GatewayError::Parse("response contained no text".into()));
        }

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: usize,
    system: String,
    messages: Vec<ApiMessage>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ApiContent>,
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContent {
    Text { text: String },
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: usize,
    output_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_creation() {
        let gw = AnthropicGateway::new("test-key");
        assert_eq!(gw.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_gateway_with_model() {
        let gw = AnthropicGateway::new("test-key").with_model("claude-sonnet-4-5");
        assert_eq!(gw.model, "claude-sonnet-4-5");
    }

    #[test]
    fn test_roles_pass_through() {
        let gw = AnthropicGateway::new("test-key");
        let turns = vec![ChatTurn::user("hello"), ChatTurn::assistant("well met")];
        let request = gw.build_request("be brief", &turns, 256);

        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.messages[1].role, "assistant");
        assert_eq!(request.max_tokens, 256);
        assert_eq!(request.system, "be brief");
    }

    #[test]
    fn test_response_parse() {
        let body = r#"{
            "content": [{"type": "text", "text": "The cave mouth yawns."}],
            "usage": {"input_tokens": 10, "output_tokens": 7}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.content.len(), 1);
        assert_eq!(parsed.usage.output_tokens, 7);
    }
}
