//! Google Gemini generateContent client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ChatRole, ChatTurn, GatewayError, ModelGateway};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gateway speaking the Gemini REST API.
///
/// This vendor calls the assistant role `model`; the translation lives
/// here and nowhere else.
#[derive(Clone)]
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiGateway {
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

    fn build_request(&self, system: &str, turns: &[ChatTurn], max_tokens: usize) -> ApiRequest {
        ApiRequest {
            system_instruction: ApiContent {
                role: None,
                parts: vec![ApiPart {
                    text: system.to_string(),
                }],
            },
            contents: turns
                .iter()
                .map(|t| ApiContent {
                    role: Some(match t.role {
                        ChatRole::User => "user",
                        ChatRole::Assistant => "model",
                    }),
                    parts: vec![ApiPart {
                        text: t.text.clone(),
                    }],
                })
                .collect(),
            generation_config: ApiGenerationConfig {
                max_output_tokens: max_tokens,
            },
        }
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn generate(
        &self,
        system: &str,
        turns: &[ChatTurn],
        max_tokens: usize,
    ) -> Result<String, GatewayError> {
        let request = self.build_request(system, turns, max_tokens);
        let url = format!(
            "{API_BASE}/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
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

        api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::Parse("response contained no text".into()))
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: ApiContent,
    contents: Vec<ApiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct ApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct ApiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    candidates: Vec<ApiCandidate>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    content: ApiResponseContent,
}

#[derive(Debug, Deserialize)]
struct ApiResponseContent {
    parts: Vec<ApiPart>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_translates_to_model_role() {
        let gw = GeminiGateway::new("test-key");
        let turns = vec![
            ChatTurn::user("I search the room"),
            ChatTurn::assistant("Dust motes swirl in the lantern light."),
        ];
        let request = gw.build_request("be brief", &turns, 300);

        assert_eq!(request.contents[0].role, Some("user"));
        assert_eq!(request.contents[1].role, Some("model"));
        assert_eq!(request.generation_config.max_output_tokens, 300);
    }

    #[test]
    fn test_request_body_shape() {
        let gw = GeminiGateway::new("test-key");
        let request = gw.build_request("sys", &[ChatTurn::user("hi")], 64);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 64);
        // The system instruction carries no role field.
        assert!(value["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_response_parse() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "A cold wind rises."}], "role": "model"}}
            ]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.candidates[0].content.parts[0].text, "A cold wind rises.");
    }
}
