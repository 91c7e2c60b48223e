//! Model-vendor gateways for the AI game master.
//!
//! This crate isolates everything vendor-specific behind one contract:
//! [`ModelGateway::generate`] takes a system instruction, an ordered list of
//! conversation turns, and a token budget, and returns the reply text. Role
//! vocabulary translation (some vendors say `model` where we say
//! `assistant`) happens entirely inside the vendor clients, so callers stay
//! vendor-agnostic.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

mod anthropic;
mod gemini;

pub use anthropic::AnthropicGateway;
pub use gemini::GeminiGateway;

/// Errors that can occur when calling a model vendor.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("API key not configured: set {0}")]
    MissingApiKey(&'static str),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// The role of a conversation turn, in our own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of conversation handed to a gateway.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// The abstract model gateway.
///
/// One outbound call, no retries; any transport, auth, or rate-limit
/// failure surfaces as a [`GatewayError`].
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Generate a reply for the given system instruction and conversation.
    async fn generate(
        &self,
        system: &str,
        turns: &[ChatTurn],
        max_tokens: usize,
    ) -> Result<String, GatewayError>;
}

/// Supported model vendors, selected at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Vendor {
    #[default]
    Anthropic,
    Gemini,
}

impl Vendor {
    /// Parse a vendor name as found in `GM_VENDOR`.
    pub fn parse(name: &str) -> Result<Self, GatewayError> {
        match name.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Vendor::Anthropic),
            "gemini" | "google" => Ok(Vendor::Gemini),
            other => Err(GatewayError::Config(format!("unknown vendor: {other}"))),
        }
    }

    /// Read the vendor from `GM_VENDOR`, defaulting to Anthropic.
    pub fn from_env() -> Result<Self, GatewayError> {
        match std::env::var("GM_VENDOR") {
            Ok(name) => Self::parse(&name),
            Err(_) => Ok(Vendor::default()),
        }
    }

    /// The environment variable holding this vendor's credential.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Vendor::Anthropic => "ANTHROPIC_API_KEY",
            Vendor::Gemini => "GEMINI_API_KEY",
        }
    }
}

/// Build a gateway for the given vendor from the environment.
///
/// Reads the vendor's credential variable and an optional `GM_MODEL`
/// override. Fails with [`GatewayError::MissingApiKey`] when the credential
/// is absent.
pub fn gateway_from_env(vendor: Vendor) -> Result<Arc<dyn ModelGateway>, GatewayError> {
    let api_key = std::env::var(vendor.api_key_var())
        .map_err(|_| GatewayError::MissingApiKey(vendor.api_key_var()))?;
    let model = std::env::var("GM_MODEL").ok();

    Ok(match vendor {
        Vendor::Anthropic => {
            let mut gw = AnthropicGateway::new(api_key);
            if let Some(model) = model {
                gw = gw.with_model(model);
            }
            Arc::new(gw)
        }
        Vendor::Gemini => {
            let mut gw = GeminiGateway::new(api_key);
            if let Some(model) = model {
                gw = gw.with_model(model);
            }
            Arc::new(gw)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_parse() {
        assert_eq!(Vendor::parse("anthropic").unwrap(), Vendor::Anthropic);
        assert_eq!(Vendor::parse(" Gemini ").unwrap(), Vendor::Gemini);
        assert!(Vendor::parse("cohere").is_err());
    }

    #[test]
    fn test_api_key_var() {
        assert_eq!(Vendor::Anthropic.api_key_var(), "ANTHROPIC_API_KEY");
        assert_eq!(Vendor::Gemini.api_key_var(), "GEMINI_API_KEY");
    }

    #[test]
    fn test_chat_turn_constructors() {
        let turn = ChatTurn::user("I open the door");
        assert_eq!(turn.role, ChatRole::User);

        let turn = ChatTurn::assistant("The door creaks open.");
        assert_eq!(turn.role, ChatRole::Assistant);
    }
}
