//! Conversation-state engine for the AI game master.
//!
//! This crate provides:
//! - Campaign and character documents with JSON persistence
//! - An append-only turn log with transactional staging
//! - System-prompt composition from campaign, character, and summary
//! - A session controller orchestrating turns, commands, and summaries
//! - A bounded store of live sessions for request handlers
//!
//! # Quick Start
//!
//! ```ignore
//! use gm_core::{CampaignSeed, CampaignStore, Character, GameSession, SessionConfig};
//! use gm_gateway::{gateway_from_env, Vendor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = gateway_from_env(Vendor::from_env()?)?;
//!     let store = CampaignStore::new(".");
//!
//!     let mut session = GameSession::open(
//!         store,
//!         gateway,
//!         SessionConfig::new("dragon_heist"),
//!         CampaignSeed::Random,
//!         "Adventurer",
//!         || Character::random("Adventurer"),
//!     )
//!     .await?;
//!
//!     session.ensure_opening_scene().await?;
//!     let reply = session.player_turn("I search the room").await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

pub mod campaign;
pub mod character;
pub mod history;
pub mod persist;
pub mod prompt;
pub mod session;
pub mod store;
pub mod testing;

// Primary public API
pub use campaign::{Campaign, CampaignSeed, THEMES};
pub use character::{Character, StatAllocation, StatName, Stats, STAT_BUDGET};
pub use history::{Role, StagedTurn, TurnLog, TurnRecord};
pub use persist::{CampaignInfo, CampaignStore, PersistError, ResetOutcome, SaveDocument};
pub use session::{Command, ContextStrategy, GameSession, SessionConfig, SessionError};
pub use store::SessionStore;
pub use testing::MockGateway;

/// Current time as an RFC 3339 string, the stamp format of every document.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
