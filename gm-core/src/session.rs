//! The session controller: turn-taking, commands, and summaries.
//!
//! A [`GameSession`] owns one campaign, one save document, and a gateway.
//! Every successful turn is persisted before the reply is returned; a
//! failed model call leaves both the in-memory transcript and the disk
//! state exactly as they were before the player typed anything.

use std::sync::Arc;

use thiserror::Error;

use gm_gateway::{ChatTurn, GatewayError, ModelGateway};

use crate::campaign::{Campaign, CampaignSeed};
use crate::character::Character;
use crate::history::{Role, TurnLog, TurnRecord};
use crate::persist::{CampaignStore, PersistError, SaveDocument};
use crate::prompt;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}

/// What conversation context ordinary turns send to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextStrategy {
    /// Replay the entire transcript.
    #[default]
    FullHistory,
    /// Replay only the last `n` records; the summary carries the rest.
    Recent(usize),
}

impl ContextStrategy {
    fn recent(&self) -> Option<usize> {
        match self {
            ContextStrategy::FullHistory => None,
            ContextStrategy::Recent(n) => Some(*n),
        }
    }
}

/// Configuration for a game session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Campaign name (also the persistence key).
    pub campaign_name: String,

    /// Token budget for ordinary turns.
    pub max_tokens: usize,

    /// Token budget for summary calls.
    pub summary_max_tokens: usize,

    /// Regenerate the summary every this many history records.
    pub summary_interval: usize,

    /// How many records the summarizer sees.
    pub summary_window: usize,

    /// Context sent on ordinary turns.
    pub context: ContextStrategy,
}

impl SessionConfig {
    /// Create a config with default budgets and cadence.
    pub fn new(campaign_name: impl Into<String>) -> Self {
        Self {
            campaign_name: campaign_name.into(),
            max_tokens: 2048,
            summary_max_tokens: 300,
            summary_interval: 20,
            summary_window: 24,
            context: ContextStrategy::default(),
        }
    }

    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_summary_max_tokens(mut self, tokens: usize) -> Self {
        self.summary_max_tokens = tokens;
        self
    }

    pub fn with_summary_interval(mut self, records: usize) -> Self {
        self.summary_interval = records;
        self
    }

    pub fn with_summary_window(mut self, records: usize) -> Self {
        self.summary_window = records;
        self
    }

    pub fn with_context(mut self, context: ContextStrategy) -> Self {
        self.context = context;
        self
    }
}

/// A reserved in-session command, or a free-text action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the character sheet; does not touch history.
    Status,
    /// Regenerate and show the summary; does not touch history.
    Summary,
    /// Summarize, then end the session.
    Quit,
    /// Anything else: a narrated player action.
    Action(String),
}

impl Command {
    /// Parse player input. Commands are case-insensitive and trimmed.
    pub fn parse(input: &str) -> Command {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "status" => Command::Status,
            "summary" => Command::Summary,
            "quit" | "exit" => Command::Quit,
            _ => Command::Action(trimmed.to_string()),
        }
    }
}

/// One live play session: campaign + save document + gateway.
pub struct GameSession {
    store: CampaignStore,
    gateway: Arc<dyn ModelGateway>,
    config: SessionConfig,
    campaign: Campaign,
    save: SaveDocument,
    /// History length at the last summarization attempt; drives the
    /// auto-summary cadence.
    last_summarized_len: usize,
}

impl GameSession {
    /// Load-or-create the campaign and save document for `character_name`.
    ///
    /// `seed` is used only when no campaign document exists;
    /// `create_character` is invoked only when no save document exists.
    pub async fn open<F>(
        store: CampaignStore,
        gateway: Arc<dyn ModelGateway>,
        config: SessionConfig,
        seed: CampaignSeed,
        character_name: &str,
        create_character: F,
    ) -> Result<Self, SessionError>
    where
        F: FnOnce() -> Character,
    {
        let campaign = match store.load_campaign(&config.campaign_name).await {
            Some(campaign) => campaign,
            None => {
                tracing::info!(campaign = %config.campaign_name, "creating new campaign");
                let mut campaign = seed.into_campaign(&config.campaign_name);
                store.save_campaign(&mut campaign).await?;
                campaign
            }
        };

        let save = match store.load_save(&config.campaign_name, character_name).await {
            Some(save) => save,
            None => {
                tracing::info!(character = character_name, "creating new character save");
                let mut save = SaveDocument::fresh(create_character());
                store.save_document(&config.campaign_name, &mut save).await?;
                save
            }
        };

        let last_summarized_len = save.history.len();
        Ok(Self {
            store,
            gateway,
            config,
            campaign,
            save,
            last_summarized_len,
        })
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    pub fn character(&self) -> &Character {
        &self.save.character
    }

    pub fn history(&self) -> &TurnLog {
        &self.save.history
    }

    pub fn summary(&self) -> &str {
        &self.save.summary
    }

    /// If the transcript is empty, issue the opening-scene call.
    ///
    /// The fixed opening prompt is sent as model input but never stored;
    /// only the reply is appended. Returns `None` when a transcript already
    /// exists.
    pub async fn ensure_opening_scene(&mut self) -> Result<Option<String>, SessionError> {
        if !self.save.history.is_empty() {
            return Ok(None);
        }

        let system = self.system_prompt();
        let turns = vec![ChatTurn::user(prompt::OPENING_PROMPT)];
        let reply = self
            .gateway
            .generate(&system, &turns, self.config.max_tokens)
            .await?;

        self.save.history.append(TurnRecord::assistant(&reply));
        self.persist().await;
        Ok(Some(reply))
    }

    /// Run one ordinary turn: stage the input, call the model, commit,
    /// persist, and maybe refresh the summary.
    ///
    /// On gateway failure the staged input is discarded and the transcript
    /// is exactly as it was before the call.
    pub async fn player_turn(&mut self, input: &str) -> Result<String, SessionError> {
        let system = self.system_prompt();
        let recent = self.config.context.recent();

        let staged = self.save.history.stage(input);
        let turns = to_chat_turns(&staged.context(recent));

        match self
            .gateway
            .generate(&system, &turns, self.config.max_tokens)
            .await
        {
            Ok(reply) => {
                staged.commit(&reply);
                self.persist().await;
                self.maybe_auto_summarize().await;
                Ok(reply)
            }
            Err(e) => {
                staged.discard();
                Err(e.into())
            }
        }
    }

    /// Run a one-off prompt: `input` is sent to the model but not stored;
    /// the reply is appended and persisted.
    ///
    /// This backs the REST `initial` flag.
    pub async fn initial_turn(&mut self, input: &str) -> Result<String, SessionError> {
        let system = self.system_prompt();
        let mut turns = to_chat_turns(self.save.history.full());
        turns.push(ChatTurn::user(input));

        let reply = self
            .gateway
            .generate(&system, &turns, self.config.max_tokens)
            .await?;

        self.save.history.append(TurnRecord::assistant(&reply));
        self.persist().await;
        Ok(reply)
    }

    /// Regenerate the running summary from the recent window.
    ///
    /// Failure is absorbed: the previous summary is retained and a warning
    /// logged. Returns the summary current after the attempt.
    pub async fn regenerate_summary(&mut self) -> &str {
        self.last_summarized_len = self.save.history.len();
        let window = self.save.history.window(self.config.summary_window);
        let mut turns = to_chat_turns(window);
        turns.push(ChatTurn::user(prompt::SUMMARY_REQUEST));

        match self
            .gateway
            .generate(
                prompt::summary_system_prompt(),
                &turns,
                self.config.summary_max_tokens,
            )
            .await
        {
            Ok(summary) => {
                self.save.summary = summary;
                self.persist().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "summary update failed; keeping previous summary");
            }
        }

        &self.save.summary
    }

    /// Render the character sheet. Does not touch history.
    pub fn character_sheet(&self) -> String {
        let c = &self.save.character;
        let s = &c.stats;
        let mut sheet = String::new();
        sheet.push_str(&format!("Name:       {}\n", c.name));
        sheet.push_str(&format!("Race:       {}\n", c.race));
        sheet.push_str(&format!("Class:      {}\n", c.class));
        sheet.push_str(&format!("Background: {}\n", c.background));
        sheet.push_str(&format!(
            "Stats:      STR {} / DEX {} / CON {} / INT {} / CHA {}\n",
            s.strength, s.dexterity, s.constitution, s.intelligence, s.charisma
        ));
        sheet.push_str(&format!(
            "Abilities:  {}\n",
            c.race_abilities
                .iter()
                .chain(&c.class_abilities)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ));
        sheet
    }

    fn system_prompt(&self) -> String {
        prompt::system_prompt(&self.campaign, &self.save.character, &self.save.summary)
    }

    async fn maybe_auto_summarize(&mut self) {
        let interval = self.config.summary_interval;
        if interval > 0 && self.save.history.len() - self.last_summarized_len >= interval {
            tracing::debug!(records = self.save.history.len(), "auto-summary triggered");
            self.regenerate_summary().await;
        }
    }

    /// Write the save document and refresh the campaign stamp. Write
    /// failures are logged and swallowed; the turn proceeds with unsaved
    /// state.
    async fn persist(&mut self) {
        if let Err(e) = self
            .store
            .save_document(&self.config.campaign_name, &mut self.save)
            .await
        {
            tracing::warn!(error = %e, "could not save campaign progress");
        }
        if let Err(e) = self.store.save_campaign(&mut self.campaign).await {
            tracing::warn!(error = %e, "could not update campaign stamp");
        }
    }
}

fn to_chat_turns(records: &[TurnRecord]) -> Vec<ChatTurn> {
    records
        .iter()
        .map(|r| match r.role {
            Role::User => ChatTurn::user(&r.content),
            Role::Assistant => ChatTurn::assistant(&r.content),
        })
        .collect()
}
