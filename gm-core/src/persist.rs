//! Campaign persistence: JSON documents under a campaigns directory.
//!
//! Layout: `<root>/campaigns/<sanitized-campaign>/campaign.json` plus one
//! `character_<sanitized-name>.json` save document per character. Loads
//! treat a missing or unreadable file as absence so callers create fresh
//! state instead of surfacing parse errors to the player.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::campaign::Campaign;
use crate::character::Character;
use crate::history::TurnLog;

/// Errors from persistence operations.
///
/// Only writes produce these; reads degrade to absence.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Summary shown after a fresh campaign is created.
const FRESH_SUMMARY: &str = "A new adventure begins...";

/// Reduce a user-supplied name to a filesystem-safe form.
///
/// Keeps alphanumerics, spaces, underscores, and hyphens, then replaces
/// spaces with underscores. Idempotent: sanitizing a sanitized name is a
/// no-op.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// The persisted unit for one character in one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub character: Character,
    pub created: String,
    pub last_played: String,
    pub history: TurnLog,
    pub summary: String,
}

impl SaveDocument {
    /// A fresh save for a newly created character.
    pub fn fresh(character: Character) -> Self {
        let now = crate::now_rfc3339();
        Self {
            character,
            created: now.clone(),
            last_played: now,
            history: TurnLog::new(),
            summary: FRESH_SUMMARY.to_string(),
        }
    }
}

/// Listing entry for the `campaigns` command.
#[derive(Debug, Clone)]
pub struct CampaignInfo {
    pub name: String,
    pub last_played: String,
    pub message_count: usize,
}

/// Outcome of a campaign reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The campaign directory was removed.
    Deleted,
    /// No directory existed; success, nothing to do.
    NothingToDelete,
}

/// Filesystem store for campaign and save documents.
#[derive(Debug, Clone)]
pub struct CampaignStore {
    root: PathBuf,
}

impl CampaignStore {
    /// Create a store rooted at `root`; documents live in
    /// `<root>/campaigns/`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The directory holding all campaign folders.
    pub fn campaigns_dir(&self) -> PathBuf {
        self.root.join("campaigns")
    }

    /// The folder for one campaign.
    pub fn campaign_dir(&self, name: &str) -> PathBuf {
        self.campaigns_dir().join(sanitize_name(name))
    }

    fn campaign_path(&self, name: &str) -> PathBuf {
        self.campaign_dir(name).join("campaign.json")
    }

    /// The save-document path for a character within a campaign.
    pub fn save_path(&self, campaign: &str, character: &str) -> PathBuf {
        self.campaign_dir(campaign)
            .join(format!("character_{}.json", sanitize_name(character)))
    }

    /// Load a campaign document; absent or unreadable means `None`.
    pub async fn load_campaign(&self, name: &str) -> Option<Campaign> {
        read_document(&self.campaign_path(name)).await
    }

    /// Write a campaign document, stamping `last_played` first.
    pub async fn save_campaign(&self, campaign: &mut Campaign) -> Result<(), PersistError> {
        campaign.last_played = crate::now_rfc3339();
        let path = self.campaign_path(&campaign.name);
        write_document(&path, campaign).await
    }

    /// Load a save document; absent or unreadable means `None`.
    pub async fn load_save(&self, campaign: &str, character: &str) -> Option<SaveDocument> {
        read_document(&self.save_path(campaign, character)).await
    }

    /// Write a save document, stamping `last_played` first.
    pub async fn save_document(
        &self,
        campaign: &str,
        doc: &mut SaveDocument,
    ) -> Result<(), PersistError> {
        doc.last_played = crate::now_rfc3339();
        let path = self.save_path(campaign, &doc.character.name);
        write_document(&path, doc).await
    }

    /// List saved campaigns with their last-played stamp and total message
    /// count across character saves. Unreadable entries are skipped.
    pub async fn list_campaigns(&self) -> Result<Vec<CampaignInfo>, PersistError> {
        let dir = self.campaigns_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut infos = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.path().is_dir() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().to_string();
            let Some(campaign) = self.load_campaign(&dir_name).await else {
                continue;
            };

            let mut message_count = 0;
            for character in self.list_characters(&dir_name).await? {
                if let Some(save) = self.load_save(&dir_name, &character).await {
                    message_count += save.history.len();
                }
            }

            infos.push(CampaignInfo {
                name: campaign.name,
                last_played: campaign.last_played,
                message_count,
            });
        }

        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }

    /// Character names (sanitized form) with a save document in the
    /// campaign.
    pub async fn list_characters(&self, campaign: &str) -> Result<Vec<String>, PersistError> {
        let dir = self.campaign_dir(campaign);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if let Some(stem) = file_name
                .strip_prefix("character_")
                .and_then(|rest| rest.strip_suffix(".json"))
            {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Delete a campaign's entire directory. An absent directory is a
    /// success, not an error.
    pub async fn reset_campaign(&self, name: &str) -> Result<ResetOutcome, PersistError> {
        let dir = self.campaign_dir(name);
        if !dir.exists() {
            return Ok(ResetOutcome::NothingToDelete);
        }
        fs::remove_dir_all(&dir).await?;
        Ok(ResetOutcome::Deleted)
    }
}

async fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "could not read document");
            }
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "malformed document treated as absent");
            None
        }
    }
}

async fn write_document<T: Serialize>(path: &Path, doc: &T) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(doc)?;
    fs::write(path, content).await?;
    Ok(())
}
