//! Campaign documents and theme selection.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// The fixed theme vocabulary offered during campaign creation.
///
/// Free-text themes are also accepted; this list only feeds the menu and
/// random selection.
pub const THEMES: [&str; 6] = [
    "High Fantasy",
    "Dark Fantasy",
    "Sword & Sorcery",
    "Eldritch Mystery",
    "Age of Sail",
    "Post-Apocalyptic",
];

/// A persisted campaign setting.
///
/// One document per campaign directory; `last_played` is refreshed on every
/// save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub name: String,
    pub theme: String,
    pub description: String,
    pub created: String,
    pub last_played: String,
}

impl Campaign {
    /// Create a campaign with the given theme and description.
    pub fn new(
        name: impl Into<String>,
        theme: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = crate::now_rfc3339();
        Self {
            name: name.into(),
            theme: theme.into(),
            description: description.into(),
            created: now.clone(),
            last_played: now,
        }
    }

    /// Create a campaign with a randomly chosen theme.
    pub fn random(name: impl Into<String>) -> Self {
        let theme = *THEMES
            .choose(&mut rand::thread_rng())
            .unwrap_or(&THEMES[0]);
        Self::new(name, theme, default_description(theme))
    }
}

/// How to seed a campaign document when none exists on disk.
#[derive(Debug, Clone)]
pub enum CampaignSeed {
    /// Random theme with its stock description.
    Random,
    /// User-supplied theme and description.
    Custom { theme: String, description: String },
}

impl CampaignSeed {
    pub(crate) fn into_campaign(self, name: &str) -> Campaign {
        match self {
            CampaignSeed::Random => Campaign::random(name),
            CampaignSeed::Custom { theme, description } => {
                Campaign::new(name, theme, description)
            }
        }
    }
}

/// Stock description for each vocabulary theme.
pub fn default_description(theme: &str) -> &'static str {
    match theme {
        "High Fantasy" => "A realm of shining kingdoms, ancient forests, and old magic stirring.",
        "Dark Fantasy" => "A blighted land where hope is scarce and every bargain has a price.",
        "Sword & Sorcery" => "Lawless frontiers, crumbling temples, and steel settling arguments.",
        "Eldritch Mystery" => "A fog-bound town whose secrets are older than its founders admit.",
        "Age of Sail" => "Trade winds, rival crowns, and uncharted islands past the horizon.",
        "Post-Apocalyptic" => "Ruins of the old world picked over by scavengers and stranger things.",
        _ => "An untold setting awaiting its first chronicler.",
    }
}
