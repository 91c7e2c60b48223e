//! System-prompt composition.
//!
//! Pure functions of campaign, character, and summary. The prompt is
//! recomputed on every model call; nothing here is cached.

use crate::campaign::Campaign;
use crate::character::Character;

/// Fixed user prompt for the opening-scene call. Its input is never stored
/// as a user turn; only the reply enters the transcript.
pub const OPENING_PROMPT: &str =
    "Begin our adventure! Introduce the setting and give me my first choice.";

/// Fixed user instruction appended to the summarization window.
pub const SUMMARY_REQUEST: &str =
    "Provide a brief two to three sentence summary of the most important \
     events that have happened in our adventure so far.";

/// System instruction for summary calls.
pub fn summary_system_prompt() -> &'static str {
    include_str!("prompts/summarizer.txt")
}

/// Build the game-master system prompt.
///
/// Always includes the reply-length directive, the theme-weaving
/// instruction, the running summary, and the character's identity. Missing
/// fields degrade to "Unknown" rather than failing.
pub fn system_prompt(campaign: &Campaign, character: &Character, summary: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(include_str!("prompts/narrator_base.txt"));

    prompt.push_str("\n## Campaign\n");
    prompt.push_str(&format!("**Name:** {}\n", or_unknown(&campaign.name)));
    prompt.push_str(&format!("**Theme:** {}\n", or_unknown(&campaign.theme)));
    prompt.push_str(&format!(
        "**Description:** {}\n",
        or_unknown(&campaign.description)
    ));

    prompt.push_str("\n## Player Character\n");
    prompt.push_str(&format!("**Name:** {}\n", or_unknown(&character.name)));
    prompt.push_str(&format!("**Race:** {}\n", or_unknown(&character.race)));
    prompt.push_str(&format!("**Class:** {}\n", or_unknown(&character.class)));
    prompt.push_str(&format!(
        "**Background:** {}\n",
        or_unknown(&character.background)
    ));
    let s = &character.stats;
    prompt.push_str(&format!(
        "**Stats:** STR {} DEX {} CON {} INT {} CHA {}\n",
        s.strength, s.dexterity, s.constitution, s.intelligence, s.charisma
    ));
    if !character.race_abilities.is_empty() || !character.class_abilities.is_empty() {
        let abilities: Vec<&str> = character
            .race_abilities
            .iter()
            .chain(&character.class_abilities)
            .map(String::as_str)
            .collect();
        prompt.push_str(&format!("**Abilities:** {}\n", abilities.join(", ")));
    }

    prompt.push_str("\n## Story So Far\n");
    prompt.push_str(summary);
    prompt.push('\n');

    prompt
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        "Unknown"
    } else {
        value
    }
}
