//! Interactive creation flows: campaign seeds and characters.

use std::io::{self, Write};

use gm_core::campaign::{default_description, THEMES};
use gm_core::character::{StatAllocation, StatName, KNOWN_CLASSES, KNOWN_RACES};
use gm_core::{CampaignSeed, Character};

/// Print a label and read one trimmed line from stdin.
pub fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_or(label: &str, default: &str) -> io::Result<String> {
    let value = prompt(&format!("{label} [{default}]: "))?;
    Ok(if value.is_empty() {
        default.to_string()
    } else {
        value
    })
}

/// Choose a theme and description for a new campaign.
pub fn campaign_seed() -> io::Result<CampaignSeed> {
    println!("\nChoose a theme:");
    for (i, theme) in THEMES.iter().enumerate() {
        println!("  {}. {theme}", i + 1);
    }
    println!("  {}. Something else (free text)", THEMES.len() + 1);
    println!("  (press Enter for a random theme)");

    let choice = prompt("> ")?;
    if choice.is_empty() {
        return Ok(CampaignSeed::Random);
    }

    let theme = match choice.parse::<usize>() {
        Ok(n) if (1..=THEMES.len()).contains(&n) => THEMES[n - 1].to_string(),
        Ok(n) if n == THEMES.len() + 1 => {
            let theme = prompt("Theme: ")?;
            if theme.is_empty() {
                return Ok(CampaignSeed::Random);
            }
            theme
        }
        // Anything unparseable is taken as a free-text theme.
        _ => choice,
    };

    let description = prompt_or("Describe the setting", default_description(&theme))?;
    Ok(CampaignSeed::Custom { theme, description })
}

/// Pick an existing character save by number.
pub fn pick_character(names: &[String]) -> io::Result<String> {
    if names.len() == 1 {
        return Ok(names[0].clone());
    }

    println!("\nChoose a character:");
    for (i, name) in names.iter().enumerate() {
        println!("  {}. {name}", i + 1);
    }

    loop {
        let choice = prompt("> ")?;
        match choice.parse::<usize>() {
            Ok(n) if (1..=names.len()).contains(&n) => return Ok(names[n - 1].clone()),
            _ => println!("Enter a number between 1 and {}.", names.len()),
        }
    }
}

/// Run the character-creation wizard.
pub fn create_character() -> io::Result<Character> {
    println!("\nLet's create your character!");

    let name = prompt_or("Character name", "Mysterious Adventurer")?;
    let race = prompt_or(&format!("Race ({})", KNOWN_RACES.join("/")), "Human")?;
    let class = prompt_or(&format!("Class ({})", KNOWN_CLASSES.join("/")), "Fighter")?;
    let background = prompt_or("Brief background", "A brave soul seeking adventure")?;

    let stats = loop {
        let mode = prompt_or("Stats: [r]andom or [p]oint-buy", "r")?;
        match mode.to_lowercase().as_str() {
            "r" | "random" => break gm_core::Stats::random(),
            "p" | "point-buy" | "pointbuy" => break point_buy()?,
            _ => println!("Enter 'r' or 'p'."),
        }
    };

    let character = Character::new(name, race, class, background, stats);
    println!(
        "\n{} the {} {} is ready for adventure!",
        character.name, character.race, character.class
    );
    Ok(character)
}

/// Allocate the stat budget one stat at a time. Unspent points are dumped
/// into constitution.
fn point_buy() -> io::Result<gm_core::Stats> {
    let mut alloc = StatAllocation::new();
    println!("\nSpend up to {} points. Leftovers go to Constitution.", alloc.remaining());

    for stat in StatName::all() {
        loop {
            let remaining = alloc.remaining();
            if remaining == 0 {
                break;
            }
            let value = prompt(&format!("{} (0-{remaining}): ", stat.name()))?;
            let points = match value.parse::<i32>() {
                Ok(p) => p,
                Err(_) => {
                    println!("Enter a number.");
                    continue;
                }
            };
            match alloc.spend(*stat, points) {
                Ok(()) => break,
                Err(e) => println!("{e}"),
            }
        }
    }

    Ok(alloc.finish())
}
