//! Terminal shell for the AI game master.
//!
//! ```bash
//! gm play [campaign_name]   # start or resume an adventure
//! gm campaigns              # list saved campaigns
//! gm help                   # usage
//! ```

mod wizard;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gm_core::{CampaignStore, Character, Command, GameSession, SessionConfig};
use gm_gateway::{gateway_from_env, Vendor};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args
        .get(1)
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "play".to_string());
    let campaign_name = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| "default".to_string());

    match command.as_str() {
        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        "campaigns" => list_campaigns().await,
        "play" => play(campaign_name).await,
        other => {
            eprintln!("Error: unknown command '{other}'");
            print_help();
            std::process::exit(1);
        }
    }
}

async fn play(campaign_name: String) -> Result<()> {
    let vendor = Vendor::from_env()?;
    if std::env::var(vendor.api_key_var()).is_err() {
        eprintln!("Error: {} environment variable not set.", vendor.api_key_var());
        eprintln!("Set it in a .env file or export it before playing.");
        std::process::exit(1);
    }
    let gateway = gateway_from_env(vendor)?;
    let store = CampaignStore::new(".");

    println!("==============================================");
    println!("  WELCOME TO YOUR ADVENTURE");
    println!("==============================================");

    let seed = match store.load_campaign(&campaign_name).await {
        Some(campaign) => {
            println!("\nLoaded campaign: {}", campaign.name);
            println!("Last played: {}", campaign.last_played);
            // Unused when the campaign document already exists.
            gm_core::CampaignSeed::Random
        }
        None => {
            println!("\nCreating new campaign: {campaign_name}");
            wizard::campaign_seed()?
        }
    };

    let existing = store.list_characters(&campaign_name).await?;
    let (character_name, created) = if existing.is_empty() {
        let character = wizard::create_character()?;
        (character.name.clone(), Some(character))
    } else {
        (wizard::pick_character(&existing)?, None)
    };

    let fallback_name = character_name.clone();
    let mut session = GameSession::open(
        store,
        gateway,
        SessionConfig::new(&campaign_name),
        seed,
        &character_name,
        move || created.unwrap_or_else(|| Character::random(fallback_name)),
    )
    .await?;

    println!("\nCommands: type your actions naturally, or");
    println!("  status  - view your character sheet");
    println!("  summary - recap the story so far");
    println!("  quit    - save a recap and exit");
    println!("==============================================");

    match session.ensure_opening_scene().await {
        Ok(Some(reply)) => println!("\nGM: {reply}"),
        Ok(None) => println!("\nWelcome back, {}!", session.character().name),
        Err(e) => {
            eprintln!("\nError: {e}");
            std::process::exit(1);
        }
    }

    loop {
        let input = wizard::prompt("\nYou: ")?;
        if input.is_empty() {
            continue;
        }

        match Command::parse(&input) {
            Command::Status => {
                println!("\n{}", session.character_sheet());
            }
            Command::Summary => {
                let summary = session.regenerate_summary().await;
                println!("\nStory so far:\n{summary}");
            }
            Command::Quit => {
                session.regenerate_summary().await;
                println!("\nThe adventure pauses here. Your progress is saved.");
                break;
            }
            Command::Action(text) => match session.player_turn(&text).await {
                Ok(reply) => println!("\nGM: {reply}"),
                Err(e) => {
                    // No retry: report once and end the session.
                    eprintln!("\nError: {e}");
                    break;
                }
            },
        }
    }

    Ok(())
}

async fn list_campaigns() -> Result<()> {
    let store = CampaignStore::new(".");
    let campaigns = store.list_campaigns().await?;

    if campaigns.is_empty() {
        println!("No saved campaigns found.");
        println!("Start a new adventure with: gm play");
        return Ok(());
    }

    println!("Saved campaigns:\n");
    for info in campaigns {
        println!("  {}", info.name);
        println!("    Last played: {}", info.last_played);
        println!("    Progress: {} messages\n", info.message_count);
    }
    Ok(())
}

fn print_help() {
    println!(
        "\
The AI game master.

Usage:
  gm play [campaign_name]   Start or continue an adventure (default: \"default\")
  gm campaigns              List saved campaigns
  gm help                   Show this message

In-game commands:
  status    View your character sheet
  summary   Get a recap of your adventure
  quit      Save a recap and exit

Your adventure is saved automatically after every action."
    );
}
