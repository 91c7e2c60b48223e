//! End-to-end session flows against a scripted gateway.

use std::sync::Arc;

use tempfile::TempDir;

use gm_core::testing::MockGateway;
use gm_core::{
    CampaignSeed, CampaignStore, Character, ContextStrategy, GameSession, Role, SessionConfig,
    SessionError,
};
use gm_gateway::ChatRole;

async fn open_session(
    tmp: &TempDir,
    mock: Arc<MockGateway>,
    config: SessionConfig,
) -> GameSession {
    GameSession::open(
        CampaignStore::new(tmp.path()),
        mock,
        config,
        CampaignSeed::Custom {
            theme: "High Fantasy".to_string(),
            description: "A city of coin and knives.".to_string(),
        },
        "Hero",
        || Character::random("Hero"),
    )
    .await
    .expect("open session")
}

#[tokio::test]
async fn opening_scene_appends_exactly_one_assistant_record() {
    let tmp = TempDir::new().expect("temp dir");
    let mock = Arc::new(MockGateway::new().reply("You stand before the city gates."));
    let mut session = open_session(&tmp, Arc::clone(&mock), SessionConfig::new("Dragon Heist")).await;

    let reply = session.ensure_opening_scene().await.expect("opening scene");
    assert_eq!(reply.as_deref(), Some("You stand before the city gates."));

    // Exactly one model call, exactly one record, and it is the reply; the
    // opening prompt itself is never stored as a user turn.
    assert_eq!(mock.call_count(), 1);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().full()[0].role, Role::Assistant);

    // A second call is a no-op on an existing transcript.
    let again = session.ensure_opening_scene().await.expect("no-op");
    assert!(again.is_none());
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn two_turns_yield_four_records_in_order() {
    let tmp = TempDir::new().expect("temp dir");
    let mock = Arc::new(
        MockGateway::new()
            .reply("Dust swirls as you search.")
            .reply("You find a trapdoor."),
    );
    let mut session = open_session(&tmp, mock, SessionConfig::new("c1")).await;

    session.player_turn("I search the room").await.expect("turn 1");
    session.player_turn("I search the room").await.expect("turn 2");

    let records = session.history().full();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].role, Role::User);
    assert_eq!(records[1].role, Role::Assistant);
    assert_eq!(records[2].role, Role::User);
    assert_eq!(records[3].role, Role::Assistant);
    assert_eq!(records[0].content, "I search the room");
}

#[tokio::test]
async fn failed_turn_leaves_history_unchanged() {
    let tmp = TempDir::new().expect("temp dir");
    let mock = Arc::new(
        MockGateway::new()
            .reply("The tavern is quiet.")
            .failure("connection reset"),
    );
    let mut session = open_session(&tmp, mock, SessionConfig::new("c1")).await;

    session.player_turn("I enter the tavern").await.expect("turn 1");
    let before = session.history().len();

    let err = session.player_turn("I order an ale").await.unwrap_err();
    assert!(matches!(err, SessionError::Gateway(_)));
    assert_eq!(session.history().len(), before);

    // Disk agrees with memory: reloading shows no trace of the failed turn.
    let store = CampaignStore::new(tmp.path());
    let reloaded = store.load_save("c1", "Hero").await.expect("reload");
    assert_eq!(reloaded.history.len(), before);
}

#[tokio::test]
async fn failed_summary_retains_previous_summary() {
    let tmp = TempDir::new().expect("temp dir");
    let mock = Arc::new(
        MockGateway::new()
            .reply("You wake at the crossroads.")
            .failure("rate limited"),
    );
    let mut session = open_session(&tmp, mock, SessionConfig::new("c1")).await;

    session.player_turn("I look around").await.expect("turn");
    let before = session.summary().to_string();

    let after = session.regenerate_summary().await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn successful_summary_overwrites_and_persists() {
    let tmp = TempDir::new().expect("temp dir");
    let mock = Arc::new(
        MockGateway::new()
            .reply("You wake at the crossroads.")
            .reply("The hero woke at a crossroads."),
    );
    let mut session = open_session(&tmp, mock, SessionConfig::new("c1")).await;

    session.player_turn("I look around").await.expect("turn");
    let summary = session.regenerate_summary().await.to_string();
    assert_eq!(summary, "The hero woke at a crossroads.");

    let store = CampaignStore::new(tmp.path());
    let reloaded = store.load_save("c1", "Hero").await.expect("reload");
    assert_eq!(reloaded.summary, "The hero woke at a crossroads.");
}

#[tokio::test]
async fn auto_summary_fires_on_interval() {
    let tmp = TempDir::new().expect("temp dir");
    let mock = Arc::new(MockGateway::new());
    // Interval of 4 records = every second committed turn.
    let config = SessionConfig::new("c1").with_summary_interval(4);
    let mut session = open_session(&tmp, Arc::clone(&mock), config).await;

    session.player_turn("one").await.expect("turn");
    assert_eq!(mock.call_count(), 1);

    // Second turn crosses the 4-record threshold: turn call + summary call.
    session.player_turn("two").await.expect("turn");
    assert_eq!(mock.call_count(), 3);

    let last = mock.calls().pop().expect("summary call");
    assert!(last.system.contains("Summarize"));
}

#[tokio::test]
async fn initial_turn_does_not_store_the_input() {
    let tmp = TempDir::new().expect("temp dir");
    let mock = Arc::new(MockGateway::new().reply("A storm rolls in."));
    let mut session = open_session(&tmp, Arc::clone(&mock), SessionConfig::new("c1")).await;

    let reply = session.initial_turn("Set the opening scene").await.expect("initial");
    assert_eq!(reply, "A storm rolls in.");

    // The prompt reached the model as the final user turn...
    let call = &mock.calls()[0];
    assert_eq!(
        call.last_turn,
        Some((ChatRole::User, "Set the opening scene".to_string()))
    );
    // ...but only the assistant reply was stored.
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().full()[0].role, Role::Assistant);
}

#[tokio::test]
async fn bounded_context_sends_recent_records_only() {
    let tmp = TempDir::new().expect("temp dir");
    let mock = Arc::new(MockGateway::new());
    let config = SessionConfig::new("c1").with_context(ContextStrategy::Recent(2));
    let mut session = open_session(&tmp, Arc::clone(&mock), config).await;

    for input in ["one", "two", "three"] {
        session.player_turn(input).await.expect("turn");
    }

    // Third call saw 2 committed records + the staged input.
    assert_eq!(mock.calls()[2].turn_count, 3);
}

#[tokio::test]
async fn reopening_resumes_persisted_state() {
    let tmp = TempDir::new().expect("temp dir");
    {
        let mock = Arc::new(MockGateway::new().reply("You arrive at dusk."));
        let mut session = open_session(&tmp, mock, SessionConfig::new("c1")).await;
        session.player_turn("I arrive").await.expect("turn");
    }

    let mock = Arc::new(MockGateway::new());
    let session = open_session(&tmp, mock, SessionConfig::new("c1")).await;
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.campaign().theme, "High Fantasy");
}

#[tokio::test]
async fn status_sheet_touches_nothing() {
    let tmp = TempDir::new().expect("temp dir");
    let mock = Arc::new(MockGateway::new());
    let session = open_session(&tmp, Arc::clone(&mock), SessionConfig::new("c1")).await;

    let sheet = session.character_sheet();
    assert!(sheet.contains("Hero"));
    assert_eq!(mock.call_count(), 0);
    assert!(session.history().is_empty());
}
