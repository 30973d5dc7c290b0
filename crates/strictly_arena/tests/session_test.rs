//! Tests for session management and recommendations.

use std::time::Duration;
use strictly_arena::{MAX_ASYNC_DEPTH, SeatKind, SessionError, SessionManager, StartingPolicy};
use strictly_infinite::{GameRules, Player, deserialize};

fn manager_with_game(rules: GameRules) -> SessionManager {
    let manager = SessionManager::new();
    manager
        .create_session("g1".to_string(), rules, StartingPolicy::Fixed(Player::X))
        .expect("created");
    manager
        .register_player("g1", "alice".to_string(), "Alice".to_string(), SeatKind::Human)
        .expect("alice seated");
    manager
        .register_player("g1", "bob".to_string(), "Bob".to_string(), SeatKind::Human)
        .expect("bob seated");
    manager
}

#[test]
fn test_duplicate_game_is_rejected() {
    let manager = manager_with_game(GameRules::classic());
    let err = manager
        .create_session("g1".to_string(), GameRules::classic(), StartingPolicy::Random)
        .unwrap_err();
    assert!(matches!(err, SessionError::GameExists(id) if id == "g1"));
}

#[test]
fn test_unknown_game() {
    let manager = SessionManager::new();
    assert!(matches!(
        manager.submit_move("nope", "alice", 0),
        Err(SessionError::GameNotFound(_))
    ));
    assert!(manager.get_session("nope").expect("lock").is_none());
}

#[test]
fn test_infinite_game_through_manager() {
    let manager = manager_with_game(GameRules::infinite());
    let script = [("alice", 0), ("bob", 4), ("alice", 1), ("bob", 8), ("alice", 5), ("bob", 7)];
    for (player, index) in script {
        manager.submit_move("g1", player, index).expect("legal");
    }

    let text = manager.submit_move("g1", "alice", 6).expect("legal");
    let state = deserialize(&text).expect("decodes");
    assert_eq!(state.live_pieces(Player::X).len(), 3);
    assert_eq!(
        manager.get_session("g1").expect("lock").expect("exists").state,
        state
    );
}

#[test]
fn test_remove_and_list() {
    let manager = manager_with_game(GameRules::classic());
    assert_eq!(manager.list_sessions().expect("lock"), vec!["g1".to_string()]);
    assert!(manager.remove_session("g1").expect("lock").is_some());
    assert!(manager.list_sessions().expect("lock").is_empty());
}

#[test]
fn test_reset_session() {
    let manager = manager_with_game(GameRules::classic());
    manager.submit_move("g1", "alice", 4).expect("legal");
    manager
        .reset_session("g1", StartingPolicy::Fixed(Player::O))
        .expect("reset");

    let session = manager.get_session("g1").expect("lock").expect("exists");
    assert!(session.state.ledger().is_empty());
    assert_eq!(session.seat_to_act().map(|s| s.id.as_str()), Some("bob"));
}

#[test]
fn test_concurrent_submissions_apply_once() {
    let manager = manager_with_game(GameRules::classic());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = manager.clone();
            std::thread::spawn(move || manager.submit_move("g1", "alice", 4).is_ok())
        })
        .collect();
    let accepted = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .filter(|ok| *ok)
        .count();

    assert_eq!(accepted, 1);
    let session = manager.get_session("g1").expect("lock").expect("exists");
    assert_eq!(session.state.ledger().len(), 1);
}

#[test]
fn test_recommend_finds_win() {
    let manager = manager_with_game(GameRules::classic());
    let mut text = String::new();
    for (player, index) in [("alice", 0), ("bob", 3), ("alice", 1), ("bob", 4)] {
        text = manager.submit_move("g1", player, index).expect("legal");
    }
    assert_eq!(manager.recommend(&text, Some(3)).expect("valid"), Some(2));
}

#[test]
fn test_recommend_rejects_corrupt_state() {
    let manager = SessionManager::new();
    assert!(matches!(
        manager.recommend("{\"currentPlayer\": \"X\"}", None),
        Err(SessionError::Codec(_))
    ));
}

#[tokio::test]
async fn test_recommend_async_matches_sync() {
    let manager = manager_with_game(GameRules::infinite()).with_advisor_depth(4);
    let text = manager.submit_move("g1", "alice", 4).expect("legal");

    let sync = manager.recommend(&text, None).expect("valid");
    let async_result = manager
        .recommend_async(text, None, Duration::from_secs(30))
        .await
        .expect("finished in time");
    assert_eq!(sync, async_result);
    assert!(async_result.is_some());
}

#[tokio::test]
async fn test_recommend_async_times_out() {
    let manager = manager_with_game(GameRules::infinite());
    let text = manager.submit_move("g1", "alice", 4).expect("legal");

    // A deep infinite search cannot finish in a nanosecond.
    let result = manager
        .recommend_async(text, Some(7), Duration::from_nanos(1))
        .await;
    assert!(matches!(result, Err(SessionError::TimedOut(_))));
}

#[tokio::test]
async fn test_recommend_async_caps_requested_depth() {
    let manager = manager_with_game(GameRules::classic());
    let text = manager.submit_move("g1", "alice", 0).expect("legal");

    let capped = manager.recommend(&text, Some(MAX_ASYNC_DEPTH)).expect("valid");
    let async_result = manager
        .recommend_async(text, Some(u32::MAX), Duration::from_secs(30))
        .await
        .expect("finished in time");
    assert_eq!(async_result, capped);
    assert!(async_result.is_some());
}
