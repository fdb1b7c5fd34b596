//! Clock scenarios through a live session

use std::time::Duration;

use pretty_assertions::assert_eq;

use chess_sessions::application::session::{AckType, SessionEvent};
use chess_sessions::domain::entities::{GameEndType, GameOutcome, Phase};
use chess_sessions::domain::value_objects::{Side, TimeControl};

use crate::common::*;

#[tokio::test(start_paused = true)]
async fn test_increment_accumulates_without_elapsed_time() {
    // 6 s + 5 s; knights shuffle with no time passing
    let session = session_with(TimeControl::from_secs(6, 5), None);
    let moves = [
        (WHITE, "g1", "f3"),
        (BLACK, "g8", "f6"),
        (WHITE, "f3", "g1"),
        (BLACK, "f6", "g8"),
        (WHITE, "g1", "f3"),
        (BLACK, "g8", "f6"),
        (WHITE, "f3", "g1"),
        (BLACK, "f6", "g8"),
        (WHITE, "g1", "f3"),
    ];
    for (player, from, to) in moves {
        assert_eq!(session.make_move(player, &mv(from, to)), AckType::Success);
    }

    assert_eq!(session.remaining_ms(Side::White), 31000.0);
    assert_eq!(session.remaining_ms(Side::Black), 26000.0);
}

#[tokio::test(start_paused = true)]
async fn test_clock_starts_on_first_move() {
    let session = session_with(TimeControl::from_secs(60, 0), None);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(session.remaining_ms(Side::White), 60000.0);
    assert!(!session.is_clock_running(Side::White));

    assert_eq!(session.make_move(WHITE, &mv("e2", "e4")), AckType::Success);
    assert!(session.is_clock_running(Side::Black));
    assert!(!session.is_clock_running(Side::White));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_publish_time_updates() {
    let session = session_with(TimeControl::from_secs(60, 0), None);
    let mut events = session.subscribe();
    session.make_move(WHITE, &mv("e2", "e4"));

    assert!(matches!(next_event(&mut events).await, SessionEvent::NewPosition(_)));
    match next_event(&mut events).await {
        SessionEvent::TimeUpdate(update) => {
            assert_eq!(update.side, Side::Black);
            assert_eq!(update.time_left_ms, 59000.0);
            assert_eq!(update.game_end, None);
        }
        other => panic!("expected TIME_UPDATE, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_sub_second_thinking_is_debited() {
    let session = session_with(TimeControl::from_secs(60, 0), None);
    session.make_move(WHITE, &mv("e2", "e4"));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(session.make_move(BLACK, &mv("e7", "e5")), AckType::Success);

    assert_eq!(session.remaining_ms(Side::Black), 59600.0);
    assert!(session.is_clock_running(Side::White));
}

#[tokio::test(start_paused = true)]
async fn test_flag_fall_finishes_the_game() {
    let session = session_with(TimeControl::from_secs(2, 0), None);
    let mut events = session.subscribe();
    session.make_move(WHITE, &mv("e2", "e4"));

    assert!(matches!(next_event(&mut events).await, SessionEvent::NewPosition(_)));
    match next_event(&mut events).await {
        SessionEvent::TimeUpdate(update) => {
            assert_eq!(update.side, Side::Black);
            assert_eq!(update.time_left_ms, 1000.0);
        }
        other => panic!("expected TIME_UPDATE, got {other:?}"),
    }
    match next_event(&mut events).await {
        SessionEvent::TimeUpdate(update) => {
            assert_eq!(update.side, Side::Black);
            assert_eq!(update.time_left_ms, 2000.0);
            assert_eq!(update.game_end, Some(GameEndType::TimeIsUp));
        }
        other => panic!("expected final TIME_UPDATE, got {other:?}"),
    }
    match next_event(&mut events).await {
        SessionEvent::GameFinished(record) => {
            assert_eq!(record.outcome, GameOutcome::WhiteWins);
            assert_eq!(record.end, GameEndType::TimeIsUp);
        }
        other => panic!("expected GAME_FINISHED, got {other:?}"),
    }

    assert_eq!(session.phase(), Phase::Finished);
    assert!(!session.is_clock_running(Side::White));
    assert!(!session.is_clock_running(Side::Black));
}

#[tokio::test(start_paused = true)]
async fn test_no_ticks_after_finish() {
    let session = session_with(TimeControl::from_secs(60, 0), None);
    session.make_move(WHITE, &mv("e2", "e4"));
    session.resign(WHITE);
    let mut events = session.subscribe();

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(events.try_recv().is_err());
    assert_eq!(session.remaining_ms(Side::Black), 60000.0);
}
