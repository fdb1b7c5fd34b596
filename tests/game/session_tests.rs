//! Session state machine scenarios

use pretty_assertions::assert_eq;

use chess_sessions::application::session::{AckType, SessionEvent};
use chess_sessions::domain::entities::{GameEndType, GameOutcome, Phase};
use chess_sessions::domain::value_objects::{Side, TimeControl};

use crate::common::*;

#[tokio::test(start_paused = true)]
async fn test_turn_is_checked_before_legality() {
    let service = game_service(None);
    let session = started_game(&service).await;

    // Jim tries to move on white's turn, legal or not
    assert_eq!(session.make_move(BLACK, &mv("e7", "e5")), AckType::NotUserTurn);
    assert_eq!(session.make_move(BLACK, &mv("e2", "e5")), AckType::NotUserTurn);
    assert_eq!(session.make_move("Ann", &mv("e2", "e4")), AckType::NotUserTurn);

    assert_eq!(session.make_move(WHITE, &mv("e2", "e5")), AckType::InvalidMove);
    assert_eq!(session.make_move(WHITE, &mv("e2", "e4")), AckType::Success);
    assert_eq!(session.side_to_move(), Side::Black);
}

#[tokio::test(start_paused = true)]
async fn test_resignation_after_first_move() {
    let service = game_service(None);
    let session = started_game(&service).await;
    let mut events = session.subscribe();

    assert_eq!(session.make_move(WHITE, &mv("e2", "e4")), AckType::Success);
    assert!(session.is_clock_running(Side::Black));

    assert_eq!(session.resign(BLACK), AckType::Success);

    match next_event(&mut events).await {
        SessionEvent::NewPosition(position) => {
            assert_eq!(position.side_to_move, Side::Black);
            assert_eq!(position.time_left_ms, 60000.0);
        }
        other => panic!("expected NEW_POSITION, got {other:?}"),
    }
    match next_event(&mut events).await {
        SessionEvent::Resignation(resignation) => assert_eq!(resignation.resigned, Side::Black),
        other => panic!("expected RESIGNATION, got {other:?}"),
    }
    match next_event(&mut events).await {
        SessionEvent::GameFinished(record) => {
            assert_eq!(record.outcome, GameOutcome::WhiteWins);
            assert_eq!(record.end, GameEndType::Resignation);
            assert_eq!(record.player_black.as_deref(), Some(BLACK));
        }
        other => panic!("expected GAME_FINISHED, got {other:?}"),
    }

    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.outcome(), Some(GameOutcome::WhiteWins));
    assert!(!session.is_clock_running(Side::White));
    assert!(!session.is_clock_running(Side::Black));
    assert_eq!(session.make_move(BLACK, &mv("e7", "e5")), AckType::GameHasFinished);
}

#[tokio::test]
async fn test_outcome_is_set_once() {
    let service = game_service(None);
    let session = started_game(&service).await;

    assert_eq!(session.resign(WHITE), AckType::Success);
    assert_eq!(session.resign(BLACK), AckType::GameHasFinished);
    assert_eq!(session.respond_to_draw(BLACK, true), AckType::GameHasFinished);

    assert_eq!(session.outcome(), Some(GameOutcome::BlackWins));
    assert!(session.finished_at().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_checkmate_ends_the_game() {
    let service = game_service(None);
    let session = started_game(&service).await;
    let mut events = session.subscribe();

    for (player, from, to) in [
        (WHITE, "f2", "f3"),
        (BLACK, "e7", "e5"),
        (WHITE, "g2", "g4"),
        (BLACK, "d8", "h4"),
    ] {
        assert_eq!(session.make_move(player, &mv(from, to)), AckType::Success);
    }

    let mut names = Vec::new();
    loop {
        let event = next_event(&mut events).await;
        names.push(event.event_name());
        if let SessionEvent::ReachedEndOfGame(end) = &event {
            assert_eq!(end.end, GameEndType::Checkmate);
            assert_eq!(end.side_to_move, Side::White);
        }
        if matches!(event, SessionEvent::GameFinished(_)) {
            break;
        }
    }

    assert_eq!(
        names,
        vec![
            "NEW_POSITION",
            "NEW_POSITION",
            "NEW_POSITION",
            "REACHED_END_OF_GAME",
            "GAME_FINISHED"
        ]
    );
    assert_eq!(session.outcome(), Some(GameOutcome::BlackWins));
}

#[tokio::test]
async fn test_stalemate_is_a_draw() {
    let session = session_with(
        TimeControl::from_secs(60, 0),
        Some("7k/8/5QK1/8/8/8/8/8 w - - 0 1"),
    );
    let players = session.players();
    let white = players.white.unwrap();

    assert_eq!(session.make_move(&white, &mv("f6", "f7")), AckType::Success);

    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.outcome(), Some(GameOutcome::Draw));
}

#[tokio::test]
async fn test_castling_and_promotion_through_uci() {
    let session = session_with(
        TimeControl::from_secs(60, 0),
        Some("r3k2r/pppqbppp/2np1n2/4p3/4P3/2NP1N2/PPPQBPPP/R3K2R w KQkq - 0 8"),
    );

    let castle = session.uci_to_move("e1g1").unwrap();
    assert_eq!(session.make_move(WHITE, &castle), AckType::Success);
    assert!(session.fen().ends_with("R4RK1 b kq - 1 8"));

    let session = session_with(TimeControl::from_secs(60, 0), Some("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1"));
    let promote = session.uci_to_move("e7e8q").unwrap();
    assert_eq!(session.make_move(WHITE, &promote), AckType::Success);
    assert!(session.fen().starts_with("4Q3/"));
}

#[tokio::test]
async fn test_spectating_requires_a_full_visible_game() {
    let service = game_service(None);
    let response = service.start_game(friend_request()).await.unwrap();
    let id = response.session_id;

    assert_eq!(service.spectate_game(id), AckType::NotSpectateable);

    service.join_game(id, WHITE);
    service.join_game(id, BLACK);

    assert_eq!(service.spectate_game(id), AckType::Success);
    assert_eq!(service.join_game(id, "Ann"), AckType::NotJoinable);
}
