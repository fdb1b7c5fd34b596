//! Lobby and orchestration scenarios

use std::sync::Arc;

use pretty_assertions::assert_eq;

use chess_sessions::application::dto::{GameRoomSearch, MakeMoveDto, StartGameRequest};
use chess_sessions::application::session::AckType;
use chess_sessions::domain::entities::{OpponentType, Phase, SideChoice};
use chess_sessions::domain::services::MoveSource;
use chess_sessions::domain::value_objects::{MoveKind, PromotionPiece, Side};
use chess_sessions::infrastructure::engine::LocalMoveSource;
use chess_sessions::shared::error::AppError;

use crate::common::*;

fn ai_request(side: SideChoice) -> StartGameRequest {
    StartGameRequest {
        username: WHITE.into(),
        opponent_type: OpponentType::Ai,
        opponent_name: Some("StockfishAi5".into()),
        side,
        is_visible: false,
        duration_secs: 300,
        increment_secs: 0,
    }
}

#[tokio::test(start_paused = true)]
async fn test_local_ai_answers_every_move() {
    let source: Arc<dyn MoveSource> = Arc::new(LocalMoveSource::new());
    let service = game_service(Some(source));

    let response = service.start_game(ai_request(SideChoice::White)).await.unwrap();
    let id = response.session_id;
    assert!(response.is_white);
    assert_eq!(response.opponent, "StockfishAi5");

    let ack = service.make_move(id, MakeMoveDto::new(WHITE, "e2", "e4")).await;

    assert_eq!(ack, AckType::Success);
    let state = service.current_state(id).unwrap();
    assert_eq!(state.side_to_move, Side::White);
    assert_eq!(state.username_black, "StockfishAi5");
}

#[tokio::test(start_paused = true)]
async fn test_local_ai_opens_as_white() {
    let source: Arc<dyn MoveSource> = Arc::new(LocalMoveSource::new());
    let service = game_service(Some(source));

    let response = service.start_game(ai_request(SideChoice::Black)).await.unwrap();

    let state = service.current_state(response.session_id).unwrap();
    assert_eq!(state.side_to_move, Side::Black);
    assert_eq!(state.username_white, "StockfishAi5");
}

#[tokio::test]
async fn test_ai_game_without_move_source_waits() {
    let service = game_service(None);

    let response = service.start_game(ai_request(SideChoice::Black)).await.unwrap();

    let session = service.registry().get(response.session_id).unwrap();
    assert_eq!(session.phase(), Phase::Active);
    assert_eq!(session.side_to_move(), Side::White);
}

#[tokio::test]
async fn test_joining_an_ai_game_does_not_announce_again() {
    let service = game_service(None);
    let response = service.start_game(ai_request(SideChoice::White)).await.unwrap();
    let id = response.session_id;
    let mut events = service.subscribe(id).unwrap();

    assert_eq!(service.join_game(id, WHITE), AckType::Success);
    assert_eq!(service.join_game(id, WHITE), AckType::Success);

    assert!(events.try_recv().is_err());
    assert_eq!(service.registry().get(id).unwrap().phase(), Phase::Active);
}

#[tokio::test]
async fn test_lobby_listing() {
    let service = game_service(None);
    let friend = service.start_game(friend_request()).await.unwrap();
    let open = service
        .start_game(StartGameRequest {
            username: "Ann".into(),
            opponent_type: OpponentType::Random,
            opponent_name: None,
            side: SideChoice::Random,
            is_visible: true,
            duration_secs: 180,
            increment_secs: 2,
        })
        .await
        .unwrap();

    let joinable_for_kim = GameRoomSearch {
        spectateable: false,
        joinable: true,
        requester: "Kim".into(),
    };
    let rooms = service.game_rooms(&joinable_for_kim);
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].session_id, open.session_id);
    assert_eq!(rooms[0].duration_secs, 180);
    assert_eq!(rooms[0].increment_secs, 2);

    let joinable_for_jim = GameRoomSearch {
        requester: BLACK.into(),
        ..joinable_for_kim
    };
    assert_eq!(service.game_rooms(&joinable_for_jim).len(), 2);

    service.join_game(friend.session_id, WHITE);
    service.join_game(friend.session_id, BLACK);
    let spectateable = GameRoomSearch {
        spectateable: true,
        ..GameRoomSearch::default()
    };
    let rooms = service.game_rooms(&spectateable);
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].session_id, friend.session_id);

    service.resign(friend.session_id, BLACK);
    assert_eq!(service.game_rooms(&GameRoomSearch::default()).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_move_requests_are_parsed() {
    let service = game_service(None);
    let session = started_game(&service).await;
    let id = session.id();

    let malformed = MakeMoveDto::new(WHITE, "z2", "e4");
    assert_eq!(service.make_move(id, malformed).await, AckType::MalformedMove);

    let anonymous = MakeMoveDto::new("", "e2", "e4");
    assert_eq!(service.make_move(id, anonymous).await, AckType::MalformedMove);
    assert_eq!(session.side_to_move(), Side::White);

    let wrong_kind = MakeMoveDto::new(WHITE, "e2", "e4")
        .with_kind(MoveKind::Promotion, Some(PromotionPiece::Queen));
    assert_eq!(service.make_move(id, wrong_kind).await, AckType::InvalidMove);

    assert_eq!(
        service.make_move(id, MakeMoveDto::new(WHITE, "e2", "e4")).await,
        AckType::Success
    );
}

#[tokio::test]
async fn test_validation_errors_surface_as_app_errors() {
    let service = game_service(None);
    let mut request = friend_request();
    request.username = "B".into();

    match service.start_game(request).await {
        Err(AppError::Validation(message)) => assert!(message.starts_with("username")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(matches!(service.subscribe(99), Err(AppError::NotFound(_))));
}
