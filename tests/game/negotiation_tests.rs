//! Draw and rematch offer scenarios

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::Instant;
use tokio_test::{assert_pending, assert_ready_eq};

use chess_sessions::application::session::{
    AckType, NegotiationOutcome, NegotiationTimer, SessionEvent, DRAW_OFFER_WINDOW,
    REMATCH_OFFER_WINDOW,
};
use chess_sessions::domain::entities::{GameEndType, GameOutcome, Phase};
use chess_sessions::domain::value_objects::Side;

use crate::common::*;

#[tokio::test(start_paused = true)]
async fn test_draw_offer_expires_after_ten_seconds() {
    let service = game_service(None);
    let session = started_game(&service).await;
    let mut events = session.subscribe();
    let started = Instant::now();

    let ack = session.offer_draw(WHITE).await;

    assert_eq!(ack, AckType::DrawOfferExpired);
    assert_eq!(started.elapsed(), DRAW_OFFER_WINDOW);
    assert_eq!(session.phase(), Phase::Active);

    let offer = events.recv().await.unwrap();
    assert_eq!(offer.target.as_deref(), Some(BLACK));
    assert!(matches!(offer.event, SessionEvent::DrawOffer(_)));
    match next_event(&mut events).await {
        SessionEvent::DrawOfferTimeout(timeout) => assert_eq!(timeout.offered_by, Side::White),
        other => panic!("expected DRAW_OFFER_TIMEOUT, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_draw_accepted_just_before_deadline() {
    let service = game_service(None);
    let session = started_game(&service).await;

    let offer = {
        let session = session.clone();
        tokio::spawn(async move { session.offer_draw(WHITE).await })
    };
    tokio::time::sleep(Duration::from_millis(9900)).await;

    assert_eq!(session.respond_to_draw(BLACK, true), AckType::Success);
    assert_eq!(offer.await.unwrap(), AckType::Success);

    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.outcome(), Some(GameOutcome::Draw));
}

#[tokio::test]
async fn test_draw_declined() {
    let service = game_service(None);
    let session = started_game(&service).await;
    let mut events = session.subscribe();

    let mut offer = tokio_test::task::spawn(session.offer_draw(WHITE));
    assert_pending!(offer.poll());

    // The offerer cannot answer their own offer
    assert_eq!(session.respond_to_draw(WHITE, true), AckType::NotUserTurn);
    assert_eq!(session.respond_to_draw(BLACK, false), AckType::Success);
    assert_ready_eq!(offer.poll(), AckType::DrawOfferDeclined);

    assert_eq!(session.phase(), Phase::Active);
    assert_eq!(session.respond_to_draw(BLACK, true), AckType::DrawNotOffered);
    assert!(matches!(next_event(&mut events).await, SessionEvent::DrawOffer(_)));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_draw_accepted_finishes_the_game() {
    let service = game_service(None);
    let session = started_game(&service).await;
    let mut events = session.subscribe();

    let mut offer = tokio_test::task::spawn(session.offer_draw(BLACK));
    assert_pending!(offer.poll());
    assert_eq!(session.respond_to_draw(WHITE, true), AckType::Success);
    assert_ready_eq!(offer.poll(), AckType::Success);

    let received: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|routed| routed.event)
        .collect();
    assert!(matches!(received[0], SessionEvent::DrawOffer(_)));
    match &received[1] {
        SessionEvent::GameFinished(record) => {
            assert_eq!(record.outcome, GameOutcome::Draw);
            assert_eq!(record.end, GameEndType::DrawAgreement);
        }
        other => panic!("expected GAME_FINISHED, got {other:?}"),
    }
    assert!(matches!(received[2], SessionEvent::DrawOfferAccepted(_)));
}

#[tokio::test]
async fn test_second_offer_while_pending() {
    let service = game_service(None);
    let session = started_game(&service).await;

    let mut first = tokio_test::task::spawn(session.offer_draw(WHITE));
    assert_pending!(first.poll());

    assert_eq!(session.offer_draw(BLACK).await, AckType::OfferPending);
    assert_eq!(session.offer_draw("Ann").await, AckType::NotUserTurn);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_draw_offer_is_closed() {
    let service = game_service(None);
    let session = started_game(&service).await;
    let mut events = session.subscribe();

    let offer = {
        let session = session.clone();
        tokio::spawn(async move { session.offer_draw(WHITE).await })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    offer.abort();
    assert!(offer.await.unwrap_err().is_cancelled());

    assert!(matches!(next_event(&mut events).await, SessionEvent::DrawOffer(_)));
    assert!(matches!(
        next_event(&mut events).await,
        SessionEvent::DrawOfferTimeout(_)
    ));

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(session.respond_to_draw(BLACK, true), AckType::DrawNotOffered);
    assert_eq!(session.phase(), Phase::Active);
    assert_eq!(session.outcome(), None);

    let mut again = tokio_test::task::spawn(session.offer_draw(BLACK));
    assert_pending!(again.poll());
    assert_eq!(session.respond_to_draw(WHITE, false), AckType::Success);
    assert_ready_eq!(again.poll(), AckType::DrawOfferDeclined);
}

#[tokio::test]
async fn test_pending_draw_offer_closes_when_the_game_ends() {
    let service = game_service(None);
    let session = started_game(&service).await;
    let mut events = session.subscribe();

    let mut offer = tokio_test::task::spawn(session.offer_draw(WHITE));
    assert_pending!(offer.poll());

    assert_eq!(session.resign(BLACK), AckType::Success);
    assert_ready_eq!(offer.poll(), AckType::GameHasFinished);

    let names: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|routed| routed.event.event_name())
        .collect();
    assert_eq!(names, vec!["DRAW_OFFER", "RESIGNATION", "GAME_FINISHED"]);
    assert_eq!(session.outcome(), Some(GameOutcome::WhiteWins));
}

#[tokio::test(start_paused = true)]
async fn test_rematch_offer_expires_after_fifteen_seconds() {
    let service = game_service(None);
    let session = started_game(&service).await;
    session.resign(BLACK);
    let started = Instant::now();

    assert_eq!(session.offer_rematch(BLACK).await, AckType::RematchOfferExpired);
    assert_eq!(started.elapsed(), REMATCH_OFFER_WINDOW);
}

#[tokio::test(start_paused = true)]
async fn test_negotiation_timer_cancel_is_idempotent() {
    let (timer, mut handle) = NegotiationTimer::new();
    let waiting = tokio::spawn(timer.start_and_await(DRAW_OFFER_WINDOW));

    assert!(handle.cancel(true));
    assert!(!handle.cancel(false));

    assert_eq!(
        waiting.await.unwrap(),
        NegotiationOutcome::Responded { accepted: true }
    );
}
