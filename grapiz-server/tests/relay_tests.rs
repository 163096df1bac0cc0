//! End-to-end tests of the relay hub over its channels

use grapiz_core::{Move, PieceId, Position, Side};
use grapiz_server::{ClientEvent, HubHandle, RelayConfig, ServerEvent};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

fn hub() -> HubHandle {
    HubHandle::spawn(RelayConfig {
        seed: Some(42),
        ..RelayConfig::default()
    })
}

/// Next event that is not a head-count update
async fn next_event(rx: &mut UnboundedReceiver<ServerEvent>) -> ServerEvent {
    loop {
        let event = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("outbox closed");
        if !matches!(event, ServerEvent::ConnectedCount(_)) {
            return event;
        }
    }
}

async fn match_found(rx: &mut UnboundedReceiver<ServerEvent>) -> (String, Side) {
    match next_event(rx).await {
        ServerEvent::MatchFound { session_id, side } => (session_id, side),
        other => panic!("expected match-found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_two_seekers_are_paired() {
    let hub = hub();
    let (a, mut rx_a) = hub.register();
    let (b, mut rx_b) = hub.register();

    hub.send(a, ClientEvent::FindGame);
    assert_eq!(next_event(&mut rx_a).await, ServerEvent::Waiting);

    hub.send(b, ClientEvent::FindGame);
    let (id_a, side_a) = match_found(&mut rx_a).await;
    let (id_b, side_b) = match_found(&mut rx_b).await;
    assert_eq!(id_a, id_b);
    assert_eq!(side_a, Side::Blue);
    assert_eq!(side_b, Side::Red);

    let stats = hub.stats().await.unwrap();
    assert_eq!(stats.waiting, 0);
    assert_eq!(stats.sessions, 1);
}

#[tokio::test]
async fn test_moves_arrive_in_order() {
    let hub = hub();
    let (a, mut rx_a) = hub.register();
    let (b, mut rx_b) = hub.register();
    hub.send(a, ClientEvent::FindGame);
    hub.send(b, ClientEvent::FindGame);
    next_event(&mut rx_a).await; // waiting
    let (session_id, _) = match_found(&mut rx_a).await;
    match_found(&mut rx_b).await;
    next_event(&mut rx_b).await; // initial time-sync

    let moves: Vec<Move> = (1..=5)
        .map(|i| Move {
            piece_id: PieceId(i),
            from: Position::new(0, 0),
            to: Position::new(1, 0),
        })
        .collect();
    for mv in &moves {
        hub.send(a, ClientEvent::Move { session_id: session_id.clone(), mv: *mv });
    }
    for mv in moves {
        assert_eq!(next_event(&mut rx_b).await, ServerEvent::OpponentMove(mv));
    }
}

#[tokio::test]
async fn test_disconnect_notifies_peer() {
    let hub = hub();
    let (a, mut rx_a) = hub.register();
    let (b, mut rx_b) = hub.register();
    hub.send(a, ClientEvent::FindGame);
    hub.send(b, ClientEvent::FindGame);
    next_event(&mut rx_a).await; // waiting
    match_found(&mut rx_a).await;
    next_event(&mut rx_a).await; // initial time-sync
    match_found(&mut rx_b).await;

    hub.disconnect(b);
    assert_eq!(next_event(&mut rx_a).await, ServerEvent::OpponentDisconnected);

    let stats = hub.stats().await.unwrap();
    assert_eq!(stats.connections, 1);
    assert_eq!(stats.sessions, 0);
}

#[tokio::test]
async fn test_invalid_events_are_ignored() {
    let hub = hub();
    let (a, mut rx_a) = hub.register();
    hub.send(
        a,
        ClientEvent::Chat {
            session_id: "nosuch1".into(),
            text: "hello".into(),
        },
    );
    hub.send(a, ClientEvent::FindGame);
    // The bad chat produced nothing; the next real event is the waiting ack
    assert_eq!(next_event(&mut rx_a).await, ServerEvent::Waiting);
}
