//! End-to-end tests: client controllers talking to `serve_connection`
//! over in-memory connections.

use std::sync::Arc;
use std::time::Duration;

use cardroom::prelude::*;
use cardroom_protocol::{Codec, JsonCodec, RequestId, ServerMessage};
use tokio::sync::broadcast;

// =========================================================================
// Helpers
// =========================================================================

fn server() -> Arc<ServerState> {
    Arc::new(ServerState::new(GameConfig {
        deck_seed: Some(2024),
        ..GameConfig::default()
    }))
}

fn connect(state: &Arc<ServerState>, player: &str) -> ClientController<MemoryConnection> {
    let (client_end, server_end) = MemoryConnection::pair();
    spawn_connection(server_end, Arc::clone(state));
    let channel = CommandChannel::open(client_end, ChannelConfig::default());
    ClientController::new(channel, PlayerId::new(player))
}

/// Waits for the next `HandsUpdated` whose view satisfies `pred`.
async fn hands_where(
    rx: &mut broadcast::Receiver<ServerEvent>,
    pred: impl Fn(&PlayerHands) -> bool,
) -> PlayerHands {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let ServerEvent::HandsUpdated { hands, .. } = rx.recv().await.unwrap() {
                if pred(&hands) {
                    return hands;
                }
            }
        }
    })
    .await
    .expect("no matching hands update")
}

async fn next_played(rx: &mut broadcast::Receiver<ServerEvent>) -> PlayedHand {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let ServerEvent::HandPlayed { played_hand, .. } = rx.recv().await.unwrap() {
                return played_hand;
            }
        }
    })
    .await
    .expect("no hand played event")
}

fn kind(err: &ClientError) -> ErrorKind {
    err.rejection().expect("expected a rejection").kind
}

// =========================================================================
// Full game flow
// =========================================================================

#[tokio::test]
async fn test_three_player_game_flow() {
    let state = server();
    let alice = connect(&state, "alice");
    let bob = connect(&state, "bob");
    let carol = connect(&state, "carol");
    let mut alice_events = alice.events();
    let mut bob_events = bob.events();
    let mut carol_events = carol.events();

    let game_id = alice
        .create_game("Alice", Some("friday".into()))
        .await
        .unwrap();
    assert_eq!(
        bob.join_if_open(game_id, "Bob").await.unwrap().as_deref(),
        Some("friday")
    );
    assert_eq!(carol.join_game(game_id, "Carol").await.unwrap(), "friday");

    // Alice was told about both joins.
    let seated = hands_where(&mut alice_events, |h| h.hands.len() == 3).await;
    assert!(seated.own().unwrap().game_owner_button);

    let alice_view = alice.deal(2, Some(PlayerId::new("bob"))).await.unwrap();
    assert!(alice_view.game_started);
    assert_eq!(alice_view.own().unwrap().card_count(), 18);
    assert_eq!(alice_view.current().unwrap().player_id, PlayerId::new("carol"));
    for hand in &alice_view.hands[1..] {
        assert!(hand.cards().is_none());
        assert_eq!(hand.card_count(), 18);
    }

    let bob_view = hands_where(&mut bob_events, |h| h.game_started).await;
    assert_eq!(bob_view.own().unwrap().cards().unwrap().len(), 18);
    assert!(!bob_view.own().unwrap().game_owner_button);

    let carol_view = hands_where(&mut carol_events, |h| h.game_started).await;
    let card = carol_view.own().unwrap().cards().unwrap()[0];

    let played = carol.play_hand(vec![card]).await.unwrap();
    assert_eq!(played.played_hand.player_id, PlayerId::new("carol"));
    assert_eq!(played.players_hands.own().unwrap().card_count(), 17);
    assert_eq!(
        played.players_hands.current().unwrap().player_id,
        PlayerId::new("alice")
    );

    assert_eq!(next_played(&mut alice_events).await.cards, vec![card]);
    assert_eq!(next_played(&mut bob_events).await.cards, vec![card]);

    let alice_after = hands_where(&mut alice_events, |h| {
        h.current().is_some_and(|c| c.player_id == PlayerId::new("alice"))
    })
    .await;
    assert!(alice_after.own().unwrap().current_player);

    assert!(alice.game_status(game_id).await.unwrap());
}

#[tokio::test]
async fn test_ack_carries_only_callers_view() {
    let state = server();
    let alice = connect(&state, "alice");
    let bob = connect(&state, "bob");

    let game_id = alice.create_game("Alice", None).await.unwrap();
    bob.join_game(game_id, "Bob").await.unwrap();

    let view = alice.deal(0, None).await.unwrap();
    assert_eq!(view.player_id, PlayerId::new("alice"));
    let visible: Vec<_> = view.hands.iter().filter(|h| h.cards().is_some()).collect();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].player_id, PlayerId::new("alice"));
}

// =========================================================================
// Rejections
// =========================================================================

#[tokio::test]
async fn test_join_after_deal_is_rejected() {
    let state = server();
    let alice = connect(&state, "alice");
    let late = connect(&state, "dave");
    let mut notices = late.notices();

    let game_id = alice.create_game("Alice", None).await.unwrap();
    alice.deal(0, None).await.unwrap();

    assert_eq!(late.join_if_open(game_id, "Dave").await.unwrap(), None);
    assert!(matches!(notices.recv().await.unwrap(), ClientNotice::Alert { .. }));

    let err = late.join_game(game_id, "Dave").await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::GameAlreadyStarted);
    assert_eq!(late.game_id(), None);
}

#[tokio::test]
async fn test_unknown_game_is_game_not_found() {
    let state = server();
    let alice = connect(&state, "alice");

    let err = alice.game_status(GameId(4242)).await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::GameNotFound);

    let err = alice.join_game(GameId(4242), "Alice").await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::GameNotFound);
}

#[tokio::test]
async fn test_play_rejections_leave_game_intact() {
    let state = server();
    let alice = connect(&state, "alice");
    let bob = connect(&state, "bob");

    let game_id = alice.create_game("Alice", None).await.unwrap();
    bob.join_game(game_id, "Bob").await.unwrap();

    let err = alice.play_hand(vec![]).await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::GameNotStarted);

    // Dealer is Bob, so Alice leads.
    let view = alice.deal(0, Some(PlayerId::new("bob"))).await.unwrap();
    let mine = view.own().unwrap().cards().unwrap().to_vec();

    let err = bob.play_hand(vec![]).await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::NotYourTurn);

    // Two players, no jokers: Bob holds the other 26 cards.
    let not_mine = Rank::ALL
        .iter()
        .flat_map(|&rank| Suit::ALL.iter().map(move |&suit| Card::new(rank, suit)))
        .find(|c| !mine.contains(c))
        .unwrap();
    let err = alice.play_hand(vec![mine[0], not_mine]).await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::InvalidMove);

    let err = alice.deal(0, None).await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::GameAlreadyStarted);

    // Still Alice's turn with her full hand.
    let played = alice.play_hand(vec![mine[0]]).await.unwrap();
    assert_eq!(played.players_hands.own().unwrap().card_count(), 25);
}

#[tokio::test]
async fn test_oversized_joker_count_rejected_and_server_keeps_running() {
    let state = server();
    let alice = connect(&state, "alice");
    let game_id = alice.create_game("Alice", None).await.unwrap();

    let err = alice.deal(u32::MAX, None).await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::TooManyJokers);
    assert!(!alice.game_status(game_id).await.unwrap());

    let view = alice.deal(2, None).await.unwrap();
    assert_eq!(view.own().unwrap().card_count(), 54);
}

#[tokio::test]
async fn test_only_owner_may_deal() {
    let state = server();
    let alice = connect(&state, "alice");
    let bob = connect(&state, "bob");

    let game_id = alice.create_game("Alice", None).await.unwrap();
    bob.join_game(game_id, "Bob").await.unwrap();

    let err = bob.deal(0, None).await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::NotOwner);
    assert!(!bob.game_status(game_id).await.unwrap());

    alice.deal(0, None).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_player_id_rejected() {
    let state = server();
    let alice = connect(&state, "alice");
    let impostor = connect(&state, "alice");

    let game_id = alice.create_game("Alice", None).await.unwrap();
    let err = impostor.join_game(game_id, "Not Alice").await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::DuplicatePlayer);
}

#[tokio::test]
async fn test_concurrent_requests_on_one_connection() {
    let state = server();
    let alice = connect(&state, "alice");
    let game_id = alice.create_game("Alice", None).await.unwrap();

    let (a, b, c) = tokio::join!(
        alice.game_status(game_id),
        alice.game_status(GameId(999)),
        alice.game_status(game_id),
    );
    assert!(!a.unwrap());
    assert_eq!(kind(&b.unwrap_err()), ErrorKind::GameNotFound);
    assert!(!c.unwrap());
    assert_eq!(alice.channel().pending_count(), 0);
}

// =========================================================================
// Raw wire behaviour
// =========================================================================

async fn raw_reply(conn: &MemoryConnection) -> ServerMessage {
    let data = tokio::time::timeout(Duration::from_secs(2), conn.recv())
        .await
        .expect("no reply")
        .unwrap()
        .unwrap();
    JsonCodec.decode(&data).unwrap()
}

#[tokio::test]
async fn test_malformed_request_with_message_id_gets_bad_request() {
    let state = server();
    let (client, server_end) = MemoryConnection::pair();
    spawn_connection(server_end, state);

    client
        .send(br#"{"messageId": 31, "command": "teleport"}"#)
        .await
        .unwrap();

    let ServerMessage::Ack(ack) = raw_reply(&client).await else {
        panic!("expected ack");
    };
    assert_eq!(ack.message_id, RequestId(31));
    assert_eq!(ack.error.unwrap().kind, ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_malformed_request_without_message_id_is_skipped() {
    let state = server();
    let (client, server_end) = MemoryConnection::pair();
    spawn_connection(server_end, state);

    client.send(b"garbage").await.unwrap();
    client
        .send(br#"{"messageId": 2, "command": "server-game-status", "gameId": 1}"#)
        .await
        .unwrap();

    // The first reply answers the second frame.
    let ServerMessage::Ack(ack) = raw_reply(&client).await else {
        panic!("expected ack");
    };
    assert_eq!(ack.message_id, RequestId(2));
    assert_eq!(ack.error.unwrap().kind, ErrorKind::GameNotFound);
}

#[tokio::test]
async fn test_create_ack_wire_format() {
    let state = server();
    let (client, server_end) = MemoryConnection::pair();
    spawn_connection(server_end, Arc::clone(&state));

    client
        .send(
            br#"{"command":"create","playerId":"p1","playerName":"Ann","gameOwner":true,"messageId":1700000000000}"#,
        )
        .await
        .unwrap();

    let data = client.recv().await.unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&data).unwrap();
    assert_eq!(json["type"], "ack");
    assert_eq!(json["messageId"], 1_700_000_000_000u64);
    assert!(json["gameId"].is_u64());
    assert!(json.get("error").is_none());
    assert_eq!(state.table_count().await, 1);
}

#[tokio::test]
async fn test_client_hangup_ends_handler() {
    let state = server();
    let (client, server_end) = MemoryConnection::pair();
    let handler = spawn_connection(server_end, state);

    client.close().await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), handler)
        .await
        .expect("handler did not stop")
        .unwrap();
}
