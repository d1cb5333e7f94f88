use std::collections::HashMap;
use std::sync::Arc;

use cardroom::prelude::*;
use cardroom::telemetry;

type Player = ClientController<MemoryConnection>;

/// Connects a new player to the in-process server.
fn connect(state: &Arc<ServerState>, id: &str) -> Player {
    let (client_end, server_end) = MemoryConnection::pair();
    spawn_connection(server_end, Arc::clone(state));
    let channel = CommandChannel::open(client_end, ChannelConfig::default());
    ClientController::new(channel, PlayerId::new(id))
}

/// Waits for the first post-deal view pushed to a player.
async fn dealt_hand(
    events: &mut tokio::sync::broadcast::Receiver<ServerEvent>,
) -> Result<Vec<Card>, Box<dyn std::error::Error>> {
    loop {
        if let ServerEvent::HandsUpdated { hands, .. } = events.recv().await? {
            if hands.game_started {
                return Ok(hands.own().and_then(HandView::cards).unwrap_or_default().to_vec());
            }
        }
    }
}

fn show(cards: &[Card]) -> String {
    cards.iter().map(Card::to_string).collect::<Vec<_>>().join(" ")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing("cardroom=info,cardroom_table=info")?;

    let state = Arc::new(ServerState::new(GameConfig {
        min_players: 2,
        ..GameConfig::default()
    }));

    let alice = connect(&state, "alice");
    let bob = connect(&state, "bob");
    let carol = connect(&state, "carol");
    let mut bob_events = bob.events();
    let mut carol_events = carol.events();

    let game_id = alice.create_game("Alice", Some("demo table".into())).await?;
    for (player, name) in [(&bob, "Bob"), (&carol, "Carol")] {
        if player.join_if_open(game_id, name).await?.is_none() {
            return Err(format!("{name} could not join {game_id}").into());
        }
    }
    tracing::info!(%game_id, "everyone seated");

    let view = alice.deal(2, None).await?;
    let mut hands: HashMap<PlayerId, Vec<Card>> = HashMap::new();
    hands.insert(
        alice.player_id().clone(),
        view.own().and_then(HandView::cards).unwrap_or_default().to_vec(),
    );
    hands.insert(bob.player_id().clone(), dealt_hand(&mut bob_events).await?);
    hands.insert(carol.player_id().clone(), dealt_hand(&mut carol_events).await?);

    for (id, cards) in &hands {
        println!("{id} holds {} cards: {}", cards.len(), show(cards));
    }

    let players: HashMap<PlayerId, &Player> = [&alice, &bob, &carol]
        .into_iter()
        .map(|p| (p.player_id().clone(), p))
        .collect();

    let mut current = view
        .current()
        .map(|h| h.player_id.clone())
        .ok_or("no current player after deal")?;

    // Two rounds: everyone plays the first card they hold.
    for _ in 0..2 * players.len() {
        let cards: Vec<Card> = hands[&current].iter().take(1).copied().collect();
        let played = players[&current].play_hand(cards).await?;
        println!("{current} played {}", show(&played.played_hand.cards));

        let own = played.players_hands.own().and_then(HandView::cards).unwrap_or_default();
        hands.insert(current.clone(), own.to_vec());
        current = played
            .players_hands
            .current()
            .map(|h| h.player_id.clone())
            .ok_or("no current player")?;
    }

    // Out-of-turn plays are refused and change nothing.
    let bystander = players
        .keys()
        .find(|id| **id != current)
        .ok_or("no bystander")?;
    if let Err(e) = players[bystander].play_hand(Vec::new()).await {
        println!("{bystander} tried to play out of turn: {e}");
    }

    for player in [&alice, &bob, &carol] {
        player.shutdown().await?;
    }
    Ok(())
}
