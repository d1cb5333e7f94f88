//! Hand view projection: what each player may see.
//!
//! A viewer sees their own cards; for everyone else only the name and a
//! card count. The owner-control flag is set only on the owner's own
//! seat in the owner's own view.

use cardroom_protocol::{HandContents, HandView, PlayerHands, PlayerId};

use crate::GameSession;

/// Views for every seated player, in turn order.
pub fn project_all(session: &GameSession) -> Vec<PlayerHands> {
    (0..session.player_count())
        .map(|viewer| project(session, viewer))
        .collect()
}

/// The view of a single player, or `None` if they are not seated.
pub fn project_for(session: &GameSession, viewer: &PlayerId) -> Option<PlayerHands> {
    session.seat_of(viewer).map(|seat| project(session, seat))
}

fn project(session: &GameSession, viewer: usize) -> PlayerHands {
    let players = session.players();
    let current = session.current_player_index();

    let hands = players
        .iter()
        .enumerate()
        .map(|(seat, player)| {
            let own = seat == viewer;
            let contents = if own {
                HandContents::Cards {
                    cards: player.hand.clone(),
                }
            } else {
                HandContents::Hidden {
                    cards_remaining: player.hand.len(),
                }
            };
            HandView {
                player_id: player.id.clone(),
                player_name: player.name.clone(),
                contents,
                current_player: current == Some(seat),
                game_owner_button: own && player.is_owner,
            }
        })
        .collect();

    PlayerHands {
        player_id: players[viewer].id.clone(),
        game_started: session.started(),
        hands,
    }
}

#[cfg(test)]
mod tests {
    use cardroom_protocol::GameId;

    use super::*;
    use crate::GameConfig;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    fn dealt_table() -> GameSession {
        let mut s = GameSession::new(
            GameId(1),
            "views",
            GameConfig {
                deck_seed: Some(5),
                ..GameConfig::default()
            },
        );
        s.add_player(pid("a"), "Alice", true).unwrap();
        s.add_player(pid("b"), "Bob", false).unwrap();
        s.add_player(pid("c"), "Carol", false).unwrap();
        s.deal(0, Some(&pid("a"))).unwrap();
        s
    }

    #[test]
    fn test_views_one_per_player_in_turn_order() {
        let views = project_all(&dealt_table());
        let viewers: Vec<_> = views.iter().map(|v| v.player_id.as_str()).collect();
        assert_eq!(viewers, ["a", "b", "c"]);
        for v in &views {
            assert_eq!(v.hands.len(), 3);
            assert!(v.game_started);
        }
    }

    #[test]
    fn test_view_shows_own_cards_only() {
        let s = dealt_table();
        for view in project_all(&s) {
            for hand in &view.hands {
                if hand.player_id == view.player_id {
                    assert_eq!(hand.cards(), s.hand(&hand.player_id));
                } else {
                    assert!(hand.cards().is_none(), "{} sees {}'s cards", view.player_id, hand.player_id);
                    assert_eq!(hand.card_count(), s.hand(&hand.player_id).unwrap().len());
                }
            }
        }
    }

    #[test]
    fn test_view_owner_button_only_for_owner_on_own_seat() {
        let s = dealt_table();
        let views = project_all(&s);

        let owner_view = &views[0];
        assert!(owner_view.own().unwrap().game_owner_button);
        assert!(owner_view.hands[1..].iter().all(|h| !h.game_owner_button));

        for view in &views[1..] {
            assert!(view.hands.iter().all(|h| !h.game_owner_button));
        }
    }

    #[test]
    fn test_view_marks_current_player_for_everyone() {
        // Dealer A, so B acts first.
        let views = project_all(&dealt_table());
        for view in &views {
            assert_eq!(view.current().unwrap().player_id, pid("b"));
            assert_eq!(view.hands.iter().filter(|h| h.current_player).count(), 1);
        }
    }

    #[test]
    fn test_view_before_deal_has_no_current_player() {
        let mut s = GameSession::new(GameId(1), "seating", GameConfig::default());
        s.add_player(pid("a"), "Alice", true).unwrap();
        let view = project_for(&s, &pid("a")).unwrap();
        assert!(!view.game_started);
        assert!(view.current().is_none());
        assert_eq!(view.own().unwrap().cards(), Some(&[][..]));
    }

    #[test]
    fn test_project_for_unknown_player_is_none() {
        assert!(project_for(&dealt_table(), &pid("zed")).is_none());
    }
}
