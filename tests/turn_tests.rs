//! Turn loop integration tests.
//!
//! These drive `GameTurnState` only through its public API: building,
//! playing cards, rolling turns, and reading lanes back.

use std::sync::Arc;

use lane_battle::battle::BattleBuilder;
use lane_battle::cards::{AbilityKind, CardCatalog, CardTemplate, Deck};
use lane_battle::core::{BattleConfig, PlayerId};

fn catalog() -> Arc<CardCatalog> {
    let mut catalog = CardCatalog::standard();
    catalog.register(CardTemplate::new("Phoenix", 1, 1, 1).with_ability(AbilityKind::SwitchLanesInsteadOfDying));
    Arc::new(catalog)
}

/// Lanes split 1-1 with a tie in the third; total damage decides.
#[test]
fn test_final_turn_tiebreak_on_total_damage() {
    let mut state = BattleBuilder::new()
        .config(BattleConfig::default().with_final_turn(1))
        .build(1);
    let [p0, p1] = PlayerId::ALL;
    for (n, (ours, theirs)) in [(12, 3), (4, 9), (6, 6)].into_iter().enumerate() {
        let lane = state.lane_mut(n).unwrap();
        lane.damage[p0] = ours;
        lane.damage[p1] = theirs;
    }

    state.roll_turn();

    assert!(state.is_over());
    assert_eq!(state.lanes()[2].winner(), None);
    assert_eq!(state.winner(), Some(p0));

    // Rolling past the end changes nothing.
    state.roll_turn();
    assert_eq!(state.turn(), 1);
}

#[test]
fn test_exact_tie_has_no_winner() {
    let mut state = BattleBuilder::new()
        .config(BattleConfig::default().with_final_turn(1))
        .build(1);
    let [p0, p1] = PlayerId::ALL;
    let lane = state.lane_mut(0).unwrap();
    lane.damage[p0] = 5;
    lane.damage[p1] = 5;

    state.roll_turn();

    assert!(state.is_over());
    assert_eq!(state.winner(), None);
}

#[test]
fn test_fifth_card_into_full_lane_is_ignored() {
    let deck = Deck::new("fillers", ["Sokka", "Suki", "Momo", "Zuko"]);
    let mut state = BattleBuilder::new().deck(PlayerId::new(0), deck).build(3);
    let p0 = PlayerId::new(0);
    for _ in 0..4 {
        state.play_card_from_template(p0, "generic_1drop", 0).unwrap();
    }
    let card = state.hand(p0)[0].id;
    let hand_before = state.hand(p0).clone();

    assert_eq!(state.play_card(p0, card, 0), None);
    assert_eq!(state.play_card_from_template(p0, "generic_1drop", 0), None);

    assert_eq!(state.hand(p0), &hand_before);
    assert_eq!(state.lanes()[0].roster(p0).len(), 4);
}

fn kill(state: &mut lane_battle::battle::GameTurnState, id: lane_battle::core::EntityId) {
    let lane = state.character(id).unwrap().lane;
    state.character_mut(id).unwrap().current_health = 0;
    state.process_dying(lane);
}

#[test]
fn test_escape_resets_each_turn() {
    let mut state = BattleBuilder::new().catalog(catalog()).build(9);
    let p0 = PlayerId::new(0);
    let phoenix = state.play_card_from_template(p0, "Phoenix", 0).unwrap();

    kill(&mut state, phoenix);
    let moved = state.locate(phoenix).expect("first death is escaped");
    assert_ne!(moved.lane, 0);
    assert_eq!(state.character(phoenix).unwrap().current_health, 1);

    kill(&mut state, phoenix);
    assert!(!state.exists(phoenix));

    let second = state.play_card_from_template(p0, "Phoenix", 1).unwrap();
    kill(&mut state, second);
    assert!(state.exists(second));

    state.roll_turn();
    kill(&mut state, second);
    assert!(state.exists(second), "escape flag resets at start of turn");
}

#[test]
fn test_mana_tracks_turn_number() {
    let mut state = BattleBuilder::new().build(2);
    state.start_game();
    for expected in 1..=4 {
        for player in PlayerId::ALL {
            assert_eq!(state.mana(player), expected);
        }
        state.roll_turn();
    }
}

#[test]
fn test_draws_stop_at_hand_cap() {
    let cards: Vec<&str> = std::iter::repeat("Sokka").take(15).collect();
    let mut state = BattleBuilder::new().deck(PlayerId::new(0), Deck::new("big", cards)).build(6);
    let p0 = PlayerId::new(0);

    for _ in 0..10 {
        state.draw_card(p0);
    }

    assert_eq!(state.hand(p0).len(), 7);
    assert_eq!(state.draw_pile(p0).len(), 8);
}

#[test]
fn test_start_game_spawns_ba_sing_se_recruits() {
    let mut state = BattleBuilder::new()
        .lane_rewards(["Ba Sing Se", "Omashu", "Full Moon Bay"])
        .build(12);

    state.start_game();

    for player in PlayerId::ALL {
        let roster = state.lanes()[0].roster(player);
        assert_eq!(roster.len(), 2);
        assert!(roster.iter().all(|c| c.name() == "Earth Kingdom Recruit"));
    }
}
