//! Property tests for rules that must hold for any board.

use std::sync::Arc;

use proptest::prelude::*;

use lane_battle::battle::{BattleBuilder, FightOptions, GameSnapshot, GameTurnState, Strike};
use lane_battle::cards::{Ability, AbilityKind, CardCatalog, CardTemplate, Deck};
use lane_battle::core::PlayerId;

fn catalog() -> Arc<CardCatalog> {
    let mut catalog = CardCatalog::standard();
    catalog.register(CardTemplate::new("Warden", 1, 1, 1).with_ability(AbilityKind::ShacklesLastExtraTurn));
    catalog.register(CardTemplate::new("Assassin", 1, 1, 1).with_ability(AbilityKind::Deathtouch));
    catalog.register(CardTemplate::new("Tank", 1, 0, 1));
    Arc::new(catalog)
}

fn deck() -> Deck {
    Deck::new(
        "props",
        [
            "Sokka", "Suki", "Momo", "Zuko", "Katara", "Appa", "Ty Lee", "Mai", "Jet", "Toph", "Iroh", "Azula",
        ],
    )
}

/// A whole game where both players dump their first card each turn.
fn play_game(seed: u64, turns: u32) -> GameTurnState {
    let mut state = BattleBuilder::new()
        .deck(PlayerId::new(0), deck())
        .deck(PlayerId::new(1), deck())
        .random_lane_rewards()
        .build(seed);
    state.start_game();
    for _ in 0..turns {
        if state.is_over() {
            break;
        }
        for player in PlayerId::ALL {
            let card = state.hand(player).front().map(|c| c.id);
            if let (Some(card), Some(lane)) = (card, state.random_lane_with_room(player)) {
                state.play_card(player, card, lane);
            }
        }
        state.roll_turn();
    }
    state
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_hand_never_exceeds_cap(draws in 0usize..30) {
        let cards: Vec<&str> = std::iter::repeat("Sokka").take(20).collect();
        let p0 = PlayerId::new(0);
        let mut state = BattleBuilder::new().deck(p0, Deck::new("pile", cards)).build(1);

        for _ in 0..draws {
            state.draw_card(p0);
            prop_assert!(state.hand(p0).len() <= 7);
        }

        let expected = (3 + draws).min(7);
        prop_assert_eq!(state.hand(p0).len(), expected);
        prop_assert_eq!(state.draw_pile(p0).len(), 20 - expected);
    }

    #[test]
    fn prop_shackle_lasts_one_turn_per_warden(wardens in 0usize..=3) {
        let mut state = BattleBuilder::new().catalog(catalog()).build(2);
        let [p0, p1] = PlayerId::ALL;
        for _ in 0..wardens {
            state.play_card_from_template(p0, "Warden", 0).unwrap();
        }
        let shackler = state.play_card_from_template(p0, "generic_1drop", 0).unwrap();
        let target = state.play_card_from_template(p1, "generic_2drop", 0).unwrap();

        state.shackle(target, shackler);

        let shackled = state.character(target).unwrap().shackled_turns;
        prop_assert_eq!(shackled, 1 + wardens as u32);
    }

    #[test]
    fn prop_silence_disables_every_ability(index in 0usize..AbilityKind::ALL.len()) {
        let kind = AbilityKind::ALL[index];
        let mut catalog = CardCatalog::standard();
        catalog.register(CardTemplate::new("Subject", 2, 2, 3).with(Ability::new(kind)));
        let mut state = BattleBuilder::new().catalog(Arc::new(catalog)).build(3);
        let [p0, p1] = PlayerId::ALL;
        let subject = state.play_card_from_template(p0, "Subject", 1).unwrap();
        let silencer = state.play_card_from_template(p1, "generic_1drop", 1).unwrap();
        state.character_mut(subject).unwrap().pump(4, 4);

        state.silence(subject, silencer);

        let c = state.character(subject).unwrap();
        prop_assert!(c.silenced);
        prop_assert!(!c.has_ability(kind));
        prop_assert_eq!(c.current_attack, 2);
        prop_assert_eq!(c.max_health, 3);
        prop_assert_eq!(c.current_health, 3);
    }

    #[test]
    fn prop_deathtouch_always_kills(health in 1i32..60, shielded in any::<bool>()) {
        let mut state = BattleBuilder::new().catalog(catalog()).build(4);
        let [p0, p1] = PlayerId::ALL;
        let assassin = state.play_card_from_template(p0, "Assassin", 2).unwrap();
        let tank = state.play_card_from_template(p1, "Tank", 2).unwrap();
        {
            let c = state.character_mut(tank).unwrap();
            c.current_health = health;
            c.max_health = health;
        }
        if shielded {
            state.gain_shield(tank);
        }

        prop_assert_eq!(state.strike(assassin, tank), Strike::Lethal);
        state.fight(assassin, tank, FightOptions::default());

        prop_assert!(!state.exists(tank));
        prop_assert!(state.exists(assassin));
    }

    #[test]
    fn prop_same_seed_same_game(seed in any::<u64>()) {
        let first = play_game(seed, 9);
        let second = play_game(seed, 9);

        prop_assert_eq!(first.snapshot(), second.snapshot());
        prop_assert_eq!(first.winner(), first.compute_winner());
    }

    #[test]
    fn prop_snapshot_survives_json(seed in any::<u64>(), turns in 0u32..6) {
        let state = play_game(seed, turns);
        let original = state.snapshot();

        let json = serde_json::to_string(&original).unwrap();
        let decoded: GameSnapshot = serde_json::from_str(&json).unwrap();
        let restored = GameTurnState::from_snapshot(decoded, state.catalog().clone()).unwrap();

        prop_assert_eq!(restored.snapshot(), original);
    }
}
