//! Lane combat integration tests.
//!
//! Each test stages a lane by hand, rolls a single turn and checks tower
//! damage and survivors.

use std::sync::Arc;

use lane_battle::battle::{BattleBuilder, GameTurnState, LaneReward};
use lane_battle::cards::{AbilityKind, CardCatalog, CardTemplate};
use lane_battle::core::PlayerId;

fn catalog() -> Arc<CardCatalog> {
    let mut catalog = CardCatalog::standard();
    catalog.register(CardTemplate::new("Grunt", 1, 2, 3));
    catalog.register(CardTemplate::new("Wall", 2, 0, 8).with_ability(AbilityKind::Defender));
    catalog.register(CardTemplate::new("Raider", 2, 2, 4).with_ability(AbilityKind::Attacker));
    catalog.register(CardTemplate::new("Brute", 3, 5, 5));
    Arc::new(catalog)
}

fn state(seed: u64) -> GameTurnState {
    BattleBuilder::new().catalog(catalog()).build(seed)
}

#[test]
fn test_defender_soaks_every_attack() {
    for seed in 0..8 {
        let mut state = state(seed);
        let [p0, p1] = PlayerId::ALL;
        let grunts = [
            state.play_card_from_template(p0, "Grunt", 0).unwrap(),
            state.play_card_from_template(p0, "Grunt", 0).unwrap(),
        ];
        let wall = state.play_card_from_template(p1, "Wall", 0).unwrap();

        state.roll_turn();

        let lane = &state.lanes()[0];
        assert_eq!(lane.damage[p0], 0);
        assert_eq!(lane.damage[p1], 0);
        // A 0-attack wall never swings and never hurts its attackers.
        assert_eq!(state.character(wall).unwrap().current_health, 4);
        for grunt in grunts {
            assert_eq!(state.character(grunt).unwrap().current_health, 3);
        }
    }
}

#[test]
fn test_attacker_fights_and_hits_tower() {
    for seed in 0..8 {
        let mut state = state(seed);
        let [p0, p1] = PlayerId::ALL;
        let raider = state.play_card_from_template(p0, "Raider", 1).unwrap();
        let grunt = state.play_card_from_template(p1, "Grunt", 1).unwrap();

        state.roll_turn();

        let lane = &state.lanes()[1];
        assert_eq!(lane.damage[p0], 2);
        assert_eq!(lane.damage[p1], 0);
        assert!(!state.exists(raider));
        assert!(!state.exists(grunt));
    }
}

#[test]
fn test_lone_character_hits_tower_and_earns_reward() {
    let mut state = BattleBuilder::new()
        .catalog(catalog())
        .lane_reward(2, LaneReward::named("Full Moon Bay"))
        .build(5);
    let p0 = PlayerId::new(0);
    state.play_card_from_template(p0, "Brute", 2).unwrap();
    assert!(state.hand(p0).is_empty());

    state.roll_turn();

    let lane = &state.lanes()[2];
    assert_eq!(lane.damage[p0], 5);
    assert!(lane.earned_reward[p0]);
    assert!(!lane.earned_reward[PlayerId::new(1)]);
    assert_eq!(state.hand(p0).len(), 1);

    // A milestone only pays out once.
    state.roll_turn();
    assert_eq!(state.lanes()[2].damage[p0], 10);
    assert_eq!(state.hand(p0).len(), 1);
}

#[test]
fn test_shackled_character_skips_its_attack() {
    let mut state = state(3);
    let [p0, p1] = PlayerId::ALL;
    let brute = state.play_card_from_template(p0, "Brute", 0).unwrap();
    let jailer = state.play_card_from_template(p1, "generic_1drop", 0).unwrap();
    state.shackle(brute, jailer);

    state.roll_turn();

    assert_eq!(state.lanes()[0].damage[p0], 0);
    assert_eq!(state.character(brute).unwrap().shackled_turns, 0);
    // The 1/2 attacked into the brute and died to the counter.
    assert!(!state.exists(jailer));
}
