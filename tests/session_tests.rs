//! Full games driven through the session layer.

use lane_battle::battle::{BattleBuilder, GameTurnState};
use lane_battle::cards::Deck;
use lane_battle::core::{PlayerId, PlayerMap};
use lane_battle::session::{Game, MemoryRecorder, PlayerMove, TurnRecord};

fn new_game(seed: u64) -> Game {
    let deck = Deck::new(
        "mixed",
        [
            "Sokka", "Suki", "Momo", "Zuko", "Katara", "Appa", "Ty Lee", "Mai", "Jet", "Hakoda", "Toph", "Iroh",
        ],
    );
    let state = BattleBuilder::new()
        .deck(PlayerId::new(0), deck.clone())
        .deck(PlayerId::new(1), deck)
        .random_lane_rewards()
        .capture_snapshots(false)
        .build(seed);
    Game::new(
        format!("game-{seed}"),
        PlayerMap::from_pair("korra".to_string(), "asami".to_string()),
        state,
    )
}

/// Each player plays the first card in hand into a random open lane.
fn play_turn(game: &mut Game) {
    for player in PlayerId::ALL {
        let card = game.state().hand(player).front().map(|c| c.id);
        let lane = game.state_mut().random_lane_with_room(player);
        let moves: Vec<PlayerMove> = match (card, lane) {
            (Some(card), Some(lane)) => vec![PlayerMove::new(card, lane)],
            _ => Vec::new(),
        };
        game.submit_moves(player, &moves);
    }
}

#[test]
fn test_full_game_records_every_roll() {
    for seed in 0..4 {
        let mut game = new_game(seed);
        let mut recorder = MemoryRecorder::new();
        game.start();

        while !game.state().is_over() {
            play_turn(&mut game);
            assert!(game.ready_to_roll());
            game.roll_turn(&mut recorder).unwrap();
        }

        let turns: Vec<u32> = recorder.records().iter().map(|r| r.turn).collect();
        assert_eq!(turns, (1..=8).collect::<Vec<_>>());
        assert_eq!(game.state().turn(), 9);
        assert_eq!(game.state().winner(), game.state().compute_winner());
        assert!(recorder.records().iter().all(|r| r.game_id == game.id()));
    }
}

#[test]
fn test_recorded_turn_replays_identically() {
    let mut game = new_game(11);
    let mut recorder = MemoryRecorder::new();
    game.start();
    play_turn(&mut game);

    let catalog = game.state().catalog().clone();
    game.roll_turn(&mut recorder).unwrap();

    let record = recorder.last().unwrap().clone();
    let bytes = record.to_bytes().unwrap();
    let restored = TurnRecord::from_bytes(&bytes).unwrap();
    let mut replay = GameTurnState::from_snapshot(restored.snapshot, catalog).unwrap();
    replay.roll_turn();

    assert_eq!(replay.snapshot(), game.state().snapshot());
}

#[test]
fn test_rolls_after_game_over_change_nothing() {
    let mut game = new_game(2);
    let mut recorder = MemoryRecorder::new();
    game.start();
    while !game.state().is_over() {
        play_turn(&mut game);
        game.roll_turn(&mut recorder).unwrap();
    }
    let before = game.state().snapshot();

    game.roll_turn(&mut recorder).unwrap();

    assert_eq!(game.state().snapshot(), before);
}
