//! Convergence on the hallway, where the optimal policy is known: always
//! step forward.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rlsearch_mcts::{
    games::{Hallway, HallwayState},
    AlphaZeroEngine, Game, MctsEngine, RolloutEvaluator, SearchConfig, SearchEngine,
};
use rlsearch_reward::{LinearBoundedRewardFactory, RewardFactory};

const SIMULATIONS: usize = 2000;

fn reward_for(hallway: &Hallway) -> RewardFactory {
    let (min, max) = hallway.reward_bounds();
    LinearBoundedRewardFactory::new(min, max).unwrap().into()
}

/// Helper to create a rollout engine with a given seed.
fn create_mcts(seed: u64) -> MctsEngine<Hallway, ChaCha8Rng> {
    let hallway = Hallway::new(4, 8);
    let reward = reward_for(&hallway);
    SearchEngine::new(
        hallway,
        SearchConfig::for_evaluation(SIMULATIONS),
        RolloutEvaluator::new(ChaCha8Rng::seed_from_u64(seed + 1000), 16),
        reward,
        ChaCha8Rng::seed_from_u64(seed),
    )
}

fn create_alphazero(seed: u64) -> AlphaZeroEngine<Hallway, ChaCha8Rng> {
    let hallway = Hallway::new(4, 8);
    let reward = reward_for(&hallway);
    AlphaZeroEngine::alphazero(
        hallway,
        SearchConfig::for_evaluation(SIMULATIONS),
        reward,
        ChaCha8Rng::seed_from_u64(seed),
    )
}

fn assert_walks_forward(game: &Game<HallwayState>, seed: u64) {
    let positions: Vec<usize> = game.path().map(|s| s.position()).collect();
    assert_eq!(
        positions,
        vec![0, 1, 2, 3],
        "Seed {}: expected three forward moves, got {:?}",
        seed,
        positions
    );

    // Forward is the last child and the most visited one at every step.
    for step in &game.steps {
        let forward = step.visit_distribution.len() - 1;
        assert_eq!(step.action_index, forward);
        for (i, &share) in step.visit_distribution.iter().enumerate() {
            if i != forward {
                assert!(
                    share < step.visit_distribution[forward],
                    "Seed {}: back move has {} of the visits at {:?}",
                    seed,
                    share,
                    step.state
                );
            }
        }
    }

    assert_eq!(game.reward.raw, -3.0);
    assert_eq!(game.reward.scaled, 1.0);
}

#[test]
fn test_mcts_walks_forward() {
    for seed in 0..3 {
        let mut engine = create_mcts(seed);
        let game = engine.run().unwrap();
        assert_walks_forward(&game, seed);
    }
}

#[test]
fn test_alphazero_walks_forward() {
    for seed in 0..3 {
        let mut engine = create_alphazero(seed);
        let game = engine.run().unwrap();
        assert_walks_forward(&game, seed);
    }
}

#[test]
fn test_self_play_temperature_still_reaches_goal() {
    let hallway = Hallway::new(4, 8);
    let reward = reward_for(&hallway);
    let config = SearchConfig {
        temperature_drop_move: 1,
        ..SearchConfig::with_simulations(500)
    };
    let mut engine = AlphaZeroEngine::alphazero(
        hallway,
        config,
        reward,
        ChaCha8Rng::seed_from_u64(11),
    );

    // The first move is forced; afterwards play is greedy.
    let game = engine.run().unwrap();
    assert!(game.final_state.at_goal());
}
