//! Self-play worker: plays games and appends them to a game store.

use crate::{evaluator::Evaluator, search::SearchEngine};
use rand::Rng;
use rlsearch_core::{now_ms, GameRecord, GameStore, Problem, Result};
use rlsearch_reward::RewardFactory;

/// Plays games with one engine and records them in a store.
///
/// The engine's reward factory sees a game's raw reward only after the
/// store has accepted the record, so a failed append leaves the reward
/// history untouched.
pub struct SelfPlayWorker<P, E, R, S>
where
    P: Problem,
    E: Evaluator<P>,
    R: Rng,
    S: GameStore,
{
    engine: SearchEngine<P, E, R>,
    store: S,
    worker_id: String,
    games_played: usize,
}

impl<P, E, R, S> SelfPlayWorker<P, E, R, S>
where
    P: Problem,
    E: Evaluator<P>,
    R: Rng,
    S: GameStore,
{
    pub fn new(engine: SearchEngine<P, E, R>, store: S, worker_id: impl Into<String>) -> Self {
        Self {
            engine,
            store,
            worker_id: worker_id.into(),
            games_played: 0,
        }
    }

    pub fn engine(&self) -> &SearchEngine<P, E, R> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SearchEngine<P, E, R> {
        &mut self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Games successfully appended by this worker.
    pub fn games_played(&self) -> usize {
        self.games_played
    }

    /// Load the run's recent rewards from the store into a ranked factory.
    ///
    /// Returns the number of buffered rewards; 0 for stateless factories.
    pub fn seed_rewards(&mut self) -> Result<usize> {
        let run_id = self.engine.config().run_id.clone();
        match self.engine.reward_factory_mut() {
            RewardFactory::Ranked(factory) => Ok(factory.seed_from_store(&self.store, &run_id)?),
            RewardFactory::LinearBounded(_) => Ok(0),
        }
    }

    /// Play one game, append it to the store, then record its reward.
    ///
    /// Other workers append to the same run, so a ranked factory is
    /// refreshed from the store before the game is scored. The stored
    /// `scaled` target is the score against that refreshed history.
    pub fn play_game(&mut self) -> Result<GameRecord> {
        let game = self.engine.run()?;

        let run_id = self.engine.config().run_id.clone();
        let game_id = format!("{}-{}-{}", self.worker_id, now_ms(), self.games_played);
        let mut record = game.to_record(&run_id, &game_id);

        self.seed_rewards()?;
        record.reward.scaled = self
            .engine
            .reward_factory()
            .peek(record.reward.raw, &run_id);

        self.store.append(&record)?;
        let scaled = self
            .engine
            .reward_factory_mut()
            .scale(record.reward.raw, &run_id);
        debug_assert_eq!(scaled, record.reward.scaled);
        self.games_played += 1;

        log::debug!(
            "worker {} stored game {} ({} steps, raw reward {:.4}, scaled {:.4})",
            self.worker_id,
            record.game_id,
            record.len(),
            record.reward.raw,
            record.reward.scaled
        );
        Ok(record)
    }

    /// Play `games` games, stopping at the first error.
    pub fn play(&mut self, games: usize) -> Result<Vec<GameRecord>> {
        (0..games).map(|_| self.play_game()).collect()
    }
}
