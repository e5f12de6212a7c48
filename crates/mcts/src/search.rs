//! Search over the hash-consed state DAG.
//!
//! Implements MCTS with PUCT selection. Every iteration runs
//! SELECT -> EXPAND -> EVALUATE -> BACKPROP from the current root; after the
//! iteration budget is spent one child is chosen (ACT) and the search
//! continues from it until a terminal state is reached.

use crate::{
    cache::VertexCache,
    config::SearchConfig,
    evaluator::{Evaluator, LeafValue, RolloutEvaluator},
    timing::{Phase, SearchTimings},
    vertex::VertexId,
};
use rand::Rng;
use rand_distr::{Dirichlet, Distribution};
use rlsearch_core::{
    now_ms, GameRecord, GameStep, Problem, Result, Reward, SearchError, SearchState,
};
use rlsearch_reward::RewardFactory;
use std::time::Instant;

/// One decision of a played game.
#[derive(Clone, Debug)]
pub struct Step<S> {
    /// The state the decision was made from.
    pub state: S,

    /// Index of the chosen child in successor order.
    pub action_index: usize,

    /// Normalized visit counts of the children (the policy target).
    pub visit_distribution: Vec<f64>,
}

/// A game played to a terminal state.
#[derive(Clone, Debug)]
pub struct Game<S> {
    pub steps: Vec<Step<S>>,
    pub final_state: S,
    pub reward: Reward,
}

impl<S: SearchState> Game<S> {
    /// Number of decisions.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Every state of the game, from the initial to the final one.
    pub fn path(&self) -> impl Iterator<Item = &S> {
        self.steps
            .iter()
            .map(|step| &step.state)
            .chain(std::iter::once(&self.final_state))
    }

    /// Convert to the record appended to a game store.
    pub fn to_record(&self, run_id: &str, game_id: &str) -> GameRecord {
        let steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| GameStep {
                step_index: i,
                state_key: step.state.key().to_string(),
                action_index: step.action_index,
                visit_distribution: step.visit_distribution.clone(),
            })
            .collect();

        GameRecord {
            run_id: run_id.to_string(),
            game_id: game_id.to_string(),
            steps,
            final_state_key: self.final_state.key().to_string(),
            reward: self.reward.clone(),
            timestamp_ms: now_ms(),
        }
    }
}

/// Plain MCTS: uniform priors and random playouts.
pub type MctsEngine<P, R> = SearchEngine<P, RolloutEvaluator<R>, R>;

/// Monte Carlo Tree Search with PUCT selection over a vertex DAG.
///
/// Generic over:
/// - `P`: The problem being searched
/// - `E`: The evaluation strategy (rollouts or the problem's estimator)
/// - `R`: The random number generator (noise and action sampling)
pub struct SearchEngine<P: Problem, E: Evaluator<P>, R: Rng> {
    problem: P,
    config: SearchConfig,
    evaluator: E,
    reward_factory: RewardFactory,
    rng: R,
    cache: VertexCache<P::State>,

    /// Noisy priors for the vertex currently being searched from. Kept
    /// out of the cache so the vertex's priors stay the estimator's.
    root_noise: Option<(VertexId, Vec<f64>)>,

    timings: SearchTimings,
}

impl<P, E, R> SearchEngine<P, E, R>
where
    P: Problem,
    E: Evaluator<P>,
    R: Rng,
{
    /// Create a new engine with an empty vertex cache.
    pub fn new(
        problem: P,
        config: SearchConfig,
        evaluator: E,
        reward_factory: RewardFactory,
        rng: R,
    ) -> Self {
        Self {
            problem,
            config,
            evaluator,
            reward_factory,
            rng,
            cache: VertexCache::new(),
            root_noise: None,
            timings: SearchTimings::default(),
        }
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cache(&self) -> &VertexCache<P::State> {
        &self.cache
    }

    /// Phase timings accumulated since the start of the last `run()`.
    pub fn timings(&self) -> &SearchTimings {
        &self.timings
    }

    pub fn reward_factory(&self) -> &RewardFactory {
        &self.reward_factory
    }

    pub fn reward_factory_mut(&mut self) -> &mut RewardFactory {
        &mut self.reward_factory
    }

    /// The vertex of the problem's initial state.
    pub fn root(&mut self) -> VertexId {
        let state = self.problem.initial_state();
        self.cache.get_or_create(state)
    }

    /// Play one game from the initial state to a terminal state.
    ///
    /// The returned reward is scaled with the factory's current history; the
    /// history itself is left untouched.
    pub fn run(&mut self) -> Result<Game<P::State>> {
        if !self.config.reuse_cache {
            self.cache.clear();
        }
        self.timings.reset();

        let started = Instant::now();
        let mut current = self.root();
        let mut steps = Vec::new();

        loop {
            self.ensure_expanded(current)?;
            if self.cache.get(current).is_terminal() {
                break;
            }

            self.sample(current, self.config.num_simulations)?;
            let Some(action_index) = self.choose_action(current, steps.len())? else {
                break;
            };

            let vertex = self.cache.get(current);
            let child = vertex.children()[action_index];
            steps.push(Step {
                state: vertex.state().clone(),
                action_index,
                visit_distribution: self.visit_distribution(current),
            });
            current = child;
        }

        let raw = self.terminal_raw_reward(current)?;
        let vertex = self.cache.get(current);
        let info = vertex
            .terminal_reward()
            .map(|(_, info)| info.clone())
            .unwrap_or_default();
        let final_state = vertex.state().clone();
        let scaled = self.reward_factory.peek(raw, &self.config.run_id);

        log::info!(
            "game finished in {} steps ({:.2}s): final state {}, raw reward {:.4}, scaled {:.4}, {} vertices",
            steps.len(),
            started.elapsed().as_secs_f64(),
            final_state.key(),
            raw,
            scaled,
            self.cache.len()
        );
        log::debug!("search timings: {}", self.timings);

        Ok(Game {
            steps,
            final_state,
            reward: Reward::new(raw, scaled, info),
        })
    }

    /// Run `iterations` search iterations from `root`.
    ///
    /// Stops early once the configured time limit is exhausted. Each
    /// completed iteration adds exactly one visit to `root`.
    pub fn sample(&mut self, root: VertexId, iterations: usize) -> Result<()> {
        self.ensure_expanded(root)?;
        if iterations == 0 {
            return Ok(());
        }
        self.prepare_root_noise(root);

        let deadline = self.config.time_limit().map(|limit| Instant::now() + limit);
        for i in 0..iterations {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                log::debug!("time limit reached after {i} of {iterations} iterations");
                break;
            }
            self.simulate(root)?;
        }

        Ok(())
    }

    /// Choose the child to move to from `root`.
    ///
    /// Greedy (most visits, first child on ties) when the effective
    /// temperature is 0, otherwise sampled with probability proportional to
    /// `N^(1/T)`. Falls back to the priors when no child has been visited.
    /// Returns `None` for terminal vertices.
    pub fn select_action(
        &mut self,
        root: VertexId,
        move_number: usize,
    ) -> Result<Option<VertexId>> {
        Ok(self
            .choose_action(root, move_number)?
            .map(|i| self.cache.get(root).children()[i]))
    }

    /// Visit counts of `root`'s children, normalized to sum to 1.
    ///
    /// Without visits, the priors (or nothing, for terminal vertices).
    pub fn visit_distribution(&self, root: VertexId) -> Vec<f64> {
        let vertex = self.cache.get(root);
        let counts: Vec<f64> = vertex
            .children()
            .iter()
            .map(|&c| self.cache.get(c).stats.visit_count as f64)
            .collect();

        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            counts.iter().map(|n| n / total).collect()
        } else {
            vertex
                .priors()
                .map(|p| p.as_slice().to_vec())
                .unwrap_or_default()
        }
    }

    fn ensure_expanded(&mut self, id: VertexId) -> Result<()> {
        if !self.cache.get(id).is_expanded() {
            self.expand(id)?;
        }
        Ok(())
    }

    /// Run a single iteration: select -> expand/evaluate -> backpropagate.
    fn simulate(&mut self, root: VertexId) -> Result<()> {
        // SELECT: descend until an unexpanded or terminal vertex
        let started = Instant::now();
        let mut path = vec![root];
        let mut current = root;
        loop {
            let vertex = self.cache.get(current);
            if !vertex.is_expanded() || vertex.is_terminal() {
                break;
            }
            current = self.select_child(current);
            debug_assert!(
                !path.contains(&current),
                "successors of a state must not lead back to an ancestor"
            );
            path.push(current);
        }
        self.timings.record(Phase::Select, started.elapsed());

        // EXPAND + EVALUATE
        let value = if self.cache.get(current).is_terminal() {
            self.terminal_value(current)?
        } else {
            match self.expand(current)? {
                Some(leaf) => self.leaf_value(leaf)?,
                None => self.terminal_value(current)?,
            }
        };

        // BACKPROP
        let started = Instant::now();
        self.backpropagate(&path, value);
        self.timings.record(Phase::Backprop, started.elapsed());
        Ok(())
    }

    /// Materialize the children of `id` and evaluate it.
    ///
    /// Returns `None` when the vertex turns out to be terminal.
    fn expand(&mut self, id: VertexId) -> Result<Option<LeafValue<P::State>>> {
        let started = Instant::now();
        let state = self.cache.get(id).state().clone();
        let successors = if self.problem.is_terminal(&state) {
            Vec::new()
        } else {
            self.problem.successors(&state)
        };

        if successors.is_empty() {
            self.cache.get_mut(id).mark_terminal();
            self.timings.record(Phase::Expand, started.elapsed());
            return Ok(None);
        }

        let children: Vec<VertexId> = successors
            .iter()
            .map(|s| self.cache.get_or_create(s.clone()))
            .collect();
        self.timings.record(Phase::Expand, started.elapsed());

        let started = Instant::now();
        let evaluation = self.evaluator.evaluate(&self.problem, &state, &successors)?;
        self.timings.record(Phase::Evaluate, started.elapsed());

        if evaluation.priors.len() != children.len() {
            return Err(SearchError::PriorShapeMismatch {
                expected: children.len(),
                got: evaluation.priors.len(),
            });
        }

        let value_estimate = match evaluation.value {
            LeafValue::Estimate(v) if !v.is_finite() => return Err(SearchError::NonFiniteValue(v)),
            LeafValue::Estimate(v) => Some(v),
            LeafValue::Rollout(_) => None,
        };

        self.cache
            .get_mut(id)
            .set_expansion(children, evaluation.priors, value_estimate);
        Ok(Some(evaluation.value))
    }

    fn leaf_value(&mut self, leaf: LeafValue<P::State>) -> Result<f64> {
        match leaf {
            LeafValue::Estimate(value) => Ok(value),
            LeafValue::Rollout(end) => {
                let (raw, _) = self.problem.reward(&end);
                check_reward(raw)?;
                Ok(self.reward_factory.peek(raw, &self.config.run_id))
            }
        }
    }

    fn terminal_value(&mut self, id: VertexId) -> Result<f64> {
        let raw = self.terminal_raw_reward(id)?;
        Ok(self.reward_factory.peek(raw, &self.config.run_id))
    }

    /// Raw reward of a terminal vertex, queried from the problem once.
    fn terminal_raw_reward(&mut self, id: VertexId) -> Result<f64> {
        if let Some((raw, _)) = self.cache.get(id).terminal_reward() {
            return Ok(*raw);
        }

        let (raw, info) = self.problem.reward(self.cache.get(id).state());
        check_reward(raw)?;
        self.cache.get_mut(id).set_terminal_reward(raw, info);
        Ok(raw)
    }

    /// Select best child using PUCT formula.
    ///
    /// score = Q(child) + c * P(child) * sqrt(N_parent) / (1 + N_child)
    fn select_child(&self, id: VertexId) -> VertexId {
        let vertex = self.cache.get(id);
        let children = vertex.children();
        let parent_visits = vertex.stats.visit_count.max(1) as f64;
        let c = self.config.exploration(parent_visits);
        let sqrt_parent = parent_visits.sqrt();

        let priors: &[f64] = match &self.root_noise {
            Some((noisy_root, noisy)) if *noisy_root == id => noisy.as_slice(),
            _ => vertex.priors().map(|p| p.as_slice()).unwrap_or(&[]),
        };

        // Only called on expanded, non-terminal vertices.
        let mut best = children[0];
        let mut best_score = f64::NEG_INFINITY;
        for (i, &child) in children.iter().enumerate() {
            let stats = &self.cache.get(child).stats;
            let p = priors.get(i).copied().unwrap_or(0.0);
            let score =
                stats.mean_value() + c * p * sqrt_parent / (1.0 + stats.visit_count as f64);

            // Strict comparison: the first child wins ties.
            if score > best_score {
                best_score = score;
                best = child;
            }
        }

        best
    }

    /// Add the value to every vertex of the descent path.
    fn backpropagate(&mut self, path: &[VertexId], value: f64) {
        for &id in path {
            let stats = &mut self.cache.get_mut(id).stats;
            stats.visit_count += 1;
            stats.value_sum += value;
        }
    }

    /// Sample Dirichlet noise for the priors of `root`.
    fn prepare_root_noise(&mut self, root: VertexId) {
        self.root_noise = None;
        if !self.config.dirichlet_noise || self.config.exploration_fraction <= 0.0 {
            return;
        }

        let Some(priors) = self.cache.get(root).priors() else {
            return;
        };

        // Dirichlet requires at least 2 elements
        if priors.len() < 2 {
            return;
        }

        let alpha = vec![self.config.dirichlet_alpha; priors.len()];
        let dirichlet = match Dirichlet::new(&alpha) {
            Ok(d) => d,
            Err(err) => {
                log::warn!("skipping root noise: {err}");
                return;
            }
        };
        let noise: Vec<f64> = dirichlet.sample(&mut self.rng);

        let eps = self.config.exploration_fraction;
        let mixed = priors
            .as_slice()
            .iter()
            .zip(&noise)
            .map(|(p, n)| (1.0 - eps) * p + eps * n)
            .collect();
        self.root_noise = Some((root, mixed));
    }

    fn choose_action(&mut self, root: VertexId, move_number: usize) -> Result<Option<usize>> {
        self.ensure_expanded(root)?;

        let vertex = self.cache.get(root);
        let children = vertex.children();
        if children.is_empty() {
            return Ok(None);
        }

        let counts: Vec<f64> = children
            .iter()
            .map(|&c| self.cache.get(c).stats.visit_count as f64)
            .collect();
        let weights = if counts.iter().all(|&n| n == 0.0) {
            vertex
                .priors()
                .map(|p| p.as_slice().to_vec())
                .unwrap_or_else(|| vec![1.0; children.len()])
        } else {
            counts
        };

        let temperature = self.config.effective_temperature(move_number);
        if temperature <= 0.0 || weights.len() == 1 {
            return Ok(Some(argmax(&weights)));
        }

        let inv_temp = 1.0 / temperature;
        let adjusted: Vec<f64> = weights.iter().map(|w| w.powf(inv_temp)).collect();
        Ok(Some(sample_index(&adjusted, &mut self.rng)))
    }
}

fn check_reward(raw: f64) -> Result<()> {
    if raw.is_finite() {
        Ok(())
    } else {
        Err(SearchError::NonFiniteReward(raw))
    }
}

/// Index of the largest weight; the first one wins ties.
fn argmax(weights: &[f64]) -> usize {
    let mut best = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w > weights[best] {
            best = i;
        }
    }
    best
}

/// Sample an index with probability proportional to its weight.
fn sample_index<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return argmax(weights);
    }

    let threshold: f64 = rng.gen::<f64>() * sum;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    // Rounding left the threshold past the last bucket.
    argmax(weights)
}
