//! Self-play driver for the rlsearch engines.
//!
//! Plays games with parallel workers and appends them to an NDJSON game
//! store, turns stored games into scaled training targets, and summarizes
//! a run's progress.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{DomainConfig, EngineKind, RunConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rlsearch_core::{GameRecord, GameStore, Problem};
use rlsearch_mcts::{
    games::{GridWorld, Hallway},
    AlphaZeroEngine, Evaluator, RolloutEvaluator, SearchEngine, SelfPlayWorker,
};
use rlsearch_reward::{RewardConfig, RewardFactory};
use rlsearch_store::FileGameStore;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

/// rlsearch self-play, training-target and monitoring tool.
#[derive(Parser)]
#[command(name = "rlsearch-selfplay")]
#[command(about = "Play self-play games and prepare training targets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play self-play games and append them to the game store.
    Play {
        #[command(flatten)]
        run: RunArgs,

        /// Number of games to play in total.
        #[arg(short, long, default_value = "10")]
        games: usize,

        /// Number of independent workers.
        #[arg(short, long, default_value = "1")]
        workers: usize,

        /// Leaf evaluation strategy.
        #[arg(long, value_enum)]
        engine: Option<EngineKind>,

        /// Number of search iterations per move.
        #[arg(short, long)]
        simulations: Option<usize>,

        /// Random seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write the scaled training targets of recent games as NDJSON rows.
    Targets {
        #[command(flatten)]
        run: RunArgs,

        /// Number of most recent games to use.
        #[arg(short, long, default_value = "1000")]
        limit: usize,

        /// Output file (stdout if not given).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize the stored games of a run.
    Monitor {
        #[command(flatten)]
        run: RunArgs,

        /// Number of most recent games to summarize.
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },
}

/// Options shared by every command. Flags override the config file.
#[derive(Args)]
struct RunArgs {
    /// JSON run configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Game store file.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Run identifier.
    #[arg(long)]
    run_id: Option<String>,

    /// Use ranked rewards with this quantile instead of the configured factory.
    #[arg(long)]
    ranked_alpha: Option<f64>,

    /// Ranked reward: games needed before rewards leave 0.
    #[arg(long, default_value = "32")]
    buffer_min_size: usize,

    /// Ranked reward: number of recent games compared against.
    #[arg(long, default_value = "128")]
    buffer_max_size: usize,
}

impl RunArgs {
    fn resolve(&self) -> Result<RunConfig> {
        let mut run = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };

        if let Some(store) = &self.store {
            run.store_path = store.clone();
        }
        if let Some(run_id) = &self.run_id {
            run.search.run_id = run_id.clone();
        }
        if let Some(alpha) = self.ranked_alpha {
            run.reward = Some(RewardConfig::Ranked {
                buffer_min_size: self.buffer_min_size,
                buffer_max_size: self.buffer_max_size,
                alpha,
            });
        }

        run.validate()?;
        Ok(run)
    }
}

fn open_store(run: &RunConfig) -> Result<FileGameStore> {
    FileGameStore::open(&run.store_path)
        .with_context(|| format!("Failed to open game store {:?}", run.store_path))
}

/// Seed the worker's reward history from the store, then play.
fn play_games<P, E>(
    mut worker: SelfPlayWorker<P, E, ChaCha8Rng, &FileGameStore>,
    games: usize,
) -> Result<Vec<GameRecord>>
where
    P: Problem,
    E: Evaluator<P>,
{
    let seeded = worker
        .seed_rewards()
        .context("Failed to load reward history")?;
    if seeded > 0 {
        log::info!("reward history seeded with {seeded} games");
    }

    worker.play(games).context("Self-play failed")
}

/// Build one worker for `problem` and play its share of the games.
fn run_worker<P: Problem>(
    problem: P,
    run: &RunConfig,
    store: &FileGameStore,
    index: usize,
    games: usize,
) -> Result<Vec<GameRecord>> {
    let seed = run.seed.wrapping_add(index as u64 * 1000);
    let rng = ChaCha8Rng::seed_from_u64(seed);
    let reward = run.reward_factory()?;
    let worker_id = format!("w{index}");

    match run.engine {
        EngineKind::Mcts => {
            let evaluator = RolloutEvaluator::new(
                ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
                run.rollout_depth,
            );
            let engine = SearchEngine::new(problem, run.search.clone(), evaluator, reward, rng);
            play_games(SelfPlayWorker::new(engine, store, worker_id), games)
        }
        EngineKind::Alphazero => {
            let engine = AlphaZeroEngine::alphazero(problem, run.search.clone(), reward, rng);
            play_games(SelfPlayWorker::new(engine, store, worker_id), games)
        }
    }
}

/// Games for worker `index` when `total` games are spread over `workers`.
fn worker_share(total: usize, workers: usize, index: usize) -> usize {
    total / workers + usize::from(index < total % workers)
}

/// Run the play command.
fn cmd_play(run: RunConfig, games: usize, workers: usize) -> Result<()> {
    if workers == 0 {
        bail!("at least one worker is required");
    }

    let store = open_store(&run)?;
    println!(
        "Playing {} games on {} with {} workers ({:?}, {} simulations/move)",
        games,
        run.domain.name(),
        workers,
        run.engine,
        run.search.num_simulations
    );
    println!("Run id: {}", run.search.run_id);
    println!("Store: {:?}", store.path());
    println!("Seed: {}", run.seed);

    let start = Instant::now();
    let per_worker: Vec<Vec<GameRecord>> = (0..workers)
        .into_par_iter()
        .map(|i| {
            let share = worker_share(games, workers, i);
            match &run.domain {
                DomainConfig::Hallway { length, max_steps } => {
                    run_worker(Hallway::new(*length, *max_steps), &run, &store, i, share)
                }
                DomainConfig::GridWorld { size, walls } => run_worker(
                    GridWorld::with_walls(*size, walls.iter().copied()),
                    &run,
                    &store,
                    i,
                    share,
                ),
            }
        })
        .collect::<Result<_>>()?;

    let records: Vec<GameRecord> = per_worker.into_iter().flatten().collect();
    let elapsed = start.elapsed();

    println!("\nCompleted in {:.2}s", elapsed.as_secs_f64());
    print_summary(&records);
    Ok(())
}

/// Run the targets command.
fn cmd_targets(run: RunConfig, limit: usize, output: Option<PathBuf>) -> Result<()> {
    let store = open_store(&run)?;
    let run_id = &run.search.run_id;
    let records = store
        .iter_recent(run_id, limit)
        .with_context(|| format!("Failed to read games of run {run_id}"))?;

    let mut factory = run.reward_factory()?;
    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let rows = write_targets(&records, &mut factory, run_id, &mut writer)?;
    writer.flush().context("Failed to flush targets")?;

    if let Some(path) = output {
        println!(
            "Wrote {} rows from {} games ({} rewards) to {:?}",
            rows,
            records.len(),
            factory.name(),
            path
        );
    }
    Ok(())
}

/// Scale each game's reward, oldest game first, and write one row per step.
///
/// Returns the number of rows written.
fn write_targets<W: Write>(
    records: &[GameRecord],
    factory: &mut RewardFactory,
    run_id: &str,
    writer: &mut W,
) -> Result<usize> {
    let mut rows = 0;
    // The store returns newest first.
    for record in records.iter().rev() {
        let scaled = factory.scale(record.reward.raw, run_id);
        for mut row in record.rows() {
            row.reward = scaled;
            serde_json::to_writer(&mut *writer, &row).context("Failed to serialize row")?;
            writeln!(writer).context("Failed to write row")?;
            rows += 1;
        }
    }
    Ok(rows)
}

/// Run the monitor command.
fn cmd_monitor(run: RunConfig, limit: usize) -> Result<()> {
    let store = open_store(&run)?;
    let run_id = &run.search.run_id;
    let records = store
        .iter_recent(run_id, limit)
        .with_context(|| format!("Failed to read games of run {run_id}"))?;

    println!("Run id: {}", run_id);
    println!("Store: {:?}", store.path());
    if records.is_empty() {
        println!("No games stored yet.");
        return Ok(());
    }

    println!("\nMost recent {} games:", records.len());
    print_summary(&records);

    if let Some(best) = store
        .best_reward(run_id)
        .context("Failed to read best game")?
    {
        println!(
            "\nBest game: {} (raw reward {:.4}, {} steps, final state {})",
            best.game_id,
            best.reward.raw,
            best.len(),
            best.final_state_key
        );
    }
    Ok(())
}

fn print_summary(records: &[GameRecord]) {
    if records.is_empty() {
        println!("Games: 0");
        return;
    }

    let n = records.len() as f64;
    let total_steps: usize = records.iter().map(GameRecord::len).sum();
    let mean_raw = records.iter().map(|r| r.reward.raw).sum::<f64>() / n;
    let mean_scaled = records.iter().map(|r| r.reward.scaled).sum::<f64>() / n;
    let best = records
        .iter()
        .map(|r| r.reward.raw)
        .fold(f64::NEG_INFINITY, f64::max);

    println!("Games: {}", records.len());
    println!("Total steps: {}", total_steps);
    println!("Average game length: {:.1} steps", total_steps as f64 / n);
    println!("Mean raw reward: {:.4}", mean_raw);
    println!("Mean scaled reward: {:.4}", mean_scaled);
    println!("Best raw reward: {:.4}", best);
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            run,
            games,
            workers,
            engine,
            simulations,
            seed,
        } => {
            let mut run = run.resolve()?;
            if let Some(engine) = engine {
                run.engine = engine;
            }
            if let Some(simulations) = simulations {
                run.search.num_simulations = simulations;
            }
            if let Some(seed) = seed {
                run.seed = seed;
            }
            cmd_play(run, games, workers)
        }

        Commands::Targets { run, limit, output } => cmd_targets(run.resolve()?, limit, output),

        Commands::Monitor { run, limit } => cmd_monitor(run.resolve()?, limit),
    }
}
