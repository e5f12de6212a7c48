//! Run configuration, read from a JSON file and overridden by flags.

use anyhow::{bail, Context, Result};
use rlsearch_mcts::{
    games::{GridWorld, Hallway},
    SearchConfig,
};
use rlsearch_reward::{LinearBoundedRewardFactory, RewardConfig, RewardFactory};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The problem the workers play.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainConfig {
    Hallway {
        length: usize,
        max_steps: usize,
    },
    GridWorld {
        size: usize,
        #[serde(default)]
        walls: Vec<(usize, usize)>,
    },
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self::Hallway {
            length: 16,
            max_steps: 16,
        }
    }
}

impl DomainConfig {
    /// Raw reward range of the domain, used when no reward factory is
    /// configured.
    pub fn reward_bounds(&self) -> (f64, f64) {
        match self {
            Self::Hallway { length, max_steps } => Hallway::new(*length, *max_steps).reward_bounds(),
            Self::GridWorld { size, walls } => {
                GridWorld::with_walls(*size, walls.iter().copied()).reward_bounds()
            }
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Hallway { length, .. } => format!("hallway_{length}"),
            Self::GridWorld { size, .. } => format!("gridworld_{size}"),
        }
    }
}

/// Leaf evaluation strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Uniform priors and random rollouts.
    Mcts,
    /// The problem's policy/value estimator.
    #[default]
    Alphazero,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub domain: DomainConfig,
    pub engine: EngineKind,
    pub search: SearchConfig,

    /// Reward factory; defaults to a linear map of the domain's bounds.
    pub reward: Option<RewardConfig>,

    /// Maximum rollout length for the MCTS engine.
    pub rollout_depth: usize,

    /// NDJSON game store shared by all workers.
    pub store_path: PathBuf,

    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            domain: DomainConfig::default(),
            engine: EngineKind::default(),
            search: SearchConfig::with_simulations(64),
            reward: None,
            rollout_depth: 64,
            store_path: PathBuf::from("data/games.ndjson"),
            seed: 42,
        }
    }
}

impl RunConfig {
    /// Read a configuration file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Reject configurations the domains cannot be built from.
    pub fn validate(&self) -> Result<()> {
        match &self.domain {
            DomainConfig::Hallway { length, .. } if *length < 2 => {
                bail!("hallway length must be at least 2 (got {length})")
            }
            DomainConfig::GridWorld { size, .. } if *size < 2 => {
                bail!("grid size must be at least 2 (got {size})")
            }
            _ => {}
        }
        if self.search.run_id.is_empty() {
            bail!("run id must not be empty");
        }
        self.reward_factory()?;
        Ok(())
    }

    /// Build the configured reward factory.
    pub fn reward_factory(&self) -> Result<RewardFactory> {
        let factory = match &self.reward {
            Some(config) => RewardFactory::from_config(config)?,
            None => {
                let (min, max) = self.domain.reward_bounds();
                LinearBoundedRewardFactory::new(min, max)?.into()
            }
        };
        Ok(factory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "domain": {{"kind": "grid_world", "size": 5}},
                "engine": "mcts",
                "search": {{"num_simulations": 32, "run_id": "grid"}},
                "reward": {{"kind": "ranked", "buffer_min_size": 4, "buffer_max_size": 16, "alpha": 0.75}}
            }}"#
        )
        .unwrap();

        let config = RunConfig::load(file.path()).unwrap();
        assert_eq!(
            config.domain,
            DomainConfig::GridWorld {
                size: 5,
                walls: Vec::new()
            }
        );
        assert_eq!(config.engine, EngineKind::Mcts);
        assert_eq!(config.search.num_simulations, 32);
        assert_eq!(config.search.c_puct, SearchConfig::default().c_puct);
        assert_eq!(config.seed, 42);
        assert_eq!(config.reward_factory().unwrap().name(), "ranked");
        config.validate().unwrap();
    }

    #[test]
    fn test_default_reward_uses_domain_bounds() {
        let config = RunConfig::default();
        let mut factory = config.reward_factory().unwrap();
        assert_eq!(factory.name(), "linear_bounded");
        // 16-cell hallway: 15 steps is optimal.
        assert_eq!(factory.scale(-15.0, "run"), 1.0);
        assert_eq!(factory.scale(-32.0, "run"), 0.0);
    }

    #[test]
    fn test_validate_rejects_tiny_domains() {
        let config = RunConfig {
            domain: DomainConfig::Hallway {
                length: 1,
                max_steps: 4,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            reward: Some(RewardConfig::Ranked {
                buffer_min_size: 10,
                buffer_max_size: 5,
                alpha: 0.5,
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = RunConfig::load(Path::new("/nonexistent/run.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
