//! Level configuration, resolved and validated once when an attempt starts.

use crate::bonus::Challenge;
use thiserror::Error;

/// Points paid per uniform line in free play.
pub const DEFAULT_LINE_BONUS: u64 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid size must be at least 1")]
    ZeroGridSize,
    #[error("max value must be at least 1")]
    ZeroMaxValue,
    #[error("initial grid has {actual} cells, expected {expected}")]
    GridLength { expected: usize, actual: usize },
    #[error("initial grid cell {index} holds {value}, above max value {max}")]
    ValueOutOfRange { index: usize, value: u32, max: u32 },
    #[error("challenge target must be at least 1")]
    ZeroChallengeTarget,
    #[error("challenge target {target} can never appear on the board (max value {max})")]
    ChallengeTargetOutOfRange { target: u32, max: u32 },
    #[error("invalid challenge {0:?}: expected row:N or column:N")]
    InvalidChallenge(String),
}

/// Everything an attempt needs to start. Immutable for the attempt's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelConfig {
    pub grid_size: usize,
    pub max_value: u32,
    pub initial_stock: u32,
    /// `None` is free play: no victory, uniform lines pay [`LevelConfig::line_bonus`].
    pub target_score: Option<u64>,
    pub shuffle_budget: u32,
    pub challenge: Option<Challenge>,
    /// Fixed starting layout, row-major, 0 = empty. Random when `None`.
    pub initial_grid: Option<Vec<u32>>,
    pub line_bonus: u64,
    /// Seed for tile draws and shuffles. Entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            grid_size: 6,
            max_value: 5,
            initial_stock: 120,
            target_score: Some(2000),
            shuffle_budget: 0,
            challenge: None,
            initial_grid: None,
            line_bonus: DEFAULT_LINE_BONUS,
            seed: None,
        }
    }
}

impl LevelConfig {
    pub fn new(grid_size: usize, max_value: u32, initial_stock: u32) -> Self {
        Self {
            grid_size,
            max_value,
            initial_stock,
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: Option<u64>) -> Self {
        self.target_score = target;
        self
    }

    pub fn with_shuffles(mut self, budget: u32) -> Self {
        self.shuffle_budget = budget;
        self
    }

    pub fn with_challenge(mut self, challenge: Challenge) -> Self {
        self.challenge = Some(challenge);
        self
    }

    pub fn with_grid(mut self, values: Vec<u32>) -> Self {
        self.initial_grid = Some(values);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_line_bonus(mut self, points: u64) -> Self {
        self.line_bonus = points;
        self
    }

    pub fn is_free_play(&self) -> bool {
        self.target_score.is_none()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }
        if self.max_value == 0 {
            return Err(ConfigError::ZeroMaxValue);
        }
        if let Some(values) = &self.initial_grid {
            let expected = self.grid_size * self.grid_size;
            if values.len() != expected {
                return Err(ConfigError::GridLength {
                    expected,
                    actual: values.len(),
                });
            }
            if let Some((index, &value)) = values
                .iter()
                .enumerate()
                .find(|&(_, &v)| v > self.max_value)
            {
                return Err(ConfigError::ValueOutOfRange {
                    index,
                    value,
                    max: self.max_value,
                });
            }
        }
        if let Some(challenge) = self.challenge {
            if challenge.target == 0 {
                return Err(ConfigError::ZeroChallengeTarget);
            }
            if challenge.target > self.max_value {
                return Err(ConfigError::ChallengeTargetOutOfRange {
                    target: challenge.target,
                    max: self.max_value,
                });
            }
        }
        Ok(())
    }
}
