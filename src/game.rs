//! Game state: one attempt at a level. Owns the grid, path, tally, shuffles and phase.

use crate::bonus::{Challenge, ChallengeState, Line, LineBonus};
use crate::config::{ConfigError, LevelConfig};
use crate::gravity;
use crate::grid::Grid;
use crate::path::{Extend, PathBuilder};
use crate::reach::has_legal_move;
use crate::resolve::{Celebration, Move, Resolution, Tally, resolve};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

/// Lifecycle of an attempt. `Victory` and `Defeat` are terminal until [`GameState::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// No legal move, but shuffles remain.
    Stuck,
    Victory,
    Defeat,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

/// Notifications for presentation, audio and persistence collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Transformed { cells: Vec<usize>, value: u32 },
    Destroyed { cells: Vec<usize> },
    Scored {
        points: u64,
        score: u64,
        combo: u32,
        stock: u32,
    },
    MoveRejected { length: usize, value: u32 },
    ChallengeCompleted { line: Line },
    LineBonus { line: Line, value: u32, points: u64 },
    Celebration(Celebration),
    Shuffled { remaining: u32 },
    PhaseChanged { from: Phase, to: Phase },
}

/// What the caller needs to record an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub phase: Phase,
    pub score: u64,
    pub moves: u32,
    /// The configured challenge and whether it was completed.
    pub challenge: Option<(Challenge, bool)>,
}

/// Phase decision, in priority order: target reached, then no legal move, then playing.
pub fn decide_phase(target: Option<u64>, score: u64, grid: &Grid, shuffles_left: u32) -> Phase {
    if target.is_some_and(|t| score >= t) {
        return Phase::Victory;
    }
    if !has_legal_move(grid) {
        return if shuffles_left == 0 {
            Phase::Defeat
        } else {
            Phase::Stuck
        };
    }
    Phase::Playing
}

#[derive(Debug)]
pub struct GameState {
    config: LevelConfig,
    /// Validated fixed layout, reused on reset.
    initial: Option<Grid>,
    rng: SmallRng,
    grid: Grid,
    path: PathBuilder,
    tally: Tally,
    shuffles_left: u32,
    challenge: Option<ChallengeState>,
    line_bonus: LineBonus,
    phase: Phase,
    /// Set for the duration of resolve → settle → detect → evaluate.
    resolving: bool,
    moves: u32,
    events: Vec<GameEvent>,
}

fn seeded(seed: Option<u64>) -> SmallRng {
    seed.map_or_else(SmallRng::from_entropy, SmallRng::seed_from_u64)
}

impl GameState {
    pub fn new(config: LevelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let initial = config
            .initial_grid
            .as_deref()
            .map(|values| Grid::from_values(config.grid_size, values))
            .transpose()?;
        Ok(Self::start(config, initial))
    }

    fn start(config: LevelConfig, initial: Option<Grid>) -> Self {
        let mut rng = seeded(config.seed);
        let grid = initial
            .clone()
            .unwrap_or_else(|| Grid::generate(config.grid_size, config.max_value, &mut rng));
        let mut line_bonus = LineBonus::new();
        if config.is_free_play() {
            // Lines already uniform at the start are not earned.
            let _ = line_bonus.scan(&grid);
        }
        let mut state = Self {
            tally: Tally {
                score: 0,
                combo: 0,
                stock: config.initial_stock,
            },
            shuffles_left: config.shuffle_budget,
            challenge: config.challenge.map(ChallengeState::new),
            initial,
            rng,
            grid,
            path: PathBuilder::new(),
            line_bonus,
            phase: Phase::Playing,
            resolving: false,
            moves: 0,
            events: Vec::new(),
            config,
        };
        state.evaluate();
        info!(
            size = state.config.grid_size,
            max_value = state.config.max_value,
            stock = state.config.initial_stock,
            phase = ?state.phase,
            "attempt started"
        );
        state
    }

    /// Starts the attempt over with the same configuration.
    pub fn reset(&mut self) {
        *self = Self::start(self.config.clone(), self.initial.take());
    }

    fn accepting_input(&self) -> bool {
        self.phase == Phase::Playing && !self.resolving
    }

    /// Opens a path on `index`. Ignored outside `Playing`, while resolving or on an empty cell.
    pub fn begin(&mut self, index: usize) -> bool {
        if !self.accepting_input() {
            return false;
        }
        self.path.begin(index, &self.grid)
    }

    pub fn extend(&mut self, index: usize) -> Extend {
        if !self.accepting_input() {
            return Extend::Ignored;
        }
        self.path.extend(index, &self.grid)
    }

    /// Releases the open path and resolves it as one transaction.
    pub fn release(&mut self) -> Resolution {
        if !self.accepting_input() {
            self.path.clear();
            return Resolution::Noop;
        }
        let traced = self.path.release();
        self.resolving = true;
        let mut resolution = resolve(
            &traced,
            &self.grid,
            self.config.max_value,
            self.tally,
            &mut self.rng,
        );
        match &mut resolution {
            Resolution::Noop => {}
            &mut Resolution::Rejected { length, value } => {
                debug!(length, value, "path too short");
                self.events.push(GameEvent::MoveRejected { length, value });
            }
            Resolution::Resolved(mv) => self.apply(mv),
        }
        self.resolving = false;
        resolution
    }

    /// Commits an accepted move. Line bonuses land in `mv.tally` too, so the returned
    /// resolution carries the same score as [`GameState::score`].
    fn apply(&mut self, mv: &mut Move) {
        self.grid = mv.grid.clone();
        self.tally = mv.tally;
        self.moves += 1;
        debug!(
            length = mv.cells.len(),
            value = mv.value,
            destroyed = mv.destroyed,
            points = mv.points,
            combo = mv.tally.combo,
            drawn = mv.drawn,
            "move resolved"
        );

        self.events.push(if mv.destroyed {
            GameEvent::Destroyed {
                cells: mv.cells.clone(),
            }
        } else {
            GameEvent::Transformed {
                cells: mv.cells.clone(),
                value: mv.value,
            }
        });
        self.events.push(GameEvent::Scored {
            points: mv.points,
            score: self.tally.score,
            combo: self.tally.combo,
            stock: self.tally.stock,
        });
        if let Some(kind) = mv.celebration {
            self.events.push(GameEvent::Celebration(kind));
        }

        self.detect_lines();
        mv.tally = self.tally;
        self.evaluate();
    }

    fn check_challenge(&mut self) {
        if let Some(challenge) = self.challenge.as_mut() {
            if let Some(line) = challenge.check(&self.grid) {
                info!(%line, "challenge completed");
                self.events.push(GameEvent::ChallengeCompleted { line });
            }
        }
    }

    fn detect_lines(&mut self) {
        self.check_challenge();
        if self.config.is_free_play() {
            for (line, value) in self.line_bonus.scan(&self.grid) {
                let points = self.config.line_bonus;
                self.tally.score = self.tally.score.saturating_add(points);
                info!(%line, value, points, "line bonus");
                self.events.push(GameEvent::LineBonus {
                    line,
                    value,
                    points,
                });
            }
        }
    }

    fn evaluate(&mut self) {
        let next = decide_phase(
            self.config.target_score,
            self.tally.score,
            &self.grid,
            self.shuffles_left,
        );
        if next != self.phase {
            info!(from = ?self.phase, to = ?next, score = self.tally.score, "phase changed");
            self.events.push(GameEvent::PhaseChanged {
                from: self.phase,
                to: next,
            });
            self.phase = next;
        }
    }

    /// Permutes the tiles, spending one shuffle. Allowed while playing or stuck.
    pub fn shuffle(&mut self) -> bool {
        if self.phase.is_terminal() || self.resolving || self.shuffles_left == 0 {
            return false;
        }
        self.path.clear();
        self.grid = gravity::shuffle(&self.grid, &mut self.rng);
        self.shuffles_left -= 1;
        info!(remaining = self.shuffles_left, "board shuffled");
        self.events.push(GameEvent::Shuffled {
            remaining: self.shuffles_left,
        });
        // A shuffle can complete the challenge, but lines it lines up are not earned.
        self.check_challenge();
        if self.config.is_free_play() {
            let _ = self.line_bonus.scan(&self.grid);
        }
        self.evaluate();
        true
    }

    /// Events since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            phase: self.phase,
            score: self.tally.score,
            moves: self.moves,
            challenge: self
                .challenge
                .as_ref()
                .map(|c| (c.challenge(), c.is_completed())),
        }
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn path(&self) -> &PathBuilder {
        &self.path
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.tally.score
    }

    pub fn combo(&self) -> u32 {
        self.tally.combo
    }

    pub fn stock(&self) -> u32 {
        self.tally.stock
    }

    pub fn shuffles_left(&self) -> u32 {
        self.shuffles_left
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn challenge(&self) -> Option<&ChallengeState> {
        self.challenge.as_ref()
    }

    pub fn is_resolving(&self) -> bool {
        self.resolving
    }
}
