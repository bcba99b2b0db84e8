//! Chaintui engine: trace equal tiles into chains, merge them into bigger numbers, and blow up
//! anything that grows past the ceiling.
//!
//! The engine is synchronous and presentation-free. A front end maps its pointer or cursor to
//! cell indices and drives a [`GameState`] through `begin` / `extend` / `release` / `shuffle`,
//! then drains [`GameEvent`]s to animate what happened.

pub mod bonus;
pub mod config;
pub mod game;
pub mod gravity;
pub mod grid;
pub mod path;
pub mod reach;
pub mod resolve;

pub use bonus::{Axis, Challenge, Line};
pub use config::{ConfigError, LevelConfig};
pub use game::{GameEvent, GameState, Phase, Summary};
pub use grid::{Cell, Grid};
pub use path::{Extend, TracedPath};
pub use resolve::{Celebration, Resolution};
