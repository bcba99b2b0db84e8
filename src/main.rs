//! Chaintui: number-chain merge puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use chaintui::{Challenge, LevelConfig};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = args.level_config();
    let mut app = App::new(config, theme, args.no_animation)?;
    app.run()?;
    Ok(())
}

/// The terminal belongs to the UI, so logs only go to a file when one is asked for.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Number-chain merge puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "chaintui",
    version,
    about = "Number-chain merge puzzle in the terminal. Trace equal tiles, grow them, blow them up.",
    long_about = "Chaintui is a terminal puzzle about chains of equal numbers.\n\n\
        Trace a path through adjacent tiles (diagonals count) that all show the same value. \
        The path must be longer than that value. Every tile on it becomes the path length. \
        If that is more than the max value the tiles explode instead: you score a combo and \
        the board falls down and refills from a limited stock.\n\n\
        Reach the target score to win. Run out of moves and shuffles and you lose.\n\n\
        CONTROLS:\n  Arrows / hjkl  Move cursor      y u b n   Move diagonally\n  \
        Space / Enter  Start or finish a path (moving while tracing extends it, stepping back undoes)\n  \
        s              Shuffle          r         Restart          q / Esc   Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Grid side length.
    #[arg(short, long, default_value = "6", value_name = "N")]
    pub size: usize,

    /// Highest tile value; longer chains explode.
    #[arg(short, long, default_value = "5", value_name = "N")]
    pub max_value: u32,

    /// Tiles available to refill the board.
    #[arg(long, default_value = "120", value_name = "N")]
    pub stock: u32,

    /// Score that wins the level.
    #[arg(long, default_value = "2000", value_name = "POINTS")]
    pub target: u64,

    /// No target score: play until stuck, uniform lines pay a bonus.
    #[arg(long, conflicts_with = "target")]
    pub free_play: bool,

    /// Shuffles available when no move is left.
    #[arg(long, default_value = "3", value_name = "N")]
    pub shuffles: u32,

    /// Side challenge, e.g. `row:4` or `column:2`: fill one whole line with that value.
    #[arg(short, long, value_name = "AXIS:N")]
    pub challenge: Option<Challenge>,

    /// Fixed starting layout, row-major, comma separated, 0 for empty.
    #[arg(long, value_delimiter = ',', value_name = "V,V,...")]
    pub grid: Option<Vec<u32>>,

    /// Points per uniform line in free play.
    #[arg(long, default_value_t = chaintui::config::DEFAULT_LINE_BONUS, value_name = "POINTS")]
    pub line_bonus: u64,

    /// Seed for tile draws and shuffles (repeatable games).
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the explosion flash.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs here (RUST_LOG filters, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    fn level_config(&self) -> LevelConfig {
        let target = (!self.free_play).then_some(self.target);
        let mut config = LevelConfig::new(self.size, self.max_value, self.stock)
            .with_target(target)
            .with_shuffles(self.shuffles)
            .with_line_bonus(self.line_bonus);
        if let Some(challenge) = self.challenge {
            config = config.with_challenge(challenge);
        }
        if let Some(values) = &self.grid {
            config = config.with_grid(values.clone());
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaintui::Axis;

    #[test]
    fn test_args_build_level_config() {
        let args = Args::try_parse_from([
            "chaintui",
            "--size",
            "2",
            "--max-value",
            "3",
            "--grid",
            "1,1,2,0",
            "--challenge",
            "column:2",
            "--seed",
            "7",
        ])
        .unwrap();
        let config = args.level_config();
        assert_eq!(config.grid_size, 2);
        assert_eq!(config.initial_grid, Some(vec![1, 1, 2, 0]));
        assert_eq!(
            config.challenge,
            Some(Challenge {
                axis: Axis::Column,
                target: 2
            })
        );
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.target_score, Some(2000));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_free_play_drops_target() {
        let args = Args::try_parse_from(["chaintui", "--free-play"]).unwrap();
        assert!(args.level_config().is_free_play());
    }

    #[test]
    fn test_bad_challenge_is_a_usage_error() {
        assert!(Args::try_parse_from(["chaintui", "--challenge", "diagonal:3"]).is_err());
    }
}
