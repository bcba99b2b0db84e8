//! Line detectors: the configured challenge and the free-play line bonus.

use crate::config::ConfigError;
use crate::grid::{Cell, Grid};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Which way a challenge line runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

/// A single full row or column, identified by its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    Row(usize),
    Column(usize),
}

impl Line {
    /// Cell indices covered by this line on an `n`-wide grid.
    pub fn cells(self, n: usize) -> Vec<usize> {
        match self {
            Self::Row(r) => (0..n).map(|c| r * n + c).collect(),
            Self::Column(c) => (0..n).map(|r| r * n + c).collect(),
        }
    }

    /// Every row, then every column.
    fn all(n: usize) -> impl Iterator<Item = Self> {
        (0..n).map(Self::Row).chain((0..n).map(Self::Column))
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(i) => write!(f, "row {}", i + 1),
            Self::Column(i) => write!(f, "column {}", i + 1),
        }
    }
}

/// Shared value of a line when every cell holds the same tile.
fn uniform_value(grid: &Grid, line: Line) -> Option<u32> {
    let mut cells = line.cells(grid.size()).into_iter().map(|i| grid.get(i));
    let first = cells.next()??.value()?;
    cells
        .all(|c| c == Some(Cell::Tile(first)))
        .then_some(first)
}

/// Goal: fill one whole row or column with `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    pub axis: Axis,
    pub target: u32,
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = match self.axis {
            Axis::Row => "row",
            Axis::Column => "column",
        };
        write!(f, "a full {} of {}s", axis, self.target)
    }
}

/// Parses `column:5`, `col:5` or `row:3`.
impl FromStr for Challenge {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidChallenge(s.to_string());
        let (axis, target) = s.split_once(':').ok_or_else(invalid)?;
        let axis = match axis.trim().to_ascii_lowercase().as_str() {
            "row" => Axis::Row,
            "col" | "column" => Axis::Column,
            _ => return Err(invalid()),
        };
        let target = target.trim().parse::<u32>().map_err(|_| invalid())?;
        Ok(Self { axis, target })
    }
}

/// Progress on the attempt's challenge. Completion is sticky.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeState {
    challenge: Challenge,
    completed_on: Option<Line>,
}

impl ChallengeState {
    pub fn new(challenge: Challenge) -> Self {
        Self {
            challenge,
            completed_on: None,
        }
    }

    pub fn challenge(&self) -> Challenge {
        self.challenge
    }

    pub fn is_completed(&self) -> bool {
        self.completed_on.is_some()
    }

    pub fn completed_on(&self) -> Option<Line> {
        self.completed_on
    }

    /// Scans for the first matching line. Returns it only on the completing call.
    pub fn check(&mut self, grid: &Grid) -> Option<Line> {
        if self.completed_on.is_some() {
            return None;
        }
        let n = grid.size();
        let hit = (0..n)
            .map(|i| match self.challenge.axis {
                Axis::Row => Line::Row(i),
                Axis::Column => Line::Column(i),
            })
            .find(|&line| uniform_value(grid, line) == Some(self.challenge.target))?;
        self.completed_on = Some(hit);
        Some(hit)
    }
}

/// Free-play bonus: any uniform row or column pays once until it breaks or changes value.
#[derive(Debug, Clone, Default)]
pub struct LineBonus {
    awarded: HashMap<Line, u32>,
}

impl LineBonus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newly completed uniform lines with their value. Lines that are no longer uniform at
    /// their awarded value are forgotten so they can pay again once re-formed.
    pub fn scan(&mut self, grid: &Grid) -> Vec<(Line, u32)> {
        let mut fresh = Vec::new();
        for line in Line::all(grid.size()) {
            match uniform_value(grid, line) {
                Some(value) => {
                    if self.awarded.get(&line) != Some(&value) {
                        self.awarded.insert(line, value);
                        fresh.push((line, value));
                    }
                }
                None => {
                    self.awarded.remove(&line);
                }
            }
        }
        fresh
    }

    #[cfg(test)]
    pub(crate) fn is_awarded(&self, line: Line) -> bool {
        self.awarded.contains_key(&line)
    }
}
