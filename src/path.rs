//! Path builder: legality-filtered accumulator of traced cells, with backtracking.

use crate::grid::Grid;

/// Result of feeding one cell into an open path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extend {
    /// Cell was adjacent, same-valued and new; it is now the tail.
    Appended,
    /// Cell was already on the path; everything after it was dropped.
    Backtracked,
    /// Not adjacent, wrong value, already the tail, or no path open.
    Ignored,
}

/// A released path: the cells in trace order and the value they share.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracedPath {
    pub cells: Vec<usize>,
    /// 0 when the path is empty.
    pub value: u32,
}

impl TracedPath {
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    cells: Vec<usize>,
    value: Option<u32>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a one-cell path on a non-empty cell. Any path already open is discarded.
    pub fn begin(&mut self, index: usize, grid: &Grid) -> bool {
        let Some(value) = grid.value(index) else {
            return false;
        };
        self.cells.clear();
        self.cells.push(index);
        self.value = Some(value);
        true
    }

    pub fn extend(&mut self, index: usize, grid: &Grid) -> Extend {
        let Some(value) = self.value else {
            return Extend::Ignored;
        };
        if let Some(pos) = self.cells.iter().position(|&c| c == index) {
            if pos + 1 == self.cells.len() {
                return Extend::Ignored;
            }
            self.cells.truncate(pos + 1);
            return Extend::Backtracked;
        }
        let Some(&last) = self.cells.last() else {
            return Extend::Ignored;
        };
        if !grid.are_adjacent(last, index) || grid.value(index) != Some(value) {
            return Extend::Ignored;
        }
        self.cells.push(index);
        Extend::Appended
    }

    /// Hands the path over and returns the builder to idle.
    pub fn release(&mut self) -> TracedPath {
        TracedPath {
            cells: std::mem::take(&mut self.cells),
            value: self.value.take().unwrap_or(0),
        }
    }

    /// Drops the open path without releasing it.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.value = None;
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    #[inline]
    pub fn value(&self) -> Option<u32> {
        self.value
    }

    #[inline]
    pub fn last(&self) -> Option<usize> {
        self.cells.last().copied()
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.cells.contains(&index)
    }

    /// True once the path is long enough to be accepted on release.
    pub fn is_valid_length(&self) -> bool {
        self.value.is_some_and(|v| self.cells.len() > v as usize)
    }
}
