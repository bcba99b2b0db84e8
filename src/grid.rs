//! Grid model: square cell array, row-major, plus coordinate and adjacency math.

use crate::config::ConfigError;
use rand::Rng;

/// Single cell: either empty or a numbered tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Tile(u32),
}

impl Cell {
    /// Tile value, or `None` for an empty cell.
    #[inline]
    pub fn value(self) -> Option<u32> {
        match self {
            Self::Empty => None,
            Self::Tile(v) => Some(v),
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    /// 0 encodes an empty cell.
    fn from_raw(raw: u32) -> Self {
        if raw == 0 { Self::Empty } else { Self::Tile(raw) }
    }
}

/// (row, col) of a cell index on an `n`-wide grid.
#[inline]
pub fn position(index: usize, n: usize) -> (usize, usize) {
    (index / n, index % n)
}

/// Eight-directional neighbourhood: rows and columns differ by at most one, and `a != b`.
pub fn are_adjacent(a: usize, b: usize, n: usize) -> bool {
    if a == b {
        return false;
    }
    let (ar, ac) = position(a, n);
    let (br, bc) = position(b, n);
    ar.abs_diff(br) <= 1 && ac.abs_diff(bc) <= 1
}

/// Square playfield of `size * size` cells. Index = row * size + col; row 0 is the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// All-empty grid.
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Every cell drawn uniformly from `1..=max_value`. Pre-formed chains are fine.
    pub fn generate<R: Rng>(size: usize, max_value: u32, rng: &mut R) -> Self {
        let cells = (0..size * size)
            .map(|_| Cell::Tile(rng.gen_range(1..=max_value)))
            .collect();
        Self { size, cells }
    }

    /// Fixed layout (row-major, 0 = empty). Length must be exactly `size * size`.
    pub fn from_values(size: usize, values: &[u32]) -> Result<Self, ConfigError> {
        let expected = size * size;
        if values.len() != expected {
            return Err(ConfigError::GridLength {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            size,
            cells: values.iter().copied().map(Cell::from_raw).collect(),
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Tile value at `index`; `None` when empty or out of range.
    #[inline]
    pub fn value(&self, index: usize) -> Option<u32> {
        self.get(index).and_then(Cell::value)
    }

    #[inline]
    pub fn set(&mut self, index: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = cell;
        }
    }

    #[inline]
    pub fn position(&self, index: usize) -> (usize, usize) {
        position(index, self.size)
    }

    #[inline]
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        are_adjacent(a, b, self.size)
    }

    /// Indices of the 8-neighbours of `index` that lie on the grid.
    pub fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let (row, col) = self.position(index);
        let n = self.size;
        (row.saturating_sub(1)..=(row + 1).min(n - 1))
            .flat_map(move |r| (col.saturating_sub(1)..=(col + 1).min(n - 1)).map(move |c| (r, c)))
            .map(move |(r, c)| r * n + c)
            .filter(move |&i| i != index)
    }

    /// Cells of column `col`, top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = Cell> + '_ {
        (0..self.size).map(move |row| self.cells[row * self.size + col])
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }
}
