//! Settle pass (column gravity + refill from stock) and the value shuffle.

use crate::grid::{Cell, Grid};
use rand::Rng;
use rand::seq::SliceRandom;

/// Compacts every column downward and tops it up from `stock`.
///
/// Columns are processed left to right and share the remaining stock. New tiles sit directly
/// above the surviving ones; slots the stock cannot cover stay empty at the top.
/// Returns the settled grid and the number of tiles drawn.
pub fn settle<R: Rng>(grid: &Grid, stock: u32, max_value: u32, rng: &mut R) -> (Grid, u32) {
    let n = grid.size();
    let mut out = grid.clone();
    let mut remaining = stock;
    let mut used = 0u32;

    for col in 0..n {
        let survivors: Vec<Cell> = grid.column(col).filter(|c| !c.is_empty()).collect();
        let empty_count = n - survivors.len();
        if empty_count == 0 {
            continue;
        }
        let draws = (empty_count as u32).min(remaining);
        remaining -= draws;
        used += draws;

        let holes = empty_count - draws as usize;
        let fresh = (0..draws).map(|_| Cell::Tile(rng.gen_range(1..=max_value)));
        let column = std::iter::repeat_n(Cell::Empty, holes)
            .chain(fresh)
            .chain(survivors);
        for (row, cell) in column.enumerate() {
            out.set(row * n + col, cell);
        }
    }
    (out, used)
}

/// Fisher–Yates permutation of the non-empty values; empty slots keep their positions.
pub fn shuffle<R: Rng>(grid: &Grid, rng: &mut R) -> Grid {
    let slots: Vec<usize> = (0..grid.len())
        .filter(|&i| grid.value(i).is_some())
        .collect();
    let mut values: Vec<Cell> = slots.iter().filter_map(|&i| grid.get(i)).collect();
    values.shuffle(rng);

    let mut out = grid.clone();
    for (slot, cell) in slots.into_iter().zip(values) {
        out.set(slot, cell);
    }
    out
}
