//! Move resolution: length check, transform or destroy, combo and score arithmetic.

use crate::gravity::settle;
use crate::grid::{Cell, Grid};
use crate::path::TracedPath;
use rand::Rng;

/// Chain length that earns a celebration on a destructive move.
pub const BIG_CHAIN: usize = 6;
/// Chain length for the largest celebration.
pub const HUGE_CHAIN: usize = 8;
/// Combo count that earns a celebration regardless of length.
pub const COMBO_CELEBRATION: u32 = 3;

/// Score, combo and stock carried between moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub score: u64,
    pub combo: u32,
    pub stock: u32,
}

/// Presentation hint raised by big destructive moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Celebration {
    /// Chain of [`BIG_CHAIN`] or more.
    Big,
    /// Combo reached [`COMBO_CELEBRATION`].
    Combo,
    /// Chain of [`HUGE_CHAIN`] or more.
    Huge,
}

/// An accepted move and everything it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub grid: Grid,
    pub tally: Tally,
    pub points: u64,
    /// Value the path cells were turned into (the path length).
    pub value: u32,
    /// Path cells in trace order.
    pub cells: Vec<usize>,
    /// The new value exceeded the ceiling and the cells were cleared.
    pub destroyed: bool,
    /// Tiles drawn from stock by the settle pass.
    pub drawn: u32,
    pub celebration: Option<Celebration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing was traced.
    Noop,
    /// Path not longer than its value; nothing changed.
    Rejected { length: usize, value: u32 },
    Resolved(Move),
}

/// Squared chain length times the number of cells merged.
pub fn base_points(length: usize, cell_count: usize) -> u64 {
    let length = length as u64;
    length
        .saturating_mul(length)
        .saturating_mul(cell_count as u64)
}

fn celebration(length: usize, combo: u32) -> Option<Celebration> {
    if length >= HUGE_CHAIN {
        Some(Celebration::Huge)
    } else if combo >= COMBO_CELEBRATION {
        Some(Celebration::Combo)
    } else if length >= BIG_CHAIN {
        Some(Celebration::Big)
    } else {
        None
    }
}

/// Resolves a released path against `grid`.
///
/// A path longer than its value turns every cell into the path length. If that exceeds
/// `max_value` the cells are destroyed instead: combo grows, points are multiplied by the new
/// combo and the board settles from stock. Otherwise combo resets and the base points are paid.
pub fn resolve<R: Rng>(
    path: &TracedPath,
    grid: &Grid,
    max_value: u32,
    tally: Tally,
    rng: &mut R,
) -> Resolution {
    let length = path.len();
    if length == 0 {
        return Resolution::Noop;
    }
    if length <= path.value as usize {
        return Resolution::Rejected {
            length,
            value: path.value,
        };
    }
    debug_assert!(path.cells.iter().all(|&i| grid.value(i) == Some(path.value)));

    let value = length as u32;
    let base = base_points(length, length);
    let mut next = grid.clone();

    if value > max_value {
        for &cell in &path.cells {
            next.set(cell, Cell::Empty);
        }
        let combo = tally.combo.saturating_add(1);
        let points = base.saturating_mul(u64::from(combo));
        let (settled, drawn) = settle(&next, tally.stock, max_value, rng);
        Resolution::Resolved(Move {
            grid: settled,
            tally: Tally {
                score: tally.score.saturating_add(points),
                combo,
                stock: tally.stock - drawn,
            },
            points,
            value,
            cells: path.cells.clone(),
            destroyed: true,
            drawn,
            celebration: celebration(length, combo),
        })
    } else {
        for &cell in &path.cells {
            next.set(cell, Cell::Tile(value));
        }
        Resolution::Resolved(Move {
            grid: next,
            tally: Tally {
                score: tally.score.saturating_add(base),
                combo: 0,
                stock: tally.stock,
            },
            points: base,
            value,
            cells: path.cells.clone(),
            destroyed: false,
            drawn: 0,
            celebration: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(99)
    }

    fn traced(cells: &[usize], value: u32) -> TracedPath {
        TracedPath {
            cells: cells.to_vec(),
            value,
        }
    }

    #[rustfmt::skip]
    const BOARD: [u32; 16] = [
        1, 1, 2, 3,
        3, 3, 2, 1,
        3, 3, 1, 2,
        2, 1, 2, 1,
    ];

    fn board() -> Grid {
        Grid::from_values(4, &BOARD).unwrap()
    }

    #[test]
    fn test_empty_path_is_noop() {
        let r = resolve(&TracedPath::default(), &board(), 3, Tally::default(), &mut rng());
        assert_eq!(r, Resolution::Noop);
    }

    #[test]
    fn test_short_path_is_rejected() {
        let r = resolve(&traced(&[4, 5, 8], 3), &board(), 3, Tally::default(), &mut rng());
        assert_eq!(r, Resolution::Rejected { length: 3, value: 3 });
    }

    #[test]
    fn test_merge_two_ones() {
        let tally = Tally {
            score: 10,
            combo: 4,
            stock: 7,
        };
        let Resolution::Resolved(m) = resolve(&traced(&[0, 1], 1), &board(), 3, tally, &mut rng())
        else {
            panic!("expected a resolved move");
        };
        assert!(!m.destroyed);
        assert_eq!(m.points, 8);
        assert_eq!(m.tally, Tally { score: 18, combo: 0, stock: 7 });
        assert_eq!(m.grid.value(0), Some(2));
        assert_eq!(m.grid.value(1), Some(2));
        assert_eq!(m.celebration, None);
    }

    #[test]
    fn test_four_threes_explode() {
        let tally = Tally {
            score: 0,
            combo: 0,
            stock: 100,
        };
        let Resolution::Resolved(m) =
            resolve(&traced(&[4, 5, 9, 8], 3), &board(), 3, tally, &mut rng())
        else {
            panic!("expected a resolved move");
        };
        assert!(m.destroyed);
        assert_eq!(m.value, 4);
        assert_eq!(m.points, 64);
        assert_eq!(m.tally.combo, 1);
        assert_eq!(m.tally.score, 64);
        assert_eq!(m.drawn, 4);
        assert_eq!(m.tally.stock, 96);
        assert_eq!(m.grid.empty_count(), 0);
    }

    #[test]
    fn test_combo_multiplies_destructive_points() {
        let tally = Tally {
            score: 100,
            combo: 2,
            stock: 0,
        };
        let Resolution::Resolved(m) =
            resolve(&traced(&[4, 5, 9, 8], 3), &board(), 3, tally, &mut rng())
        else {
            panic!("expected a resolved move");
        };
        assert_eq!(m.tally.combo, 3);
        assert_eq!(m.points, 64 * 3);
        assert_eq!(m.tally.score, 100 + 192);
        assert_eq!(m.celebration, Some(Celebration::Combo));
        // No stock: the four cleared cells stay empty after gravity.
        assert_eq!(m.drawn, 0);
        assert_eq!(m.grid.empty_count(), 4);
    }

    #[test]
    fn test_base_points_is_cubic_in_length() {
        assert_eq!(base_points(2, 2), 8);
        assert_eq!(base_points(4, 4), 64);
        assert_eq!(base_points(5, 5), 125);
    }

    #[test]
    fn test_celebration_thresholds() {
        assert_eq!(celebration(5, 1), None);
        assert_eq!(celebration(6, 1), Some(Celebration::Big));
        assert_eq!(celebration(4, 3), Some(Celebration::Combo));
        assert_eq!(celebration(8, 0), Some(Celebration::Huge));
    }
}
