//! Legal-move oracle: breadth-first search over same-valued 8-neighbour regions.

use crate::grid::Grid;
use std::collections::VecDeque;

/// True if some start cell reaches a same-valued cell at BFS depth greater than its value.
///
/// Depth starts at 1 on the seed and grows by one per expansion; each cell is visited at most
/// once per start. The tree edge sequence from the seed to a node at depth `k` is itself a
/// legal path of `k` cells, so any hit is a playable move.
pub fn has_legal_move(grid: &Grid) -> bool {
    (0..grid.len()).any(|start| reaches_beyond_value(grid, start))
}

/// Greatest BFS depth reachable from `start` through cells sharing its value (0 if empty).
#[cfg(test)]
fn max_depth_from(grid: &Grid, start: usize) -> usize {
    let Some(value) = grid.value(start) else {
        return 0;
    };
    bfs(grid, start, value, |_| false)
}

fn reaches_beyond_value(grid: &Grid, start: usize) -> bool {
    let Some(value) = grid.value(start) else {
        return false;
    };
    let limit = value as usize;
    bfs(grid, start, value, |depth| depth > limit) > limit
}

/// Runs the BFS and returns the deepest depth seen; stops early once `done(depth)` holds.
fn bfs(grid: &Grid, start: usize, value: u32, done: impl Fn(usize) -> bool) -> usize {
    let mut visited = vec![false; grid.len()];
    let mut queue = VecDeque::new();
    visited[start] = true;
    queue.push_back((start, 1usize));
    let mut deepest = 1;

    while let Some((cell, depth)) = queue.pop_front() {
        deepest = deepest.max(depth);
        if done(depth) {
            return deepest;
        }
        for next in grid.neighbours(cell) {
            if !visited[next] && grid.value(next) == Some(value) {
                visited[next] = true;
                queue.push_back((next, depth + 1));
            }
        }
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: usize, values: &[u32]) -> Grid {
        Grid::from_values(size, values).unwrap()
    }

    #[test]
    fn test_pair_of_ones_is_a_move() {
        #[rustfmt::skip]
        let g = grid(3, &[
            1, 1, 2,
            3, 4, 5,
            2, 3, 4,
        ]);
        assert!(has_legal_move(&g));
    }

    #[test]
    fn test_all_distinct_neighbours_has_no_move() {
        #[rustfmt::skip]
        let g = grid(3, &[
            1, 2, 3,
            3, 4, 1,
            1, 2, 3,
        ]);
        assert!(!has_legal_move(&g));
    }

    #[test]
    fn test_chain_must_exceed_value() {
        // Three 3s in a row: depth 3 is not > 3.
        #[rustfmt::skip]
        let g = grid(3, &[
            3, 3, 3,
            1, 2, 1,
            4, 5, 4,
        ]);
        assert!(!has_legal_move(&g));
        assert_eq!(max_depth_from(&g, 0), 3);
    }

    #[test]
    fn test_diagonal_chain_counts() {
        #[rustfmt::skip]
        let g = grid(3, &[
            2, 1, 3,
            3, 2, 1,
            1, 3, 2,
        ]);
        assert!(has_legal_move(&g));
        assert_eq!(max_depth_from(&g, 0), 3);
    }

    #[test]
    fn test_empty_cells_block_and_never_start() {
        #[rustfmt::skip]
        let g = grid(3, &[
            1, 0, 1,
            0, 0, 0,
            2, 0, 3,
        ]);
        assert!(!has_legal_move(&g));
        assert_eq!(max_depth_from(&g, 1), 0);
        assert!(!has_legal_move(&Grid::empty(4)));
    }

    #[test]
    fn test_depth_is_shortest_distance_not_longest_path() {
        // A 2x2 block of 2s is fully 8-connected: every cell is at depth 2 from any seed.
        #[rustfmt::skip]
        let g = grid(3, &[
            2, 2, 1,
            2, 2, 3,
            4, 1, 4,
        ]);
        assert_eq!(max_depth_from(&g, 0), 2);
        assert!(!has_legal_move(&g));
    }
}
