//! Whole-attempt scenarios driven through the public GameState API.

use chaintui::game::decide_phase;
use chaintui::{Extend, GameEvent, GameState, LevelConfig, Line, Phase, Resolution};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[rustfmt::skip]
const BOARD: [u32; 16] = [
    1, 1, 2, 3,
    3, 3, 2, 1,
    3, 3, 1, 2,
    2, 1, 2, 1,
];

/// No two equal values touch, so nothing can ever be traced.
#[rustfmt::skip]
const DEAD: [u32; 9] = [
    1, 2, 3,
    3, 4, 1,
    1, 2, 3,
];

fn level(stock: u32, target: Option<u64>) -> GameState {
    let config = LevelConfig::new(4, 3, stock)
        .with_grid(BOARD.to_vec())
        .with_target(target)
        .with_seed(42);
    GameState::new(config).unwrap()
}

fn trace(game: &mut GameState, cells: &[usize]) -> Resolution {
    assert!(game.begin(cells[0]), "could not begin on {}", cells[0]);
    for &cell in &cells[1..] {
        assert_eq!(game.extend(cell), Extend::Appended, "could not extend to {cell}");
    }
    game.release()
}

#[test]
fn test_pair_of_ones_merges_into_twos() {
    let mut game = level(30, Some(10_000));
    let Resolution::Resolved(mv) = trace(&mut game, &[0, 1]) else {
        panic!("pair should resolve");
    };
    assert!(!mv.destroyed);
    assert_eq!(mv.points, 8);
    assert_eq!(game.grid().value(0), Some(2));
    assert_eq!(game.grid().value(1), Some(2));
    assert_eq!(game.combo(), 0);
    assert_eq!(game.score(), 8);
    assert_eq!(game.stock(), 30);
}

#[test]
fn test_four_threes_explode_and_refill() {
    let mut game = level(30, Some(10_000));
    let Resolution::Resolved(mv) = trace(&mut game, &[4, 5, 9, 8]) else {
        panic!("chain of four threes should resolve");
    };
    assert!(mv.destroyed);
    assert_eq!(mv.points, 64);
    assert_eq!(game.combo(), 1);
    assert_eq!(game.score(), 64);
    assert_eq!(game.stock(), 26);
    assert_eq!(game.grid().empty_count(), 0);
    assert!(game.grid().cells().iter().all(|c| c.value().is_some_and(|v| v <= 3)));
}

#[test]
fn test_empty_stock_leaves_holes() {
    #[rustfmt::skip]
    let values = vec![
        2, 1, 1, 2,
        2, 1, 2, 1,
        2, 1, 1, 2,
        1, 2, 2, 1,
    ];
    let config = LevelConfig::new(4, 2, 0)
        .with_grid(values)
        .with_target(Some(10_000))
        .with_shuffles(1)
        .with_seed(1);
    let mut game = GameState::new(config).unwrap();
    let Resolution::Resolved(mv) = trace(&mut game, &[0, 4, 8]) else {
        panic!("three twos should resolve");
    };
    assert!(mv.destroyed);
    assert_eq!(mv.drawn, 0);
    assert_eq!(game.stock(), 0);
    // The surviving 1 drops to the bottom of column 0, the rest of it stays empty.
    assert_eq!(game.grid().value(0), None);
    assert_eq!(game.grid().value(4), None);
    assert_eq!(game.grid().value(8), None);
    assert_eq!(game.grid().value(12), Some(1));
    assert!(!game.begin(0));
}

#[test]
fn test_reaching_target_exactly_wins() {
    let mut game = level(0, Some(64));
    let _ = trace(&mut game, &[4, 5, 9, 8]);
    assert_eq!(game.score(), 64);
    assert_eq!(game.phase(), Phase::Victory);
    assert!(
        game.drain_events().contains(&GameEvent::PhaseChanged {
            from: Phase::Playing,
            to: Phase::Victory
        })
    );
    assert!(!game.begin(0));
}

#[test]
fn test_dead_board_without_shuffles_is_defeat() {
    let config = LevelConfig::new(3, 4, 10).with_grid(DEAD.to_vec());
    let game = GameState::new(config).unwrap();
    assert_eq!(game.phase(), Phase::Defeat);
}

#[test]
fn test_defeat_after_a_move_ignores_all_input() {
    // Max value 1: any pair explodes. With no stock the lone 1 in the corner is left.
    #[rustfmt::skip]
    let values = vec![
        1, 1, 0,
        0, 0, 0,
        0, 0, 1,
    ];
    let config = LevelConfig::new(3, 1, 0)
        .with_grid(values)
        .with_target(Some(1_000))
        .with_seed(3);
    let mut game = GameState::new(config).unwrap();
    assert_eq!(game.phase(), Phase::Playing);
    let Resolution::Resolved(mv) = trace(&mut game, &[0, 1]) else {
        panic!("pair should resolve");
    };
    assert!(mv.destroyed);
    assert_eq!(game.phase(), Phase::Defeat);
    assert!(
        game.drain_events().contains(&GameEvent::PhaseChanged {
            from: Phase::Playing,
            to: Phase::Defeat
        })
    );

    let grid = game.grid().clone();
    let score = game.score();
    assert_eq!(grid.value(8), Some(1));
    assert!(!game.begin(8));
    assert_eq!(game.extend(7), Extend::Ignored);
    assert_eq!(game.release(), Resolution::Noop);
    assert!(!game.shuffle());
    assert_eq!(game.grid(), &grid);
    assert_eq!(game.score(), score);
    assert_eq!(game.phase(), Phase::Defeat);
    assert!(game.drain_events().is_empty());
}

#[test]
fn test_dead_board_with_a_shuffle_is_stuck_then_reevaluated() {
    let config = LevelConfig::new(3, 4, 10)
        .with_grid(DEAD.to_vec())
        .with_shuffles(1)
        .with_seed(9);
    let mut game = GameState::new(config).unwrap();
    assert_eq!(game.phase(), Phase::Stuck);
    assert!(!game.begin(0));

    let before: Vec<u32> = sorted_values(&game);
    assert!(game.shuffle());
    assert_eq!(game.shuffles_left(), 0);
    assert_eq!(sorted_values(&game), before);
    let expected = decide_phase(None, game.score(), game.grid(), 0);
    assert_eq!(game.phase(), expected);
    assert!(!game.shuffle());
}

fn sorted_values(game: &GameState) -> Vec<u32> {
    let mut values: Vec<u32> = game.grid().cells().iter().filter_map(|c| c.value()).collect();
    values.sort_unstable();
    values
}

#[test]
fn test_backtrack_and_reentry() {
    let mut game = level(10, None);
    assert!(game.begin(4));
    assert_eq!(game.extend(5), Extend::Appended);
    assert_eq!(game.extend(9), Extend::Appended);
    assert_eq!(game.extend(9), Extend::Ignored);
    assert_eq!(game.path().cells(), &[4, 5, 9]);
    assert_eq!(game.extend(4), Extend::Backtracked);
    assert_eq!(game.path().cells(), &[4]);
}

#[test]
fn test_free_play_pays_for_a_new_uniform_row() {
    #[rustfmt::skip]
    let values = vec![
        1, 1, 2,
        3, 2, 3,
        2, 3, 1,
    ];
    let config = LevelConfig::new(3, 3, 0)
        .with_grid(values)
        .with_target(None)
        .with_line_bonus(50);
    let mut game = GameState::new(config).unwrap();
    let _ = game.drain_events();
    let _ = trace(&mut game, &[0, 1]);
    assert_eq!(game.score(), 8 + 50);
    assert!(game.drain_events().contains(&GameEvent::LineBonus {
        line: Line::Row(0),
        value: 2,
        points: 50
    }));
}

#[test]
fn test_random_play_keeps_counters_consistent() {
    let config = LevelConfig::new(5, 4, 40)
        .with_target(Some(5_000))
        .with_shuffles(2)
        .with_seed(2024);
    let mut game = GameState::new(config).unwrap();
    let mut rng = SmallRng::seed_from_u64(7);
    let n = game.grid().size();

    for _ in 0..400 {
        let score = game.score();
        let stock = game.stock();
        let shuffles = game.shuffles_left();
        let moves = game.moves();

        if game.phase() == Phase::Stuck {
            assert!(game.shuffle());
        } else {
            let start = rng.gen_range(0..n * n);
            if game.begin(start) {
                for _ in 0..rng.gen_range(0..8) {
                    let last = game.path().last().unwrap_or(start);
                    let next = game.grid().neighbours(last).nth(rng.gen_range(0..3));
                    if let Some(next) = next {
                        let _ = game.extend(next);
                    }
                }
            }
            match game.release() {
                Resolution::Resolved(mv) if mv.destroyed => assert!(game.combo() >= 1),
                Resolution::Resolved(_) => assert_eq!(game.combo(), 0),
                Resolution::Rejected { .. } | Resolution::Noop => {
                    assert_eq!(game.moves(), moves);
                }
            }
        }

        assert!(game.score() >= score);
        assert!(game.stock() <= stock);
        assert!(game.shuffles_left() <= shuffles);
        assert!(!game.is_resolving());
        assert!(!game.path().is_open());
        assert!(
            game.grid()
                .cells()
                .iter()
                .filter_map(|c| c.value())
                .all(|v| (1..=4).contains(&v))
        );
        if game.phase().is_terminal() {
            break;
        }
    }
}
