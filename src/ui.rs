//! Layout and drawing: board, sidebar, stuck hint, game over and quit menu.

use crate::app::{Flash, Popup, QuitOption, Screen, phase_label};
use crate::theme::Theme;
use chaintui::grid::position;
use chaintui::resolve::COMBO_CELEBRATION;
use chaintui::{Cell, GameState, Phase};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, EffectRenderer, Interpolation, fx, ref_count,
};

/// Cell footprints (width, height) in terminal cells, largest first.
const CELL_SIZES: [(u16, u16); 3] = [(6, 3), (4, 2), (3, 1)];
const SIDEBAR_WIDTH: u16 = 28;
/// Height the sidebar sections need.
const SIDEBAR_HEIGHT: u16 = 27;

/// Duration of the explosion flash in ms.
const FLASH_MS: u32 = 450;

/// Board geometry for one frame.
#[derive(Debug, Clone, Copy)]
struct BoardGeometry {
    /// Inside of the board border.
    inner: Rect,
    n: usize,
    cell_w: u16,
    cell_h: u16,
}

impl BoardGeometry {
    /// Rect of a tile, leaving a one-cell gutter when the footprint has room for it.
    fn tile_rect(&self, index: usize) -> Rect {
        let (row, col) = position(index, self.n);
        let gap_x = u16::from(self.cell_w >= 4);
        let gap_y = u16::from(self.cell_h >= 3);
        Rect {
            x: self.inner.x + col as u16 * self.cell_w,
            y: self.inner.y + row as u16 * self.cell_h,
            width: self.cell_w - gap_x,
            height: self.cell_h - gap_y,
        }
    }
}

fn board_pixel_size(n: usize, (cell_w, cell_h): (u16, u16)) -> (u16, u16) {
    let n = u16::try_from(n).unwrap_or(u16::MAX);
    (
        n.saturating_mul(cell_w).saturating_add(2),
        n.saturating_mul(cell_h).saturating_add(2),
    )
}

/// Largest footprint that fits the board and sidebar in `area`; the smallest when nothing fits.
fn cell_size_for(area: Rect, n: usize) -> (u16, u16) {
    CELL_SIZES
        .into_iter()
        .find(|&size| {
            let (w, h) = board_pixel_size(n, size);
            w.saturating_add(SIDEBAR_WIDTH) <= area.width && h <= area.height
        })
        .unwrap_or(CELL_SIZES[CELL_SIZES.len() - 1])
}

/// Draw current screen. Starts and advances the explosion flash when one is pending.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    state: &GameState,
    theme: &Theme,
    cursor: usize,
    popups: &[Popup],
    best_score: u64,
    quit_selected: QuitOption,
    flash: &mut Flash,
    now: Instant,
) {
    let area = frame.area();
    let geometry = draw_game(frame, state, theme, area, cursor, popups, best_score);
    if flash.is_active() {
        apply_flash(frame, theme, geometry, flash, now);
    }
    match screen {
        Screen::Playing => {
            if state.phase() == Phase::Stuck {
                draw_stuck_overlay(frame, state, theme, area);
            }
        }
        Screen::QuitMenu => draw_quit_menu(frame, theme, quit_selected),
        Screen::GameOver => draw_game_over(frame, state, theme, area, best_score),
    }
}

/// Create or advance the flash effect: destroyed cells fade in from the highlight colour.
fn apply_flash(
    frame: &mut Frame,
    theme: &Theme,
    geometry: BoardGeometry,
    flash: &mut Flash,
    now: Instant,
) {
    let delta = flash
        .process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    flash.process_time = Some(now);

    if flash.effect.is_none() {
        let positions: HashSet<(u16, u16)> = flash
            .cells
            .iter()
            .flat_map(|&cell| {
                let r = geometry.tile_rect(cell);
                (r.y..r.bottom()).flat_map(move |y| (r.x..r.right()).map(move |x| (x, y)))
            })
            .collect();
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            positions.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_from(theme.title, theme.title, (FLASH_MS, Interpolation::QuadOut))
            .with_filter(filter)
            .with_area(geometry.inner);
        flash.effect = Some(effect);
    }

    if let Some(effect) = flash.effect.as_mut() {
        frame.render_effect(effect, geometry.inner, TfxDuration::from_millis(delta_ms));
    }
}

/// Draw board + sidebar centred in `area`. Returns the board geometry for effects.
fn draw_game(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    cursor: usize,
    popups: &[Popup],
    best_score: u64,
) -> BoardGeometry {
    let n = state.grid().size();
    let cell = cell_size_for(area, n);
    let (pw, ph) = board_pixel_size(n, cell);
    let total_w = pw.saturating_add(SIDEBAR_WIDTH);
    let total_h = ph.max(SIDEBAR_HEIGHT);

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);
    let board_area = Rect {
        height: ph.min(inner[0].height),
        ..inner[0]
    };

    let geometry = draw_board(frame, state, theme, board_area, cell, cursor);
    draw_popups(frame.buffer_mut(), theme, geometry, popups);
    draw_sidebar(frame, state, theme, inner[1], best_score);
    geometry
}

fn draw_board(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    (cell_w, cell_h): (u16, u16),
    cursor: usize,
) -> BoardGeometry {
    let title = format!(" Chaintui  {} ", phase_label(state.phase()));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)))
        .style(Style::default().bg(theme.bg));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let geometry = BoardGeometry {
        inner,
        n: state.grid().size(),
        cell_w,
        cell_h,
    };
    let path = state.path();
    let buf = frame.buffer_mut();
    for (index, &cell) in state.grid().cells().iter().enumerate() {
        let rect = geometry.tile_rect(index).intersection(inner);
        if rect.is_empty() {
            continue;
        }
        let on_path = path.contains(index);
        let (label, style) = match cell {
            Cell::Empty => (
                "·".to_string(),
                Style::default().fg(theme.div_line).bg(theme.bg),
            ),
            Cell::Tile(v) if on_path => (
                v.to_string(),
                Style::default().fg(theme.tile_color(v)).bg(theme.path_bg).bold(),
            ),
            Cell::Tile(v) => (
                v.to_string(),
                Style::default().fg(theme.bg).bg(theme.tile_color(v)).bold(),
            ),
        };
        Block::default().style(style).render(rect, buf);
        let mid_y = rect.y + rect.height / 2;
        let label_w = label.chars().count() as u16;
        let label_x = rect.x + rect.width.saturating_sub(label_w) / 2;
        buf.set_stringn(label_x, mid_y, &label, rect.width as usize, style);

        if index == cursor && rect.width >= 3 {
            let marker = Style::default().fg(theme.main_fg).bg(style.bg.unwrap_or(theme.bg)).bold();
            buf.set_string(rect.x, mid_y, "[", marker);
            buf.set_string(rect.right() - 1, mid_y, "]", marker);
        }
    }
    geometry
}

/// Floating score and bonus labels above their anchor cell.
fn draw_popups(buf: &mut Buffer, theme: &Theme, geometry: BoardGeometry, popups: &[Popup]) {
    let bounds = geometry.inner.intersection(buf.area);
    for popup in popups {
        if popup.cell >= geometry.n * geometry.n {
            continue;
        }
        let anchor = geometry.tile_rect(popup.cell);
        let Some(y) = anchor.y.checked_sub(popup.rise) else {
            continue;
        };
        let x = anchor.x;
        if !bounds.contains(Position { x, y }) {
            continue;
        }
        let style = Style::default().fg(popup.color).bg(theme.bg).bold();
        let room = (bounds.right() - x) as usize;
        buf.set_stringn(x, y, &popup.text, room, style);
    }
}

fn sidebar_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn draw_sidebar(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect, best_score: u64) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let dim_style = Style::default().fg(theme.inactive_fg);
    let config = state.config();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Stats: score, best, target, moves
            Constraint::Length(4), // Combo + bar
            Constraint::Length(4), // Stock + bar
            Constraint::Length(6), // Level: tiles, shuffles, challenge
            Constraint::Length(4), // Path
            Constraint::Fill(1),   // Keys
        ])
        .split(area);

    // --- Stats ---
    let stats_block = sidebar_block(theme);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let target = config
        .target_score
        .map_or_else(|| "free play".to_string(), |t| t.to_string());
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best: ", title_style),
            Span::styled(best_score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Target: ", title_style),
            Span::styled(target, fg_style),
        ]),
        Line::from(vec![
            Span::styled("Moves: ", title_style),
            Span::styled(state.moves().to_string(), fg_style),
        ]),
    ];
    Paragraph::new(Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Combo ---
    let combo_block = sidebar_block(theme);
    let combo_inner = combo_block.inner(chunks[1]);
    combo_block.render(chunks[1], frame.buffer_mut());
    let combo_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(combo_inner);
    let combo = state.combo();
    let combo_label = if combo > 0 {
        format!("Combo x{combo}")
    } else {
        "Combo".to_string()
    };
    Paragraph::new(Line::from(Span::styled(combo_label, title_style)))
        .render(combo_layout[0], frame.buffer_mut());
    let combo_ratio = (f64::from(combo) / f64::from(COMBO_CELEBRATION)).min(1.0);
    Gauge::default()
        .ratio(combo_ratio)
        .label("")
        .gauge_style(Style::default().fg(theme.tile_color(5)).bg(theme.bg))
        .render(combo_layout[1], frame.buffer_mut());

    // --- Stock ---
    let stock_block = sidebar_block(theme);
    let stock_inner = stock_block.inner(chunks[2]);
    stock_block.render(chunks[2], frame.buffer_mut());
    let stock_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(stock_inner);
    Paragraph::new(Line::from(vec![
        Span::styled("Stock: ", title_style),
        Span::styled(
            format!("{}/{}", state.stock(), config.initial_stock),
            fg_style,
        ),
    ]))
    .render(stock_layout[0], frame.buffer_mut());
    let stock_ratio = if config.initial_stock > 0 {
        f64::from(state.stock()) / f64::from(config.initial_stock)
    } else {
        0.0
    };
    let bar_color = if stock_ratio > 0.5 {
        Color::Green
    } else if stock_ratio > 0.2 {
        Color::Yellow
    } else {
        Color::Red
    };
    Gauge::default()
        .ratio(stock_ratio.clamp(0.0, 1.0))
        .label("")
        .gauge_style(Style::default().fg(bar_color).bg(theme.bg))
        .render(stock_layout[1], frame.buffer_mut());

    // --- Level: tile strip, shuffles, challenge ---
    let level_block = sidebar_block(theme);
    let level_inner = level_block.inner(chunks[3]);
    level_block.render(chunks[3], frame.buffer_mut());
    let mut strip = vec![Span::styled("Tiles: ", title_style)];
    for v in 1..=config.max_value.min(9) {
        let c = theme.tile_color(v);
        strip.push(Span::styled(format!("{v}"), Style::default().fg(theme.bg).bg(c).bold()));
        strip.push(Span::raw(" "));
    }
    if config.max_value > 9 {
        strip.push(Span::styled(format!("..{}", config.max_value), dim_style));
    }
    let mut level_lines = vec![
        Line::from(strip),
        Line::from(vec![
            Span::styled("Shuffles: ", title_style),
            Span::styled(state.shuffles_left().to_string(), fg_style),
        ]),
    ];
    match state.summary().challenge {
        Some((challenge, done)) => {
            let (status, style) = if done {
                ("done", Style::default().fg(Color::Green))
            } else {
                ("open", dim_style)
            };
            level_lines.push(Line::from(vec![
                Span::styled("Challenge: ", title_style),
                Span::styled(status, style),
            ]));
            level_lines.push(Line::from(Span::styled(challenge.to_string(), fg_style)));
        }
        None if config.is_free_play() => level_lines.push(Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(format!("+{} each", config.line_bonus), fg_style),
        ])),
        None => level_lines.push(Line::from(Span::styled("No challenge", dim_style))),
    }
    Paragraph::new(Text::from(level_lines)).render(level_inner, frame.buffer_mut());

    // --- Path ---
    let path_block = sidebar_block(theme);
    let path_inner = path_block.inner(chunks[4]);
    path_block.render(chunks[4], frame.buffer_mut());
    let path = state.path();
    let path_lines = match path.value() {
        Some(value) => {
            let length = path.cells().len();
            let ready = path.is_valid_length();
            let outcome = if !ready {
                format!("need {}", value as usize + 1)
            } else if length as u32 > config.max_value {
                "explodes!".to_string()
            } else {
                format!("becomes {length}")
            };
            vec![
                Line::from(vec![
                    Span::styled("Path: ", title_style),
                    Span::styled(format!("{length} x {value}"), fg_style),
                ]),
                Line::from(Span::styled(
                    outcome,
                    if ready { fg_style.bold() } else { dim_style },
                )),
            ]
        }
        None => vec![
            Line::from(Span::styled("Path: ", title_style)),
            Line::from(Span::styled("Space to start", dim_style)),
        ],
    };
    Paragraph::new(Text::from(path_lines)).render(path_inner, frame.buffer_mut());

    // --- Keys ---
    let keys = vec![
        Line::from(Span::styled("Arrows/hjkl  move", dim_style)),
        Line::from(Span::styled("y u b n      diagonal", dim_style)),
        Line::from(Span::styled("Space        trace", dim_style)),
        Line::from(Span::styled("s shuffle  r restart", dim_style)),
    ];
    Paragraph::new(Text::from(keys))
        .render(chunks[5].inner(Margin::new(1, 0)), frame.buffer_mut());
}

/// Centered rect of at most `w` x `h` inside `area`.
fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_stuck_overlay(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let popup = centered(area, 34, 5);
    let lines = vec![
        Line::from(Span::styled("No moves left", Style::default().fg(theme.title).bold())),
        Line::from(Span::styled(
            format!("S to shuffle ({} left)", state.shuffles_left()),
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.title).bg(theme.bg))
                .style(Style::default().bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect, best: u64) {
    let summary = state.summary();
    let (title, banner) = match summary.phase {
        Phase::Victory => (" Victory! ", Style::default().fg(Color::Black).bg(Color::Green)),
        _ => (" Game Over ", Style::default().fg(Color::White).bg(Color::Red)),
    };
    let fg = Style::default().fg(theme.main_fg);
    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(title, banner)),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", summary.score), fg)),
        Line::from(Span::styled(format!(" Best: {best} "), fg)),
        Line::from(Span::styled(format!(" Moves: {} ", summary.moves), fg)),
    ];
    if let Some((challenge, done)) = summary.challenge {
        let status = if done { "done" } else { "missed" };
        lines.push(Line::from(Span::styled(
            format!(" Challenge {challenge}: {status} "),
            fg,
        )));
    }
    if summary.score >= best && summary.score > 0 {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" R: Restart    Q: Quit ", fg)));

    let popup = centered(area, 36, lines.len() as u16 + 3);
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .style(Style::default().bg(theme.bg))
                .title(Span::styled(" Chaintui ", theme.title)),
        )
        .render(popup, frame.buffer_mut());
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .style(Style::default().bg(theme.bg))
        .title(" Quit? ");

    Clear.render(quit_rect, frame.buffer_mut());
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for (i, opt) in QuitOption::ALL.into_iter().enumerate() {
        let style = if opt == selected {
            Style::default().fg(theme.bg).bg(theme.title).bold()
        } else {
            Style::default().fg(theme.title)
        };
        let label = opt.label();
        let rx = inner.x + inner.width.saturating_sub(label.len() as u16) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.bottom() {
            buf.set_stringn(rx, ry, label, inner.width as usize, style);
        }
    }
}
