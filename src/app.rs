//! App: terminal init, main loop, key handling and event feedback.

use crate::input::{Action, Step, key_to_action};
use crate::theme::Theme;
use anyhow::Result;
use chaintui::{Celebration, Extend, GameEvent, GameState, LevelConfig, Phase};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::style::Color;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::debug;

/// Frame budget for the draw/poll loop (~60 FPS).
const FRAME_MS: u64 = 16;
/// Popups float one row per step and disappear after their lifetime.
const POPUP_STEP_MS: u32 = 150;
const POPUP_LIFETIME_MS: u32 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    Restart,
    Exit,
}

impl QuitOption {
    pub const ALL: [Self; 3] = [Self::Resume, Self::Restart, Self::Exit];

    fn next(self) -> Self {
        match self {
            Self::Resume => Self::Restart,
            Self::Restart => Self::Exit,
            Self::Exit => Self::Resume,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Resume => Self::Exit,
            Self::Restart => Self::Resume,
            Self::Exit => Self::Restart,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Resume => " Resume ",
            Self::Restart => " Restart ",
            Self::Exit => " Exit ",
        }
    }
}

/// Floating text anchored to a board cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub cell: usize,
    /// Rows above the anchor; grows as the popup ages.
    pub rise: u16,
    pub text: String,
    pub color: Color,
    pub age_ms: u32,
}

/// Explosion flash over the cells of the last destructive move.
#[derive(Default)]
pub struct Flash {
    pub cells: Vec<usize>,
    /// Created on the first frame that draws it.
    pub effect: Option<Effect>,
    pub process_time: Option<Instant>,
}

impl Flash {
    pub fn is_active(&self) -> bool {
        !self.cells.is_empty()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

pub struct App {
    theme: Theme,
    no_animation: bool,
    state: GameState,
    screen: Screen,
    cursor: usize,
    quit_selected: QuitOption,
    /// Best score this session.
    best_score: u64,
    popups: Vec<Popup>,
    flash: Flash,
}

impl App {
    pub fn new(config: LevelConfig, theme: Theme, no_animation: bool) -> Result<Self> {
        let mut state = GameState::new(config)?;
        let _ = state.drain_events();
        let screen = if state.phase().is_terminal() {
            Screen::GameOver
        } else {
            Screen::Playing
        };
        Ok(Self {
            theme,
            no_animation,
            state,
            screen,
            cursor: 0,
            quit_selected: QuitOption::Resume,
            best_score: 0,
            popups: Vec::new(),
            flash: Flash::default(),
        })
    }

    fn reset_game(&mut self) {
        self.state.reset();
        let _ = self.state.drain_events();
        self.screen = if self.state.phase().is_terminal() {
            Screen::GameOver
        } else {
            Screen::Playing
        };
        self.cursor = 0;
        self.popups.clear();
        self.flash.clear();
    }

    fn move_cursor(&mut self, step: Step) {
        let Some(next) = step.apply(self.cursor, self.state.grid().size()) else {
            return;
        };
        if self.state.path().is_open() {
            // The cursor follows the path; a refused step leaves it on the path's end.
            match self.state.extend(next) {
                Extend::Appended | Extend::Backtracked => self.cursor = next,
                Extend::Ignored => {}
            }
        } else {
            self.cursor = next;
        }
    }

    fn trace(&mut self) {
        if self.state.path().is_open() {
            let _ = self.state.release();
            self.handle_events();
        } else if !self.state.begin(self.cursor) {
            debug!(cell = self.cursor, phase = ?self.state.phase(), "path not started");
        }
    }

    fn shuffle(&mut self) {
        if self.state.shuffle() {
            self.handle_events();
        } else {
            self.push_popup(self.cursor, "No shuffles".to_string(), self.theme.inactive_fg);
        }
    }

    fn push_popup(&mut self, cell: usize, text: String, color: Color) {
        // Popups raised together stack upwards instead of overlapping.
        let rise = self
            .popups
            .iter()
            .filter(|p| p.cell == cell && p.age_ms == 0)
            .count() as u16;
        self.popups.push(Popup {
            cell,
            rise,
            text,
            color,
            age_ms: 0,
        });
    }

    /// Turn engine events into popups, the explosion flash and screen changes.
    fn handle_events(&mut self) {
        let mut anchor = self.cursor;
        for event in self.state.drain_events() {
            debug!(?event, "game event");
            match event {
                GameEvent::Transformed { cells, .. } => {
                    anchor = cells.last().copied().unwrap_or(anchor);
                }
                GameEvent::Destroyed { cells } => {
                    anchor = cells.last().copied().unwrap_or(anchor);
                    if !self.no_animation {
                        self.flash = Flash {
                            cells,
                            ..Flash::default()
                        };
                    }
                }
                GameEvent::Scored { points, combo, .. } => {
                    let text = if combo > 1 {
                        format!("+{points} (x{combo})")
                    } else {
                        format!("+{points}")
                    };
                    self.push_popup(anchor, text, self.theme.title);
                }
                GameEvent::MoveRejected { length, value } => {
                    let text = format!("{length} is not > {value}");
                    self.push_popup(anchor, text, self.theme.inactive_fg);
                }
                GameEvent::ChallengeCompleted { line } => {
                    let text = format!("Challenge! {line}");
                    self.push_popup(anchor, text, self.theme.tile_color(3));
                }
                GameEvent::LineBonus { line, points, .. } => {
                    let text = format!("+{points} {line}");
                    self.push_popup(anchor, text, self.theme.tile_color(6));
                }
                GameEvent::Celebration(kind) => {
                    let text = match kind {
                        Celebration::Big => "Great!",
                        Celebration::Combo => "Combo!",
                        Celebration::Huge => "Amazing!",
                    };
                    self.push_popup(anchor, text.to_string(), self.theme.tile_color(5));
                }
                GameEvent::Shuffled { remaining } => {
                    let text = format!("Shuffled, {remaining} left");
                    self.push_popup(anchor, text, self.theme.main_fg);
                }
                GameEvent::PhaseChanged { to, .. } => {
                    if to.is_terminal() {
                        self.screen = Screen::GameOver;
                    }
                }
            }
        }
        self.best_score = self.best_score.max(self.state.score());
    }

    fn tick_popups(&mut self, delta_ms: u32) {
        self.popups.retain_mut(|p| {
            let old_steps = p.age_ms / POPUP_STEP_MS;
            p.age_ms += delta_ms;
            if p.age_ms / POPUP_STEP_MS > old_steps {
                p.rise += 1;
            }
            p.age_ms < POPUP_LIFETIME_MS
        });
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.state,
                    &self.theme,
                    self.cursor,
                    &self.popups,
                    self.best_score,
                    self.quit_selected,
                    &mut self.flash,
                    now,
                )
            })?;

            if self.flash.effect.as_ref().is_some_and(Effect::done) {
                self.flash.clear();
            }

            let frame_duration = Duration::from_millis(FRAME_MS);
            let timeout = frame_duration.saturating_sub(now.elapsed());
            self.tick_popups(FRAME_MS as u32);

            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if !self.handle_action(key_to_action(key)) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Applies one action to the current screen. `false` means exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match self.screen {
            Screen::Playing => match action {
                Action::Move(step) => self.move_cursor(step),
                Action::Trace => self.trace(),
                Action::Shuffle => self.shuffle(),
                Action::Restart => self.reset_game(),
                Action::Quit => {
                    self.screen = Screen::QuitMenu;
                    self.quit_selected = QuitOption::Resume;
                }
                Action::None => {}
            },
            Screen::QuitMenu => match action {
                Action::Move(Step::Down | Step::Right) => {
                    self.quit_selected = self.quit_selected.next();
                }
                Action::Move(Step::Up | Step::Left) => {
                    self.quit_selected = self.quit_selected.prev();
                }
                Action::Trace => match self.quit_selected {
                    QuitOption::Resume => self.screen = Screen::Playing,
                    QuitOption::Restart => self.reset_game(),
                    QuitOption::Exit => return false,
                },
                Action::Quit => self.screen = Screen::Playing,
                _ => {}
            },
            Screen::GameOver => match action {
                Action::Quit => return false,
                Action::Restart | Action::Trace => self.reset_game(),
                _ => {}
            },
        }
        true
    }
}

/// Short status line for the board title.
pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Playing => "Playing",
        Phase::Stuck => "Stuck",
        Phase::Victory => "Victory",
        Phase::Defeat => "Defeat",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    const BOARD: [u32; 9] = [
        1, 1, 2,
        3, 2, 3,
        2, 3, 1,
    ];

    fn app() -> App {
        let config = LevelConfig::new(3, 3, 20)
            .with_grid(BOARD.to_vec())
            .with_target(Some(10_000))
            .with_shuffles(1)
            .with_seed(5);
        App::new(config, Theme::default(), false).unwrap()
    }

    #[test]
    fn test_cursor_traces_and_releases_a_pair() {
        let mut app = app();
        app.handle_action(Action::Trace);
        app.handle_action(Action::Move(Step::Right));
        assert_eq!(app.cursor, 1);
        assert_eq!(app.state.path().cells(), &[0, 1]);
        app.handle_action(Action::Trace);
        assert_eq!(app.state.score(), 8);
        assert_eq!(app.best_score, 8);
        assert!(app.popups.iter().any(|p| p.text == "+8"));
    }

    #[test]
    fn test_refused_step_keeps_cursor_on_path_end() {
        let mut app = app();
        app.handle_action(Action::Trace);
        app.handle_action(Action::Move(Step::Down));
        assert_eq!(app.cursor, 0);
        assert_eq!(app.state.path().cells(), &[0]);
    }

    #[test]
    fn test_quit_menu_cycles_and_exits() {
        let mut app = app();
        assert!(app.handle_action(Action::Quit));
        assert_eq!(app.screen, Screen::QuitMenu);
        app.handle_action(Action::Move(Step::Up));
        assert_eq!(app.quit_selected, QuitOption::Exit);
        assert!(!app.handle_action(Action::Trace));
    }

    #[test]
    fn test_popups_rise_and_expire() {
        let mut app = app();
        app.push_popup(4, "hi".to_string(), Color::White);
        app.tick_popups(POPUP_STEP_MS);
        assert_eq!(app.popups[0].rise, 1);
        app.tick_popups(POPUP_LIFETIME_MS);
        assert!(app.popups.is_empty());
    }
}
