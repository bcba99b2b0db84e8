//! Key bindings: arrows / vim-style hjkl for orthogonal moves, yubn for diagonals.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// One of the eight cursor steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Step {
    /// (row delta, col delta).
    pub fn delta(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
            Self::UpLeft => (-1, -1),
            Self::UpRight => (-1, 1),
            Self::DownLeft => (1, -1),
            Self::DownRight => (1, 1),
        }
    }

    /// Cell index after stepping from `index` on an `n`-wide grid; `None` off the edge.
    pub fn apply(self, index: usize, n: usize) -> Option<usize> {
        let (dr, dc) = self.delta();
        let row = (index / n).checked_add_signed(dr)?;
        let col = (index % n).checked_add_signed(dc)?;
        (row < n && col < n).then_some(row * n + col)
    }
}

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Step),
    /// Start a path under the cursor, or release the open one.
    Trace,
    Shuffle,
    Restart,
    Quit,
    None,
}

/// Map key event to game action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::Move(Step::Up),
        KeyCode::Down | KeyCode::Char('j') => Action::Move(Step::Down),
        KeyCode::Left | KeyCode::Char('h') => Action::Move(Step::Left),
        KeyCode::Right | KeyCode::Char('l') => Action::Move(Step::Right),
        KeyCode::Char('y') | KeyCode::Home => Action::Move(Step::UpLeft),
        KeyCode::Char('u') | KeyCode::PageUp => Action::Move(Step::UpRight),
        KeyCode::Char('b') | KeyCode::End => Action::Move(Step::DownLeft),
        KeyCode::Char('n') | KeyCode::PageDown => Action::Move(Step::DownRight),
        KeyCode::Enter | KeyCode::Char(' ') => Action::Trace,
        KeyCode::Char('s') => Action::Shuffle,
        KeyCode::Char('r' | 'R') => Action::Restart,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Action {
        key_to_action(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_vim_and_arrow_keys_agree() {
        assert_eq!(press(KeyCode::Char('h')), press(KeyCode::Left));
        assert_eq!(press(KeyCode::Char('n')), Action::Move(Step::DownRight));
        assert_eq!(press(KeyCode::Char(' ')), Action::Trace);
    }

    #[test]
    fn test_control_chords_are_ignored() {
        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(key), Action::None);
    }

    #[test]
    fn test_step_stays_on_board() {
        assert_eq!(Step::UpLeft.apply(0, 4), None);
        assert_eq!(Step::Right.apply(3, 4), None);
        assert_eq!(Step::DownRight.apply(0, 4), Some(5));
        assert_eq!(Step::Down.apply(12, 4), None);
    }
}
