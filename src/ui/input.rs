/// Terminal input collector.
///
/// Once per frame `drain_events` reads everything crossterm has queued:
///   - key presses become `Action`s (Release/Repeat are ignored, so holding
///     a key never rejects twice)
///   - left clicks are kept as cell coordinates for hit-testing
///   - pointer motion keeps only the latest position; moving onto "No"
///     counts as an approach
///
/// `resolve` turns an `Action` into what it means on the current screen.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::sim::card::Phase;
use crate::sim::question::FocusMove;

/// Device-independent controls, from keyboard or gamepad.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Yes,
    No,
    Left,
    Right,
    Tab,
    /// Enter / Space / gamepad confirm.
    Activate,
    /// Esc / gamepad cancel.
    Back,
    /// `Q` / Ctrl+C.
    Quit,
}

/// What an action does on the current screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Accept,
    Reject,
    Focus(FocusMove),
    Activate,
    Dismiss,
    Exit,
}

pub fn key_action(key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Yes),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Action::No),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Activate),
        KeyCode::Left => Some(Action::Left),
        KeyCode::Right => Some(Action::Right),
        KeyCode::Tab | KeyCode::BackTab => Some(Action::Tab),
        KeyCode::Esc => Some(Action::Back),
        _ => None,
    }
}

/// Ctrl+C always exits. Otherwise the modal swallows everything but its own
/// dismissal, and the celebration only listens for the way out.
pub fn resolve(action: Action, phase: Phase, modal_open: bool) -> Option<Intent> {
    if action == Action::Quit {
        return Some(Intent::Exit);
    }
    match phase {
        Phase::Celebrating => match action {
            Action::Activate | Action::Back => Some(Intent::Exit),
            _ => None,
        },
        Phase::Asking if modal_open => match action {
            Action::Activate | Action::Back => Some(Intent::Dismiss),
            _ => None,
        },
        Phase::Asking => match action {
            Action::Yes => Some(Intent::Accept),
            Action::No => Some(Intent::Reject),
            Action::Left => Some(Intent::Focus(FocusMove::Left)),
            Action::Right => Some(Intent::Focus(FocusMove::Right)),
            Action::Tab => Some(Intent::Focus(FocusMove::Toggle)),
            Action::Activate => Some(Intent::Activate),
            Action::Back => Some(Intent::Exit),
            Action::Quit => Some(Intent::Exit),
        },
    }
}

pub struct InputState {
    /// Actions from key presses this frame, in arrival order.
    pub actions: Vec<Action>,
    /// Left-button presses this frame as (column, row).
    pub clicks: Vec<(u16, u16)>,
    /// Last known pointer cell.
    pub pointer: Option<(u16, u16)>,
    /// Pointer moved during the last drain.
    pub pointer_moved: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            actions: Vec::with_capacity(8),
            clicks: Vec::with_capacity(4),
            pointer: None,
            pointer_moved: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.actions.clear();
        self.clicks.clear();
        self.pointer_moved = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.absorb(ev),
                Err(_) => break,
            }
        }
    }

    fn absorb(&mut self, ev: Event) {
        match ev {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let Some(action) = key_action(&key) {
                    self.actions.push(action);
                }
            }
            Event::Mouse(m) => match m.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    self.pointer = Some((m.column, m.row));
                    self.clicks.push((m.column, m.row));
                }
                MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                    if self.pointer != Some((m.column, m.row)) {
                        self.pointer = Some((m.column, m.row));
                        self.pointer_moved = true;
                    }
                }
                _ => {}
            },
            // Resizes are picked up by `Renderer::grid`.
            _ => {}
        }
    }
}
