/// Gamepad input using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick ←→  Move focus
///   A                      Yes
///   B                      No
///   Start                  Activate focused / dismiss error
///   Select                 Back (dismiss error, or leave)
///
/// Only presses count. Each frame `update` polls gilrs and `actions`
/// reports what was pressed since the previous frame.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use super::input::Action;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Which buttons trigger which card action.
#[derive(Debug, PartialEq)]
struct ActionMap {
    accept: Vec<Btn>,
    reject: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            accept: vec![Btn::A],
            reject: vec![Btn::B],
            confirm: vec![Btn::Start],
            cancel: vec![Btn::Select],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; a list with nothing usable keeps the default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() { fallback } else { parsed }
        }
        let d = ActionMap::default();
        ActionMap {
            accept: parse_list(&cfg.accept, d.accept),
            reject: parse_list(&cfg.reject, d.reject),
            confirm: parse_list(&cfg.confirm, d.confirm),
            cancel: parse_list(&cfg.cancel, d.cancel),
        }
    }

    fn action_for(&self, btn: Btn) -> Option<Action> {
        if self.accept.contains(&btn) {
            Some(Action::Yes)
        } else if self.reject.contains(&btn) {
            Some(Action::No)
        } else if self.confirm.contains(&btn) {
            Some(Action::Activate)
        } else if self.cancel.contains(&btn) {
            Some(Action::Back)
        } else {
            None
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    action_map: ActionMap,
    /// Actions pressed since the last `update`.
    pending: Vec<Action>,
    /// Stick direction currently held: -1, 0, 1.
    stick_dir: i8,

    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(_) => (None, false),
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            action_map: ActionMap::from_config(cfg),
            pending: Vec::with_capacity(4),
            stick_dir: 0,
            connected,
        }
    }

    pub fn update(&mut self) {
        self.pending.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    /// Presses from the last `update`, in arrival order.
    pub fn actions(&self) -> &[Action] {
        &self.pending
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                    self.connected = true;
                    self.stick(value);
                }
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick_dir = 0;
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, btn: Button) {
        let action = match btn {
            Button::DPadLeft => Some(Action::Left),
            Button::DPadRight => Some(Action::Right),
            other => Btn::from_gilrs(other).and_then(|b| self.action_map.action_for(b)),
        };
        if let Some(a) = action {
            self.pending.push(a);
        }
    }

    /// Edge-trigger the stick: one focus move per push past the deadzone.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn stick(&mut self, x: f32) {
        let dir = if x < -STICK_DEADZONE {
            -1
        } else if x > STICK_DEADZONE {
            1
        } else {
            0
        };
        if dir != self.stick_dir {
            match dir {
                -1 => self.pending.push(Action::Left),
                1 => self.pending.push(Action::Right),
                _ => {}
            }
            self.stick_dir = dir;
        }
    }
}
