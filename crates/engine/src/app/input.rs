use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::warn;

use super::{Clock, Direction};

static INPUT_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_input_lock_poison_once(operation: &'static str) {
    if INPUT_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "input lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Exit,
}

const ACTION_COUNT: usize = 5;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Exit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Exit => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            InputAction::MoveUp => "up",
            InputAction::MoveDown => "down",
            InputAction::MoveLeft => "left",
            InputAction::MoveRight => "right",
            InputAction::Exit => "exit",
        }
    }

    /// Direction tokens go through [`Direction`]'s parser; `exit` is the
    /// only non-directional name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.parse::<Direction>() {
            Ok(direction) => Some(InputAction::from(direction)),
            Err(_) => name
                .trim()
                .eq_ignore_ascii_case(InputAction::Exit.name())
                .then_some(InputAction::Exit),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

/// Read side of the keyboard, as seen by the two loops.
///
/// `latest_press` is sticky: it keeps returning the most recent press until a
/// newer one arrives, and consuming it does not clear it.
pub trait DirectionInput: Send + Sync {
    fn latest_press(&self) -> Option<InputAction>;

    fn action_state(&self, action: InputAction) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
struct InputState {
    latest_press: Option<InputAction>,
    actions: ActionStates,
}

/// Keyboard state written by the window thread and read by both loops.
#[derive(Debug, Clone, Default)]
pub struct SharedInput {
    state: Arc<RwLock<InputState>>,
}

impl SharedInput {
    pub fn press(&self, action: InputAction) {
        self.write(|state| {
            state.actions.set(action, true);
            state.latest_press = Some(action);
        });
    }

    pub fn release(&self, action: InputAction) {
        self.write(|state| state.actions.set(action, false));
    }

    fn read(&self) -> InputState {
        match self.state.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_input_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    fn write(&self, apply: impl FnOnce(&mut InputState)) {
        match self.state.write() {
            Ok(mut guard) => apply(&mut guard),
            Err(poisoned) => {
                warn_input_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                apply(&mut guard);
            }
        }
    }
}

impl DirectionInput for SharedInput {
    fn latest_press(&self) -> Option<InputAction> {
        self.read().latest_press
    }

    fn action_state(&self, action: InputAction) -> bool {
        self.read().actions.is_down(action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedPress {
    pub at_ms: u64,
    pub action: InputAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptParseError {
    #[error("script entry '{entry}' is not in <ms>:<action> form")]
    MalformedEntry { entry: String },
    #[error("script entry '{entry}' has an invalid millisecond offset")]
    InvalidOffset { entry: String },
}

/// Replays key presses at fixed offsets from a start time.
///
/// An `exit` press is treated as held from its offset onward so the render
/// side can observe it on any later frame.
pub struct ScriptedInput {
    presses: Vec<ScriptedPress>,
    start_ms: u64,
    clock: Arc<dyn Clock>,
}

impl ScriptedInput {
    pub fn new(mut presses: Vec<ScriptedPress>, clock: Arc<dyn Clock>) -> Self {
        presses.sort_by_key(|press| press.at_ms);
        let start_ms = clock.now_ms();
        Self {
            presses,
            start_ms,
            clock,
        }
    }

    /// Parses `"<ms>:<action>,..."`. Unknown action names are skipped with a
    /// warning; they would be ignored by the simulation anyway.
    pub fn parse_script(script: &str) -> Result<Vec<ScriptedPress>, ScriptParseError> {
        let mut presses = Vec::new();
        for entry in script.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (offset, name) =
                entry
                    .split_once(':')
                    .ok_or_else(|| ScriptParseError::MalformedEntry {
                        entry: entry.to_string(),
                    })?;
            let at_ms = offset
                .trim()
                .parse::<u64>()
                .map_err(|_| ScriptParseError::InvalidOffset {
                    entry: entry.to_string(),
                })?;
            match InputAction::from_name(name) {
                Some(action) => presses.push(ScriptedPress { at_ms, action }),
                None => warn!(entry, "unknown scripted action; ignoring"),
            }
        }
        Ok(presses)
    }

    fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.start_ms)
    }
}

impl DirectionInput for ScriptedInput {
    fn latest_press(&self) -> Option<InputAction> {
        let elapsed = self.elapsed_ms();
        self.presses
            .iter()
            .take_while(|press| press.at_ms <= elapsed)
            .last()
            .map(|press| press.action)
    }

    fn action_state(&self, action: InputAction) -> bool {
        let elapsed = self.elapsed_ms();
        match action {
            InputAction::Exit => self
                .presses
                .iter()
                .any(|press| press.action == InputAction::Exit && press.at_ms <= elapsed),
            _ => self.latest_press() == Some(action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ManualClock;

    #[test]
    fn latest_press_is_sticky_until_next_press() {
        let input = SharedInput::default();
        assert_eq!(input.latest_press(), None);

        input.press(InputAction::MoveLeft);
        input.release(InputAction::MoveLeft);
        assert_eq!(input.latest_press(), Some(InputAction::MoveLeft));
        assert_eq!(input.latest_press(), Some(InputAction::MoveLeft));

        input.press(InputAction::MoveDown);
        assert_eq!(input.latest_press(), Some(InputAction::MoveDown));
    }

    #[test]
    fn release_clears_action_state() {
        let input = SharedInput::default();
        input.press(InputAction::Exit);
        assert!(input.action_state(InputAction::Exit));

        input.release(InputAction::Exit);
        assert!(!input.action_state(InputAction::Exit));
    }

    #[test]
    fn clones_observe_the_same_keyboard() {
        let writer = SharedInput::default();
        let reader = writer.clone();
        writer.press(InputAction::MoveRight);
        assert_eq!(reader.latest_press(), Some(InputAction::MoveRight));
    }

    #[test]
    fn action_names_parse_case_insensitively() {
        assert_eq!(InputAction::from_name("LEFT"), Some(InputAction::MoveLeft));
        assert_eq!(InputAction::from_name(" exit"), Some(InputAction::Exit));
        assert_eq!(InputAction::from_name("jump"), None);
    }

    #[test]
    fn script_parsing_skips_unknown_actions() {
        let presses = ScriptedInput::parse_script("100:left, 250:jump,400:up").expect("script");
        assert_eq!(
            presses,
            vec![
                ScriptedPress {
                    at_ms: 100,
                    action: InputAction::MoveLeft
                },
                ScriptedPress {
                    at_ms: 400,
                    action: InputAction::MoveUp
                },
            ]
        );
    }

    #[test]
    fn script_direction_tokens_ignore_case_and_padding() {
        let presses =
            ScriptedInput::parse_script("10: LEFT ,20:Down,30:EXIT,40:exit_now").expect("script");
        let actions: Vec<InputAction> = presses.iter().map(|press| press.action).collect();
        assert_eq!(
            actions,
            vec![InputAction::MoveLeft, InputAction::MoveDown, InputAction::Exit]
        );
    }

    #[test]
    fn script_parsing_rejects_malformed_entries() {
        assert_eq!(
            ScriptedInput::parse_script("left"),
            Err(ScriptParseError::MalformedEntry {
                entry: "left".to_string()
            })
        );
        assert_eq!(
            ScriptedInput::parse_script("soon:left"),
            Err(ScriptParseError::InvalidOffset {
                entry: "soon:left".to_string()
            })
        );
    }

    #[test]
    fn scripted_presses_follow_the_clock() {
        let clock = ManualClock::new(1_000);
        let presses = ScriptedInput::parse_script("0:right,500:down,900:exit").expect("script");
        let input = ScriptedInput::new(presses, Arc::new(clock.clone()));

        assert_eq!(input.latest_press(), Some(InputAction::MoveRight));
        clock.advance(499);
        assert_eq!(input.latest_press(), Some(InputAction::MoveRight));
        clock.advance(1);
        assert_eq!(input.latest_press(), Some(InputAction::MoveDown));
        assert!(!input.action_state(InputAction::Exit));

        clock.advance(400);
        assert!(input.action_state(InputAction::Exit));
        assert_eq!(input.latest_press(), Some(InputAction::Exit));
    }
}
