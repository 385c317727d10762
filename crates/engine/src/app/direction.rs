use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::InputAction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized direction token '{token}'")]
pub struct ParseDirectionError {
    pub token: String,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Counter-clockwise angle (y-up) that turns an `Up`-facing shape toward this direction.
    pub fn rotation_radians(self) -> f32 {
        match self {
            Direction::Up => 0.0,
            Direction::Down => PI,
            Direction::Left => FRAC_PI_2,
            Direction::Right => -FRAC_PI_2,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let trimmed = token.trim();
        Direction::ALL
            .into_iter()
            .find(|direction| direction.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseDirectionError {
                token: token.to_string(),
            })
    }
}

impl From<Direction> for InputAction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => InputAction::MoveUp,
            Direction::Down => InputAction::MoveDown,
            Direction::Left => InputAction::MoveLeft,
            Direction::Right => InputAction::MoveRight,
        }
    }
}

impl TryFrom<InputAction> for Direction {
    type Error = ParseDirectionError;

    fn try_from(action: InputAction) -> Result<Self, Self::Error> {
        match action {
            InputAction::MoveUp => Ok(Direction::Up),
            InputAction::MoveDown => Ok(Direction::Down),
            InputAction::MoveLeft => Ok(Direction::Left),
            InputAction::MoveRight => Ok(Direction::Right),
            other => Err(ParseDirectionError {
                token: other.name().to_string(),
            }),
        }
    }
}
