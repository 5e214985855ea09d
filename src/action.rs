//! Discrete robot actions and their desired displacements.

use std::fmt;

use crate::error::StepError;
use crate::geometry::Vec2;

/// One discrete action per robot per step.
///
/// Ids follow the policy's action space: `0 = left`, `1 = right`, `2 = up`,
/// `3 = down`, `4 = no_action`. "Up" decreases y, matching the workspace's
/// `up`/`down` boundary naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    NoAction,
}

impl Action {
    pub const COUNT: usize = 5;

    pub fn all() -> [Action; Self::COUNT] {
        [
            Action::Left,
            Action::Right,
            Action::Up,
            Action::Down,
            Action::NoAction,
        ]
    }

    pub fn id(&self) -> usize {
        match self {
            Action::Left => 0,
            Action::Right => 1,
            Action::Up => 2,
            Action::Down => 3,
            Action::NoAction => 4,
        }
    }

    /// Desired displacement for a step distance `d`.
    ///
    /// Knows nothing about obstacles, the boundary or other robots.
    pub fn displacement(&self, d: f64) -> Vec2 {
        match self {
            Action::Left => Vec2::new(-d, 0.0),
            Action::Right => Vec2::new(d, 0.0),
            Action::Up => Vec2::new(0.0, -d),
            Action::Down => Vec2::new(0.0, d),
            Action::NoAction => Vec2::ZERO,
        }
    }

    /// Converts a whole action vector, failing on the first invalid id.
    pub fn parse_all(ids: &[usize]) -> Result<Vec<Action>, StepError> {
        ids.iter()
            .enumerate()
            .map(|(robot, &id)| {
                Action::try_from(id).map_err(|_| StepError::InvalidAction { robot, action: id })
            })
            .collect()
    }
}

impl TryFrom<usize> for Action {
    type Error = StepError;

    fn try_from(id: usize) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Action::Left),
            1 => Ok(Action::Right),
            2 => Ok(Action::Up),
            3 => Ok(Action::Down),
            4 => Ok(Action::NoAction),
            action => Err(StepError::InvalidAction { robot: 0, action }),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Left => write!(f, "left"),
            Action::Right => write!(f, "right"),
            Action::Up => write!(f, "up"),
            Action::Down => write!(f, "down"),
            Action::NoAction => write!(f, "no_action"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for action in Action::all() {
            assert_eq!(Action::try_from(action.id()), Ok(action));
        }
    }

    #[test]
    fn displacements_move_one_axis() {
        assert_eq!(Action::Left.displacement(0.15), Vec2::new(-0.15, 0.0));
        assert_eq!(Action::Right.displacement(0.15), Vec2::new(0.15, 0.0));
        assert_eq!(Action::Up.displacement(0.15), Vec2::new(0.0, -0.15));
        assert_eq!(Action::Down.displacement(0.15), Vec2::new(0.0, 0.15));
        assert_eq!(Action::NoAction.displacement(0.15), Vec2::ZERO);
    }

    #[test]
    fn out_of_range_id_is_rejected() {
        assert_eq!(
            Action::try_from(5),
            Err(StepError::InvalidAction { robot: 0, action: 5 })
        );
    }

    #[test]
    fn parse_all_reports_robot_index() {
        assert_eq!(
            Action::parse_all(&[4, 1, 9]),
            Err(StepError::InvalidAction { robot: 2, action: 9 })
        );
        assert_eq!(
            Action::parse_all(&[0, 4]).unwrap(),
            vec![Action::Left, Action::NoAction]
        );
    }
}
