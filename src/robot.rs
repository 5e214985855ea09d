//! Robot state.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Pose, ZoneId};

/// Load state of a single robot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LoadState {
    #[default]
    SeekingLoad,
    Carrying {
        /// Category of the carried load (`None` when the source zone had none).
        category: Option<String>,
        /// Zone the load was picked up from.
        source: ZoneId,
    },
}

impl LoadState {
    pub fn is_carrying(&self) -> bool {
        matches!(self, LoadState::Carrying { .. })
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            LoadState::Carrying { category, .. } => category.as_deref(),
            LoadState::SeekingLoad => None,
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::SeekingLoad => write!(f, "seeking-load"),
            LoadState::Carrying { category: Some(c), .. } => write!(f, "carrying {c}"),
            LoadState::Carrying { category: None, .. } => write!(f, "carrying"),
        }
    }
}

/// State of one robot in the fleet.
///
/// The pose is advanced by the motion controller. Load state, target zone
/// and delivery count are only changed by [`crate::tracker::GoalTracker`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Robot {
    pub index: usize,
    pub pose: Pose,
    pub(crate) load: LoadState,
    pub(crate) target: Option<ZoneId>,
    pub(crate) deliveries: u32,
}

impl Robot {
    pub fn new(index: usize, pose: Pose) -> Self {
        Self {
            index,
            pose,
            load: LoadState::SeekingLoad,
            target: None,
            deliveries: 0,
        }
    }

    pub fn load(&self) -> &LoadState {
        &self.load
    }

    pub fn is_loaded(&self) -> bool {
        self.load.is_carrying()
    }

    /// Currently assigned goal zone, if the scenario assigns one.
    pub fn target(&self) -> Option<ZoneId> {
        self.target
    }

    /// Completed deliveries this episode.
    pub fn deliveries(&self) -> u32 {
        self.deliveries
    }

    /// Encodes the robot as `[x, y, loaded]`.
    pub fn features(&self) -> [f64; 3] {
        [
            self.pose.position.x,
            self.pose.position.y,
            if self.is_loaded() { 1.0 } else { 0.0 },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_robot_seeks_load() {
        let r = Robot::new(3, Pose::at(0.5, -0.5));
        assert_eq!(r.index, 3);
        assert!(!r.is_loaded());
        assert_eq!(r.target(), None);
        assert_eq!(r.deliveries(), 0);
        assert_eq!(r.features(), [0.5, -0.5, 0.0]);
    }

    #[test]
    fn carrying_exposes_category() {
        let state = LoadState::Carrying {
            category: Some("red".into()),
            source: 0,
        };
        assert!(state.is_carrying());
        assert_eq!(state.category(), Some("red"));
        assert_eq!(state.to_string(), "carrying red");
        assert_eq!(LoadState::SeekingLoad.to_string(), "seeking-load");
    }
}
