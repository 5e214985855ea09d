//! Per-step scene snapshot for rendering and recording collaborators.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::EpisodeState;
use crate::geometry::{GoalZone, Pose, Rect, Workspace, ZoneId};

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SceneSnapshot {
    pub step: u32,
    pub poses: Vec<Pose>,
    pub loaded: Vec<bool>,
    pub targets: Vec<Option<ZoneId>>,
    pub obstacles: Vec<Rect>,
    pub zones: Vec<GoalZone>,
}

impl SceneSnapshot {
    pub fn capture(workspace: &Workspace, state: &EpisodeState) -> Self {
        Self {
            step: state.step,
            poses: state.robots.iter().map(|r| r.pose).collect(),
            loaded: state.robots.iter().map(|r| r.is_loaded()).collect(),
            targets: state.robots.iter().map(|r| r.target()).collect(),
            obstacles: workspace.obstacles().to_vec(),
            zones: workspace.zones().to_vec(),
        }
    }
}
