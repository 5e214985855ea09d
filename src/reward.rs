//! Per-robot rewards and episode termination.

use std::fmt;

use crate::config::WarehouseConfig;
use crate::robot::Robot;
use crate::tracker::Transition;

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The step counter reached the configured horizon.
    Horizon,
    /// Every robot completed the configured number of deliveries.
    DeliveriesComplete,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Horizon => write!(f, "horizon reached"),
            Termination::DeliveriesComplete => write!(f, "all deliveries complete"),
        }
    }
}

/// Converts load transitions into rewards and decides when the episode ends.
///
/// Rewards stay per robot; a team reward is the caller's sum.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardEngine {
    load_reward: f64,
    unload_reward: f64,
    step_penalty: f64,
    horizon: u32,
    deliveries_to_finish: Option<u32>,
}

impl RewardEngine {
    pub fn from_config(config: &WarehouseConfig) -> Self {
        Self {
            load_reward: config.load_reward,
            unload_reward: config.unload_reward,
            step_penalty: config.step_penalty,
            horizon: config.horizon,
            deliveries_to_finish: config.deliveries_to_finish,
        }
    }

    /// Reward for a single robot's transition this step.
    ///
    /// # Components
    ///
    /// 1. `load_reward` for seeking-load → carrying.
    /// 2. `unload_reward` for carrying → seeking-load.
    /// 3. `step_penalty`, added every step (zero by default).
    pub fn reward_for(&self, transition: &Transition) -> f64 {
        let task = match transition {
            Transition::None => 0.0,
            Transition::Loaded { .. } => self.load_reward,
            Transition::Delivered { .. } => self.unload_reward,
        };
        task + self.step_penalty
    }

    pub fn rewards(&self, transitions: &[Transition]) -> Vec<f64> {
        transitions.iter().map(|t| self.reward_for(t)).collect()
    }

    /// Global termination check after `step` completed steps.
    pub fn termination(&self, step: u32, robots: &[Robot]) -> Option<Termination> {
        if let Some(target) = self.deliveries_to_finish {
            if robots.iter().all(|r| r.deliveries() >= target) {
                return Some(Termination::DeliveriesComplete);
            }
        }
        (step >= self.horizon).then_some(Termination::Horizon)
    }
}
