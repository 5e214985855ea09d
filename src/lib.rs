//! warehouse_sim - multi-robot warehouse environment
//!
//! A fleet of mobile robots moves through a bounded 2D workspace with static
//! rectangular obstacles, picking up loads in load zones and delivering them
//! to unload zones. A joint barrier-certificate solve keeps every robot
//! separated from its teammates, the obstacles and the boundary at every
//! step.

pub mod action;
pub mod config;
pub mod env;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod motion;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod robot;
pub mod tracker;

pub use action::Action;
pub use config::{AssignmentPolicy, Route, WarehouseConfig};
pub use env::{EpisodeState, SceneSnapshot, Simulator, StepInfo, StepResult, WarehouseEnv};
pub use error::{ConfigurationError, SimError, StepError};
pub use geometry::{Bounds, GoalZone, Pose, Rect, Vec2, Workspace, ZoneId, ZoneRole};
pub use metrics::EvaluationMetrics;
pub use motion::SafeMotionController;
pub use observation::{Observation, ObservationBuilder};
pub use policy::{Policy, RandomPolicy};
pub use reward::{RewardEngine, Termination};
pub use robot::{LoadState, Robot};
pub use tracker::{GoalTracker, Transition};
