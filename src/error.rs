use thiserror::Error;

/// Malformed scenario configuration. Raised once while building the
/// workspace or resetting an episode, never from inside a step.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Workspace bounds must have positive width and height")]
    NonPositiveBounds,

    #[error("Obstacle {index} has zero or negative size")]
    DegenerateObstacle { index: usize },

    #[error("Obstacle {index} extends outside the workspace boundary")]
    ObstacleOutOfBounds { index: usize },

    #[error("Goal zone {index} has zero or negative size")]
    DegenerateZone { index: usize },

    #[error("Goal zone {index} extends outside the workspace boundary")]
    ZoneOutOfBounds { index: usize },

    #[error("Goal zones {first} and {second} overlap")]
    OverlappingZones { first: usize, second: usize },

    #[error("Scenario must contain at least one robot")]
    NoRobots,

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Expected {expected} start poses, got {actual}")]
    StartPoseCount { expected: usize, actual: usize },

    #[error("Start pose of robot {robot} is unsafe: {reason}")]
    UnsafeStartPose { robot: usize, reason: String },

    #[error("Could only place {placed} of {requested} robots safely")]
    SpawnFailed { placed: usize, requested: usize },

    #[error("Invalid route for robot {robot}: {reason}")]
    InvalidRoute { robot: usize, reason: String },

    #[error("Could not parse configuration: {0}")]
    Parse(String),
}

/// Caller contract violations detected before a step is applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("Invalid action id {action} for robot {robot}")]
    InvalidAction { robot: usize, action: usize },

    #[error("Expected {expected} actions (one per robot), got {actual}")]
    ActionCountMismatch { expected: usize, actual: usize },

    #[error("Episode is finished; call reset before stepping again")]
    EpisodeFinished,

    #[error("Environment has not been reset")]
    NotReset,
}

/// Any error surfaced by the episode orchestrator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Step(#[from] StepError),
}
