//! Warehouse episode orchestration.
//!
//! Each step runs the fixed pipeline:
//! validate actions → translate → joint safe motion → goal/load tracking →
//! rewards and termination → observations.

pub mod snapshot;
pub mod spawn;


use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::action::Action;
use crate::config::WarehouseConfig;
use crate::error::{ConfigurationError, StepError};
use crate::geometry::{Vec2, Workspace};
use crate::motion::SafeMotionController;
use crate::observation::{Observation, ObservationBuilder};
use crate::reward::{RewardEngine, Termination};
use crate::robot::Robot;
use crate::tracker::{GoalTracker, Transition};

pub use snapshot::SceneSnapshot;

/// State of one episode. Owned by the orchestrator; components borrow it
/// for a single step and hand back a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeState {
    pub robots: Vec<Robot>,
    /// Completed steps.
    pub step: u32,
    pub cumulative_rewards: Vec<f64>,
    pub done: bool,
    pub termination: Option<Termination>,
}

impl EpisodeState {
    pub fn new(robots: Vec<Robot>) -> Self {
        let n = robots.len();
        Self {
            robots,
            step: 0,
            cumulative_rewards: vec![0.0; n],
            done: false,
            termination: None,
        }
    }

    pub fn n_robots(&self) -> usize {
        self.robots.len()
    }

    pub fn total_deliveries(&self) -> u32 {
        self.robots.iter().map(|r| r.deliveries()).sum()
    }
}

/// Diagnostics for a single step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    pub transitions: Vec<Transition>,
    /// Distance each robot travelled.
    pub distances: Vec<f64>,
    /// Robots held still because they started the step over-constrained.
    pub clamped: Vec<bool>,
    pub solver_iterations: usize,
    pub solver_converged: bool,
    pub termination: Option<Termination>,
}

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observations: Vec<Observation>,
    /// Per-robot rewards; never aggregated here.
    pub rewards: Vec<f64>,
    /// Global episode-done flag.
    pub done: bool,
    /// Completed steps after this one.
    pub step: u32,
    pub info: StepInfo,
}

impl StepResult {
    /// Shared team reward: the sum of per-robot rewards.
    pub fn team_reward(&self) -> f64 {
        self.rewards.iter().sum()
    }
}

/// The immutable per-configuration step pipeline.
///
/// [`Simulator::advance`] is a pure function of the prior state and the
/// actions, so identical inputs always give identical outputs.
#[derive(Debug, Clone)]
pub struct Simulator {
    workspace: Workspace,
    controller: SafeMotionController,
    tracker: GoalTracker,
    rewards: RewardEngine,
    step_distance: f64,
    num_neighbors: usize,
}

impl Simulator {
    pub fn new(config: &WarehouseConfig) -> Result<Self, ConfigurationError> {
        let workspace = config.validate()?;
        Ok(Self {
            workspace,
            controller: SafeMotionController::from_config(config),
            tracker: GoalTracker::new(config.assignment.clone()),
            rewards: RewardEngine::from_config(config),
            step_distance: config.step_distance,
            num_neighbors: config.num_neighbors,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Fresh episode state for robots placed at `robots`' poses.
    pub fn initial_state(&self, mut robots: Vec<Robot>) -> EpisodeState {
        self.tracker.reset(&self.workspace, &mut robots);
        EpisodeState::new(robots)
    }

    pub fn observe(&self, state: &EpisodeState) -> Vec<Observation> {
        ObservationBuilder::build_all(&state.robots, self.num_neighbors)
    }

    /// Applies one synchronous step.
    ///
    /// # Arguments
    ///
    /// * `state` - Episode state before the step
    /// * `actions` - One action id per robot, in robot index order
    ///
    /// # Errors
    ///
    /// [`StepError`] for a finished episode, a wrong number of actions, or an
    /// invalid action id. `state` is never modified.
    pub fn advance(
        &self,
        state: &EpisodeState,
        actions: &[usize],
    ) -> Result<(EpisodeState, StepResult), StepError> {
        if state.done {
            return Err(StepError::EpisodeFinished);
        }
        if actions.len() != state.n_robots() {
            return Err(StepError::ActionCountMismatch {
                expected: state.n_robots(),
                actual: actions.len(),
            });
        }
        let actions = Action::parse_all(actions)?;

        let displacements: Vec<Vec2> = actions
            .iter()
            .map(|a| a.displacement(self.step_distance))
            .collect();
        let poses: Vec<_> = state.robots.iter().map(|r| r.pose).collect();
        let motion = self.controller.resolve(&self.workspace, &poses, &displacements);

        let mut next = state.clone();
        for (robot, pose) in next.robots.iter_mut().zip(&motion.poses) {
            robot.pose = *pose;
        }
        next.step += 1;

        let transitions = self.tracker.update(&self.workspace, &mut next.robots, next.step);
        let rewards = self.rewards.rewards(&transitions);
        for (total, r) in next.cumulative_rewards.iter_mut().zip(&rewards) {
            *total += r;
        }

        let termination = self.rewards.termination(next.step, &next.robots);
        next.done = termination.is_some();
        next.termination = termination;

        let result = StepResult {
            observations: self.observe(&next),
            rewards,
            done: next.done,
            step: next.step,
            info: StepInfo {
                transitions,
                distances: motion.distances(self.controller.time_step()),
                clamped: motion.clamped,
                solver_iterations: motion.iterations,
                solver_converged: motion.converged,
                termination,
            },
        };
        Ok((next, result))
    }
}

/// The multi-robot warehouse environment.
///
/// # Lifecycle
///
/// 1. Call [`WarehouseEnv::new`] with a configuration and RNG seed.
/// 2. Call [`WarehouseEnv::reset`] to start an episode.
/// 3. Call [`WarehouseEnv::step`] with one action id per robot until `done`.
#[derive(Debug)]
pub struct WarehouseEnv {
    config: WarehouseConfig,
    simulator: Simulator,
    state: Option<EpisodeState>,
    /// Seed for the next reset.
    seed: u64,
}

impl WarehouseEnv {
    /// Creates a new environment. No episode runs until [`WarehouseEnv::reset`].
    ///
    /// # Arguments
    ///
    /// * `config` - Scenario configuration, validated here
    /// * `seed` - RNG seed for the first reset's spawn positions
    pub fn new(config: WarehouseConfig, seed: u64) -> Result<Self, ConfigurationError> {
        let simulator = Simulator::new(&config)?;
        Ok(Self {
            config,
            simulator,
            state: None,
            seed,
        })
    }

    /// Starts a new episode and returns the initial observations.
    ///
    /// Every reset draws spawn positions from a fresh RNG seeded with the
    /// current seed, then advances the seed.
    pub fn reset(&mut self) -> Result<Vec<Observation>, ConfigurationError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let seed = self.seed;
        self.seed = self.seed.wrapping_add(1);

        let poses = spawn::start_poses(&self.config, self.simulator.workspace(), &mut rng)?;
        let robots = poses
            .into_iter()
            .enumerate()
            .map(|(i, pose)| Robot::new(i, pose))
            .collect();
        let state = self.simulator.initial_state(robots);
        info!(robots = state.n_robots(), seed, "Episode reset");

        let observations = self.simulator.observe(&state);
        self.state = Some(state);
        Ok(observations)
    }

    /// Replaces the configuration and starts a new episode under it.
    pub fn reset_with(
        &mut self,
        config: WarehouseConfig,
    ) -> Result<Vec<Observation>, ConfigurationError> {
        self.simulator = Simulator::new(&config)?;
        self.config = config;
        self.state = None;
        self.reset()
    }

    /// Executes one step. On error the episode state is left untouched.
    pub fn step(&mut self, actions: &[usize]) -> Result<StepResult, StepError> {
        let state = self.state.as_ref().ok_or(StepError::NotReset)?;
        let (next, result) = self.simulator.advance(state, actions)?;
        if let Some(reason) = next.termination {
            info!(
                step = next.step,
                deliveries = next.total_deliveries(),
                %reason,
                "Episode finished"
            );
        }
        self.state = Some(next);
        Ok(result)
    }

    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        self.simulator.workspace()
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn state(&self) -> Option<&EpisodeState> {
        self.state.as_ref()
    }

    pub fn n_robots(&self) -> usize {
        self.config.n_robots
    }

    /// Current scene for a renderer, if an episode is running.
    pub fn snapshot(&self) -> Option<SceneSnapshot> {
        self.state
            .as_ref()
            .map(|s| SceneSnapshot::capture(self.simulator.workspace(), s))
    }
}
