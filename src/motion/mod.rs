//! Safe motion controller.
//!
//! Turns the robots' desired displacements into collision-free velocities
//! with one joint barrier-certificate solve per step, then integrates every
//! pose forward simultaneously from the prior-step poses.

pub mod barrier;
pub mod solver;

use tracing::{trace, warn};

use crate::config::WarehouseConfig;
use crate::geometry::{Pose, Vec2, Workspace};
use barrier::BarrierParams;
use solver::SolverSettings;

pub use barrier::{BarrierConstraint, BarrierKind, BarrierSet, Side};
pub use solver::Solution;

/// Result of resolving one step of motion.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionOutcome {
    pub poses: Vec<Pose>,
    /// Realised velocity per robot.
    pub velocities: Vec<Vec2>,
    /// Robots held still because their prior pose already violated a barrier.
    pub clamped: Vec<bool>,
    pub iterations: usize,
    pub converged: bool,
}

impl MotionOutcome {
    /// Distance each robot covered this step.
    pub fn distances(&self, time_step: f64) -> Vec<f64> {
        self.velocities.iter().map(|u| u.norm() * time_step).collect()
    }
}

/// Barrier-certificate collision avoidance for the whole fleet.
///
/// The controller is total: over-constrained robots are held at zero
/// velocity instead of producing an error.
#[derive(Debug, Clone, PartialEq)]
pub struct SafeMotionController {
    barrier: BarrierParams,
    solver: SolverSettings,
}

impl SafeMotionController {
    pub fn new(barrier: BarrierParams, solver: SolverSettings) -> Self {
        Self { barrier, solver }
    }

    pub fn from_config(config: &WarehouseConfig) -> Self {
        Self::new(
            BarrierParams {
                time_step: config.time_step,
                safety_radius: config.safety_radius,
                obstacle_clearance: config.obstacle_clearance,
                gain: config.barrier_gain,
            },
            SolverSettings {
                max_iterations: config.solver_iterations,
                tolerance: config.solver_tolerance,
            },
        )
    }

    pub fn time_step(&self) -> f64 {
        self.barrier.time_step
    }

    /// Resolves all desired displacements jointly and advances every pose.
    ///
    /// Only prior-step poses are read, so the result does not depend on the
    /// order robots appear in.
    ///
    /// # Arguments
    ///
    /// * `workspace` - Static scene the robots move in
    /// * `poses` - Prior-step pose of every robot
    /// * `displacements` - Desired displacement of every robot this step
    pub fn resolve(
        &self,
        workspace: &Workspace,
        poses: &[Pose],
        displacements: &[Vec2],
    ) -> MotionOutcome {
        let dt = self.barrier.time_step;
        let positions: Vec<Vec2> = poses.iter().map(|p| p.position).collect();
        let desired: Vec<Vec2> = displacements.iter().map(|d| *d * (1.0 / dt)).collect();

        // Standing still is always feasible, so the optimum deviates from
        // `desired` by at most |desired|. Reach is padded to twice that.
        let total_speed = desired.iter().map(Vec2::norm_squared).sum::<f64>().sqrt();
        let reach: Vec<f64> = desired
            .iter()
            .map(|u| (u.norm() + 2.0 * total_speed) * dt)
            .collect();

        let set = barrier::build(workspace, &positions, &reach, &self.barrier);
        for (robot, _) in set.violated.iter().enumerate().filter(|(_, v)| **v) {
            warn!(robot, "Robot is over-constrained; holding it still this step");
        }

        let solution = solver::solve(&desired, &set.violated, &set.constraints, &self.solver);
        if !solution.converged {
            warn!(
                iterations = solution.iterations,
                "Barrier solve hit the iteration cap before converging"
            );
        }
        trace!(
            constraints = set.constraints.len(),
            iterations = solution.iterations,
            scale = solution.scale,
            "Resolved joint motion"
        );

        let bounds = workspace.bounds();
        let new_poses = poses
            .iter()
            .zip(&solution.velocities)
            .map(|(pose, u)| {
                let mut next = pose.advance(*u * dt);
                next.position = bounds.snap(next.position, barrier::VIOLATION_TOLERANCE);
                next
            })
            .collect();

        MotionOutcome {
            poses: new_poses,
            velocities: solution.velocities,
            clamped: set.violated,
            iterations: solution.iterations,
            converged: solution.converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bounds, Rect};

    fn controller(safety_radius: f64) -> SafeMotionController {
        SafeMotionController::from_config(&WarehouseConfig {
            safety_radius,
            obstacle_clearance: 0.1,
            ..WarehouseConfig::default()
        })
    }

    fn open() -> Workspace {
        Workspace::new(Bounds::new(-1.5, 1.5, -1.0, 1.0), vec![], vec![]).unwrap()
    }

    #[test]
    fn free_robot_moves_exactly() {
        let out = controller(0.2).resolve(&open(), &[Pose::at(0.0, 0.0)], &[Vec2::new(0.15, 0.0)]);
        assert!((out.poses[0].position.x - 0.15).abs() < 1e-12);
        assert_eq!(out.poses[0].position.y, 0.0);
        assert!(out.converged);
    }

    #[test]
    fn standing_still_changes_nothing() {
        let poses = [Pose::new(0.0, 0.0, 0.3), Pose::new(0.5, 0.5, -1.0)];
        let out = controller(0.2).resolve(&open(), &poses, &[Vec2::ZERO, Vec2::ZERO]);
        assert_eq!(out.poses, poses.to_vec());
    }

    #[test]
    fn wall_attenuates_to_boundary() {
        let out = controller(0.2).resolve(&open(), &[Pose::at(1.4, 0.0)], &[Vec2::new(0.15, 0.0)]);
        assert_eq!(out.poses[0].position.x, 1.5);
        assert_eq!(out.clamped, vec![false]);
    }

    #[test]
    fn head_on_pair_stops_at_safety_radius() {
        let out = controller(0.3).resolve(
            &open(),
            &[Pose::at(-0.2, 0.0), Pose::at(0.2, 0.0)],
            &[Vec2::new(0.15, 0.0), Vec2::new(-0.15, 0.0)],
        );
        let gap = out.poses[0].position.distance_to(out.poses[1].position);
        assert!(gap >= 0.3 - 1e-9);
        assert!((out.poses[0].position.x + 0.15).abs() < 1e-9);
        assert!((out.poses[1].position.x - 0.15).abs() < 1e-9);
    }

    #[test]
    fn robot_order_does_not_matter() {
        let ctl = controller(0.3);
        let poses = [Pose::at(-0.2, 0.05), Pose::at(0.2, 0.0)];
        let moves = [Vec2::new(0.15, 0.0), Vec2::new(0.0, -0.15)];
        let forward = ctl.resolve(&open(), &poses, &moves);
        let swapped = ctl.resolve(&open(), &[poses[1], poses[0]], &[moves[1], moves[0]]);
        for (a, b) in [(0, 1), (1, 0)] {
            let d = forward.poses[a].position.distance_to(swapped.poses[b].position);
            assert!(d < 1e-9, "robot {a} differs by {d}");
        }
    }

    #[test]
    fn obstacle_is_never_entered() {
        let ws = Workspace::new(
            Bounds::new(-1.5, 1.5, -1.0, 1.0),
            vec![Rect::new(0.0, -0.5, 0.2, 1.0)],
            vec![],
        )
        .unwrap();
        let out = controller(0.2).resolve(&ws, &[Pose::at(-0.2, 0.0)], &[Vec2::new(0.15, 0.0)]);
        let p = out.poses[0].position;
        assert!(ws.obstacle_distance(p) >= 0.1 - 1e-9);
        assert!((p.x + 0.1).abs() < 1e-9);
    }

    #[test]
    fn pushing_into_a_wall_leaves_robot_in_place() {
        let out = controller(0.2).resolve(&open(), &[Pose::at(1.5, 0.0)], &[Vec2::new(0.15, 0.0)]);
        assert_eq!(out.poses[0].position, Vec2::new(1.5, 0.0));
    }

    #[test]
    fn violating_pair_is_clamped() {
        let poses = [Pose::at(0.0, 0.0), Pose::at(0.1, 0.0), Pose::at(1.0, 0.0)];
        let moves = [Vec2::new(0.0, 0.15), Vec2::new(0.0, 0.15), Vec2::new(0.0, 0.15)];
        let out = controller(0.3).resolve(&open(), &poses, &moves);
        assert_eq!(out.clamped, vec![true, true, false]);
        assert_eq!(out.velocities[0], Vec2::ZERO);
        assert_eq!(out.velocities[1], Vec2::ZERO);
        assert!((out.poses[2].position.y - 0.15).abs() < 1e-12);
    }

    #[test]
    fn distances_report_travel() {
        let out = controller(0.2).resolve(&open(), &[Pose::at(0.0, 0.0)], &[Vec2::new(0.0, 0.15)]);
        assert!((out.distances(1.0)[0] - 0.15).abs() < 1e-12);
    }
}
