//! Barrier constraint assembly.
//!
//! Every barrier is linearised into a half-plane constraint on the stacked
//! velocity vector `u`:
//!
//! ```text
//! Σ_k  a_k · u_{robot_k}  ≥  bound
//! ```
//!
//! The half-plane is built from the supporting line at the current pose, so
//! any straight-line motion that starts and ends inside it keeps the barrier
//! non-negative for the whole step, not only at its end point.

use crate::geometry::{Vec2, Workspace};

/// Poses closer than this to a barrier's zero level are treated as on it.
pub const VIOLATION_TOLERANCE: f64 = 1e-9;

/// What a constraint keeps apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierKind {
    RobotRobot { first: usize, second: usize },
    Obstacle { robot: usize, obstacle: usize },
    Boundary { robot: usize, side: Side },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Up,
    Down,
}

/// One linear barrier constraint over at most two robots.
#[derive(Debug, Clone, PartialEq)]
pub struct BarrierConstraint {
    pub kind: BarrierKind,
    pub terms: Vec<(usize, Vec2)>,
    pub bound: f64,
}

impl BarrierConstraint {
    /// Left-hand side evaluated at `velocities`.
    pub fn evaluate(&self, velocities: &[Vec2]) -> f64 {
        self.terms
            .iter()
            .map(|(robot, a)| a.dot(velocities[*robot]))
            .sum()
    }
}

/// Geometry and gains the barriers are built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierParams {
    pub time_step: f64,
    pub safety_radius: f64,
    pub obstacle_clearance: f64,
    pub gain: f64,
}

/// Constraints for one step, plus the robots whose current pose already
/// violates a barrier and must be held still.
#[derive(Debug, Clone, Default)]
pub struct BarrierSet {
    pub constraints: Vec<BarrierConstraint>,
    pub violated: Vec<bool>,
}

/// Builds the barrier set for all robots at their prior-step positions.
///
/// `reach[i]` bounds how far robot `i` can possibly travel this step.
/// Barriers whose margin exceeds the combined reach cannot become active
/// and are left out.
pub fn build(
    workspace: &Workspace,
    positions: &[Vec2],
    reach: &[f64],
    params: &BarrierParams,
) -> BarrierSet {
    let n = positions.len();
    let dt = params.time_step;
    let mut set = BarrierSet {
        constraints: Vec::new(),
        violated: vec![false; n],
    };

    for i in 0..n {
        for j in (i + 1)..n {
            let offset = positions[i] - positions[j];
            let margin = offset.norm() - params.safety_radius;
            if margin > reach[i] + reach[j] {
                continue;
            }
            let normal = match offset.normalized() {
                Some(normal) if margin >= -VIOLATION_TOLERANCE => normal,
                _ => {
                    set.violated[i] = true;
                    set.violated[j] = true;
                    continue;
                }
            };
            set.constraints.push(BarrierConstraint {
                kind: BarrierKind::RobotRobot {
                    first: i,
                    second: j,
                },
                terms: vec![(i, normal * dt), (j, -normal * dt)],
                bound: barrier_bound(margin, params.gain),
            });
        }
    }

    for (robot, &p) in positions.iter().enumerate() {
        for (obstacle, rect) in workspace.obstacles().iter().enumerate() {
            let margin = rect.distance_to(p) - params.obstacle_clearance;
            if margin > reach[robot] {
                continue;
            }
            if margin < -VIOLATION_TOLERANCE {
                set.violated[robot] = true;
                continue;
            }
            set.constraints.push(BarrierConstraint {
                kind: BarrierKind::Obstacle { robot, obstacle },
                terms: vec![(robot, rect.separating_normal(p) * dt)],
                bound: barrier_bound(margin, params.gain),
            });
        }

        let bounds = workspace.bounds();
        let sides = [
            (Side::Left, p.x - bounds.left, Vec2::new(1.0, 0.0)),
            (Side::Right, bounds.right - p.x, Vec2::new(-1.0, 0.0)),
            (Side::Up, p.y - bounds.up, Vec2::new(0.0, 1.0)),
            (Side::Down, bounds.down - p.y, Vec2::new(0.0, -1.0)),
        ];
        for (side, margin, inward) in sides {
            if margin > reach[robot] {
                continue;
            }
            if margin < -VIOLATION_TOLERANCE {
                set.violated[robot] = true;
                continue;
            }
            set.constraints.push(BarrierConstraint {
                kind: BarrierKind::Boundary { robot, side },
                terms: vec![(robot, inward * dt)],
                // Walls take the full margin so a push ends flush with the boundary.
                bound: barrier_bound(margin, 1.0),
            });
        }
    }

    set
}

/// Right-hand side `-γ h`, never positive so that standing still is feasible.
fn barrier_bound(margin: f64, gain: f64) -> f64 {
    (-gain * margin).min(0.0)
}
