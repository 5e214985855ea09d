//! Joint minimum-deviation velocity solve.
//!
//! Solves
//!
//! ```text
//! minimise   Σ_i |u_i - û_i|²
//! subject to every barrier constraint,  u_i = 0 for held robots
//! ```
//!
//! with Hildreth's dual coordinate ascent. The objective is strictly convex,
//! so the optimum is unique and does not depend on robot order. A final
//! uniform scaling toward the zero velocity, which is always feasible,
//! removes any residual violation left by a finite number of sweeps.

use super::barrier::BarrierConstraint;
use crate::geometry::Vec2;

/// Residual violations below this are left to the caller's boundary clamp.
const RESIDUAL_TOLERANCE: f64 = 1e-12;

/// Iteration limits for [`solve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    pub max_iterations: usize,
    pub tolerance: f64,
}

/// Outcome of one joint solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub velocities: Vec<Vec2>,
    /// Full sweeps over the constraint set.
    pub iterations: usize,
    pub converged: bool,
    /// Uniform factor applied to restore exact feasibility (1.0 when none was needed).
    pub scale: f64,
}

pub fn solve(
    desired: &[Vec2],
    held: &[bool],
    constraints: &[BarrierConstraint],
    settings: &SolverSettings,
) -> Solution {
    let mut velocities: Vec<Vec2> = desired
        .iter()
        .zip(held)
        .map(|(&u, &h)| if h { Vec2::ZERO } else { u })
        .collect();

    // Only the free robots' terms can move; fully held constraints drop out.
    let active: Vec<(Vec<(usize, Vec2)>, f64, f64)> = constraints
        .iter()
        .filter_map(|c| {
            let fixed: f64 = c
                .terms
                .iter()
                .filter(|(robot, _)| held[*robot])
                .map(|(robot, a)| a.dot(velocities[*robot]))
                .sum();
            let free: Vec<_> = c
                .terms
                .iter()
                .filter(|(robot, _)| !held[*robot])
                .copied()
                .collect();
            let norm_sq: f64 = free.iter().map(|(_, a)| a.norm_squared()).sum();
            (norm_sq > 0.0).then_some((free, c.bound - fixed, norm_sq))
        })
        .collect();

    let mut multipliers = vec![0.0; active.len()];
    let mut iterations = 0;
    let mut converged = active.is_empty();

    while !converged && iterations < settings.max_iterations {
        iterations += 1;
        let mut largest_change = 0.0_f64;
        for (k, (terms, bound, norm_sq)) in active.iter().enumerate() {
            let lhs: f64 = terms.iter().map(|(r, a)| a.dot(velocities[*r])).sum();
            let updated = (multipliers[k] + (bound - lhs) / norm_sq).max(0.0);
            let delta = updated - multipliers[k];
            if delta != 0.0 {
                for (r, a) in terms {
                    velocities[*r] += *a * delta;
                }
                multipliers[k] = updated;
                largest_change = largest_change.max(delta.abs() * norm_sq.sqrt());
            }
        }
        converged = largest_change < settings.tolerance;
    }

    let scale = active
        .iter()
        .map(|(terms, bound, _)| {
            let lhs: f64 = terms.iter().map(|(r, a)| a.dot(velocities[*r])).sum();
            if lhs < *bound - RESIDUAL_TOLERANCE && lhs < 0.0 {
                (bound / lhs).clamp(0.0, 1.0)
            } else {
                1.0
            }
        })
        .fold(1.0_f64, f64::min);
    if scale < 1.0 {
        for u in &mut velocities {
            *u = *u * scale;
        }
    }

    Solution {
        velocities,
        iterations,
        converged,
        scale,
    }
}
