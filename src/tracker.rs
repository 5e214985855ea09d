//! Goal and load tracking.
//!
//! Per-robot state machine over {seeking-load, carrying}. Zone occupancy is
//! derived from the current poses every step; nothing about it is stored.

use std::collections::HashMap;

use tracing::debug;

use crate::config::AssignmentPolicy;
use crate::geometry::{Vec2, Workspace, ZoneId, ZoneRole};
use crate::robot::{LoadState, Robot};

/// What happened to one robot's load this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    #[default]
    None,
    /// seeking-load → carrying.
    Loaded { zone: ZoneId },
    /// carrying → seeking-load; the load was delivered.
    Delivered { zone: ZoneId },
}

impl Transition {
    pub fn zone(&self) -> Option<ZoneId> {
        match self {
            Transition::None => None,
            Transition::Loaded { zone } | Transition::Delivered { zone } => Some(*zone),
        }
    }
}

/// Applies zone entries to robots' load state and assigns their next target.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalTracker {
    policy: AssignmentPolicy,
}

impl GoalTracker {
    pub fn new(policy: AssignmentPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AssignmentPolicy {
        &self.policy
    }

    /// Puts every robot into seeking-load with its first target.
    pub fn reset(&self, workspace: &Workspace, robots: &mut [Robot]) {
        for robot in robots.iter_mut() {
            robot.load = LoadState::SeekingLoad;
            robot.deliveries = 0;
            robot.target = self.next_target(workspace, robot);
        }
    }

    /// Detects qualifying zone entries from the robots' current poses and
    /// applies the resulting transitions.
    ///
    /// A robot in a zone that is not its target, has the wrong role, or does
    /// not accept its load keeps its state. When a zone has a capacity, only
    /// the occupants closest to its centre (ties by robot index) may
    /// transition there.
    pub fn update(&self, workspace: &Workspace, robots: &mut [Robot], step: u32) -> Vec<Transition> {
        let occupancy: Vec<Option<ZoneId>> = robots
            .iter()
            .map(|r| workspace.zone_at(r.pose.position))
            .collect();
        let admitted = admitted_occupants(workspace, robots, &occupancy);

        let mut transitions = vec![Transition::None; robots.len()];
        for (i, robot) in robots.iter_mut().enumerate() {
            let Some(zone_id) = occupancy[i] else {
                continue;
            };
            if !admitted[i] || !self.qualifies(workspace, robot, zone_id) {
                continue;
            }
            let zone = &workspace.zones()[zone_id];
            transitions[i] = match zone.role {
                ZoneRole::Load => {
                    robot.load = LoadState::Carrying {
                        category: zone.category.clone(),
                        source: zone_id,
                    };
                    debug!(robot = i, zone = zone_id, step, "Picked up load");
                    Transition::Loaded { zone: zone_id }
                }
                ZoneRole::Unload => {
                    robot.load = LoadState::SeekingLoad;
                    robot.deliveries += 1;
                    debug!(
                        robot = i,
                        zone = zone_id,
                        step,
                        deliveries = robot.deliveries,
                        "Delivered load"
                    );
                    Transition::Delivered { zone: zone_id }
                }
            };
            robot.target = self.next_target(workspace, robot);
        }
        transitions
    }

    fn qualifies(&self, workspace: &Workspace, robot: &Robot, zone_id: ZoneId) -> bool {
        let zone = &workspace.zones()[zone_id];
        let role_matches = match &robot.load {
            LoadState::SeekingLoad => zone.role == ZoneRole::Load,
            LoadState::Carrying { category, .. } => {
                zone.role == ZoneRole::Unload && zone.accepts(category.as_deref())
            }
        };
        let target_matches = match self.policy {
            AssignmentPolicy::Unconstrained => true,
            _ => robot.target == Some(zone_id),
        };
        role_matches && target_matches
    }

    /// Target for the robot's current load state under the assignment policy.
    fn next_target(&self, workspace: &Workspace, robot: &Robot) -> Option<ZoneId> {
        match &self.policy {
            AssignmentPolicy::Unconstrained => None,
            AssignmentPolicy::Fixed { routes } => routes.get(robot.index).map(|route| {
                if robot.is_loaded() {
                    route.unload
                } else {
                    route.load
                }
            }),
            AssignmentPolicy::Nearest => {
                let (role, category) = match &robot.load {
                    LoadState::SeekingLoad => (ZoneRole::Load, None),
                    LoadState::Carrying { category, .. } => (ZoneRole::Unload, category.as_deref()),
                };
                nearest_zone(workspace, robot.pose.position, role, category)
            }
        }
    }
}

/// Nearest zone of `role` accepting `category`, by distance to its centre.
fn nearest_zone(
    workspace: &Workspace,
    from: Vec2,
    role: ZoneRole,
    category: Option<&str>,
) -> Option<ZoneId> {
    workspace
        .zones_with_role(role)
        .filter(|&id| workspace.zones()[id].accepts(category))
        .fold(None, |best: Option<(ZoneId, f64)>, id| {
            let d = workspace.zones()[id].rect.center().distance_to(from);
            match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((id, d)),
            }
        })
        .map(|(id, _)| id)
}

/// Marks which occupants fit within their zone's capacity this step.
fn admitted_occupants(
    workspace: &Workspace,
    robots: &[Robot],
    occupancy: &[Option<ZoneId>],
) -> Vec<bool> {
    let mut by_zone: HashMap<ZoneId, Vec<usize>> = HashMap::new();
    for (i, zone) in occupancy.iter().enumerate() {
        if let Some(z) = zone {
            by_zone.entry(*z).or_default().push(i);
        }
    }

    let mut admitted = vec![true; robots.len()];
    for (zone_id, mut occupants) in by_zone {
        let zone = &workspace.zones()[zone_id];
        let Some(capacity) = zone.capacity else {
            continue;
        };
        let center = zone.rect.center();
        occupants.sort_by(|&a, &b| {
            let da = robots[a].pose.position.distance_to(center);
            let db = robots[b].pose.position.distance_to(center);
            da.total_cmp(&db).then(a.cmp(&b))
        });
        for &i in occupants.iter().skip(capacity) {
            admitted[i] = false;
        }
    }
    admitted
}
