//! Scenario configuration for the warehouse environment.
//!
//! The bundle is produced once before an episode starts and treated as
//! immutable while the episode runs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::geometry::{Bounds, GoalZone, Pose, Rect, Workspace, ZoneId, ZoneRole};

/// A fixed load/unload pairing for one robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    pub load: ZoneId,
    pub unload: ZoneId,
}

impl Route {
    pub fn new(load: ZoneId, unload: ZoneId) -> Self {
        Self { load, unload }
    }
}

/// How the next target zone is chosen after each load transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AssignmentPolicy {
    /// No target is assigned: any load zone loads, and any unload zone
    /// accepting the carried category delivers.
    #[default]
    Unconstrained,
    /// Target the compatible zone whose centre is nearest to the robot,
    /// ties broken by lower zone id.
    Nearest,
    /// Robot `i` always loads at `routes[i].load` and unloads at `routes[i].unload`.
    Fixed { routes: Vec<Route> },
}

/// Configuration for the warehouse environment.
///
/// Controls workspace geometry, robot dynamics, the collision-avoidance
/// solver, the task cycle and reward shaping.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WarehouseConfig {
    // --- Workspace geometry ---
    pub bounds: Bounds,
    pub obstacles: Vec<Rect>,
    pub zones: Vec<GoalZone>,

    // --- Robots ---
    pub n_robots: usize,
    /// Explicit start poses; random safe spawning is used when `None`.
    pub start_poses: Option<Vec<Pose>>,
    /// Minimum distance between randomly spawned robots.
    pub start_separation: f64,
    /// Random spawns stay this far inside the boundary.
    pub spawn_margin: f64,
    /// Rejection-sampling attempts before spawning gives up.
    pub spawn_attempts: usize,

    // --- Motion ---
    /// Displacement requested by one directional action.
    pub step_distance: f64,
    /// Duration of one step Δt.
    pub time_step: f64,
    /// Minimum centre-to-centre distance between two robots.
    pub safety_radius: f64,
    /// Minimum distance from a robot centre to any obstacle.
    pub obstacle_clearance: f64,
    /// Barrier gain γ in (0, 1] for robot and obstacle barriers. With γ = 1 a
    /// barrier may be fully consumed in one step. Walls always use γ = 1.
    pub barrier_gain: f64,
    pub solver_iterations: usize,
    pub solver_tolerance: f64,

    // --- Task cycle and rewards ---
    pub assignment: AssignmentPolicy,
    pub load_reward: f64,
    pub unload_reward: f64,
    /// Added to every robot's reward every step; usually zero or slightly negative.
    pub step_penalty: f64,
    /// Episode length in steps.
    pub horizon: u32,
    /// End the episode early once every robot has made this many deliveries.
    pub deliveries_to_finish: Option<u32>,

    // --- Observation ---
    /// Nearest teammates included in each robot's observation.
    pub num_neighbors: usize,
}

impl WarehouseConfig {
    /// Checks scalar parameters and builds the validated [`Workspace`].
    pub fn validate(&self) -> Result<Workspace, ConfigurationError> {
        let workspace = Workspace::new(self.bounds, self.obstacles.clone(), self.zones.clone())?;

        if self.n_robots == 0 {
            return Err(ConfigurationError::NoRobots);
        }
        positive("step_distance", self.step_distance)?;
        positive("time_step", self.time_step)?;
        non_negative("safety_radius", self.safety_radius)?;
        non_negative("obstacle_clearance", self.obstacle_clearance)?;
        non_negative("start_separation", self.start_separation)?;
        non_negative("spawn_margin", self.spawn_margin)?;
        positive("solver_tolerance", self.solver_tolerance)?;
        if !(self.barrier_gain > 0.0 && self.barrier_gain <= 1.0) {
            return Err(invalid("barrier_gain", "must lie in (0, 1]"));
        }
        if self.solver_iterations == 0 {
            return Err(invalid("solver_iterations", "must be at least 1"));
        }
        if self.horizon == 0 {
            return Err(invalid("horizon", "must be at least 1"));
        }
        if self.deliveries_to_finish == Some(0) {
            return Err(invalid("deliveries_to_finish", "must be at least 1 when set"));
        }
        for (name, value) in [
            ("load_reward", self.load_reward),
            ("unload_reward", self.unload_reward),
            ("step_penalty", self.step_penalty),
        ] {
            if !value.is_finite() {
                return Err(invalid(name, "must be finite"));
            }
        }
        if let Some(poses) = &self.start_poses {
            if poses.len() != self.n_robots {
                return Err(ConfigurationError::StartPoseCount {
                    expected: self.n_robots,
                    actual: poses.len(),
                });
            }
        }
        validate_deliverable(&workspace)?;
        if let AssignmentPolicy::Fixed { routes } = &self.assignment {
            self.validate_routes(routes, &workspace)?;
        }

        Ok(workspace)
    }

    fn validate_routes(
        &self,
        routes: &[Route],
        workspace: &Workspace,
    ) -> Result<(), ConfigurationError> {
        if routes.len() != self.n_robots {
            return Err(invalid(
                "assignment",
                format!("expected {} routes, got {}", self.n_robots, routes.len()),
            ));
        }
        for (robot, route) in routes.iter().enumerate() {
            let role_of = |id: ZoneId| workspace.zone(id).map(|z| z.role);
            if role_of(route.load) != Some(ZoneRole::Load) {
                return Err(ConfigurationError::InvalidRoute {
                    robot,
                    reason: format!("zone {} is not a load zone", route.load),
                });
            }
            if role_of(route.unload) != Some(ZoneRole::Unload) {
                return Err(ConfigurationError::InvalidRoute {
                    robot,
                    reason: format!("zone {} is not an unload zone", route.unload),
                });
            }
            let load_category = workspace.zones()[route.load].category.as_deref();
            if !workspace.zones()[route.unload].accepts(load_category) {
                return Err(ConfigurationError::InvalidRoute {
                    robot,
                    reason: format!(
                        "unload zone {} does not accept loads from zone {}",
                        route.unload, route.load
                    ),
                });
            }
        }
        Ok(())
    }

    /// Number of discrete actions per robot.
    pub fn action_dim(&self) -> usize {
        crate::action::Action::COUNT
    }

    /// Length of the flattened per-robot observation.
    pub fn observation_dim(&self) -> usize {
        let neighbors = self.num_neighbors.min(self.n_robots.saturating_sub(1));
        Self::ROBOT_FEATURE_DIM * (neighbors + 1)
    }

    /// Features per robot in a flattened observation: x, y, loaded.
    pub const ROBOT_FEATURE_DIM: usize = 3;

    /// Parses a configuration from JSON. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, ConfigurationError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }
}

/// Every load zone must have at least one unload zone taking its category,
/// otherwise a robot loading there would carry forever.
fn validate_deliverable(workspace: &Workspace) -> Result<(), ConfigurationError> {
    for id in workspace.zones_with_role(ZoneRole::Load) {
        let category = workspace.zones()[id].category.as_deref();
        let deliverable = workspace
            .zones_with_role(ZoneRole::Unload)
            .any(|u| workspace.zones()[u].accepts(category));
        if !deliverable {
            return Err(invalid(
                "zones",
                format!("no unload zone accepts loads from zone {id}"),
            ));
        }
    }
    Ok(())
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, "must be positive"))
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, "must be non-negative"))
    }
}

impl Default for WarehouseConfig {
    /// Four shelving columns with unload bays underneath and two load
    /// docks on the left wall.
    fn default() -> Self {
        let columns = [0.2, 0.5, 0.8, 1.1];
        let obstacles = columns
            .iter()
            .map(|&x| Rect::new(x, -0.6, 0.15, 1.2))
            .collect();

        let mut zones = vec![
            GoalZone::load(Rect::new(-1.5, 0.2, 0.3, 0.6)).with_category("red"),
            GoalZone::load(Rect::new(-1.5, -0.8, 0.3, 0.6)).with_category("green"),
        ];
        for (i, &x) in columns.iter().enumerate() {
            let category = if i % 2 == 0 { "red" } else { "green" };
            zones.push(GoalZone::unload(Rect::new(x, -0.9, 0.15, 0.2)).with_category(category));
        }

        Self {
            bounds: Bounds::new(-1.5, 1.5, -1.0, 1.0),
            obstacles,
            zones,
            n_robots: 4,
            start_poses: None,
            start_separation: 0.3,
            spawn_margin: 0.2,
            spawn_attempts: 1000,
            step_distance: 0.15,
            time_step: 1.0,
            safety_radius: 0.2,
            obstacle_clearance: 0.1,
            barrier_gain: 1.0,
            solver_iterations: 500,
            solver_tolerance: 1e-10,
            assignment: AssignmentPolicy::Unconstrained,
            load_reward: 1.0,
            unload_reward: 5.0,
            step_penalty: 0.0,
            horizon: 100,
            deliveries_to_finish: None,
            num_neighbors: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = WarehouseConfig::default();
        let ws = cfg.validate().unwrap();
        assert_eq!(ws.obstacles().len(), 4);
        assert_eq!(ws.zones_with_role(ZoneRole::Load).count(), 2);
        assert_eq!(ws.zones_with_role(ZoneRole::Unload).count(), 4);
        assert_eq!(cfg.action_dim(), 5);
    }

    #[test]
    fn rejects_load_category_without_unload_zone() {
        let cfg = WarehouseConfig {
            obstacles: vec![],
            zones: vec![
                GoalZone::load(Rect::new(1.0, -0.1, 0.3, 0.2)).with_category("blue"),
                GoalZone::unload(Rect::new(-1.3, -0.1, 0.3, 0.2)).with_category("red"),
            ],
            ..WarehouseConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigurationError::InvalidParameter { name: "zones", .. })
        ));

        let wildcard = WarehouseConfig {
            obstacles: vec![],
            zones: vec![
                GoalZone::load(Rect::new(1.0, -0.1, 0.3, 0.2)).with_category("blue"),
                GoalZone::unload(Rect::new(-1.3, -0.1, 0.3, 0.2)),
            ],
            ..WarehouseConfig::default()
        };
        assert!(wildcard.validate().is_ok());
    }

    #[test]
    fn observation_dim_caps_neighbors() {
        let cfg = WarehouseConfig {
            n_robots: 2,
            num_neighbors: 5,
            ..WarehouseConfig::default()
        };
        assert_eq!(cfg.observation_dim(), 6);
    }

    #[test]
    fn rejects_zero_robots() {
        let cfg = WarehouseConfig {
            n_robots: 0,
            ..WarehouseConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigurationError::NoRobots));
    }

    #[test]
    fn rejects_bad_barrier_gain() {
        let cfg = WarehouseConfig {
            barrier_gain: 1.5,
            ..WarehouseConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigurationError::InvalidParameter { name: "barrier_gain", .. })
        ));
    }

    #[test]
    fn rejects_start_pose_count_mismatch() {
        let cfg = WarehouseConfig {
            n_robots: 2,
            start_poses: Some(vec![Pose::at(0.0, 0.0)]),
            ..WarehouseConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigurationError::StartPoseCount {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn rejects_route_with_wrong_roles() {
        let cfg = WarehouseConfig {
            n_robots: 1,
            assignment: AssignmentPolicy::Fixed {
                routes: vec![Route::new(2, 0)],
            },
            ..WarehouseConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigurationError::InvalidRoute { robot: 0, .. })
        ));
    }

    #[test]
    fn rejects_route_with_mismatched_category() {
        // Zone 0 loads red cargo; zone 3 only accepts green.
        let cfg = WarehouseConfig {
            n_robots: 1,
            assignment: AssignmentPolicy::Fixed {
                routes: vec![Route::new(0, 3)],
            },
            ..WarehouseConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigurationError::InvalidRoute { robot: 0, .. })
        ));
        let ok = WarehouseConfig {
            n_robots: 1,
            assignment: AssignmentPolicy::Fixed {
                routes: vec![Route::new(0, 2)],
            },
            ..WarehouseConfig::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let cfg = WarehouseConfig::from_json(r#"{ "n_robots": 2, "horizon": 10 }"#).unwrap();
        assert_eq!(cfg.n_robots, 2);
        assert_eq!(cfg.horizon, 10);
        assert_eq!(cfg.zones, WarehouseConfig::default().zones);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip_preserves_routes() {
        let cfg = WarehouseConfig {
            n_robots: 1,
            assignment: AssignmentPolicy::Fixed {
                routes: vec![Route::new(1, 3)],
            },
            ..WarehouseConfig::default()
        };
        let json = cfg.to_json().unwrap();
        assert_eq!(WarehouseConfig::from_json(&json).unwrap(), cfg);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_parse_error_is_configuration_error() {
        let err = WarehouseConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse(_)));
    }
}
