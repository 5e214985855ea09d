//! Start pose selection: configured poses are checked, otherwise robots are
//! placed by rejection sampling inside the boundary.

use rand::Rng;

use crate::config::WarehouseConfig;
use crate::error::ConfigurationError;
use crate::geometry::{Pose, Workspace};

/// Start poses for every robot, satisfying all spatial invariants.
pub fn start_poses<R: Rng>(
    config: &WarehouseConfig,
    workspace: &Workspace,
    rng: &mut R,
) -> Result<Vec<Pose>, ConfigurationError> {
    match &config.start_poses {
        Some(poses) => {
            check_configured(config, workspace, poses)?;
            Ok(poses.clone())
        }
        None => sample(config, workspace, rng),
    }
}

fn check_configured(
    config: &WarehouseConfig,
    workspace: &Workspace,
    poses: &[Pose],
) -> Result<(), ConfigurationError> {
    for (robot, pose) in poses.iter().enumerate() {
        let p = pose.position;
        if !p.is_finite() || !workspace.bounds().contains(p) {
            return Err(ConfigurationError::UnsafeStartPose {
                robot,
                reason: format!("{p} is outside the workspace"),
            });
        }
        if workspace.obstacle_distance(p) < config.obstacle_clearance {
            return Err(ConfigurationError::UnsafeStartPose {
                robot,
                reason: format!("{p} is within obstacle clearance"),
            });
        }
        if let Some(other) = poses[..robot]
            .iter()
            .position(|q| q.position.distance_to(p) < config.safety_radius)
        {
            return Err(ConfigurationError::UnsafeStartPose {
                robot,
                reason: format!("closer than the safety radius to robot {other}"),
            });
        }
    }
    Ok(())
}

fn sample<R: Rng>(
    config: &WarehouseConfig,
    workspace: &Workspace,
    rng: &mut R,
) -> Result<Vec<Pose>, ConfigurationError> {
    let region = workspace.bounds().inset(config.spawn_margin);
    if !region.is_valid() {
        return Err(ConfigurationError::InvalidParameter {
            name: "spawn_margin",
            reason: "leaves no room inside the boundary".into(),
        });
    }
    let separation = config.start_separation.max(config.safety_radius);

    let mut poses: Vec<Pose> = Vec::with_capacity(config.n_robots);
    let mut attempts = 0;
    while poses.len() < config.n_robots && attempts < config.spawn_attempts {
        attempts += 1;
        let candidate = Pose::at(
            rng.gen_range(region.left..region.right),
            rng.gen_range(region.up..region.down),
        );
        let p = candidate.position;
        let clear = workspace.is_free(p, config.obstacle_clearance)
            && workspace.zone_at(p).is_none()
            && poses.iter().all(|q| q.position.distance_to(p) >= separation);
        if clear {
            poses.push(candidate);
        }
    }

    if poses.len() < config.n_robots {
        return Err(ConfigurationError::SpawnFailed {
            placed: poses.len(),
            requested: config.n_robots,
        });
    }
    Ok(poses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_spawn_respects_invariants() {
        let config = WarehouseConfig {
            n_robots: 6,
            ..WarehouseConfig::default()
        };
        let ws = config.validate().unwrap();
        let poses = start_poses(&config, &ws, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(poses.len(), 6);
        for (i, a) in poses.iter().enumerate() {
            assert!(ws.is_free(a.position, config.obstacle_clearance));
            assert!(ws.zone_at(a.position).is_none());
            for b in &poses[i + 1..] {
                assert!(a.position.distance_to(b.position) >= config.start_separation);
            }
        }
    }

    #[test]
    fn same_seed_same_spawn() {
        let config = WarehouseConfig::default();
        let ws = config.validate().unwrap();
        let a = start_poses(&config, &ws, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = start_poses(&config, &ws, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn overcrowded_spawn_fails() {
        let config = WarehouseConfig {
            n_robots: 200,
            spawn_attempts: 2000,
            ..WarehouseConfig::default()
        };
        let ws = config.validate().unwrap();
        let err = start_poses(&config, &ws, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::SpawnFailed { requested: 200, .. }
        ));
    }

    #[test]
    fn configured_poses_too_close_are_rejected() {
        let config = WarehouseConfig {
            n_robots: 2,
            start_poses: Some(vec![Pose::at(-1.0, 0.5), Pose::at(-0.95, 0.5)]),
            ..WarehouseConfig::default()
        };
        let ws = config.validate().unwrap();
        let err = start_poses(&config, &ws, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnsafeStartPose { robot: 1, .. }
        ));
    }

    #[test]
    fn configured_pose_inside_obstacle_is_rejected() {
        let config = WarehouseConfig {
            n_robots: 1,
            start_poses: Some(vec![Pose::at(0.25, 0.0)]),
            ..WarehouseConfig::default()
        };
        let ws = config.validate().unwrap();
        assert!(start_poses(&config, &ws, &mut StdRng::seed_from_u64(1)).is_err());
    }
}
