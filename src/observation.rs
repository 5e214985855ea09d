//! Observation encoding for the policy.
//!
//! Each robot sees its own pose, load flag and target zone, plus the
//! positions and load flags of its nearest teammates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Pose, Vec2, ZoneId};
use crate::robot::Robot;

/// A teammate as seen by another robot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Teammate {
    pub index: usize,
    pub position: Vec2,
    pub loaded: bool,
}

/// Observation for one robot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    pub robot: usize,
    pub pose: Pose,
    pub loaded: bool,
    pub target: Option<ZoneId>,
    pub teammates: Vec<Teammate>,
}

impl Observation {
    /// Flat feature vector:
    ///
    /// ```text
    /// [x, y, loaded] ++ [x, y, loaded] per teammate
    /// ```
    pub fn features(&self) -> Vec<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let mut features = vec![self.pose.position.x, self.pose.position.y, flag(self.loaded)];
        for t in &self.teammates {
            features.extend([t.position.x, t.position.y, flag(t.loaded)]);
        }
        features
    }
}

/// Builds observations for robots.
pub struct ObservationBuilder;

impl ObservationBuilder {
    /// Observation of robot `index` with up to `num_neighbors` teammates.
    ///
    /// When every teammate fits they are listed in index order; otherwise
    /// the nearest ones are chosen, ties broken by index.
    pub fn build(index: usize, robots: &[Robot], num_neighbors: usize) -> Observation {
        let me = &robots[index];
        let mut others: Vec<&Robot> = robots.iter().filter(|r| r.index != index).collect();
        if num_neighbors < others.len() {
            let origin = me.pose.position;
            others.sort_by(|a, b| {
                let da = a.pose.position.distance_to(origin);
                let db = b.pose.position.distance_to(origin);
                da.total_cmp(&db).then(a.index.cmp(&b.index))
            });
            others.truncate(num_neighbors);
        }

        Observation {
            robot: index,
            pose: me.pose,
            loaded: me.is_loaded(),
            target: me.target(),
            teammates: others
                .into_iter()
                .map(|r| Teammate {
                    index: r.index,
                    position: r.pose.position,
                    loaded: r.is_loaded(),
                })
                .collect(),
        }
    }

    pub fn build_all(robots: &[Robot], num_neighbors: usize) -> Vec<Observation> {
        (0..robots.len())
            .map(|i| Self::build(i, robots, num_neighbors))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn robots() -> Vec<Robot> {
        vec![
            Robot::new(0, Pose::at(0.0, 0.0)),
            Robot::new(1, Pose::at(1.0, 0.0)),
            Robot::new(2, Pose::at(0.3, 0.0)),
        ]
    }

    #[test]
    fn nearest_teammate_is_chosen() {
        let obs = ObservationBuilder::build(0, &robots(), 1);
        assert_eq!(obs.teammates.len(), 1);
        assert_eq!(obs.teammates[0].index, 2);
        assert_eq!(obs.features(), vec![0.0, 0.0, 0.0, 0.3, 0.0, 0.0]);
    }

    #[test]
    fn all_teammates_in_index_order() {
        let obs = ObservationBuilder::build(2, &robots(), 5);
        let order: Vec<_> = obs.teammates.iter().map(|t| t.index).collect();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn feature_length_matches_config() {
        let cfg = crate::config::WarehouseConfig {
            n_robots: 3,
            num_neighbors: 1,
            ..Default::default()
        };
        for obs in ObservationBuilder::build_all(&robots(), cfg.num_neighbors) {
            assert_eq!(obs.features().len(), cfg.observation_dim());
        }
    }
}
