//! The validated, immutable scene every other component queries.

use super::rect::{Bounds, Rect};
use super::vec2::Vec2;
use super::zone::{GoalZone, ZoneId, ZoneRole};
use crate::error::ConfigurationError;

/// Workspace boundary, static obstacles and goal zones.
///
/// Built once per configuration through [`Workspace::new`], which rejects
/// malformed geometry. Afterwards it is shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    bounds: Bounds,
    obstacles: Vec<Rect>,
    zones: Vec<GoalZone>,
}

impl Workspace {
    /// Validates and assembles the workspace.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for non-positive bounds, zero-size or
    /// out-of-bounds obstacles and zones, zero zone capacity, and
    /// overlapping zones.
    pub fn new(
        bounds: Bounds,
        obstacles: Vec<Rect>,
        zones: Vec<GoalZone>,
    ) -> Result<Self, ConfigurationError> {
        if !bounds.is_valid() {
            return Err(ConfigurationError::NonPositiveBounds);
        }
        for (index, obstacle) in obstacles.iter().enumerate() {
            if obstacle.is_degenerate() {
                return Err(ConfigurationError::DegenerateObstacle { index });
            }
            if !bounds.contains_rect(obstacle) {
                return Err(ConfigurationError::ObstacleOutOfBounds { index });
            }
        }
        for (index, zone) in zones.iter().enumerate() {
            if zone.rect.is_degenerate() {
                return Err(ConfigurationError::DegenerateZone { index });
            }
            if !bounds.contains_rect(&zone.rect) {
                return Err(ConfigurationError::ZoneOutOfBounds { index });
            }
            if zone.capacity == Some(0) {
                return Err(ConfigurationError::InvalidParameter {
                    name: "capacity",
                    reason: format!("zone {index} has zero capacity"),
                });
            }
        }
        for (first, a) in zones.iter().enumerate() {
            for (offset, b) in zones[first + 1..].iter().enumerate() {
                if a.rect.intersects(&b.rect) {
                    return Err(ConfigurationError::OverlappingZones {
                        first,
                        second: first + 1 + offset,
                    });
                }
            }
        }

        Ok(Self {
            bounds,
            obstacles,
            zones,
        })
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }

    pub fn zones(&self) -> &[GoalZone] {
        &self.zones
    }

    pub fn zone(&self, id: ZoneId) -> Option<&GoalZone> {
        self.zones.get(id)
    }

    /// The zone containing `p`. Zones never overlap, so there is at most one.
    pub fn zone_at(&self, p: Vec2) -> Option<ZoneId> {
        self.zones.iter().position(|z| z.contains(p))
    }

    /// Ids of all zones with the given role, in index order.
    pub fn zones_with_role(&self, role: ZoneRole) -> impl Iterator<Item = ZoneId> + '_ {
        self.zones
            .iter()
            .enumerate()
            .filter(move |(_, z)| z.role == role)
            .map(|(id, _)| id)
    }

    /// Distance from `p` to the nearest obstacle (infinite when there are none).
    pub fn obstacle_distance(&self, p: Vec2) -> f64 {
        self.obstacles
            .iter()
            .map(|o| o.distance_to(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// True when `p` lies inside the boundary and at least `clearance` away
    /// from every obstacle.
    pub fn is_free(&self, p: Vec2, clearance: f64) -> bool {
        self.bounds.contains(p) && self.obstacle_distance(p) >= clearance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds::new(-1.5, 1.5, -1.0, 1.0)
    }

    #[test]
    fn accepts_valid_layout() {
        let ws = Workspace::new(
            bounds(),
            vec![Rect::new(0.0, -0.5, 0.2, 1.0)],
            vec![
                GoalZone::load(Rect::new(1.0, -0.2, 0.3, 0.4)),
                GoalZone::unload(Rect::new(-1.3, -0.2, 0.3, 0.4)),
            ],
        )
        .unwrap();
        assert_eq!(ws.zone_at(Vec2::new(1.1, 0.0)), Some(0));
        assert_eq!(ws.zone_at(Vec2::new(0.5, 0.0)), None);
        assert_eq!(ws.zones_with_role(ZoneRole::Unload).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn rejects_zero_size_obstacle() {
        let err = Workspace::new(bounds(), vec![Rect::new(0.0, 0.0, 0.0, 1.0)], vec![]);
        assert_eq!(err, Err(ConfigurationError::DegenerateObstacle { index: 0 }));
    }

    #[test]
    fn rejects_zone_outside_boundary() {
        let err = Workspace::new(
            bounds(),
            vec![],
            vec![GoalZone::load(Rect::new(1.4, 0.0, 0.3, 0.3))],
        );
        assert_eq!(err, Err(ConfigurationError::ZoneOutOfBounds { index: 0 }));
    }

    #[test]
    fn rejects_overlapping_zones() {
        let err = Workspace::new(
            bounds(),
            vec![],
            vec![
                GoalZone::load(Rect::new(0.0, 0.0, 0.5, 0.5)),
                GoalZone::unload(Rect::new(-1.0, -1.0, 0.2, 0.2)),
                GoalZone::unload(Rect::new(0.4, 0.4, 0.5, 0.5)),
            ],
        );
        assert_eq!(
            err,
            Err(ConfigurationError::OverlappingZones { first: 0, second: 2 })
        );
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = Workspace::new(Bounds::new(1.0, -1.0, -1.0, 1.0), vec![], vec![]);
        assert_eq!(err, Err(ConfigurationError::NonPositiveBounds));
    }

    #[test]
    fn free_space_respects_clearance() {
        let ws = Workspace::new(bounds(), vec![Rect::new(0.0, 0.0, 0.2, 0.2)], vec![]).unwrap();
        assert!(!ws.is_free(Vec2::new(0.25, 0.1), 0.1));
        assert!(ws.is_free(Vec2::new(0.35, 0.1), 0.1));
        assert!(!ws.is_free(Vec2::new(2.0, 0.0), 0.0));
    }
}
