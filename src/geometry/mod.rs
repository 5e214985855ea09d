//! Static workspace geometry: points, poses, rectangles, goal zones, and the
//! validated [`Workspace`] that the rest of the simulation queries.

pub mod rect;
pub mod vec2;
pub mod workspace;
pub mod zone;

pub use rect::{Bounds, Rect};
pub use vec2::{Pose, Vec2};
pub use workspace::Workspace;
pub use zone::{GoalZone, ZoneId, ZoneRole};
