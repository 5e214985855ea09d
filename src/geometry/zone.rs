//! Load and unload goal zones.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::vec2::Vec2;

/// Index of a zone in [`super::Workspace::zones`].
pub type ZoneId = usize;

/// What happens to a robot's load inside a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ZoneRole {
    Load,
    Unload,
}

impl fmt::Display for ZoneRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneRole::Load => write!(f, "load"),
            ZoneRole::Unload => write!(f, "unload"),
        }
    }
}

/// A rectangular zone where loads are picked up or dropped off.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GoalZone {
    pub rect: Rect,
    pub role: ZoneRole,
    /// Load category handled here. `None` matches any category.
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: Option<String>,
    /// Maximum robots that may transition here in one step. `None` is unlimited.
    #[cfg_attr(feature = "serde", serde(default))]
    pub capacity: Option<usize>,
}

impl GoalZone {
    pub fn new(rect: Rect, role: ZoneRole) -> Self {
        Self {
            rect,
            role,
            category: None,
            capacity: None,
        }
    }

    pub fn load(rect: Rect) -> Self {
        Self::new(rect, ZoneRole::Load)
    }

    pub fn unload(rect: Rect) -> Self {
        Self::new(rect, ZoneRole::Unload)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.rect.contains(p)
    }

    /// True when a load of `category` may be handled here.
    pub fn accepts(&self, category: Option<&str>) -> bool {
        match (self.category.as_deref(), category) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_categories_match() {
        let any = GoalZone::unload(Rect::new(0.0, 0.0, 1.0, 1.0));
        let red = any.clone().with_category("red");
        assert!(any.accepts(Some("red")));
        assert!(any.accepts(None));
        assert!(red.accepts(None));
        assert!(red.accepts(Some("red")));
        assert!(!red.accepts(Some("green")));
    }

    #[test]
    fn builder_sets_fields() {
        let z = GoalZone::load(Rect::new(0.0, 0.0, 1.0, 1.0))
            .with_category("green")
            .with_capacity(2);
        assert_eq!(z.role, ZoneRole::Load);
        assert_eq!(z.category.as_deref(), Some("green"));
        assert_eq!(z.capacity, Some(2));
    }
}
