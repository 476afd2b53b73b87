//! Axis-aligned boxes and the sectors the partitioner produces.

use serde::{Deserialize, Serialize};

use super::instance::{Metadata, Position};
use crate::error::ConfigurationError;

/// Split axis of the partition.
///
/// The serialized names follow map-editor vocabulary: a vertical cut
/// divides the width (X), a horizontal cut the height (Y), a depth cut Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "vertical")]
    X,
    #[serde(rename = "horizontal")]
    Y,
    #[serde(rename = "depth")]
    Z,
}

/// Axis-aligned box in grid units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Bounds {
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            width,
            height,
            depth,
        }
    }

    /// Full volume at the origin, rejecting zero extents
    pub fn volume_of(width: u32, height: u32, depth: u32) -> Result<Self, ConfigurationError> {
        for (axis, value) in [(Axis::X, width), (Axis::Y, height), (Axis::Z, depth)] {
            if value == 0 {
                return Err(ConfigurationError::NonPositiveDimension { axis, value });
            }
        }
        Ok(Self::new(width, height, depth))
    }

    pub fn volume(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.depth as u64
    }

    pub fn extent(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
            Axis::Z => self.depth,
        }
    }

    fn origin(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Cut at `offset` along `axis`. The two halves cover the parent exactly.
    /// `offset` must lie strictly inside the extent.
    pub fn split(&self, axis: Axis, offset: u32) -> (Bounds, Bounds) {
        debug_assert!(offset > 0 && offset < self.extent(axis));
        let mut near = *self;
        let mut far = *self;
        match axis {
            Axis::X => {
                near.width = offset;
                far.x += offset;
                far.width -= offset;
            }
            Axis::Y => {
                near.height = offset;
                far.y += offset;
                far.height -= offset;
            }
            Axis::Z => {
                near.depth = offset;
                far.z += offset;
                far.depth -= offset;
            }
        }
        (near, far)
    }

    pub fn contains(&self, pos: Position) -> bool {
        [(Axis::X, pos.x), (Axis::Y, pos.y), (Axis::Z, pos.z)]
            .into_iter()
            .all(|(axis, v)| v >= self.origin(axis) && (v as u64) < self.end(axis))
    }

    /// True when the boxes touch along a face with positive overlap area
    pub fn shares_face(&self, other: &Bounds) -> bool {
        const AXES: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
        AXES.iter().any(|&axis| {
            let touching = self.end(axis) == other.origin(axis) as u64
                || other.end(axis) == self.origin(axis) as u64;
            touching
                && AXES
                    .iter()
                    .filter(|&&a| a != axis)
                    .all(|&a| self.overlap(other, a) > 0)
        })
    }

    /// Exclusive far edge, widened so boxes near `u32::MAX` cannot overflow
    fn end(&self, axis: Axis) -> u64 {
        self.origin(axis) as u64 + self.extent(axis) as u64
    }

    fn overlap(&self, other: &Bounds, axis: Axis) -> u64 {
        let start = self.origin(axis).max(other.origin(axis)) as u64;
        let end = self.end(axis).min(other.end(axis));
        end.saturating_sub(start)
    }
}

/// Role tag of a sector
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectorRole {
    Hub,
    Room,
    Spawn,
    Boss,
    Shop,
    Custom(String),
}

impl SectorRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hub => "hub",
            Self::Room => "room",
            Self::Spawn => "spawn",
            Self::Boss => "boss",
            Self::Shop => "shop",
            Self::Custom(name) => name,
        }
    }
}

impl From<String> for SectorRole {
    fn from(name: String) -> Self {
        match name.as_str() {
            "hub" => Self::Hub,
            "room" => Self::Room,
            "spawn" => Self::Spawn,
            "boss" => Self::Boss,
            "shop" => Self::Shop,
            _ => Self::Custom(name),
        }
    }
}

impl From<SectorRole> for String {
    fn from(role: SectorRole) -> Self {
        match role {
            SectorRole::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

/// Leaf region of the spatial partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: String,
    pub bounds: Bounds,
    pub role: SectorRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Sector {
    pub fn new(id: impl Into<String>, bounds: Bounds, role: SectorRole) -> Self {
        Self {
            id: id.into(),
            bounds,
            role,
            tile_ids: None,
            metadata: Metadata::new(),
        }
    }
}
