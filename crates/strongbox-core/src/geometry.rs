//! Shared 2D box geometry.
//!
//! Every resolver in the crate goes through this module: the overlap test,
//! the minimum translation along the lesser-overlap axis, and the room clamp.
//!
//! # Coordinate Conventions
//!
//! Screen space: `+x` is right, `+y` is down. Chests are anchored at their
//! top-left corner. Small projectiles are described by a centre point and a
//! half-extent, which [`BodyShape`] folds into the same [`Aabb`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Width/height used when a body does not declare one.
pub const DEFAULT_EXTENT: f32 = 30.0;

/// Axis-aligned bounding box in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

impl Aabb {
    /// Box anchored at its top-left corner.
    #[must_use]
    pub fn from_top_left(top_left: Vec2, size: Vec2) -> Self {
        Self {
            min: top_left,
            max: top_left + size,
        }
    }

    /// Box centred on a point with a uniform half-extent.
    #[must_use]
    pub fn from_center(center: Vec2, half_extent: f32) -> Self {
        let half = Vec2::splat(half_extent);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Width and height.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Grows the box by `padding` on every side.
    #[must_use]
    pub fn inflate(&self, padding: f32) -> Self {
        let pad = Vec2::splat(padding);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Strict intersection test. Touching edges do not count.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// How a body describes its extent.
///
/// Entities in room data come in two flavours: a centre point with a `size`
/// half-extent, or a top-left corner with `width`/`height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    /// Position is the centre; `half` is the half-extent on both axes.
    Centered {
        /// Half-extent.
        half: f32,
    },
    /// Position is the top-left corner.
    Rect {
        /// Box width.
        width: f32,
        /// Box height.
        height: f32,
    },
}

impl BodyShape {
    /// Interprets the legacy `size`/`width`/`height` trio.
    ///
    /// A `size` only counts when no `width` is present. Missing rectangle
    /// dimensions fall back to [`DEFAULT_EXTENT`].
    #[must_use]
    pub fn from_legacy(size: Option<f32>, width: Option<f32>, height: Option<f32>) -> Self {
        match (size, width) {
            (Some(half), None) if half > 0.0 => Self::Centered { half },
            _ => Self::Rect {
                width: width.filter(|w| *w > 0.0).unwrap_or(DEFAULT_EXTENT),
                height: height.filter(|h| *h > 0.0).unwrap_or(DEFAULT_EXTENT),
            },
        }
    }

    /// Box occupied by a body with this shape at `pos`.
    #[must_use]
    pub fn aabb(&self, pos: Vec2) -> Aabb {
        match *self {
            Self::Centered { half } => Aabb::from_center(pos, half),
            Self::Rect { width, height } => Aabb::from_top_left(pos, Vec2::new(width, height)),
        }
    }
}

impl Default for BodyShape {
    fn default() -> Self {
        Self::Rect {
            width: DEFAULT_EXTENT,
            height: DEFAULT_EXTENT,
        }
    }
}

/// Axis a correction is applied along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

/// Penetration of box `a` into box `b`, measured centre to centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// Per-axis overlap (both components positive).
    pub overlap: Vec2,
    /// `a.center - b.center`.
    pub delta: Vec2,
}

impl Separation {
    /// The axis with the smaller overlap. Ties resolve vertically.
    #[must_use]
    pub fn axis(&self) -> Axis {
        if self.overlap.x < self.overlap.y {
            Axis::X
        } else {
            Axis::Y
        }
    }

    /// Full correction that moves `a` out of `b` along [`Self::axis`].
    ///
    /// Applying `-push()` to `b` instead separates the pair the other way.
    /// Coincident centres push `a` toward negative coordinates.
    #[must_use]
    pub fn push(&self) -> Vec2 {
        match self.axis() {
            Axis::X => Vec2::new(direction(self.delta.x) * self.overlap.x, 0.0),
            Axis::Y => Vec2::new(0.0, direction(self.delta.y) * self.overlap.y),
        }
    }
}

fn direction(delta: f32) -> f32 {
    if delta > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Computes the minimum translation between two boxes.
///
/// Returns `None` unless the boxes overlap on both axes.
#[must_use]
pub fn separation(a: &Aabb, b: &Aabb) -> Option<Separation> {
    let delta = a.center() - b.center();
    let combined_half = (a.size() + b.size()) * 0.5;
    let overlap = combined_half - delta.abs();

    (overlap.x > 0.0 && overlap.y > 0.0).then_some(Separation { overlap, delta })
}

/// Playable rectangle of a room, shrunk by a wall inset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBounds {
    /// Room width.
    pub width: f32,
    /// Room height.
    pub height: f32,
    /// Distance kept clear from every edge.
    pub inset: f32,
}

impl RoomBounds {
    /// Clamps a top-left anchored box so it stays inside the inset.
    ///
    /// The far edge wins when the room is too small to fit the box.
    #[must_use]
    pub fn clamp(&self, top_left: Vec2, size: Vec2) -> Vec2 {
        let max = Vec2::new(
            self.width - self.inset - size.x,
            self.height - self.inset - size.y,
        );
        top_left.max(Vec2::splat(self.inset)).min(max)
    }
}
