//! Position and movement-intent vectors
//!
//! `Vec3` serializes as `{x, y, z}` and `Movement` as `{x, z}`, matching
//! the wire shape exactly. Only the handful of operations the sync core
//! needs are implemented; this is not a general vector math library.

use serde::{Deserialize, Serialize};

/// A position or velocity in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new vector
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Component-wise linear interpolation towards `other`
    ///
    /// `alpha` = 0 yields `self`, `alpha` = 1 yields `other`.
    pub fn lerp(&self, other: &Vec3, alpha: f64) -> Vec3 {
        Vec3 {
            x: self.x + (other.x - self.x) * alpha,
            y: self.y + (other.y - self.y) * alpha,
            z: self.z + (other.z - self.z) * alpha,
        }
    }
}

/// Horizontal movement intent from input: `{x, z}` on the wire
///
/// Roughly unit-length; consumers normalize when the length exceeds 1 so
/// diagonal movement is not faster than cardinal movement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Movement {
    pub x: f64,
    pub z: f64,
}

impl Movement {
    pub const NONE: Movement = Movement { x: 0.0, z: 0.0 };

    /// Create a new movement intent
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Horizontal length
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    /// Normalized copy, clamping over-unit intents to unit length
    ///
    /// Intents at or below unit length pass through unchanged.
    pub fn clamped(&self) -> Movement {
        let len = self.length();
        if len > 1.0 {
            Movement {
                x: self.x / len,
                z: self.z / len,
            }
        } else {
            *self
        }
    }

    /// Whether this intent carries any movement at all
    pub fn is_none(&self) -> bool {
        self.x == 0.0 && self.z == 0.0
    }
}
