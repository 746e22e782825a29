//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minecraft game tick (the unit of all storyboard timing)
pub type Tick = u64;

/// Server ticks per real-time second
pub const TICKS_PER_SECOND: Tick = 20;

/// Latest tick a storyboard may reach (one day of real time)
pub const MAX_TICK: Tick = 24 * 60 * 60 * TICKS_PER_SECOND;

/// Stable identifier of a scene, unique within a storyboard
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub String);

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// World position in block coordinates, serialized as `[x, y, z]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position(pub f64, pub f64, pub f64);

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(x, y, z)
    }

    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }

    pub fn z(&self) -> f64 {
        self.2
    }

    /// Linear interpolation towards `other`, `t` in `[0, 1]`
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self(
            self.0 + (other.0 - self.0) * t,
            self.1 + (other.1 - self.1) * t,
            self.2 + (other.2 - self.2) * t,
        )
    }

    /// Coordinates rounded to one decimal, as used for camera keyframes
    pub fn keyframe(&self) -> String {
        format!("{:.1} {:.1} {:.1}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.0, self.1, self.2)
    }
}

/// Convert ticks to seconds of real time
pub fn ticks_to_seconds(ticks: Tick) -> f64 {
    ticks as f64 / TICKS_PER_SECOND as f64
}
