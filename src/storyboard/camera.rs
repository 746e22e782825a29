//! Camera description for a scene

use serde::{Deserialize, Serialize};

use crate::core::types::{Position, Tick};
use crate::storyboard::tagged::{Tagged, TaggedKind};

/// Ordered camera movements; the player (`@p`) acts as the camera
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    #[serde(default)]
    pub movements: Vec<Tagged<CameraMovement>>,
}

impl CameraSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, movement: CameraMovement) -> Self {
        self.movements.push(Tagged::Known(movement));
        self
    }

    /// Movement types in declaration order, for summaries
    pub fn kinds(&self) -> Vec<&str> {
        self.movements.iter().map(|m| m.kind()).collect()
    }
}

fn default_orbit_end() -> f64 {
    360.0
}

fn default_orbit_height() -> f64 {
    5.0
}

fn default_follow_distance() -> f64 {
    5.0
}

fn default_follow_height() -> f64 {
    2.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraMovement {
    /// Fixed camera position
    Static {
        #[serde(default)]
        tick_start: Tick,
        #[serde(default)]
        tick_end: Tick,
        position: Position,
        /// Point to face
        #[serde(default)]
        facing: Option<Position>,
        /// Actor id to face (takes precedence over `facing`)
        #[serde(default)]
        look_at: Option<String>,
    },
    /// Straight move from A to B
    #[serde(alias = "dolly")]
    Pan {
        #[serde(default)]
        tick_start: Tick,
        tick_end: Tick,
        start_position: Position,
        end_position: Position,
        #[serde(default)]
        look_at: Option<String>,
    },
    /// Circle around a point, always facing it
    Orbit {
        #[serde(default)]
        tick_start: Tick,
        tick_end: Tick,
        center: Position,
        radius: f64,
        #[serde(default)]
        start_angle: f64,
        #[serde(default = "default_orbit_end")]
        end_angle: f64,
        #[serde(default = "default_orbit_height")]
        height: f64,
    },
    /// Trail an actor from behind and above
    Follow {
        #[serde(default)]
        tick_start: Tick,
        tick_end: Tick,
        target: String,
        #[serde(default = "default_follow_distance")]
        distance: f64,
        #[serde(default = "default_follow_height")]
        height: f64,
    },
}

impl CameraMovement {
    pub fn tick_start(&self) -> Tick {
        match self {
            CameraMovement::Static { tick_start, .. }
            | CameraMovement::Pan { tick_start, .. }
            | CameraMovement::Orbit { tick_start, .. }
            | CameraMovement::Follow { tick_start, .. } => *tick_start,
        }
    }

    pub fn tick_end(&self) -> Tick {
        match self {
            CameraMovement::Static {
                tick_start,
                tick_end,
                ..
            } => (*tick_end).max(*tick_start),
            CameraMovement::Pan { tick_end, .. }
            | CameraMovement::Orbit { tick_end, .. }
            | CameraMovement::Follow { tick_end, .. } => *tick_end,
        }
    }
}

impl TaggedKind for CameraMovement {
    const KINDS: &'static [&'static str] = &["static", "pan", "dolly", "orbit", "follow"];

    fn kind(&self) -> &'static str {
        match self {
            CameraMovement::Static { .. } => "static",
            CameraMovement::Pan { .. } => "pan",
            CameraMovement::Orbit { .. } => "orbit",
            CameraMovement::Follow { .. } => "follow",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dolly_alias_parses_as_pan() {
        let movement: Tagged<CameraMovement> = serde_json::from_str(
            r#"{"type": "dolly", "tick_start": 100, "tick_end": 200,
                "start_position": [85, 70, 100], "end_position": [125, 70, 100],
                "look_at": "actor_001"}"#,
        )
        .unwrap();
        let pan = movement.known().unwrap();
        assert_eq!(pan.kind(), "pan");
        assert_eq!(pan.tick_start(), 100);
    }

    #[test]
    fn test_orbit_defaults() {
        let movement: CameraMovement = serde_json::from_str(
            r#"{"type": "orbit", "tick_end": 100, "center": [0, 64, 0], "radius": 10}"#,
        )
        .unwrap();
        match movement {
            CameraMovement::Orbit {
                end_angle, height, ..
            } => {
                assert_eq!(end_angle, 360.0);
                assert_eq!(height, 5.0);
            }
            other => panic!("expected orbit, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_movement_round_trips_raw_fields() {
        let json = r#"{"type": "shake", "tick_start": 40, "intensity": 3}"#;
        let movement: Tagged<CameraMovement> = serde_json::from_str(json).unwrap();
        assert_eq!(movement.kind(), "shake");
        assert!(movement.malformed().is_none());

        let value = serde_json::to_value(&movement).unwrap();
        assert_eq!(value["type"], "shake");
        assert_eq!(value["intensity"], 3);
    }

    #[test]
    fn test_known_movement_serializes_with_tag() {
        let spec = CameraSpec::new().with(CameraMovement::Static {
            tick_start: 0,
            tick_end: 0,
            position: Position::new(0.0, 70.0, 0.0),
            facing: None,
            look_at: None,
        });
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["movements"][0]["type"], "static");
        assert_eq!(spec.kinds(), vec!["static"]);
    }
}
