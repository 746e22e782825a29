//! Scenes, their setting, actors and effects

use serde::{Deserialize, Serialize};

use crate::core::types::{Position, SceneId, Tick, TICKS_PER_SECOND};
use crate::storyboard::camera::CameraSpec;
use crate::storyboard::tagged::{Tagged, TaggedKind};

fn default_duration() -> Tick {
    30 * TICKS_PER_SECOND
}

fn default_true() -> bool {
    true
}

/// A time-bounded unit of action with actors and a camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Absolute tick at which the scene starts playing
    #[serde(default)]
    pub start_offset: Tick,
    /// Length of the scene in ticks
    #[serde(default = "default_duration")]
    pub duration: Tick,
    #[serde(default)]
    pub setting: Setting,
    #[serde(default)]
    pub actors: Vec<ActorRef>,
    #[serde(default)]
    pub camera: CameraSpec,
    #[serde(default)]
    pub effects: Vec<Tagged<Effect>>,
}

impl Scene {
    pub fn new(id: impl Into<String>, start_offset: Tick, duration: Tick) -> Self {
        Self {
            id: SceneId::new(id),
            name: String::new(),
            description: String::new(),
            start_offset,
            duration,
            setting: Setting::default(),
            actors: Vec::new(),
            camera: CameraSpec::default(),
            effects: Vec::new(),
        }
    }

    /// Human-readable name, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }

    pub fn end_tick(&self) -> Tick {
        self.start_offset.saturating_add(self.duration)
    }

    pub fn actor(&self, actor_id: &str) -> Option<&ActorRef> {
        self.actors.iter().find(|a| a.id == actor_id)
    }
}

/// Environment of a scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub weather: Option<Weather>,
    /// Structures to place, e.g. "Castle", "Village"
    #[serde(default)]
    pub world_modifications: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Day,
    Noon,
    Sunset,
    Night,
    Midnight,
    Sunrise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Rain,
    #[serde(alias = "storm")]
    Thunder,
}

/// A creature taking part in a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorRef {
    /// Unique within the scene; camera moves refer to actors by this id
    pub id: String,
    pub name: String,
    /// Entity type such as "villager" or "titans:zombie_titan"
    #[serde(default, rename = "type")]
    pub entity: Option<String>,
    /// Where the actor is spawned, or moved to if it already exists
    #[serde(default)]
    pub position: Option<Position>,
    /// False for entities that already exist in the world
    #[serde(default = "default_true")]
    pub spawn: bool,
    #[serde(default)]
    pub actions: Vec<Tagged<ActorAction>>,
}

impl ActorRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity: None,
            position: None,
            spawn: true,
            actions: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn existing(mut self) -> Self {
        self.spawn = false;
        self
    }

    pub fn with_action(mut self, action: ActorAction) -> Self {
        self.actions.push(Tagged::Known(action));
        self
    }
}

/// Something an actor can look at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookTarget {
    Position(Position),
    /// Actor id or entity name
    Actor(String),
}

/// Animation hints for an actor, at scene-relative ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActorAction {
    WalkTo {
        #[serde(default)]
        tick: Tick,
        target_position: Position,
    },
    RunTo {
        #[serde(default)]
        tick: Tick,
        target_position: Position,
    },
    Teleport {
        #[serde(default)]
        tick: Tick,
        position: Position,
    },
    Sit {
        #[serde(default)]
        tick: Tick,
    },
    Jump {
        #[serde(default)]
        tick: Tick,
    },
    #[serde(alias = "swipe")]
    Attack {
        #[serde(default)]
        tick: Tick,
    },
    Interact {
        #[serde(default)]
        tick: Tick,
    },
    LookAt {
        #[serde(default)]
        tick: Tick,
        target: LookTarget,
    },
}

impl ActorAction {
    pub fn tick(&self) -> Tick {
        match self {
            ActorAction::WalkTo { tick, .. }
            | ActorAction::RunTo { tick, .. }
            | ActorAction::Teleport { tick, .. }
            | ActorAction::Sit { tick }
            | ActorAction::Jump { tick }
            | ActorAction::Attack { tick }
            | ActorAction::Interact { tick }
            | ActorAction::LookAt { tick, .. } => *tick,
        }
    }
}

impl TaggedKind for ActorAction {
    const KINDS: &'static [&'static str] = &[
        "walk_to", "run_to", "teleport", "sit", "jump", "attack", "swipe", "interact", "look_at",
    ];

    fn kind(&self) -> &'static str {
        match self {
            ActorAction::WalkTo { .. } => "walk_to",
            ActorAction::RunTo { .. } => "run_to",
            ActorAction::Teleport { .. } => "teleport",
            ActorAction::Sit { .. } => "sit",
            ActorAction::Jump { .. } => "jump",
            ActorAction::Attack { .. } => "attack",
            ActorAction::Interact { .. } => "interact",
            ActorAction::LookAt { .. } => "look_at",
        }
    }
}

fn default_particle_count() -> u32 {
    10
}

fn default_volume() -> f64 {
    1.0
}

/// Visual or audio effect at a scene-relative tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Particles {
        #[serde(default)]
        tick: Tick,
        particle_type: String,
        position: Position,
        #[serde(default = "default_particle_count")]
        count: u32,
    },
    Sound {
        #[serde(default)]
        tick: Tick,
        sound: String,
        #[serde(default = "default_volume")]
        volume: f64,
    },
}

impl Effect {
    pub fn tick(&self) -> Tick {
        match self {
            Effect::Particles { tick, .. } | Effect::Sound { tick, .. } => *tick,
        }
    }
}

impl TaggedKind for Effect {
    const KINDS: &'static [&'static str] = &["particles", "sound"];

    fn kind(&self) -> &'static str {
        match self {
            Effect::Particles { .. } => "particles",
            Effect::Sound { .. } => "sound",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_defaults_from_minimal_json() {
        let scene: Scene = serde_json::from_str(r#"{"id": "scene_001"}"#).unwrap();
        assert_eq!(scene.start_offset, 0);
        assert_eq!(scene.duration, 600);
        assert!(scene.actors.is_empty());
        assert_eq!(scene.display_name(), "scene_001");
    }

    #[test]
    fn test_end_tick_saturates() {
        assert_eq!(Scene::new("s", u64::MAX, 600).end_tick(), u64::MAX);
        assert_eq!(Scene::new("s", 100, 600).end_tick(), 700);
    }

    #[test]
    fn test_actor_spawn_defaults_to_true() {
        let actor: ActorRef =
            serde_json::from_str(r#"{"id": "a1", "name": "farmer", "type": "villager"}"#).unwrap();
        assert!(actor.spawn);
        assert_eq!(actor.entity.as_deref(), Some("villager"));
    }

    #[test]
    fn test_unknown_action_is_kept() {
        let actor: ActorRef = serde_json::from_str(
            r#"{"id": "a1", "name": "farmer", "actions": [
                {"type": "walk_to", "tick": 20, "target_position": [110, 64, 100]},
                {"type": "morph", "tick": 200, "morph_to": "titan"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(actor.actions.len(), 2);
        assert_eq!(actor.actions[0].kind(), "walk_to");
        match &actor.actions[1] {
            Tagged::Unknown(raw) => {
                assert_eq!(raw.kind, "morph");
                assert_eq!(raw.tick(), 200);
            }
            other => panic!("expected unknown action, got {:?}", other),
        }
    }

    #[test]
    fn test_swipe_alias_parses_as_attack() {
        let action: Tagged<ActorAction> =
            serde_json::from_str(r#"{"type": "swipe", "tick": 5}"#).unwrap();
        assert_eq!(action.known(), Some(&ActorAction::Attack { tick: 5 }));
    }

    #[test]
    fn test_malformed_known_action_is_flagged() {
        let action: Tagged<ActorAction> =
            serde_json::from_str(r#"{"type": "walk_to", "tick": 5}"#).unwrap();
        assert_eq!(action.malformed(), Some("walk_to"));
    }

    #[test]
    fn test_look_target_forms() {
        let by_pos: LookTarget = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(by_pos, LookTarget::Position(Position::new(1.0, 2.0, 3.0)));
        let by_actor: LookTarget = serde_json::from_str(r#""actor_002""#).unwrap();
        assert_eq!(by_actor, LookTarget::Actor("actor_002".into()));
    }

    #[test]
    fn test_storm_is_thunder() {
        let weather: Weather = serde_json::from_str(r#""storm""#).unwrap();
        assert_eq!(weather, Weather::Thunder);
    }
}
