//! Plans produced by the intent parser and applied to a session

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::error::{BbsError, Result};
use crate::core::types::{SceneId, Tick, MAX_TICK};
use crate::storyboard::scene::Scene;

/// A complete storyboard, used for fresh stories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenePlan {
    #[serde(default)]
    pub title: Option<String>,
    pub scenes: Vec<Scene>,
}

impl ScenePlan {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self {
            title: None,
            scenes,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.scenes.is_empty() {
            return Err(BbsError::ParseError("plan contains no scenes".into()));
        }
        validate_scenes(&self.scenes)
    }
}

/// Targeted edits to an existing storyboard, used for refinements
///
/// Scenes in `upsert` replace the scene with the same id in place, or are
/// appended if the id is new. Ids in `remove` are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDelta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub upsert: Vec<Scene>,
    #[serde(default)]
    pub remove: Vec<SceneId>,
}

impl PlanDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(mut self, scene: Scene) -> Self {
        self.upsert.push(scene);
        self
    }

    pub fn remove(mut self, id: impl Into<String>) -> Self {
        self.remove.push(SceneId::new(id));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.upsert.is_empty() && self.remove.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(BbsError::ParseError("refinement contains no changes".into()));
        }
        validate_scenes(&self.upsert)?;
        if let Some(id) = self.upsert.iter().map(|s| &s.id).find(|id| self.remove.contains(id)) {
            return Err(BbsError::ParseError(format!(
                "scene {} is both updated and removed",
                id
            )));
        }
        Ok(())
    }
}

/// What the parser hands back to the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanUpdate {
    Full(ScenePlan),
    Delta(PlanDelta),
}

impl PlanUpdate {
    pub fn validate(&self) -> Result<()> {
        match self {
            PlanUpdate::Full(plan) => plan.validate(),
            PlanUpdate::Delta(delta) => delta.validate(),
        }
    }
}

/// Check the structural invariants a list of scenes must hold before it may
/// touch a session: non-empty unique scene ids, unique actor ids per scene,
/// timing within [`MAX_TICK`], and no malformed elements of a known type.
pub fn validate_scenes(scenes: &[Scene]) -> Result<()> {
    let mut seen = HashSet::new();
    for scene in scenes {
        if scene.id.as_str().trim().is_empty() {
            return Err(BbsError::ParseError("scene with empty id".into()));
        }
        if !seen.insert(&scene.id) {
            return Err(BbsError::ParseError(format!(
                "duplicate scene id {}",
                scene.id
            )));
        }

        let mut actor_ids = HashSet::new();
        for actor in &scene.actors {
            if !actor_ids.insert(actor.id.as_str()) {
                return Err(BbsError::ParseError(format!(
                    "duplicate actor id {} in scene {}",
                    actor.id, scene.id
                )));
            }
            if let Some(kind) = actor.actions.iter().find_map(|a| a.malformed()) {
                return Err(malformed(&scene.id, "actor action", kind));
            }
        }
        if let Some(kind) = scene.camera.movements.iter().find_map(|m| m.malformed()) {
            return Err(malformed(&scene.id, "camera movement", kind));
        }
        if let Some(kind) = scene.effects.iter().find_map(|e| e.malformed()) {
            return Err(malformed(&scene.id, "effect", kind));
        }
        check_timing(scene)?;
    }
    Ok(())
}

/// Every tick in the scene, scene end included, must stay within `MAX_TICK`
fn check_timing(scene: &Scene) -> Result<()> {
    let end = scene.start_offset.checked_add(scene.duration);
    let actions = scene
        .actors
        .iter()
        .flat_map(|a| a.actions.iter().filter_map(|t| t.known()))
        .map(|a| a.tick());
    let cameras = scene
        .camera
        .movements
        .iter()
        .filter_map(|m| m.known())
        .flat_map(|m| [m.tick_start(), m.tick_end()]);
    let effects = scene.effects.iter().filter_map(|e| e.known()).map(|e| e.tick());
    let latest: Option<Tick> = actions.chain(cameras).chain(effects).max();

    match end {
        Some(end) if end <= MAX_TICK && latest.map_or(true, |t| t <= MAX_TICK) => Ok(()),
        _ => Err(BbsError::ParseError(format!(
            "scene {} has timing beyond tick {}",
            scene.id, MAX_TICK
        ))),
    }
}

fn malformed(scene_id: &SceneId, what: &str, kind: &str) -> BbsError {
    BbsError::ParseError(format!(
        "malformed {} `{}` in scene {}",
        what, kind, scene_id
    ))
}
