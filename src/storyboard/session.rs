//! The mutable storyboard held for one user session

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::core::error::{BbsError, Result};
use crate::core::types::{SceneId, Tick};
use crate::storyboard::plan::{PlanDelta, ScenePlan};
use crate::storyboard::scene::Scene;

/// Lifecycle of a storyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// No story yet
    Empty,
    /// Plan exists, nothing rendered (or the rendering is stale)
    Draft,
    /// Commands rendered from the current plan
    Generated,
    /// Rendered commands have been exported
    Exported,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Empty => "EMPTY",
            SessionStatus::Draft => "DRAFT",
            SessionStatus::Generated => "GENERATED",
            SessionStatus::Exported => "EXPORTED",
        };
        f.write_str(name)
    }
}

/// Scenes plus bookkeeping for one storyboard
///
/// `version` counts plan mutations: every successful `apply_full` or
/// `apply_delta` bumps it by exactly one. Status changes do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryboardSession {
    id: Uuid,
    title: Option<String>,
    scenes: Vec<Scene>,
    version: u64,
    status: SessionStatus,
}

impl Default for StoryboardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryboardSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: None,
            scenes: Vec::new(),
            version: 0,
            status: SessionStatus::Empty,
        }
    }

    /// Start a session directly from a plan, already in DRAFT
    pub fn from_plan(plan: ScenePlan) -> Result<Self> {
        let mut session = Self::new();
        session.apply_full(plan)?;
        session.status = SessionStatus::Draft;
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn scene(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| &s.id == id)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Tick at which the last scene ends
    pub fn total_duration(&self) -> Tick {
        self.scenes.iter().map(Scene::end_tick).max().unwrap_or(0)
    }

    /// The current plan as the parser sees it on refinement
    pub fn to_plan(&self) -> ScenePlan {
        ScenePlan {
            title: self.title.clone(),
            scenes: self.scenes.clone(),
        }
    }

    /// Replace every scene with the plan's scenes
    pub fn apply_full(&mut self, plan: ScenePlan) -> Result<()> {
        plan.validate()?;
        self.title = plan.title.or_else(|| self.title.take());
        self.scenes = plan.scenes;
        self.version += 1;
        Ok(())
    }

    /// Merge targeted edits, keeping unrelated scenes where they are
    pub fn apply_delta(&mut self, delta: PlanDelta) -> Result<()> {
        delta.validate()?;

        let mut scenes = self.scenes.clone();
        for scene in delta.upsert {
            match scenes.iter_mut().find(|s| s.id == scene.id) {
                Some(existing) => *existing = scene,
                None => scenes.push(scene),
            }
        }
        scenes.retain(|s| !delta.remove.contains(&s.id));
        if scenes.is_empty() {
            return Err(BbsError::ParseError(
                "refinement would remove every scene".into(),
            ));
        }

        if let Some(title) = delta.title {
            self.title = Some(title);
        }
        self.scenes = scenes;
        self.version += 1;
        Ok(())
    }

    pub(crate) fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
    }

    /// Discard everything and start over with a fresh session id
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
