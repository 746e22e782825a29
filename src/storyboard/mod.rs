//! Structured storyboard model
//!
//! Scenes, actors and cameras derived from user text, plus the session that
//! holds the current plan:
//! PlanUpdate -> StoryboardSession (apply_full / apply_delta) -> renderer

pub mod camera;
pub mod plan;
pub mod scene;
pub mod session;
pub mod tagged;

pub use camera::{CameraMovement, CameraSpec};
pub use plan::{PlanDelta, PlanUpdate, ScenePlan};
pub use scene::{ActorAction, ActorRef, Effect, LookTarget, Scene, Setting, TimeOfDay, Weather};
pub use session::{SessionStatus, StoryboardSession};
pub use tagged::{Tagged, TaggedKind, UnknownTag};
