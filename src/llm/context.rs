//! Build the user message sent alongside the system prompt
//!
//! Fresh stories only carry the user's text. Refinements also carry the
//! current storyboard serialized as JSON, so the model can keep scene ids
//! stable and answer with a delta.

use crate::core::error::Result;
use crate::storyboard::StoryboardSession;

/// What the parser knows about the storyboard when it is called
pub struct StoryContext<'a> {
    existing: Option<&'a StoryboardSession>,
}

impl<'a> StoryContext<'a> {
    pub fn new(existing: Option<&'a StoryboardSession>) -> Self {
        Self { existing }
    }

    pub fn is_refinement(&self) -> bool {
        self.existing.is_some()
    }

    /// Short listing of the existing scenes, in storyboard order
    pub fn scene_index(&self) -> String {
        let Some(session) = self.existing else {
            return String::new();
        };
        let mut s = String::new();
        for scene in session.scenes() {
            s.push_str(&format!(
                "- {} \"{}\" (start tick {}, {} ticks)\n",
                scene.id,
                scene.display_name(),
                scene.start_offset,
                scene.duration
            ));
        }
        s
    }

    /// The full user message for this request
    pub fn user_prompt(&self, text: &str) -> Result<String> {
        match self.existing {
            None => Ok(format!(
                "Create a detailed storyboard for this Minecraft animation:\n\n{}",
                text
            )),
            Some(session) => {
                let plan_json = serde_json::to_string_pretty(&session.to_plan())?;
                Ok(format!(
                    "CURRENT STORYBOARD (version {}):\n{}\n\nSCENES:\n{}\nREFINEMENT REQUEST:\n{}\n\nAnswer with a delta JSON object only.",
                    session.version(),
                    plan_json,
                    self.scene_index(),
                    text
                ))
            }
        }
    }
}
