//! Parse natural language stories into structured scene plans
//!
//! The LLM turns story text into a [`ScenePlan`] (fresh story) or a
//! [`PlanDelta`] (refinement). It never produces commands itself; those come
//! from the deterministic renderer. Parsing has no effect on the session;
//! the orchestrator applies whatever comes back.

use crate::core::error::{BbsError, Result};
use crate::llm::client::LlmClient;
use crate::llm::context::StoryContext;
use crate::storyboard::{PlanDelta, PlanUpdate, ScenePlan, StoryboardSession};

/// Turns user text into a plan update
///
/// `existing` is `None` for fresh stories and the current session for
/// refinements. Implementations must not retry; failures surface as
/// [`BbsError::ParseError`].
#[allow(async_fn_in_trait)]
pub trait IntentParser {
    async fn parse(&self, text: &str, existing: Option<&StoryboardSession>) -> Result<PlanUpdate>;
}

/// Intent parser backed by an LLM API
pub struct LlmIntentParser {
    client: LlmClient,
}

impl LlmIntentParser {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

impl IntentParser for LlmIntentParser {
    async fn parse(&self, text: &str, existing: Option<&StoryboardSession>) -> Result<PlanUpdate> {
        if text.trim().is_empty() {
            return Err(BbsError::ParseError("story text is empty".into()));
        }

        let context = StoryContext::new(existing);
        let system_prompt = if context.is_refinement() {
            format!("{}\n{}", STORYBOARD_SYSTEM_PROMPT, REFINE_RULES)
        } else {
            STORYBOARD_SYSTEM_PROMPT.to_string()
        };
        let user_prompt = context.user_prompt(text)?;

        tracing::info!(
            refinement = context.is_refinement(),
            chars = text.len(),
            model = self.client.model(),
            "parsing story text"
        );
        let response = self.client.complete(&system_prompt, &user_prompt).await?;
        decode_update(&response, context.is_refinement())
    }
}

/// Decode an LLM response into a validated plan update
///
/// A response with a `scenes` array is a full plan; otherwise, for
/// refinements only, it is read as a delta.
pub fn decode_update(response: &str, refinement: bool) -> Result<PlanUpdate> {
    let json_str = extract_json(response)?;
    let value: serde_json::Value = serde_json::from_str(json_str).map_err(|e| {
        BbsError::ParseError(format!("Invalid JSON: {} - Response: {}", e, response))
    })?;

    let update = if value.get("scenes").is_some() {
        let plan: ScenePlan = serde_json::from_value(value)
            .map_err(|e| BbsError::ParseError(format!("Failed to parse storyboard: {}", e)))?;
        PlanUpdate::Full(plan)
    } else if refinement {
        let delta: PlanDelta = serde_json::from_value(value)
            .map_err(|e| BbsError::ParseError(format!("Failed to parse refinement: {}", e)))?;
        PlanUpdate::Delta(delta)
    } else {
        return Err(BbsError::ParseError(
            "response has no `scenes` array".into(),
        ));
    };

    update.validate()?;
    Ok(update)
}

/// Extract JSON object from LLM response (handles surrounding text and fences)
fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| BbsError::ParseError("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| BbsError::ParseError("No closing brace found in response".into()))?;
    if end < start {
        return Err(BbsError::ParseError("No JSON object found in response".into()));
    }
    Ok(&response[start..=end])
}

/// System prompt for storyboard generation
const STORYBOARD_SYSTEM_PROMPT: &str = r#"You are a Minecraft machinima director.
Convert natural language story scripts into storyboard JSON used to automate
Blockbuster Studio in Minecraft. All timing is in game ticks (20 ticks = 1 second).

OUTPUT FORMAT (JSON only, no explanation):
{
  "title": "Video title",
  "scenes": [
    {
      "id": "scene_001",
      "name": "Scene Name",
      "description": "What happens in this scene",
      "start_offset": 0,
      "duration": 600,
      "setting": {
        "location": "Village center",
        "time_of_day": "day|noon|sunset|night|midnight|sunrise",
        "weather": "clear|rain|thunder",
        "world_modifications": ["Village"]
      },
      "actors": [
        {
          "id": "actor_001",
          "name": "farmer_1",
          "type": "villager",
          "position": [100, 64, 100],
          "spawn": true,
          "actions": [
            {"type": "walk_to", "tick": 20, "target_position": [110, 64, 100]},
            {"type": "look_at", "tick": 60, "target": "actor_002"}
          ]
        }
      ],
      "camera": {
        "movements": [
          {"type": "orbit", "tick_start": 0, "tick_end": 100, "center": [105, 70, 100], "radius": 20, "start_angle": 0, "end_angle": 180, "height": 10},
          {"type": "pan", "tick_start": 100, "tick_end": 200, "start_position": [85, 70, 100], "end_position": [125, 70, 100], "look_at": "actor_001"}
        ]
      },
      "effects": [
        {"type": "particles", "tick": 150, "particle_type": "explosion", "position": [110, 65, 100], "count": 50},
        {"type": "sound", "tick": 150, "sound": "entity.generic.explode", "volume": 1.0}
      ]
    }
  ]
}

ACTION TYPES: walk_to, run_to (target_position), teleport (position), sit, jump,
attack, interact, look_at (target: actor id or [x, y, z]).

CAMERA TYPES: static (position, optional facing [x, y, z] or look_at actor id),
pan (start_position, end_position, optional look_at), orbit (center, radius,
start_angle, end_angle, height), follow (target actor id, distance, height).

EFFECT TYPES: particles (particle_type, position, count), sound (sound, volume).

RULES:
1. CONTINUITY: assume a continuous world. Entities the user refers to as existing
   ("the dragon", "Zoro") get "spawn": false. Only new creatures get "spawn": true.
2. STRUCTURES: buildings (Castle, Village, House, Tower) go in
   setting.world_modifications, never in actors.
3. CREATURES: only living or moving things are actors.
4. Scene ids are unique. start_offset is the absolute tick at which a scene
   starts; scenes normally follow each other (previous start_offset + duration).
5. Only use the action, camera and effect types listed above.

Always output valid JSON."#;

/// Extra instructions when refining an existing storyboard
const REFINE_RULES: &str = r#"
REFINEMENT MODE:
You are given the current storyboard. Answer with a delta instead of a new storyboard:
{
  "title": "optional new title",
  "upsert": [ full scene objects to replace (same id) or add (new id) ],
  "remove": [ "ids of scenes to delete" ]
}
Keep the ids of existing scenes unchanged. Only include scenes that change."#;
