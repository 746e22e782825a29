//! Deterministic storyboard -> command rendering
//!
//! Rendering is a pure function of the session and the render config: the
//! same storyboard always yields byte-identical commands. No LLM is involved.
//!
//! Within a scene block, commands come out in this order:
//! setting, actor placements, actor actions (by tick), camera keyframes
//! (movements by start tick), effects (by tick). Ties keep declaration order.

use crate::core::config::RenderConfig;
use crate::core::error::{BbsError, Result};
use crate::core::types::{SceneId, Tick};
use crate::render::actor::{self, ActorRegistry};
use crate::render::camera;
use crate::render::script::{FunctionNames, RenderedCommand, RenderedScript, SceneBlock};
use crate::render::world;
use crate::storyboard::{Scene, StoryboardSession, Tagged, TaggedKind};

/// Turns storyboards into scene blocks of target commands
#[derive(Debug, Clone, Default)]
pub struct CommandRenderer {
    config: RenderConfig,
}

impl CommandRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render every scene of the session
    ///
    /// Blocks are ordered by start offset, then scene id. Any element the
    /// renderer has no translation for fails the whole render with
    /// [`BbsError::UnsupportedFeature`].
    pub fn render(&self, session: &StoryboardSession) -> Result<RenderedScript> {
        let registry = ActorRegistry::from_scenes(session.scenes());

        let mut scenes: Vec<&Scene> = session.scenes().iter().collect();
        scenes.sort_by(|a, b| {
            a.start_offset
                .cmp(&b.start_offset)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut names = FunctionNames::new();
        let mut blocks = Vec::with_capacity(scenes.len());
        for scene in scenes {
            let commands = self.render_scene(scene, &registry)?;
            blocks.push(SceneBlock {
                scene_id: scene.id.clone(),
                name: scene.display_name().to_string(),
                function_name: names.claim(&scene.id),
                start_tick: scene.start_offset,
                duration: scene.duration,
                commands,
            });
        }

        let script = RenderedScript {
            title: session.title().to_string(),
            session_version: session.version(),
            blocks,
        };
        tracing::debug!(
            session = %session.id(),
            version = session.version(),
            blocks = script.blocks.len(),
            commands = script.total_commands(),
            "rendered storyboard"
        );
        Ok(script)
    }

    /// Commands for one scene, ticks relative to the scene start
    pub fn render_scene(
        &self,
        scene: &Scene,
        registry: &ActorRegistry<'_>,
    ) -> Result<Vec<RenderedCommand>> {
        let mut commands = world::setting_commands(&scene.setting);

        commands.extend(scene.actors.iter().filter_map(actor::placement));

        let mut actions = Vec::new();
        for a in &scene.actors {
            for action in &a.actions {
                let action = known(action, &scene.id, "actor action")?;
                actions.push((action.tick(), actor::action_commands(a, action, registry)));
            }
        }
        commands.extend(sorted_by_tick(actions));

        let mut movements = Vec::new();
        for movement in &scene.camera.movements {
            let movement = known(movement, &scene.id, "camera movement")?;
            movements.push((
                movement.tick_start(),
                camera::movement_commands(movement, registry, &self.config),
            ));
        }
        commands.extend(sorted_by_tick(movements));

        let mut effects = Vec::new();
        for effect in &scene.effects {
            let effect = known(effect, &scene.id, "effect")?;
            effects.push((effect.tick(), world::effect_commands(effect)));
        }
        commands.extend(sorted_by_tick(effects));

        Ok(commands)
    }
}

fn known<'a, T: TaggedKind>(
    tagged: &'a Tagged<T>,
    scene_id: &SceneId,
    what: &str,
) -> Result<&'a T> {
    tagged.known().ok_or_else(|| BbsError::UnsupportedFeature {
        scene_id: scene_id.clone(),
        feature: format!("{} `{}`", what, tagged.kind()),
    })
}

/// Stable sort of command groups by their tick, flattened
fn sorted_by_tick(mut groups: Vec<(Tick, Vec<RenderedCommand>)>) -> Vec<RenderedCommand> {
    groups.sort_by_key(|(tick, _)| *tick);
    groups.into_iter().flat_map(|(_, cmds)| cmds).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Position;
    use crate::storyboard::{
        ActorAction, ActorRef, CameraMovement, CameraSpec, Effect, ScenePlan, TimeOfDay,
        UnknownTag,
    };

    fn static_camera(tick: Tick) -> CameraMovement {
        CameraMovement::Static {
            tick_start: tick,
            tick_end: tick,
            position: Position::new(0.0, 70.0, 0.0),
            facing: None,
            look_at: None,
        }
    }

    fn session(scenes: Vec<Scene>) -> StoryboardSession {
        StoryboardSession::from_plan(ScenePlan::new(scenes)).unwrap()
    }

    #[test]
    fn test_block_order_follows_offsets() {
        let s = session(vec![Scene::new("b", 100, 50), Scene::new("a", 0, 100)]);
        let script = CommandRenderer::default().render(&s).unwrap();
        let ids: Vec<&str> = script.blocks.iter().map(|b| b.scene_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(script.blocks[1].start_tick, 100);
    }

    #[test]
    fn test_same_offset_breaks_ties_by_id() {
        let s = session(vec![Scene::new("z", 0, 10), Scene::new("m", 0, 10)]);
        let script = CommandRenderer::default().render(&s).unwrap();
        assert_eq!(script.blocks[0].scene_id.as_str(), "m");
    }

    #[test]
    fn test_placement_precedes_camera() {
        let mut scene = Scene::new("s", 0, 100);
        scene.setting.time_of_day = Some(TimeOfDay::Night);
        scene.camera = CameraSpec::new().with(static_camera(0));
        scene.actors.push(
            ActorRef::new("a1", "cow")
                .at(Position::new(1.0, 64.0, 1.0))
                .with_action(ActorAction::Jump { tick: 0 }),
        );
        scene.effects.push(
            Effect::Sound {
                tick: 0,
                sound: "entity.cow.ambient".into(),
                volume: 1.0,
            }
            .into(),
        );

        let cmds = CommandRenderer::default()
            .render_scene(&scene, &ActorRegistry::from_scenes([&scene]))
            .unwrap();
        let lines: Vec<&str> = cmds.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(lines[0], "time set night");
        assert!(lines[1].starts_with("summon minecraft:cow"));
        assert!(lines[2].contains("Motion"));
        assert!(lines[3].starts_with("tp @p"));
        assert!(lines[4].contains("playsound"));
    }

    #[test]
    fn test_actions_sorted_by_tick_across_actors() {
        let mut scene = Scene::new("s", 0, 100);
        scene
            .actors
            .push(ActorRef::new("a1", "cow").with_action(ActorAction::Jump { tick: 50 }));
        scene
            .actors
            .push(ActorRef::new("a2", "pig").with_action(ActorAction::Sit { tick: 10 }));

        let cmds = CommandRenderer::default()
            .render_scene(&scene, &ActorRegistry::from_scenes([&scene]))
            .unwrap();
        let ticks: Vec<Tick> = cmds.iter().skip(2).map(|c| c.tick).collect();
        assert_eq!(ticks, vec![10, 50]);
    }

    #[test]
    fn test_unknown_camera_names_scene() {
        let mut scene = Scene::new("scene_007", 0, 100);
        scene.camera.movements.push(Tagged::Unknown(UnknownTag {
            kind: "shake".into(),
            fields: Default::default(),
        }));
        let err = CommandRenderer::default()
            .render(&session(vec![Scene::new("ok", 0, 10), scene]))
            .unwrap_err();
        match err {
            BbsError::UnsupportedFeature { scene_id, feature } => {
                assert_eq!(scene_id.as_str(), "scene_007");
                assert_eq!(feature, "camera movement `shake`");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut scene = Scene::new("s", 0, 200);
        scene.camera = CameraSpec::new().with(CameraMovement::Orbit {
            tick_start: 0,
            tick_end: 200,
            center: Position::new(0.0, 64.0, 0.0),
            radius: 12.0,
            start_angle: 0.0,
            end_angle: 270.0,
            height: 6.0,
        });
        let s = session(vec![scene]);
        let renderer = CommandRenderer::default();
        assert_eq!(renderer.render(&s).unwrap(), renderer.render(&s).unwrap());
    }

    #[test]
    fn test_empty_scene_renders_empty_block() {
        let script = CommandRenderer::default()
            .render(&session(vec![Scene::new("quiet", 0, 40)]))
            .unwrap();
        assert_eq!(script.blocks.len(), 1);
        assert!(script.blocks[0].commands.is_empty());
        assert_eq!(script.total_duration(), 40);
    }
}
