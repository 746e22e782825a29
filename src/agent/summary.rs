//! Human-readable storyboard summary


use crate::core::types::ticks_to_seconds;
use crate::storyboard::StoryboardSession;

pub fn summarize(session: &StoryboardSession) -> String {
    if session.is_empty() {
        return "No storyboard yet. Describe an animation to start.".to_string();
    }

    let mut s = String::new();
    let total = session.total_duration();
    s.push_str(&format!("{}\n", session.title()));
    s.push_str(&format!(
        "Total duration: {:.1} seconds ({} ticks)\n",
        ticks_to_seconds(total),
        total
    ));
    s.push_str(&format!("Scenes: {}\n", session.scenes().len()));
    s.push_str(&format!(
        "Status: {} (version {})\n",
        session.status(),
        session.version()
    ));

    for (i, scene) in session.scenes().iter().enumerate() {
        s.push('\n');
        s.push_str(&format!(
            "Scene {}: {} [{}]\n",
            i + 1,
            scene.display_name(),
            scene.id
        ));
        if let Some(location) = &scene.setting.location {
            s.push_str(&format!("  Location: {}\n", location));
        }
        s.push_str(&format!(
            "  Starts at {:.1}s, lasts {:.1}s\n",
            ticks_to_seconds(scene.start_offset),
            ticks_to_seconds(scene.duration)
        ));
        let names: Vec<&str> = scene.actors.iter().map(|a| a.name.as_str()).collect();
        if names.is_empty() {
            s.push_str("  Actors: none\n");
        } else {
            s.push_str(&format!(
                "  Actors: {} ({})\n",
                names.len(),
                names.join(", ")
            ));
        }
        let kinds = scene.camera.kinds();
        if kinds.is_empty() {
            s.push_str("  Camera: none\n");
        } else {
            s.push_str(&format!("  Camera: {}\n", kinds.join(", ")));
        }
        if !scene.effects.is_empty() {
            s.push_str(&format!("  Effects: {}\n", scene.effects.len()));
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Position;
    use crate::storyboard::{ActorRef, CameraMovement, CameraSpec, Scene, ScenePlan};

    #[test]
    fn test_empty_summary() {
        assert!(summarize(&StoryboardSession::new()).starts_with("No storyboard yet"));
    }

    #[test]
    fn test_summary_lists_scenes() {
        let mut scene = Scene::new("scene_001", 0, 100);
        scene.name = "Dawn".into();
        scene.setting.location = Some("Village".into());
        scene.actors.push(ActorRef::new("a1", "farmer_1"));
        scene.camera = CameraSpec::new().with(CameraMovement::Static {
            tick_start: 0,
            tick_end: 0,
            position: Position::new(0.0, 70.0, 0.0),
            facing: None,
            look_at: None,
        });
        let session =
            StoryboardSession::from_plan(ScenePlan::new(vec![scene]).titled("Titan Garden"))
                .unwrap();

        let text = summarize(&session);
        assert!(text.starts_with("Titan Garden\n"));
        assert!(text.contains("Total duration: 5.0 seconds (100 ticks)"));
        assert!(text.contains("Status: DRAFT (version 1)"));
        assert!(text.contains("Scene 1: Dawn [scene_001]"));
        assert!(text.contains("  Location: Village"));
        assert!(text.contains("  Actors: 1 (farmer_1)"));
        assert!(text.contains("  Camera: static"));
    }
}
