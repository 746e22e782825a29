//! Render and export integration tests

mod common;

use std::fs;

use bbs_agent::core::config::ExportConfig;
use bbs_agent::core::error::BbsError;
use bbs_agent::export::{ExportTarget, Exporter};
use bbs_agent::render::CommandRenderer;
use bbs_agent::storyboard::{ScenePlan, StoryboardSession, Tagged, UnknownTag};
use common::simple_scene;

fn two_scene_session() -> StoryboardSession {
    // declared out of order; blocks follow start offsets
    StoryboardSession::from_plan(
        ScenePlan::new(vec![simple_scene("scene_b", 100, 100), simple_scene("scene_a", 0, 100)])
            .titled("Meadow"),
    )
    .unwrap()
}

fn exporter(dir: &std::path::Path) -> Exporter {
    Exporter::new(ExportConfig {
        output_dir: dir.to_path_buf(),
        namespace: "meadow".into(),
        ..ExportConfig::default()
    })
}

#[test]
fn test_two_scenes_render_two_blocks() {
    let script = CommandRenderer::default().render(&two_scene_session()).unwrap();
    assert_eq!(script.title, "Meadow");
    assert_eq!(script.blocks.len(), 2);
    assert_eq!(script.blocks[0].function_name, "scene_a");
    assert_eq!(script.blocks[1].start_tick, 100);
    assert_eq!(script.total_duration(), 200);

    // summon first, then the camera
    let first = &script.blocks[0].commands;
    assert!(first[0].command.starts_with("summon minecraft:cow"));
    assert!(first.iter().any(|c| c.command.starts_with("tp @p")));
}

#[test]
fn test_mcfunction_export_layout() {
    let dir = tempfile::tempdir().unwrap();
    let script = CommandRenderer::default().render(&two_scene_session()).unwrap();
    let report = exporter(dir.path())
        .export_files(&script, ExportTarget::Mcfunction)
        .unwrap();
    assert_eq!(report.files.len(), 3);

    let functions = dir.path().join("mcfunctions");
    let scene_a = fs::read_to_string(functions.join("scene_a.mcfunction")).unwrap();
    assert!(scene_a.starts_with("# Scene: Scene scene_a\n# Duration: 100 ticks\n"));
    assert!(scene_a.contains("summon minecraft:cow"));

    let main = fs::read_to_string(functions.join("main.mcfunction")).unwrap();
    let calls: Vec<&str> = main.lines().filter(|l| !l.starts_with('#') && !l.is_empty()).collect();
    assert_eq!(
        calls,
        vec![
            "function meadow:scene_a",
            "schedule function meadow:scene_b 100t append"
        ]
    );
}

#[test]
fn test_datapack_export_layout() {
    let dir = tempfile::tempdir().unwrap();
    let script = CommandRenderer::default().render(&two_scene_session()).unwrap();
    exporter(dir.path())
        .export_files(&script, ExportTarget::Datapack)
        .unwrap();

    let root = dir.path().join("meadow");
    let meta: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("pack.mcmeta")).unwrap()).unwrap();
    assert_eq!(meta["pack"]["pack_format"], 15);

    let functions = root.join("data").join("meadow").join("functions");
    for name in ["scene_a", "scene_b", "main"] {
        assert!(functions.join(format!("{}.mcfunction", name)).is_file());
    }
}

#[test]
fn test_unsupported_feature_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut broken = simple_scene("scene_c", 200, 50);
    broken.camera.movements.push(Tagged::Unknown(UnknownTag {
        kind: "shake".into(),
        fields: Default::default(),
    }));
    let session = StoryboardSession::from_plan(ScenePlan::new(vec![
        simple_scene("scene_a", 0, 100),
        broken,
    ]))
    .unwrap();

    let result = CommandRenderer::default()
        .render(&session)
        .and_then(|script| exporter(dir.path()).export_files(&script, ExportTarget::Mcfunction));
    assert!(matches!(result, Err(BbsError::UnsupportedFeature { .. })));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_reexport_overwrites_files() {
    let dir = tempfile::tempdir().unwrap();
    let script = CommandRenderer::default().render(&two_scene_session()).unwrap();
    let exporter = exporter(dir.path());
    let first = exporter
        .export_files(&script, ExportTarget::Mcfunction)
        .unwrap();
    let second = exporter
        .export_files(&script, ExportTarget::Mcfunction)
        .unwrap();
    assert_eq!(first.files, second.files);
    let main = fs::read_to_string(dir.path().join("mcfunctions/main.mcfunction")).unwrap();
    assert_eq!(main.matches("function meadow:scene_a").count(), 1);
}
