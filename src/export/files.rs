//! Datapack and flat mcfunction layouts
//!
//! Every file is built in memory first and only then written, so a failure
//! while building leaves the output directory untouched.
//!
//! A scene function runs its tick-0 commands directly. Commands at later
//! scene ticks go to `<scene>/t<tick>` sub-functions that the scene function
//! schedules, so keyframes and actions keep their timing in file exports.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::ExportConfig;
use crate::core::error::Result;
use crate::core::types::Tick;
use crate::render::{RenderedCommand, RenderedScript, SceneBlock};

/// A file to be written, relative paths already resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Serialize)]
struct PackMeta<'a> {
    pack: PackInfo<'a>,
}

#[derive(Serialize)]
struct PackInfo<'a> {
    pack_format: u32,
    description: &'a str,
}

fn push_commands<'a>(
    s: &mut String,
    commands: impl IntoIterator<Item = &'a RenderedCommand>,
) {
    for cmd in commands {
        if !cmd.description.is_empty() {
            s.push_str(&format!("# Tick {}: {}\n", cmd.tick, cmd.description));
        }
        s.push_str(&cmd.command);
        s.push('\n');
    }
}

/// Commands of a block grouped by scene tick, in rendered order within a tick
fn by_tick(block: &SceneBlock) -> BTreeMap<Tick, Vec<&RenderedCommand>> {
    let mut ticks: BTreeMap<Tick, Vec<&RenderedCommand>> = BTreeMap::new();
    for cmd in &block.commands {
        ticks.entry(cmd.tick).or_default().push(cmd);
    }
    ticks
}

/// Name of the sub-function holding a block's commands at `tick`
fn tick_function_name(block: &SceneBlock, tick: Tick) -> String {
    format!("{}/t{}", block.function_name, tick)
}

/// Body of one scene function
pub fn scene_function(block: &SceneBlock, namespace: &str) -> String {
    let mut s = format!(
        "# Scene: {}\n# Duration: {} ticks\n\n",
        block.name, block.duration
    );
    for (tick, commands) in by_tick(block) {
        if tick == 0 {
            push_commands(&mut s, commands);
        } else {
            s.push_str(&format!(
                "schedule function {}:{} {}t append\n",
                namespace,
                tick_function_name(block, tick),
                tick
            ));
        }
    }
    s
}

/// Body of the sub-function for one later tick of a scene
fn tick_function(block: &SceneBlock, tick: Tick, commands: Vec<&RenderedCommand>) -> String {
    let mut s = format!("# Scene: {}, tick {}\n\n", block.name, tick);
    push_commands(&mut s, commands);
    s
}

/// Body of the entry-point function that sequences the scene functions
///
/// `schedule` rejects a zero delay, so blocks at tick 0 are called directly.
pub fn main_function(script: &RenderedScript, namespace: &str) -> String {
    let mut s = format!(
        "# {}\n# Storyboard version {}, {} ticks\n\n",
        script.title,
        script.session_version,
        script.total_duration()
    );
    for block in &script.blocks {
        if block.start_tick == 0 {
            s.push_str(&format!("function {}:{}\n", namespace, block.function_name));
        } else {
            s.push_str(&format!(
                "schedule function {}:{} {}t append\n",
                namespace, block.function_name, block.start_tick
            ));
        }
    }
    s
}

fn function_files(script: &RenderedScript, namespace: &str, dir: &Path) -> Vec<PlannedFile> {
    let mut files = Vec::new();
    for block in &script.blocks {
        files.push(PlannedFile {
            path: dir.join(format!("{}.mcfunction", block.function_name)),
            contents: scene_function(block, namespace),
        });
        for (tick, commands) in by_tick(block).into_iter().filter(|(t, _)| *t > 0) {
            files.push(PlannedFile {
                path: dir
                    .join(&block.function_name)
                    .join(format!("t{}.mcfunction", tick)),
                contents: tick_function(block, tick, commands),
            });
        }
    }
    files.push(PlannedFile {
        path: dir.join("main.mcfunction"),
        contents: main_function(script, namespace),
    });
    files
}

/// `<out>/mcfunctions/*.mcfunction`
pub fn mcfunction_layout(script: &RenderedScript, config: &ExportConfig) -> Vec<PlannedFile> {
    let dir = config.output_dir.join("mcfunctions");
    function_files(script, &config.namespace, &dir)
}

/// `<out>/<ns>/pack.mcmeta` and `<out>/<ns>/data/<ns>/functions/*.mcfunction`
pub fn datapack_layout(
    script: &RenderedScript,
    config: &ExportConfig,
) -> Result<Vec<PlannedFile>> {
    let ns = &config.namespace;
    let root = config.output_dir.join(ns);
    let meta = PackMeta {
        pack: PackInfo {
            pack_format: config.pack_format,
            description: &config.description,
        },
    };

    let mut files = vec![PlannedFile {
        path: root.join("pack.mcmeta"),
        contents: serde_json::to_string_pretty(&meta)?,
    }];
    let functions = root.join("data").join(ns).join("functions");
    files.extend(function_files(script, ns, &functions));
    Ok(files)
}

/// Write planned files, creating parent directories as needed
pub fn write_all(files: &[PlannedFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        if let Some(parent) = file.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file.path, &file.contents)?;
        tracing::debug!(path = %file.path.display(), "wrote file");
        written.push(file.path.clone());
    }
    Ok(written)
}
