//! Recording plans for a rendered animation
//!
//! A plan only describes timing and the steps to follow while an external
//! recorder runs; nothing here launches a recorder.

use serde::Serialize;
use std::path::PathBuf;

use crate::core::config::RecordingConfig;
use crate::core::types::{ticks_to_seconds, Tick};
use crate::render::RenderedScript;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingSegment {
    pub name: String,
    pub function_name: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub duration_ticks: Tick,
    pub command_count: usize,
    pub output_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingPlan {
    pub title: String,
    pub total_duration_seconds: f64,
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Function that plays the whole animation
    pub entry_function: String,
    pub segments: Vec<RecordingSegment>,
}

impl RecordingPlan {
    pub fn from_script(
        script: &RenderedScript,
        config: &RecordingConfig,
        namespace: &str,
    ) -> Self {
        let segments = script
            .blocks
            .iter()
            .map(|block| RecordingSegment {
                name: block.name.clone(),
                function_name: block.function_name.clone(),
                start_seconds: ticks_to_seconds(block.start_tick),
                duration_seconds: ticks_to_seconds(block.duration),
                duration_ticks: block.duration,
                command_count: block.commands.len(),
                output_file: config
                    .output_dir
                    .join(format!("{}.mp4", block.function_name)),
            })
            .collect();

        Self {
            title: script.title.clone(),
            total_duration_seconds: ticks_to_seconds(script.total_duration()),
            output_dir: config.output_dir.clone(),
            width: config.width,
            height: config.height,
            fps: config.fps,
            entry_function: format!("{}:main", namespace),
            segments,
        }
    }

    /// Step-by-step instructions for recording by hand
    pub fn instructions(&self) -> String {
        let mut s = String::new();
        let rule = "=".repeat(50);
        s.push_str(&format!("{}\nRECORDING PLAN\n{}\n\n", rule, rule));
        s.push_str(&format!("Project: {}\n", self.title));
        s.push_str(&format!(
            "Total duration: {:.1} seconds\n",
            self.total_duration_seconds
        ));
        s.push_str(&format!(
            "Resolution: {}x{} @ {}fps\n",
            self.width, self.height, self.fps
        ));
        s.push_str(&format!("Output directory: {}\n", self.output_dir.display()));
        s.push_str("\nSCENES:\n");
        for (i, seg) in self.segments.iter().enumerate() {
            s.push_str(&format!("\n{}. {}\n", i + 1, seg.name));
            s.push_str(&format!(
                "   Starts at {:.1}s, lasts {:.1}s ({} ticks)\n",
                seg.start_seconds, seg.duration_seconds, seg.duration_ticks
            ));
            s.push_str(&format!("   Commands: {}\n", seg.command_count));
            s.push_str(&format!("   Output: {}\n", seg.output_file.display()));
        }
        s.push_str("\nSTEPS:\n");
        s.push_str("1. Open Minecraft with the BBS mod and load the world\n");
        s.push_str("2. Load the commands: /reload for a datapack, or export to remote\n");
        s.push_str("3. Start the recorder (BBS, OBS or ffmpeg)\n");
        s.push_str(&format!(
            "4. Run /function {} and keep the camera player still\n",
            self.entry_function
        ));
        s.push_str(&format!(
            "5. Stop recording after {:.1} seconds\n",
            self.total_duration_seconds
        ));
        s
    }
}
