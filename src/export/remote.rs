//! Streaming rendered commands to a live server

use std::time::Duration;

use crate::core::error::{BbsError, Result};
use crate::core::types::Tick;
use crate::render::RenderedScript;

/// Something that executes one command and returns the server's reply
///
/// Production code uses [`crate::export::RconSink`]; tests use an in-memory
/// sink.
#[allow(async_fn_in_trait)]
pub trait CommandSink {
    async fn execute(&mut self, command: &str) -> Result<String>;

    /// Greet the server to prove it is reachable, returning its reply
    async fn check(&mut self) -> Result<String> {
        self.execute("say BBS Agent connected!").await
    }
}

/// Replies Minecraft sends instead of executing a command
const REJECTION_MARKERS: &[&str] = &[
    "Unknown or incomplete command",
    "Incorrect argument for command",
    "Unknown function",
    "Unknown entity",
    "No entity was found",
    "No player was found",
    "Expected whitespace",
    "Invalid or unknown",
    "<--[HERE]",
];

/// Whether a reply means the command was rejected
pub fn is_rejection(response: &str) -> bool {
    REJECTION_MARKERS.iter().any(|m| response.contains(m))
}

/// Send every command in rendered order, stopping at the first rejection
///
/// With `tick` set, waits between commands so each lands on its absolute
/// tick (block start + command tick). Returns the number of commands sent.
pub async fn send_script<S: CommandSink>(
    script: &RenderedScript,
    sink: &mut S,
    tick: Option<Duration>,
) -> Result<usize> {
    let mut sent = 0;
    let mut clock: Tick = 0;

    for block in &script.blocks {
        tracing::info!(
            scene = %block.scene_id,
            commands = block.commands.len(),
            "sending scene"
        );
        for cmd in &block.commands {
            let at = block.start_tick.saturating_add(cmd.tick);
            if let Some(tick) = tick {
                if at > clock {
                    let ticks = u32::try_from(at - clock).unwrap_or(u32::MAX);
                    tokio::time::sleep(tick.saturating_mul(ticks)).await;
                    clock = at;
                }
            }

            let failure = |reason: String| BbsError::RemoteExecution {
                succeeded: sent,
                command: cmd.command.clone(),
                reason,
            };
            let response = sink
                .execute(&cmd.command)
                .await
                .map_err(|e| failure(e.to_string()))?;
            if is_rejection(&response) {
                tracing::warn!(command = %cmd.command, response = %response, "command rejected");
                return Err(failure(response));
            }
            sent += 1;
        }
    }
    Ok(sent)
}
