//! In-game listener
//!
//! Tails the server log for `<player> !agent <story>` chat lines and plays
//! each story on the server: parse, generate, then remote export over RCON.

use bbs_agent::agent::ingame::{
    parse_chat_line, player_position, say, with_position, ChatRequest,
};
use bbs_agent::agent::Agent;
use bbs_agent::core::config::AgentConfig;
use bbs_agent::core::error::Result;
use bbs_agent::export::{CommandSink, ExportTarget, RconSink};
use bbs_agent::llm::{IntentParser, LlmClient, LlmIntentParser};

use clap::Parser;
use std::io::SeekFrom;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Listen for `!agent` requests in the game chat
#[derive(Parser, Debug)]
#[command(name = "bbs-listener")]
#[command(about = "Run stories typed into the Minecraft chat")]
struct Args {
    /// Server log to follow
    #[arg(long, default_value = "logs/latest.log")]
    log: PathBuf,

    /// TOML config file (defaults to bbs_agent.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// How often to check the log for new lines, in milliseconds
    #[arg(long, default_value_t = 500)]
    poll_millis: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bbs_agent=info")),
        )
        .init();

    let args = Args::parse();
    let config = AgentConfig::load(args.config.as_deref())?;

    let rt = Runtime::new()?;
    rt.block_on(listen(args, config))
}

async fn listen(args: Args, config: AgentConfig) -> Result<()> {
    let parser = LlmIntentParser::new(LlmClient::new(&config.llm)?);
    let mut agent = Agent::new(parser, RconSink::new(config.rcon.clone()), &config);
    agent.sink_mut().execute(&say("Online and listening for !agent")).await?;

    let mut file = File::open(&args.log).await?;
    let mut offset = file.seek(SeekFrom::End(0)).await?;
    let mut reader = BufReader::new(file);
    tracing::info!(log = %args.log.display(), "listening for !agent requests");

    let poll = Duration::from_millis(args.poll_millis);
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line).await?;
        if read == 0 || !line.ends_with('\n') {
            // Keep a partial line for the next poll
            if read > 0 {
                reader.seek(SeekFrom::Start(offset)).await?;
            }
            tokio::time::sleep(poll).await;

            // The server starts a new latest.log on restart
            let len = tokio::fs::metadata(&args.log).await?.len();
            if len < offset {
                tracing::info!("log rotated, reopening");
                reader = BufReader::new(File::open(&args.log).await?);
                offset = 0;
            }
            continue;
        }
        offset += read as u64;

        if let Some(request) = parse_chat_line(&line) {
            handle_request(&mut agent, request).await;
        }
    }
}

async fn handle_request<P: IntentParser>(
    agent: &mut Agent<P, RconSink>,
    request: ChatRequest,
) {
    tracing::info!(player = %request.player, request = %request.request, "agent request");
    if let Err(e) = agent
        .sink_mut()
        .execute(&say(&format!("Processing: {}", request.request)))
        .await
    {
        tracing::warn!(error = %e, "could not acknowledge request");
    }

    let message = match play(agent, &request).await {
        Ok(sent) => format!("Done. Executed {} commands.", sent),
        Err(e) => {
            tracing::warn!(error = %e, "request failed");
            format!("Error: {}", e)
        }
    };
    if let Err(e) = agent.sink_mut().execute(&say(&message)).await {
        tracing::warn!(error = %e, "could not report back to the server");
    }
}

async fn play<P: IntentParser>(
    agent: &mut Agent<P, RconSink>,
    request: &ChatRequest,
) -> Result<usize> {
    let position = match player_position(agent.sink_mut(), &request.player).await {
        Ok(position) => position,
        Err(e) => {
            tracing::warn!(error = %e, "could not read player position");
            None
        }
    };

    let scenes = agent
        .story(&with_position(&request.request, position))
        .await?
        .scenes()
        .len();
    agent
        .sink_mut()
        .execute(&say(&format!("Generated {} scene(s). Executing...", scenes)))
        .await?;
    agent.generate()?;
    let report = agent.export(Some(ExportTarget::Remote)).await?;
    Ok(report.commands_sent)
}
