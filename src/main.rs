//! BBS Agent - interactive entry point
//!
//! Reads stories and commands from stdin, keeps one storyboard session and
//! drives parsing, rendering and export. With `--story` it runs a single
//! story through generate and export and exits.

use bbs_agent::agent::command::HELP;
use bbs_agent::agent::{Agent, AgentCommand, Reply};
use bbs_agent::core::config::AgentConfig;
use bbs_agent::core::error::Result;
use bbs_agent::export::{ExportTarget, RconSink};
use bbs_agent::llm::{LlmClient, LlmIntentParser};

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// BBS Agent - turn stories into Blockbuster Studio commands
#[derive(Parser, Debug)]
#[command(name = "bbs-agent")]
#[command(about = "Turn natural language stories into Minecraft animation commands")]
struct Args {
    /// TOML config file (defaults to bbs_agent.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for exported files
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Default export target: datapack, mcfunction or remote
    #[arg(long)]
    target: Option<ExportTarget>,

    /// Run one story through generate and export, then exit
    #[arg(long)]
    story: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bbs_agent=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AgentConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.out_dir {
        config.export.output_dir = dir;
    }
    if let Some(target) = args.target {
        config.export.default_target = target;
    }
    config.validate()?;

    tracing::info!("BBS Agent starting...");

    // Create the async runtime for LLM and RCON calls
    let rt = Runtime::new()?;

    let parser = LlmIntentParser::new(LlmClient::new(&config.llm)?);
    let sink = RconSink::new(config.rcon.clone());
    let mut agent = Agent::new(parser, sink, &config);

    if let Some(story) = args.story {
        for command in [
            AgentCommand::Story(story),
            AgentCommand::Generate,
            AgentCommand::Export(None),
        ] {
            if let Reply::Text(text) = rt.block_on(agent.handle(command))? {
                println!("{}\n", text);
            }
        }
        return Ok(());
    }

    println!("\n=== BBS AGENT ===");
    println!("Describe a Minecraft animation and export it as commands.");
    println!("Output: {}", config.export.output_dir.display());
    println!();
    println!("{}", rt.block_on(agent.system_status()));
    println!();
    println!("{}", HELP);
    println!();

    loop {
        print!("[{}] > ", agent.status());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let command = match AgentCommand::parse(&input) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if matches!(command, AgentCommand::Story(_) | AgentCommand::Refine(_)) {
            println!("Thinking...");
        }

        match rt.block_on(agent.handle(command)) {
            Ok(Reply::Quit) => break,
            Ok(Reply::Text(text)) => println!("{}\n", text),
            Err(e) => {
                tracing::warn!(error = %e, status = %agent.status(), "command failed");
                println!("Error: {}", e);
                if e.is_retryable() {
                    println!("(You can try the same command again.)");
                }
                println!();
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
