use anyhow::Context;
use clap::Parser;
use souschef::config::LlmConfig;
use souschef::interaction::{ConsoleInteraction, Interaction};
use souschef::llm::AzureOpenAiClient;
use souschef::recipe::{self, StepStore};
use souschef::session::{self, SessionController};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Walk through a recipe step by step, with timers and an assistant
#[derive(Parser)]
#[command(name = "souschef")]
#[command(about = "Interactive cooking assistant", long_about = None)]
struct Cli {
    /// Path to a recipe text file; reads stdin to EOF when omitted
    recipe: Option<PathBuf>,

    /// Resolve timers instantly instead of counting down in real time
    #[arg(long)]
    simulate: bool,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .init();

    debug!("souschef started with verbosity level: {}", cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let recipe_from_stdin = cli.recipe.is_none();
    let raw = match &cli.recipe {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read recipe file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read recipe from stdin")?;
            buffer
        }
    };

    let steps = recipe::parse(&raw);
    if steps.is_empty() {
        return Err(souschef::error::Error::Parse.into());
    }
    debug!("parsed {} steps", steps.len());

    let config = LlmConfig::from_env().context("LLM backend is not configured")?;
    let llm = Arc::new(AzureOpenAiClient::new(config)?);

    let mut controller = SessionController::new(
        StepStore::new(steps),
        llm,
        ConsoleInteraction::new(),
        cli.simulate,
    );
    if recipe_from_stdin {
        // The recipe consumed stdin, so commands have to come from the
        // controlling terminal instead.
        match std::fs::File::open("/dev/tty") {
            Ok(tty) => {
                session::spawn_command_reader(tty, controller.event_sender());
            }
            Err(err) => {
                debug!("could not open /dev/tty for commands: {err}");
                ConsoleInteraction::new()
                    .notice("No terminal available for commands; showing the recipe and exiting.");
                let _ = controller
                    .event_sender()
                    .send(session::SessionEvent::InputClosed);
            }
        }
    } else {
        session::spawn_command_reader(std::io::stdin(), controller.event_sender());
    }
    controller.run().await?;
    Ok(())
}
