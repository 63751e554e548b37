use std::io;
use std::process;

use clap::{Parser, Subcommand};
use rendezvous::{demo, logging, DemoConfig};
use tracing::debug;

#[derive(Parser)]
#[command(name = "rendezvous")]
#[command(about = "Hand values between threads over a rendezvous channel")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send values from a producer task to the main thread (default)
    Handoff {
        /// First value to send
        #[arg(short, long, allow_negative_numbers = true)]
        value: Option<i64>,

        /// Number of values to send before closing
        #[arg(short, long)]
        count: Option<usize>,
    },

    /// Close the channel before anything is sent
    Closed,

    /// Spawn a task and wait for its greeting
    Hello,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Handoff {
        value: None,
        count: None,
    });

    let mut figment = DemoConfig::figment();
    if let Commands::Handoff { value, count } = &command {
        if let Some(value) = value {
            figment = figment.merge(("value", *value));
        }
        if let Some(count) = count {
            figment = figment.merge(("count", *count));
        }
    }
    let config = DemoConfig::extract_from(figment)?;

    logging::init(&config.log_level);
    debug!(?config, "configuration loaded");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Commands::Handoff { .. } => {
            demo::handoff(&config, &mut out)?;
        }
        Commands::Closed => demo::closed(&mut out)?,
        Commands::Hello => demo::hello(&mut out)?,
    }

    Ok(())
}
