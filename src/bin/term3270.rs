//! term3270 command line client
//!
//! `replay` rebuilds the display state from a JSONL message trace and prints
//! the final snapshot. `connect` attaches to a session host, prints the
//! screen after every message and sends typed stdin lines as keystrokes.

use std::error::Error;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use term3270::app::{self, Config};
use term3270::connection::{Driver, Lifecycle, TraceLog, UserInput};
use term3270::input;
use term3270::protocol::Indication;
use term3270::render::{NullSink, RenderSink};
use term3270::session::{ProcessError, Session};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "term3270")]
#[command(version)]
#[command(about = "Display-session client for a 3270 session host", long_about = None)]
struct Cli {
    /// Path to custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSONL message trace and print the resulting screen
    Replay {
        /// Trace file, one message per line
        file: PathBuf,
        /// Print the snapshot as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Connect to a session host
    Connect {
        /// Host address, overriding the config
        addr: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::load_or_default(),
    };

    // Initialize logging
    let default_filter = config.log_filter.clone().unwrap_or_else(|| "warn".to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    tracing::debug!(config_path = ?app::default_path(), "configuration loaded");

    let result = match cli.command {
        Command::Replay { file, json } => replay(&config, &file, json),
        Command::Connect { addr } => connect(config, addr),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn replay(config: &Config, path: &Path, json: bool) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::open(path)?;
    let mut session = config.screen.session();

    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match session.process(&line, &mut NullSink) {
            Ok(()) => {}
            Err(ProcessError::Decode(e)) => tracing::warn!(line = number + 1, error = %e, "skipping message"),
            Err(ProcessError::Dispatch(e)) => tracing::error!(line = number + 1, error = %e, "message rejected"),
        }
    }

    let snapshot = session.snapshot();
    if json {
        println!("{}", snapshot.to_json()?);
    } else {
        print!("{}", snapshot.to_text());
    }
    Ok(())
}

fn connect(config: Config, addr: Option<String>) -> Result<(), Box<dyn Error>> {
    let addr = addr.unwrap_or_else(|| config.host.clone());
    let lifecycle = Lifecycle::new(config.screen.session(), ConsoleSink, config.reconnect.backoff());
    let mut driver = Driver::new(addr, lifecycle).with_observer(print_screen);
    if let Some(path) = &config.trace_file {
        driver = driver.with_trace(TraceLog::create(path)?);
    }

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async move {
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(read_stdin(tx));
        driver.run(rx).await
    })?;
    Ok(())
}

/// Turn stdin lines into key presses; closing stdin ends the session
async fn read_stdin(tx: mpsc::Sender<UserInput>) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                return;
            }
        };
        for press in input::type_line(&line) {
            if tx.send(UserInput::Key(press)).await.is_err() {
                return;
            }
        }
    }
}

fn print_screen(session: &Session) {
    print!("{}", session.snapshot().to_text());
    println!("---");
}

/// Reports messages meant for the user on stderr
struct ConsoleSink;

impl RenderSink for ConsoleSink {
    fn attach(&mut self) {
        eprintln!("[connected]");
    }

    fn detach(&mut self) {
        eprintln!("[disconnected]");
    }

    fn passthrough(&mut self, indication: &Indication) {
        match indication {
            Indication::Popup(popup) => eprintln!("[{:?}] {}", popup.type_, popup.text),
            Indication::UiError(err) => eprintln!("[ui-error] {}", err.text),
            Indication::Bell {} => eprint!("\x07"),
            other => tracing::debug!(tag = other.tag(), "indication not shown"),
        }
    }
}
