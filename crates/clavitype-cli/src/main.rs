//! clavitype - type text by playing a MIDI keyboard.
//!
//! Opens a MIDI input port, feeds note events into the recognition engine
//! and injects the resulting keystrokes at the OS level. Single piano keys
//! type letters; while the hold key (F2 by default) is depressed, two-note
//! intervals fire punctuation and editing keys and triads switch the input
//! mode: major selects letters, minor commands, augmented numbers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clavitype_core::{Config, KeystrokeSink, NullSink, Recognizer};
use crossbeam_channel::{select, tick};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

mod midi;
mod sink;

use midi::MidiSource;
use sink::RdevSink;

#[derive(Parser)]
#[command(name = "clavitype")]
#[command(author, version, about = "Type text by playing a MIDI keyboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (default: ~/.config/clavitype/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// MIDI input port to use (name substring, case-insensitive)
    #[arg(short, long)]
    device: Option<String>,

    /// Velocity threshold override (1-127)
    #[arg(long)]
    threshold: Option<u8>,

    /// Log decisions without injecting any keystrokes
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
    /// List available MIDI input ports
    ListPorts,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            println!("{}", Config::config_path()?.display());
            return Ok(());
        }
        Some(Commands::ListPorts) => {
            let ports = MidiSource::list_ports("clavitype")?;
            if ports.is_empty() {
                println!("No MIDI input ports found");
            } else {
                println!("Available MIDI input ports:");
                for port in ports {
                    println!("  {}: {}", port.index, port.name);
                }
            }
            return Ok(());
        }
        None => {}
    }

    // Load config
    let mut config = match cli.config {
        Some(path) => Config::load_from(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load_or_default(),
    };

    // Apply CLI overrides
    if let Some(device) = cli.device {
        config.midi.device = Some(device);
    }
    if let Some(threshold) = cli.threshold {
        config.engine.velocity_threshold = threshold.clamp(1, 127);
    }

    run(config, cli.dry_run)
}

fn run(config: Config, dry_run: bool) -> Result<()> {
    // Interrupt and termination both unwind through the shutdown flag so
    // the MIDI connection is closed before exit.
    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown))?;

    let sink: Box<dyn KeystrokeSink> = if dry_run {
        log::info!("dry run: keystrokes are logged, not injected");
        Box::new(NullSink)
    } else if sink::is_available() {
        Box::new(RdevSink::new())
    } else {
        log::warn!("no display session detected, logging keystrokes instead");
        Box::new(NullSink)
    };

    let mut engine = Recognizer::new(config.recognizer_settings(), sink);

    let (mut source, midi_rx) = MidiSource::new(&config.midi.client_name);
    let port = match &config.midi.device {
        Some(name) => source.open_by_name(name)?,
        None => source.open_first()?,
    };
    log::info!("listening on '{}' in {} mode", port, engine.mode());

    let ticker = tick(config.engine.tick_interval());

    while !shutdown.load(Ordering::Relaxed) {
        select! {
            recv(midi_rx) -> msg => match msg {
                Ok(msg) => {
                    engine.handle_message(msg.status, msg.data1, msg.data2, Instant::now())
                }
                // The sender lives in the MIDI connection; this only
                // happens once the port is gone.
                Err(_) => break,
            },
            recv(ticker) -> _ => engine.tick(Instant::now()),
        }
    }

    log::info!("shutting down");
    source.close();
    Ok(())
}
