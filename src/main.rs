//! swipecard - swipe-to-reveal row actions for Linux touchscreens.
//!
//! CLI entry point.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::sync::atomic::Ordering;
use std::time::SystemTime;

use clap::Parser;
use log::{Level, LevelFilter, Log, Metadata, Record};

use swipecard::config::AppConfig;
use swipecard::manager::{SwipeManager, list_touch_devices};
use swipecard::replay::{ReplayScript, run_script};

#[derive(Parser)]
#[command(name = "swipecard", about = "Swipe-to-reveal row actions for touchscreens")]
struct Cli {
    /// Path to configuration file
    #[arg(default_value = "/etc/swipecard/swipecard.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// List available touchscreen devices and exit
    #[arg(short, long)]
    list_devices: bool,

    /// Run a gesture script against the global profile and exit
    #[arg(short, long, value_name = "SCRIPT")]
    replay: Option<PathBuf>,
}

/// Simple logger that writes to stderr and optionally to a log file.
struct SwipecardLogger {
    level: LevelFilter,
    file: Option<Mutex<std::fs::File>>,
}

impl Log for SwipecardLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("swipecard")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        let line = format!("[{secs} {level} swipecard] {}\n", record.args());

        // stderr ends up in journald under systemd
        eprint!("{line}");

        if let Some(ref file_mutex) = self.file {
            if let Ok(mut f) = file_mutex.lock() {
                let _ = f.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Some(ref file_mutex) = self.file {
            if let Ok(mut f) = file_mutex.lock() {
                let _ = f.flush();
            }
        }
    }
}

fn init_logging(config: &AppConfig, verbose: bool) {
    // --verbose wins over the config file.
    let log_level: LevelFilter = if verbose {
        LevelFilter::Debug
    } else {
        config.log_level.parse().unwrap_or(LevelFilter::Info)
    };

    let log_file = config.log_file.as_deref().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Mutex::new(file)),
            Err(e) => {
                eprintln!("Warning: cannot open log file '{path}': {e}");
                None
            }
        }
    });

    let logger = SwipecardLogger {
        level: log_level,
        file: log_file,
    };
    log::set_boxed_logger(Box::new(logger)).expect("Failed to set logger");
    log::set_max_level(log_level);
}

fn replay(config: &AppConfig, script_path: &Path) -> ExitCode {
    let script = match ReplayScript::from_file(script_path) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "Replaying {} step(s) on {} row(s) from {}",
        script.steps.len(),
        script.rows,
        script_path.display()
    );
    for report in run_script(&script, &config.global) {
        println!("{report}");
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_devices {
        return list_touch_devices();
    }

    // Parse config first (before logger init) so we can read the configured log level.
    let mut manager = match SwipeManager::new(&cli.config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!(
                "Error: {e}\n\n\
                 To find available touchscreen devices, run:\n\
                 \x20 swipecard --list-devices"
            );
            return ExitCode::FAILURE;
        }
    };

    init_logging(manager.config(), cli.verbose);
    log::info!("Loaded configuration from: {}", cli.config.display());

    if let Some(script) = &cli.replay {
        return replay(manager.config(), script);
    }

    let running = manager.running_flag();
    ctrlc::set_handler(move || {
        running.store(false, Ordering::Relaxed);
    })
    .expect("Error setting Ctrl-C handler");

    manager.start();

    ExitCode::SUCCESS
}
