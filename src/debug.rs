//! Debug log file and `log` facade bridge for fontweave.
//!
//! Every `log::info!()` and friends from the workspace crates ends up in
//! `fontweave_debug.log` in the temp directory, keeping stdout free for
//! command output. When `RUST_LOG` is set, lines are mirrored to stderr too.
//!
//! Level precedence, highest first: the `--log-level` flag, `RUST_LOG`, then
//! the config file's `log_level` (applied after the config loads).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use fontweave_config::LogLevel;
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// Debug log location: `/tmp/fontweave_debug.log` on Unix/macOS,
/// `%TEMP%\fontweave_debug.log` on Windows.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("fontweave_debug.log")
}

/// Debug log file state
struct DebugLogger {
    file: Option<File>,
    /// Set once opening the file has failed, so it is not retried per line
    unavailable: bool,
}

impl DebugLogger {
    fn new() -> Self {
        DebugLogger {
            file: None,
            unavailable: false,
        }
    }

    /// Open (truncating) the log file and write the session header.
    fn open(&mut self) {
        match OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
        {
            Ok(f) => {
                self.file = Some(f);
                self.write_raw(&format!(
                    "\n{}\nfontweave debug session started at {} (level={})\n{}\n",
                    "=".repeat(80),
                    get_timestamp(),
                    log::max_level(),
                    "=".repeat(80)
                ));
            }
            Err(_e) => {
                // Silently fail; logging must never break a command
                self.unavailable = true;
            }
        }
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }

    fn write_line(&mut self, line: &str) {
        if self.file.is_none() && !self.unavailable {
            self.open();
        }
        self.write_raw(line);
    }

    fn flush(&mut self) {
        if let Some(ref mut file) = self.file {
            let _ = file.flush();
        }
    }
}

struct LogBridge {
    logger: Mutex<DebugLogger>,
    mirror_stderr: bool,
    /// The level came from the CLI or `RUST_LOG`; the config cannot change it
    pinned: bool,
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            &get_timestamp(),
            record.level(),
            record.target(),
            &record.args().to_string(),
        );
        if self.mirror_stderr {
            eprint!("{}", line);
        }
        self.logger.lock().write_line(&line);
    }

    fn flush(&self) {
        self.logger.lock().flush();
    }
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

fn format_line(timestamp: &str, level: log::Level, target: &str, msg: &str) -> String {
    format!("[{}] [{:<5}] [{}] {}\n", timestamp, level, target, msg)
}

/// The most verbose level a `RUST_LOG` value names.
///
/// Directives are `level` or `target=level`; a bare target enables
/// everything, as `env_logger` reads it.
fn level_from_rust_log(value: &str) -> Option<LevelFilter> {
    value
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .map(|directive| {
            let level = directive.rsplit_once('=').map_or(directive, |(_, l)| l);
            level.trim().parse::<LevelFilter>().unwrap_or(LevelFilter::Trace)
        })
        .max()
}

/// Install the log bridge as the global `log` logger.
///
/// `cli_level` is the `--log-level` flag. Without it, `RUST_LOG` decides;
/// without either, logging stays off until [`apply_config_level`]. Calling
/// this twice leaves the first bridge in place.
pub fn init_log_bridge(cli_level: Option<LogLevel>) {
    let rust_log = std::env::var("RUST_LOG")
        .ok()
        .filter(|value| !value.trim().is_empty());
    let level = cli_level
        .map(LogLevel::to_level_filter)
        .or_else(|| rust_log.as_deref().and_then(level_from_rust_log));

    let bridge = BRIDGE.get_or_init(|| LogBridge {
        logger: Mutex::new(DebugLogger::new()),
        mirror_stderr: rust_log.is_some(),
        pinned: level.is_some(),
    });
    if log::set_logger(bridge).is_err() {
        return;
    }
    log::set_max_level(level.unwrap_or(LevelFilter::Off));
}

/// Apply the config file's level unless the CLI or `RUST_LOG` chose one.
pub fn apply_config_level(level: LogLevel) {
    if BRIDGE.get().is_some_and(|bridge| !bridge.pinned) {
        log::set_max_level(level.to_level_filter());
    }
}
