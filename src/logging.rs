//! Log bridge for the `hlsl2usf` binary.
//!
//! Routes every `log::info!()`/`log::warn!()`/... call from the workspace
//! crates to stderr and, when configured, to a log file. Lines have the form
//! `[timestamp] [LEVEL] [target] message`.
//!
//! Level precedence: `--log-level`, then `RUST_LOG`, then the settings file,
//! then `warn`.

use hlsl2usf_config::LogLevel;
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Inputs for [`init_log_bridge`].
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Level from the command line; wins over everything else.
    pub cli_level: Option<LevelFilter>,
    /// Level from the settings file.
    pub settings_level: LogLevel,
    /// Optional mirror of all log output.
    pub log_file: Option<PathBuf>,
}

struct BridgeLogger {
    level: LevelFilter,
    file: Mutex<Option<File>>,
}

impl BridgeLogger {
    fn write_line(&self, line: &str) {
        let _ = std::io::stderr().lock().write_all(line.as_bytes());

        let mut file = self.file.lock();
        if let Some(ref mut file) = *file {
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }
    }
}

impl Log for BridgeLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            self.write_line(&format_line(
                &get_timestamp(),
                record.level(),
                record.target(),
                &record.args().to_string(),
            ));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(ref mut file) = *self.file.lock() {
            let _ = file.flush();
        }
    }
}

static LOGGER: OnceLock<BridgeLogger> = OnceLock::new();

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

fn format_line(timestamp: &str, level: log::Level, target: &str, message: &str) -> String {
    format!("[{timestamp}] [{level:<5}] [{target}] {message}\n")
}

/// Parse a `RUST_LOG` value. Only a bare level (`debug`) or a single
/// `target=level` directive is understood; the level part is used globally.
fn parse_env_level(value: &str) -> Option<LevelFilter> {
    let directive = value.split(',').next()?.trim();
    let level = directive.rsplit('=').next()?.trim();
    LogLevel::from_name(level).map(LogLevel::to_level_filter)
}

/// Resolve the effective level from its three sources.
pub fn resolve_level(
    cli_level: Option<LevelFilter>,
    env_value: Option<&str>,
    settings_level: LogLevel,
) -> LevelFilter {
    cli_level
        .or_else(|| env_value.and_then(parse_env_level))
        .unwrap_or_else(|| settings_level.to_level_filter())
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let _ = std::fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!(
                "hlsl2usf: warning: cannot open log file {}: {e}",
                path.display()
            );
            None
        }
    }
}

/// Install the bridge as the global logger. Returns the effective level.
///
/// Only the first call installs a logger; later calls return the level that
/// is already in effect.
pub fn init_log_bridge(options: &LogOptions) -> LevelFilter {
    if let Some(logger) = LOGGER.get() {
        return logger.level;
    }

    let env_value = std::env::var("RUST_LOG").ok();
    let level = resolve_level(
        options.cli_level,
        env_value.as_deref(),
        options.settings_level,
    );
    let file = options.log_file.as_deref().and_then(open_log_file);

    let logger = LOGGER.get_or_init(|| BridgeLogger {
        level,
        file: Mutex::new(file),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }
    logger.level
}
