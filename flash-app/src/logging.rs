// SPDX-License-Identifier: GPL-3.0-only

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::{Duration, SystemTime};

use crate::config::{Config, LoggingLevel};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_LEVEL: AtomicU8 = AtomicU8::new(3);
static LOG_TO_DISK: AtomicBool = AtomicBool::new(true);

const LOG_DIR_NAME: &str = "cosmic-ext-jetson-flash";
const DEFAULT_LOG_PREFIX: &str = "cosmic-ext-jetson-flash.log";
const KEEP_DAYS: u64 = 7;

/// Crates that follow the configured level.
const OWN_CRATES: [&str; 3] = ["jetson_flash", "flash_sys", "flash_types"];

/// Chatty GPU and toolkit crates, held at warn.
const QUIET_CRATES: [&str; 7] = [
    "wgpu",
    "wgpu_core",
    "wgpu_hal",
    "naga",
    "iced_winit",
    "iced_wgpu",
    "i18n_embed",
];

pub(crate) fn init(config: &Config) {
    set_log_level(config.log_level);
    set_log_to_disk(config.log_to_disk);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config.log_level));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            log_level_allows(*metadata.level())
        }));

    match file_writer() {
        Ok((writer, guard)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .with_timer(tracing_subscriber::fmt::time::SystemTime)
                .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
                    LOG_TO_DISK.load(Ordering::Relaxed) && log_level_allows(*metadata.level())
                }));

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .init();

            // The worker flushes the file until the guard drops.
            let _ = LOG_GUARD.set(guard);
        }
        Err(e) => {
            eprintln!("{LOG_DIR_NAME}: failed to initialize file logging: {e:#}");
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .init();
        }
    }
}

fn default_filter(level: LoggingLevel) -> EnvFilter {
    let level = level.as_directive();
    let own = OWN_CRATES.iter().map(|name| format!("{name}={level}"));
    let quiet = QUIET_CRATES.iter().map(|name| format!("{name}=warn"));

    own.chain(quiet).fold(EnvFilter::new(level), |filter, directive| {
        filter.add_directive(
            directive
                .parse()
                .expect("Invalid log directive in built-in table"),
        )
    })
}

pub(crate) fn set_log_level(level: LoggingLevel) {
    LOG_LEVEL.store(level_to_int(level), Ordering::Relaxed);
}

pub(crate) fn set_log_to_disk(enabled: bool) {
    LOG_TO_DISK.store(enabled, Ordering::Relaxed);
}

fn level_to_int(level: LoggingLevel) -> u8 {
    match level {
        LoggingLevel::Error => 1,
        LoggingLevel::Warn => 2,
        LoggingLevel::Info => 3,
        LoggingLevel::Debug => 4,
        LoggingLevel::Trace => 5,
    }
}

fn severity(level: Level) -> u8 {
    match level {
        Level::ERROR => 1,
        Level::WARN => 2,
        Level::INFO => 3,
        Level::DEBUG => 4,
        Level::TRACE => 5,
    }
}

fn log_level_allows(level: Level) -> bool {
    severity(level) <= LOG_LEVEL.load(Ordering::Relaxed)
}

fn file_writer() -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let (dir, prefix) = resolve_log_location(|name| std::env::var_os(name));

    fs::create_dir_all(&dir)
        .map_err(|e| anyhow::anyhow!("create log directory failed: {} ({})", dir.display(), e))?;

    cleanup_old_logs(&dir, &prefix, KEEP_DAYS);

    let appender = tracing_appender::rolling::daily(&dir, &prefix);
    Ok(tracing_appender::non_blocking(appender))
}

/// Log directory and file prefix, from the environment lookup `var`.
fn resolve_log_location(var: impl Fn(&str) -> Option<OsString>) -> (PathBuf, OsString) {
    if let Some(file) = var("JETSON_FLASH_LOG_FILE") {
        let path = PathBuf::from(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_log_dir(&var));
        let prefix = path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| OsString::from(DEFAULT_LOG_PREFIX));
        return (dir, prefix);
    }

    let dir = var("JETSON_FLASH_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_log_dir(&var));
    (dir, OsString::from(DEFAULT_LOG_PREFIX))
}

fn default_log_dir(var: &impl Fn(&str) -> Option<OsString>) -> PathBuf {
    let state_home = var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| var("HOME").map(|home| PathBuf::from(home).join(".local").join("state")))
        .unwrap_or_else(|| PathBuf::from("/tmp"));

    state_home.join(LOG_DIR_NAME).join("logs")
}

fn cleanup_old_logs(dir: &Path, prefix: &OsStr, keep_days: u64) {
    let Some(cutoff) =
        SystemTime::now().checked_sub(Duration::from_secs(keep_days * 24 * 60 * 60))
    else {
        return;
    };
    let prefix = prefix.to_string_lossy();

    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        // Only files written by our rolling appender.
        if !entry.file_name().to_string_lossy().starts_with(prefix.as_ref()) {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        let expired = metadata.modified().is_ok_and(|modified| modified < cutoff);
        if expired {
            let _ = fs::remove_file(entry.path());
        }
    }
}
