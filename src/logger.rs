use chrono::Local;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::fs;

use crate::domain::utils::statistics::ANALYTICS_TARGET;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "scheduler.log";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Level from `RUST_LOG`, `info` if unset or unparsable.
fn level_from_env() -> LevelFilter {
    std::env::var("RUST_LOG").ok().and_then(|level| level.parse().ok()).unwrap_or(LevelFilter::Info)
}

fn console_dispatch() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!("[{} {} {}] {}", Local::now().format(TIME_FORMAT), colors.color(record.level()), record.target(), message))
        })
        .chain(std::io::stderr())
}

/// `None` if the log file cannot be opened; the console output still works then.
fn file_dispatch(path: &str) -> Option<Dispatch> {
    let file = match fern::log_file(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file '{}': {}", path, e);
            return None;
        }
    };
    Some(
        Dispatch::new()
            .format(|out, message, record| out.finish(format_args!("[{} {} {}] {}", Local::now().format(TIME_FORMAT), record.level(), record.target(), message)))
            .chain(file),
    )
}

/// Installs the global logger writing to stderr and `logs/scheduler.log`, filtered by `RUST_LOG`.
///
/// Per-request statistic events are logged under the analytics target. They are only emitted
/// when `with_analytics` is set, i.e. when the CLI was asked to collect statistics.
/// A second call keeps the first configuration.
pub fn init(with_analytics: bool) {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("Failed to create log directory at '{}': {}", LOG_DIR, e);
    }
    let log_file_path = format!("{}/{}", LOG_DIR, LOG_FILE);

    let level = level_from_env();
    let analytics_level = if with_analytics { level } else { LevelFilter::Off };

    let mut dispatch = Dispatch::new()
        .level(level)
        .level_for("serde", LevelFilter::Warn)
        .level_for("uuid", LevelFilter::Warn)
        .level_for(ANALYTICS_TARGET, analytics_level)
        .chain(console_dispatch());
    if let Some(file) = file_dispatch(&log_file_path) {
        dispatch = dispatch.chain(file);
    }

    if let Err(e) = dispatch.apply() {
        eprintln!("Failed to apply logger configuration: {}", e);
        return;
    }
    log::info!("Logger initialized at level {} (analytics {}).", level, if with_analytics { "on" } else { "off" });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_are_off_unless_requested() {
        init(false);
        assert!(!log::log_enabled!(target: ANALYTICS_TARGET, log::Level::Error));

        init(true);
        assert!(!log::log_enabled!(target: ANALYTICS_TARGET, log::Level::Error), "A second init must not replace the logger.");
    }
}
