//! Stderr logger for the `spine-align` binary.
//!
//! Lines look like `[  0.012s  INFO measure] message`: elapsed time since
//! installation, level, and the workspace crate that emitted the record
//! (`spine_align_` prefix dropped). Records from other crates are capped at
//! `Warn` so a `--log-level debug` run only gets chatty about our own
//! pipeline.
//!
//! The level comes from the caller, or from `SPINE_ALIGN_LOG` through
//! [`level_from_env`].

use std::fmt::Write as _;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable read by [`level_from_env`].
pub const LOG_ENV: &str = "SPINE_ALIGN_LOG";

const WORKSPACE_PREFIX: &str = "spine_align";

struct PipelineLogger {
    level: LevelFilter,
    started: Instant,
}

/// Short crate label for a record target: `spine_align_measure::extract`
/// becomes `measure`, the facade and binary become `spine-align`.
fn crate_label(target: &str) -> &str {
    let krate = target.split("::").next().unwrap_or(target);
    match krate.strip_prefix(WORKSPACE_PREFIX) {
        Some("") => "spine-align",
        Some(rest) => rest.trim_start_matches('_'),
        None => krate,
    }
}

fn is_workspace_target(target: &str) -> bool {
    target.starts_with(WORKSPACE_PREFIX)
}

/// Effective filter for `target`: ours as requested, others at most `Warn`.
fn filter_for(level: LevelFilter, target: &str) -> LevelFilter {
    if is_workspace_target(target) {
        level
    } else {
        level.min(LevelFilter::Warn)
    }
}

fn format_line(elapsed_s: f64, level: Level, target: &str, args: &std::fmt::Arguments) -> String {
    let mut line = String::with_capacity(64);
    let _ = writeln!(
        line,
        "[{elapsed_s:7.3}s {level:>5} {}] {args}",
        crate_label(target)
    );
    line
}

impl Log for PipelineLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= filter_for(self.level, metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        // One write per record keeps lines whole.
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<PipelineLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| PipelineLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Parse `off|error|warn|info|debug|trace` (case-insensitive).
pub fn parse_level_filter(s: &str) -> Option<LevelFilter> {
    s.trim().parse().ok()
}

/// Level named by `SPINE_ALIGN_LOG`, if set and valid.
pub fn level_from_env() -> Option<LevelFilter> {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| parse_level_filter(&v))
}

#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse() {
        assert_eq!(parse_level_filter("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level_filter(" WARN "), Some(LevelFilter::Warn));
        assert_eq!(parse_level_filter("verbose"), None);
    }

    #[test]
    fn crate_labels_drop_workspace_prefix() {
        assert_eq!(crate_label("spine_align_measure::extract"), "measure");
        assert_eq!(crate_label("spine_align_sim"), "sim");
        assert_eq!(crate_label("spine_align::pipeline"), "spine-align");
        assert_eq!(crate_label("spine_align"), "spine-align");
        assert_eq!(crate_label("serde_json::de"), "serde_json");
    }

    #[test]
    fn foreign_targets_are_capped_at_warn() {
        assert_eq!(
            filter_for(LevelFilter::Trace, "spine_align_targets::engine"),
            LevelFilter::Trace
        );
        assert_eq!(filter_for(LevelFilter::Trace, "clap"), LevelFilter::Warn);
        assert_eq!(filter_for(LevelFilter::Error, "clap"), LevelFilter::Error);
        assert_eq!(filter_for(LevelFilter::Off, "clap"), LevelFilter::Off);
    }

    #[test]
    fn line_carries_level_and_crate() {
        let line = format_line(
            1.5,
            Level::Info,
            "spine_align::pipeline",
            &format_args!("plan done"),
        );
        assert_eq!(line, "[  1.500s  INFO spine-align] plan done\n");
    }

    #[test]
    fn setlogger_error_converts_into_boxed_error() {
        fn boxed<E: std::error::Error + 'static>(e: E) -> Box<dyn std::error::Error> {
            Box::new(e)
        }
        let _ = boxed::<log::SetLoggerError>;
    }
}
