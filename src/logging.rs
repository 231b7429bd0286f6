use std::fmt::Display;

use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Record};

/// How much the replay tool prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Verdicts, events and problems
    Normal,
    /// Also ignored messages and adapter bookkeeping from our own crates
    Debug,
}

impl Verbosity {
    /// Reads `DARSHAN_DEBUG`, which turns debug output on for `1` or `true`.
    pub fn from_env() -> Self {
        match std::env::var("DARSHAN_DEBUG").as_deref() {
            Ok("1") | Ok("true") => Self::Debug,
            _ => Self::Normal,
        }
    }

    fn max_local_level(&self) -> Level {
        match self {
            Verbosity::Normal => Level::Info,
            Verbosity::Debug => Level::Debug,
        }
    }
}

/// Installs the logger on stderr, leaving stdout to whatever the replay is piped into.
pub fn init_logger(verbosity: Verbosity) {
    fern::Dispatch::new()
        .level(LevelFilter::Debug)
        .format(|out, message, record| {
            let origin = Origin::of(record.target());

            out.finish(format_args!(
                "{} {} {:^8} {}",
                badge(record.level()),
                chrono::Local::now()
                    .format("%H:%M:%S%.3f")
                    .to_string()
                    .bright_black(),
                origin,
                detail(record, message)
            ))
        })
        .filter(move |meta| should_log(&Origin::of(meta.target()), meta.level(), verbosity))
        .chain(std::io::stderr())
        .apply()
        .expect("logging is initialized")
}

/// Our crates log up to the verbosity, dependencies only when something went wrong.
fn should_log(origin: &Origin, level: Level, verbosity: Verbosity) -> bool {
    match origin {
        Origin::Dependency(_) => level <= Level::Warn,
        _ => level <= verbosity.max_local_level(),
    }
}

/// Debug lines carry their module so they can be traced back.
fn detail(record: &Record, message: &std::fmt::Arguments) -> String {
    match (record.level(), record.module_path()) {
        (Level::Debug | Level::Trace, Some(module)) => {
            format!("{} {}", module.dimmed(), message)
        }
        _ => message.to_string(),
    }
}

/// Which part of the workspace a log line comes from.
#[derive(Debug, PartialEq)]
enum Origin {
    Dependency(String),
    Replay,
    Content,
    Engine,
}

impl Origin {
    fn of(target: &str) -> Self {
        let krate = target.split("::").next().unwrap_or_default();

        match krate {
            "darshan_core" => Self::Engine,
            "darshan_content" => Self::Content,
            "darshan" => Self::Replay,
            other => Self::Dependency(other.to_string()),
        }
    }

    fn label(&self) -> ColoredString {
        match self {
            Origin::Dependency(name) => name.as_str().normal(),
            Origin::Replay => "DARSHAN".bright_green(),
            Origin::Content => "CONTENT".bright_purple(),
            Origin::Engine => "CORE".blue(),
        }
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.label(), f)
    }
}

fn badge(level: Level) -> ColoredString {
    match level {
        Level::Error => " ERR ".black().on_red().bold(),
        Level::Warn => " WRN ".black().on_yellow().bold(),
        Level::Info => " INF ".black().on_blue().bold(),
        Level::Debug => " DBG ".white().on_black(),
        Level::Trace => " TRC ".normal(),
    }
}
