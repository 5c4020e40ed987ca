use crossterm::style::{Color, Stylize};
use env_logger::{Builder, Env};
use log::Level;
use std::io::Write;

pub const LOG_LEVEL_ENV: &str = "REPO2SFT_LOG_LEVEL";

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Cyan,
        Level::Trace => Color::Magenta,
    }
}

/// Installs the global logger. `REPO2SFT_LOG_LEVEL` wins over `-v` flags.
pub fn setup_logger(verbosity: u8) -> Result<(), log::SetLoggerError> {
    Builder::from_env(Env::default().filter_or(LOG_LEVEL_ENV, level_for(verbosity)))
        .format(|buf, record| {
            let tag = format!("[{}]", record.level()).with(level_color(record.level()));
            writeln!(buf, "{} [{}] {}", tag, buf.timestamp(), record.args())
        })
        .format_timestamp_secs()
        .try_init()
}
