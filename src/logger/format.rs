//! Console formatting with ANSI colors
//!
//! Lines go to stderr so library output never mixes with a host program's
//! stdout. Broken pipes are ignored.

use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stderr, Write};

/// Tag column width for alignment
const TAG_WIDTH: usize = 9;
const LEVEL_WIDTH: usize = 7;

pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();

    let line = format!(
        "{} [{}] [{}] {}",
        time.dimmed(),
        format_tag(&tag),
        format_level(level),
        format_message(level, message)
    );

    let mut err = stderr().lock();
    let _ = writeln!(err, "{}", line);
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let padded = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::Resolver => padded.bright_green().bold(),
        LogTag::Cache => padded.bright_cyan().bold(),
        LogTag::Api => padded.bright_blue().bold(),
        LogTag::RateLimit => padded.bright_yellow().bold(),
        LogTag::Batch => padded.bright_magenta().bold(),
        LogTag::Stats => padded.bright_white().bold(),
        LogTag::Sns => padded.green().bold(),
        LogTag::Config => padded.yellow().bold(),
        LogTag::System => padded.white().bold(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let padded = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => padded.bright_red().bold(),
        LogLevel::Warning => padded.bright_yellow().bold(),
        LogLevel::Info => padded.normal(),
        LogLevel::Debug => padded.dimmed(),
        LogLevel::Verbose => padded.dimmed(),
    }
}

fn format_message(level: LogLevel, message: &str) -> ColoredString {
    match level {
        LogLevel::Error => message.red(),
        LogLevel::Warning => message.yellow(),
        LogLevel::Debug | LogLevel::Verbose => message.dimmed(),
        LogLevel::Info => message.normal(),
    }
}
