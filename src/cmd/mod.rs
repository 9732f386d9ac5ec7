use std::{
    ops::{Deref, DerefMut},
    str::FromStr,
};

use sarge::{ArgumentType, prelude::*};

use crate::impl_deref_mut;

sarge! {
    #[derive(Debug)]
    pub Args,

    > "TCP port to listen on. May also be given as a bare positional"
    > "argument (`cacheproxy 8080`) instead of `-p`."
    #ok 'p' @CACHEPROXY_PORT pub port: Port,

    > "log level: off/error/warn/info/debug/trace, or repeated 'v' (-vv, -vvv)"
    #ok 'v' @CACHEPROXY_LOG_LEVEL pub log_level: LogLevel,

    > "log with color?"
    #ok pub colored: bool,

    > "help"
    #ok 'h' pub help: bool,
}

#[derive(Debug)]
pub struct LogLevel(String);

/// Accepts a standard level name (case-insensitively, with a couple of
/// common aliases), or falls back to counting `v` characters in the
/// value as verbosity shorthand: none is `off`, one is `info`, two is
/// `debug`, three or more is `trace`. Lets a user write `-v vvv`
/// instead of `-v trace` if they'd rather.
fn normalize_level(raw: &str) -> String {
    let trimmed = raw.trim();
    let known = match trimmed.to_ascii_lowercase().as_str() {
        "off" => Some("off"),
        "err" | "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    };
    if let Some(level) = known {
        return level.into();
    }

    let v_count = trimmed.chars().filter(|c| matches!(c, 'v' | 'V')).count();
    match v_count {
        0 => "off",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
    .into()
}

impl FromStr for LogLevel {
    type Err = core::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(normalize_level(s)))
    }
}

impl ArgumentType for LogLevel {
    type Error = ArgParseError;
    fn from_value(val: Option<&str>) -> sarge::ArgResult<Self> {
        Some(Ok(LogLevel(normalize_level(val.unwrap_or("info")))))
    }
}

impl_deref_mut!(LogLevel(String));


/// A validated TCP port number, parsed from a command-line value.
#[derive(Debug, Clone, Copy)]
pub struct Port(u16);

impl ArgumentType for Port {
    type Error = ArgParseError;

    fn from_value(val: Option<&str>) -> sarge::ArgResult<Self> {
        let port = val?.trim().parse::<u16>().ok()?;
        Some(Ok(Port(port)))
    }
}

impl FromStr for Port {
    type Err = std::num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl_deref_mut!(Port(u16));
