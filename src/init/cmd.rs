use std::str::FromStr;

use anyhow::{Context, Result};

use crate::{
    cmd::{Args, LogLevel},
    init::logger,
};

/// Resolved startup configuration: the CLI's one required datum (the
/// listen port) plus the ambient logging flags.
#[derive(Debug)]
pub struct Startup {
    pub port: u16,
}

pub fn init() -> Result<Startup> {
    let (mut args, reminder) = Args::parse().context("failed to parse command-line arguments")?;

    logger::init(
        &args.log_level.take().unwrap_or(LogLevel::from_str("info")?),
        args.colored.unwrap_or(false),
    )?;
    log::debug!("{args:?}, reminder={reminder:?}");

    if args.help.is_some_and(|h| h) {
        Args::print_help();
        std::process::exit(0);
    }

    let port = match args.port.take() {
        Some(port) => *port,
        None => reminder
            .iter()
            .find_map(|tok| tok.parse::<u16>().ok())
            .ok_or_else(|| anyhow::anyhow!("usage: cacheproxy <port>"))?,
    };

    Ok(Startup { port })
}
