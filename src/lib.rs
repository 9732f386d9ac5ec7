use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;

pub mod cache;
pub mod consts;
pub mod dial;
pub mod error;
pub mod headers;
pub mod init;
pub mod io_util;
pub mod start;
pub mod uri;

mod cmd;
mod common;
mod handler;

pub fn run() -> Result<()> {
    let shutdown = init::shutdown::init()?;
    let startup = init::cmd::init()?;

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], startup.port));
    let cache = Arc::new(cache::Cache::new());

    start::serve(bind_addr, cache, &shutdown)?;
    log::info!("Shutdown complete.");
    Ok(())
}
