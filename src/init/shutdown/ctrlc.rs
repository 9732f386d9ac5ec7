use anyhow::Result;

use super::GracefulShutdown;

pub fn init(shutdown: GracefulShutdown) -> Result<()> {
    ctrlc::set_handler(move || {
        log::info!("Shutdown requested (Ctrl+C). Waiting for in-flight requests...");
        shutdown.initiate();
    })?;
    Ok(())
}
