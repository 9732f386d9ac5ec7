//! The acceptor loop: binds the listening socket, accepts connections,
//! and spawns one worker thread per connection.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::cache::Cache;
use crate::handler;
use crate::init::shutdown::GracefulShutdown;

/// How long a single non-blocking `accept` poll waits before
/// rechecking the shutdown flag. `std::net::TcpListener` has no
/// select-with-interrupt primitive, so this polls instead.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn serve(bind_addr: SocketAddr, cache: Arc<Cache>, shutdown: &GracefulShutdown) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    listener.set_nonblocking(true)?;
    log::info!("cacheproxy listening on {bind_addr}");

    while !shutdown.is_shutting_down() {
        match listener.accept() {
            Ok((stream, peer)) => {
                stream.set_nonblocking(false)?;
                log::info!("accepted connection from {peer}");
                spawn_worker(stream, cache.clone(), shutdown);
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(err) if is_recoverable_accept_error(&err) => {
                log::warn!("accept error (continuing): {err}");
            }
            Err(err) => {
                log::error!("fatal accept error: {err}");
                return Err(err.into());
            }
        }
    }

    log::info!("no longer accepting connections, draining in-flight requests...");
    shutdown.wait_inflight_zero();
    cache.shutdown();
    Ok(())
}

fn spawn_worker(stream: TcpStream, cache: Arc<Cache>, shutdown: &GracefulShutdown) {
    let guard = shutdown.inflight_guard();
    thread::spawn(move || {
        let _guard = guard;
        handler::handle_connection(stream, &cache);
    });
}

fn is_recoverable_accept_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset | io::ErrorKind::Interrupted
    )
}
