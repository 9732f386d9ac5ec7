//! The per-connection state machine: reads a request, checks the
//! cache, and either serves a hit or forwards to the origin and
//! relays the response back while opportunistically caching it.

use std::io::Read;
use std::net::TcpStream;
use std::sync::Arc;

use crate::cache::{Cache, InsertOutcome, LookupOutcome};
use crate::consts::{MAX_LINE, MAX_OBJECT_SIZE};
use crate::dial;
use crate::error::ProxyError;
use crate::headers;
use crate::io_util::{read_line, write_all};
use crate::uri;

/// Runs the full request/response cycle for one accepted connection.
/// Any per-request failure is logged and swallowed here — it never
/// escapes to the caller, since one bad request must not bring down
/// the acceptor loop.
pub fn handle_connection(mut client: TcpStream, cache: &Arc<Cache>) {
    if let Err(err) = serve(&mut client, cache) {
        log::debug!("dropping request: {err}");
    }
}

fn serve(client: &mut TcpStream, cache: &Arc<Cache>) -> Result<(), ProxyError> {
    let request_line = read_line(client)?;
    let line = String::from_utf8_lossy(&request_line);
    let mut tokens = line.trim_end_matches(['\r', '\n']).splitn(3, ' ');
    let method = tokens
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProxyError::MalformedRequest("missing method".into()))?;
    let target = tokens
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProxyError::MalformedRequest("missing request-target".into()))?;
    let _version = tokens
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProxyError::MalformedRequest("missing version".into()))?;

    if !method.eq_ignore_ascii_case("GET") {
        log::debug!("closing connection: unsupported method {method}");
        return Ok(());
    }

    let parsed = uri::parse_uri(target);
    // Port-independent key: http://h/p and http://h:80/p collide.
    let key = format!("{}{}", parsed.host, parsed.path);

    let mut cache_buf = vec![0u8; MAX_OBJECT_SIZE];
    match cache.lookup(&key, &mut cache_buf) {
        LookupOutcome::Hit { size } => {
            write_all(client, &cache_buf[..size])?;
            log::info!("{method} {target} cache hit ({size} bytes)");
            return Ok(());
        }
        LookupOutcome::Miss | LookupOutcome::BufferTooSmall => {}
    }

    let outgoing = headers::rewrite_headers(client, &parsed.host, &parsed.port, &parsed.path)?;
    let mut origin = dial::dial(&parsed.host, &parsed.port)?;
    write_all(&mut origin, &outgoing)?;

    log::info!("{method} {target} cache miss, forwarding to {}:{}", parsed.host, parsed.port);
    relay(client, &mut origin, &key, cache)
}

fn relay(
    client: &mut TcpStream,
    origin: &mut TcpStream,
    key: &str,
    cache: &Arc<Cache>,
) -> Result<(), ProxyError> {
    let mut buf = [0u8; MAX_LINE];
    let mut accumulated: Vec<u8> = Vec::new();
    let mut admit = true;

    loop {
        let n = origin.read(&mut buf).map_err(ProxyError::Read)?;
        if n == 0 {
            break;
        }
        write_all(client, &buf[..n])?;

        if admit {
            if accumulated.len() + n <= MAX_OBJECT_SIZE {
                accumulated.extend_from_slice(&buf[..n]);
            } else {
                admit = false;
                accumulated.clear();
            }
        }
    }

    if admit && !accumulated.is_empty() {
        match cache.insert(key, &accumulated) {
            InsertOutcome::Inserted => log::debug!("cached {key} ({} bytes)", accumulated.len()),
            InsertOutcome::Rejected => log::debug!("cache rejected {key}"),
        }
    }

    Ok(())
}
