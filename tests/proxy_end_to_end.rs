//! Drives the proxy over real sockets: a fake origin server stands in
//! for "the internet", and the proxy itself is bound on an ephemeral
//! port and driven with a plain `TcpStream` client.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cacheproxy::cache::Cache;
use cacheproxy::init::shutdown::GracefulShutdown;
use cacheproxy::start;

/// Binds an origin server on an ephemeral port that answers every
/// accepted connection with `response` once, then closes.
fn spawn_fake_origin(response: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            // Drain the request so the client's write doesn't block on a full pipe.
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(response);
        }
    });
    addr
}

/// Binds the proxy on an ephemeral port and runs its accept loop on a
/// background thread. Returns the bound address and a shutdown handle
/// the test can use to stop the loop.
fn spawn_proxy() -> (SocketAddr, GracefulShutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener); // release the port, serve() rebinds it

    let shutdown = GracefulShutdown::new();
    let cache = Arc::new(Cache::new());
    let serve_shutdown = shutdown.clone();
    thread::spawn(move || {
        let _ = start::serve(addr, cache, &serve_shutdown);
    });
    // Give the acceptor a moment to bind before the test dials it.
    thread::sleep(Duration::from_millis(100));
    (addr, shutdown)
}

#[test]
fn end_to_end_get_rewrites_headers_on_the_wire() {
    let origin_body = b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nhello";
    let origin_addr = spawn_fake_origin(origin_body);
    let (proxy_addr, shutdown) = spawn_proxy();

    let mut client = TcpStream::connect(proxy_addr).unwrap();
    let request = format!(
        "GET http://127.0.0.1:{}/greet HTTP/1.0\r\nHost: ignored\r\nX-Trace: abc\r\n\r\n",
        origin_addr.port()
    );
    client.write_all(request.as_bytes()).unwrap();
    client.shutdown(std::net::Shutdown::Write).unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).unwrap();
    assert_eq!(response, origin_body);

    shutdown.initiate();
}

#[test]
fn non_get_method_closes_without_forwarding() {
    // No fake origin is started: if the proxy tried to dial one it
    // would fail to connect, and this test would hang instead of
    // returning a clean, empty response.
    let (proxy_addr, shutdown) = spawn_proxy();

    let mut client = TcpStream::connect(proxy_addr).unwrap();
    client
        .write_all(b"POST http://127.0.0.1:9/x HTTP/1.0\r\nHost: h\r\n\r\nbody")
        .unwrap();
    client.shutdown(std::net::Shutdown::Write).unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).unwrap();
    assert!(response.is_empty());

    shutdown.initiate();
}
