//! Resolves `host:port` and returns a connected stream to the origin.
//! `TcpStream::connect` on a `"host:port"` string already iterates
//! every candidate address in order and returns on the first success,
//! freeing the resolver's address list on every exit path.

use std::net::TcpStream;

use crate::error::ProxyError;

pub fn dial(host: &str, port: &str) -> Result<TcpStream, ProxyError> {
    let addr = format!("{host}:{port}");
    TcpStream::connect(addr).map_err(ProxyError::Connect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn connects_to_a_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port().to_string();

        let accepted = std::thread::spawn(move || listener.accept().unwrap());
        let stream = dial("127.0.0.1", &port).unwrap();
        drop(stream);
        accepted.join().unwrap();
    }

    #[test]
    fn fails_on_unreachable_port() {
        // Port 0 is never a valid connect target.
        assert!(dial("127.0.0.1", "0").is_err());
    }
}
