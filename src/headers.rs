//! Consumes the client's header block (read line by line) and emits
//! an origin-bound header block with a fixed field ordering.

use std::io::Read;

use crate::error::ProxyError;
use crate::io_util::read_line;

/// Fixed, deterministic override. Tests only require it be present
/// and stable, not any particular browser identity.
const USER_AGENT: &str = "cacheproxy/0.1";

/// Header names the rewriter treats specially; every other
/// client-supplied header passes through unchanged, in order.
fn is_ignored_header(name: &[u8]) -> bool {
    name.eq_ignore_ascii_case(b"host")
        || name.eq_ignore_ascii_case(b"user-agent")
        || name.eq_ignore_ascii_case(b"connection")
        || name.eq_ignore_ascii_case(b"proxy-connection")
}

/// Returns the colon-terminated header name, i.e. everything before
/// the first `:`. Comparing this substring (rather than a raw prefix
/// of the whole line) avoids a header like `Hostname:` false-matching
/// `Host`.
fn header_name(line: &[u8]) -> Option<&[u8]> {
    let colon = line.iter().position(|&b| b == b':')?;
    Some(&line[..colon])
}

/// Reads the client's header block (everything after the request
/// line, up to and including the terminating blank line) and returns
/// the rewritten, origin-bound header block.
pub fn rewrite_headers<R: Read>(
    client: &mut R,
    host: &str,
    port: &str,
    path: &str,
) -> Result<Vec<u8>, ProxyError> {
    let mut host_line: Option<Vec<u8>> = None;
    let mut passthrough: Vec<u8> = Vec::new();

    loop {
        let line = read_line(client)?;
        if line == b"\r\n" || line == b"\n" {
            break;
        }

        let Some(name) = header_name(&line) else {
            return Err(ProxyError::MalformedRequest(format!(
                "header line has no ':': {:?}",
                String::from_utf8_lossy(&line)
            )));
        };

        if name.eq_ignore_ascii_case(b"host") {
            host_line = Some(line);
        } else if is_ignored_header(name) {
            // Connection / Proxy-Connection / User-Agent: dropped, the
            // proxy supplies its own values below.
        } else {
            passthrough.extend_from_slice(&line);
        }
    }

    let mut out = Vec::with_capacity(passthrough.len() + 160);
    out.extend_from_slice(format!("GET {path} HTTP/1.0\r\n").as_bytes());
    match host_line {
        Some(line) => out.extend_from_slice(&line),
        None => out.extend_from_slice(format!("Host: {host}:{port}\r\n").as_bytes()),
    }
    out.extend_from_slice(format!("User-Agent: {USER_AGENT}\r\n").as_bytes());
    out.extend_from_slice(&passthrough);
    out.extend_from_slice(b"Connection: close\r\n");
    out.extend_from_slice(b"Proxy-Connection: close\r\n");
    out.extend_from_slice(b"\r\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn synthesizes_host_when_absent() {
        let mut client = Cursor::new(b"X-Foo: bar\r\n\r\n".to_vec());
        let out = rewrite_headers(&mut client, "host", "81", "/p").unwrap();
        let out = String::from_utf8(out).unwrap();

        let host_lines = out.matches("Host:").count();
        assert_eq!(host_lines, 1);
        assert!(out.contains("Host: host:81\r\n"));
    }

    #[test]
    fn echoes_client_host_verbatim() {
        let mut client = Cursor::new(b"Host: custom.example:9999\r\n\r\n".to_vec());
        let out = rewrite_headers(&mut client, "host", "81", "/p").unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Host: custom.example:9999\r\n"));
        assert_eq!(out.matches("Host:").count(), 1);
    }

    #[test]
    fn end_to_end_rewrite_matches_contract() {
        let mut client = Cursor::new(b"X-Foo: bar\r\nUser-Agent: zzz\r\n\r\n".to_vec());
        let out = rewrite_headers(&mut client, "host", "81", "/p").unwrap();
        let out = String::from_utf8(out).unwrap();

        let expected = format!(
            "GET /p HTTP/1.0\r\nHost: host:81\r\nUser-Agent: {USER_AGENT}\r\nX-Foo: bar\r\nConnection: close\r\nProxy-Connection: close\r\n\r\n"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn drops_connection_and_proxy_connection_headers() {
        let mut client = Cursor::new(b"Connection: keep-alive\r\nProxy-Connection: keep-alive\r\n\r\n".to_vec());
        let out = rewrite_headers(&mut client, "h", "80", "/").unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("Connection:").count(), 2); // our own Connection + Proxy-Connection
        assert!(!out.contains("keep-alive"));
    }

    #[test]
    fn missing_terminating_blank_line_is_end_of_stream() {
        // The client closes mid-header-block: no malformed line was
        // ever read, so this surfaces as EndOfStream, not MalformedRequest.
        let mut client = Cursor::new(b"X-Foo: bar\r\n".to_vec());
        assert!(matches!(
            rewrite_headers(&mut client, "h", "80", "/"),
            Err(ProxyError::EndOfStream)
        ));
    }

    #[test]
    fn header_line_without_colon_is_malformed() {
        let mut client = Cursor::new(b"not-a-header-line\r\n\r\n".to_vec());
        assert!(matches!(
            rewrite_headers(&mut client, "h", "80", "/"),
            Err(ProxyError::MalformedRequest(_))
        ));
    }
}
