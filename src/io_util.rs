//! A byte-at-a-time line reader and a short-write-safe full writer.

use std::io::{self, Read, Write};

use crate::consts::MAX_LINE;
use crate::error::ProxyError;

/// Reads a single terminated line (up to and including `\n`) from
/// `stream`, one byte at a time. Fails with [`ProxyError::LineTooLong`]
/// if [`MAX_LINE`] bytes are read without seeing a terminator, and
/// with [`ProxyError::EndOfStream`] if the peer closes first.
pub fn read_line<R: Read>(stream: &mut R) -> Result<Vec<u8>, ProxyError> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match stream.read(&mut byte) {
            Ok(0) => return Err(ProxyError::EndOfStream),
            Ok(_) => {
                line.push(byte[0]);
                if byte[0] == b'\n' {
                    return Ok(line);
                }
                if line.len() >= MAX_LINE {
                    return Err(ProxyError::LineTooLong);
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(ProxyError::Read(err)),
        }
    }
}

/// Writes all of `buf` to `stream`, looping over short writes and
/// retrying on interruption.
pub fn write_all<W: Write>(stream: &mut W, buf: &[u8]) -> Result<usize, ProxyError> {
    let mut written = 0;
    while written < buf.len() {
        match stream.write(&buf[written..]) {
            Ok(0) => {
                return Err(ProxyError::Write {
                    written,
                    source: io::Error::new(io::ErrorKind::WriteZero, "write returned 0 bytes"),
                });
            }
            Ok(n) => written += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(ProxyError::Write { written, source: err }),
        }
    }
    Ok(written)
}
