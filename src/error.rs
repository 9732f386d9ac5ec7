use std::fmt;
use std::io;

/// Per-request failure taxonomy. These never propagate past the
/// connection handler: every variant means "drop this request", not
/// "terminate the process".
#[derive(Debug)]
pub enum ProxyError {
    Read(io::Error),
    Write { written: usize, source: io::Error },
    EndOfStream,
    LineTooLong,
    MalformedRequest(String),
    Connect(io::Error),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "read error: {err}"),
            Self::Write { written, source } => {
                write!(f, "write error after {written} bytes: {source}")
            }
            Self::EndOfStream => write!(f, "peer closed connection before a line terminator"),
            Self::LineTooLong => write!(f, "line exceeded the maximum length without a terminator"),
            Self::MalformedRequest(reason) => write!(f, "malformed request: {reason}"),
            Self::Connect(err) => write!(f, "could not connect to origin: {err}"),
        }
    }
}

impl std::error::Error for ProxyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(err) | Self::Connect(err) => Some(err),
            Self::Write { source, .. } => Some(source),
            Self::EndOfStream | Self::LineTooLong | Self::MalformedRequest(_) => None,
        }
    }
}
