//! Absolute-form HTTP URI parser: splits a URI of shape
//! `http://host[:port]/path...` into host, port, and path.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUri {
    pub host: String,
    pub port: String,
    pub path: String,
}

/// Parses an absolute-form HTTP URI with no validation beyond the
/// split itself — malformed input just yields a best-effort result,
/// since rejecting garbage input is the caller's responsibility.
pub fn parse_uri(uri: &str) -> ParsedUri {
    let authority_start = uri.find("//").map_or(0, |pos| pos + 2);
    let rest = &uri[authority_start..];

    let (authority, path) = match rest.find('/') {
        Some(pos) => (&rest[..pos], rest[pos..].to_string()),
        None => (rest, "/".to_string()),
    };

    let (host, port) = match authority.find(':') {
        Some(pos) => (authority[..pos].to_string(), authority[pos + 1..].to_string()),
        None => (authority.to_string(), "80".to_string()),
    };

    ParsedUri { host, port, path }
}
