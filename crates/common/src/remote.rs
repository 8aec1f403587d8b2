// Remote URL validation for the `origin` the pattern is pushed to.
//
// Accepts what `git remote add` would accept in practice: URLs with a
// transport scheme, scp-like `user@host:path`, and existing local paths.

use std::path::Path;

use thiserror::Error;
use url::Url;

const SUPPORTED_SCHEMES: &[&str] = &["https", "http", "ssh", "git", "file"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("remote URL is empty")]
    Empty,

    #[error("unsupported remote scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("`{0}` is not a URL, scp-style address, or existing path")]
    Unrecognized(String),
}

/// Validate a remote and return it trimmed.
pub fn validate_remote(remote: &str) -> Result<String, RemoteError> {
    let remote = remote.trim();
    if remote.is_empty() {
        return Err(RemoteError::Empty);
    }

    if let Ok(url) = Url::parse(remote) {
        if SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Ok(remote.to_string());
        }
        // `C:\repo` parses as a URL with scheme `c`.
        if !Path::new(remote).exists() {
            return Err(RemoteError::UnsupportedScheme(url.scheme().to_string()));
        }
        return Ok(remote.to_string());
    }

    if is_scp_like(remote) || Path::new(remote).exists() {
        return Ok(remote.to_string());
    }

    Err(RemoteError::Unrecognized(remote.to_string()))
}

fn is_scp_like(remote: &str) -> bool {
    let Some((host, path)) = remote.split_once(':') else {
        return false;
    };
    let host = host.rsplit_once('@').map_or(host, |(_, host)| host);
    !host.is_empty() && !host.contains('/') && !path.is_empty()
}
