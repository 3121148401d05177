//! Git remote URL parsing and repository identifiers.
//!
//! The repository identifier keys per-repository configuration and is exported
//! to hooks as `WT_REPO_ID`, so it must be stable across runs and machines.

use std::path::Path;

use sha2::{Digest, Sha256};

/// Number of hex characters in fallback identifiers.
const DIGEST_HEX_LEN: usize = 8;

/// Parsed git remote URL: host plus path segments.
///
/// # Supported URL formats
///
/// - `<scheme>://[<user>@]<host>[:<port>]/<path>[.git]` (https, http, ssh, git, ...)
/// - `<user>@<host>:<path>[.git]` (scp-like SSH)
///
/// # Example
///
/// ```
/// use wtm::git::RemoteUrl;
///
/// let url = RemoteUrl::parse("git@github.com:owner/repo.git").unwrap();
/// assert_eq!(url.host(), "github.com");
/// assert_eq!(url.segments(), ["owner", "repo"]);
/// assert_eq!(url.repo_id(), "github.com-owner-repo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    host: String,
    segments: Vec<String>,
}

impl RemoteUrl {
    /// Parse a git remote URL into structured components.
    ///
    /// Returns `None` for unrecognized shapes (local paths, `file://`, empty
    /// host or path).
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();

        let (host, path) = if let Some((scheme, rest)) = url.split_once("://") {
            if scheme.is_empty()
                || !scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
            {
                return None;
            }
            let (authority, path) = rest.split_once('/')?;
            // Drop userinfo, then the port
            let host_port = authority.rsplit('@').next()?;
            let host = host_port.split(':').next()?;
            (host, path)
        } else {
            // user@host:path; the user part is required so that local paths
            // like `C:\repo` or `../repo` never match
            let (user_host, path) = url.split_once(':')?;
            let (user, host) = user_host.split_once('@')?;
            if user.is_empty() || host.contains('/') {
                return None;
            }
            (host, path)
        };

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if host.is_empty() || segments.is_empty() {
            return None;
        }

        Some(Self {
            host: host.to_string(),
            segments,
        })
    }

    /// The hostname (e.g., "github.com", "gitlab.example.com").
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path segments without the `.git` suffix (e.g., `["owner", "repo"]`).
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// `host-seg1-seg2...`
    pub fn repo_id(&self) -> String {
        let mut id = self.host.clone();
        for segment in &self.segments {
            id.push('-');
            id.push_str(segment);
        }
        id
    }
}

/// Short hex digest: the first 8 hex characters of SHA-256.
pub(crate) fn short_digest(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(DIGEST_HEX_LEN);
    for byte in digest.iter().take(DIGEST_HEX_LEN / 2) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// Repository identifier derived from a remote URL.
///
/// Recognized URLs give `host-path-segments`; anything else gives
/// `repo-<digest of the url>`.
pub fn repo_id_for_url(url: &str) -> String {
    match RemoteUrl::parse(url) {
        Some(parsed) => parsed.repo_id(),
        None => format!("repo-{}", short_digest(url.trim())),
    }
}

/// Repository identifier for a repository without a remote:
/// `<basename>-<digest of the absolute path>`.
pub fn repo_id_for_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repo".to_string());
    format!("{name}-{}", short_digest(&path.to_string_lossy()))
}
