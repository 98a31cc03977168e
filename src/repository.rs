use crate::errors::{AutomergeError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// `owner/name` pair used to address the repository on the REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySlug {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The repository given on the command line.
///
/// Accepts `https://host/owner/repo`, `git@host:owner/repo`,
/// `ssh://git@host/owner/repo` and local paths or `file://` URLs, with or
/// without a trailing `.git`.
///
/// For remote URLs the slug is the first two path segments, so web URLs such
/// as `https://github.com/acme/widgets/tree/main` still name `acme/widgets`.
/// Local paths have no such prefix and use their last two segments instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryUrl {
    raw: String,
    host: Option<String>,
    slug: RepositorySlug,
}

fn remote_re() -> &'static Regex {
    static REMOTE_RE: OnceLock<Regex> = OnceLock::new();
    REMOTE_RE.get_or_init(|| {
        Regex::new(
            r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*://(?:[^@/]+@)?(?P<host>[^/:]*(?::\d+)?)/|[^@/:]+@(?P<scp_host>[^/:]+):)(?P<path>.*)$",
        )
        .expect("remote URL pattern is valid")
    })
}

fn segment_re() -> &'static Regex {
    static SEGMENT_RE: OnceLock<Regex> = OnceLock::new();
    SEGMENT_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("segment pattern is valid"))
}

impl RepositoryUrl {
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let invalid = |reason: &str| {
            AutomergeError::SourceUnavailable(format!("'{}' {}", raw, reason))
        };

        if raw.is_empty() {
            return Err(invalid("is not a repository URL"));
        }

        let (host, path, remote) = match remote_re().captures(raw) {
            Some(captures) => {
                let host = captures
                    .name("host")
                    .or_else(|| captures.name("scp_host"))
                    .map(|m| m.as_str().to_string())
                    .filter(|h| !h.is_empty());
                let path = captures.name("path").map_or("", |m| m.as_str());
                let remote = host.is_some();
                (host, path, remote)
            }
            None => (None, raw, false),
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let pair = if remote {
            segments.get(..2)
        } else {
            segments.len().checked_sub(2).map(|start| &segments[start..])
        };
        let Some([owner, name]) = pair else {
            return Err(invalid("does not name an owner and a repository"));
        };
        let name = name.strip_suffix(".git").unwrap_or(*name);
        if !segment_re().is_match(owner) || !segment_re().is_match(name) {
            return Err(invalid("contains an invalid owner or repository name"));
        }

        Ok(RepositoryUrl {
            raw: raw.to_string(),
            host,
            slug: RepositorySlug {
                owner: owner.to_string(),
                name: name.to_string(),
            },
        })
    }

    /// The URL handed to git, unchanged.
    pub fn clone_url(&self) -> &str {
        &self.raw
    }

    /// Remote host including any explicit port, `None` for local
    /// repositories.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn slug(&self) -> &RepositorySlug {
        &self.slug
    }
}

impl fmt::Display for RepositoryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
