use crate::Result;
use anyhow::{Context, bail};
use core::fmt::{Display, Formatter, Result as FmtResult};
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;
use url::Url;

const GITHUB_HOST: &str = "github.com";

/// Identifies a hosted repository by owner and name.
///
/// Parsed from either the `owner/name` shorthand or any of the usual URL spellings
/// (`https://github.com/owner/name`, `github.com/owner/name.git`, `git@github.com:owner/name.git`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSpec {
    owner: Arc<str>,
    name: Arc<str>,
}

impl RepoSpec {
    /// Create a new repository identity, stripping a trailing `.git` from the name.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is empty or contains characters that cannot appear in
    /// an owner or repository name.
    pub fn new(owner: impl AsRef<str>, name: impl AsRef<str>) -> Result<Self> {
        let owner = owner.as_ref().trim();
        let name = name.as_ref().trim();
        let name = name.strip_suffix(".git").unwrap_or(name);

        validate_part("owner", owner)?;
        validate_part("repository name", name)?;

        Ok(Self {
            owner: Arc::from(owner),
            name: Arc::from(name),
        })
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The API path prefix for this repository, e.g. `/repos/owner/name`.
    #[must_use]
    pub fn api_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.name)
    }
}

fn validate_part(what: &str, part: &str) -> Result<()> {
    if part.is_empty() {
        bail!("{what} is empty");
    }

    if !part.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) {
        bail!("{what} '{part}' contains invalid characters");
    }

    Ok(())
}

fn split_owner_and_name(path: &str, exact: bool) -> Option<(&str, &str)> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let name = segments.next()?;
    if exact && segments.next().is_some() {
        return None;
    }
    Some((owner, name))
}

impl RepoSpec {
    /// Parse a repository reference, additionally accepting URLs on `web_host`.
    ///
    /// Without a `web_host` only `github.com` URLs are accepted; a GitHub Enterprise
    /// deployment passes its own host here.
    ///
    /// # Errors
    ///
    /// Returns an error if the input names no owner and repository, or names a host other
    /// than the accepted ones.
    pub fn parse_for_host(input: &str, web_host: Option<&str>) -> Result<Self> {
        let input = input.trim();
        let accepts = |host: &str| {
            let host = host.trim_start_matches("www.");
            host.eq_ignore_ascii_case(GITHUB_HOST) || web_host.is_some_and(|h| host.eq_ignore_ascii_case(h))
        };

        let (owner, name) = if let Some(rest) = input.strip_prefix("git@") {
            let (host, path) = rest
                .split_once(':')
                .with_context(|| format!("parsing repository specifier '{input}': missing ':' in SSH form"))?;
            if !accepts(host) {
                bail!("repository host '{host}' in '{input}' is not supported");
            }
            split_owner_and_name(path, false)
        } else if input.contains("://") {
            let url = Url::parse(input).with_context(|| format!("parsing repository URL '{input}'"))?;
            let Some(host) = url.host_str() else {
                bail!("repository URL '{input}' has no host");
            };
            if !accepts(host) {
                bail!("repository host '{host}' in '{input}' is not supported");
            }
            return split_owner_and_name(url.path(), false)
                .with_context(|| format!("repository URL '{input}' does not name an owner and repository"))
                .and_then(|(owner, name)| Self::new(owner, name));
        } else if let Some((host, rest)) = input.split_once('/').filter(|(host, rest)| host.contains('.') && rest.contains('/')) {
            if !accepts(host) {
                bail!("repository host '{host}' in '{input}' is not supported");
            }
            split_owner_and_name(rest, false)
        } else {
            split_owner_and_name(input, true)
        }
        .with_context(|| format!("parsing repository specifier '{input}': expected 'owner/name' or a repository URL"))?;

        Self::new(owner, name)
    }
}

impl FromStr for RepoSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_for_host(s, None)
    }
}

impl Display for RepoSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Serialize for RepoSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RepoSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
