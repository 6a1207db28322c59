use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    /// SPDX identifier as reported by the host; `NOASSERTION` for unrecognized licenses.
    pub spdx_id: Option<String>,
    pub name: String,
}

/// Repository metadata from the primary fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub size_kb: u64,
    pub license: Option<LicenseInfo>,
    pub description: Option<String>,
    pub default_branch: Option<String>,
    pub archived: bool,
}

/// Wire shape of `GET /repos/{owner}/{repo}`.
#[derive(Debug, Deserialize)]
pub(super) struct RepoPayload {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    subscribers_count: Option<u64>,
    #[serde(default)]
    watchers_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    license: Option<LicensePayload>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    archived: bool,
}

#[derive(Debug, Deserialize)]
struct LicensePayload {
    spdx_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl From<RepoPayload> for RepositorySnapshot {
    fn from(payload: RepoPayload) -> Self {
        Self {
            created_at: payload.created_at,
            updated_at: payload.updated_at,
            stars: payload.stargazers_count,
            forks: payload.forks_count,
            watchers: payload.subscribers_count.unwrap_or(payload.watchers_count),
            open_issues: payload.open_issues_count,
            size_kb: payload.size,
            license: payload.license.map(|l| LicenseInfo {
                name: l.name.or_else(|| l.spdx_id.clone()).unwrap_or_default(),
                spdx_id: l.spdx_id,
            }),
            description: payload.description.filter(|d| !d.trim().is_empty()),
            default_branch: payload.default_branch,
            archived: payload.archived,
        }
    }
}
