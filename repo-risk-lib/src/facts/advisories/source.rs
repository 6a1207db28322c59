use super::{VulnerabilityRecord, VulnerabilitySourceKind};
use crate::facts::manifest::DependencyDescriptor;
use crate::facts::{Fetched, Gateway, RepoSpec};
use core::fmt::Debug;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::Display;

/// Log target for vulnerability lookups
const LOG_TARGET: &str = "advisories";

/// A provider of vulnerability records for a dependency list.
///
/// Providers are consulted in rank order and the first one that reports anything wins.
pub trait VulnerabilitySource: Debug + Send + Sync {
    fn kind(&self) -> VulnerabilitySourceKind;

    /// Look up vulnerabilities; individual failures are logged and yield no records.
    fn lookup<'a>(&'a self, dependencies: &'a [DependencyDescriptor]) -> BoxFuture<'a, Vec<VulnerabilityRecord>>;
}

/// Whether the hosting service's own vulnerability alerting can be used for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum AlertsStatus {
    Enabled,
    Disabled,
    Unavailable,
}

impl AlertsStatus {
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// Ask whether vulnerability alerts are switched on (204 means yes, 404 means no).
pub async fn check_alerts(gateway: &Gateway, repo: &RepoSpec) -> AlertsStatus {
    match gateway.fetch(&format!("{}/vulnerability-alerts", repo.api_path())).await {
        Fetched::Found(_) => AlertsStatus::Enabled,
        Fetched::Absent => AlertsStatus::Disabled,
        err @ Fetched::Error { .. } => {
            log::debug!(target: LOG_TARGET, "Vulnerability alert status unavailable for '{repo}': {err}");
            AlertsStatus::Unavailable
        }
    }
}

/// Try each source in order; return the first non-empty result and the source that produced it.
///
/// Records repeated for the same package and identifier are reported once.
pub async fn find_vulnerabilities(
    sources: &[Box<dyn VulnerabilitySource>],
    dependencies: &[DependencyDescriptor],
) -> (Vec<VulnerabilityRecord>, Option<VulnerabilitySourceKind>) {
    for source in sources {
        let records = source.lookup(dependencies).await;
        if records.is_empty() {
            log::debug!(target: LOG_TARGET, "{} reported no vulnerabilities", source.kind());
            continue;
        }

        log::info!(target: LOG_TARGET, "{} reported {} vulnerabilities", source.kind(), records.len());
        return (dedup(records), Some(source.kind()));
    }

    (Vec::new(), None)
}

fn dedup(records: Vec<VulnerabilityRecord>) -> Vec<VulnerabilityRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| r.id.is_none() || seen.insert((r.package.clone(), r.id.clone())))
        .collect()
}
