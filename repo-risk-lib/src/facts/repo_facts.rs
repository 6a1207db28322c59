use crate::facts::RepoSpec;
use crate::facts::advisories::{AlertsStatus, Severity, VulnerabilityRecord, VulnerabilitySourceKind};
use crate::facts::hosting::{ActivityMetrics, ReleaseCadence, RepositorySnapshot};
use crate::facts::manifest::{DependencyDescriptor, ManifestKind};
use crate::facts::probes::ExistenceFlags;
use crate::facts::registry::{OutdatedDependencyRecord, Staleness};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything learned about a repository's dependencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyFacts {
    pub manifest_kind: Option<ManifestKind>,
    pub dependencies: Vec<DependencyDescriptor>,
    pub vulnerabilities: Vec<VulnerabilityRecord>,
    pub vulnerability_source: Option<VulnerabilitySourceKind>,
    pub alerts: AlertsStatus,
    pub outdated: Vec<OutdatedDependencyRecord>,
}

impl DependencyFacts {
    /// No dependency data at all, with alerting in the given state.
    #[must_use]
    pub const fn empty(alerts: AlertsStatus) -> Self {
        Self {
            manifest_kind: None,
            dependencies: Vec::new(),
            vulnerabilities: Vec::new(),
            vulnerability_source: None,
            alerts,
            outdated: Vec::new(),
        }
    }

    fn outdated_count(&self, staleness: Staleness) -> usize {
        self.outdated.iter().filter(|o| o.staleness == staleness).count()
    }

    #[must_use]
    pub fn major_outdated_count(&self) -> usize {
        self.outdated_count(Staleness::Major)
    }

    #[must_use]
    pub fn minor_outdated_count(&self) -> usize {
        self.outdated_count(Staleness::Minor)
    }

    #[must_use]
    pub fn patch_outdated_count(&self) -> usize {
        self.outdated_count(Staleness::Patch)
    }

    /// Number of vulnerability records at any of the given severities.
    #[must_use]
    pub fn vulnerability_count(&self, severities: &[Severity]) -> usize {
        self.vulnerabilities.iter().filter(|v| severities.contains(&v.severity)).count()
    }
}

/// Comprehensive facts about a repository collected from the hosting API and the
/// dependency ecosystems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoFacts {
    pub repo: RepoSpec,
    pub collected_at: DateTime<Utc>,
    pub snapshot: RepositorySnapshot,
    pub flags: ExistenceFlags,
    pub activity: ActivityMetrics,

    /// `None` when the release list could not be read.
    pub releases: Option<ReleaseCadence>,

    pub readme: Option<String>,
    pub dependencies: DependencyFacts,
}
