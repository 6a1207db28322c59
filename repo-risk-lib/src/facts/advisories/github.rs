use super::{Severity, VulnerabilityRecord, VulnerabilitySource, VulnerabilitySourceKind};
use crate::facts::manifest::DependencyDescriptor;
use crate::facts::{Fetched, Gateway, RepoSpec};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;

/// Log target for the GitHub advisory source
const LOG_TARGET: &str = "advisories";

/// Open Dependabot alerts of the analyzed repository.
///
/// Only ranked when the repository has vulnerability alerting enabled.
#[derive(Debug, Clone)]
pub struct GitHubAdvisorySource {
    gateway: Gateway,
    repo: RepoSpec,
}

impl GitHubAdvisorySource {
    #[must_use]
    pub const fn new(gateway: Gateway, repo: RepoSpec) -> Self {
        Self { gateway, repo }
    }

    async fn fetch_alerts(&self) -> Vec<VulnerabilityRecord> {
        let path = format!("{}/dependabot/alerts?state=open&per_page=100", self.repo.api_path());
        match self.gateway.fetch_as::<Vec<Alert>>(&path).await {
            Fetched::Found(alerts) => alerts.into_iter().map(Alert::into_record).collect(),
            Fetched::Absent => Vec::new(),
            err @ Fetched::Error { .. } => {
                log::debug!(target: LOG_TARGET, "Could not read Dependabot alerts for '{}': {err}", self.repo);
                Vec::new()
            }
        }
    }
}

impl VulnerabilitySource for GitHubAdvisorySource {
    fn kind(&self) -> VulnerabilitySourceKind {
        VulnerabilitySourceKind::GitHubAdvisory
    }

    fn lookup<'a>(&'a self, _dependencies: &'a [DependencyDescriptor]) -> BoxFuture<'a, Vec<VulnerabilityRecord>> {
        self.fetch_alerts().boxed()
    }
}

#[derive(Debug, Deserialize)]
struct Alert {
    #[serde(default)]
    dependency: Option<AlertDependency>,
    #[serde(default)]
    security_advisory: Option<Advisory>,
    #[serde(default)]
    security_vulnerability: Option<AdvisoryVulnerability>,
}

#[derive(Debug, Deserialize)]
struct AlertDependency {
    package: Option<Package>,
}

#[derive(Debug, Deserialize)]
struct Package {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Advisory {
    ghsa_id: Option<String>,
    cve_id: Option<String>,
    summary: Option<String>,
    severity: Option<String>,
    cvss: Option<Cvss>,
}

#[derive(Debug, Deserialize)]
struct Cvss {
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AdvisoryVulnerability {
    package: Option<Package>,
    severity: Option<String>,
    first_patched_version: Option<PatchedVersion>,
}

#[derive(Debug, Deserialize)]
struct PatchedVersion {
    identifier: String,
}

impl Alert {
    fn into_record(self) -> VulnerabilityRecord {
        let advisory = self.security_advisory;
        let vulnerability = self.security_vulnerability;

        let package = self
            .dependency
            .and_then(|d| d.package)
            .map(|p| p.name)
            .or_else(|| vulnerability.as_ref().and_then(|v| v.package.as_ref()).map(|p| p.name.clone()))
            .unwrap_or_else(|| "unknown".to_string());

        let label = advisory
            .as_ref()
            .and_then(|a| a.severity.as_deref())
            .or_else(|| vulnerability.as_ref().and_then(|v| v.severity.as_deref()));
        let score = advisory.as_ref().and_then(|a| a.cvss.as_ref()).and_then(|c| c.score).filter(|s| *s > 0.0);

        VulnerabilityRecord {
            package,
            severity: Severity::resolve(label, score),
            fixed_versions: vulnerability
                .and_then(|v| v.first_patched_version)
                .map(|p| vec![p.identifier])
                .unwrap_or_default(),
            id: advisory.as_ref().and_then(|a| a.ghsa_id.clone().or_else(|| a.cve_id.clone())),
            detail: advisory.and_then(|a| a.summary),
            source: VulnerabilitySourceKind::GitHubAdvisory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_into_record() {
        let alert: Alert = serde_json::from_str(
            r#"{
                "number": 7,
                "state": "open",
                "dependency": { "package": { "ecosystem": "npm", "name": "lodash" }, "manifest_path": "package.json" },
                "security_advisory": {
                    "ghsa_id": "GHSA-35jh-r3h4-6jhm",
                    "cve_id": "CVE-2021-23337",
                    "summary": "Command injection in lodash",
                    "severity": "high",
                    "cvss": { "score": 7.2 }
                },
                "security_vulnerability": {
                    "package": { "ecosystem": "npm", "name": "lodash" },
                    "severity": "high",
                    "first_patched_version": { "identifier": "4.17.21" }
                }
            }"#,
        )
        .unwrap();

        let record = alert.into_record();
        assert_eq!(record.package, "lodash");
        assert_eq!(record.severity, Severity::High);
        assert_eq!(record.fixed_versions, ["4.17.21"]);
        assert_eq!(record.id.as_deref(), Some("GHSA-35jh-r3h4-6jhm"));
        assert_eq!(record.detail.as_deref(), Some("Command injection in lodash"));
        assert_eq!(record.source, VulnerabilitySourceKind::GitHubAdvisory);
    }

    #[test]
    fn test_moderate_label_and_missing_patch() {
        let alert: Alert = serde_json::from_str(
            r#"{
                "security_advisory": { "severity": "moderate" },
                "security_vulnerability": { "package": { "name": "minimist" }, "first_patched_version": null }
            }"#,
        )
        .unwrap();

        let record = alert.into_record();
        assert_eq!(record.package, "minimist");
        assert_eq!(record.severity, Severity::Medium);
        assert!(record.fixed_versions.is_empty());
        assert_eq!(record.id, None);
    }

    #[test]
    fn test_score_used_without_label() {
        let alert: Alert = serde_json::from_str(r#"{ "security_advisory": { "cvss": { "score": 9.8 } } }"#).unwrap();
        assert_eq!(alert.into_record().severity, Severity::Critical);
    }
}
