use super::{Severity, VulnerabilityRecord, VulnerabilitySource, VulnerabilitySourceKind};
use crate::facts::manifest::DependencyDescriptor;
use crate::facts::{Batching, Fetched, Gateway};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Log target for the OSV source
const LOG_TARGET: &str = "advisories";

/// The community OSV index, queried once per dependency.
#[derive(Debug, Clone)]
pub struct OsvSource {
    gateway: Gateway,
    batching: Batching,
}

impl OsvSource {
    #[must_use]
    pub const fn new(gateway: Gateway, batching: Batching) -> Self {
        Self { gateway, batching }
    }

    async fn query_all(&self, dependencies: &[DependencyDescriptor]) -> Vec<VulnerabilityRecord> {
        let queryable: Vec<&DependencyDescriptor> = dependencies
            .iter()
            .filter(|d| !d.declared_version.is_empty() && d.ecosystem.osv_name().is_some())
            .collect();

        self.batching
            .run(queryable, |dep| self.query(dep))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn query(&self, dep: &DependencyDescriptor) -> Vec<VulnerabilityRecord> {
        let Some(ecosystem) = dep.ecosystem.osv_name() else {
            return Vec::new();
        };

        let request = Query {
            package: QueryPackage {
                name: &dep.name,
                ecosystem,
            },
            version: &dep.declared_version,
        };

        match self.gateway.post_as::<_, QueryResponse>("/v1/query", &request).await {
            Fetched::Found(response) => response.vulns.into_iter().map(|v| v.into_record(&dep.name)).collect(),
            Fetched::Absent => Vec::new(),
            err @ Fetched::Error { .. } => {
                log::debug!(target: LOG_TARGET, "OSV lookup for '{}@{}' failed: {err}", dep.name, dep.declared_version);
                Vec::new()
            }
        }
    }
}

impl VulnerabilitySource for OsvSource {
    fn kind(&self) -> VulnerabilitySourceKind {
        VulnerabilitySourceKind::Osv
    }

    fn lookup<'a>(&'a self, dependencies: &'a [DependencyDescriptor]) -> BoxFuture<'a, Vec<VulnerabilityRecord>> {
        self.query_all(dependencies).boxed()
    }
}

#[derive(Debug, Serialize)]
struct Query<'a> {
    package: QueryPackage<'a>,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct QueryPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    vulns: Vec<Vuln>,
}

#[derive(Debug, Deserialize)]
struct Vuln {
    id: Option<String>,
    summary: Option<String>,
    details: Option<String>,
    #[serde(default)]
    affected: Vec<Affected>,
    database_specific: Option<Value>,
    #[serde(default)]
    severity: Vec<SeverityEntry>,
}

#[derive(Debug, Deserialize)]
struct Affected {
    #[serde(default)]
    ranges: Vec<Range>,
    database_specific: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Range {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    fixed: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeverityEntry {
    #[serde(default)]
    score: Value,
}

impl Vuln {
    fn into_record(self, package: &str) -> VulnerabilityRecord {
        let severity = Severity::resolve(self.label(), self.score());

        let mut fixed_versions: Vec<String> = Vec::new();
        for fixed in self.affected.iter().flat_map(|a| &a.ranges).flat_map(|r| &r.events).filter_map(|e| e.fixed.as_ref()) {
            if !fixed_versions.contains(fixed) {
                fixed_versions.push(fixed.clone());
            }
        }

        VulnerabilityRecord {
            package: package.to_string(),
            severity,
            fixed_versions,
            id: self.id,
            detail: self.summary.or(self.details),
            source: VulnerabilitySourceKind::Osv,
        }
    }

    fn label(&self) -> Option<&str> {
        self.database_specific
            .iter()
            .chain(self.affected.iter().filter_map(|a| a.database_specific.as_ref()))
            .find_map(|db| db.get("severity").and_then(Value::as_str))
    }

    fn score(&self) -> Option<f64> {
        let db = self.database_specific.as_ref();
        db.and_then(|db| db.get("cvss_score"))
            .and_then(as_score)
            .or_else(|| db.and_then(|db| db.pointer("/cvss/score")).and_then(as_score))
            .or_else(|| self.severity.iter().find_map(|s| as_score(&s.score)))
    }
}

/// A numeric score, or a string holding one; CVSS vector strings don't qualify.
fn as_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
