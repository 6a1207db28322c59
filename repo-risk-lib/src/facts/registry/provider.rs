use super::OutdatedDependencyRecord;
use crate::facts::manifest::{DependencyDescriptor, Ecosystem};
use crate::facts::{Batching, Fetched, Gateway};
use serde::Deserialize;

/// Log target for registry lookups
const LOG_TARGET: &str = "registry";

#[derive(Debug, Deserialize)]
struct NpmLatest {
    version: String,
}

#[derive(Debug, Deserialize)]
struct PyPiProject {
    info: PyPiInfo,
}

#[derive(Debug, Deserialize)]
struct PyPiInfo {
    version: String,
}

/// A package name as a single path segment; scoped names (`@scope/pkg`) keep their scope.
fn npm_package_segment(name: &str) -> String {
    name.replace('/', "%2F")
}

/// Looks up the latest published versions of dependencies in their package registries.
#[derive(Debug, Clone)]
pub struct Provider {
    npm: Gateway,
    pypi: Gateway,
    batching: Batching,
}

impl Provider {
    #[must_use]
    pub const fn new(npm: Gateway, pypi: Gateway, batching: Batching) -> Self {
        Self { npm, pypi, batching }
    }

    /// The latest version of one dependency, or `None` for ecosystems without a registry.
    pub async fn latest_version(&self, dep: &DependencyDescriptor) -> Option<Fetched<String>> {
        match dep.ecosystem {
            Ecosystem::Npm => Some(
                self.npm
                    .fetch_as::<NpmLatest>(&format!("/{}/latest", npm_package_segment(&dep.name)))
                    .await
                    .map(|l| l.version),
            ),
            Ecosystem::PyPI => Some(
                self.pypi
                    .fetch_as::<PyPiProject>(&format!("/pypi/{}/json", dep.name))
                    .await
                    .map(|p| p.info.version),
            ),
            Ecosystem::Maven | Ecosystem::Unknown => None,
        }
    }

    /// Find every dependency whose declared version trails the registry's latest release.
    pub async fn find_outdated(&self, dependencies: &[DependencyDescriptor]) -> Vec<OutdatedDependencyRecord> {
        let lookups = dependencies.iter().filter(|d| !d.declared_version.is_empty());

        self.batching
            .run(lookups, |dep| async move {
                match self.latest_version(dep).await? {
                    Fetched::Found(latest) => OutdatedDependencyRecord::compare(&dep.name, &dep.declared_version, &latest),
                    Fetched::Absent => {
                        log::debug!(target: LOG_TARGET, "'{}' is not published in the {} registry", dep.name, dep.ecosystem);
                        None
                    }
                    err @ Fetched::Error { .. } => {
                        log::debug!(target: LOG_TARGET, "Latest version lookup for '{}' failed: {err}", dep.name);
                        None
                    }
                }
            })
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{NoProgress, RequestTracker};
    use core::time::Duration;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dependency(name: &str, version: &str, ecosystem: Ecosystem) -> DependencyDescriptor {
        DependencyDescriptor {
            name: name.to_string(),
            declared_version: version.to_string(),
            ecosystem,
        }
    }

    fn provider(server: &MockServer) -> Provider {
        let tracker = RequestTracker::new(Arc::new(NoProgress));
        let npm = Gateway::public("npm", &server.uri(), Duration::from_secs(5), tracker.clone()).unwrap();
        let pypi = Gateway::public("PyPI", &server.uri(), Duration::from_secs(5), tracker).unwrap();
        Provider::new(npm, pypi, Batching::new(4, Duration::ZERO))
    }

    #[test]
    fn test_scoped_npm_names_stay_one_segment() {
        assert_eq!(npm_package_segment("@types/node"), "@types%2Fnode");
        assert_eq!(npm_package_segment("left-pad"), "left-pad");
    }

    #[tokio::test]
    async fn test_find_outdated_across_registries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/@types%2Fnode/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "version": "20.11.0" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pypi/requests/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "info": { "version": "2.32.3" } })))
            .mount(&server)
            .await;

        let dependencies = [
            dependency("@types/node", "18.0.0", Ecosystem::Npm),
            dependency("requests", "2.31.0", Ecosystem::PyPI),
            dependency("unpublished", "1.0.0", Ecosystem::Npm),
            dependency("junit", "4.13.2", Ecosystem::Maven),
        ];
        let outdated = provider(&server).find_outdated(&dependencies).await;

        let names: Vec<_> = outdated.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["@types/node", "requests"]);
        assert_eq!(outdated[0].latest_version, "20.11.0");
        assert_eq!(outdated[1].latest_version, "2.32.3");

        // the Maven entry never reaches a registry
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }
}
