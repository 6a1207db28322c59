//! Batched existence checks over named sets of candidate paths.

use super::{Batching, Fetched, Gateway, RepoSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Log target for probes
const LOG_TARGET: &str = "probes";

/// A capability inferred from the presence of one or more repository paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProbeCategory {
    HasTests,
    HasCi,
    HasDocs,
    HasLintConfig,
    HasContributing,
    HasSecurityPolicy,
    HasReadme,
    HasDependencyManifest,
}

impl ProbeCategory {
    /// The candidate paths probed for this category unless configured otherwise.
    #[must_use]
    pub const fn default_candidates(self) -> &'static [&'static str] {
        match self {
            Self::HasTests => &["tests", "test", "__tests__", "spec"],
            Self::HasCi => &[
                ".github/workflows",
                ".travis.yml",
                ".circleci",
                ".gitlab-ci.yml",
                "Jenkinsfile",
                "azure-pipelines.yml",
            ],
            Self::HasDocs => &["docs", "doc", "documentation"],
            Self::HasLintConfig => &[
                ".eslintrc",
                ".eslintrc.js",
                ".eslintrc.json",
                ".prettierrc",
                ".flake8",
                ".pylintrc",
                "rustfmt.toml",
                ".rustfmt.toml",
                ".editorconfig",
            ],
            Self::HasContributing => &["CONTRIBUTING.md", ".github/CONTRIBUTING.md", "docs/CONTRIBUTING.md"],
            Self::HasSecurityPolicy => &["SECURITY.md", ".github/SECURITY.md", "docs/SECURITY.md"],
            Self::HasReadme => &["README.md", "README", "README.rst", "README.txt", "readme.md"],
            Self::HasDependencyManifest => &[
                "package.json",
                "requirements.txt",
                "pom.xml",
                "build.gradle",
                "Cargo.toml",
                "go.mod",
                "Gemfile",
                "composer.json",
                "pyproject.toml",
            ],
        }
    }
}

/// Mapping from category to the ordered candidate paths that establish it.
///
/// Categories left out of a configuration file keep their default candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<ProbeCategory, Vec<String>>", into = "BTreeMap<ProbeCategory, Vec<String>>")]
pub struct ProbeSet(BTreeMap<ProbeCategory, Vec<String>>);

impl ProbeSet {
    #[must_use]
    pub fn candidates(&self, category: ProbeCategory) -> &[String] {
        self.0.get(&category).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProbeCategory, &[String])> {
        self.0.iter().map(|(category, paths)| (*category, paths.as_slice()))
    }
}

impl Default for ProbeSet {
    fn default() -> Self {
        Self::from(BTreeMap::new())
    }
}

impl From<BTreeMap<ProbeCategory, Vec<String>>> for ProbeSet {
    fn from(mut map: BTreeMap<ProbeCategory, Vec<String>>) -> Self {
        for category in ProbeCategory::iter() {
            let _ = map
                .entry(category)
                .or_insert_with(|| category.default_candidates().iter().map(ToString::to_string).collect());
        }
        Self(map)
    }
}

impl From<ProbeSet> for BTreeMap<ProbeCategory, Vec<String>> {
    fn from(set: ProbeSet) -> Self {
        set.0
    }
}

/// Boolean capability flags for a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[expect(clippy::struct_excessive_bools, reason = "These are independent facts, not a state machine")]
pub struct ExistenceFlags {
    pub has_tests: bool,
    pub has_ci: bool,
    pub has_docs: bool,
    pub has_lint_config: bool,
    pub has_contributing: bool,
    pub has_security_policy: bool,
    pub has_readme: bool,
    pub has_dependency_manifest: bool,
}

impl ExistenceFlags {
    #[must_use]
    pub const fn get(&self, category: ProbeCategory) -> bool {
        match category {
            ProbeCategory::HasTests => self.has_tests,
            ProbeCategory::HasCi => self.has_ci,
            ProbeCategory::HasDocs => self.has_docs,
            ProbeCategory::HasLintConfig => self.has_lint_config,
            ProbeCategory::HasContributing => self.has_contributing,
            ProbeCategory::HasSecurityPolicy => self.has_security_policy,
            ProbeCategory::HasReadme => self.has_readme,
            ProbeCategory::HasDependencyManifest => self.has_dependency_manifest,
        }
    }

    pub const fn set(&mut self, category: ProbeCategory, value: bool) {
        let flag = match category {
            ProbeCategory::HasTests => &mut self.has_tests,
            ProbeCategory::HasCi => &mut self.has_ci,
            ProbeCategory::HasDocs => &mut self.has_docs,
            ProbeCategory::HasLintConfig => &mut self.has_lint_config,
            ProbeCategory::HasContributing => &mut self.has_contributing,
            ProbeCategory::HasSecurityPolicy => &mut self.has_security_policy,
            ProbeCategory::HasReadme => &mut self.has_readme,
            ProbeCategory::HasDependencyManifest => &mut self.has_dependency_manifest,
        };
        *flag = value;
    }

    /// Fold individual probe results into per-category flags.
    ///
    /// A category is set iff at least one of its probes was found; errors count as absent.
    #[must_use]
    pub fn from_probes<T>(results: impl IntoIterator<Item = (ProbeCategory, Fetched<T>)>) -> Self {
        let mut flags = Self::default();
        for (category, outcome) in results {
            if outcome.is_found() {
                flags.set(category, true);
            }
        }
        flags
    }
}

/// Probe every candidate path of every category and reduce the results to flags.
pub async fn probe_existence(gateway: &Gateway, repo: &RepoSpec, probes: &ProbeSet, batching: Batching) -> ExistenceFlags {
    let base = repo.api_path();
    let base = base.as_str();
    let requests: Vec<(ProbeCategory, String)> = probes
        .iter()
        .flat_map(|(category, paths)| paths.iter().map(move |path| (category, format!("{base}/contents/{path}"))))
        .collect();

    log::debug!(target: LOG_TARGET, "Probing {} candidate paths for '{repo}'", requests.len());

    let results = batching
        .run(requests, |(category, path)| async move {
            let outcome = gateway.fetch(&path).await;
            if outcome.is_error() {
                log::debug!(target: LOG_TARGET, "Treating failed probe '{path}' as absent: {outcome}");
            }
            (category, outcome)
        })
        .await;

    ExistenceFlags::from_probes(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_probe_set_covers_every_category() {
        let set = ProbeSet::default();
        for category in ProbeCategory::iter() {
            assert!(!set.candidates(category).is_empty(), "{category} has no candidates");
        }
        assert_eq!(set.candidates(ProbeCategory::HasTests), ["tests", "test", "__tests__", "spec"]);
    }

    #[test]
    fn test_partial_configuration_keeps_other_defaults() {
        let mut map = BTreeMap::new();
        let _ = map.insert(ProbeCategory::HasDocs, vec!["manual".to_string()]);
        let set = ProbeSet::from(map);
        assert_eq!(set.candidates(ProbeCategory::HasDocs), ["manual"]);
        assert_eq!(set.candidates(ProbeCategory::HasCi).len(), ProbeCategory::HasCi.default_candidates().len());
    }

    #[test]
    fn test_flag_is_or_over_candidates() {
        let flags = ExistenceFlags::from_probes([
            (ProbeCategory::HasTests, Fetched::<()>::Absent),
            (ProbeCategory::HasTests, Fetched::Found(())),
            (ProbeCategory::HasCi, Fetched::Absent),
            (ProbeCategory::HasCi, Fetched::Absent),
        ]);
        assert!(flags.has_tests);
        assert!(!flags.has_ci);
        assert!(!flags.has_docs);
    }

    #[test]
    fn test_errors_count_as_absent() {
        let flags = ExistenceFlags::from_probes([
            (ProbeCategory::HasSecurityPolicy, Fetched::<()>::error(Some(500), "boom")),
            (ProbeCategory::HasReadme, Fetched::error(None, "timeout")),
            (ProbeCategory::HasReadme, Fetched::Found(())),
        ]);
        assert!(!flags.has_security_policy);
        assert!(flags.has_readme);
    }

    #[test]
    fn test_get_and_set_agree() {
        let mut flags = ExistenceFlags::default();
        for category in ProbeCategory::iter() {
            assert!(!flags.get(category));
            flags.set(category, true);
            assert!(flags.get(category));
        }
    }

    #[tokio::test]
    async fn test_existence_checks_over_http() {
        use crate::facts::{NoProgress, RequestTracker};
        use core::time::Duration;
        use std::sync::Arc;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/contents/test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "type": "dir" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/contents/docs"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let tracker = RequestTracker::new(Arc::new(NoProgress));
        let gateway = Gateway::github(&server.uri(), None, Duration::from_secs(5), tracker).unwrap();
        let repo = RepoSpec::new("octo", "widgets").unwrap();
        let probes = ProbeSet::default();

        let flags = probe_existence(&gateway, &repo, &probes, Batching::new(4, Duration::ZERO)).await;

        assert!(flags.has_tests);
        assert!(!flags.has_docs);
        assert!(!flags.has_ci);

        let expected: usize = probes.iter().map(|(_, paths)| paths.len()).sum();
        assert_eq!(server.received_requests().await.unwrap().len(), expected);
    }

    #[test]
    fn test_category_names() {
        assert_eq!(ProbeCategory::HasLintConfig.to_string(), "has_lint_config");
        assert_eq!(ProbeCategory::HasCi.to_string(), "has_ci");
    }
}
