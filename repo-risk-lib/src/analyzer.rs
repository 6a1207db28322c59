//! The engine entry point: collect facts, score them, and render the report.

use crate::Result;
use crate::config::Config;
use crate::facts::advisories::{self, AlertsStatus, GitHubAdvisorySource, OsvSource, VulnerabilitySource};
use crate::facts::manifest::{self, Manifest};
use crate::facts::{DependencyFacts, Fetched, Gateway, Progress, RepoFacts, RepoSpec, RequestTracker, hosting, probes, registry};
use crate::ranking::{Rating, RiskFactor, RiskScorer, Score};
use crate::reports;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Log target for the analyzer
const LOG_TARGET: &str = "analyzer";

/// The outcome of analyzing one repository.
///
/// This is the shape every caller sees; serialized it reads
/// `{ "markdown": ..., "score": 13 | "N/A", "rating": "Low" | "Medium" | "High" | "N/A", "risk_factors": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub markdown: String,
    pub score: Score,
    pub rating: Rating,
    pub risk_factors: Vec<RiskFactor>,
}

impl AnalysisResult {
    /// A terminal result for an analysis that could not run.
    #[must_use]
    pub fn not_applicable(input: &str, message: &str) -> Self {
        Self {
            markdown: reports::render_error(input, message),
            score: Score::NotApplicable,
            rating: Rating::NotApplicable,
            risk_factors: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_not_applicable(&self) -> bool {
        matches!(self.score, Score::NotApplicable)
    }
}

/// The per-run set of service accessors.
struct Services {
    github: Gateway,
    osv: Gateway,
    hosting: hosting::Provider,
    registry: registry::Provider,
}

impl Services {
    fn new(config: &Config, credential: Option<&str>, tracker: &RequestTracker) -> Result<Self> {
        let timeout = config.request_timeout;
        let github = Gateway::github(&config.github_api_url, credential, timeout, tracker.clone())?;
        let osv = Gateway::public("OSV", &config.osv_api_url, timeout, tracker.clone())?;
        let npm = Gateway::public("npm", &config.npm_registry_url, timeout, tracker.clone())?;
        let pypi = Gateway::public("PyPI", &config.pypi_url, timeout, tracker.clone())?;

        Ok(Self {
            hosting: hosting::Provider::new(github.clone(), config.batching()),
            registry: registry::Provider::new(npm, pypi, config.batching()),
            github,
            osv,
        })
    }
}

/// Analyzes hosted repositories.
///
/// Past identity parsing an analysis never fails: the primary metadata fetch either succeeds
/// and every other fact degrades independently, or the result is `N/A`.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: Config,
    progress: Arc<dyn Progress>,
}

impl Analyzer {
    #[must_use]
    pub fn new(config: Config, progress: Arc<dyn Progress>) -> Self {
        Self { config, progress }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Parse a repository reference (URL or `owner/name`) and analyze it.
    pub async fn analyze_input(&self, input: &str, credential: Option<&str>) -> AnalysisResult {
        match RepoSpec::parse_for_host(input, self.config.web_host().as_deref()) {
            Ok(repo) => self.analyze(&repo, credential).await,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "{e:#}");
                AnalysisResult::not_applicable(input, &format!("{e:#}"))
            }
        }
    }

    /// Analyze a repository as of now.
    pub async fn analyze(&self, repo: &RepoSpec, credential: Option<&str>) -> AnalysisResult {
        self.analyze_at(repo, credential, Utc::now()).await
    }

    /// Analyze a repository, measuring every age relative to `now`.
    pub async fn analyze_at(&self, repo: &RepoSpec, credential: Option<&str>, now: DateTime<Utc>) -> AnalysisResult {
        let result = match self.collect(repo, credential, now).await {
            Ok(facts) => {
                self.progress.set_phase("Scoring");
                let assessment = RiskScorer::new(&self.config).score(&facts);
                log::info!(
                    target: LOG_TARGET,
                    "'{repo}' scored {} ({}) from {} risk factors",
                    assessment.score,
                    assessment.rating,
                    assessment.factors.len()
                );

                AnalysisResult {
                    markdown: reports::render_markdown(&facts, &assessment),
                    score: Score::Points(assessment.score),
                    rating: assessment.rating,
                    risk_factors: assessment.factors,
                }
            }

            Err(message) => {
                log::warn!(target: LOG_TARGET, "Unable to analyze '{repo}': {message}");
                AnalysisResult::not_applicable(&repo.to_string(), &message)
            }
        };

        self.progress.finish();
        result
    }

    /// Gather every fact about a repository, or explain why the primary fetch failed.
    async fn collect(&self, repo: &RepoSpec, credential: Option<&str>, now: DateTime<Utc>) -> Result<RepoFacts, String> {
        let tracker = RequestTracker::new(Arc::clone(&self.progress));
        let services = Services::new(&self.config, credential, &tracker).map_err(|e| format!("{e:#}"))?;

        self.progress.set_phase("Fetching");
        let snapshot = match services.hosting.fetch_snapshot(repo).await {
            Fetched::Found(snapshot) => snapshot,
            Fetched::Absent => return Err("repository not found".to_string()),
            err @ Fetched::Error { .. } => return Err(format!("fetching repository metadata failed: {err}")),
        };

        self.progress.set_phase("Collecting");
        let (flags, manifest, activity, releases, readme, alerts) = tokio::join!(
            probes::probe_existence(&services.github, repo, &self.config.probes, self.config.probe_batching()),
            manifest::read_manifest(&services.github, repo),
            services.hosting.collect_activity(repo, &snapshot, now),
            services.hosting.collect_releases(repo, now),
            services.hosting.fetch_readme(repo),
            advisories::check_alerts(&services.github, repo),
        );

        self.progress.set_phase("Dependencies");
        let dependencies = self.dependency_facts(&services, repo, manifest, alerts).await;

        log::debug!(target: LOG_TARGET, "Collected facts for '{repo}' with {} requests", tracker.total_issued());

        Ok(RepoFacts {
            repo: repo.clone(),
            collected_at: now,
            snapshot,
            flags,
            activity,
            releases,
            readme,
            dependencies,
        })
    }

    async fn dependency_facts(&self, services: &Services, repo: &RepoSpec, manifest: Manifest, alerts: AlertsStatus) -> DependencyFacts {
        if manifest.dependencies.is_empty() {
            return DependencyFacts {
                manifest_kind: manifest.kind,
                ..DependencyFacts::empty(alerts)
            };
        }

        let mut sources: Vec<Box<dyn VulnerabilitySource>> = Vec::with_capacity(2);
        if alerts.is_enabled() {
            sources.push(Box::new(GitHubAdvisorySource::new(services.github.clone(), repo.clone())));
        }
        sources.push(Box::new(OsvSource::new(services.osv.clone(), self.config.batching())));

        let ((vulnerabilities, vulnerability_source), outdated) = tokio::join!(
            advisories::find_vulnerabilities(&sources, &manifest.dependencies),
            services.registry.find_outdated(&manifest.dependencies),
        );

        DependencyFacts {
            manifest_kind: manifest.kind,
            dependencies: manifest.dependencies,
            vulnerabilities,
            vulnerability_source,
            alerts,
            outdated,
        }
    }
}
