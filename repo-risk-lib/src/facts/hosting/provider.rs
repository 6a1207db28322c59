use super::activity::{
    self, CommitPayload, ContributorPayload, CreatedPayload, IssuePayload, ReleasePayload, UserPayload, LONG_LIVED_PULL_REQUEST_DAYS,
    MAX_PROFILED_CONTRIBUTORS,
};
use super::snapshot::RepoPayload;
use super::{ActivityMetrics, ContributorProfile, ReleaseCadence, RepositorySnapshot, ResponseTimeSample};
use crate::facts::manifest::fetch_decoded;
use crate::facts::{Batching, Fetched, Gateway, RepoSpec};
use chrono::{DateTime, Utc};

/// Log target for the hosting provider
const LOG_TARGET: &str = "hosting";

/// Collects repository metadata and activity counters from the hosting API.
#[derive(Debug, Clone)]
pub struct Provider {
    gateway: Gateway,
    batching: Batching,
}

impl Provider {
    #[must_use]
    pub const fn new(gateway: Gateway, batching: Batching) -> Self {
        Self { gateway, batching }
    }

    /// The primary fetch; every other fact depends on this succeeding.
    pub async fn fetch_snapshot(&self, repo: &RepoSpec) -> Fetched<RepositorySnapshot> {
        self.gateway.fetch_as::<RepoPayload>(&repo.api_path()).await.map(RepositorySnapshot::from)
    }

    /// Gather the activity counters, relative to `now`.
    pub async fn collect_activity(&self, repo: &RepoSpec, snapshot: &RepositorySnapshot, now: DateTime<Utc>) -> ActivityMetrics {
        let (days_since_last_commit, contributors, long_lived_pull_requests, long_lived_issues, response_time) = tokio::join!(
            self.days_since_last_commit(repo, now),
            self.contributors(repo),
            self.long_lived_pull_requests(repo, now),
            self.long_lived_issues(repo, now),
            self.response_time(repo),
        );

        let (contributor_count, contributors) = match contributors {
            Some((count, profiles)) => (Some(count), profiles),
            None => (None, Vec::new()),
        };

        ActivityMetrics {
            project_age_days: activity::days_between(snapshot.created_at, now),
            days_since_last_commit,
            contributor_count,
            average_contributor_account_age_days: activity::average_account_age(&contributors, now),
            contributors,
            long_lived_pull_requests,
            long_lived_issues,
            response_time,
        }
    }

    /// Release count, recency, and tagging discipline; `None` when the list is unavailable.
    pub async fn collect_releases(&self, repo: &RepoSpec, now: DateTime<Utc>) -> Option<ReleaseCadence> {
        let releases: Vec<ReleasePayload> = self.list(repo, "releases?per_page=100").await?;
        Some(activity::release_cadence(&releases, now))
    }

    /// The decoded README text, if the repository has one.
    pub async fn fetch_readme(&self, repo: &RepoSpec) -> Option<String> {
        match fetch_decoded(&self.gateway, &format!("{}/readme", repo.api_path())).await {
            Fetched::Found(text) => Some(text),
            Fetched::Absent => None,
            err @ Fetched::Error { .. } => {
                log::debug!(target: LOG_TARGET, "Could not read the README of '{repo}': {err}");
                None
            }
        }
    }

    /// Fetch a list endpoint; `Absent` and an empty body (204) read as empty, `Error` as unknown.
    async fn list<T>(&self, repo: &RepoSpec, query: &str) -> Option<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let fetched = self.gateway.fetch_as::<Option<Vec<T>>>(&format!("{}/{query}", repo.api_path())).await;
        if fetched.is_error() {
            log::debug!(target: LOG_TARGET, "Could not list '{query}' for '{repo}': {fetched}");
        }
        fetched.found_or_default().map(Option::unwrap_or_default)
    }

    async fn days_since_last_commit(&self, repo: &RepoSpec, now: DateTime<Utc>) -> Option<i64> {
        let commits: Vec<CommitPayload> = self.list(repo, "commits?per_page=100").await?;
        activity::latest_commit_date(&commits).map(|date| activity::days_between(date, now))
    }

    async fn contributors(&self, repo: &RepoSpec) -> Option<(usize, Vec<ContributorProfile>)> {
        let contributors: Vec<ContributorPayload> = self.list(repo, "contributors?per_page=100").await?;
        let logins = contributors.iter().filter_map(|c| c.login.clone()).take(MAX_PROFILED_CONTRIBUTORS);

        let profiles = self
            .batching
            .run(logins, |login| async move {
                let account_created_at = match self.gateway.fetch_as::<UserPayload>(&format!("/users/{login}")).await {
                    Fetched::Found(user) => user.created_at,
                    other => {
                        log::debug!(target: LOG_TARGET, "No profile for contributor '{login}': {other}");
                        None
                    }
                };
                ContributorProfile { login, account_created_at }
            })
            .await;

        Some((contributors.len(), profiles))
    }

    async fn long_lived_pull_requests(&self, repo: &RepoSpec, now: DateTime<Utc>) -> Option<usize> {
        let pulls: Vec<CreatedPayload> = self.list(repo, "pulls?state=open&per_page=100").await?;
        Some(activity::count_older_than(
            pulls.iter().map(|p| p.created_at),
            now,
            LONG_LIVED_PULL_REQUEST_DAYS,
        ))
    }

    async fn long_lived_issues(&self, repo: &RepoSpec, now: DateTime<Utc>) -> Option<usize> {
        let issues: Vec<IssuePayload> = self.list(repo, "issues?state=open&per_page=100").await?;
        Some(activity::long_lived_issues(&issues, now))
    }

    async fn response_time(&self, repo: &RepoSpec) -> Option<ResponseTimeSample> {
        let issues: Vec<IssuePayload> = self
            .list(repo, "issues?state=closed&sort=updated&direction=desc&per_page=30")
            .await?;

        let hours: Vec<f64> = self
            .batching
            .run(activity::response_candidates(&issues), |issue| async move {
                let query = format!("issues/{}/comments?per_page=1", issue.number);
                let comments: Vec<CreatedPayload> = self.list(repo, &query).await?;
                comments
                    .first()
                    .map(|first| activity::response_hours(issue.created_at, first.created_at))
            })
            .await
            .into_iter()
            .flatten()
            .collect();

        activity::summarize_response_times(&hours)
    }
}
