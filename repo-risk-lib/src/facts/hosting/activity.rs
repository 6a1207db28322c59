use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Open pull requests older than this are considered long-lived.
pub const LONG_LIVED_PULL_REQUEST_DAYS: i64 = 90;

/// Open issues older than this are considered long-lived.
pub const LONG_LIVED_ISSUE_DAYS: i64 = 180;

/// At most this many contributors get a profile lookup.
pub const MAX_PROFILED_CONTRIBUTORS: usize = 10;

/// At most this many closed issues are sampled for response time.
pub const MAX_RESPONSE_SAMPLES: usize = 10;

static SEMVER_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v?\d+\.\d+\.\d+(-.*)?$").expect("tag pattern must compile"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorProfile {
    pub login: String,

    /// `None` when the profile lookup failed.
    pub account_created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimeSample {
    pub average_hours: f64,
    pub sample_size: usize,
}

/// Repository activity counters. `None` means the data needed was unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetrics {
    pub project_age_days: i64,
    pub days_since_last_commit: Option<i64>,
    pub contributor_count: Option<usize>,
    pub contributors: Vec<ContributorProfile>,
    pub average_contributor_account_age_days: Option<i64>,
    pub long_lived_pull_requests: Option<usize>,
    pub long_lived_issues: Option<usize>,
    pub response_time: Option<ResponseTimeSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCadence {
    pub release_count: usize,
    pub days_since_latest: Option<i64>,
    pub latest_tag: Option<String>,
    pub latest_is_semver: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommitPayload {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<Signature>,
    committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ContributorPayload {
    pub login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserPayload {
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatedPayload {
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct IssuePayload {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl IssuePayload {
    pub const fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ReleasePayload {
    pub tag_name: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ReleasePayload {
    fn date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }
}

/// Whole days from `then` to `now`, never negative.
#[must_use]
pub fn days_between(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_days().max(0)
}

pub(super) fn latest_commit_date(commits: &[CommitPayload]) -> Option<DateTime<Utc>> {
    commits
        .iter()
        .flat_map(|c| [c.commit.committer.as_ref(), c.commit.author.as_ref()])
        .filter_map(|s| s.and_then(|s| s.date))
        .max()
}

pub(super) fn count_older_than(created: impl IntoIterator<Item = DateTime<Utc>>, now: DateTime<Utc>, days: i64) -> usize {
    let threshold = Duration::days(days);
    created.into_iter().filter(|c| now - *c > threshold).count()
}

pub(super) fn long_lived_issues(issues: &[IssuePayload], now: DateTime<Utc>) -> usize {
    count_older_than(
        issues.iter().filter(|i| !i.is_pull_request()).map(|i| i.created_at),
        now,
        LONG_LIVED_ISSUE_DAYS,
    )
}

pub(super) fn average_account_age(profiles: &[ContributorProfile], now: DateTime<Utc>) -> Option<i64> {
    let ages: Vec<i64> = profiles
        .iter()
        .filter_map(|p| p.account_created_at)
        .map(|created| days_between(created, now))
        .collect();

    if ages.is_empty() {
        return None;
    }

    let count = i64::try_from(ages.len()).ok()?;
    Some(ages.iter().sum::<i64>() / count)
}

/// Closed, non-PR issues with at least one comment, in listing order.
pub(super) fn response_candidates(issues: &[IssuePayload]) -> impl Iterator<Item = &IssuePayload> {
    issues
        .iter()
        .filter(|i| !i.is_pull_request() && i.comments > 0)
        .take(MAX_RESPONSE_SAMPLES)
}

/// Hours between an issue being opened and its first comment.
pub(super) fn response_hours(opened: DateTime<Utc>, first_comment: DateTime<Utc>) -> f64 {
    #[expect(clippy::cast_precision_loss, reason = "Sub-second precision is irrelevant for response times")]
    let seconds = (first_comment - opened).num_seconds().max(0) as f64;
    seconds / 3600.0
}

pub(super) fn summarize_response_times(hours: &[f64]) -> Option<ResponseTimeSample> {
    if hours.is_empty() {
        return None;
    }

    #[expect(clippy::cast_precision_loss, reason = "Sample sizes are tiny")]
    let average_hours = hours.iter().sum::<f64>() / hours.len() as f64;

    Some(ResponseTimeSample {
        average_hours,
        sample_size: hours.len(),
    })
}

pub(super) fn release_cadence(releases: &[ReleasePayload], now: DateTime<Utc>) -> ReleaseCadence {
    let latest = releases.iter().max_by_key(|r| r.date());

    ReleaseCadence {
        release_count: releases.len(),
        days_since_latest: latest.map(|r| days_between(r.date(), now)),
        latest_tag: latest.map(|r| r.tag_name.clone()),
        latest_is_semver: latest.is_some_and(|r| is_semver_tag(&r.tag_name)),
    }
}

#[must_use]
pub fn is_semver_tag(tag: &str) -> bool {
    SEMVER_TAG.is_match(tag)
}
