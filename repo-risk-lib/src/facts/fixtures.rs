//! Synthetic repository facts shared by unit tests.

use super::advisories::AlertsStatus;
use super::hosting::{ActivityMetrics, ContributorProfile, LicenseInfo, ReleaseCadence, RepositorySnapshot, ResponseTimeSample};
use super::manifest::{DependencyDescriptor, Ecosystem, ManifestKind};
use super::probes::ExistenceFlags;
use super::{DependencyFacts, RepoFacts, RepoSpec};
use chrono::{DateTime, Duration, TimeZone, Utc};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

fn dependency(name: &str, version: &str) -> DependencyDescriptor {
    DependencyDescriptor {
        name: name.to_string(),
        declared_version: version.to_string(),
        ecosystem: Ecosystem::Npm,
    }
}

/// A healthy, well-maintained repository that trips no risk rule.
pub fn low_risk_facts() -> RepoFacts {
    RepoFacts {
        repo: RepoSpec::new("octo", "widgets").unwrap(),
        collected_at: now(),
        snapshot: RepositorySnapshot {
            created_at: now() - Duration::days(1500),
            updated_at: now() - Duration::days(1),
            stars: 850,
            forks: 120,
            watchers: 40,
            open_issues: 12,
            size_kb: 5_400,
            license: Some(LicenseInfo {
                spdx_id: Some("MIT".to_string()),
                name: "MIT License".to_string(),
            }),
            description: Some("Widgets for everyone".to_string()),
            default_branch: Some("main".to_string()),
            archived: false,
        },
        flags: ExistenceFlags {
            has_tests: true,
            has_ci: true,
            has_docs: true,
            has_lint_config: true,
            has_contributing: true,
            has_security_policy: true,
            has_readme: true,
            has_dependency_manifest: true,
        },
        activity: ActivityMetrics {
            project_age_days: 1500,
            days_since_last_commit: Some(2),
            contributor_count: Some(25),
            contributors: vec![ContributorProfile {
                login: "octocat".to_string(),
                account_created_at: Some(now() - Duration::days(3000)),
            }],
            average_contributor_account_age_days: Some(3000),
            long_lived_pull_requests: Some(0),
            long_lived_issues: Some(0),
            response_time: Some(ResponseTimeSample {
                average_hours: 6.5,
                sample_size: 10,
            }),
        },
        releases: Some(ReleaseCadence {
            release_count: 14,
            days_since_latest: Some(21),
            latest_tag: Some("v2.3.1".to_string()),
            latest_is_semver: true,
        }),
        readme: Some("# Widgets\n\nWidgets is a library of reusable widgets.\n".to_string()),
        dependencies: DependencyFacts {
            manifest_kind: Some(ManifestKind::PackageJson),
            dependencies: vec![dependency("react", "18.2.0"), dependency("lodash", "4.17.21")],
            vulnerabilities: Vec::new(),
            vulnerability_source: None,
            alerts: AlertsStatus::Enabled,
            outdated: Vec::new(),
        },
    }
}

/// No license, tests, CI, README or docs; a single contributor and no stars.
pub fn neglected_facts() -> RepoFacts {
    let mut facts = low_risk_facts();
    facts.snapshot.license = None;
    facts.snapshot.stars = 0;
    facts.flags.has_tests = false;
    facts.flags.has_ci = false;
    facts.flags.has_readme = false;
    facts.flags.has_docs = false;
    facts.activity.contributor_count = Some(1);
    facts.readme = None;
    facts
}
