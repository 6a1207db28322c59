//! Rule evaluation logic for repositories.

use super::{Rating, RiskCategory, RiskFactor};
use crate::config::{Config, LicenseClass};
use crate::facts::advisories::Severity;
use crate::facts::RepoFacts;

/// The outcome of scoring one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAssessment {
    pub score: u32,
    pub rating: Rating,
    pub factors: Vec<RiskFactor>,
}

/// Applies the weighted risk rules to collected facts.
///
/// Scoring is pure: the same facts always produce the same factors, in the same order.
#[derive(Debug, Clone, Copy)]
pub struct RiskScorer<'a> {
    config: &'a Config,
}

impl<'a> RiskScorer<'a> {
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn score(&self, facts: &RepoFacts) -> RiskAssessment {
        let mut factors = Vec::new();
        calculate(self.config, facts, &mut factors);

        let score = factors.iter().map(|f| f.weight).sum();
        RiskAssessment {
            score,
            rating: Rating::from_points(score),
            factors,
        }
    }
}

struct RuleCalculator<'a> {
    config: &'a Config,
    facts: &'a RepoFacts,
    factors: &'a mut Vec<RiskFactor>,
}

/// Evaluate every rule, appending one factor per rule that fires.
fn calculate(config: &Config, facts: &RepoFacts, factors: &mut Vec<RiskFactor>) {
    let mut calc = RuleCalculator { config, facts, factors };

    calc.contributors();
    calc.license();
    calc.dependency_manifest();
    calc.tests();
    calc.ci();
    calc.readme();
    calc.docs();
    calc.no_releases();
    calc.stale_release();
    calc.release_tagging();
    calc.stars();
    calc.issue_response();
    calc.lint_config();
    calc.contributing_guide();
    calc.long_lived_pull_requests();
    calc.long_lived_issues();
    calc.security_policy();
    calc.complexity();
    calc.vulnerabilities();
    calc.alerting();
    calc.major_outdated();
    calc.minor_outdated();
}

impl RuleCalculator<'_> {
    fn fire(&mut self, weight: u32, category: RiskCategory, message: impl Into<String>) {
        self.factors.push(RiskFactor {
            weight,
            message: message.into(),
            category,
        });
    }

    fn contributors(&mut self) {
        let Some(count) = self.facts.activity.contributor_count else {
            return;
        };

        if count < 2 {
            self.fire(3, RiskCategory::Community, format!("Very few contributors ({count})"));
        } else if count <= 4 {
            self.fire(1, RiskCategory::Community, format!("Small contributor base ({count})"));
        }
    }

    fn license(&mut self) {
        let Some(license) = &self.facts.snapshot.license else {
            self.fire(3, RiskCategory::License, "No license");
            return;
        };

        let id = license.spdx_id.as_deref().unwrap_or_default();
        let shown = if id.is_empty() || id == "NOASSERTION" { license.name.as_str() } else { id };

        match self.config.preferred_licenses.classify(id, &license.name) {
            LicenseClass::Preferred => {}
            LicenseClass::Restrictive => self.fire(2, RiskCategory::License, format!("Restrictive license ({shown})")),
            LicenseClass::Other => self.fire(1, RiskCategory::License, format!("License not in the preferred list ({shown})")),
        }
    }

    fn dependency_manifest(&mut self) {
        if !self.facts.flags.has_dependency_manifest && self.facts.dependencies.manifest_kind.is_none() {
            self.fire(1, RiskCategory::Dependencies, "No dependency manifest");
        }
    }

    fn tests(&mut self) {
        if !self.facts.flags.has_tests {
            self.fire(2, RiskCategory::DevelopmentQuality, "No test directory");
        }
    }

    fn ci(&mut self) {
        if !self.facts.flags.has_ci {
            self.fire(1, RiskCategory::DevelopmentQuality, "No CI configuration");
        }
    }

    fn readme(&mut self) {
        if !self.facts.flags.has_readme {
            self.fire(2, RiskCategory::DevelopmentQuality, "No README");
        }
    }

    fn docs(&mut self) {
        if !self.facts.flags.has_docs && !self.facts.flags.has_readme {
            self.fire(1, RiskCategory::DevelopmentQuality, "No documentation and no README");
        }
    }

    fn no_releases(&mut self) {
        if self.facts.releases.as_ref().is_some_and(|r| r.release_count == 0) {
            self.fire(1, RiskCategory::Releases, "No releases");
        }
    }

    fn stale_release(&mut self) {
        if let Some(days) = self.facts.releases.as_ref().and_then(|r| r.days_since_latest)
            && days > 365
        {
            self.fire(2, RiskCategory::Releases, format!("No release in {days} days"));
        }
    }

    fn release_tagging(&mut self) {
        if let Some(releases) = &self.facts.releases
            && releases.release_count > 0
            && !releases.latest_is_semver
        {
            let tag = releases.latest_tag.as_deref().unwrap_or_default();
            self.fire(1, RiskCategory::Releases, format!("Releases are not semver-tagged (latest '{tag}')"));
        }
    }

    fn stars(&mut self) {
        let stars = self.facts.snapshot.stars;
        if stars < 10 {
            self.fire(1, RiskCategory::Community, format!("Low adoption ({stars} stars)"));
        }
    }

    fn issue_response(&mut self) {
        let Some(sample) = self.facts.activity.response_time else {
            return;
        };

        let hours = sample.average_hours;
        if hours > 168.0 {
            self.fire(2, RiskCategory::Community, format!("Slow issue response (average {hours:.1} hours)"));
        } else if hours > 72.0 {
            self.fire(1, RiskCategory::Community, format!("Sluggish issue response (average {hours:.1} hours)"));
        }
    }

    fn lint_config(&mut self) {
        if !self.facts.flags.has_lint_config {
            self.fire(1, RiskCategory::DevelopmentQuality, "No lint or formatting configuration");
        }
    }

    fn contributing_guide(&mut self) {
        if !self.facts.flags.has_contributing {
            self.fire(1, RiskCategory::Community, "No CONTRIBUTING guide");
        }
    }

    fn long_lived_pull_requests(&mut self) {
        let Some(count) = self.facts.activity.long_lived_pull_requests else {
            return;
        };

        let weight = match count {
            0 => return,
            1..=5 => 1,
            _ => 2,
        };
        self.fire(weight, RiskCategory::Sustainability, format!("{count} pull requests open for more than 90 days"));
    }

    fn long_lived_issues(&mut self) {
        let Some(count) = self.facts.activity.long_lived_issues else {
            return;
        };

        let weight = match count {
            0 => return,
            1..=5 => 1,
            6..=10 => 2,
            _ => 3,
        };
        self.fire(weight, RiskCategory::Sustainability, format!("{count} issues open for more than 180 days"));
    }

    fn security_policy(&mut self) {
        if !self.facts.flags.has_security_policy {
            self.fire(2, RiskCategory::Security, "No SECURITY policy");
        }
    }

    fn complexity(&mut self) {
        let size_kb = self.facts.snapshot.size_kb;
        if size_kb >= self.config.complexity_size_threshold_kb {
            self.fire(1, RiskCategory::Sustainability, format!("High complexity (repository size {size_kb} KB)"));
        }
    }

    /// One factor per distinct vulnerability record, most severe tiers first.
    fn vulnerabilities(&mut self) {
        self.vulnerability_tier(&[Severity::Critical, Severity::High]);
        self.vulnerability_tier(&[Severity::Medium]);
        self.vulnerability_tier(&[Severity::Low]);
    }

    fn vulnerability_tier(&mut self, severities: &[Severity]) {
        let facts = self.facts;
        for vuln in facts.dependencies.vulnerabilities.iter().filter(|v| severities.contains(&v.severity)) {
            let id = vuln.id.as_deref().map(|id| format!(" ({id})")).unwrap_or_default();
            self.fire(
                vuln.severity.weight(),
                RiskCategory::Security,
                format!("{} vulnerability in {}{id}", vuln.severity, vuln.package),
            );
        }
    }

    fn alerting(&mut self) {
        let deps = &self.facts.dependencies;
        if !deps.dependencies.is_empty() && !deps.alerts.is_enabled() {
            self.fire(1, RiskCategory::Security, "Dependencies present but vulnerability alerting is unavailable");
        }
    }

    fn major_outdated(&mut self) {
        let count = self.facts.dependencies.major_outdated_count();
        let weight = match count {
            0 => return,
            1..=5 => 2,
            _ => 3,
        };
        self.fire(weight, RiskCategory::Dependencies, format!("{count} dependencies a major version behind"));
    }

    fn minor_outdated(&mut self) {
        let count = self.facts.dependencies.minor_outdated_count();
        if count > 10 {
            self.fire(1, RiskCategory::Dependencies, format!("{count} dependencies a minor version behind"));
        }
    }
}
