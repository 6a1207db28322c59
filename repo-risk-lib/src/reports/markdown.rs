use super::readme;
use crate::facts::RepoFacts;
use crate::facts::advisories::{AlertsStatus, Severity};
use crate::facts::hosting::{LONG_LIVED_ISSUE_DAYS, LONG_LIVED_PULL_REQUEST_DAYS};
use crate::ranking::RiskAssessment;
use core::fmt::{Display, Result as FmtResult, Write};

const NOT_AVAILABLE: &str = "N/A";

/// Most dependencies listed in the report.
const MAX_LISTED_DEPENDENCIES: usize = 20;

/// Render the full markdown report for a scored repository.
#[must_use]
pub fn render(facts: &RepoFacts, assessment: &RiskAssessment) -> String {
    let mut out = String::new();

    // writing into a String never fails
    let _ = write_report(&mut out, facts, assessment);
    out
}

/// Render the one-line report used when an analysis could not run.
#[must_use]
pub fn render_error(input: &str, message: &str) -> String {
    format!("**Error:** unable to analyze repository '{input}': {message}\n")
}

fn write_report(out: &mut String, facts: &RepoFacts, assessment: &RiskAssessment) -> FmtResult {
    writeln!(out, "# Repository Risk Report: {}", facts.repo)?;
    writeln!(out)?;
    writeln!(out, "_Generated {}_", facts.collected_at.format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(out)?;

    if let Some(excerpt) = facts.readme.as_deref().and_then(readme::excerpt) {
        writeln!(out, "> {excerpt}")?;
        writeln!(out)?;
    }

    write_sustainability(out, facts)?;
    write_security(out, facts)?;
    write_license(out, facts)?;
    write_dependencies(out, facts)?;
    write_development_quality(out, facts)?;
    write_community(out, facts)?;
    write_releases(out, facts)?;
    write_summary(out, assessment)
}

fn write_sustainability(out: &mut String, facts: &RepoFacts) -> FmtResult {
    let activity = &facts.activity;
    let snapshot = &facts.snapshot;

    section(out, "Sustainability")?;
    row(out, "Project age", format!("{} days", activity.project_age_days))?;
    row(out, "Days since last commit", or_na(activity.days_since_last_commit))?;
    row(out, "Contributors", or_na(activity.contributor_count))?;
    row(
        out,
        "Average contributor account age",
        activity
            .average_contributor_account_age_days
            .map_or_else(|| NOT_AVAILABLE.to_string(), |days| format!("{days} days")),
    )?;
    row(
        out,
        &format!("Pull requests open > {LONG_LIVED_PULL_REQUEST_DAYS} days"),
        or_na(activity.long_lived_pull_requests),
    )?;
    row(out, &format!("Issues open > {LONG_LIVED_ISSUE_DAYS} days"), or_na(activity.long_lived_issues))?;
    row(out, "Repository size", format!("{} KB", snapshot.size_kb))?;
    row(out, "Archived", yes_no(snapshot.archived))?;
    writeln!(out)
}

fn write_security(out: &mut String, facts: &RepoFacts) -> FmtResult {
    let deps = &facts.dependencies;

    section(out, "Security")?;
    row(out, "Security policy", present(facts.flags.has_security_policy))?;
    row(
        out,
        "Vulnerability alerting",
        match deps.alerts {
            AlertsStatus::Enabled => "Enabled",
            AlertsStatus::Disabled => "Disabled",
            AlertsStatus::Unavailable => NOT_AVAILABLE,
        },
    )?;
    row(out, "Vulnerability data source", or_na(deps.vulnerability_source))?;
    row(out, "Critical / high vulnerabilities", deps.vulnerability_count(&[Severity::Critical, Severity::High]))?;
    row(out, "Medium vulnerabilities", deps.vulnerability_count(&[Severity::Medium]))?;
    row(out, "Low vulnerabilities", deps.vulnerability_count(&[Severity::Low]))?;
    writeln!(out)
}

fn write_license(out: &mut String, facts: &RepoFacts) -> FmtResult {
    let license = facts.snapshot.license.as_ref();

    section(out, "License")?;
    row(out, "License", license.map_or(NOT_AVAILABLE, |l| l.name.as_str()))?;
    row(
        out,
        "SPDX identifier",
        license.and_then(|l| l.spdx_id.as_deref()).unwrap_or(NOT_AVAILABLE),
    )?;
    writeln!(out)
}

fn write_dependencies(out: &mut String, facts: &RepoFacts) -> FmtResult {
    let deps = &facts.dependencies;

    section(out, "Dependency Analysis")?;
    row(out, "Manifest", or_na(deps.manifest_kind))?;
    row(out, "Dependencies analyzed", deps.dependencies.len())?;
    row(out, "Vulnerabilities", deps.vulnerabilities.len())?;
    row(out, "Major versions behind", deps.major_outdated_count())?;
    row(out, "Minor versions behind", deps.minor_outdated_count())?;
    row(out, "Patch versions behind", deps.patch_outdated_count())?;
    writeln!(out)?;

    writeln!(out, "### Vulnerable Packages")?;
    writeln!(out)?;
    if deps.vulnerabilities.is_empty() {
        writeln!(out, "No known vulnerabilities.")?;
    } else {
        writeln!(out, "| Package | Severity | ID | Fixed In | Source |")?;
        writeln!(out, "|---|---|---|---|---|")?;
        for vuln in &deps.vulnerabilities {
            let fixed = if vuln.fixed_versions.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                vuln.fixed_versions.join(", ")
            };
            writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                cell(&vuln.package),
                vuln.severity,
                cell(vuln.id.as_deref().unwrap_or(NOT_AVAILABLE)),
                cell(&fixed),
                vuln.source
            )?;
        }
    }
    writeln!(out)?;

    writeln!(out, "### Outdated Packages")?;
    writeln!(out)?;
    if deps.outdated.is_empty() {
        writeln!(out, "No outdated packages detected.")?;
    } else {
        writeln!(out, "| Package | Current | Latest | Behind | Urgency |")?;
        writeln!(out, "|---|---|---|---|---|")?;
        for record in &deps.outdated {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                cell(&record.name),
                cell(&record.current_version),
                cell(&record.latest_version),
                record.staleness,
                record.urgency
            )?;
        }
    }
    writeln!(out)?;

    writeln!(out, "### Dependencies")?;
    writeln!(out)?;
    if deps.dependencies.is_empty() {
        writeln!(out, "No dependencies found.")?;
    } else {
        writeln!(out, "| Package | Version | Ecosystem |")?;
        writeln!(out, "|---|---|---|")?;
        for dep in deps.dependencies.iter().take(MAX_LISTED_DEPENDENCIES) {
            let version = if dep.declared_version.is_empty() {
                NOT_AVAILABLE
            } else {
                dep.declared_version.as_str()
            };
            writeln!(out, "| {} | {} | {} |", cell(&dep.name), cell(version), dep.ecosystem)?;
        }
    }
    writeln!(out)
}

fn write_development_quality(out: &mut String, facts: &RepoFacts) -> FmtResult {
    let flags = &facts.flags;

    section(out, "Development Quality")?;
    row(out, "Tests", present(flags.has_tests))?;
    row(out, "Continuous integration", present(flags.has_ci))?;
    row(out, "Documentation", present(flags.has_docs))?;
    row(out, "Lint / format configuration", present(flags.has_lint_config))?;
    row(out, "Dependency manifest", present(flags.has_dependency_manifest))?;
    writeln!(out)
}

fn write_community(out: &mut String, facts: &RepoFacts) -> FmtResult {
    let snapshot = &facts.snapshot;

    section(out, "Community Health")?;
    row(out, "Stars", snapshot.stars)?;
    row(out, "Forks", snapshot.forks)?;
    row(out, "Watchers", snapshot.watchers)?;
    row(out, "Open issues", snapshot.open_issues)?;
    row(out, "README", present(facts.flags.has_readme))?;
    row(out, "Contributing guide", present(facts.flags.has_contributing))?;
    row(
        out,
        "Average issue response",
        facts.activity.response_time.map_or_else(
            || NOT_AVAILABLE.to_string(),
            |s| format!("{:.1} hours ({} issues sampled)", s.average_hours, s.sample_size),
        ),
    )?;
    writeln!(out)
}

fn write_releases(out: &mut String, facts: &RepoFacts) -> FmtResult {
    let releases = facts.releases.as_ref();

    section(out, "Release Practices")?;
    row(out, "Releases", or_na(releases.map(|r| r.release_count)))?;
    row(out, "Days since latest release", or_na(releases.and_then(|r| r.days_since_latest)))?;
    row(out, "Latest tag", cell(releases.and_then(|r| r.latest_tag.as_deref()).unwrap_or(NOT_AVAILABLE)))?;
    row(
        out,
        "Semantic version tags",
        releases
            .filter(|r| r.release_count > 0)
            .map_or(NOT_AVAILABLE, |r| yes_no(r.latest_is_semver)),
    )?;
    writeln!(out)
}

fn write_summary(out: &mut String, assessment: &RiskAssessment) -> FmtResult {
    writeln!(out, "## Risk Summary")?;
    writeln!(out)?;
    writeln!(out, "**Risk Score:** {}", assessment.score)?;
    writeln!(out)?;
    writeln!(out, "**Risk Rating:** {}", assessment.rating)?;
    writeln!(out)?;

    if assessment.factors.is_empty() {
        return writeln!(out, "No risk factors identified.");
    }

    writeln!(out, "### Risk Factors")?;
    writeln!(out)?;
    for factor in &assessment.factors {
        writeln!(out, "- **{}** (+{}): {}", factor.category, factor.weight, factor.message)?;
    }

    Ok(())
}

fn section(out: &mut String, title: &str) -> FmtResult {
    writeln!(out, "## {title}")?;
    writeln!(out)?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|---|---|")
}

fn row(out: &mut String, metric: &str, value: impl Display) -> FmtResult {
    writeln!(out, "| {metric} | {value} |")
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

const fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

const fn present(value: bool) -> &'static str {
    if value { "Present" } else { "Missing" }
}

/// Keep table cells intact when values contain pipes or line breaks.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
