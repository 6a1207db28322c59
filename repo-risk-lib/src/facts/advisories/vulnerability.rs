use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Severity of a single vulnerability record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Interpret a textual severity label. `MODERATE` is GitHub's name for `MEDIUM`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" | "MODERATE" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Map a numeric CVSS base score onto a severity bucket.
    #[must_use]
    pub fn from_cvss_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::Critical
        } else if score >= 7.0 {
            Self::High
        } else if score >= 4.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Resolve a severity from whatever a source provided: a label wins over a score, and
    /// with neither the result is `Medium`.
    #[must_use]
    pub fn resolve(label: Option<&str>, score: Option<f64>) -> Self {
        label
            .and_then(Self::from_label)
            .or_else(|| score.map(Self::from_cvss_score))
            .unwrap_or(Self::Medium)
    }

    /// The number of risk points one record of this severity is worth.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::Critical | Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// Which provider produced a vulnerability record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum VulnerabilitySourceKind {
    #[serde(rename = "GH-Advisory")]
    #[strum(serialize = "GH-Advisory")]
    GitHubAdvisory,

    #[serde(rename = "OSV")]
    #[strum(serialize = "OSV")]
    Osv,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    pub package: String,
    pub severity: Severity,

    /// Versions that fix the issue; empty when unknown.
    pub fixed_versions: Vec<String>,

    pub id: Option<String>,
    pub detail: Option<String>,
    pub source: VulnerabilitySourceKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_case_insensitive_and_moderate_is_medium() {
        assert_eq!(Severity::from_label("moderate"), Some(Severity::Medium));
        assert_eq!(Severity::from_label(" Critical "), Some(Severity::Critical));
        assert_eq!(Severity::from_label("unknown"), None);
    }

    #[test]
    fn test_cvss_thresholds() {
        assert_eq!(Severity::from_cvss_score(9.0), Severity::Critical);
        assert_eq!(Severity::from_cvss_score(8.9), Severity::High);
        assert_eq!(Severity::from_cvss_score(7.0), Severity::High);
        assert_eq!(Severity::from_cvss_score(4.0), Severity::Medium);
        assert_eq!(Severity::from_cvss_score(3.9), Severity::Low);
        assert_eq!(Severity::from_cvss_score(0.0), Severity::Low);
    }

    #[test]
    fn test_resolution_order() {
        assert_eq!(Severity::resolve(Some("LOW"), Some(9.8)), Severity::Low);
        assert_eq!(Severity::resolve(Some("bogus"), Some(9.8)), Severity::Critical);
        assert_eq!(Severity::resolve(None, Some(5.0)), Severity::Medium);
        assert_eq!(Severity::resolve(None, None), Severity::Medium);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Severity::High.to_string(), "HIGH");
        assert_eq!(VulnerabilitySourceKind::GitHubAdvisory.to_string(), "GH-Advisory");
        assert_eq!(VulnerabilitySourceKind::Osv.to_string(), "OSV");
    }

    #[test]
    fn test_weights() {
        assert_eq!(Severity::Critical.weight(), 3);
        assert_eq!(Severity::High.weight(), 3);
        assert_eq!(Severity::Medium.weight(), 2);
        assert_eq!(Severity::Low.weight(), 1);
    }
}
