use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use strum::Display;

static VERSION_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("version pattern must compile"));

/// Coerce a loosely formatted version (`v2`, `1.4`, `>=3.2.1-beta`) to `major.minor.patch`.
///
/// The first numeric run wins and missing components are zero.
#[must_use]
pub fn coerce_version(text: &str) -> Option<Version> {
    let captures = VERSION_RUN.captures(text)?;
    let part = |index: usize| -> Option<u64> { captures.get(index).map_or(Some(0), |m| m.as_str().parse().ok()) };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// How far a declared version trails the latest release, per component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDelta {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// The most significant component in which a dependency is behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Staleness {
    Major,
    Minor,
    Patch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Staleness {
    #[must_use]
    pub const fn urgency(self) -> Urgency {
        match self {
            Self::Major => Urgency::High,
            Self::Minor => Urgency::Medium,
            Self::Patch => Urgency::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedDependencyRecord {
    pub name: String,
    pub current_version: String,
    pub latest_version: String,
    pub behind: VersionDelta,
    pub staleness: Staleness,
    pub urgency: Urgency,
}

impl OutdatedDependencyRecord {
    /// Compare a declared version against the latest published one.
    ///
    /// Returns `None` when either side cannot be coerced or when the latest version is not
    /// strictly newer.
    #[must_use]
    pub fn compare(name: &str, current: &str, latest: &str) -> Option<Self> {
        let current_version = coerce_version(current)?;
        let latest_version = coerce_version(latest)?;
        let staleness = classify(&current_version, &latest_version)?;

        Some(Self {
            name: name.to_string(),
            current_version: current.to_string(),
            latest_version: latest.to_string(),
            behind: VersionDelta {
                major: latest_version.major.saturating_sub(current_version.major),
                minor: latest_version.minor.saturating_sub(current_version.minor),
                patch: latest_version.patch.saturating_sub(current_version.patch),
            },
            staleness,
            urgency: staleness.urgency(),
        })
    }
}

/// Bucket a version pair; a newer major always classifies as `Major` whatever the other deltas.
#[must_use]
pub fn classify(current: &Version, latest: &Version) -> Option<Staleness> {
    if latest.major != current.major {
        return (latest.major > current.major).then_some(Staleness::Major);
    }

    if latest.minor != current.minor {
        return (latest.minor > current.minor).then_some(Staleness::Minor);
    }

    (latest.patch > current.patch).then_some(Staleness::Patch)
}
