use core::fmt::Formatter;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use std::collections::BTreeSet;
use strum::Display;

/// Substrings that mark a license identifier or name as copyleft.
const COPYLEFT_MARKERS: [&str; 10] = [
    "gpl",
    "general public license",
    "mpl-",
    "mozilla public",
    "eupl",
    "epl-",
    "eclipse public",
    "cddl",
    "osl-",
    "cc-by-sa",
];

/// How a repository's license relates to the configured preference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LicenseClass {
    Preferred,
    Restrictive,
    Other,
}

/// The set of licenses that carry no risk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicensePolicy {
    preferred: BTreeSet<String>,
}

impl LicensePolicy {
    #[must_use]
    pub fn new<I, S>(preferred: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferred: preferred.into_iter().map(Into::into).collect(),
        }
    }

    pub fn preferred(&self) -> impl Iterator<Item = &str> {
        self.preferred.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.preferred.is_empty()
    }

    fn is_preferred(&self, id: &str) -> bool {
        self.preferred.iter().any(|p| p.eq_ignore_ascii_case(id))
    }

    /// Classify a license given its SPDX identifier and display name.
    ///
    /// An SPDX expression is preferred when it can be satisfied by preferred licenses alone
    /// (any alternative of an `OR`, every operand of an `AND`), and restrictive when every way
    /// of satisfying it involves a copyleft license. Identifiers SPDX doesn't know (for
    /// example `NOASSERTION`) fall back to a name heuristic.
    #[must_use]
    pub fn classify(&self, spdx_id: &str, name: &str) -> LicenseClass {
        let id = spdx_id.trim();
        if !id.is_empty() && self.is_preferred(id) {
            return LicenseClass::Preferred;
        }

        if let Ok(expression) = spdx::Expression::parse(id) {
            if expression.evaluate(|req| req.license.id().is_some_and(|license| self.is_preferred(license.name))) {
                return LicenseClass::Preferred;
            }

            let permissive_path = expression.evaluate(|req| {
                req.license
                    .id()
                    .is_none_or(|license| !license.is_copyleft() && !looks_copyleft(license.name))
            });

            return if permissive_path { LicenseClass::Other } else { LicenseClass::Restrictive };
        }

        if looks_copyleft(id) || looks_copyleft(name) {
            LicenseClass::Restrictive
        } else {
            LicenseClass::Other
        }
    }
}

fn looks_copyleft(text: &str) -> bool {
    let text = text.to_lowercase();
    COPYLEFT_MARKERS.iter().any(|marker| text.contains(marker))
}

pub(super) fn serialize_licenses<S>(policy: &LicensePolicy, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let names: Vec<_> = policy.preferred().collect();
    serializer.serialize_str(&names.join(", "))
}

pub(super) fn deserialize_licenses<'de, D>(deserializer: D) -> Result<LicensePolicy, D::Error>
where
    D: Deserializer<'de>,
{
    struct LicensesVisitor;

    impl Visitor<'_> for LicensesVisitor {
        type Value = LicensePolicy;

        fn expecting(&self, formatter: &mut Formatter<'_>) -> core::fmt::Result {
            formatter.write_str("a comma-separated string of SPDX license identifiers")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(LicensePolicy::new(v.split(',').map(str::trim).filter(|part| !part.is_empty())))
        }
    }

    deserializer.deserialize_str(LicensesVisitor)
}
