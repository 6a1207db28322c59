//! Declared dependency extraction from `package.json` and `requirements.txt`.

use super::{Fetched, Gateway, RepoSpec};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use strum::Display;

/// Log target for the manifest parser
const LOG_TARGET: &str = "manifest";

/// At most this many dependencies are carried through a single analysis.
pub const MAX_DEPENDENCIES: usize = 20;

static REQUIREMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9_.\-\[\]]+)\s*(==|>=|<=|~=|!=|>|<)\s*([^\s,;#]+)").expect("requirement pattern must compile")
});

/// The package universe a dependency belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Ecosystem {
    #[serde(rename = "npm")]
    #[strum(serialize = "npm")]
    Npm,
    PyPI,
    Maven,
    Unknown,
}

impl Ecosystem {
    /// The ecosystem name understood by the OSV index, if it has one.
    #[must_use]
    pub const fn osv_name(self) -> Option<&'static str> {
        match self {
            Self::Npm => Some("npm"),
            Self::PyPI => Some("PyPI"),
            Self::Maven => Some("Maven"),
            Self::Unknown => None,
        }
    }
}

/// A manifest format whose dependency list can be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ManifestKind {
    #[strum(serialize = "package.json")]
    PackageJson,
    #[strum(serialize = "requirements.txt")]
    RequirementsTxt,
}

impl ManifestKind {
    /// Formats in the order they are tried.
    pub const PRECEDENCE: [Self; 2] = [Self::PackageJson, Self::RequirementsTxt];

    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::PackageJson => "package.json",
            Self::RequirementsTxt => "requirements.txt",
        }
    }

    #[must_use]
    pub const fn ecosystem(self) -> Ecosystem {
        match self {
            Self::PackageJson => Ecosystem::Npm,
            Self::RequirementsTxt => Ecosystem::PyPI,
        }
    }

    /// Extract dependencies from the manifest text, or `None` if the text is malformed.
    #[must_use]
    pub fn parse(self, text: &str) -> Option<Vec<DependencyDescriptor>> {
        match self {
            Self::PackageJson => parse_package_json(text),
            Self::RequirementsTxt => Some(parse_requirements_txt(text)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    pub name: String,

    /// The declared version with range operators removed; may be empty.
    pub declared_version: String,

    pub ecosystem: Ecosystem,
}

/// The dependency list of whichever supported manifest was found first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub kind: Option<ManifestKind>,
    pub dependencies: Vec<DependencyDescriptor>,
}

/// Parse `dependencies` followed by `devDependencies`, in file order.
///
/// A package named in both sections appears once, at its first position, with the
/// `devDependencies` version.
#[must_use]
pub fn parse_package_json(text: &str) -> Option<Vec<DependencyDescriptor>> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let root = value.as_object()?;

    let mut merged = serde_json::Map::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(entries) = root.get(section).and_then(serde_json::Value::as_object) {
            for (name, version) in entries {
                let _ = merged.insert(name.clone(), version.clone());
            }
        }
    }

    let deps = merged
        .iter()
        .map(|(name, version)| DependencyDescriptor {
            name: name.clone(),
            declared_version: strip_version(version.as_str().unwrap_or_default()),
            ecosystem: Ecosystem::Npm,
        })
        .take(MAX_DEPENDENCIES)
        .collect();

    Some(deps)
}

/// Parse the pinned or bounded requirement lines; everything else is skipped.
#[must_use]
pub fn parse_requirements_txt(text: &str) -> Vec<DependencyDescriptor> {
    text.lines()
        .filter_map(|line| {
            let captures = REQUIREMENT_LINE.captures(line)?;
            let raw_name = captures.get(1)?.as_str();
            let name = raw_name.split('[').next().unwrap_or(raw_name);
            if name.is_empty() {
                return None;
            }

            Some(DependencyDescriptor {
                name: name.to_string(),
                declared_version: captures.get(3)?.as_str().to_string(),
                ecosystem: Ecosystem::PyPI,
            })
        })
        .take(MAX_DEPENDENCIES)
        .collect()
}

/// Reduce an npm version range such as `^1.2.3` to its digits and dots.
fn strip_version(range: &str) -> String {
    range.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

/// Decode a contents-API payload, whose base64 body carries embedded newlines.
#[must_use]
pub fn decode_content(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}

#[derive(Debug, Deserialize)]
struct ContentsPayload {
    #[serde(default)]
    content: String,
}

/// Fetch a contents-style resource (a file or the README) and return its decoded text.
pub async fn fetch_decoded(gateway: &Gateway, path: &str) -> Fetched<String> {
    match gateway.fetch_as::<ContentsPayload>(path).await {
        Fetched::Found(payload) => match decode_content(&payload.content) {
            Some(text) => Fetched::Found(text),
            None => Fetched::error(None, format!("could not decode the contents of '{path}'")),
        },
        Fetched::Absent => Fetched::Absent,
        Fetched::Error { status, message } => Fetched::Error { status, message },
    }
}

/// Fetch one repository file through the contents API.
pub async fn fetch_file(gateway: &Gateway, repo: &RepoSpec, file: &str) -> Fetched<String> {
    fetch_decoded(gateway, &format!("{}/contents/{file}", repo.api_path())).await
}

/// Locate the first supported manifest and extract its dependency list.
///
/// Never fails: an unreadable or malformed manifest falls through to the next format, and
/// when nothing usable is found the result is an empty manifest.
pub async fn read_manifest(gateway: &Gateway, repo: &RepoSpec) -> Manifest {
    for kind in ManifestKind::PRECEDENCE {
        let text = match fetch_file(gateway, repo, kind.file_name()).await {
            Fetched::Found(text) => text,
            Fetched::Absent => continue,
            err @ Fetched::Error { .. } => {
                log::debug!(target: LOG_TARGET, "Could not read '{kind}' for '{repo}': {err}");
                continue;
            }
        };

        match kind.parse(&text) {
            Some(dependencies) => {
                log::debug!(target: LOG_TARGET, "Found {} dependencies in '{kind}' for '{repo}'", dependencies.len());
                return Manifest {
                    kind: Some(kind),
                    dependencies,
                };
            }
            None => log::debug!(target: LOG_TARGET, "Ignoring malformed '{kind}' in '{repo}'"),
        }
    }

    Manifest::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn test_package_json_dependencies_then_dev_dependencies() {
        let text = r#"{
            "name": "demo",
            "dependencies": { "react": "^18.2.0", "lodash": "~4.17.21" },
            "devDependencies": { "jest": ">=29.0.0" }
        }"#;
        let deps = parse_package_json(text).unwrap();
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["react", "lodash", "jest"]);
        assert_eq!(deps[0].declared_version, "18.2.0");
        assert_eq!(deps[1].declared_version, "4.17.21");
        assert_eq!(deps[2].declared_version, "29.0.0");
        assert!(deps.iter().all(|d| d.ecosystem == Ecosystem::Npm));
    }

    #[test]
    fn test_package_json_merges_packages_listed_twice() {
        let text = r#"{
            "dependencies": { "a": "^1.0.0", "b": "2.0.0" },
            "devDependencies": { "c": "3.0.0", "a": "~1.4.0" }
        }"#;
        let deps = parse_package_json(text).unwrap();
        let pairs: Vec<_> = deps.iter().map(|d| (d.name.as_str(), d.declared_version.as_str())).collect();
        assert_eq!(pairs, [("a", "1.4.0"), ("b", "2.0.0"), ("c", "3.0.0")]);
    }

    #[test]
    fn test_package_json_keeps_unversioned_entries() {
        let deps = parse_package_json(r#"{"dependencies": {"local": "file:../local", "tagged": "latest"}}"#).unwrap();
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().all(|d| d.declared_version.is_empty()));
    }

    #[test]
    fn test_package_json_malformed() {
        assert_eq!(parse_package_json("{ not json"), None);
        assert_eq!(parse_package_json("[1, 2]"), None);
        assert_eq!(parse_package_json("{}"), Some(Vec::new()));
    }

    #[test]
    fn test_package_json_cap_keeps_file_order() {
        let mut body = String::from("{\"dependencies\": {");
        for i in 0..30 {
            if i > 0 {
                body.push(',');
            }
            write!(body, "\"pkg-{i:02}\": \"^1.{i}.0\"").unwrap();
        }
        body.push_str("}}");

        let deps = parse_package_json(&body).unwrap();
        assert_eq!(deps.len(), MAX_DEPENDENCIES);
        for (i, dep) in deps.iter().enumerate() {
            assert_eq!(dep.name, format!("pkg-{i:02}"));
        }
    }

    #[test]
    fn test_package_json_parsing_is_idempotent() {
        let text = r#"{"dependencies": {"b": "1.0.0", "a": "2.0.0"}}"#;
        assert_eq!(parse_package_json(text), parse_package_json(text));
    }

    #[test]
    fn test_requirements_txt_pinned_and_bounded() {
        let text = "\
# comment
requests==2.31.0
flask >= 2.0.1
-r other.txt
--index-url https://example.com/simple

numpy
uvicorn[standard]~=0.23.2 ; python_version >= '3.8'
Django<5.0,>=4.2
";
        let deps = parse_requirements_txt(text);
        let pairs: Vec<_> = deps.iter().map(|d| (d.name.as_str(), d.declared_version.as_str())).collect();
        assert_eq!(
            pairs,
            [("requests", "2.31.0"), ("flask", "2.0.1"), ("uvicorn", "0.23.2"), ("Django", "5.0")]
        );
        assert!(deps.iter().all(|d| d.ecosystem == Ecosystem::PyPI));
    }

    #[test]
    fn test_requirements_txt_cap() {
        let text: String = (0..30).map(|i| format!("pkg{i}=={i}.0.0\n")).collect();
        let deps = parse_requirements_txt(&text);
        assert_eq!(deps.len(), MAX_DEPENDENCIES);
        assert_eq!(deps[0].name, "pkg0");
        assert_eq!(deps[19].name, "pkg19");
    }

    #[test]
    fn test_decode_content_with_embedded_newlines() {
        let encoded = "eyJkZXBl\nbmRlbmNp\nZXMiOnt9\nfQ==\n";
        assert_eq!(decode_content(encoded).as_deref(), Some(r#"{"dependencies":{}}"#));
        assert_eq!(decode_content("!!! not base64"), None);
    }

    #[test]
    fn test_manifest_kind_names() {
        assert_eq!(ManifestKind::PackageJson.to_string(), "package.json");
        assert_eq!(ManifestKind::RequirementsTxt.ecosystem(), Ecosystem::PyPI);
        assert_eq!(Ecosystem::Npm.to_string(), "npm");
        assert_eq!(Ecosystem::Unknown.osv_name(), None);
    }
}
