use super::license_policy::{LicensePolicy, deserialize_licenses, serialize_licenses};
use crate::Result;
use crate::facts::Batching;
use crate::facts::probes::ProbeSet;
use anyhow::{Context, bail};
use camino::Utf8Path;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use url::Url;

/// Log target for configuration handling
const LOG_TARGET: &str = "config";

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// The configuration file picked up from the working directory when none is named explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "repo-risk.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the hosting API
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Base URL of the OSV vulnerability index
    #[serde(default = "default_osv_api_url")]
    pub osv_api_url: String,

    /// Base URL of the npm registry
    #[serde(default = "default_npm_registry_url")]
    pub npm_registry_url: String,

    /// Base URL of the Python Package Index
    #[serde(default = "default_pypi_url")]
    pub pypi_url: String,

    /// Timeout for each individual HTTP request
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Upper bound on a whole analysis run
    #[serde(default = "default_analysis_timeout", with = "humantime_serde")]
    pub analysis_timeout: Duration,

    /// Number of dependency or profile lookups issued together
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between consecutive batches
    #[serde(default = "default_batch_pause", with = "humantime_serde")]
    pub batch_pause: Duration,

    /// Number of existence probes issued together
    #[serde(default = "default_probe_batch_size")]
    pub probe_batch_size: usize,

    /// Repository size (KB) at or above which the repository is considered complex
    #[serde(default = "default_complexity_size_threshold_kb")]
    pub complexity_size_threshold_kb: u64,

    /// Licenses that carry no risk
    #[serde(
        default = "default_preferred_licenses",
        serialize_with = "serialize_licenses",
        deserialize_with = "deserialize_licenses"
    )]
    pub preferred_licenses: LicensePolicy,

    /// Candidate paths for each existence probe
    #[serde(default)]
    pub probes: ProbeSet,
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_osv_api_url() -> String {
    "https://api.osv.dev".to_string()
}

fn default_npm_registry_url() -> String {
    "https://registry.npmjs.org".to_string()
}

fn default_pypi_url() -> String {
    "https://pypi.org".to_string()
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_analysis_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

const fn default_batch_size() -> usize {
    8
}

const fn default_batch_pause() -> Duration {
    Duration::from_millis(250)
}

const fn default_probe_batch_size() -> usize {
    20
}

const fn default_complexity_size_threshold_kb() -> u64 {
    100_000
}

fn default_preferred_licenses() -> LicensePolicy {
    LicensePolicy::new(["0BSD", "Apache-2.0", "BSD-2-Clause", "BSD-3-Clause", "ISC", "MIT", "Unlicense", "Zlib"])
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `repo-risk.toml` in the working directory is used if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        let (path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).with_context(|| format!("reading repo-risk configuration file '{path}'"))?;
            (path, text)
        } else {
            let path = Utf8Path::new(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
                Err(e) => return Err(e).with_context(|| format!("reading repo-risk configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).with_context(|| format!("parsing configuration file '{path}'"))?;
        config.validate().with_context(|| format!("validating configuration file '{path}'"))?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).with_context(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is malformed or a numeric setting is out of range
    pub fn validate(&self) -> Result<()> {
        for (setting, value) in [
            ("github_api_url", &self.github_api_url),
            ("osv_api_url", &self.osv_api_url),
            ("npm_registry_url", &self.npm_registry_url),
            ("pypi_url", &self.pypi_url),
        ] {
            let url = Url::parse(value).with_context(|| format!("{setting} '{value}' is not a valid URL"))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("{setting} '{value}' must use http or https");
            }
        }

        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }

        if self.probe_batch_size == 0 {
            bail!("probe_batch_size must be at least 1");
        }

        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than zero");
        }

        if self.analysis_timeout < self.request_timeout {
            bail!(
                "analysis_timeout ({:?}) must not be shorter than request_timeout ({:?})",
                self.analysis_timeout,
                self.request_timeout
            );
        }

        if self.preferred_licenses.is_empty() {
            log::warn!(target: LOG_TARGET, "preferred_licenses is empty; every licensed repository will be scored as non-preferred");
        }

        Ok(())
    }

    /// The web host matching `github_api_url`; `api.github.com` serves `github.com`.
    #[must_use]
    pub fn web_host(&self) -> Option<String> {
        let url = Url::parse(&self.github_api_url).ok()?;
        let host = url.host_str()?;
        Some(host.strip_prefix("api.").unwrap_or(host).to_string())
    }

    /// Batching for dependency lookups and contributor profiles.
    #[must_use]
    pub const fn batching(&self) -> Batching {
        Batching::new(self.batch_size, self.batch_pause)
    }

    /// Batching for existence probes.
    #[must_use]
    pub const fn probe_batching(&self) -> Batching {
        Batching::new(self.probe_batch_size, self.batch_pause)
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
