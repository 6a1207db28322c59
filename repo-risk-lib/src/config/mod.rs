#[expect(clippy::module_inception, reason = "I like it this way")]
mod config;
mod license_policy;

pub use config::{Config, DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_TOML};
pub use license_policy::{LicenseClass, LicensePolicy};
