mod github;
mod osv;
mod source;
mod vulnerability;

pub use github::GitHubAdvisorySource;
pub use osv::OsvSource;
pub use source::{AlertsStatus, VulnerabilitySource, check_alerts, find_vulnerabilities};
pub use vulnerability::{Severity, VulnerabilityRecord, VulnerabilitySourceKind};
