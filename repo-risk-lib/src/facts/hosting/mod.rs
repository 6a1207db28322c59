mod activity;
mod provider;
mod snapshot;

pub use activity::{
    ActivityMetrics, ContributorProfile, LONG_LIVED_ISSUE_DAYS, LONG_LIVED_PULL_REQUEST_DAYS, ReleaseCadence, ResponseTimeSample,
    days_between, is_semver_tag,
};
pub use provider::Provider;
pub use snapshot::{LicenseInfo, RepositorySnapshot};
