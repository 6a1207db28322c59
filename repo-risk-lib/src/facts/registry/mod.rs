mod provider;
mod staleness;

pub use provider::Provider;
pub use staleness::{OutdatedDependencyRecord, Staleness, Urgency, VersionDelta, classify, coerce_version};
