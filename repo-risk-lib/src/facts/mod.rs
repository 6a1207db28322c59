//! Data collection from the hosting API and the dependency ecosystems.

pub mod advisories;
mod batching;
mod fetched;
#[cfg(test)]
pub(crate) mod fixtures;
mod gateway;
pub mod hosting;
pub mod manifest;
pub mod probes;
mod progress;
mod progress_reporter;
pub mod registry;
mod repo_facts;
mod repo_spec;
mod request_tracker;

pub use batching::Batching;
pub use fetched::Fetched;
pub use gateway::Gateway;
pub use progress::{NoProgress, Progress};
pub use progress_reporter::ProgressReporter;
pub use repo_facts::{DependencyFacts, RepoFacts};
pub use repo_spec::RepoSpec;
pub use request_tracker::RequestTracker;
