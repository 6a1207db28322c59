#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! This is an implementation detail of the repo-risk tool. Do not take a dependency on this crate
//! as it may change in incompatible ways without warning.

// Core library for repo-risk
//
// This library consolidates all functionality for the repo-risk tool, which appraises the
// sustainability and security posture of a hosted source repository.
//
// # Module Organization
//
// - [`commands`]: Command-line interface and orchestration
// - [`config`]: Configuration file handling
// - [`facts`]: Data collection from the hosting API and dependency ecosystems
// - [`ranking`]: Weighted risk scoring
// - [`reports`]: Markdown and console rendering
// - [`analyzer`]: The engine entry point tying everything together

pub type Result<T, E = anyhow::Error> = core::result::Result<T, E>;

macro_rules! declare_modules {
    ($($mod:ident),+ $(,)?) => {
        $(
            #[cfg(debug_assertions)]
            pub mod $mod;
            #[cfg(not(debug_assertions))]
            mod $mod;
        )+
    };
}

declare_modules!(commands, reports);

pub mod analyzer;
pub mod config;
pub mod facts;
pub mod ranking;

pub use crate::analyzer::{AnalysisResult, Analyzer};
pub use crate::commands::{Host, run};
pub use crate::facts::RepoSpec;
pub use crate::ranking::{Rating, RiskFactor, Score};
