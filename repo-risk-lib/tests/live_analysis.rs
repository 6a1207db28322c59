//! Analyses against the real services. Requires network access; enable with the
//! `network_tests` feature and optionally set `GITHUB_TOKEN` to avoid rate limits.

#![cfg(feature = "network_tests")]

use repo_risk_lib::config::Config;
use repo_risk_lib::facts::NoProgress;
use repo_risk_lib::{Analyzer, Rating};
use std::sync::Arc;

#[tokio::test]
async fn test_analyze_well_known_repository() {
    let token = std::env::var("GITHUB_TOKEN").ok();
    let analyzer = Analyzer::new(Config::default(), Arc::new(NoProgress));

    let result = analyzer.analyze_input("https://github.com/rust-lang/cargo", token.as_deref()).await;

    assert!(!result.is_not_applicable(), "{}", result.markdown);
    assert_ne!(result.rating, Rating::NotApplicable);
    assert!(result.markdown.contains("# Repository Risk Report: rust-lang/cargo"));
}
