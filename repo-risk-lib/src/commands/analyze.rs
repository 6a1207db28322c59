use super::Host;
use crate::Result;
use crate::analyzer::{AnalysisResult, Analyzer};
use crate::config::Config;
use crate::facts::{Progress, ProgressReporter, RepoSpec};
use crate::ranking::Rating;
use crate::reports::{self, ColorMode};
use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use core::time::Duration;
use std::fs;
use std::io::Write;
use std::sync::Arc;

/// Log target for the analyze command
const LOG_TARGET: &str = "analyze";

/// How long an analysis runs before a progress bar appears.
const PROGRESS_DELAY: Duration = Duration::from_millis(750);

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Repository to analyze, as a URL or `owner/name`
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Token used to authenticate hosting API requests
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to the configuration file (defaults to `repo-risk.toml` when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Where to write the markdown report
    #[arg(long, short, value_name = "PATH", default_value = "repo-risk-report.md")]
    pub output: Utf8PathBuf,

    /// Also print the analysis result as JSON
    #[arg(long)]
    pub json: bool,

    /// When to color console output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Exit with status 1 when the repository is rated high risk
    #[arg(long)]
    pub error_if_high_risk: bool,

    /// Exit with status 1 when the repository is rated medium or high risk
    #[arg(long)]
    pub error_if_medium_risk: bool,
}

pub async fn analyze_repository<H: Host>(host: &mut H, args: &AnalyzeArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let analysis_timeout = config.analysis_timeout;

    let progress = Arc::new(ProgressReporter::new(PROGRESS_DELAY));
    let analyzer = Analyzer::new(config, Arc::clone(&progress) as Arc<dyn Progress>);

    log::info!(target: LOG_TARGET, "Analyzing '{}'", args.repo);
    let outcome = tokio::time::timeout(analysis_timeout, analyzer.analyze_input(&args.repo, args.token.as_deref())).await;
    progress.finish();
    let result = outcome.with_context(|| format!("analysis of '{}' did not finish within {analysis_timeout:?}", args.repo))?;

    fs::write(&args.output, &result.markdown).with_context(|| format!("writing report to '{}'", args.output))?;
    report(host, args, &result)?;

    check_gates(args, &result)
}

fn report<H: Host>(host: &mut H, args: &AnalyzeArgs, result: &AnalysisResult) -> Result<()> {
    let label = args.repo.parse::<RepoSpec>().map_or_else(|_| args.repo.clone(), |repo| repo.to_string());
    let summary = reports::generate_console(&label, result.score, result.rating, &result.risk_factors, args.color.enabled());

    let mut out = host.output();
    write!(out, "{summary}")?;
    writeln!(out, "Report written to {}", args.output)?;

    if args.json {
        let json = serde_json::to_string_pretty(result).context("serializing the analysis result")?;
        writeln!(out, "{json}")?;
    }

    Ok(())
}

fn check_gates(args: &AnalyzeArgs, result: &AnalysisResult) -> Result<()> {
    if result.is_not_applicable() {
        bail!("could not analyze '{}'", args.repo);
    }

    let tripped = match result.rating {
        Rating::High => args.error_if_high_risk || args.error_if_medium_risk,
        Rating::Medium => args.error_if_medium_risk,
        Rating::Low | Rating::NotApplicable => false,
    };

    if tripped {
        bail!("'{}' is rated {} risk (score {})", args.repo, result.rating, result.score);
    }

    Ok(())
}
