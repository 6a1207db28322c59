mod analyze;
mod init;
mod validate;

pub use analyze::{AnalyzeArgs, analyze_repository};
pub use init::{InitArgs, init_config};
pub use validate::{ValidateArgs, validate_config};

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::io::Write;

/// Abstracts the process environment so commands can be driven from tests.
pub trait Host {
    /// Where regular output goes.
    fn output(&mut self) -> impl Write;

    /// Where diagnostics go.
    fn error(&mut self) -> impl Write;

    /// Terminate with the given exit code.
    fn exit(&mut self, code: i32);
}

#[derive(Parser, Debug)]
#[command(name = "repo-risk", version, about = "Appraise the sustainability and security risk of a source repository")]
struct Cli {
    /// Log progress details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a repository and write a markdown risk report
    Analyze(AnalyzeArgs),

    /// Write the default configuration file
    Init(InitArgs),

    /// Check that a configuration file is well formed
    Validate(ValidateArgs),
}

/// Parse the command line and run the selected command.
///
/// Failures are reported on the host's error stream and turn into exit code 1.
pub async fn run<H, I, T>(host: &mut H, args: I)
where
    H: Host,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = if e.use_stderr() {
                write!(host.error(), "{e}")
            } else {
                write!(host.output(), "{e}")
            };
            host.exit(e.exit_code());
            return;
        }
    };

    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Analyze(args) => analyze_repository(host, args).await,
        Commands::Init(args) => init_config(host, args),
        Commands::Validate(args) => validate_config(host, args),
    };

    if let Err(e) = result {
        let _ = writeln!(host.error(), "Error: {e:#}");
        host.exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    // a second initialization (e.g. across tests) keeps the first logger
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::try_parse_from([
            "repo-risk",
            "analyze",
            "octo/widgets",
            "--token",
            "abc",
            "--json",
            "--color",
            "never",
            "--error-if-high-risk",
            "--output",
            "out.md",
        ])
        .unwrap();

        let Commands::Analyze(args) = cli.command else {
            panic!("expected the analyze command");
        };
        assert_eq!(args.repo, "octo/widgets");
        assert_eq!(args.token.as_deref(), Some("abc"));
        assert!(args.json);
        assert!(args.error_if_high_risk);
        assert!(!args.error_if_medium_risk);
        assert_eq!(args.output.as_str(), "out.md");
    }

    #[test]
    fn test_analyze_requires_repository() {
        assert!(Cli::try_parse_from(["repo-risk", "analyze"]).is_err());
    }
}
