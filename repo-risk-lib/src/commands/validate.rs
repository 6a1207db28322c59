use super::Host;
use crate::Result;
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use anyhow::bail;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the configuration file (defaults to `repo-risk.toml`)
    #[arg(long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let path = args.config.as_deref().unwrap_or_else(|| Utf8Path::new(DEFAULT_CONFIG_FILE));
    if !path.exists() {
        bail!("could not find configuration file '{path}'");
    }

    let _ = Config::load(Some(path))?;
    writeln!(host.output(), "Configuration file '{path}' is valid")?;
    Ok(())
}
