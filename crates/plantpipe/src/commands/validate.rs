//! `plantpipe validate` command implementation.

use std::path::PathBuf;

use clap::Args;
use plantpipe_config::{CliSettings, Config};
use plantpipe_diagrams::ProcessRunner;
use tracing::debug;

use super::validator_from;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the validate command.
#[derive(Args)]
pub(crate) struct ValidateArgs {
    /// `PlantUML` source file.
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the ASCII rendering (default: dist/).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover plantpipe.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ValidateArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.out_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        debug!(config_path = ?config.config_path, "configuration loaded");

        let ascii_path = validator_from(&config).validate(
            &self.input,
            &config.output_resolved.dir,
            &ProcessRunner,
        )?;

        output.success(&format!(
            "ASCII generated successfully: {}",
            ascii_path.display()
        ));
        Ok(())
    }
}
