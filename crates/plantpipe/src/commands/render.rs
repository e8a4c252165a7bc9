//! `plantpipe render` command implementation.

use std::path::PathBuf;

use clap::Args;
use plantpipe_config::{CliSettings, Config};
use plantpipe_diagrams::{HttpFetcher, Pipeline, PipelineReport, ProcessRunner, RenderEndpoint};
use tracing::debug;

use super::validator_from;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// `PlantUML` source file.
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory (default: dist/, or output.dir from config).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// `PlantUML` server URL (overrides config).
    #[arg(long, env = "PLANTPIPE_BASE_URL")]
    base_url: Option<String>,

    /// Path to configuration file (default: auto-discover plantpipe.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            base_url: self.base_url,
            output_dir: self.out_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let out_dir = &config.output_resolved.dir;
        debug!(config_path = ?config.config_path, "configuration loaded");

        output.info(&format!("Input: {}", self.input.display()));
        output.info(&format!("Output: {}", out_dir.display()));

        let runner = ProcessRunner;
        let fetcher = HttpFetcher::new(config.server.timeout());
        let report = Pipeline::new(&runner, &fetcher)
            .endpoint(RenderEndpoint::new(config.server.base_url.clone()))
            .validator(validator_from(&config))
            .run(&self.input, out_dir)?;

        output.success(&format!(
            "ASCII validation passed: {}",
            report.ascii_path.display()
        ));
        for (label, value) in report_fields(&report) {
            output.field(label, &value)?;
        }
        Ok(())
    }
}

/// Labelled lines printed to stdout after a successful render.
fn report_fields(report: &PipelineReport) -> [(&'static str, String); 5] {
    [
        ("SVG:", report.artifacts.svg_path.display().to_string()),
        ("PNG:", report.artifacts.png_path.display().to_string()),
        ("SVG URL:", report.artifacts.svg_url.clone()),
        ("PNG URL:", report.artifacts.png_url.clone()),
        ("Encoded:", report.encoded_path.display().to_string()),
    ]
}
