//! `plantpipe decode` command implementation.

use clap::Args;
use console::Term;
use plantpipe_diagrams::{PipelineError, decode};

use crate::error::CliError;

/// Arguments for the decode command.
#[derive(Args)]
pub(crate) struct DecodeArgs {
    /// Encoded payload, e.g. the contents of a `.encoded.txt` file.
    payload: String,
}

impl DecodeArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let source = decode(self.payload.trim()).map_err(PipelineError::from)?;
        Term::stdout().write_line(source.trim_end())?;
        Ok(())
    }
}
