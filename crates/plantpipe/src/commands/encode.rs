//! `plantpipe encode` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use console::Term;
use plantpipe_diagrams::{EncodedPayload, PipelineError, encode, encode_hex, verify_round_trip};

use crate::error::CliError;

/// Arguments for the encode command.
#[derive(Args)]
pub(crate) struct EncodeArgs {
    /// `PlantUML` source file.
    #[arg(short, long)]
    input: PathBuf,

    /// Emit the uncompressed `~h` hex form.
    #[arg(long)]
    hex: bool,
}

impl EncodeArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let payload = encode_file(&self.input, self.hex)?;
        Term::stdout().write_line(payload.as_str())?;
        Ok(())
    }
}

/// Read and encode a diagram file, verifying the round trip.
fn encode_file(path: &Path, hex: bool) -> Result<EncodedPayload, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let payload = if hex {
        encode_hex(&source)
    } else {
        encode(&source)
    };
    verify_round_trip(&source, &payload).map_err(PipelineError::from)?;
    Ok(payload)
}
