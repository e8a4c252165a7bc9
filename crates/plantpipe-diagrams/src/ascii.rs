//! Text-mode validation with the `plantuml` tool.
//!
//! `plantuml -ttxt -pipe` renders a diagram as ASCII art. It is much faster
//! than image rendering and prints syntax problems into its output, which
//! makes it a cheap syntax check before contacting a rendering server.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::consts::{ASCII_SUFFIX, DEFAULT_ASCII_ARGS, DEFAULT_PLANTUML_COMMAND};
use crate::error::PipelineError;
use crate::pipeline::base_name_of;
use crate::process::CommandRunner;

/// Matches anything `plantuml` prints about a broken diagram.
///
/// Deliberately coarse: diagram text containing either word is flagged too.
static ERROR_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)error|syntax").unwrap());

/// Check text-mode output for error or syntax markers (case-insensitive).
///
/// # Example
///
/// ```
/// use plantpipe_diagrams::has_error_markers;
///
/// assert!(!has_error_markers("Everything looks good"));
/// assert!(has_error_markers("Syntax Error?"));
/// ```
#[must_use]
pub fn has_error_markers(text: &str) -> bool {
    ERROR_MARKER.is_match(text)
}

/// Validates diagrams by rendering them in text mode.
///
/// # Configuration
///
/// Defaults to running `plantuml -ttxt -pipe`. Use [`new`](Self::new) to
/// point at a different executable (e.g. a wrapper script or `java -jar`).
#[derive(Debug, Clone)]
pub struct AsciiValidator {
    program: String,
    args: Vec<String>,
}

impl Default for AsciiValidator {
    fn default() -> Self {
        Self {
            program: DEFAULT_PLANTUML_COMMAND.to_owned(),
            args: DEFAULT_ASCII_ARGS.iter().map(|a| (*a).to_owned()).collect(),
        }
    }
}

impl AsciiValidator {
    /// Create a validator running `program` with `args`.
    ///
    /// The arguments must make the tool read the diagram from standard input
    /// and print the text rendering to standard output.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Executable name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Render `input_path` in text mode and check the output for errors.
    ///
    /// The output is written to `<output_dir>/<name>.ascii.txt` before it is
    /// checked, so it can be inspected when validation fails. `output_dir`
    /// and its missing ancestors are created.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Io`] if the input cannot be read or the output written
    /// - [`PipelineError::Invocation`] if the tool cannot run or exits unsuccessfully
    /// - [`PipelineError::RenderValidation`] if the output contains error markers
    pub fn validate(
        &self,
        input_path: &Path,
        output_dir: &Path,
        runner: &dyn CommandRunner,
    ) -> Result<PathBuf, PipelineError> {
        std::fs::create_dir_all(output_dir).map_err(PipelineError::io(output_dir))?;
        let ascii_path = output_dir.join(format!("{}.{ASCII_SUFFIX}", base_name_of(input_path)));

        let source = std::fs::read_to_string(input_path).map_err(PipelineError::io(input_path))?;
        debug!(input = %input_path.display(), bytes = source.len(), "rendering in text mode");

        let output = runner.run(&self.program, &self.args, &source)?;
        std::fs::write(&ascii_path, &output.stdout).map_err(PipelineError::io(&ascii_path))?;

        if has_error_markers(&output.stdout) {
            warn!(path = %ascii_path.display(), "text rendering reports errors");
            return Err(PipelineError::RenderValidation { path: ascii_path });
        }

        info!(path = %ascii_path.display(), "ASCII validation passed");
        Ok(ascii_path)
    }
}
