//! Sequential build pipeline for one diagram file.
//!
//! [`Pipeline::run`] chains the steps below; the first error ends the run:
//!
//! 1. Read the diagram source
//! 2. Encode it and verify the encoding round-trips
//! 3. Validate it in text mode ([`AsciiValidator`])
//! 4. Download SVG and PNG renderings ([`fetch_artifacts`])
//! 5. Write the encoded payload to `<name>.encoded.txt`
//!
//! A round-trip failure stops the run before any process is spawned or any
//! request is made. Files written by earlier steps are left in place when a
//! later step fails.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::ascii::AsciiValidator;
use crate::codec::{EncodedPayload, encode, verify_round_trip};
use crate::consts::ENCODED_SUFFIX;
use crate::error::PipelineError;
use crate::fetch::{Fetcher, RenderedArtifacts, fetch_artifacts};
use crate::process::CommandRunner;
use crate::url::RenderEndpoint;

/// Base name used when a path has no file stem (e.g. `..`).
const FALLBACK_BASE_NAME: &str = "diagram";

/// Output file base name for an input path: the file name without its
/// final extension.
///
/// `docs/flow.puml` becomes `flow`.
#[must_use]
pub fn base_name_of(input_path: &Path) -> String {
    input_path.file_stem().map_or_else(
        || FALLBACK_BASE_NAME.to_owned(),
        |stem| stem.to_string_lossy().into_owned(),
    )
}

/// Everything a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Text-mode rendering.
    pub ascii_path: PathBuf,
    /// Downloaded renderings and their URLs.
    pub artifacts: RenderedArtifacts,
    /// File holding the encoded payload.
    pub encoded_path: PathBuf,
    /// Encoded payload.
    pub payload: EncodedPayload,
}

/// Diagram build pipeline.
///
/// Borrows its command runner and fetcher.
///
/// # Configuration
///
/// Create the pipeline with a command runner and fetcher, then configure
/// using builder methods:
/// - [`endpoint`](Self::endpoint): Rendering server (default: public `PlantUML` server)
/// - [`validator`](Self::validator): Text-mode command (default: `plantuml -ttxt -pipe`)
///
/// # Example
///
/// ```ignore
/// use plantpipe_diagrams::{HttpFetcher, Pipeline, ProcessRunner, RenderEndpoint};
///
/// let fetcher = HttpFetcher::default();
/// let pipeline = Pipeline::new(&ProcessRunner, &fetcher)
///     .endpoint(RenderEndpoint::new("http://localhost:8080"));
/// let report = pipeline.run(Path::new("flow.puml"), Path::new("dist"))?;
/// ```
pub struct Pipeline<'a> {
    runner: &'a dyn CommandRunner,
    fetcher: &'a dyn Fetcher,
    endpoint: RenderEndpoint,
    validator: AsciiValidator,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline using the given process runner and HTTP fetcher.
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner, fetcher: &'a dyn Fetcher) -> Self {
        Self {
            runner,
            fetcher,
            endpoint: RenderEndpoint::default(),
            validator: AsciiValidator::default(),
        }
    }

    /// Set the rendering server.
    #[must_use]
    pub fn endpoint(mut self, endpoint: RenderEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the text-mode validator.
    #[must_use]
    pub fn validator(mut self, validator: AsciiValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Run every step for `input_path`, writing into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns the first step's error; see [`PipelineError`].
    pub fn run(&self, input_path: &Path, output_dir: &Path) -> Result<PipelineReport, PipelineError> {
        info!(input = %input_path.display(), output = %output_dir.display(), "building diagram");

        let source = std::fs::read_to_string(input_path).map_err(PipelineError::io(input_path))?;
        let payload = encode(&source);
        self.run_encoded(input_path, output_dir, &source, payload)
    }

    /// Continue a run from an already encoded source.
    ///
    /// The round-trip check runs before any other step.
    pub(crate) fn run_encoded(
        &self,
        input_path: &Path,
        output_dir: &Path,
        source: &str,
        payload: EncodedPayload,
    ) -> Result<PipelineReport, PipelineError> {
        verify_round_trip(source, &payload)?;
        debug!(payload_len = payload.as_str().len(), "encoding verified");

        let ascii_path = self.validate_only(input_path, output_dir)?;

        let base_name = base_name_of(input_path);
        let artifacts = fetch_artifacts(
            &payload,
            output_dir,
            &base_name,
            &self.endpoint,
            self.fetcher,
        )?;

        let encoded_path = output_dir.join(format!("{base_name}.{ENCODED_SUFFIX}"));
        std::fs::write(&encoded_path, format!("{payload}\n"))
            .map_err(PipelineError::io(&encoded_path))?;

        info!(encoded = %encoded_path.display(), "diagram built");

        Ok(PipelineReport {
            ascii_path,
            artifacts,
            encoded_path,
            payload,
        })
    }

    /// Run only the text-mode validation step.
    ///
    /// # Errors
    ///
    /// See [`AsciiValidator::validate`].
    pub fn validate_only(
        &self,
        input_path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, PipelineError> {
        self.validator.validate(input_path, output_dir, self.runner)
    }
}
