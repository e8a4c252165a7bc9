//! `PlantUML` build pipeline.
//!
//! This crate turns a `PlantUML` source file into checked build artifacts:
//! - Encodes diagram source into the compact `PlantUML` transport encoding
//!   and proves the encoding round-trips before trusting it
//! - Validates the diagram with the `plantuml` tool in text mode
//! - Downloads SVG and PNG renderings from a `PlantUML` server
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`codec`]: `PlantUML` deflate + 6-bit encoding ([`encode`], [`decode`])
//! - [`url`]: Rendering endpoint and URL composition ([`build_urls`])
//! - [`process`]: External command invocation ([`CommandRunner`], [`ProcessRunner`])
//! - [`ascii`]: Text-mode validation ([`AsciiValidator`])
//! - [`fetch`]: SVG/PNG retrieval ([`Fetcher`], [`HttpFetcher`], [`fetch_artifacts`])
//! - [`pipeline`]: Sequential orchestration ([`Pipeline`])
//!
//! External collaborators (the `plantuml` process and the HTTP server) are
//! passed in as trait objects so tests can substitute deterministic fakes.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use plantpipe_diagrams::{HttpFetcher, Pipeline, ProcessRunner};
//!
//! let runner = ProcessRunner;
//! let fetcher = HttpFetcher::new(None);
//! let report = Pipeline::new(&runner, &fetcher)
//!     .run(Path::new("docs/flow.puml"), Path::new("dist"))?;
//! println!("{}", report.artifacts.svg_url);
//! ```

pub mod ascii;
pub mod codec;
mod consts;
mod error;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod url;

pub use ascii::{AsciiValidator, has_error_markers};
pub use codec::{
    DecodeError, EncodedPayload, IntegrityError, decode, encode, encode_hex, verify_round_trip,
};
pub use consts::{DEFAULT_ASCII_ARGS, DEFAULT_BASE_URL, DEFAULT_PLANTUML_COMMAND};
pub use error::PipelineError;
pub use fetch::{
    FetchError, FetchResponse, Fetcher, HttpFetcher, RenderedArtifacts, ResourceKind,
    TransportError, fetch_artifacts,
};
pub use pipeline::{Pipeline, PipelineReport, base_name_of};
pub use process::{CommandOutput, CommandRunner, InvocationError, ProcessRunner};
pub use url::{RenderEndpoint, RenderUrls, build_urls};
