//! SVG and PNG retrieval from a `PlantUML` server.
//!
//! This module handles downloading renderings of an encoded payload:
//! - [`Fetcher`] abstracts the HTTP GET so tests can count and fake requests
//! - [`HttpFetcher`] implements it with a reusable `ureq` agent
//! - [`fetch_artifacts`] downloads SVG then PNG and writes both to disk
//!
//! Requests are sequential. A failed SVG request stops the run before the
//! PNG is requested.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};
use ureq::Agent;

use crate::codec::EncodedPayload;
use crate::error::PipelineError;
use crate::url::{RenderEndpoint, build_urls};

/// Boxed error from a [`Fetcher`] transport.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Response to a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs GET requests for rendered diagrams.
pub trait Fetcher {
    /// Fetch `url`.
    ///
    /// Any HTTP status is a successful fetch; only transport failures
    /// (DNS, connection, TLS, body read) are errors.
    fn get(&self, url: &str) -> Result<FetchResponse, TransportError>;
}

/// [`Fetcher`] backed by a `ureq` agent.
///
/// The agent is reused across requests for connection pooling.
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    /// Create a fetcher with an optional global request timeout.
    ///
    /// Without a timeout, requests use the transport defaults.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<FetchResponse, TransportError> {
        let response = self.agent.get(url).call()?;
        let status = response.status().as_u16();
        let body = response.into_body().read_to_vec()?;
        Ok(FetchResponse { status, body })
    }
}

/// Which rendering a request was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Vector rendering.
    Svg,
    /// Raster rendering.
    Png,
}

impl ResourceKind {
    /// File extension and URL path segment.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Svg => f.write_str("SVG"),
            Self::Png => f.write_str("PNG"),
        }
    }
}

/// Error retrieving a rendering.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Server answered with a non-2xx status.
    #[error("Failed to retrieve {resource} from {url}: {status}")]
    Status {
        resource: ResourceKind,
        url: String,
        status: u16,
    },

    /// Request never produced a response.
    #[error("Failed to retrieve {resource} from {url}: {source}")]
    Transport {
        resource: ResourceKind,
        url: String,
        #[source]
        source: TransportError,
    },
}

impl FetchError {
    /// Which rendering failed.
    #[must_use]
    pub fn resource(&self) -> ResourceKind {
        match self {
            Self::Status { resource, .. } | Self::Transport { resource, .. } => *resource,
        }
    }
}

/// Downloaded renderings and where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    pub svg_path: PathBuf,
    pub png_path: PathBuf,
    pub svg_url: String,
    pub png_url: String,
}

/// GET `url` and require a 2xx response.
fn fetch_one(
    fetcher: &dyn Fetcher,
    resource: ResourceKind,
    url: &str,
) -> Result<Vec<u8>, FetchError> {
    debug!(%resource, url, "requesting rendering");

    let response = fetcher.get(url).map_err(|source| FetchError::Transport {
        resource,
        url: url.to_owned(),
        source,
    })?;

    if !response.is_success() {
        debug!(
            %resource,
            status = response.status,
            body = %String::from_utf8_lossy(&response.body),
            "rendering server returned an error"
        );
        return Err(FetchError::Status {
            resource,
            url: url.to_owned(),
            status: response.status,
        });
    }

    Ok(response.body)
}

/// Download the SVG and PNG renderings of `payload` into `output_dir`.
///
/// Files are named `<base_name>.svg` and `<base_name>.png`. Nothing is
/// written unless both downloads succeed. `output_dir` and its missing
/// ancestors are created.
///
/// # Errors
///
/// - [`PipelineError::Fetch`] on a transport failure or non-2xx status;
///   after an SVG failure the PNG is not requested
/// - [`PipelineError::Io`] if the directory or a file cannot be written
pub fn fetch_artifacts(
    payload: &EncodedPayload,
    output_dir: &Path,
    base_name: &str,
    endpoint: &RenderEndpoint,
    fetcher: &dyn Fetcher,
) -> Result<RenderedArtifacts, PipelineError> {
    std::fs::create_dir_all(output_dir).map_err(PipelineError::io(output_dir))?;

    let urls = build_urls(payload, endpoint);
    let svg_path = output_dir.join(format!("{base_name}.{}", ResourceKind::Svg.extension()));
    let png_path = output_dir.join(format!("{base_name}.{}", ResourceKind::Png.extension()));

    let svg = fetch_one(fetcher, ResourceKind::Svg, &urls.svg_url)?;
    let png = fetch_one(fetcher, ResourceKind::Png, &urls.png_url)?;

    std::fs::write(&svg_path, &svg).map_err(PipelineError::io(&svg_path))?;
    std::fs::write(&png_path, &png).map_err(PipelineError::io(&png_path))?;

    info!(
        svg = %svg_path.display(),
        png = %png_path.display(),
        "renderings downloaded"
    );

    Ok(RenderedArtifacts {
        svg_path,
        png_path,
        svg_url: urls.svg_url,
        png_url: urls.png_url,
    })
}
