//! Rendering endpoint and URL composition.

use crate::codec::EncodedPayload;
use crate::consts::DEFAULT_BASE_URL;

/// Base URL of a `PlantUML` rendering server.
///
/// Any string is accepted. Exactly one trailing slash is removed so that
/// composed URLs never contain `//` at the join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderEndpoint(String);

impl RenderEndpoint {
    /// Create an endpoint from a base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }
        Self(base_url)
    }

    /// Normalized base URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RenderEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Locations of the SVG and PNG renderings of one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderUrls {
    pub svg_url: String,
    pub png_url: String,
}

/// Build the SVG and PNG URLs for an encoded payload.
///
/// # Example
///
/// ```
/// use plantpipe_diagrams::{RenderEndpoint, build_urls, encode};
///
/// let payload = encode("A -> B");
/// let urls = build_urls(&payload, &RenderEndpoint::new("https://example.com/plantuml/"));
/// assert_eq!(urls.svg_url, format!("https://example.com/plantuml/svg/{payload}"));
/// ```
#[must_use]
pub fn build_urls(payload: &EncodedPayload, endpoint: &RenderEndpoint) -> RenderUrls {
    let base = endpoint.as_str();
    RenderUrls {
        svg_url: format!("{base}/svg/{payload}"),
        png_url: format!("{base}/png/{payload}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_urls_strips_trailing_slash() {
        let payload = encode("@startuml\nAlice -> Bob: hello\n@enduml\n");
        let urls = build_urls(&payload, &RenderEndpoint::new("https://example.com/plantuml/"));

        assert_eq!(
            urls.svg_url,
            format!("https://example.com/plantuml/svg/{payload}")
        );
        assert_eq!(
            urls.png_url,
            format!("https://example.com/plantuml/png/{payload}")
        );
    }

    #[test]
    fn test_build_urls_without_trailing_slash() {
        let payload = encode("A -> B");
        let urls = build_urls(&payload, &RenderEndpoint::new("http://localhost:8080"));

        assert_eq!(urls.svg_url, format!("http://localhost:8080/svg/{payload}"));
        assert_eq!(urls.png_url, format!("http://localhost:8080/png/{payload}"));
    }

    #[test]
    fn test_endpoint_strips_exactly_one_slash() {
        let endpoint = RenderEndpoint::new("https://example.com//");
        assert_eq!(endpoint.as_str(), "https://example.com/");
    }

    #[test]
    fn test_endpoint_accepts_any_string() {
        assert_eq!(RenderEndpoint::new("not a url").as_str(), "not a url");
        assert_eq!(RenderEndpoint::new("").as_str(), "");
        assert_eq!(RenderEndpoint::new("/").as_str(), "");
    }

    #[test]
    fn test_default_endpoint() {
        let payload = encode("A -> B");
        let urls = build_urls(&payload, &RenderEndpoint::default());

        assert_eq!(
            urls.svg_url,
            format!("https://www.plantuml.com/plantuml/svg/{payload}")
        );
        assert_eq!(
            urls.png_url,
            format!("https://www.plantuml.com/plantuml/png/{payload}")
        );
    }
}
