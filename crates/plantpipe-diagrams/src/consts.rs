//! Internal constants for the diagram pipeline.

/// Public `PlantUML` rendering server.
pub const DEFAULT_BASE_URL: &str = "https://www.plantuml.com/plantuml";

/// Executable used for text-mode validation.
pub const DEFAULT_PLANTUML_COMMAND: &str = "plantuml";

/// Arguments selecting text output with stdin/stdout piping.
pub const DEFAULT_ASCII_ARGS: [&str; 2] = ["-ttxt", "-pipe"];

/// Suffix of the persisted text-mode rendering.
pub(crate) const ASCII_SUFFIX: &str = "ascii.txt";

/// Suffix of the persisted encoded payload.
pub(crate) const ENCODED_SUFFIX: &str = "encoded.txt";
