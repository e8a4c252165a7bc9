//! CLI command implementations.

pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod render;
pub(crate) mod validate;

pub(crate) use decode::DecodeArgs;
pub(crate) use encode::EncodeArgs;
pub(crate) use render::RenderArgs;
pub(crate) use validate::ValidateArgs;

use plantpipe_config::Config;
use plantpipe_diagrams::AsciiValidator;

/// Text-mode validator for the configured `PlantUML` command.
fn validator_from(config: &Config) -> AsciiValidator {
    AsciiValidator::new(config.plantuml.command.clone(), config.plantuml.args.clone())
}
