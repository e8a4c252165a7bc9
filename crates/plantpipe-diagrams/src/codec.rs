//! `PlantUML` transport encoding.
//!
//! `PlantUML` servers accept diagram source embedded in a URL path segment.
//! The source is compressed with raw DEFLATE and written with a 6-bit
//! alphabet (`0-9A-Za-z-_`) that needs no escaping. Servers also accept a
//! `~h`-prefixed hex form, which [`decode`] understands as well.
//!
//! The encoding is defined by `PlantUML`; this module only guarantees that
//! whatever it emits decodes back to the same text (see [`verify_round_trip`]).

use std::fmt;
use std::io::{Read, Write};

use base64::Engine;
use base64::alphabet::Alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

/// Prefix marking the hex form of an encoded payload.
const HEX_PREFIX: &str = "~h";

const PLANTUML_ALPHABET: Alphabet =
    match Alphabet::new("0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_") {
        Ok(alphabet) => alphabet,
        Err(_) => panic!("PlantUML alphabet must be 64 unique ASCII characters"),
    };

/// `PlantUML` never emits `=` padding. Partial trailing groups produced by
/// other encoders are accepted on decode.
const PLANTUML_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &PLANTUML_ALPHABET,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Diagram source in `PlantUML` transport encoding.
///
/// Only produced by [`encode`] and [`encode_hex`], so every value is known
/// to come from valid UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    /// Borrow the encoded string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the payload and return the encoded string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodedPayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error decoding an encoded payload back to diagram source.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Nothing to decode.
    #[error("encoded payload is empty")]
    Empty,

    /// Character outside the `PlantUML` alphabet or invalid length.
    #[error("invalid PlantUML encoding: {0}")]
    Alphabet(#[from] base64::DecodeError),

    /// Malformed `~h` hex payload.
    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Decoded bytes are not a DEFLATE stream.
    #[error("payload is not a valid deflate stream: {0}")]
    Inflate(#[source] std::io::Error),

    /// Decompressed bytes are not UTF-8 text.
    #[error("decoded diagram is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode/decode round-trip failure.
///
/// Indicates a codec defect. Callers must abort rather than publish a
/// payload that does not describe the original diagram.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    /// The freshly encoded payload could not be decoded.
    #[error("Encode/decode roundtrip validation failed: {0}")]
    Undecodable(#[source] DecodeError),

    /// The payload decoded to different text.
    #[error("Encode/decode roundtrip validation failed: decoded source differs from input")]
    Mismatch,
}

/// Encode diagram source for use in a `PlantUML` server URL.
///
/// Deterministic and total: every `&str` has an encoding.
///
/// # Example
///
/// ```
/// use plantpipe_diagrams::{decode, encode};
///
/// let payload = encode("@startuml\nAlice -> Bob\n@enduml");
/// assert_eq!(decode(payload.as_str()).unwrap(), "@startuml\nAlice -> Bob\n@enduml");
/// ```
#[must_use]
pub fn encode(source: &str) -> EncodedPayload {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(source.len()), Compression::best());
    let mut compressed = encoder
        .write_all(source.as_bytes())
        .and_then(|()| encoder.finish())
        .expect("Writing to Vec buffer is infallible");

    // PlantUML always emits whole 4-character groups; the zero fill is
    // ignored by the decoder once the deflate stream ends.
    let padded_len = compressed.len().div_ceil(3) * 3;
    compressed.resize(padded_len, 0);

    EncodedPayload(PLANTUML_ENGINE.encode(&compressed))
}

/// Encode diagram source in the uncompressed `~h` hex form.
///
/// Longer than [`encode`] but readable with any hex tool.
#[must_use]
pub fn encode_hex(source: &str) -> EncodedPayload {
    EncodedPayload(format!("{HEX_PREFIX}{}", hex::encode(source)))
}

/// Decode an encoded payload back to diagram source.
///
/// Accepts both the compressed form produced by [`encode`] and the `~h`
/// hex form.
pub fn decode(payload: &str) -> Result<String, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }

    if let Some(hex_digits) = payload.strip_prefix(HEX_PREFIX) {
        let bytes = hex::decode(hex_digits)?;
        return Ok(String::from_utf8(bytes)?);
    }

    let compressed = PLANTUML_ENGINE.decode(payload)?;
    let mut inflated = Vec::with_capacity(compressed.len() * 4);
    DeflateDecoder::new(compressed.as_slice())
        .read_to_end(&mut inflated)
        .map_err(DecodeError::Inflate)?;

    Ok(String::from_utf8(inflated)?)
}

/// Check that `payload` decodes back to `source`.
///
/// Leading and trailing whitespace is ignored on both sides.
pub fn verify_round_trip(source: &str, payload: &EncodedPayload) -> Result<(), IntegrityError> {
    let decoded = decode(payload.as_str()).map_err(IntegrityError::Undecodable)?;
    if decoded.trim() == source.trim() {
        Ok(())
    } else {
        Err(IntegrityError::Mismatch)
    }
}
