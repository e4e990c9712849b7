use core::fmt;

use crate::JsonValue;

/// Converts raw bytes into [`JsonValue`] and back.
///
/// The schema engine never parses JSON itself; anything that can produce the value model can
/// be plugged in here.
pub trait JsonCodec: Send + Sync {
    /// Parse bytes into a value.
    ///
    /// # Errors
    ///
    /// If the input is not a well-formed document for this codec.
    fn decode(&self, bytes: &[u8]) -> Result<JsonValue, CodecError>;
    /// Serialize a value into bytes.
    ///
    /// # Errors
    ///
    /// If the value cannot be represented by this codec.
    fn encode(&self, value: &JsonValue) -> Result<Vec<u8>, CodecError>;
}

/// An error raised by a [`JsonCodec`].
#[derive(Debug)]
pub struct CodecError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CodecError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> CodecError {
        CodecError {
            message: message.into(),
            source: None,
        }
    }
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> CodecError {
        CodecError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn std::error::Error + 'static))
    }
}
