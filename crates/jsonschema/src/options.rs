//! Registry configuration.
use std::{fmt, sync::Arc};

use ahash::AHashMap;
use jsonschema_ir::{JsonCodec, SerdeJsonCodec};
use referencing::{uri, Retrieve};

use crate::{
    error::CompileError,
    formats::{self, Format, Formats},
    regex::{PatternEngine, PatternOptions},
    registry::Registry,
};

/// Settings shared by every compilation and evaluation in one registry.
pub(crate) struct Config {
    pub(crate) pattern_engine: PatternEngine,
    pub(crate) assert_formats: bool,
    pub(crate) formats: Formats,
    pub(crate) codec: Arc<dyn JsonCodec>,
    pub(crate) loaders: AHashMap<String, Arc<dyn Retrieve>>,
}

impl Default for Config {
    fn default() -> Self {
        let pattern_engine = PatternEngine::default();
        Config {
            formats: formats::builtin(&pattern_engine),
            pattern_engine,
            assert_formats: false,
            codec: Arc::new(SerdeJsonCodec),
            loaders: AHashMap::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<_> = self.formats.keys().collect();
        formats.sort();
        let mut loaders: Vec<_> = self.loaders.keys().collect();
        loaders.sort();
        f.debug_struct("Config")
            .field("pattern_engine", &self.pattern_engine)
            .field("assert_formats", &self.assert_formats)
            .field("formats", &formats)
            .field("loaders", &loaders)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Registry`].
///
/// ```rust
/// use jsonschema::{PatternOptions, Registry};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = Registry::options()
///     .with_base_uri("https://example.com/schemas/")
///     .with_pattern_options(PatternOptions::regex())
///     .assert_formats(true)
///     .with_format("even-length", |value: &str| value.len() % 2 == 0)
///     .build()?;
/// # let _ = registry;
/// # Ok(())
/// # }
/// ```
pub struct RegistryOptions {
    base_uri: Option<String>,
    pattern_engine: PatternEngine,
    assert_formats: bool,
    formats: Formats,
    codec: Option<Arc<dyn JsonCodec>>,
    loaders: AHashMap<String, Arc<dyn Retrieve>>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        RegistryOptions {
            base_uri: None,
            pattern_engine: PatternEngine::default(),
            assert_formats: false,
            formats: AHashMap::new(),
            codec: None,
            loaders: AHashMap::new(),
        }
    }
}

impl RegistryOptions {
    /// Base URI that anonymous documents and relative names are resolved against.
    ///
    /// Defaults to `json-schema:///`.
    #[must_use]
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Regex engine and limits for `pattern`, `patternProperties` and `format: regex`.
    #[must_use]
    pub fn with_pattern_options<E>(mut self, options: PatternOptions<E>) -> Self
    where
        PatternOptions<E>: Into<PatternEngine>,
    {
        self.pattern_engine = options.into();
        self
    }

    /// Make `format` an assertion instead of an annotation.
    #[must_use]
    pub fn assert_formats(mut self, yes: bool) -> Self {
        self.assert_formats = yes;
        self
    }

    /// Register a format check. Overrides a built-in format with the same name.
    #[must_use]
    pub fn with_format<N, F>(mut self, name: N, format: F) -> Self
    where
        N: Into<String>,
        F: Format,
    {
        self.formats.insert(name.into(), Arc::new(format));
        self
    }

    /// Codec used by [`Registry::compile_bytes`], [`crate::Schema::evaluate_bytes`] and loaders.
    #[must_use]
    pub fn with_codec(mut self, codec: impl JsonCodec + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Register a loader for documents whose URI has the given scheme.
    ///
    /// Loaders are consulted during compilation for references that nothing in the registry
    /// resolves. Loaded documents are compiled as part of the same batch.
    #[must_use]
    pub fn with_loader(mut self, scheme: impl Into<String>, loader: impl Retrieve + 'static) -> Self {
        self.loaders.insert(scheme.into(), Arc::new(loader));
        self
    }

    /// Build an empty registry.
    ///
    /// # Errors
    ///
    /// If the base URI is not an absolute URI.
    pub fn build(self) -> Result<Registry, CompileError> {
        let base = match &self.base_uri {
            Some(base) => uri::from_str(base)?,
            None => uri::default_root(),
        };
        let mut formats = formats::builtin(&self.pattern_engine);
        formats.extend(self.formats);
        let config = Config {
            pattern_engine: self.pattern_engine,
            assert_formats: self.assert_formats,
            formats,
            codec: self.codec.unwrap_or_else(|| Arc::new(SerdeJsonCodec)),
            loaders: self.loaders,
        };
        tracing::debug!(base = %base, config = ?config, "Building registry");
        Ok(Registry::with_config(config, base))
    }
}

impl fmt::Debug for RegistryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<_> = self.formats.keys().collect();
        formats.sort();
        let mut loaders: Vec<_> = self.loaders.keys().collect();
        loaders.sort();
        f.debug_struct("RegistryOptions")
            .field("base_uri", &self.base_uri)
            .field("pattern_engine", &self.pattern_engine)
            .field("assert_formats", &self.assert_formats)
            .field("formats", &formats)
            .field("loaders", &loaders)
            .finish_non_exhaustive()
    }
}
