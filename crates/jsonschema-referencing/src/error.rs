use core::fmt;
use std::error;

/// Errors that can occur during reference resolution and resource handling.
#[derive(Debug)]
pub enum Error {
    /// A resource is not present in a registry and retrieving it failed.
    Unretrievable {
        uri: String,
        source: Box<dyn error::Error + Send + Sync>,
    },
    /// A resource is not present in a registry.
    Unresolvable { uri: String },
    /// A JSON Pointer leads to a part of a document that does not exist or is not a schema.
    PointerToNowhere { pointer: String },
    /// An anchor does not exist within a particular resource.
    NoSuchAnchor { anchor: String },
    /// An anchor which could never exist in a resource was dereferenced.
    InvalidAnchor { anchor: String },
    /// The same anchor name is declared twice within one resource.
    DuplicateAnchor { base: String, anchor: String },
    /// An error occurred while parsing or manipulating a URI.
    InvalidUri(UriError),
}

impl Error {
    pub fn unretrievable(
        uri: impl Into<String>,
        source: Box<dyn error::Error + Send + Sync>,
    ) -> Error {
        Error::Unretrievable {
            uri: uri.into(),
            source,
        }
    }
    pub fn unresolvable(uri: impl Into<String>) -> Error {
        Error::Unresolvable { uri: uri.into() }
    }
    pub fn pointer_to_nowhere(pointer: impl Into<String>) -> Error {
        Error::PointerToNowhere {
            pointer: pointer.into(),
        }
    }
    pub fn no_such_anchor(anchor: impl Into<String>) -> Error {
        Error::NoSuchAnchor {
            anchor: anchor.into(),
        }
    }
    pub fn invalid_anchor(anchor: impl Into<String>) -> Error {
        Error::InvalidAnchor {
            anchor: anchor.into(),
        }
    }
    pub fn duplicate_anchor(base: impl Into<String>, anchor: impl Into<String>) -> Error {
        Error::DuplicateAnchor {
            base: base.into(),
            anchor: anchor.into(),
        }
    }
    pub(crate) fn uri_parsing_error(uri: impl Into<String>, error: url::ParseError) -> Error {
        Error::InvalidUri(UriError::Parse {
            uri: uri.into(),
            error,
        })
    }
    pub(crate) fn uri_resolving_error(
        reference: impl Into<String>,
        base: impl Into<String>,
        error: url::ParseError,
    ) -> Error {
        Error::InvalidUri(UriError::Resolve {
            reference: reference.into(),
            base: base.into(),
            error,
        })
    }
    pub(crate) fn invalid_percent_encoding(fragment: impl Into<String>) -> Error {
        Error::InvalidUri(UriError::InvalidPercentEncoding {
            fragment: fragment.into(),
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unretrievable { uri, source } => f.write_fmt(format_args!(
                "Resource '{uri}' is not present in a registry and retrieving it failed: {source}"
            )),
            Error::Unresolvable { uri } => {
                f.write_fmt(format_args!("Resource '{uri}' is not present in a registry"))
            }
            Error::PointerToNowhere { pointer } => {
                f.write_fmt(format_args!("Pointer '{pointer}' does not exist"))
            }
            Error::NoSuchAnchor { anchor } => {
                f.write_fmt(format_args!("Anchor '{anchor}' does not exist"))
            }
            Error::InvalidAnchor { anchor } => {
                f.write_fmt(format_args!("Anchor '{anchor}' is invalid"))
            }
            Error::DuplicateAnchor { base, anchor } => f.write_fmt(format_args!(
                "Anchor '{anchor}' is declared more than once in '{base}'"
            )),
            Error::InvalidUri(error) => error.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Unretrievable { source, .. } => Some(&**source),
            Error::InvalidUri(error) => Some(error),
            _ => None,
        }
    }
}

/// Errors that can occur during URI handling.
#[derive(Debug)]
pub enum UriError {
    Parse {
        uri: String,
        error: url::ParseError,
    },
    Resolve {
        reference: String,
        base: String,
        error: url::ParseError,
    },
    InvalidPercentEncoding {
        fragment: String,
    },
}

impl fmt::Display for UriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriError::Parse { uri, error } => {
                f.write_fmt(format_args!("Invalid URI reference '{uri}': {error}"))
            }
            UriError::Resolve {
                reference,
                base,
                error,
            } => f.write_fmt(format_args!(
                "Failed to resolve '{reference}' against '{base}': {error}"
            )),
            UriError::InvalidPercentEncoding { fragment } => f.write_fmt(format_args!(
                "Fragment '{fragment}' is not valid percent-encoded UTF-8"
            )),
        }
    }
}

impl error::Error for UriError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            UriError::Parse { error, .. } | UriError::Resolve { error, .. } => Some(error),
            UriError::InvalidPercentEncoding { .. } => None,
        }
    }
}
