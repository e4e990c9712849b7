//! URI helpers shared by the registry and the resolver.
use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::Error;

/// Base URI used for documents that declare no `$id` and are compiled without an explicit one.
pub const DEFAULT_ROOT_URI: &str = "json-schema:///";

/// Characters escaped when a JSON Pointer is placed into a URI fragment.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'%')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'[')
    .add(b']');

/// Parse an absolute URI.
///
/// # Errors
///
/// Returns an error if the input is not an absolute URI.
pub fn from_str(uri: &str) -> Result<Url, Error> {
    Url::parse(uri).map_err(|error| Error::uri_parsing_error(uri, error))
}

/// The default root URI as a parsed [`Url`].
#[must_use]
pub fn default_root() -> Url {
    Url::parse(DEFAULT_ROOT_URI).unwrap_or_else(|_| unreachable!("Default root URI is valid"))
}

/// Resolve a URI reference against a base URI per RFC 3986.
///
/// # Errors
///
/// Returns an error if the reference can not be resolved against the base.
pub fn resolve_against(base: &Url, reference: &str) -> Result<Url, Error> {
    base.join(reference)
        .map_err(|error| Error::uri_resolving_error(reference, base.as_str(), error))
}

/// Canonical string form of a URI without its fragment. Used as a table key.
#[must_use]
pub fn without_fragment(uri: &Url) -> String {
    let mut uri = uri.clone();
    uri.set_fragment(None);
    uri.into()
}

/// Split a URI into its fragment-less key and its percent-decoded fragment.
///
/// An empty fragment (`http://example.com/schema#`) is the same as no fragment.
///
/// # Errors
///
/// Returns an error if the fragment is not valid percent-encoded UTF-8.
pub fn split_fragment(uri: &Url) -> Result<(String, Option<String>), Error> {
    let key = without_fragment(uri);
    match uri.fragment() {
        None | Some("") => Ok((key, None)),
        Some(fragment) => {
            let decoded = percent_decode_str(fragment)
                .decode_utf8()
                .map_err(|_| Error::invalid_percent_encoding(fragment))?;
            Ok((key, Some(decoded.into_owned())))
        }
    }
}

/// Percent-encode a JSON Pointer so it can be used as a URI fragment.
#[must_use]
pub fn encode_fragment(pointer: &str) -> Cow<'_, str> {
    utf8_percent_encode(pointer, FRAGMENT).into()
}

/// Whether `name` is a syntactically valid plain-name anchor.
#[must_use]
pub fn is_valid_anchor(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
}
