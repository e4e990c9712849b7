//! JSON Pointer locations used in evaluation output.
use std::{fmt, sync::Arc};

use referencing::pointer::escape_segment;

/// An immutable JSON Pointer, cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(Arc<str>);

/// A single step of a [`Location`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSegment<'a> {
    /// Property in a JSON object or a schema keyword.
    Property(&'a str),
    /// Index within a JSON array.
    Index(usize),
}

impl<'a> From<&'a str> for LocationSegment<'a> {
    #[inline]
    fn from(value: &'a str) -> LocationSegment<'a> {
        LocationSegment::Property(value)
    }
}

impl<'a> From<&'a String> for LocationSegment<'a> {
    #[inline]
    fn from(value: &'a String) -> LocationSegment<'a> {
        LocationSegment::Property(value)
    }
}

impl From<usize> for LocationSegment<'_> {
    #[inline]
    fn from(value: usize) -> Self {
        LocationSegment::Index(value)
    }
}

impl Location {
    /// The empty pointer, addressing the whole document.
    #[must_use]
    pub fn new() -> Self {
        Location(Arc::from(""))
    }
    #[must_use]
    pub fn join<'a>(&self, segment: impl Into<LocationSegment<'a>>) -> Self {
        let mut buffer = String::with_capacity(self.0.len() + 8);
        buffer.push_str(&self.0);
        buffer.push('/');
        match segment.into() {
            LocationSegment::Property(property) => buffer.push_str(&escape_segment(property)),
            LocationSegment::Index(idx) => buffer.push_str(&idx.to_string()),
        }
        Location(Arc::from(buffer))
    }
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::new()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Location {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
