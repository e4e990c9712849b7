//! # referencing
//!
//! URI resolution for JSON Schema references: resolving relative references against base URIs,
//! splitting fragments into JSON Pointers or anchor names, and looking them up in a
//! [`ResolutionTable`] keyed by canonical URIs.
mod anchors;
mod error;
pub mod pointer;
mod retriever;
mod table;
pub mod uri;

pub use anchors::{AnchorKey, AnchorKind};
pub use error::{Error, UriError};
pub use retriever::{DefaultRetriever, Retrieve};
pub use table::ResolutionTable;
pub use url::Url;
