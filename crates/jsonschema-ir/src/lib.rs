//! Immutable JSON value model.
//!
//! Every part of the schema engine operates over [`JsonValue`] rather than a concrete JSON
//! library. Conversions from and to `serde_json` live behind the `serde_json` feature, and the
//! [`JsonCodec`] trait is the single point where bytes become values.
mod codec;
mod impls;
mod value;

pub use codec::{CodecError, JsonCodec};
#[cfg(feature = "serde_json")]
pub use impls::serde_json::SerdeJsonCodec;
pub use value::{pointer, JsonValue, Map, Number};
