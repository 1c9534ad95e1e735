//! # bencode-codec — canonical bencode encoding and decoding
//!
//! Bencode expresses four shapes: integers (`i42e`), byte strings (`4:spam`),
//! lists (`li1ei2ee`) and dictionaries with sorted unique keys
//! (`d3:cow3:moo4:spam4:eggse`). This crate maps native Rust values onto those
//! shapes and back.
//!
//! ## Encoding
//!
//! Anything implementing [`Encode`] can be encoded: integers and `bool`,
//! strings, [`ByteBuf`], slices/`Vec`/arrays, `Option`, `HashMap`/`BTreeMap`
//! with text, byte or integer keys, [`Value`], and records declared with
//! [`record!`]. Map keys are always emitted in ascending byte order, so the
//! same map encodes to the same bytes whatever its insertion order.
//! Floating-point values are rejected.
//!
//! ## Decoding
//!
//! [`decode`] parses exactly one value into a [`Value`], accepting only
//! canonical input (no `i-0e`, no `i01e`, no out-of-order or duplicate keys, no
//! trailing bytes). [`decode_into`] additionally projects the value onto a
//! [`Decode`] type.
//!
//! ## Records
//!
//! ```
//! use bencode_codec::{decode_into, encode, record};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Identity {
//!     age: i64,
//!     first_name: String,
//!     ignored: String,
//!     last_name: String,
//! }
//!
//! record!(Identity {
//!     age: "Age",
//!     first_name: "FirstName",
//!     ignored: "-",
//!     last_name: "LastName",
//! });
//!
//! let id = Identity { age: 42, first_name: "Jack".into(), ignored: "x".into(), last_name: "Daniel".into() };
//! let bytes = encode(&id).unwrap();
//! assert_eq!(bytes, b"d3:Agei42e9:FirstName4:Jack8:LastName6:Daniele");
//! let back: Identity = decode_into(&bytes).unwrap();
//! assert_eq!(back.ignored, "");
//! ```
//!
//! The free functions use a fresh [`Codec`] per call; keep a `Codec` around to
//! reuse its record field cache or to change [`CodecConfig`].

pub mod codec;
pub mod config;
pub mod decode;
pub mod dump;
pub mod encode;
pub mod error;
pub mod fields;
pub mod parser;
pub mod value;

pub use codec::Codec;
pub use config::{CodecConfig, MissingFieldPolicy, RecordKeyOrder, UnknownKeyPolicy};
pub use decode::{Decode, Decoder, FromDictKey};
pub use encode::{ByteBuf, DictKey, Encode, Encoder};
pub use error::{ConfigError, DecodeError, EncodeError, FieldError, FieldPath, PathSegment};
pub use fields::{FieldCache, FieldDescriptor, FieldTag, Record, RecordFields};
pub use value::{Dict, Integer, Kind, Value};

/// Encode `value` with a default codec.
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    Codec::default().encode(value)
}

/// Parse `bytes` as exactly one value with a default codec.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    Codec::default().decode(bytes)
}

/// Parse `bytes` and project the value onto `T` with a default codec.
pub fn decode_into<T: Decode>(bytes: &[u8]) -> Result<T, DecodeError> {
    Codec::default().decode_into(bytes)
}
