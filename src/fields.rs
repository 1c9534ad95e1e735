//! Field introspection for structured records.
//!
//! A record type lists its fields with a tag each (see [`record!`](crate::record)).
//! The first time a codec sees the type, the tags are resolved into
//! [`FieldDescriptor`]s and cached for the codec's lifetime.
//!
//! ## Tag vocabulary
//!
//! - `""`: wire name is the field name
//! - `"name"`: wire name override
//! - `"-"`: field is never encoded nor populated on decode
//! - `",omitempty"` / `"name,omitempty"`: skip the field on encode when its value is empty
//! - `"-,"`: wire name is literally `-`

use crate::decode::Decoder;
use crate::encode::Encode;
use crate::error::{DecodeError, FieldError};
use crate::value::Value;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Field name and tag as declared on a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag {
    pub field: &'static str,
    pub tag: &'static str,
}

/// How one record field maps to a dictionary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Rust field name, used to reach the value through [`Record`].
    pub field: &'static str,
    pub wire_name: &'static str,
    pub omit_empty: bool,
    /// Position in the declaration.
    pub index: usize,
}

/// A structured record: a type whose named fields map onto a dictionary.
///
/// Implement it with the [`record!`](crate::record) macro rather than by hand.
pub trait Record: Default + 'static {
    /// Fields in declaration order.
    const FIELDS: &'static [FieldTag];

    /// Borrow a field for encoding.
    fn field(&self, name: &str) -> Option<&dyn Encode>;

    /// Decode `value` into the named field. Unknown names are ignored.
    fn decode_field(
        &mut self,
        name: &str,
        value: &Value,
        dec: &mut Decoder<'_>,
    ) -> Result<(), DecodeError>;
}

/// Resolved descriptors of one record type.
#[derive(Debug)]
pub struct RecordFields {
    pub record: &'static str,
    fields: Vec<FieldDescriptor>,
    /// Indices into `fields`, ordered by wire name bytes.
    sorted: Vec<usize>,
}

impl RecordFields {
    /// Resolve the tags of `R`. Fails on duplicate wire names or unknown tag options.
    pub fn build<R: Record>() -> Result<Self, FieldError> {
        let record = type_name::<R>();
        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(R::FIELDS.len());
        for (index, tag) in R::FIELDS.iter().enumerate() {
            let Some(parsed) = parse_tag(record, tag)? else {
                continue;
            };
            if let Some(prev) = fields.iter().find(|d| d.wire_name == parsed.wire_name) {
                return Err(FieldError::DuplicateWireName {
                    record,
                    wire_name: parsed.wire_name,
                    first: prev.field,
                    second: tag.field,
                });
            }
            fields.push(FieldDescriptor {
                field: tag.field,
                wire_name: parsed.wire_name,
                omit_empty: parsed.omit_empty,
                index,
            });
        }
        let mut sorted: Vec<usize> = (0..fields.len()).collect();
        sorted.sort_by(|&a, &b| fields[a].wire_name.as_bytes().cmp(fields[b].wire_name.as_bytes()));
        Ok(RecordFields { record, fields, sorted })
    }

    /// Descriptors in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Descriptors in ascending wire-name order.
    pub fn sorted(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.sorted.iter().map(move |&i| &self.fields[i])
    }

    pub fn lookup(&self, wire_name: &[u8]) -> Option<&FieldDescriptor> {
        self.sorted
            .binary_search_by(|&i| self.fields[i].wire_name.as_bytes().cmp(wire_name))
            .ok()
            .map(|pos| &self.fields[self.sorted[pos]])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

struct ParsedTag {
    wire_name: &'static str,
    omit_empty: bool,
}

/// `Ok(None)` means the field is ignored.
fn parse_tag(record: &'static str, tag: &FieldTag) -> Result<Option<ParsedTag>, FieldError> {
    let spec = tag.tag;
    if spec == "-" {
        return Ok(None);
    }
    let (name, options) = match spec.split_once(',') {
        Some((name, options)) => (name, Some(options)),
        None => (spec, None),
    };
    let mut omit_empty = false;
    for option in options.into_iter().flat_map(|o| o.split(',')) {
        match option {
            "omitempty" => omit_empty = true,
            "" => {}
            other => {
                return Err(FieldError::UnknownTagOption {
                    record,
                    field: tag.field,
                    option: other,
                })
            }
        }
    }
    let wire_name = if name.is_empty() { tag.field } else { name };
    Ok(Some(ParsedTag { wire_name, omit_empty }))
}

/// Per-codec cache of record descriptors, keyed by type.
///
/// Lookups take a shared lock; a miss builds the descriptors outside the lock and
/// publishes them under the write lock (first publisher wins).
#[derive(Debug, Default)]
pub struct FieldCache {
    entries: RwLock<HashMap<TypeId, Arc<RecordFields>>>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptors<R: Record>(&self) -> Result<Arc<RecordFields>, FieldError> {
        let id = TypeId::of::<R>();
        if let Some(found) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Ok(Arc::clone(found));
        }
        let built = RecordFields::build::<R>()?;
        debug!(record = built.record, fields = built.len(), "built record field descriptors");
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(id).or_insert_with(|| Arc::new(built))))
    }

    /// Number of record types resolved so far.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Implement [`Record`], [`Encode`] and [`Decode`](crate::Decode) for a struct
/// with named fields.
///
/// Every listed field must implement `Encode` and `Decode`; the struct must
/// implement `Default` (the zero value used for absent fields). Fields are
/// listed in declaration order, each with an optional tag.
///
/// A `Vec<u8>` field encodes as a list of integers; declare opaque byte fields
/// as [`ByteBuf`](crate::ByteBuf) to get a byte string.
///
/// ```
/// use bencode_codec::record;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Peer {
///     id: String,
///     port: u16,
///     note: String,
/// }
///
/// record!(Peer { id: "peer id", port, note: ",omitempty" });
///
/// let bytes = bencode_codec::encode(&Peer { id: "abc".into(), port: 6881, note: String::new() }).unwrap();
/// assert_eq!(bytes, b"d7:peer id3:abc4:porti6881ee");
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($field:ident $(: $tag:literal)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            const FIELDS: &'static [$crate::FieldTag] = &[
                $($crate::FieldTag {
                    field: stringify!($field),
                    tag: $crate::__record_tag!($($tag)?),
                }),*
            ];

            #[allow(unused_variables)]
            fn field(&self, name: &str) -> Option<&dyn $crate::Encode> {
                $(if name == stringify!($field) {
                    return Some(&self.$field);
                })*
                None
            }

            #[allow(unused_variables)]
            fn decode_field(
                &mut self,
                name: &str,
                value: &$crate::Value,
                dec: &mut $crate::Decoder<'_>,
            ) -> Result<(), $crate::DecodeError> {
                $(if name == stringify!($field) {
                    return dec.decode_in_place(&mut self.$field, value);
                })*
                Ok(())
            }
        }

        impl $crate::Encode for $ty {
            fn encode(&self, enc: &mut $crate::Encoder<'_>) -> Result<(), $crate::EncodeError> {
                enc.write_record(self)
            }
        }

        impl $crate::Decode for $ty {
            fn decode(value: &$crate::Value, dec: &mut $crate::Decoder<'_>) -> Result<Self, $crate::DecodeError> {
                dec.decode_record(value)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_tag {
    () => {
        ""
    };
    ($tag:literal) => {
        $tag
    };
}
