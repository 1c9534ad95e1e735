//! Typed reconstruction: project a parsed [`Value`] onto a native type.
//!
//! Records go through the same field descriptors the encoder uses. Unknown keys
//! and missing fields follow the codec's [`CodecConfig`] policies.

use crate::config::{CodecConfig, MissingFieldPolicy, UnknownKeyPolicy};
use crate::encode::ByteBuf;
use crate::error::{DecodeError, FieldPath};
use crate::fields::{FieldCache, Record};
use crate::value::{Dict, Integer, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;
use tracing::trace;

/// A type that can be rebuilt from a decoded [`Value`].
pub trait Decode: Sized {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError>;
}

/// Types usable as map keys when decoding dictionaries.
pub trait FromDictKey: Sized {
    /// Name used in `InvalidKey` errors.
    const TARGET: &'static str;

    fn from_key(key: &[u8]) -> Option<Self>;
}

/// Projection state for one `decode_into` call.
pub struct Decoder<'a> {
    fields: &'a FieldCache,
    config: &'a CodecConfig,
    path: FieldPath,
}

impl<'a> Decoder<'a> {
    pub fn new(fields: &'a FieldCache, config: &'a CodecConfig) -> Self {
        Decoder {
            fields,
            config,
            path: FieldPath::default(),
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Overwrite `slot` with the decoded value; `slot` is untouched on error.
    pub fn decode_in_place<T: Decode>(&mut self, slot: &mut T, value: &Value) -> Result<(), DecodeError> {
        *slot = T::decode(value, self)?;
        Ok(())
    }

    pub fn shape_mismatch(&self, expected: &'static str, found: &Value) -> DecodeError {
        DecodeError::ShapeMismatch {
            expected,
            found: found.kind(),
            path: self.path.clone(),
        }
    }

    pub fn unsupported(&self, type_name: &'static str) -> DecodeError {
        DecodeError::UnsupportedType {
            type_name,
            path: self.path.clone(),
        }
    }

    pub fn expect_integer<'v>(&self, value: &'v Value) -> Result<&'v Integer, DecodeError> {
        value.as_integer().ok_or_else(|| self.shape_mismatch("integer", value))
    }

    pub fn expect_bytes<'v>(&self, value: &'v Value) -> Result<&'v [u8], DecodeError> {
        value.as_bytes().ok_or_else(|| self.shape_mismatch("byte string", value))
    }

    pub fn expect_list<'v>(&self, value: &'v Value) -> Result<&'v [Value], DecodeError> {
        value.as_list().ok_or_else(|| self.shape_mismatch("list", value))
    }

    pub fn expect_dict<'v>(&self, value: &'v Value) -> Result<&'v Dict, DecodeError> {
        value.as_dict().ok_or_else(|| self.shape_mismatch("dictionary", value))
    }

    /// Convert an integer to a native width, failing if it does not fit.
    pub fn integer_as<T: std::str::FromStr>(
        &self,
        value: &Value,
        target: &'static str,
    ) -> Result<T, DecodeError> {
        let n = self.expect_integer(value)?;
        n.as_str().parse().map_err(|_| DecodeError::IntegerRangeExceeded {
            value: n.to_string(),
            target,
            path: self.path.clone(),
        })
    }

    pub fn decode_list<T: Decode>(&mut self, value: &Value) -> Result<Vec<T>, DecodeError> {
        let items = self.expect_list(value)?;
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            self.path.push_index(i);
            out.push(T::decode(item, self)?);
            self.path.pop();
        }
        Ok(out)
    }

    /// Decode every dictionary entry, converting keys with [`FromDictKey`].
    pub fn decode_entries<K: FromDictKey, V: Decode>(
        &mut self,
        value: &Value,
    ) -> Result<Vec<(K, V)>, DecodeError> {
        let dict = self.expect_dict(value)?;
        let mut out = Vec::with_capacity(dict.len());
        for (key, item) in dict {
            self.path.push_key(key);
            let k = K::from_key(key).ok_or_else(|| DecodeError::InvalidKey {
                key: String::from_utf8_lossy(key).into_owned(),
                target: K::TARGET,
                path: self.path.clone(),
            })?;
            out.push((k, V::decode(item, self)?));
            self.path.pop();
        }
        Ok(out)
    }

    /// Rebuild a record from a dictionary, starting from `R::default()`.
    pub fn decode_record<R: Record>(&mut self, value: &Value) -> Result<R, DecodeError> {
        let dict = self.expect_dict(value)?;
        let fields = self.fields.descriptors::<R>()?;
        let mut record = R::default();
        let mut seen = vec![false; R::FIELDS.len()];
        for (key, item) in dict {
            self.path.push_key(key);
            match fields.lookup(key) {
                Some(desc) => {
                    record.decode_field(desc.field, item, self)?;
                    seen[desc.index] = true;
                }
                None if self.config.unknown_keys == UnknownKeyPolicy::Reject => {
                    return Err(DecodeError::UnknownKey { path: self.path.clone() });
                }
                None => trace!(record = fields.record, key = %String::from_utf8_lossy(key), "skipping unknown key"),
            }
            self.path.pop();
        }
        if self.config.missing_fields == MissingFieldPolicy::Reject {
            if let Some(missing) = fields.declared().find(|d| !d.omit_empty && !seen[d.index]) {
                self.path.push_key(missing.wire_name.as_bytes());
                return Err(DecodeError::MissingField { path: self.path.clone() });
            }
        }
        Ok(record)
    }
}

impl Decode for bool {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        match dec.integer_as::<u8>(value, "bool") {
            Ok(0) => Ok(false),
            Ok(1) => Ok(true),
            Ok(n) => Err(DecodeError::IntegerRangeExceeded {
                value: n.to_string(),
                target: "bool",
                path: dec.path.clone(),
            }),
            Err(e) => Err(e),
        }
    }
}

macro_rules! decode_native_integer {
    ($($t:ty),*) => {
        $(
            impl Decode for $t {
                fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
                    dec.integer_as(value, stringify!($t))
                }
            }

            impl FromDictKey for $t {
                const TARGET: &'static str = stringify!($t);

                fn from_key(key: &[u8]) -> Option<Self> {
                    Integer::parse(key)?.as_str().parse().ok()
                }
            }
        )*
    };
}

decode_native_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! decode_float {
    ($($t:ty),*) => {
        $(
            impl Decode for $t {
                fn decode(_value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
                    Err(dec.unsupported(stringify!($t)))
                }
            }
        )*
    };
}

decode_float!(f32, f64);

impl Decode for Integer {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        dec.expect_integer(value).cloned()
    }
}

impl Decode for String {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let bytes = dec.expect_bytes(value)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 {
            path: dec.path.clone(),
        })
    }
}

impl FromDictKey for String {
    const TARGET: &'static str = "String";

    fn from_key(key: &[u8]) -> Option<Self> {
        String::from_utf8(key.to_vec()).ok()
    }
}

impl FromDictKey for Vec<u8> {
    const TARGET: &'static str = "Vec<u8>";

    fn from_key(key: &[u8]) -> Option<Self> {
        Some(key.to_vec())
    }
}

impl Decode for ByteBuf {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        dec.expect_bytes(value).map(ByteBuf::from)
    }
}

impl FromDictKey for ByteBuf {
    const TARGET: &'static str = "ByteBuf";

    fn from_key(key: &[u8]) -> Option<Self> {
        Some(ByteBuf::from(key))
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        dec.decode_list(value)
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let items: Vec<T> = dec.decode_list(value)?;
        let found = items.len();
        items.try_into().map_err(|_| DecodeError::LengthMismatch {
            expected: N,
            found,
            path: dec.path.clone(),
        })
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        T::decode(value, dec).map(Some)
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: FromDictKey + Eq + Hash,
    V: Decode,
    S: BuildHasher + Default,
{
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(dec.decode_entries(value)?.into_iter().collect())
    }
}

impl<K: FromDictKey + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(dec.decode_entries(value)?.into_iter().collect())
    }
}

impl Decode for Value {
    fn decode(value: &Value, _dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(value.clone())
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        T::decode(value, dec).map(Box::new)
    }
}

impl<T: Decode> Decode for Rc<T> {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        T::decode(value, dec).map(Rc::new)
    }
}

impl<T: Decode> Decode for Arc<T> {
    fn decode(value: &Value, dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        T::decode(value, dec).map(Arc::new)
    }
}
