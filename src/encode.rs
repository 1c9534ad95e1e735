//! Encoder: type-directed serialization of native values into bencode.
//!
//! Each supported shape implements [`Encode`]; composites recurse through the
//! [`Encoder`], which owns the output buffer and tracks the current field path
//! for error reporting.

use crate::config::RecordKeyOrder;
use crate::error::{EncodeError, FieldError, FieldPath};
use crate::fields::{FieldCache, Record};
use crate::value::{Integer, Value};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

/// A value that can be written as bencode.
pub trait Encode {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError>;

    /// Zero/empty value test used by `omitempty` record fields.
    fn is_empty_value(&self) -> bool {
        false
    }
}

/// Types usable as dictionary keys when encoding maps.
pub trait DictKey {
    fn key_bytes(&self) -> Cow<'_, [u8]>;
}

/// Output buffer plus traversal state for one encode call.
pub struct Encoder<'a> {
    out: Vec<u8>,
    fields: &'a FieldCache,
    record_order: RecordKeyOrder,
    path: FieldPath,
}

impl<'a> Encoder<'a> {
    pub fn new(fields: &'a FieldCache, record_order: RecordKeyOrder) -> Self {
        Encoder {
            out: Vec::new(),
            fields,
            record_order,
            path: FieldPath::default(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// `i<digits>e`
    pub fn write_integer(&mut self, n: &Integer) {
        self.out.push(b'i');
        self.out.extend_from_slice(n.as_str().as_bytes());
        self.out.push(b'e');
    }

    /// `<len>:<bytes>`
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes.len().to_string().as_bytes());
        self.out.push(b':');
        self.out.extend_from_slice(bytes);
    }

    /// `l<items>e`, in sequence order.
    pub fn write_list<T: Encode>(&mut self, items: &[T]) -> Result<(), EncodeError> {
        self.out.push(b'l');
        for (i, item) in items.iter().enumerate() {
            self.path.push_index(i);
            item.encode(self)?;
            self.path.pop();
        }
        self.out.push(b'e');
        Ok(())
    }

    /// `d<key><value>...e` with keys sorted by bytes. Two entries with the same
    /// key bytes are rejected.
    pub fn write_dict<'v, K, V, I>(&mut self, entries: I) -> Result<(), EncodeError>
    where
        K: DictKey + ?Sized + 'v,
        V: Encode + ?Sized + 'v,
        I: IntoIterator<Item = (&'v K, &'v V)>,
    {
        let mut pairs: Vec<(Cow<'v, [u8]>, &'v V)> =
            entries.into_iter().map(|(k, v)| (k.key_bytes(), v)).collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some(dup) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(EncodeError::DuplicateKey {
                key: String::from_utf8_lossy(&dup[0].0).into_owned(),
                path: self.path.clone(),
            });
        }
        self.out.push(b'd');
        for (key, value) in pairs {
            self.write_bytes(&key);
            self.path.push_key(&key);
            value.encode(self)?;
            self.path.pop();
        }
        self.out.push(b'e');
        Ok(())
    }

    /// Encode a record as a dictionary keyed by its wire names.
    pub fn write_record<R: Record>(&mut self, record: &R) -> Result<(), EncodeError> {
        let fields = self.fields.descriptors::<R>()?;
        let order: Vec<_> = match self.record_order {
            RecordKeyOrder::Declaration => fields.declared().collect(),
            RecordKeyOrder::Sorted => fields.sorted().collect(),
        };
        self.out.push(b'd');
        for desc in order {
            let value = record.field(desc.field).ok_or(FieldError::MissingAccessor {
                record: fields.record,
                field: desc.field,
            })?;
            if desc.omit_empty && value.is_empty_value() {
                continue;
            }
            self.write_bytes(desc.wire_name.as_bytes());
            self.path.push_key(desc.wire_name.as_bytes());
            value.encode(self)?;
            self.path.pop();
        }
        self.out.push(b'e');
        Ok(())
    }

    pub fn unsupported(&self, type_name: &'static str) -> EncodeError {
        EncodeError::UnsupportedType {
            type_name,
            path: self.path.clone(),
        }
    }

    pub fn absent(&self) -> EncodeError {
        EncodeError::RequiredFieldAbsent {
            path: self.path.clone(),
        }
    }
}

impl Encode for bool {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.out.extend_from_slice(if *self { b"i1e" } else { b"i0e" });
        Ok(())
    }

    fn is_empty_value(&self) -> bool {
        !*self
    }
}

macro_rules! encode_native_integer {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
                    enc.write_integer(&Integer::from(*self));
                    Ok(())
                }

                fn is_empty_value(&self) -> bool {
                    *self == 0
                }
            }

            impl DictKey for $t {
                fn key_bytes(&self) -> Cow<'_, [u8]> {
                    Cow::Owned(self.to_string().into_bytes())
                }
            }
        )*
    };
}

encode_native_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! encode_float {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
                    Err(enc.unsupported(stringify!($t)))
                }

                fn is_empty_value(&self) -> bool {
                    *self == 0.0
                }
            }
        )*
    };
}

encode_float!(f32, f64);

impl Encode for Integer {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.write_integer(self);
        Ok(())
    }

    fn is_empty_value(&self) -> bool {
        self.is_zero()
    }
}

impl Encode for str {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.write_bytes(self.as_bytes());
        Ok(())
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Encode for String {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        self.as_str().encode(enc)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl DictKey for str {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl DictKey for String {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl DictKey for Vec<u8> {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl<K: DictKey + ?Sized> DictKey for &K {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        (**self).key_bytes()
    }
}

/// Opaque bytes encoded as a byte string. A plain `Vec<u8>` encodes as a list
/// of integers.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteBuf(pub Vec<u8>);

impl ByteBuf {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for ByteBuf {
    fn from(b: Vec<u8>) -> Self {
        ByteBuf(b)
    }
}

impl From<&[u8]> for ByteBuf {
    fn from(b: &[u8]) -> Self {
        ByteBuf(b.to_vec())
    }
}

impl AsRef<[u8]> for ByteBuf {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Encode for ByteBuf {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.write_bytes(&self.0);
        Ok(())
    }

    fn is_empty_value(&self) -> bool {
        self.0.is_empty()
    }
}

impl DictKey for ByteBuf {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.0)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.write_list(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.write_list(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.write_list(self)
    }

    fn is_empty_value(&self) -> bool {
        N == 0
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        match self {
            Some(v) => v.encode(enc),
            None => Err(enc.absent()),
        }
    }

    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

impl<K: DictKey, V: Encode, S: BuildHasher> Encode for HashMap<K, V, S> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.write_dict(self.iter())
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K: DictKey, V: Encode> Encode for BTreeMap<K, V> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.write_dict(self.iter())
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Encode for Value {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        match self {
            Value::Integer(n) => {
                enc.write_integer(n);
                Ok(())
            }
            Value::Bytes(b) => {
                enc.write_bytes(b);
                Ok(())
            }
            Value::List(items) => enc.write_list(items),
            Value::Dict(d) => enc.write_dict(d.iter()),
        }
    }

    fn is_empty_value(&self) -> bool {
        match self {
            Value::Integer(n) => n.is_zero(),
            Value::Bytes(b) => b.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Dict(d) => d.is_empty(),
        }
    }
}

macro_rules! encode_through_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: Encode + ?Sized> Encode for $ptr<T> {
                fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
                    (**self).encode(enc)
                }

                fn is_empty_value(&self) -> bool {
                    (**self).is_empty_value()
                }
            }
        )*
    };
}

encode_through_pointer!(Box, Rc, Arc);

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        (**self).encode(enc)
    }

    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }
}

impl Encode for Cow<'_, str> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        self.as_ref().encode(enc)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_with(order: RecordKeyOrder, v: &(impl Encode + ?Sized)) -> Result<Vec<u8>, EncodeError> {
        let cache = FieldCache::new();
        let mut enc = Encoder::new(&cache, order);
        v.encode(&mut enc)?;
        Ok(enc.into_bytes())
    }

    fn encode(v: &(impl Encode + ?Sized)) -> Vec<u8> {
        encode_with(RecordKeyOrder::Declaration, v).expect("encode")
    }

    #[test]
    fn scalars() {
        assert_eq!(encode(&42i32), b"i42e");
        assert_eq!(encode(&-7i64), b"i-7e");
        assert_eq!(encode(&0u8), b"i0e");
        assert_eq!(encode(&u128::MAX), format!("i{}e", u128::MAX).as_bytes());
        assert_eq!(encode(&true), b"i1e");
        assert_eq!(encode(&false), b"i0e");
        assert_eq!(encode("spam"), b"4:spam");
        assert_eq!(encode(&String::new()), b"0:");
        assert_eq!(encode(&ByteBuf(vec![0, 255])), b"2:\x00\xff");
    }

    #[test]
    fn lists_keep_order() {
        assert_eq!(encode(&vec![1, 2]), b"li1ei2ee");
        assert_eq!(encode(&[3u8, 1, 2]), b"li3ei1ei2ee");
        assert_eq!(encode(&Vec::<i32>::new()), b"le");
        assert_eq!(encode(&vec![vec!["a"], vec![]]), b"ll1:aelee");
    }

    #[test]
    fn integer_keys_sort_as_text() {
        let mut m = HashMap::new();
        m.insert(10u32, "ten");
        m.insert(9u32, "nine");
        assert_eq!(encode(&m), b"d2:103:ten1:94:ninee");
    }

    #[test]
    fn duplicate_key_bytes_are_rejected() {
        let entries: Vec<(&str, i32)> = vec![("a", 1), ("a", 2)];
        let cache = FieldCache::new();
        let mut enc = Encoder::new(&cache, RecordKeyOrder::Declaration);
        let err = enc
            .write_dict(entries.iter().map(|(k, v)| (k, v)))
            .unwrap_err();
        assert!(matches!(err, EncodeError::DuplicateKey { ref key, .. } if key == "a"));
    }

    #[test]
    fn floats_are_unsupported_with_path() {
        let mut m = BTreeMap::new();
        m.insert("ratio", vec![1.5f64]);
        let err = encode_with(RecordKeyOrder::Declaration, &m).unwrap_err();
        match err {
            EncodeError::UnsupportedType { type_name, path } => {
                assert_eq!(type_name, "f64");
                assert_eq!(path.to_string(), "ratio[0]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn absent_option_outside_record_fails() {
        let err = encode_with(RecordKeyOrder::Declaration, &vec![Some(1), None]).unwrap_err();
        assert!(matches!(err, EncodeError::RequiredFieldAbsent { ref path } if path.to_string() == "[1]"));
        assert_eq!(encode(&Some("x")), b"1:x");
    }

    #[derive(Default)]
    struct Partial {
        a: i64,
    }

    impl Record for Partial {
        const FIELDS: &'static [crate::fields::FieldTag] = &[
            crate::fields::FieldTag { field: "a", tag: "" },
            crate::fields::FieldTag { field: "b", tag: "" },
        ];

        fn field(&self, name: &str) -> Option<&dyn Encode> {
            match name {
                "a" => Some(&self.a),
                _ => None,
            }
        }

        fn decode_field(
            &mut self,
            _name: &str,
            _value: &Value,
            _dec: &mut crate::decode::Decoder<'_>,
        ) -> Result<(), crate::error::DecodeError> {
            Ok(())
        }
    }

    #[test]
    fn declared_field_without_accessor_fails() {
        let cache = FieldCache::new();
        let mut enc = Encoder::new(&cache, RecordKeyOrder::Declaration);
        let err = enc.write_record(&Partial { a: 1 }).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Record(FieldError::MissingAccessor { field: "b", .. })
        ));
    }

    #[test]
    fn empty_values() {
        assert!(0i64.is_empty_value());
        assert!(!1i64.is_empty_value());
        assert!(String::new().is_empty_value());
        assert!(None::<i32>.is_empty_value());
        assert!(Vec::<i32>::new().is_empty_value());
        assert!(!Some(0).is_empty_value());
        assert!(Value::List(vec![]).is_empty_value());
    }
}
