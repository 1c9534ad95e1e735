//! Runtime values for encoding/decoding (wire representation).
//!
//! Bencode can only express four shapes: integers, byte strings, lists and
//! dictionaries. [`Value`] is that closed set; every native type the codec
//! supports is mapped onto it.

use std::collections::BTreeMap;
use std::fmt;

/// Dictionary payload. Keys are raw bytes and iterate in ascending byte order,
/// which is the canonical wire order.
pub type Dict = BTreeMap<Vec<u8>, Value>;

/// Arbitrary-precision signed integer kept in canonical decimal form.
///
/// The text never has a leading zero (except `0` itself) and never reads `-0`,
/// so equal integers always have equal representations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Integer(Box<str>);

impl Integer {
    /// Accept `digits` only if it is a canonical decimal integer.
    pub fn parse(digits: &[u8]) -> Option<Self> {
        if !is_canonical_integer(digits) {
            return None;
        }
        // Canonical integers are pure ASCII.
        let text = std::str::from_utf8(digits).ok()?;
        Some(Integer(text.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-')
    }

    pub fn is_zero(&self) -> bool {
        &*self.0 == "0"
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    pub fn to_i128(&self) -> Option<i128> {
        self.0.parse().ok()
    }

    pub fn to_u128(&self) -> Option<u128> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! integer_from_native {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Integer {
                fn from(v: $t) -> Self {
                    Integer(v.to_string().into_boxed_str())
                }
            }
        )*
    };
}

integer_from_native!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// `true` if `digits` is `0`, or an optional `-` followed by a non-zero digit and more digits.
pub fn is_canonical_integer(digits: &[u8]) -> bool {
    let body = match digits.split_first() {
        Some((b'-', rest)) => {
            // "-" alone and "-0..." are never canonical.
            if rest.first().map_or(true, |&d| d == b'0') {
                return false;
            }
            rest
        }
        Some(_) => digits,
        None => return false,
    };
    if body.is_empty() || !body.iter().all(u8::is_ascii_digit) {
        return false;
    }
    body.len() == 1 || body[0] != b'0'
}

/// Wire shape of a value, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Integer,
    ByteString,
    List,
    Dictionary,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Integer => "integer",
            Kind::ByteString => "byte string",
            Kind::List => "list",
            Kind::Dictionary => "dictionary",
        })
    }
}

/// A single decoded value (scalar or compound).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(Integer),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Dict(Dict),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Integer(_) => Kind::Integer,
            Value::Bytes(_) => Kind::ByteString,
            Value::List(_) => Kind::List,
            Value::Dict(_) => Kind::Dictionary,
        }
    }

    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().and_then(Integer::to_i64)
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_integer().and_then(Integer::to_u64)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Byte string contents, if they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Dictionary lookup by key; `None` for missing keys and non-dictionaries.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        self.as_dict().and_then(|d| d.get(key.as_ref()))
    }
}

impl From<Integer> for Value {
    fn from(n: Integer) -> Self {
        Value::Integer(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Integer(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Bytes(s.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}
