//! Error types for encoding, decoding, record introspection and configuration.
//!
//! Parse failures carry the byte offset where the input went wrong; failures
//! that happen while walking a typed value carry the [`FieldPath`] instead.

use crate::value::Kind;
use std::fmt;
use thiserror::Error;

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside the top-level value, e.g. `peers[2].ip`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push_key(&mut self, key: &[u8]) {
        self.0.push(PathSegment::Key(String::from_utf8_lossy(key).into_owned()));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                PathSegment::Key(k) if i == 0 => write!(f, "{k}")?,
                PathSegment::Key(k) => write!(f, ".{k}")?,
                PathSegment::Index(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}

/// Record declaration problems, reported the first time a record type is introspected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("record {record}: fields `{first}` and `{second}` both use wire name {wire_name:?}")]
    DuplicateWireName {
        record: &'static str,
        wire_name: &'static str,
        first: &'static str,
        second: &'static str,
    },
    #[error("record {record}: declared field `{field}` has no accessor")]
    MissingAccessor {
        record: &'static str,
        field: &'static str,
    },
    #[error("record {record}: field `{field}` has unknown tag option {option:?}")]
    UnknownTagOption {
        record: &'static str,
        field: &'static str,
        option: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("unsupported type {type_name} at {path}")]
    UnsupportedType {
        type_name: &'static str,
        path: FieldPath,
    },
    #[error("duplicate dictionary key {key:?} at {path}")]
    DuplicateKey { key: String, path: FieldPath },
    #[error("required value absent at {path}")]
    RequiredFieldAbsent { path: FieldPath },
    #[error(transparent)]
    Record(#[from] FieldError),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid token {} at offset {offset}", describe_byte(.found))]
    InvalidToken { offset: usize, found: Option<u8> },
    #[error("truncated input at offset {offset}: {needed} more byte(s) needed")]
    TruncatedInput { offset: usize, needed: usize },
    #[error("malformed integer at offset {offset}")]
    IntegerMalformed { offset: usize },
    #[error("malformed byte string length at offset {offset}")]
    LengthMalformed { offset: usize },
    #[error("integer {value} does not fit {target} at {path}")]
    IntegerRangeExceeded {
        value: String,
        target: &'static str,
        path: FieldPath,
    },
    #[error("dictionary key {key:?} at offset {offset} is not in ascending order")]
    StrictOrderingViolation { offset: usize, key: String },
    #[error("duplicate dictionary key {key:?} at offset {offset}")]
    DuplicateKey { offset: usize, key: String },
    #[error("{remaining} trailing byte(s) after value at offset {offset}")]
    TrailingData { offset: usize, remaining: usize },
    #[error("expected {expected}, found {found} at {path}")]
    ShapeMismatch {
        expected: &'static str,
        found: Kind,
        path: FieldPath,
    },
    #[error("nesting deeper than {max_depth} at offset {offset}")]
    MaxDepthExceeded { offset: usize, max_depth: usize },
    #[error("unsupported type {type_name} at {path}")]
    UnsupportedType {
        type_name: &'static str,
        path: FieldPath,
    },
    #[error("byte string is not valid UTF-8 at {path}")]
    InvalidUtf8 { path: FieldPath },
    #[error("dictionary key {key:?} cannot be converted to {target} at {path}")]
    InvalidKey {
        key: String,
        target: &'static str,
        path: FieldPath,
    },
    #[error("expected {expected} elements, found {found} at {path}")]
    LengthMismatch {
        expected: usize,
        found: usize,
        path: FieldPath,
    },
    #[error("missing field at {path}")]
    MissingField { path: FieldPath },
    #[error("unknown key at {path}")]
    UnknownKey { path: FieldPath },
    #[error(transparent)]
    Record(#[from] FieldError),
}

impl DecodeError {
    /// Byte offset of a parse failure; `None` for typed projection failures.
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::InvalidToken { offset, .. }
            | DecodeError::TruncatedInput { offset, .. }
            | DecodeError::IntegerMalformed { offset }
            | DecodeError::LengthMalformed { offset }
            | DecodeError::StrictOrderingViolation { offset, .. }
            | DecodeError::DuplicateKey { offset, .. }
            | DecodeError::TrailingData { offset, .. }
            | DecodeError::MaxDepthExceeded { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

fn describe_byte(found: &Option<u8>) -> String {
    match found {
        Some(b) if b.is_ascii_graphic() => format!("{:?}", *b as char),
        Some(b) => format!("0x{b:02x}"),
        None => "end of input".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
