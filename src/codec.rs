//! Encode/decode entry point.
//!
//! A [`Codec`] owns its configuration and the record field cache, so repeated
//! calls on the same codec resolve each record type once. `Codec` is `Send +
//! Sync` and can be shared between threads.

use crate::config::CodecConfig;
use crate::decode::{Decode, Decoder};
use crate::encode::{Encode, Encoder};
use crate::error::{DecodeError, EncodeError};
use crate::fields::FieldCache;
use crate::parser;
use crate::value::Value;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct Codec {
    config: CodecConfig,
    fields: FieldCache,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Codec {
            config,
            fields: FieldCache::new(),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn fields(&self) -> &FieldCache {
        &self.fields
    }

    /// Encode any supported value. Dictionaries come out in canonical key order.
    pub fn encode<T: Encode + ?Sized>(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        let mut enc = Encoder::new(&self.fields, self.config.record_key_order);
        value.encode(&mut enc)?;
        let out = enc.into_bytes();
        trace!(len = out.len(), "encoded value");
        Ok(out)
    }

    /// Parse `bytes` as exactly one value.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
        parser::parse(bytes, self.config.max_depth).map_err(|e| {
            debug!(error = %e, len = bytes.len(), "rejected bencode input");
            e
        })
    }

    /// Parse `bytes` and project the value onto `T`.
    pub fn decode_into<T: Decode>(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        let value = self.decode(bytes)?;
        self.from_value(&value)
    }

    /// Project an already parsed value onto `T`.
    pub fn from_value<T: Decode>(&self, value: &Value) -> Result<T, DecodeError> {
        let mut dec = Decoder::new(&self.fields, &self.config);
        T::decode(value, &mut dec).map_err(|e| {
            debug!(error = %e, "decoded value does not fit target type");
            e
        })
    }
}
