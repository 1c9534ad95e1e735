//! Single-pass bencode parser: bytes to [`Value`].
//!
//! The cursor moves forward one token at a time with at most one byte of
//! lookahead. Only canonical input is accepted: integers without leading zeros
//! or `-0`, lengths without leading zeros, dictionary keys strictly ascending.

use crate::error::DecodeError;
use crate::value::{Dict, Integer, Value};

/// Parse exactly one value from `input`; bytes left after it are an error.
pub fn parse(input: &[u8], max_depth: usize) -> Result<Value, DecodeError> {
    let mut p = Parser::new(input, max_depth);
    let value = p.parse_value()?;
    if p.pos != input.len() {
        return Err(DecodeError::TrailingData {
            offset: p.pos,
            remaining: input.len() - p.pos,
        });
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8], max_depth: usize) -> Self {
        Parser { input, pos: 0, depth: 0, max_depth }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::TruncatedInput { offset: self.pos, needed }
    }

    fn parse_value(&mut self) -> Result<Value, DecodeError> {
        match self.peek() {
            Some(b'i') => self.parse_integer().map(Value::Integer),
            Some(b'0'..=b'9') => self.parse_bytes().map(|b| Value::Bytes(b.to_vec())),
            Some(b'l') => self.parse_list(),
            Some(b'd') => self.parse_dict(),
            // Inside a container the value was promised by the framing.
            None if self.depth > 0 => Err(self.truncated(1)),
            found => Err(DecodeError::InvalidToken { offset: self.pos, found }),
        }
    }

    fn parse_integer(&mut self) -> Result<Integer, DecodeError> {
        let start = self.pos;
        self.pos += 1;
        let digits_start = self.pos;
        loop {
            match self.peek() {
                Some(b'e') => break,
                Some(b'-' | b'0'..=b'9') => self.pos += 1,
                Some(_) => return Err(DecodeError::IntegerMalformed { offset: start }),
                None => return Err(self.truncated(1)),
            }
        }
        let digits = &self.input[digits_start..self.pos];
        let n = Integer::parse(digits).ok_or(DecodeError::IntegerMalformed { offset: start })?;
        self.pos += 1;
        Ok(n)
    }

    fn parse_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        let mut len: Option<usize> = Some(0);
        loop {
            match self.peek() {
                Some(b':') => break,
                Some(d @ b'0'..=b'9') => {
                    len = len
                        .and_then(|n| n.checked_mul(10))
                        .and_then(|n| n.checked_add(usize::from(d - b'0')));
                    self.pos += 1;
                }
                Some(_) => return Err(DecodeError::LengthMalformed { offset: start }),
                None => return Err(self.truncated(1)),
            }
        }
        if self.pos - start > 1 && self.input[start] == b'0' {
            return Err(DecodeError::LengthMalformed { offset: start });
        }
        self.pos += 1;
        let remaining = self.input.len() - self.pos;
        let len = len.ok_or(DecodeError::LengthMalformed { offset: start })?;
        if len > remaining {
            return Err(self.truncated(len - remaining));
        }
        let input = self.input;
        let bytes = &input[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth >= self.max_depth {
            return Err(DecodeError::MaxDepthExceeded {
                offset: self.pos,
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        self.pos += 1;
        Ok(())
    }

    fn parse_list(&mut self) -> Result<Value, DecodeError> {
        self.enter()?;
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some(b'e') => break,
                None => return Err(self.truncated(1)),
                Some(_) => items.push(self.parse_value()?),
            }
        }
        self.pos += 1;
        self.depth -= 1;
        Ok(Value::List(items))
    }

    fn parse_dict(&mut self) -> Result<Value, DecodeError> {
        self.enter()?;
        let mut dict = Dict::new();
        let mut last_key: Option<&'a [u8]> = None;
        loop {
            let key_offset = self.pos;
            let key = match self.peek() {
                Some(b'e') => break,
                None => return Err(self.truncated(1)),
                Some(b'0'..=b'9') => self.parse_bytes()?,
                found => return Err(DecodeError::InvalidToken { offset: key_offset, found }),
            };
            if let Some(prev) = last_key {
                if key == prev {
                    return Err(DecodeError::DuplicateKey {
                        offset: key_offset,
                        key: String::from_utf8_lossy(key).into_owned(),
                    });
                }
                if key < prev {
                    return Err(DecodeError::StrictOrderingViolation {
                        offset: key_offset,
                        key: String::from_utf8_lossy(key).into_owned(),
                    });
                }
            }
            let value = self.parse_value()?;
            dict.insert(key.to_vec(), value);
            last_key = Some(key);
        }
        self.pos += 1;
        self.depth -= 1;
        Ok(Value::Dict(dict))
    }
}
