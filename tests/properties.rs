//! Property-based tests using proptest
//!
//! Encoding is deterministic, canonical output always decodes back to the same
//! value, and the decoder never panics on arbitrary input.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bencode_codec::{decode, decode_into, encode, ByteBuf, Value};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::List),
            prop::collection::btree_map(prop::collection::vec(any::<u8>(), 0..8), inner, 0..8)
                .prop_map(Value::Dict),
        ]
    })
}

// Property: any value tree survives encode then decode
proptest! {
    #[test]
    fn prop_value_roundtrip(v in arb_value()) {
        let bytes = encode(&v).expect("encode");
        let back = decode(&bytes).expect("canonical output must decode");
        prop_assert_eq!(back, v);
    }
}

// Property: integers of any width round-trip through text
proptest! {
    #[test]
    fn prop_integer_roundtrip(n in any::<i64>(), u in any::<u64>(), w in any::<i128>()) {
        prop_assert_eq!(decode_into::<i64>(&encode(&n).expect("i64")).expect("i64"), n);
        prop_assert_eq!(decode_into::<u64>(&encode(&u).expect("u64")).expect("u64"), u);
        prop_assert_eq!(decode_into::<i128>(&encode(&w).expect("i128")).expect("i128"), w);
    }
}

// Property: strings and raw bytes keep every byte
proptest! {
    #[test]
    fn prop_text_and_bytes_roundtrip(s in ".{0,64}", raw in prop::collection::vec(any::<u8>(), 0..256)) {
        prop_assert_eq!(decode_into::<String>(&encode(&s).expect("str")).expect("str"), s);
        let buf = ByteBuf(raw);
        prop_assert_eq!(decode_into::<ByteBuf>(&encode(&buf).expect("bytes")).expect("bytes"), buf);
    }
}

// Property: maps encode identically whatever their insertion order
proptest! {
    #[test]
    fn prop_map_encoding_deterministic(entries in prop::collection::vec(("[a-zA-Z0-9 ]{0,12}", any::<i64>()), 0..32)) {
        let hashed: HashMap<String, i64> = entries.iter().cloned().collect();
        let ordered: BTreeMap<String, i64> = entries.iter().cloned().collect();
        let a = encode(&hashed).expect("hash map");
        let b = encode(&ordered).expect("btree map");
        prop_assert_eq!(&a, &b);
        let back: HashMap<String, i64> = decode_into(&a).expect("decode");
        prop_assert_eq!(back, hashed);
    }
}

// Property: lists of strings round-trip
proptest! {
    #[test]
    fn prop_string_list_roundtrip(items in prop::collection::vec(".{0,16}", 0..32)) {
        let bytes = encode(&items).expect("encode");
        prop_assert_eq!(decode_into::<Vec<String>>(&bytes).expect("decode"), items);
    }
}

// Property: the decoder returns an error instead of panicking
proptest! {
    #[test]
    fn prop_decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode(&data);
        let _ = decode_into::<HashMap<String, Value>>(&data);
    }
}

// Property: anything the decoder accepts re-encodes to the same bytes
proptest! {
    #[test]
    fn prop_accepted_input_is_canonical(data in prop::collection::vec(
        prop_oneof![Just(b'i'), Just(b'l'), Just(b'd'), Just(b'e'), Just(b':'), Just(b'-'), b'0'..=b'9', Just(b'a')],
        0..64,
    )) {
        if let Ok(v) = decode(&data) {
            prop_assert_eq!(encode(&v).expect("encode"), data);
        }
    }
}
