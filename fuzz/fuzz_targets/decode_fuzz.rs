//! Decoder fuzz target: feed arbitrary bytes to the strict decoder.
//! Decoding must not panic, and anything it accepts must re-encode to the input.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    if let Ok(value) = bencode_codec::decode(data) {
        let bytes = bencode_codec::encode(&value).expect("decoded value re-encodes");
        assert_eq!(bytes, data);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
