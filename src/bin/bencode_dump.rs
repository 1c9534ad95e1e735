//! Decode a bencoded file and print it in readable form.
//!
//! Usage:
//!   bencode_dump [OPTIONS] [FILE]
//!   bencode_dump < file.torrent
//!
//! Options:
//!   --check, -c        Only validate; print nothing on success
//!   --summary, -s      Print a one-line summary instead of the full dump
//!   --config=FILE      Codec configuration (TOML)
//!   --verbose, -v      Debug logging (RUST_LOG overrides)
//!
//! Exit code 1 if the input is not a single canonical bencode value.

use bencode_codec::dump::{value_summary_line, value_to_dump};
use bencode_codec::{Codec, CodecConfig};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn take_flag(args: &mut Vec<String>, long: &str, short: &str) -> bool {
    if let Some(pos) = args.iter().position(|a| a == long || a == short) {
        args.remove(pos);
        true
    } else {
        false
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = take_flag(&mut args, "--verbose", "-v");
    let check_only = take_flag(&mut args, "--check", "-c");
    let summary = take_flag(&mut args, "--summary", "-s");
    let config_path: Option<PathBuf> = args
        .iter()
        .position(|a| a.starts_with("--config="))
        .and_then(|pos| args.remove(pos).strip_prefix("--config=").map(PathBuf::from));
    init_logging(verbose);

    let config = match &config_path {
        Some(p) => CodecConfig::from_file(p)?,
        None => CodecConfig::default(),
    };
    let codec = Codec::new(config);

    let (name, bytes) = match args.first() {
        Some(path) => (path.clone(), std::fs::read(path)?),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            ("<stdin>".to_string(), buf)
        }
    };
    info!(input = %name, len = bytes.len(), "decoding");

    let value = match codec.decode(&bytes) {
        Ok(v) => v,
        Err(e) => {
            error!(input = %name, offset = ?e.offset(), "{e}");
            anyhow::bail!("{name}: {e}");
        }
    };
    if check_only {
        return Ok(());
    }
    if summary {
        println!("{}", value_summary_line(&value));
    } else {
        println!("{}", value_to_dump(&value, 0));
    }
    Ok(())
}
