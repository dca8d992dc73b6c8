use std::fs;
use std::path::PathBuf;

use miette::{miette, IntoDiagnostic};

/// Where the container bytes come from. Both forms carry hex text.
#[derive(clap::Args, Debug)]
pub struct Input {
    /// Container as a hex string
    #[arg(long, value_name = "HEX", conflicts_with = "file")]
    pub hex: Option<String>,

    /// File holding the container as hex
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Input {
    pub fn read(&self) -> miette::Result<Vec<u8>> {
        let text = match (&self.hex, &self.file) {
            (Some(hex), _) => hex.clone(),
            (None, Some(path)) => fs::read_to_string(path).into_diagnostic()?,
            (None, None) => return Err(miette!("no input: pass --hex or --file")),
        };
        decode_hex(&text)
    }
}

fn decode_hex(text: &str) -> miette::Result<Vec<u8>> {
    let cleaned = text.split_whitespace().collect::<String>();
    let cleaned = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);
    hex::decode(cleaned).into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_accepts_prefix_and_whitespace() {
        assert_eq!(decode_hex("0xEF00 01\n").unwrap(), vec![0xEF, 0x00, 0x01]);
        assert!(decode_hex("0xE").is_err());
    }
}
