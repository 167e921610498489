use anyhow::{bail, Context, Result};
use mms::{parse, set_locale, to_text, Lang};
use std::fs;
use std::path::PathBuf;
use structopt::StructOpt;

/// Render at most this many bytes per message.
const RENDER_LIMIT: usize = 10240;

#[derive(StructOpt, Debug)]
#[structopt(
    about = "An MMS (ISO 9506) application-layer message decoder. Reads a text file where each non-blank, non-# line is an ASCII-hex encoded message, and prints a human-readable rendering of each. Blank lines and lines starting with # pass through to stdout."
)]
struct Opt {
    #[structopt(
        short,
        long,
        help = "Locale for rendered output (en_US, en_UK, zh_CN, zh_TW)"
    )]
    lang: Option<String>,

    #[structopt(name = "FILE", parse(from_os_str))]
    file: PathBuf,
}

#[derive(Debug, PartialEq)]
enum HexLineError {
    OddDigitCount,
}

/// Decode an ASCII-hex line: two digits per byte, any case. Decoding
/// stops at the first non-hex character; an odd number of consumed digits
/// fails the line.
fn decode_hex(line: &str) -> Result<Vec<u8>, HexLineError> {
    fn hex_val(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }
    let mut bytes = Vec::with_capacity(line.len() / 2);
    let mut high: Option<u8> = None;
    for &b in line.as_bytes() {
        let value = match hex_val(b) {
            Some(value) => value,
            None => break,
        };
        match high.take() {
            Some(hi) => bytes.push((hi << 4) | value),
            None => high = Some(value),
        }
    }
    if high.is_some() {
        return Err(HexLineError::OddDigitCount);
    }
    Ok(bytes)
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    if let Some(tag) = &opt.lang {
        match Lang::from_tag(tag) {
            Some(lang) => set_locale(lang),
            None => bail!("unknown locale {:?} (expected en_US, en_UK, zh_CN or zh_TW)", tag),
        }
    }

    let content = fs::read_to_string(&opt.file)
        .with_context(|| format!("Failed to read {:?}", opt.file))?;

    for (number, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            println!("{}", line);
            continue;
        }
        match decode_hex(trimmed) {
            Ok(bytes) => {
                let service = parse(&bytes);
                println!("{}", to_text(&service, RENDER_LIMIT));
            }
            Err(HexLineError::OddDigitCount) => {
                eprintln!("line {}: odd hex digit count, skipped", number + 1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_both_cases() {
        assert_eq!(decode_hex("a1040201"), Ok(vec![0xa1, 0x04, 0x02, 0x01]));
        assert_eq!(decode_hex("A104DeAd"), Ok(vec![0xa1, 0x04, 0xde, 0xad]));
    }

    #[test]
    fn stops_at_the_first_non_hex_character() {
        assert_eq!(decode_hex("a0ff trailing"), Ok(vec![0xa0, 0xff]));
        assert_eq!(decode_hex(""), Ok(vec![]));
    }

    #[test]
    fn odd_digit_count_fails_the_line() {
        assert_eq!(decode_hex("a1f"), Err(HexLineError::OddDigitCount));
    }
}
