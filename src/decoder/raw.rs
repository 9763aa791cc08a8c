//! Raw word input helpers
//!
//! Turns user-supplied hex text or an in-memory capture buffer into 32-bit
//! words. The caller chooses the byte order; nothing here reads incrementally.

use serde::Deserialize;

use super::common::DecodeError;

const WORD_SIZE: usize = 4;

/// Sample capture: event header, trigger times and six TDC hits
pub const DEMO_WORDS: [u32; 8] = [
    0x94c531b5, 0x98855c20, 0x00028001, 0xbc8c2060, 0xbc882794, 0xbc8c85cc, 0xbc888e60,
    0xbc8c3618,
];

/// Byte order of words in a capture file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Parse a hexadecimal word (`0x94c531b5`, `94C531B5`, `0x94c5_31b5`)
pub fn parse_word(text: &str) -> Result<u32, DecodeError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .replace('_', "");

    let invalid = || DecodeError::InvalidWord {
        text: text.to_string(),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > 16 {
        // Wider than u64; report it as a 32-bit contract violation all the same
        return Err(DecodeError::InvalidArgument { value: u64::MAX });
    }
    let value = u64::from_str_radix(&digits, 16).map_err(|_| invalid())?;
    u32::try_from(value).map_err(|_| DecodeError::InvalidArgument { value })
}

/// Split a whole capture buffer into words
pub fn words_from_bytes(bytes: &[u8], order: ByteOrder) -> Result<Vec<u32>, DecodeError> {
    if bytes.len() % WORD_SIZE != 0 {
        return Err(DecodeError::Misaligned { len: bytes.len() });
    }

    let words = bytes
        .chunks_exact(WORD_SIZE)
        .map(|chunk| {
            let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
            match order {
                ByteOrder::Little => u32::from_le_bytes(raw),
                ByteOrder::Big => u32::from_be_bytes(raw),
            }
        })
        .collect();
    Ok(words)
}
