//! The body encoding used by the mailbox service: base64 with `-` and `_` standing in
//! for `+` and `/`, padding optional.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::AppResult;

const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes a body payload into raw bytes. The output is not assumed to be UTF-8.
pub fn decode(content: &str) -> AppResult<Vec<u8>> {
    let standard: String = content
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .map(|ch| match ch {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    Ok(LENIENT_STANDARD.decode(standard)?)
}

/// Lossy UTF-8 view of a decoded body.
pub fn decode_text(content: &str) -> AppResult<String> {
    let bytes = decode(content)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_binary_and_empty_input() {
        let samples: [&[u8]; 4] = [b"", b"hello world", &[0xff, 0xfe, 0x00, 0x80, 0x3f], &[0xfb; 7]];

        for sample in samples {
            assert_eq!(decode(&encode(sample)).expect("decode"), sample);
        }
    }

    #[test]
    fn reverses_url_safe_substitution() {
        // 0xfb 0xff encodes to "+/8=" in the standard alphabet.
        assert_eq!(encode(&[0xfb, 0xff]), "-_8");
        assert_eq!(decode("-_8=").expect("padded"), [0xfb, 0xff]);
        assert_eq!(decode("-_8").expect("unpadded"), [0xfb, 0xff]);
    }

    #[test]
    fn tolerates_folded_payloads() {
        assert_eq!(decode_text("aGVs\r\nbG8").expect("decode"), "hello");
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode("***").is_err());
    }
}
