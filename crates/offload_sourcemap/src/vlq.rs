//! Base64 VLQ coding of `mappings` segments.

use crate::error::SourceMapError;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const CONTINUATION: u64 = 0b10_0000;
const DIGIT_MASK: u64 = 0b01_1111;

/// Appends the VLQ encoding of `value` to `out`.
pub fn encode(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        (value.unsigned_abs() << 1) | 1
    } else {
        (value as u64) << 1
    };
    loop {
        let mut digit = vlq & DIGIT_MASK;
        vlq >>= 5;
        if vlq > 0 {
            digit |= CONTINUATION;
        }
        out.push(BASE64[digit as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}

fn decode_digit(byte: u8) -> Option<u64> {
    let value = match byte {
        b'A'..=b'Z' => byte - b'A',
        b'a'..=b'z' => byte - b'a' + 26,
        b'0'..=b'9' => byte - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return None,
    };
    Some(u64::from(value))
}

/// Decodes every value of one comma-free segment.
pub fn decode_segment(segment: &str) -> Result<Vec<i64>, SourceMapError> {
    let invalid = || SourceMapError::InvalidVlq {
        segment: segment.to_string(),
    };
    let mut values = Vec::with_capacity(5);
    let mut accum: u64 = 0;
    let mut shift = 0u32;
    let mut pending = false;

    for byte in segment.bytes() {
        let digit = decode_digit(byte).ok_or_else(invalid)?;
        if shift > 60 {
            return Err(invalid());
        }
        accum |= (digit & DIGIT_MASK) << shift;
        if digit & CONTINUATION != 0 {
            shift += 5;
            pending = true;
        } else {
            let magnitude = (accum >> 1) as i64;
            values.push(if accum & 1 == 1 { -magnitude } else { magnitude });
            accum = 0;
            shift = 0;
            pending = false;
        }
    }
    if pending {
        return Err(invalid());
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(value: i64) -> String {
        let mut out = String::new();
        encode(value, &mut out);
        out
    }

    #[test]
    fn encode_small_values() {
        assert_eq!(enc(0), "A");
        assert_eq!(enc(1), "C");
        assert_eq!(enc(-1), "D");
        assert_eq!(enc(15), "e");
    }

    #[test]
    fn encode_needs_continuation() {
        assert_eq!(enc(16), "gB");
        assert_eq!(enc(123), "2H");
    }

    #[test]
    fn decode_full_segment() {
        assert_eq!(decode_segment("AAgBC").unwrap(), vec![0, 0, 16, 1]);
        assert_eq!(decode_segment("2HD").unwrap(), vec![123, -1]);
    }

    #[test]
    fn decode_rejects_bad_character() {
        assert!(matches!(
            decode_segment("A*"),
            Err(SourceMapError::InvalidVlq { .. })
        ));
    }

    #[test]
    fn decode_rejects_truncated_value() {
        assert!(decode_segment("g").is_err());
    }
}
