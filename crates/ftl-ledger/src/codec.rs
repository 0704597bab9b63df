//! Stored quantity encoding: canonical base-10 text.

use ftl_types::{format_quantity, parse_quantity, Quantity};

use crate::error::{LedgerError, LedgerResult};

pub fn encode(value: Quantity) -> Vec<u8> {
    format_quantity(value).into_bytes()
}

/// Decode the value stored under `key`.
///
/// Anything other than decimal digits in `u64` range means something other
/// than this engine wrote the key, which is reported as corruption.
pub fn decode(key: &str, bytes: &[u8]) -> LedgerResult<Quantity> {
    let corrupt = || LedgerError::StorageCorruption {
        key: key.to_string(),
        value: String::from_utf8_lossy(bytes).into_owned(),
    };
    let text = std::str::from_utf8(bytes).map_err(|_| corrupt())?;
    parse_quantity(text).map_err(|_| corrupt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_as_decimal_text() {
        assert_eq!(encode(0), b"0");
        assert_eq!(encode(100_000_000), b"100000000");
    }

    #[test]
    fn decodes_decimal_text() {
        assert_eq!(decode("k", b"1000"), Ok(1000));
        assert_eq!(decode("k", b"18446744073709551615"), Ok(u64::MAX));
    }

    #[test]
    fn malformed_values_are_corruption() {
        let cases: [&[u8]; 5] = [b"", b"-5", b"12a", b" 1", &[0xff, 0x00]];
        for bad in cases {
            assert!(
                matches!(decode("balance::x", bad), Err(LedgerError::StorageCorruption { .. })),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn corruption_reports_key_and_value() {
        assert_eq!(
            decode("balance::x", b"nope"),
            Err(LedgerError::StorageCorruption {
                key: "balance::x".into(),
                value: "nope".into(),
            })
        );
    }

    #[test]
    fn binary_width_encoding_is_not_accepted() {
        assert!(decode("k", &1000u64.to_be_bytes()).is_err());
    }
}
