//! Decimal text representation of token quantities.
//!
//! Quantities travel as base-10 text both in invocation arguments and in
//! stored records, so values stay human-inspectable and independent of host
//! byte order.

use crate::error::TypeError;

/// Unsigned token amount.
pub type Quantity = u64;

/// Parse a base-10 quantity.
///
/// Accepts one or more ASCII digits whose value fits in a `u64`. Signs,
/// whitespace, and empty input are rejected.
pub fn parse_quantity(text: &str) -> Result<Quantity, TypeError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TypeError::InvalidQuantity(text.to_string()));
    }
    text.parse::<u64>()
        .map_err(|_| TypeError::InvalidQuantity(text.to_string()))
}

/// Parse a quantity that must already be in canonical form: no leading
/// zeros except for `0` itself. Used for invocation arguments.
pub fn parse_canonical_quantity(text: &str) -> Result<Quantity, TypeError> {
    if text.len() > 1 && text.starts_with('0') {
        return Err(TypeError::InvalidQuantity(text.to_string()));
    }
    parse_quantity(text)
}

/// Canonical base-10 text for a quantity.
pub fn format_quantity(value: Quantity) -> String {
    value.to_string()
}
