//! Byte-level syntax of primitive values.

use rust_decimal::{Decimal, RoundingStrategy};

/// Integral values are written without a decimal point, everything else with
/// exactly two decimal digits (rounded half to even).
pub fn format_number(value: Decimal) -> String {
    if value.fract().is_zero() {
        let integral = value.trunc().normalize();
        if integral.is_zero() {
            return "0".to_string();
        }
        return integral.to_string();
    }

    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    if rounded.is_zero() {
        return "0.00".to_string();
    }
    format!("{rounded:.2}")
}

/// Escapes the bytes of a literal string; the caller adds the parentheses.
///
/// A carriage return is written as `\r`: readers turn a raw one inside a
/// literal string into a line feed.
pub fn escape_literal_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    for &byte in bytes {
        match byte {
            b'\\' | b'(' | b')' => out.extend_from_slice(&[b'\\', byte]),
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(byte),
        }
    }
    out
}

/// Uppercase hex digit pairs; the caller adds the angle brackets.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

/// Name text without the leading slash. Delimiters, whitespace, `#` and
/// bytes outside the printable ASCII range become `#xx`.
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for &byte in name.as_bytes() {
        let needs_escape = !(0x21..=0x7E).contains(&byte)
            || matches!(
                byte,
                b'#' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
            );
        if needs_escape {
            out.push_str(&format!("#{byte:02X}"));
        } else {
            out.push(byte as char);
        }
    }
    out
}
