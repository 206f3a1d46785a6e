//! Identifier Codec
//!
//! Reversible name mangling between the two ecosystems' identifier grammars.
//! The resource side uses lowercase dotted names with hyphen word breaks and
//! a vendor prefix (`x.com.example.my-widget`); the bus side uses camel-case
//! segments with underscores (`com.example.myWidget`).
//!
//! Encoding is total; decoding is total on well-formed encodings. The path
//! segment codec is an independent escape table and its decoder is partial:
//! a dangling or unknown escape is rejected.

use ocfbridge_core::BridgeError;

/// Vendor prefix stripped on encode and restored on decode.
pub const VENDOR_PREFIX: &str = "x.";

/// Encode a resource-side name into the bus grammar.
///
/// Character rules, applied left to right:
/// - a hyphen followed by a lowercase letter marks a word boundary and
///   becomes that letter uppercased
/// - `--` followed by a lowercase letter or another hyphen collapses to one
///   underscore
/// - any other hyphen becomes an underscore
/// - everything else passes through unchanged
pub fn encode_name(name: &str) -> String {
    let stripped = name.strip_prefix(VENDOR_PREFIX).unwrap_or(name);
    let chars: Vec<char> = stripped.chars().collect();
    let mut out = String::with_capacity(stripped.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '-' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        match chars.get(i + 1) {
            Some(next) if next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                i += 2;
            }
            Some('-')
                if matches!(chars.get(i + 2), Some(c) if c.is_ascii_lowercase() || *c == '-') =>
            {
                out.push('_');
                i += 2;
            }
            _ => {
                out.push('_');
                i += 1;
            }
        }
    }
    out
}

/// Decode a bus-side name back into the resource grammar.
///
/// Inverse of [`encode_name`]: uppercase letters become a hyphen plus the
/// lowercased letter, an underscore followed by a letter becomes a double
/// hyphen, any other underscore a single hyphen. The vendor prefix is
/// restored for dotted names, which is where encoding strips it.
pub fn decode_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + VENDOR_PREFIX.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else if c == '_' {
            match chars.get(i + 1) {
                Some(next) if next.is_ascii_alphabetic() => out.push_str("--"),
                _ => out.push('-'),
            }
        } else {
            out.push(c);
        }
        i += 1;
    }
    if out.contains('.') {
        format!("{}{}", VENDOR_PREFIX, out)
    } else {
        out
    }
}

/// Escape a path-like identifier into the bus path-segment grammar
/// (`[A-Za-z0-9_]`). Uses a fixed table of underscore-prefixed codes,
/// independent of the name codec; any other ASCII punctuation falls back to
/// a two-digit hex escape. Non-ASCII characters pass through.
pub fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '_' => out.push_str("__"),
            '.' => out.push_str("_d"),
            '-' => out.push_str("_h"),
            '~' => out.push_str("_t"),
            '/' => out.push_str("_s"),
            ':' => out.push_str("_c"),
            c if c.is_ascii_alphanumeric() || !c.is_ascii() => out.push(c),
            c => {
                out.push_str("_x");
                out.push_str(&format!("{:02x}", c as u32));
            }
        }
    }
    out
}

/// Unescape a path segment produced by [`encode_path_segment`].
///
/// Errors on a dangling underscore, an unknown escape code, or a malformed
/// hex escape; such input is outside the codec's domain.
pub fn decode_path_segment(segment: &str) -> Result<String, BridgeError> {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c != '_' {
            out.push(c);
            i += 1;
            continue;
        }
        let code = chars
            .get(i + 1)
            .ok_or_else(|| BridgeError::Identifier(format!("dangling escape in {:?}", segment)))?;
        match code {
            '_' => out.push('_'),
            'd' => out.push('.'),
            'h' => out.push('-'),
            't' => out.push('~'),
            's' => out.push('/'),
            'c' => out.push(':'),
            'x' => {
                let hex: String = chars.get(i + 2..i + 4).unwrap_or(&[]).iter().collect();
                let value = u8::from_str_radix(&hex, 16).map_err(|_| {
                    BridgeError::Identifier(format!("malformed hex escape in {:?}", segment))
                })?;
                out.push(value as char);
                i += 4;
                continue;
            }
            other => {
                return Err(BridgeError::Identifier(format!(
                    "unknown escape '_{}' in {:?}",
                    other, segment
                )));
            }
        }
        i += 2;
    }
    Ok(out)
}

/// Deterministic schema property name for a member argument.
///
/// When the metadata names the argument, that name wins; otherwise the name
/// is synthesized from the member name and the argument's position, so the
/// same inputs always yield the same name.
pub fn argument_property_name(
    member_name: &str,
    arg_index: usize,
    explicit_name: Option<&str>,
) -> String {
    match explicit_name {
        Some(name) => name.to_string(),
        None => format!("{}arg{}", member_name, arg_index),
    }
}
