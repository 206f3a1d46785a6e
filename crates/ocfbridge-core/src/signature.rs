//! Wire Type Signatures
//!
//! A compact, D-Bus style type algebra: scalar codes (`y`=byte, `q`=uint16,
//! `s`=string, ...), arrays (`ay`), ordered unnamed structs (`(is)`), and
//! key/value dictionaries (`a{sv}`). Signatures are constructed or parsed
//! once per translation call and never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// The recursive wire type algebra.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeSignature {
    Boolean,
    Byte,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Double,
    String,
    ObjectPath,
    Signature,
    Variant,
    /// Homogeneous array of the element type
    Array(Box<TypeSignature>),
    /// Ordered, unnamed fields
    Struct(Vec<TypeSignature>),
    /// Key/value pair collection
    Dict(Box<TypeSignature>, Box<TypeSignature>),
}

impl TypeSignature {
    /// Natural bounds for signed integer scalars.
    pub fn signed_bounds(&self) -> Option<(i64, i64)> {
        match self {
            Self::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Natural maximum for unsigned integer scalars (minimum is zero).
    pub fn unsigned_max(&self) -> Option<u64> {
        match self {
            Self::Byte => Some(u8::MAX as u64),
            Self::Uint16 => Some(u16::MAX as u64),
            Self::Uint32 => Some(u32::MAX as u64),
            Self::Uint64 => Some(u64::MAX),
            _ => None,
        }
    }

    /// Whether this is an array of bytes (carried as base64 text downstream).
    pub fn is_byte_array(&self) -> bool {
        matches!(self, Self::Array(elem) if **elem == Self::Byte)
    }

    /// The single-character code for scalar types.
    fn scalar_code(&self) -> Option<char> {
        Some(match self {
            Self::Boolean => 'b',
            Self::Byte => 'y',
            Self::Int16 => 'n',
            Self::Uint16 => 'q',
            Self::Int32 => 'i',
            Self::Uint32 => 'u',
            Self::Int64 => 'x',
            Self::Uint64 => 't',
            Self::Double => 'd',
            Self::String => 's',
            Self::ObjectPath => 'o',
            Self::Signature => 'g',
            Self::Variant => 'v',
            _ => return None,
        })
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.scalar_code() {
            return write!(f, "{}", code);
        }
        match self {
            Self::Array(elem) => write!(f, "a{}", elem),
            Self::Struct(fields) => {
                write!(f, "(")?;
                for field in fields {
                    write!(f, "{}", field)?;
                }
                write!(f, ")")
            }
            Self::Dict(key, value) => write!(f, "a{{{}{}}}", key, value),
            _ => unreachable!("scalar handled above"),
        }
    }
}

impl FromStr for TypeSignature {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        let mut pos = 0;
        let sig = parse_single(&chars, &mut pos)
            .map_err(|msg| BridgeError::Signature(format!("{}: {:?}", msg, s)))?;
        if pos != chars.len() {
            return Err(BridgeError::Signature(format!(
                "trailing characters after complete type: {:?}",
                s
            )));
        }
        Ok(sig)
    }
}

/// Parse one complete type starting at `pos`, advancing it past the type.
fn parse_single(chars: &[char], pos: &mut usize) -> Result<TypeSignature, String> {
    let c = *chars.get(*pos).ok_or("unexpected end of signature")?;
    *pos += 1;
    let sig = match c {
        'b' => TypeSignature::Boolean,
        'y' => TypeSignature::Byte,
        'n' => TypeSignature::Int16,
        'q' => TypeSignature::Uint16,
        'i' => TypeSignature::Int32,
        'u' => TypeSignature::Uint32,
        'x' => TypeSignature::Int64,
        't' => TypeSignature::Uint64,
        'd' => TypeSignature::Double,
        's' => TypeSignature::String,
        'o' => TypeSignature::ObjectPath,
        'g' => TypeSignature::Signature,
        'v' => TypeSignature::Variant,
        'a' => {
            if chars.get(*pos) == Some(&'{') {
                *pos += 1;
                let key = parse_single(chars, pos)?;
                let value = parse_single(chars, pos)?;
                if chars.get(*pos) != Some(&'}') {
                    return Err("dict entry not closed with '}'".into());
                }
                *pos += 1;
                TypeSignature::Dict(Box::new(key), Box::new(value))
            } else {
                TypeSignature::Array(Box::new(parse_single(chars, pos)?))
            }
        }
        '(' => {
            let mut fields = Vec::new();
            loop {
                match chars.get(*pos) {
                    Some(')') => {
                        *pos += 1;
                        break;
                    }
                    Some(_) => fields.push(parse_single(chars, pos)?),
                    None => return Err("struct not closed with ')'".into()),
                }
            }
            if fields.is_empty() {
                return Err("empty struct".into());
            }
            TypeSignature::Struct(fields)
        }
        other => return Err(format!("unknown type code '{}'", other)),
    };
    Ok(sig)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> TypeSignature {
        s.parse().unwrap()
    }

    #[test]
    fn test_scalar_round_trip() {
        for code in ["b", "y", "n", "q", "i", "u", "x", "t", "d", "s", "o", "g", "v"] {
            assert_eq!(parse(code).to_string(), code);
        }
    }

    #[test]
    fn test_container_round_trip() {
        for sig in ["ay", "as", "(is)", "((ii)s)", "a{sv}", "a{s(iu)}", "aa{ss}"] {
            assert_eq!(parse(sig).to_string(), sig);
        }
    }

    #[test]
    fn test_struct_of_int_and_string() {
        assert_eq!(
            parse("(is)"),
            TypeSignature::Struct(vec![TypeSignature::Int32, TypeSignature::String])
        );
    }

    #[test]
    fn test_dict_key_value() {
        assert_eq!(
            parse("a{sv}"),
            TypeSignature::Dict(
                Box::new(TypeSignature::String),
                Box::new(TypeSignature::Variant)
            )
        );
    }

    #[test]
    fn test_byte_array_detection() {
        assert!(parse("ay").is_byte_array());
        assert!(!parse("as").is_byte_array());
        assert!(!parse("y").is_byte_array());
    }

    #[test]
    fn test_invalid_signatures() {
        for bad in ["", "z", "(", "(i", "a", "a{s}", "a{sv", "ii", "()"] {
            assert!(bad.parse::<TypeSignature>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_natural_bounds() {
        assert_eq!(TypeSignature::Byte.unsigned_max(), Some(255));
        assert_eq!(TypeSignature::Uint16.unsigned_max(), Some(65535));
        assert_eq!(TypeSignature::Uint32.unsigned_max(), Some(4294967295));
        assert_eq!(TypeSignature::Int16.signed_bounds(), Some((-32768, 32767)));
        assert_eq!(
            TypeSignature::Int32.signed_bounds(),
            Some((-2147483648, 2147483647))
        );
        assert_eq!(TypeSignature::String.unsigned_max(), None);
    }
}
