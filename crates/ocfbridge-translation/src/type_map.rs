//! Type Mapper
//!
//! Pure mapping between wire type signatures and schema fragments, in both
//! directions. Numeric scalars follow the safe-integer policy: a value range
//! that fits within ±(2^53 − 1) travels as a bounded JSON integer, anything
//! wider as a tagged string so precision survives JSON-number tooling.
//!
//! Aggregate identity (struct fields, dict key/value types, enum entries)
//! does not fit in a bare fragment; it rides in the aggregate annotation
//! table that is passed explicitly into every call.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use ocfbridge_core::config::limits::MAX_SAFE_INTEGER;
use ocfbridge_core::{AggregateDef, NamedAggregates, TypeSignature};

use crate::schema::{MediaEncoding, SchemaFragment, SchemaItems, SchemaType};

/// String shape of a UUID; such strings carry 16 raw bytes.
static UUID_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$")
        .unwrap()
});

/// String shape of a decimal uint64 out of safe-integer range.
static UINT64_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^(0|[1-9][0-9]{0,19})$").unwrap());

/// String shape of a decimal int64 out of safe-integer range.
static INT64_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^(0|-?[1-9][0-9]{0,18})$").unwrap());

/// Per-property overrides fed into the forward mapping.
#[derive(Debug, Clone, Default)]
pub struct NumericOverrides {
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    pub default: Option<Value>,
}

/// Map a wire signature to a schema fragment.
///
/// `named` is the aggregate annotation naming this value's type, when the
/// interface metadata carries one; the named definition is flushed into
/// `definitions` the first time it is referenced and the fragment becomes a
/// `$ref`. Unannotated aggregates degrade to shapeless fragments.
pub fn signature_to_schema(
    signature: &TypeSignature,
    overrides: &NumericOverrides,
    named: Option<&str>,
    aggregates: &NamedAggregates,
    definitions: &mut IndexMap<String, SchemaFragment>,
) -> SchemaFragment {
    let mut fragment = match signature {
        TypeSignature::Boolean => SchemaFragment::of_type("boolean"),
        TypeSignature::Byte
        | TypeSignature::Uint16
        | TypeSignature::Uint32
        | TypeSignature::Uint64 => {
            return with_default(unsigned_fragment(signature, overrides), overrides);
        }
        TypeSignature::Int16 | TypeSignature::Int32 | TypeSignature::Int64 => {
            return with_default(signed_fragment(signature, overrides), overrides);
        }
        TypeSignature::Double => SchemaFragment::of_type("number"),
        TypeSignature::String | TypeSignature::ObjectPath | TypeSignature::Signature => {
            SchemaFragment::of_type("string")
        }
        TypeSignature::Variant => SchemaFragment {
            schema_type: Some(SchemaType::Many(
                ["string", "integer", "number", "object", "array", "boolean"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            )),
            ..Default::default()
        },
        TypeSignature::Array(_) if signature.is_byte_array() => SchemaFragment {
            media: Some(MediaEncoding::base64()),
            ..SchemaFragment::of_type("string")
        },
        TypeSignature::Array(element) => SchemaFragment {
            items: Some(Box::new(SchemaItems::One(signature_to_schema(
                element,
                &NumericOverrides::default(),
                None,
                aggregates,
                definitions,
            )))),
            ..SchemaFragment::of_type("array")
        },
        TypeSignature::Struct(_) => match named {
            Some(name) if aggregates.contains(name) => {
                ensure_definition(name, aggregates, definitions);
                SchemaFragment::definition_ref(name)
            }
            // Field identity is lost without an annotation
            _ => SchemaFragment::of_type("array"),
        },
        TypeSignature::Dict(_, _) => match named {
            Some(name) if aggregates.contains(name) => {
                ensure_definition(name, aggregates, definitions);
                SchemaFragment::definition_ref(name)
            }
            _ => SchemaFragment::of_type("object"),
        },
    };
    if let Some(default) = &overrides.default {
        fragment.default = Some(default.clone());
    }
    fragment
}

fn with_default(mut fragment: SchemaFragment, overrides: &NumericOverrides) -> SchemaFragment {
    if let Some(default) = &overrides.default {
        fragment.default = Some(default.clone());
    }
    fragment
}

fn unsigned_fragment(signature: &TypeSignature, overrides: &NumericOverrides) -> SchemaFragment {
    let natural_max = signature.unsigned_max().unwrap_or(u64::MAX);
    let minimum = overrides.minimum.unwrap_or(0);
    let maximum = match overrides.maximum {
        Some(max) => max as u64,
        None => natural_max,
    };
    if maximum <= MAX_SAFE_INTEGER as u64 {
        SchemaFragment::integer(minimum, maximum as i64)
    } else {
        SchemaFragment::string_format("uint64")
    }
}

fn signed_fragment(signature: &TypeSignature, overrides: &NumericOverrides) -> SchemaFragment {
    let (natural_min, natural_max) = signature.signed_bounds().unwrap_or((i64::MIN, i64::MAX));
    let minimum = overrides.minimum.unwrap_or(natural_min);
    let maximum = overrides.maximum.unwrap_or(natural_max);
    if maximum <= MAX_SAFE_INTEGER && minimum >= -MAX_SAFE_INTEGER {
        SchemaFragment::integer(minimum, maximum)
    } else {
        SchemaFragment::string_format("int64")
    }
}

/// Flush a named aggregate definition exactly once.
fn ensure_definition(
    name: &str,
    aggregates: &NamedAggregates,
    definitions: &mut IndexMap<String, SchemaFragment>,
) {
    if definitions.contains_key(name) {
        return;
    }
    let Some(def) = aggregates.get(name) else {
        return;
    };
    // Reserve the slot first so self-referential aggregates terminate
    definitions.insert(name.to_string(), SchemaFragment::default());
    let fragment = match def {
        AggregateDef::Struct(fields) => {
            let mut properties = IndexMap::new();
            for (field_name, field_type) in fields {
                let field = signature_to_schema(
                    field_type,
                    &NumericOverrides::default(),
                    None,
                    aggregates,
                    definitions,
                );
                properties.insert(field_name.clone(), field);
            }
            SchemaFragment::object(properties)
        }
        AggregateDef::Dict { .. } | AggregateDef::Opaque => SchemaFragment::of_type("object"),
        AggregateDef::Enum(entries) => SchemaFragment {
            one_of: Some(
                entries
                    .iter()
                    .map(|entry| SchemaFragment {
                        enum_values: Some(vec![Value::from(entry.value)]),
                        title: Some(entry.title.clone()),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        },
    };
    definitions.insert(name.to_string(), fragment);
}

/// Map a schema fragment back to a wire signature.
///
/// Returns `None` when the fragment has no known mapping; the caller omits
/// that property and translation continues (best-effort degradation).
pub fn schema_to_signature(
    fragment: &SchemaFragment,
    annotations: &NamedAggregates,
) -> Option<TypeSignature> {
    if let Some(name) = fragment.definition_name() {
        return resolve_reference(name, annotations);
    }
    let schema_type = match &fragment.schema_type {
        Some(SchemaType::One(name)) => name.as_str(),
        // A type union means the content type is unknown until runtime
        Some(SchemaType::Many(_)) => return Some(TypeSignature::Variant),
        None => {
            warn!("schema fragment without type or $ref has no mapping");
            return None;
        }
    };
    match schema_type {
        "boolean" => Some(TypeSignature::Boolean),
        "number" => Some(TypeSignature::Double),
        "string" => Some(string_signature(fragment)),
        "integer" => Some(integer_signature(fragment)),
        "array" => array_signature(fragment, annotations),
        "object" => Some(TypeSignature::Dict(
            Box::new(TypeSignature::String),
            Box::new(TypeSignature::Variant),
        )),
        other => {
            warn!(schema_type = other, "unrecognized schema type");
            None
        }
    }
}

fn resolve_reference(name: &str, annotations: &NamedAggregates) -> Option<TypeSignature> {
    match annotations.get(name) {
        Some(AggregateDef::Struct(fields)) => Some(TypeSignature::Struct(
            fields.iter().map(|(_, t)| t.clone()).collect(),
        )),
        Some(AggregateDef::Dict { key, value }) => Some(TypeSignature::Dict(
            Box::new(key.clone()),
            Box::new(value.clone()),
        )),
        // Enum values are carried as signed 64-bit regardless of range
        Some(AggregateDef::Enum(_)) => Some(TypeSignature::Int64),
        Some(AggregateDef::Opaque) => Some(TypeSignature::Dict(
            Box::new(TypeSignature::String),
            Box::new(TypeSignature::Variant),
        )),
        None => {
            warn!(definition = name, "reference to unknown definition");
            None
        }
    }
}

fn string_signature(fragment: &SchemaFragment) -> TypeSignature {
    if let Some(media) = &fragment.media {
        if media.is_base64() {
            return TypeSignature::Array(Box::new(TypeSignature::Byte));
        }
    }
    if let Some(pattern) = &fragment.pattern {
        if UUID_SHAPE.as_str() == pattern {
            return TypeSignature::Array(Box::new(TypeSignature::Byte));
        }
        if UINT64_SHAPE.as_str() == pattern {
            return TypeSignature::Uint64;
        }
        if INT64_SHAPE.as_str() == pattern {
            return TypeSignature::Int64;
        }
        if UUID_SHAPE.is_match(pattern) {
            // A literal UUID used as a pattern still marks a 16-byte value
            return TypeSignature::Array(Box::new(TypeSignature::Byte));
        }
    }
    match fragment.format.as_deref() {
        Some("uint64") => TypeSignature::Uint64,
        Some("int64") => TypeSignature::Int64,
        _ => TypeSignature::String,
    }
}

/// Smallest covering integer signature, preferring unsigned when the
/// range never goes negative. Unbounded integers widen to int64.
fn integer_signature(fragment: &SchemaFragment) -> TypeSignature {
    let (Some(minimum), Some(maximum)) = (fragment.minimum, fragment.maximum) else {
        return TypeSignature::Int64;
    };
    if minimum >= 0 {
        let max = maximum as u64;
        if max <= u8::MAX as u64 {
            TypeSignature::Byte
        } else if max <= u16::MAX as u64 {
            TypeSignature::Uint16
        } else if max <= u32::MAX as u64 {
            TypeSignature::Uint32
        } else {
            TypeSignature::Uint64
        }
    } else if minimum >= i16::MIN as i64 && maximum <= i16::MAX as i64 {
        TypeSignature::Int16
    } else if minimum >= i32::MIN as i64 && maximum <= i32::MAX as i64 {
        TypeSignature::Int32
    } else {
        TypeSignature::Int64
    }
}

fn array_signature(
    fragment: &SchemaFragment,
    annotations: &NamedAggregates,
) -> Option<TypeSignature> {
    match fragment.items.as_deref() {
        // Fixed-length heterogeneous tuples are structs on the wire
        Some(SchemaItems::Many(items))
            if fragment.min_items.is_some() && fragment.min_items == fragment.max_items =>
        {
            let fields: Option<Vec<TypeSignature>> = items
                .iter()
                .map(|item| schema_to_signature(item, annotations))
                .collect();
            Some(TypeSignature::Struct(fields?))
        }
        Some(SchemaItems::Many(items)) => {
            warn!(
                items = items.len(),
                "positional items without fixed length have no mapping"
            );
            None
        }
        Some(SchemaItems::One(item)) => Some(TypeSignature::Array(Box::new(schema_to_signature(
            item,
            annotations,
        )?))),
        None => Some(TypeSignature::Array(Box::new(TypeSignature::Variant))),
    }
}
