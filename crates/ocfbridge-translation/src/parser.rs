//! Schema Parser
//!
//! Walks a remote peer's schema document and reconstructs native interface
//! descriptors plus the per-path object grouping used to register them.
//!
//! Three ordered passes over `definitions`:
//!
//! 1. **Annotation harvest** — enum, struct, and opaque-dict entries become
//!    aggregate annotation records, built fresh for this call only.
//! 2. **Interface synthesis** — entries advertising a resource type become
//!    interfaces; well-known types keep their dedicated native translation
//!    and are skipped here.
//! 3. **Object wiring** — path operations are resolved to the synthesized
//!    interfaces and grouped into virtual objects; collection children fold
//!    into their parent's object.
//!
//! A document missing its top-level sections fails the whole parse. A
//! malformed individual entry is skipped with a diagnostic and the rest of
//! the document is still processed.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use ocfbridge_core::{
    AggregateDef, BridgeError, DiscoveredResource, EnumEntry, InterfaceDescriptor,
    NamedAggregates, NotificationClass, PropertyAccess, PropertyDescriptor, TypeSignature,
};

use crate::ident;
use crate::schema::SchemaFragment;
use crate::type_map::schema_to_signature;
use crate::well_known;

/// A bus object to register, grouping the interfaces reachable at one path.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualObject {
    pub path: String,
    /// Names of the synthesized interfaces attached to this object
    pub interfaces: Vec<String>,
}

/// Everything reconstructed from one peer document.
#[derive(Debug, Clone, Default)]
pub struct ParsedPeer {
    pub interfaces: Vec<InterfaceDescriptor>,
    /// Virtual objects keyed by path
    pub objects: IndexMap<String, VirtualObject>,
}

/// Parses portable schema documents into native descriptors.
///
/// The discovered resource list supplies the observability map and the
/// collection parent/child relationships that drive object wiring; the
/// document itself is supplied already deserialized.
pub struct SchemaParser<'a> {
    resources: &'a [DiscoveredResource],
}

impl<'a> SchemaParser<'a> {
    pub fn new(resources: &'a [DiscoveredResource]) -> Self {
        Self { resources }
    }

    /// Parse one document tree.
    pub fn parse(&self, tree: &Value) -> Result<ParsedPeer, BridgeError> {
        let root = tree
            .as_object()
            .ok_or_else(|| BridgeError::Structure("document root must be a map".to_string()))?;
        let paths = required_map(root, "paths")?;
        let definitions = required_map(root, "definitions")?;

        let annotations = harvest_annotations(definitions);
        let (interfaces, by_definition) = self.synthesize_interfaces(definitions, &annotations);
        let objects = self.wire_objects(paths, &by_definition);

        Ok(ParsedPeer {
            interfaces: interfaces.into_values().collect(),
            objects,
        })
    }

    /// Whether any discovered resource advertises this type as observable.
    fn is_observable(&self, resource_type: &str) -> bool {
        self.resources
            .iter()
            .any(|r| r.observable && r.has_resource_type(resource_type))
    }

    /// Pass 2: one interface per advertised resource type.
    fn synthesize_interfaces(
        &self,
        definitions: &Map<String, Value>,
        annotations: &NamedAggregates,
    ) -> (IndexMap<String, InterfaceDescriptor>, IndexMap<String, String>) {
        let mut interfaces: IndexMap<String, InterfaceDescriptor> = IndexMap::new();
        let mut by_definition: IndexMap<String, String> = IndexMap::new();

        for (entry_name, entry) in definitions {
            let Some(properties) = entry.get("properties").and_then(Value::as_object) else {
                continue;
            };
            let Some(resource_type) = properties
                .get("rt")
                .and_then(|rt| rt.get("default"))
                .and_then(|d| d.get(0))
                .and_then(Value::as_str)
            else {
                continue;
            };

            if !well_known::is_translatable(resource_type) {
                debug!(resource_type, "well-known resource type keeps its native translation");
                continue;
            }

            if well_known::is_device_type(resource_type) {
                // Marker interface: the device type itself carries no state
                let name = resource_type.to_string();
                interfaces
                    .entry(name.clone())
                    .or_insert_with(|| InterfaceDescriptor::new(name.clone()));
                by_definition.insert(entry_name.clone(), name);
                continue;
            }

            let interface_name = ident::decode_name(strip_class_suffix(resource_type));
            let observable = self.is_observable(resource_type);
            let interface = interfaces
                .entry(interface_name.clone())
                .or_insert_with(|| InterfaceDescriptor::new(interface_name.clone()));

            for (property_name, property_value) in properties {
                if well_known::is_baseline_property(property_name) {
                    continue;
                }
                let fragment: SchemaFragment =
                    match serde_json::from_value(property_value.clone()) {
                        Ok(fragment) => fragment,
                        Err(error) => {
                            warn!(entry = %entry_name, property = %property_name, %error,
                                "skipping malformed property schema");
                            continue;
                        }
                    };
                let Some(signature) = schema_to_signature(&fragment, annotations) else {
                    warn!(entry = %entry_name, property = %property_name,
                        "property schema has no signature mapping, omitting");
                    continue;
                };
                let name = ident::decode_name(property_name);
                if interface.properties.iter().any(|p| p.name == name) {
                    // Already synthesized from another notification class entry
                    continue;
                }
                let type_name = fragment.definition_name().map(str::to_string);
                if let Some(definition) = type_name.as_deref() {
                    if let Some(def) = annotations.get(definition) {
                        interface.aggregates.insert(definition, def.clone());
                    }
                }
                let access = if fragment.is_read_only() {
                    PropertyAccess::Read
                } else {
                    PropertyAccess::ReadWrite
                };
                let notify = if observable {
                    NotificationClass::True
                } else {
                    NotificationClass::False
                };
                let mut property = PropertyDescriptor::new(name, signature, access);
                property.notify = notify;
                property.type_name = type_name;
                property.minimum = fragment.minimum;
                property.maximum = fragment.maximum;
                property.default = fragment.default.clone();
                interface.properties.push(property);
            }

            by_definition.insert(entry_name.clone(), interface_name);
        }

        (interfaces, by_definition)
    }

    /// Pass 3: group interfaces into virtual objects by path.
    fn wire_objects(
        &self,
        paths: &Map<String, Value>,
        by_definition: &IndexMap<String, String>,
    ) -> IndexMap<String, VirtualObject> {
        let mut objects: IndexMap<String, VirtualObject> = IndexMap::new();

        for (path, item) in paths {
            let Some(item_map) = item.as_object() else {
                warn!(path = %path, "skipping malformed path entry");
                continue;
            };

            let mut referenced: Vec<String> = Vec::new();
            for operation_name in ["get", "post"] {
                let Some(operation) = item_map.get(operation_name).and_then(Value::as_object)
                else {
                    continue;
                };
                if let Some(parameters) = operation.get("parameters").and_then(Value::as_array) {
                    for parameter in parameters {
                        if let Some(schema) = parameter.get("schema") {
                            collect_definition_refs(schema, &mut referenced);
                        }
                    }
                }
                if let Some(responses) = operation.get("responses").and_then(Value::as_object) {
                    for response in responses.values() {
                        if let Some(schema) = response.get("schema") {
                            collect_definition_refs(schema, &mut referenced);
                        }
                    }
                }
            }

            let mut interface_names: Vec<String> = Vec::new();
            for definition in referenced {
                if let Some(interface) = by_definition.get(&definition) {
                    if !interface_names.contains(interface) {
                        interface_names.push(interface.clone());
                    }
                }
            }
            if interface_names.is_empty() {
                continue;
            }

            // Collection children share their parent's object
            let key = self
                .resources
                .iter()
                .find(|r| r.path == *path)
                .and_then(|r| r.parent.clone())
                .unwrap_or_else(|| path.clone());

            let object = objects.entry(key.clone()).or_insert_with(|| VirtualObject {
                path: key.clone(),
                interfaces: Vec::new(),
            });
            for name in interface_names {
                if !object.interfaces.contains(&name) {
                    object.interfaces.push(name);
                }
            }
        }

        objects
    }
}

/// Collect referenced definition names off an operation schema, looking
/// through a `oneOf` union one level deep.
fn collect_definition_refs(schema: &Value, out: &mut Vec<String>) {
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        if let Some(name) = reference.strip_prefix("#/definitions/") {
            out.push(name.to_string());
        }
        return;
    }
    if let Some(branches) = schema.get("oneOf").and_then(Value::as_array) {
        for branch in branches {
            collect_definition_refs(branch, out);
        }
    }
}

/// Fetch a required top-level section that must be a map.
fn required_map<'v>(
    root: &'v Map<String, Value>,
    section: &'static str,
) -> Result<&'v Map<String, Value>, BridgeError> {
    let value = root
        .get(section)
        .ok_or(BridgeError::MissingSection(section))?;
    value
        .as_object()
        .ok_or_else(|| BridgeError::Structure(format!("{} must be a map", section)))
}

/// Strip a trailing notification class token from an entry resource type.
fn strip_class_suffix(resource_type: &str) -> &str {
    match resource_type.rsplit_once('.') {
        Some((base, token)) if NotificationClass::from_token(token).is_some() => base,
        _ => resource_type,
    }
}

/// Pass 1: build the aggregate annotation side table from `definitions`.
fn harvest_annotations(definitions: &Map<String, Value>) -> NamedAggregates {
    let mut annotations = NamedAggregates::new();

    for (name, entry) in definitions {
        let Some(entry_map) = entry.as_object() else {
            warn!(entry = %name, "skipping malformed definitions entry");
            continue;
        };

        if let Some(one_of) = entry_map.get("oneOf") {
            match harvest_enum_entries(one_of) {
                Some(entries) => annotations.insert(name.clone(), AggregateDef::Enum(entries)),
                None => warn!(entry = %name, "skipping malformed enum definition"),
            }
            continue;
        }

        match entry_map.get("properties").and_then(Value::as_object) {
            // Entries advertising a resource type are interfaces (pass 2)
            Some(properties) if properties.contains_key("rt") => continue,
            Some(properties) => match harvest_struct_fields(properties, &annotations) {
                Some(fields) => annotations.insert(name.clone(), AggregateDef::Struct(fields)),
                None => annotations.insert(name.clone(), AggregateDef::Opaque),
            },
            None => {
                if entry_map.get("type").and_then(Value::as_str) == Some("object") {
                    annotations.insert(name.clone(), AggregateDef::Opaque);
                }
            }
        }
    }

    annotations
}

/// Read `oneOf` singleton-enum objects as (value, title) entries.
fn harvest_enum_entries(one_of: &Value) -> Option<Vec<EnumEntry>> {
    let list = one_of.as_array()?;
    let mut entries = Vec::with_capacity(list.len());
    for element in list {
        let values = element.get("enum")?.as_array()?;
        if values.len() != 1 {
            return None;
        }
        // Enum values are signed 64-bit regardless of declared range
        let value = values[0].as_i64()?;
        let title = element
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        entries.push(EnumEntry { value, title });
    }
    Some(entries)
}

/// Read struct fields off a `properties` map, in declared order. Returns
/// `None` when any field type cannot be resolved; the entry then degrades
/// to an opaque dictionary.
fn harvest_struct_fields(
    properties: &Map<String, Value>,
    annotations: &NamedAggregates,
) -> Option<Vec<(String, TypeSignature)>> {
    let mut fields = Vec::with_capacity(properties.len());
    for (field_name, field_value) in properties {
        let fragment: SchemaFragment = serde_json::from_value(field_value.clone()).ok()?;
        let signature = schema_to_signature(&fragment, annotations)?;
        fields.push((field_name.clone(), signature));
    }
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(tree: Value) -> ParsedPeer {
        SchemaParser::new(&[]).parse(&tree).unwrap()
    }

    fn switch_document() -> Value {
        json!({
            "swagger": "2.0",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/switch/1": {
                    "get": {
                        "responses": {
                            "200": {"schema": {"$ref": "#/definitions/com.example.switch.false"}}
                        }
                    }
                }
            },
            "definitions": {
                "com.example.switch.false": {
                    "type": "object",
                    "properties": {
                        "value": {"type": "boolean", "readOnly": true},
                        "rt": {"type": "array", "readOnly": true,
                               "default": ["com.example.switch.false"]},
                        "if": {"type": "array", "readOnly": true}
                    }
                }
            }
        })
    }

    #[test]
    fn test_synthesizes_vendor_interface() {
        let peer = parse(switch_document());
        assert_eq!(peer.interfaces.len(), 1);
        let interface = &peer.interfaces[0];
        assert_eq!(interface.name, "x.com.example.switch");
        assert_eq!(interface.properties.len(), 1);
        let property = &interface.properties[0];
        assert_eq!(property.name, "value");
        assert_eq!(property.signature, TypeSignature::Boolean);
        assert_eq!(property.access, PropertyAccess::Read);
        assert_eq!(property.notify, NotificationClass::False);
    }

    #[test]
    fn test_object_wiring() {
        let peer = parse(switch_document());
        assert_eq!(peer.objects.len(), 1);
        let object = &peer.objects["/switch/1"];
        assert_eq!(object.interfaces, vec!["x.com.example.switch"]);
    }

    #[test]
    fn test_well_known_type_synthesizes_no_interface() {
        let tree = json!({
            "paths": {},
            "definitions": {
                "oic.r.switch.binary": {
                    "type": "object",
                    "properties": {
                        "value": {"type": "boolean"},
                        "rt": {"type": "array", "default": ["oic.r.switch.binary"]}
                    }
                }
            }
        });
        let peer = parse(tree);
        assert!(peer.interfaces.is_empty());
    }

    #[test]
    fn test_device_type_synthesizes_marker_interface() {
        let tree = json!({
            "paths": {},
            "definitions": {
                "oic.d.light": {
                    "type": "object",
                    "properties": {
                        "ignored": {"type": "boolean"},
                        "rt": {"type": "array", "default": ["oic.d.light"]}
                    }
                }
            }
        });
        let peer = parse(tree);
        assert_eq!(peer.interfaces.len(), 1);
        let marker = &peer.interfaces[0];
        assert_eq!(marker.name, "oic.d.light");
        assert!(marker.properties.is_empty());
        assert!(marker.members.is_empty());
    }

    #[test]
    fn test_paths_as_array_is_a_structural_error() {
        let tree = json!({"paths": [], "definitions": {}});
        let result = SchemaParser::new(&[]).parse(&tree);
        assert!(matches!(result, Err(BridgeError::Structure(_))));
    }

    #[test]
    fn test_missing_definitions_is_fatal() {
        let tree = json!({"paths": {}});
        let result = SchemaParser::new(&[]).parse(&tree);
        assert!(matches!(
            result,
            Err(BridgeError::MissingSection("definitions"))
        ));
    }

    #[test]
    fn test_malformed_entry_is_skipped_not_fatal() {
        let tree = json!({
            "paths": {},
            "definitions": {
                "broken": 42,
                "com.example.ok.false": {
                    "type": "object",
                    "properties": {
                        "value": {"type": "boolean"},
                        "rt": {"type": "array", "default": ["com.example.ok.false"]}
                    }
                }
            }
        });
        let peer = parse(tree);
        assert_eq!(peer.interfaces.len(), 1);
        assert_eq!(peer.interfaces[0].name, "x.com.example.ok");
    }

    #[test]
    fn test_enum_annotation_harvest() {
        let tree = json!({
            "paths": {},
            "definitions": {
                "Mode": {
                    "oneOf": [
                        {"enum": [0], "title": "off"},
                        {"enum": [1], "title": "auto"}
                    ]
                },
                "com.example.hvac.false": {
                    "type": "object",
                    "properties": {
                        "mode": {"$ref": "#/definitions/Mode"},
                        "rt": {"type": "array", "default": ["com.example.hvac.false"]}
                    }
                }
            }
        });
        let peer = parse(tree);
        let interface = &peer.interfaces[0];
        assert_eq!(interface.properties[0].signature, TypeSignature::Int64);
    }

    #[test]
    fn test_struct_annotation_harvest_in_field_order() {
        let tree = json!({
            "paths": {},
            "definitions": {
                "Extent": {
                    "type": "object",
                    "properties": {
                        "width": {"type": "integer", "minimum": -2147483648,
                                  "maximum": 2147483647},
                        "label": {"type": "string"}
                    }
                },
                "com.example.display.false": {
                    "type": "object",
                    "properties": {
                        "extent": {"$ref": "#/definitions/Extent"},
                        "rt": {"type": "array", "default": ["com.example.display.false"]}
                    }
                }
            }
        });
        let peer = parse(tree);
        let interface = &peer.interfaces[0];
        assert_eq!(
            interface.properties[0].signature,
            TypeSignature::Struct(vec![TypeSignature::Int32, TypeSignature::String])
        );
    }

    #[test]
    fn test_notification_class_entries_merge_into_one_interface() {
        let tree = json!({
            "paths": {},
            "definitions": {
                "com.example.sensor.const": {
                    "type": "object",
                    "properties": {
                        "model": {"type": "string", "readOnly": true},
                        "rt": {"type": "array", "default": ["com.example.sensor.const"]}
                    }
                },
                "com.example.sensor.true": {
                    "type": "object",
                    "properties": {
                        "reading": {"type": "number", "readOnly": true},
                        "rt": {"type": "array", "default": ["com.example.sensor.true"]}
                    }
                }
            }
        });
        let peer = parse(tree);
        assert_eq!(peer.interfaces.len(), 1);
        let interface = &peer.interfaces[0];
        assert_eq!(interface.name, "x.com.example.sensor");
        assert_eq!(interface.properties.len(), 2);
    }

    #[test]
    fn test_observability_map_drives_notify() {
        let resources = [DiscoveredResource::new(
            "/sensor/1",
            vec!["com.example.sensor.true".to_string()],
        )
        .observable(true)];
        let tree = json!({
            "paths": {},
            "definitions": {
                "com.example.sensor.true": {
                    "type": "object",
                    "properties": {
                        "reading": {"type": "number", "readOnly": true},
                        "rt": {"type": "array", "default": ["com.example.sensor.true"]}
                    }
                }
            }
        });
        let peer = SchemaParser::new(&resources).parse(&tree).unwrap();
        assert_eq!(
            peer.interfaces[0].properties[0].notify,
            NotificationClass::True
        );
    }

    #[test]
    fn test_collection_children_fold_into_parent_object() {
        let resources = [
            DiscoveredResource::new("/lights", vec!["x.com.example.lights".to_string()]),
            DiscoveredResource::new("/lights/1", vec!["com.example.light.false".to_string()])
                .with_parent("/lights"),
        ];
        let tree = json!({
            "paths": {
                "/lights/1": {
                    "get": {
                        "responses": {
                            "200": {"schema": {"$ref": "#/definitions/com.example.light.false"}}
                        }
                    }
                }
            },
            "definitions": {
                "com.example.light.false": {
                    "type": "object",
                    "properties": {
                        "on": {"type": "boolean"},
                        "rt": {"type": "array", "default": ["com.example.light.false"]}
                    }
                }
            }
        });
        let peer = SchemaParser::new(&resources).parse(&tree).unwrap();
        assert_eq!(peer.objects.len(), 1);
        assert!(peer.objects.contains_key("/lights"));
        assert_eq!(peer.objects["/lights"].interfaces, vec!["x.com.example.light"]);
    }

    #[test]
    fn test_one_of_union_in_response_schema() {
        let tree = json!({
            "paths": {
                "/multi": {
                    "get": {
                        "responses": {
                            "200": {"schema": {"oneOf": [
                                {"$ref": "#/definitions/com.example.a.false"},
                                {"$ref": "#/definitions/com.example.b.false"}
                            ]}}
                        }
                    }
                }
            },
            "definitions": {
                "com.example.a.false": {
                    "type": "object",
                    "properties": {
                        "x": {"type": "boolean"},
                        "rt": {"type": "array", "default": ["com.example.a.false"]}
                    }
                },
                "com.example.b.false": {
                    "type": "object",
                    "properties": {
                        "y": {"type": "boolean"},
                        "rt": {"type": "array", "default": ["com.example.b.false"]}
                    }
                }
            }
        });
        let peer = parse(tree);
        assert_eq!(
            peer.objects["/multi"].interfaces,
            vec!["x.com.example.a", "x.com.example.b"]
        );
    }
}
