//! Schema Generator
//!
//! Walks a set of native interface descriptors and emits the portable
//! schema document that exposes them to the remote ecosystem.
//!
//! Properties are partitioned by notification class; each non-empty class
//! becomes one definitions entry carrying the class token in its name, so a
//! peer can subscribe to exactly the properties that announce changes.
//! Members become one entry per resource type with a `validity` marker and
//! the argument properties. Aggregate annotations are flushed to shared
//! named definitions on first reference.

use indexmap::IndexMap;
use semver::Version;
use serde_json::{json, Value};
use tracing::debug;

use ocfbridge_core::{
    config, ArgumentDirection, BridgeError, InterfaceDescriptor, MemberKind, NotificationClass,
    PropertyAccess, PropertyDescriptor, ResourceDescriptor,
};

use crate::document::{Operation, Parameter, PathItem, Response, SchemaDocument};
use crate::ident;
use crate::schema::{SchemaFragment, SchemaItems, SchemaType};
use crate::type_map::{signature_to_schema, NumericOverrides};
use crate::well_known::{self, interface_tokens};

/// Generates portable schema documents from native descriptors.
///
/// One generator call builds and returns its own document; no state is
/// shared between calls, so concurrent generation needs no locking.
pub struct SchemaGenerator<'a> {
    version: Version,
    observable: &'a dyn Fn(&str) -> bool,
}

impl<'a> SchemaGenerator<'a> {
    /// `version` is the peer software version gating annotation trust;
    /// `observable` reports whether a resource type announces changes.
    pub fn new(version: Version, observable: &'a dyn Fn(&str) -> bool) -> Self {
        Self {
            version,
            observable,
        }
    }

    /// Whether per-property and per-argument metadata annotations from this
    /// peer version may be trusted. Pre-threshold annotation ordering is
    /// unreliable and the annotations are ignored wholesale.
    fn annotations_trusted(&self) -> bool {
        let threshold = config::env_vars::annotation_trust_version()
            .unwrap_or_else(config::annotation_trust::threshold);
        self.version >= threshold
    }

    /// Build the document for the given resources.
    pub fn generate(
        &self,
        resources: &[ResourceDescriptor],
    ) -> Result<SchemaDocument, BridgeError> {
        let trusted = self.annotations_trusted();
        let mut definitions = IndexMap::new();
        let mut paths = IndexMap::new();

        for resource in resources {
            let mut get_refs: Vec<String> = Vec::new();
            let mut post_refs: Vec<String> = Vec::new();

            for interface in &resource.interfaces {
                if !well_known::is_translatable(&interface.name) {
                    debug!(interface = %interface.name, "skipping well-known interface");
                    continue;
                }
                self.emit_property_entries(
                    interface,
                    trusted,
                    &mut definitions,
                    &mut get_refs,
                    &mut post_refs,
                );
                self.emit_member_entries(
                    interface,
                    trusted,
                    &mut definitions,
                    &mut get_refs,
                    &mut post_refs,
                );
            }

            if get_refs.is_empty() {
                debug!(path = %resource.path, "resource has no translatable interfaces");
                continue;
            }
            paths.insert(
                resource.path.clone(),
                self.path_item(&get_refs, &post_refs),
            );
        }

        Ok(SchemaDocument::new(paths, definitions))
    }

    /// Build the document and serialize it into the compact binary form.
    pub fn generate_cbor(&self, resources: &[ResourceDescriptor]) -> Result<Vec<u8>, BridgeError> {
        self.generate(resources)?.to_cbor()
    }

    /// The class a property is published under: declared class, except that
    /// change announcements are demoted when the resource type is not
    /// observable on this side.
    fn effective_class(
        &self,
        interface: &InterfaceDescriptor,
        property: &PropertyDescriptor,
    ) -> NotificationClass {
        if property.notify == NotificationClass::True && !(self.observable)(&interface.name) {
            NotificationClass::False
        } else {
            property.notify
        }
    }

    fn emit_property_entries(
        &self,
        interface: &InterfaceDescriptor,
        trusted: bool,
        definitions: &mut IndexMap<String, SchemaFragment>,
        get_refs: &mut Vec<String>,
        post_refs: &mut Vec<String>,
    ) {
        for class in NotificationClass::ALL {
            let members: Vec<&PropertyDescriptor> = interface
                .properties
                .iter()
                .filter(|p| self.effective_class(interface, p) == class)
                .collect();
            if members.is_empty() {
                continue;
            }

            let entry_name = format!("{}.{}", ident::encode_name(&interface.name), class.token());
            let writable = members
                .iter()
                .any(|p| p.access == PropertyAccess::ReadWrite);

            if !definitions.contains_key(&entry_name) {
                let mut properties = IndexMap::new();
                for property in &members {
                    let overrides = if trusted {
                        NumericOverrides {
                            minimum: property.minimum,
                            maximum: property.maximum,
                            default: property.default.clone(),
                        }
                    } else {
                        NumericOverrides::default()
                    };
                    let mut fragment = signature_to_schema(
                        &property.signature,
                        &overrides,
                        property.type_name.as_deref(),
                        &interface.aggregates,
                        definitions,
                    );
                    if property.access == PropertyAccess::Read {
                        fragment.read_only = Some(true);
                    }
                    properties.insert(ident::encode_name(&property.name), fragment);
                }
                properties.insert("rt".to_string(), rt_fragment(&entry_name));
                properties.insert("if".to_string(), if_fragment(writable));
                definitions.insert(entry_name.clone(), SchemaFragment::object(properties));
            }

            get_refs.push(entry_name.clone());
            if writable {
                post_refs.push(entry_name);
            }
        }
    }

    fn emit_member_entries(
        &self,
        interface: &InterfaceDescriptor,
        trusted: bool,
        definitions: &mut IndexMap<String, SchemaFragment>,
        get_refs: &mut Vec<String>,
        post_refs: &mut Vec<String>,
    ) {
        for member in &interface.members {
            if !well_known::is_translatable(&member.resource_type) {
                debug!(resource_type = %member.resource_type, "skipping well-known member");
                continue;
            }
            let entry_name = ident::encode_name(&member.resource_type);
            let is_signal = member.kind == MemberKind::Signal;

            if !definitions.contains_key(&entry_name) {
                let mut properties = IndexMap::new();

                let mut validity = SchemaFragment::of_type("boolean");
                if is_signal {
                    validity.read_only = Some(true);
                }
                properties.insert("validity".to_string(), validity);

                let encoded_member = ident::encode_name(&member.name);
                for direction in [ArgumentDirection::In, ArgumentDirection::Out] {
                    for (index, argument) in member
                        .arguments
                        .iter()
                        .enumerate()
                        .filter(|(_, a)| a.direction == direction)
                    {
                        let explicit = if trusted {
                            argument.name.as_deref()
                        } else {
                            None
                        };
                        let name =
                            ident::argument_property_name(&encoded_member, index, explicit);
                        let mut fragment = signature_to_schema(
                            &argument.signature,
                            &NumericOverrides::default(),
                            argument.type_name.as_deref(),
                            &interface.aggregates,
                            definitions,
                        );
                        if is_signal || direction == ArgumentDirection::Out {
                            fragment.read_only = Some(true);
                        }
                        properties.insert(name, fragment);
                    }
                }

                properties.insert("rt".to_string(), rt_fragment(&entry_name));
                // Signals expose only a read interface
                properties.insert("if".to_string(), if_fragment(!is_signal));
                definitions.insert(entry_name.clone(), SchemaFragment::object(properties));
            }

            get_refs.push(entry_name.clone());
            if !is_signal {
                post_refs.push(entry_name);
            }
        }
    }

    fn path_item(&self, get_refs: &[String], post_refs: &[String]) -> PathItem {
        let mut tokens = vec![interface_tokens::BASELINE.to_string()];
        if !post_refs.is_empty() {
            tokens.push(interface_tokens::READ_WRITE.to_string());
        }
        tokens.push(interface_tokens::READ.to_string());

        let mut get = Operation {
            parameters: vec![Parameter::interface_query(tokens.clone())],
            responses: IndexMap::new(),
        };
        get.responses
            .insert("200".to_string(), Response::ok(union_of(get_refs)));

        let post = if post_refs.is_empty() {
            None
        } else {
            let body = union_of(post_refs);
            let mut responses = IndexMap::new();
            responses.insert("200".to_string(), Response::ok(body.clone()));
            Some(Operation {
                parameters: vec![
                    Parameter::interface_query(tokens),
                    Parameter::body(body),
                ],
                responses,
            })
        };

        PathItem {
            get: Some(get),
            post,
        }
    }
}

/// Reference one definition, or a `oneOf` union over several.
fn union_of(names: &[String]) -> SchemaFragment {
    if names.len() == 1 {
        SchemaFragment::definition_ref(&names[0])
    } else {
        SchemaFragment {
            one_of: Some(
                names
                    .iter()
                    .map(|name| SchemaFragment::definition_ref(name))
                    .collect(),
            ),
            ..Default::default()
        }
    }
}

/// The synthesized read-only `rt` property, defaulting to the entry's name.
fn rt_fragment(entry_name: &str) -> SchemaFragment {
    SchemaFragment {
        default: Some(json!([entry_name])),
        items: Some(Box::new(SchemaItems::One(SchemaFragment::of_type(
            "string",
        )))),
        ..SchemaFragment::of_type("array")
    }
    .read_only()
}

/// The synthesized read-only `if` property enumerating supported interface
/// tokens, widened when the entry carries writable properties.
fn if_fragment(writable: bool) -> SchemaFragment {
    let access = if writable {
        interface_tokens::READ_WRITE
    } else {
        interface_tokens::READ
    };
    let item = SchemaFragment {
        enum_values: Some(vec![
            Value::from(interface_tokens::BASELINE),
            Value::from(access),
        ]),
        ..SchemaFragment::of_type("string")
    };
    SchemaFragment {
        items: Some(Box::new(SchemaItems::One(item))),
        ..SchemaFragment::of_type("array")
    }
    .read_only()
}
