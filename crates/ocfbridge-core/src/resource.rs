//! Per-path resource descriptions.
//!
//! `ResourceDescriptor` is the generator's input: one local object path and
//! the interfaces it exposes. `DiscoveredResource` is the parser's wiring
//! input: one remote path, its resource types, and its place in a collection
//! hierarchy. Both are supplied by the surrounding discovery collaborators;
//! the engine never performs I/O to obtain them.

use serde::{Deserialize, Serialize};

use crate::descriptor::InterfaceDescriptor;

/// One local resource exposed to the remote ecosystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Object path this resource is registered under
    pub path: String,
    /// Interfaces the resource implements, in registration order
    pub interfaces: Vec<InterfaceDescriptor>,
}

impl ResourceDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            interfaces: Vec::new(),
        }
    }

    pub fn with_interface(mut self, interface: InterfaceDescriptor) -> Self {
        self.interfaces.push(interface);
        self
    }
}

/// One resource discovered on a remote peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredResource {
    /// Path of the resource on the peer
    pub path: String,
    /// Resource types the peer advertises for this path
    pub resource_types: Vec<String>,
    /// Whether the peer marked the resource observable
    #[serde(default)]
    pub observable: bool,
    /// Path of the parent collection, when this resource is a collection
    /// child and must not receive its own object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl DiscoveredResource {
    pub fn new(path: impl Into<String>, resource_types: Vec<String>) -> Self {
        Self {
            path: path.into(),
            resource_types,
            observable: false,
            parent: None,
        }
    }

    pub fn observable(mut self, observable: bool) -> Self {
        self.observable = observable;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Whether this resource advertises the given resource type.
    pub fn has_resource_type(&self, rt: &str) -> bool {
        self.resource_types.iter().any(|t| t == rt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovered_resource_builder() {
        let res = DiscoveredResource::new("/light/1", vec!["x.com.example.light".into()])
            .observable(true)
            .with_parent("/lights");

        assert!(res.observable);
        assert_eq!(res.parent.as_deref(), Some("/lights"));
        assert!(res.has_resource_type("x.com.example.light"));
        assert!(!res.has_resource_type("x.com.example.fan"));
    }
}
