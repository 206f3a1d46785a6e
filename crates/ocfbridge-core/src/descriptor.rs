//! Interface and member descriptors.
//!
//! An `InterfaceDescriptor` is the native-side picture of one bridged
//! interface: its ordered properties and members plus the aggregate
//! (struct/dict/enum) annotations harvested from interface metadata.
//! Descriptors are immutable once built; the generator reads them, the
//! parser synthesizes them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::signature::TypeSignature;

/// Access rights for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyAccess {
    /// Readable only
    Read,
    /// Readable and writable
    ReadWrite,
}

/// How a property announces value changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationClass {
    /// Never changes
    Const,
    /// Changes silently
    #[default]
    False,
    /// Emits the new value on change
    True,
    /// Announces that the value is stale without carrying it
    Invalidates,
}

impl NotificationClass {
    /// The class token appended to definitions entry names.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Const => "const",
            Self::False => "false",
            Self::True => "true",
            Self::Invalidates => "invalidates",
        }
    }

    /// All classes in partition order.
    pub const ALL: [NotificationClass; 4] = [
        NotificationClass::Const,
        NotificationClass::False,
        NotificationClass::True,
        NotificationClass::Invalidates,
    ];

    /// Recognize a class token at the end of an encoded entry name.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "const" => Some(Self::Const),
            "false" => Some(Self::False),
            "true" => Some(Self::True),
            "invalidates" => Some(Self::Invalidates),
            _ => None,
        }
    }
}

/// One property of an interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name in the native grammar
    pub name: String,
    /// Wire type
    pub signature: TypeSignature,
    /// Access rights
    pub access: PropertyAccess,
    /// Notification class (default `false`)
    #[serde(default)]
    pub notify: NotificationClass,
    /// Name of an aggregate annotation describing this property's type,
    /// when the bare signature cannot carry it (structs, dicts, enums)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Declared minimum, overriding the signature's natural bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    /// Declared maximum, overriding the signature's natural bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    /// Declared default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, signature: TypeSignature, access: PropertyAccess) -> Self {
        Self {
            name: name.into(),
            signature,
            access,
            notify: NotificationClass::default(),
            type_name: None,
            minimum: None,
            maximum: None,
            default: None,
        }
    }

    pub fn with_notify(mut self, notify: NotificationClass) -> Self {
        self.notify = notify;
        self
    }

    pub fn with_type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    pub fn with_bounds(mut self, minimum: Option<i64>, maximum: Option<i64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }
}

/// Kind of an interface member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// Request/response operation
    Method,
    /// One-way notification
    Signal,
}

/// Direction of a member argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentDirection {
    In,
    Out,
}

/// One argument of a method or signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    /// Declared argument name, when the metadata carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Argument direction (signals only carry `out` arguments)
    pub direction: ArgumentDirection,
    /// Wire type
    pub signature: TypeSignature,
    /// Aggregate annotation name, as for properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ArgumentDescriptor {
    pub fn new(direction: ArgumentDirection, signature: TypeSignature) -> Self {
        Self {
            name: None,
            direction,
            signature,
            type_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// One method or signal of an interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    /// Member name in the native grammar
    pub name: String,
    /// Method or signal
    pub kind: MemberKind,
    /// Resource type under which this member is published
    pub resource_type: String,
    /// Ordered arguments (inputs before outputs)
    #[serde(default)]
    pub arguments: Vec<ArgumentDescriptor>,
}

/// One bridged interface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    /// Interface name in the native grammar
    pub name: String,
    /// Ordered properties
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    /// Ordered members
    #[serde(default)]
    pub members: Vec<MemberDescriptor>,
    /// Aggregate annotations collected from the interface metadata
    #[serde(default, skip_serializing_if = "NamedAggregates::is_empty")]
    pub aggregates: NamedAggregates,
}

impl InterfaceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_aggregate(mut self, name: impl Into<String>, def: AggregateDef) -> Self {
        self.aggregates.insert(name, def);
        self
    }
}

/// One entry of an enum aggregate: numeric value plus display title.
///
/// Values are carried as signed 64-bit regardless of the declared range;
/// enums whose true range exceeds that are not supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumEntry {
    pub value: i64,
    pub title: String,
}

/// Identity of an aggregate type that a bare schema fragment cannot express.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateDef {
    /// Named struct: ordered (field name, field type) pairs
    Struct(Vec<(String, TypeSignature)>),
    /// Dictionary with statically known key and value types
    Dict {
        key: TypeSignature,
        value: TypeSignature,
    },
    /// Enumeration of (value, title) entries
    Enum(Vec<EnumEntry>),
    /// Known by name only; translated as an opaque dictionary
    Opaque,
}

/// Annotation side table: aggregate definitions keyed by name.
///
/// Built fresh per translation call (from interface metadata on the way out,
/// from the document's definitions section on the way in) and discarded when
/// the call completes. Insertion order is preserved so emitted definitions
/// are stable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NamedAggregates(IndexMap<String, AggregateDef>);

impl NamedAggregates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a definition, keeping the first one seen for each name.
    pub fn insert(&mut self, name: impl Into<String>, def: AggregateDef) {
        self.0.entry(name.into()).or_insert(def);
    }

    pub fn get(&self, name: &str) -> Option<&AggregateDef> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AggregateDef)> {
        self.0.iter()
    }
}
