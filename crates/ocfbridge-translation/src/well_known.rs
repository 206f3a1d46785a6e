//! Well-Known Name Filter
//!
//! Two fixed catalogues consulted identically by the generator and the
//! parser, so the two directions can never disagree on which names are
//! excluded from generic translation:
//!
//! - resource types with a standard, non-generic native mapping defined by
//!   the governing specifications (those get a dedicated translation
//!   elsewhere, never the generic one)
//! - reserved name prefixes belonging to bus and session infrastructure
//!
//! Both tables are immutable process-wide data; unsynchronized concurrent
//! reads are safe.

/// Resource types with a fixed, non-generic native mapping.
pub const WELL_KNOWN_RESOURCE_TYPES: &[&str] = &[
    // Core discovery and metadata resources
    "oic.wk.res",
    "oic.wk.d",
    "oic.wk.p",
    "oic.wk.con",
    "oic.wk.introspection",
    "oic.wk.col",
    // Security virtual resources
    "oic.r.doxm",
    "oic.r.pstat",
    "oic.r.acl2",
    "oic.r.cred",
    "oic.r.csr",
    "oic.r.roles",
    "oic.r.sp",
    // Standard device function resources
    "oic.r.switch.binary",
    "oic.r.light.brightness",
    "oic.r.light.dimming",
    "oic.r.colour.rgb",
    "oic.r.colour.chroma",
    "oic.r.temperature",
    "oic.r.humidity",
    "oic.r.energy.usage",
    "oic.r.audio",
    "oic.r.media",
    "oic.r.openlevel",
    "oic.r.icon",
];

/// Name prefixes reserved for bus and session infrastructure.
pub const RESERVED_NAME_PREFIXES: &[&str] = &[
    "org.freedesktop.DBus",
    "org.alljoyn.Bus",
    "org.alljoyn.About",
    "org.alljoyn.Icon",
    "org.alljoyn.Daemon",
    "org.allseen.Introspectable",
];

/// Reserved sub-namespace for device types; entries under it synthesize
/// marker interfaces with no properties or members.
pub const DEVICE_TYPE_PREFIX: &str = "oic.d.";

/// Interface query tokens advertised in generated documents.
pub mod interface_tokens {
    pub const BASELINE: &str = "oic.if.baseline";
    pub const READ: &str = "oic.if.r";
    pub const READ_WRITE: &str = "oic.if.rw";
}

/// Baseline marker properties present on every definitions entry; never
/// translated into interface properties.
pub const BASELINE_PROPERTIES: &[&str] = &["rt", "if", "p", "n", "id"];

/// Whether the name appears in the well-known resource type catalogue.
pub fn is_well_known(name: &str) -> bool {
    WELL_KNOWN_RESOURCE_TYPES.contains(&name)
}

/// Whether the name lies under a reserved infrastructure prefix.
pub fn has_reserved_prefix(name: &str) -> bool {
    RESERVED_NAME_PREFIXES
        .iter()
        .any(|prefix| name == *prefix || name.starts_with(&format!("{}.", prefix)))
}

/// Whether the name is eligible for generic translation.
pub fn is_translatable(name: &str) -> bool {
    !is_well_known(name) && !has_reserved_prefix(name)
}

/// Whether the resource type lies in the reserved device-type namespace.
pub fn is_device_type(resource_type: &str) -> bool {
    resource_type.starts_with(DEVICE_TYPE_PREFIX)
}

/// Whether a baseline marker property of that name exists.
pub fn is_baseline_property(name: &str) -> bool {
    BASELINE_PROPERTIES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_types_excluded() {
        assert!(!is_translatable("oic.r.switch.binary"));
        assert!(!is_translatable("oic.wk.d"));
        assert!(!is_translatable("oic.r.doxm"));
    }

    #[test]
    fn test_reserved_prefixes_excluded() {
        assert!(!is_translatable("org.freedesktop.DBus"));
        assert!(!is_translatable("org.freedesktop.DBus.Properties"));
        assert!(!is_translatable("org.alljoyn.Bus.Peer.Session"));
    }

    #[test]
    fn test_vendor_names_eligible() {
        assert!(is_translatable("x.com.example.widget"));
        assert!(is_translatable("com.example.Widget"));
        // Prefix match is segment-aware
        assert!(is_translatable("org.alljoyn.Busybody"));
    }

    #[test]
    fn test_device_type_namespace() {
        assert!(is_device_type("oic.d.light"));
        assert!(!is_device_type("oic.r.switch.binary"));
        assert!(!is_device_type("x.com.example.light"));
    }

    #[test]
    fn test_baseline_properties() {
        for name in ["rt", "if", "p", "n", "id"] {
            assert!(is_baseline_property(name));
        }
        assert!(!is_baseline_property("value"));
    }
}
