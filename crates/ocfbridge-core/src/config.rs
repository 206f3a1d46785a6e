//! Bridge configuration constants and helpers.
//!
//! Defaults live here so the two translation directions never drift apart on
//! shared values. Everything is overridable per call; the environment
//! variables exist for deployments that cannot pass configuration through
//! the caller.

/// Document-level defaults for generated schema documents.
pub mod document {
    /// `info.title` of generated documents
    pub const TITLE: &str = "Bridged resource introspection";
    /// Portable document format revision carried in the `swagger` marker
    pub const FORMAT_VERSION: &str = "2.0";
}

/// Numeric representation limits.
pub mod limits {
    /// Largest integer magnitude JSON-number based consumers represent
    /// exactly (2^53 - 1); values outside it travel as tagged strings.
    pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;
}

/// Software version gating for metadata annotations.
///
/// Annotation ordering on the bus side was unreliable before this daemon
/// release; per-property and per-argument name/min/max annotations from
/// older peers are ignored rather than trusted.
pub mod annotation_trust {
    use semver::Version;

    /// First version whose annotation ordering is trusted.
    pub fn threshold() -> Version {
        Version::new(16, 10, 0)
    }

    /// Whether annotations from a peer at `version` may be trusted.
    pub fn is_trusted(version: &Version) -> bool {
        *version >= threshold()
    }
}

/// Environment variable names.
pub mod env_vars {
    use semver::Version;

    pub const ANNOTATION_TRUST_VERSION: &str = "BRIDGE_ANNOTATION_TRUST_VERSION";

    /// Optional override for the annotation trust threshold.
    pub fn annotation_trust_version() -> Option<Version> {
        std::env::var(ANNOTATION_TRUST_VERSION)
            .ok()
            .and_then(|s| Version::parse(&s).ok())
    }
}
