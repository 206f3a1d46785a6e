//! Shared Data Model for the Resource Bridge
//!
//! This crate defines the types exchanged between the two halves of the
//! translation engine:
//!
//! - **TypeSignature**: the recursive wire type algebra (D-Bus style codes)
//! - **InterfaceDescriptor**: name, properties, and members of one bridged
//!   interface, either supplied by the local bus or synthesized from a
//!   remote peer's schema document
//! - **ResourceDescriptor** / **DiscoveredResource**: the per-path inputs
//!   that drive document generation and object wiring
//! - **NamedAggregates**: the struct/dict/enum metadata annotations that
//!   carry aggregate identity across the two type systems
//!
//! Everything here is plain data: no I/O, no shared mutable state. One
//! translation call builds its own trees and discards them at the end.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod resource;
pub mod signature;

// Re-exports for convenience
pub use descriptor::{
    AggregateDef, ArgumentDescriptor, ArgumentDirection, EnumEntry, InterfaceDescriptor,
    MemberDescriptor, MemberKind, NamedAggregates, NotificationClass, PropertyAccess,
    PropertyDescriptor,
};
pub use error::BridgeError;
pub use resource::{DiscoveredResource, ResourceDescriptor};
pub use signature::TypeSignature;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
