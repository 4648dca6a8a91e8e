//! Tuya Zigbee Datapoint Engine
//!
//! Device-aware layer on top of `tuyadp-core`: declarative device profiles,
//! a fingerprint registry and the conversion pipeline that turns inbound
//! datapoint frames into `(capability, value)` updates and capability writes
//! into outbound frames.
//!
//! ## Architecture
//!
//! - **Profile / Fingerprint**: plain serde data describing one hardware
//!   family's capabilities and their datapoint bindings
//! - **ProfileRegistry**: tables validated and frozen at load time, shared as
//!   `Arc` snapshots; [`SharedProfileStore`] swaps whole tables atomically
//!   for hot reloads
//! - **ConversionPipeline**: the only component that knows what a device is;
//!   stateless over the injected registries
//! - **builtin**: shipped profile and fingerprint tables for common hardware
//!
//! Everything is synchronous; nothing here suspends, blocks or performs I/O.

pub mod builtin;
pub mod pipeline;
pub mod profile;
pub mod registry;

// Re-exports for convenience
pub use builtin::{builtin_fingerprints, builtin_profiles, builtin_registry};
pub use pipeline::{
    CapabilityUpdate, ConversionPipeline, ConverterFallback, InboundReport, UnmappedDatapoint,
    WriteError,
};
pub use profile::{DpConfig, Fingerprint, Profile};
pub use registry::{ProfileLoadError, ProfileRegistry, SharedProfileStore};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
