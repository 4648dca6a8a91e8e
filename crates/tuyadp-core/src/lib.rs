//! Tuya Zigbee Datapoint Protocol Primitives
//!
//! This crate implements the vendor-proprietary datapoint (DP) protocol used
//! by a large family of low-cost Zigbee sensors and actuators.
//!
//! ## Architecture
//!
//! The protocol layer is three independent leaves:
//! - **FrameCodec**: total decoder and strict encoder for the TLV wire
//!   format carried on the vendor cluster
//! - **Normalizer**: reduces arbitrarily-shaped inbound data to one
//!   canonical [`DpValue`] using hardware-tuned dispatch rules
//! - **ConverterRegistry**: named bidirectional wire/domain transforms with
//!   per-datapoint parameters
//!
//! Device awareness (profiles, fingerprints, the conversion pipeline) lives
//! one crate up; nothing here knows what a device is.

pub mod convert;
pub mod frame;
pub mod normalize;
pub mod sensor;
pub mod value;

// Re-exports for convenience
pub use convert::{
    Converter, ConverterError, ConverterParams, ConverterRegistry, ResolvedConverter,
    UNKNOWN_LABEL,
};
pub use frame::{cluster, DatapointRecord, DecodedFrame, FrameCodec, FrameCodecConfig, FrameError};
pub use normalize::{
    NormalizeContext, NormalizedValue, Normalizer, RawInput, SemanticHint, ValueShape,
};
pub use value::{DpRecord, DpValue, WireType};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
