//! Conversion pipeline: inbound frames and outbound writes.
//!
//! The pipeline is the only place where a device identity, its profile,
//! the frame codec, the normalizer and the converters meet. It holds no
//! state of its own beyond the injected registries, so one instance serves
//! any number of devices concurrently.
//!
//! ```text
//!   inbound:  bytes ──decode──> records ──map──> converters ──> updates
//!                                  │ no capability
//!                                  └────────────> unmapped diagnostics
//!   outbound: (capability, value) ──map──> converter ──encode──> bytes
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tuyadp_core::{
    ConverterError, ConverterRegistry, DatapointRecord, DecodedFrame, DpValue, FrameCodec,
    FrameError, NormalizeContext, Normalizer, RawInput, SemanticHint, WireType,
};

use crate::profile::Profile;
use crate::registry::ProfileRegistry;

/// One capability's new value from an inbound report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityUpdate {
    pub capability: String,
    pub dp: u8,
    pub value: DpValue,
}

/// Inbound datapoint that no profile capability claims.
///
/// Carried to the caller rather than dropped; an external collaborator uses
/// these for forward-compatible discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmappedDatapoint {
    pub dp: u8,
    /// Interpreted value.
    pub value: DpValue,
    /// Wire record, when the datapoint arrived in a binary frame.
    pub record: Option<DatapointRecord>,
}

/// A profile referenced a converter this build does not carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterFallback {
    pub dp: u8,
    pub converter: String,
}

/// Everything one inbound payload produced.
///
/// Updates appear in wire order; when several updates target the same
/// capability the caller applies them last-write-wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundReport {
    pub updates: Vec<CapabilityUpdate>,
    pub unmapped: Vec<UnmappedDatapoint>,
    pub fallbacks: Vec<ConverterFallback>,
    /// A report-shaped payload that carried no datapoint id at all.
    pub unrouted: Option<DpValue>,
    /// The frame ended mid-entry; leading records were still applied.
    pub truncated: bool,
}

impl InboundReport {
    /// True when the payload produced nothing at all, diagnostics included.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
            && self.unmapped.is_empty()
            && self.fallbacks.is_empty()
            && self.unrouted.is_none()
            && !self.truncated
    }

    /// Last value reported for a capability, applying write precedence.
    pub fn update(&self, capability: &str) -> Option<&DpValue> {
        self.updates
            .iter()
            .rev()
            .find(|update| update.capability == capability)
            .map(|update| &update.value)
    }
}

/// Errors raised on the outbound path. Always surfaced, never absorbed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WriteError {
    #[error("no profile for manufacturer {manufacturer:?}")]
    UnknownDevice { manufacturer: String },

    #[error("capability {capability:?} has no datapoint mapping")]
    UnmappedCapability { capability: String },

    #[error(transparent)]
    Converter(#[from] ConverterError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Stateless orchestrator over the injected registries.
pub struct ConversionPipeline {
    profiles: Arc<ProfileRegistry>,
    converters: Arc<ConverterRegistry>,
    codec: FrameCodec,
    normalizer: Normalizer,
}

impl ConversionPipeline {
    pub fn new(profiles: Arc<ProfileRegistry>, converters: Arc<ConverterRegistry>) -> Self {
        Self::with_codec(profiles, converters, FrameCodec::new())
    }

    pub fn with_codec(
        profiles: Arc<ProfileRegistry>,
        converters: Arc<ConverterRegistry>,
        codec: FrameCodec,
    ) -> Self {
        let normalizer = Normalizer::with_codec(codec.clone());
        Self {
            profiles,
            converters,
            codec,
            normalizer,
        }
    }

    /// Process a raw datapoint frame from a device.
    ///
    /// Every decoded record lands either in `updates` or in `unmapped`;
    /// nothing is silently dropped. An unknown manufacturer is not an
    /// error, its records all pass through unmapped.
    pub fn on_frame(&self, manufacturer: &str, bytes: &[u8]) -> InboundReport {
        let profile = self.device_profile(manufacturer);
        let frame = self.codec.decode(bytes);
        self.apply_frame(profile.as_deref(), frame)
    }

    /// Process a data command payload: sequence header, then a frame.
    pub fn on_report(&self, manufacturer: &str, payload: &[u8]) -> (u16, InboundReport) {
        let profile = self.device_profile(manufacturer);
        let (seq, frame) = self.codec.decode_report(payload);
        (seq, self.apply_frame(profile.as_deref(), frame))
    }

    /// Process a heterogeneous transport report (JSON object, byte list,
    /// hex text and friends) through the normalizer.
    pub fn on_raw(&self, manufacturer: &str, input: RawInput) -> InboundReport {
        let profile = self.device_profile(manufacturer);
        let normalized = self.normalizer.normalize(
            input,
            &NormalizeContext::with_hint(SemanticHint::DatapointStream),
        );

        let mut report = InboundReport::default();
        match normalized.value {
            DpValue::Records(records) => {
                for record in records {
                    self.apply_value(
                        profile.as_deref(),
                        record.dp,
                        record.value,
                        None,
                        true,
                        &mut report,
                    );
                }
            }
            DpValue::Null => {}
            other => {
                warn!(
                    manufacturer,
                    shape = ?normalized.shape,
                    "report carries no datapoint ids"
                );
                report.unrouted = Some(other);
            }
        }
        report
    }

    /// Encode a capability write as a single datapoint frame.
    pub fn write(
        &self,
        manufacturer: &str,
        capability: &str,
        value: &DpValue,
    ) -> Result<Vec<u8>, WriteError> {
        let profile = self.require_profile(manufacturer)?;
        let (dp, wire_type, wire) = self.wire_value(&profile, capability, value)?;
        let bytes = self.codec.encode(dp, wire_type, &wire)?;
        debug!(manufacturer, capability, dp, "encoded capability write");
        Ok(bytes)
    }

    /// Encode several capability writes as one data command payload.
    pub fn write_command(
        &self,
        manufacturer: &str,
        seq: u16,
        writes: &[(&str, DpValue)],
    ) -> Result<Vec<u8>, WriteError> {
        let profile = self.require_profile(manufacturer)?;
        let mut entries = Vec::with_capacity(writes.len());
        for (capability, value) in writes {
            entries.push(self.wire_value(&profile, capability, value)?);
        }
        Ok(self.codec.encode_command(seq, &entries)?)
    }

    fn device_profile(&self, manufacturer: &str) -> Option<Arc<Profile>> {
        let profile = self.profiles.resolve(manufacturer);
        if profile.is_none() {
            debug!(manufacturer, "no profile, datapoints pass through unmapped");
        }
        profile
    }

    fn require_profile(&self, manufacturer: &str) -> Result<Arc<Profile>, WriteError> {
        self.profiles
            .resolve(manufacturer)
            .ok_or_else(|| WriteError::UnknownDevice {
                manufacturer: manufacturer.to_string(),
            })
    }

    fn apply_frame(&self, profile: Option<&Profile>, frame: DecodedFrame) -> InboundReport {
        let mut report = InboundReport {
            truncated: frame.truncated,
            ..Default::default()
        };
        for record in frame.records {
            let value = record.value();
            self.apply_value(profile, record.dp, value, Some(record), false, &mut report);
        }
        report
    }

    /// Route one interpreted datapoint value.
    ///
    /// `interpret_bytes` is set on the report path, where byte values arrive
    /// without a wire type and deserve a capability-hinted read; wire-path
    /// `Raw` payloads stay opaque by contract.
    fn apply_value(
        &self,
        profile: Option<&Profile>,
        dp: u8,
        value: DpValue,
        record: Option<DatapointRecord>,
        interpret_bytes: bool,
        report: &mut InboundReport,
    ) {
        let Some((capability, config)) = profile.and_then(|p| p.capability_for_dp(dp)) else {
            match &record {
                Some(record) => debug!(
                    dp,
                    wire_type = %record.wire_type,
                    payload = %hex::encode(&record.payload),
                    "unmapped datapoint"
                ),
                None => debug!(dp, "unmapped datapoint"),
            }
            report.unmapped.push(UnmappedDatapoint { dp, value, record });
            return;
        };

        let value = match value {
            DpValue::Bytes(bytes) if interpret_bytes => {
                self.normalizer
                    .normalize(
                        RawInput::Bytes(bytes),
                        &NormalizeContext::for_capability(capability),
                    )
                    .value
            }
            // Negative readings arrive as wrapped unsigned words; the
            // capability hint decides whether the payload reads signed.
            DpValue::Number(_)
                if record.as_ref().is_some_and(|r| {
                    r.wire_type == WireType::Value && matches!(r.payload.len(), 2 | 4)
                }) =>
            {
                let payload = record
                    .as_ref()
                    .map(|r| r.payload.clone())
                    .unwrap_or_default();
                self.normalizer
                    .normalize(
                        RawInput::Bytes(payload),
                        &NormalizeContext::for_capability(capability),
                    )
                    .value
            }
            other => other,
        };

        let resolved = self.converters.resolve(&config.converter);
        if resolved.fallback {
            report.fallbacks.push(ConverterFallback {
                dp,
                converter: config.converter.clone(),
            });
        }

        let domain = resolved.converter.to_domain(&value, &config.params);
        debug!(capability, dp, value = %domain, "inbound capability update");
        report.updates.push(CapabilityUpdate {
            capability: capability.to_string(),
            dp,
            value: domain,
        });
    }

    fn wire_value(
        &self,
        profile: &Profile,
        capability: &str,
        value: &DpValue,
    ) -> Result<(u8, WireType, DpValue), WriteError> {
        let config =
            profile
                .dp_config(capability)
                .ok_or_else(|| WriteError::UnmappedCapability {
                    capability: capability.to_string(),
                })?;

        let resolved = self.converters.resolve(&config.converter);
        if resolved.fallback {
            warn!(
                capability,
                converter = %config.converter,
                "writing through identity fallback"
            );
        }

        resolved.converter.validate(value, &config.params)?;
        let wire = resolved.converter.to_wire(value, &config.params)?;
        Ok((config.dp, config.wire_type, wire))
    }
}
