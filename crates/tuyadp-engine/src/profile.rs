//! Device profile model.
//!
//! A profile declares everything the engine knows about one hardware
//! family: the capabilities it exposes and, per capability, the datapoint
//! binding that carries it. Profiles are plain serde data so an external
//! configuration layer can load them from JSON or TOML.
//!
//! ## Profile structure
//!
//! ```json
//! {
//!   "name": "temperature_humidity_sensor",
//!   "capabilities": ["temperature", "humidity", "battery"],
//!   "dp_mapping": {
//!     "temperature": { "dp": 1, "wire_type": "value", "converter": "temperature" },
//!     "humidity":    { "dp": 2, "wire_type": "value", "converter": "humidity" },
//!     "battery":     { "dp": 4, "wire_type": "value", "converter": "battery" }
//!   }
//! }
//! ```
//!
//! A fingerprint table row binds a manufacturer identity to a profile name:
//!
//! ```json
//! { "manufacturer": "_TZE200_cwbvmsar", "model": "TS0601",
//!   "profile": "temperature_humidity_sensor" }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tuyadp_core::{ConverterParams, WireType};

/// Device identity row: manufacturer (plus optional model) to profile name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Manufacturer id as reported during join.
    pub manufacturer: String,
    /// Model id, informational only; resolution keys on the manufacturer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Name of the profile this identity selects.
    pub profile: String,
}

impl Fingerprint {
    pub fn new(manufacturer: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model: None,
            profile: profile.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// One capability's wire binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpConfig {
    /// Datapoint id the capability binds to.
    pub dp: u8,
    /// Wire type the device uses for this datapoint.
    pub wire_type: WireType,
    /// Converter name, resolved lazily against the converter registry.
    #[serde(default = "default_converter")]
    pub converter: String,
    /// Per-datapoint converter parameters.
    #[serde(default)]
    pub params: ConverterParams,
}

fn default_converter() -> String {
    "identity".to_string()
}

impl DpConfig {
    pub fn new(dp: u8, wire_type: WireType, converter: impl Into<String>) -> Self {
        Self {
            dp,
            wire_type,
            converter: converter.into(),
            params: ConverterParams::default(),
        }
    }

    pub fn with_params(mut self, params: ConverterParams) -> Self {
        self.params = params;
        self
    }
}

/// A device family's declared behavior. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique profile name.
    pub name: String,
    /// Platform-facing capabilities in declaration order. The order is
    /// load-bearing: reverse datapoint lookup picks the first match.
    pub capabilities: Vec<String>,
    /// Capability to datapoint binding.
    #[serde(default)]
    pub dp_mapping: HashMap<String, DpConfig>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: Vec::new(),
            dp_mapping: HashMap::new(),
        }
    }

    /// Declare a capability and its binding, keeping declaration order.
    pub fn with_capability(mut self, capability: impl Into<String>, config: DpConfig) -> Self {
        let capability = capability.into();
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability.clone());
        }
        self.dp_mapping.insert(capability, config);
        self
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    /// Wire binding for a capability.
    pub fn dp_config(&self, capability: &str) -> Option<&DpConfig> {
        self.dp_mapping.get(capability)
    }

    /// Reverse lookup: the capability fed by a datapoint id.
    ///
    /// First match in declaration order wins when several capabilities
    /// share a datapoint; one raw reading may feed derived capabilities.
    pub fn capability_for_dp(&self, dp: u8) -> Option<(&str, &DpConfig)> {
        self.capabilities.iter().find_map(|capability| {
            self.dp_mapping
                .get(capability)
                .filter(|config| config.dp == dp)
                .map(|config| (capability.as_str(), config))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> Profile {
        Profile::new("plug")
            .with_capability("onoff", DpConfig::new(1, WireType::Bool, "boolean"))
            .with_capability(
                "power",
                DpConfig::new(19, WireType::Value, "scale")
                    .with_params(ConverterParams::new().with_divisor(10.0)),
            )
    }

    #[test]
    fn builder_keeps_declaration_order() {
        let p = profile();
        assert_eq!(p.capabilities, vec!["onoff", "power"]);
        assert!(p.has_capability("power"));
        assert_eq!(p.dp_config("onoff").map(|c| c.dp), Some(1));
        assert!(p.dp_config("energy").is_none());
    }

    #[test]
    fn reverse_lookup_prefers_declaration_order() {
        let p = Profile::new("battery_pair")
            .with_capability("battery", DpConfig::new(4, WireType::Value, "battery"))
            .with_capability("battery_raw", DpConfig::new(4, WireType::Value, "identity"));

        let (capability, config) = p.capability_for_dp(4).unwrap();
        assert_eq!(capability, "battery");
        assert_eq!(config.converter, "battery");
        assert!(p.capability_for_dp(9).is_none());
    }

    #[test]
    fn deserializes_from_declarative_json() {
        let p: Profile = serde_json::from_value(json!({
            "name": "curtain",
            "capabilities": ["position", "state"],
            "dp_mapping": {
                "position": {
                    "dp": 2,
                    "wire_type": "value",
                    "converter": "cover_position",
                    "params": { "invert": true }
                },
                "state": {
                    "dp": 1,
                    "wire_type": "enum",
                    "params": { "labels": ["open", "stop", "close"] }
                }
            }
        }))
        .unwrap();

        let position = p.dp_config("position").unwrap();
        assert_eq!(position.wire_type, WireType::Value);
        assert_eq!(position.params.invert, Some(true));

        // Missing converter names default to identity.
        let state = p.dp_config("state").unwrap();
        assert_eq!(state.converter, "identity");
        assert_eq!(
            state.params.labels.as_deref(),
            Some(&["open".to_string(), "stop".to_string(), "close".to_string()][..])
        );
    }

    #[test]
    fn fingerprint_rows_round_trip_json() {
        let row = Fingerprint::new("_TZE200_cwbvmsar", "temperature_humidity_sensor")
            .with_model("TS0601");
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            json!({
                "manufacturer": "_TZE200_cwbvmsar",
                "model": "TS0601",
                "profile": "temperature_humidity_sensor"
            })
        );
        let back: Fingerprint = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }
}
