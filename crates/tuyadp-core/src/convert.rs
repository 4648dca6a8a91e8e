//! Bidirectional wire/domain converters.
//!
//! A [`Converter`] turns the value carried on the wire into the value a
//! capability exposes, and back for commands. Converters are pure and
//! parameterized per datapoint through [`ConverterParams`]; profiles refer
//! to them by name through the [`ConverterRegistry`].
//!
//! Reads are total: a converter clamps or passes through anything it does
//! not recognize, it never fails. Writes are strict and surface
//! [`ConverterError`] for values with no wire representation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::sensor;
use crate::value::DpValue;

/// Label produced when an enum code has no table entry.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Per-datapoint converter parameters.
///
/// One shape serves every converter; each reads the fields it cares about
/// and applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterParams {
    /// Multiplier applied wire to domain.
    pub scale: Option<f64>,
    /// Divisor applied wire to domain.
    pub divisor: Option<f64>,
    /// Offset added after scaling.
    pub offset: Option<f64>,
    /// Lower clamp bound on the domain side.
    pub min: Option<f64>,
    /// Upper clamp bound on the domain side.
    pub max: Option<f64>,
    /// Direction flip for position-style values.
    pub invert: Option<bool>,
    /// Enum label table; the wire code is the index.
    pub labels: Option<Vec<String>>,
    /// Divisor for battery readings no magnitude branch claims.
    pub fallback_divisor: Option<f64>,
}

impl ConverterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_divisor(mut self, divisor: f64) -> Self {
        self.divisor = Some(divisor);
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = Some(invert);
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }
}

/// Errors raised on the write path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConverterError {
    #[error("unknown enum label {label:?}")]
    UnknownLabel { label: String },

    #[error("converter {converter} cannot encode a {type_name} value")]
    UnsupportedShape {
        converter: &'static str,
        type_name: &'static str,
    },
}

/// A pure bidirectional transform between wire and domain values.
///
/// Implementations are stateless; everything per-datapoint arrives in the
/// params. `to_domain` must accept any value the wire can produce,
/// `to_wire` may reject values that cannot be represented.
pub trait Converter: Send + Sync {
    /// Stable name profiles use to refer to this converter.
    fn name(&self) -> &'static str;

    /// Wire value into domain value. Total.
    fn to_domain(&self, value: &DpValue, params: &ConverterParams) -> DpValue;

    /// Domain value into wire value.
    fn to_wire(&self, value: &DpValue, params: &ConverterParams) -> Result<DpValue, ConverterError>;

    /// Write-path gate, never applied to reads.
    fn validate(&self, _value: &DpValue, _params: &ConverterParams) -> Result<(), ConverterError> {
        Ok(())
    }
}

/// Number extraction shared by the numeric converters.
fn numeric(value: &DpValue) -> Option<f64> {
    match value {
        DpValue::Number(v) => Some(*v),
        DpValue::Bool(v) => Some(f64::from(u8::from(*v))),
        _ => None,
    }
}

fn clamp_opt(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let value = match min {
        Some(min) => value.max(min),
        None => value,
    };
    match max {
        Some(max) => value.min(max),
        None => value,
    }
}

/// Untouched passthrough; also the fallback for unknown converter names.
struct Identity;

impl Converter for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn to_domain(&self, value: &DpValue, _params: &ConverterParams) -> DpValue {
        value.clone()
    }

    fn to_wire(&self, value: &DpValue, _params: &ConverterParams) -> Result<DpValue, ConverterError> {
        Ok(value.clone())
    }
}

/// Flags in either direction; understands the common on-wire spellings.
struct Boolean;

impl Boolean {
    fn coerce(value: &DpValue) -> Option<bool> {
        match value {
            DpValue::Bool(v) => Some(*v),
            DpValue::Number(v) => Some(*v != 0.0),
            DpValue::Str(v) => {
                let v = v.trim();
                if ["true", "1", "on", "yes"].iter().any(|w| v.eq_ignore_ascii_case(w)) {
                    Some(true)
                } else if ["false", "0", "off", "no"].iter().any(|w| v.eq_ignore_ascii_case(w)) {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl Converter for Boolean {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn to_domain(&self, value: &DpValue, _params: &ConverterParams) -> DpValue {
        match Self::coerce(value) {
            Some(flag) => DpValue::Bool(flag),
            None => value.clone(),
        }
    }

    fn to_wire(&self, value: &DpValue, _params: &ConverterParams) -> Result<DpValue, ConverterError> {
        match Self::coerce(value) {
            Some(flag) => Ok(DpValue::Bool(flag)),
            None => Err(ConverterError::UnsupportedShape {
                converter: self.name(),
                type_name: value.type_name(),
            }),
        }
    }
}

/// Linear scale and offset, the workhorse for power, voltage, current and
/// energy readings.
struct Scale;

impl Converter for Scale {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn to_domain(&self, value: &DpValue, params: &ConverterParams) -> DpValue {
        match numeric(value) {
            Some(v) => {
                let scaled = v * params.scale.unwrap_or(1.0) / params.divisor.unwrap_or(1.0)
                    + params.offset.unwrap_or(0.0);
                DpValue::Number(clamp_opt(scaled, params.min, params.max))
            }
            None => value.clone(),
        }
    }

    fn to_wire(&self, value: &DpValue, params: &ConverterParams) -> Result<DpValue, ConverterError> {
        let v = numeric(value).ok_or(ConverterError::UnsupportedShape {
            converter: self.name(),
            type_name: value.type_name(),
        })?;
        let clamped = clamp_opt(v, params.min, params.max);
        let wire = (clamped - params.offset.unwrap_or(0.0)) * params.divisor.unwrap_or(1.0)
            / params.scale.unwrap_or(1.0);
        Ok(DpValue::Number(wire.round()))
    }
}

/// Percentage clamped to its declared range.
struct Percent;

impl Converter for Percent {
    fn name(&self) -> &'static str {
        "percent"
    }

    fn to_domain(&self, value: &DpValue, params: &ConverterParams) -> DpValue {
        match numeric(value) {
            Some(v) => {
                let scaled = v / params.divisor.unwrap_or(1.0);
                DpValue::Number(scaled.clamp(params.min.unwrap_or(0.0), params.max.unwrap_or(100.0)))
            }
            None => value.clone(),
        }
    }

    fn to_wire(&self, value: &DpValue, params: &ConverterParams) -> Result<DpValue, ConverterError> {
        let v = numeric(value).ok_or(ConverterError::UnsupportedShape {
            converter: self.name(),
            type_name: value.type_name(),
        })?;
        let clamped = v.clamp(params.min.unwrap_or(0.0), params.max.unwrap_or(100.0));
        Ok(DpValue::Number((clamped * params.divisor.unwrap_or(1.0)).round()))
    }
}

/// Integer code to label table, bidirectional.
struct EnumTable;

impl EnumTable {
    fn label_index(labels: &[String], value: &DpValue) -> Option<usize> {
        match value {
            DpValue::Str(label) => labels.iter().position(|candidate| candidate == label),
            DpValue::Number(code) if code.fract() == 0.0 && *code >= 0.0 => {
                let index = *code as usize;
                (index < labels.len()).then_some(index)
            }
            _ => None,
        }
    }
}

impl Converter for EnumTable {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn to_domain(&self, value: &DpValue, params: &ConverterParams) -> DpValue {
        let labels = params.labels.as_deref().unwrap_or(&[]);
        match value {
            DpValue::Number(code) if code.fract() == 0.0 && *code >= 0.0 => {
                match labels.get(*code as usize) {
                    Some(label) => DpValue::Str(label.clone()),
                    None => DpValue::Str(UNKNOWN_LABEL.to_string()),
                }
            }
            DpValue::Number(_) => DpValue::Str(UNKNOWN_LABEL.to_string()),
            _ => value.clone(),
        }
    }

    fn to_wire(&self, value: &DpValue, params: &ConverterParams) -> Result<DpValue, ConverterError> {
        let labels = params.labels.as_deref().unwrap_or(&[]);
        match Self::label_index(labels, value) {
            Some(index) => Ok(DpValue::Number(index as f64)),
            None => Err(ConverterError::UnknownLabel {
                label: match value {
                    DpValue::Str(label) => label.clone(),
                    other => other.to_string(),
                },
            }),
        }
    }

    fn validate(&self, value: &DpValue, params: &ConverterParams) -> Result<(), ConverterError> {
        self.to_wire(value, params).map(drop)
    }
}

/// Cover position: 0-100 on the wire, 0-1 toward the platform, with an
/// inversion flag for lift direction.
struct CoverPosition;

impl Converter for CoverPosition {
    fn name(&self) -> &'static str {
        "cover_position"
    }

    fn to_domain(&self, value: &DpValue, params: &ConverterParams) -> DpValue {
        match numeric(value) {
            Some(v) => {
                let position = v.clamp(0.0, 100.0) / 100.0;
                if params.invert.unwrap_or(false) {
                    DpValue::Number(1.0 - position)
                } else {
                    DpValue::Number(position)
                }
            }
            None => value.clone(),
        }
    }

    fn to_wire(&self, value: &DpValue, params: &ConverterParams) -> Result<DpValue, ConverterError> {
        let v = numeric(value).ok_or(ConverterError::UnsupportedShape {
            converter: self.name(),
            type_name: value.type_name(),
        })?;
        let position = v.clamp(0.0, 1.0);
        let position = if params.invert.unwrap_or(false) {
            1.0 - position
        } else {
            position
        };
        Ok(DpValue::Number((position * 100.0).round()))
    }
}

/// Temperature with magnitude-based scale detection.
struct Temperature;

impl Converter for Temperature {
    fn name(&self) -> &'static str {
        "temperature"
    }

    fn to_domain(&self, value: &DpValue, params: &ConverterParams) -> DpValue {
        match numeric(value) {
            Some(v) => DpValue::Number(sensor::temperature(
                v,
                params.divisor.unwrap_or(sensor::DEFAULT_DIVISOR),
                params.offset.unwrap_or(0.0),
            )),
            None => value.clone(),
        }
    }

    fn to_wire(&self, value: &DpValue, params: &ConverterParams) -> Result<DpValue, ConverterError> {
        let v = numeric(value).ok_or(ConverterError::UnsupportedShape {
            converter: self.name(),
            type_name: value.type_name(),
        })?;
        Ok(DpValue::Number(sensor::temperature_to_wire(
            v,
            params.divisor.unwrap_or(sensor::DEFAULT_DIVISOR),
            params.offset.unwrap_or(0.0),
        )))
    }
}

/// Relative humidity with divisor retry.
struct Humidity;

impl Converter for Humidity {
    fn name(&self) -> &'static str {
        "humidity"
    }

    fn to_domain(&self, value: &DpValue, params: &ConverterParams) -> DpValue {
        match numeric(value) {
            Some(v) => DpValue::Number(sensor::humidity(
                v,
                params.divisor.unwrap_or(sensor::DEFAULT_DIVISOR),
                params.min.unwrap_or(0.0),
                params.max.unwrap_or(100.0),
            )),
            None => value.clone(),
        }
    }

    fn to_wire(&self, value: &DpValue, params: &ConverterParams) -> Result<DpValue, ConverterError> {
        let v = numeric(value).ok_or(ConverterError::UnsupportedShape {
            converter: self.name(),
            type_name: value.type_name(),
        })?;
        Ok(DpValue::Number(sensor::humidity_to_wire(
            v,
            params.divisor.unwrap_or(sensor::DEFAULT_DIVISOR),
            params.min.unwrap_or(0.0),
            params.max.unwrap_or(100.0),
        )))
    }
}

/// Battery percentage with magnitude-based branch detection.
struct Battery;

impl Converter for Battery {
    fn name(&self) -> &'static str {
        "battery"
    }

    fn to_domain(&self, value: &DpValue, params: &ConverterParams) -> DpValue {
        match numeric(value) {
            Some(v) => DpValue::Number(sensor::battery(
                v,
                params
                    .fallback_divisor
                    .unwrap_or(sensor::DEFAULT_FALLBACK_DIVISOR),
            )),
            None => value.clone(),
        }
    }

    fn to_wire(&self, value: &DpValue, _params: &ConverterParams) -> Result<DpValue, ConverterError> {
        let v = numeric(value).ok_or(ConverterError::UnsupportedShape {
            converter: self.name(),
            type_name: value.type_name(),
        })?;
        Ok(DpValue::Number(sensor::battery_to_wire(v)))
    }
}

/// Illuminance with logarithmic wire encoding.
struct Illuminance;

impl Converter for Illuminance {
    fn name(&self) -> &'static str {
        "illuminance"
    }

    fn to_domain(&self, value: &DpValue, _params: &ConverterParams) -> DpValue {
        match numeric(value) {
            Some(v) => DpValue::Number(sensor::illuminance(v)),
            None => value.clone(),
        }
    }

    fn to_wire(&self, value: &DpValue, _params: &ConverterParams) -> Result<DpValue, ConverterError> {
        let v = numeric(value).ok_or(ConverterError::UnsupportedShape {
            converter: self.name(),
            type_name: value.type_name(),
        })?;
        Ok(DpValue::Number(sensor::illuminance_to_wire(v)))
    }
}

/// Result of a registry lookup.
#[derive(Clone)]
pub struct ResolvedConverter {
    pub converter: Arc<dyn Converter>,
    /// True when the requested name was unknown and identity substituted.
    pub fallback: bool,
}

/// Name to converter table, built once at startup.
///
/// Lookup never fails: unknown names resolve to identity with a diagnostic,
/// so a profile referencing a converter this build does not carry still
/// delivers raw values instead of nothing.
pub struct ConverterRegistry {
    converters: HashMap<&'static str, Arc<dyn Converter>>,
    identity: Arc<dyn Converter>,
}

impl ConverterRegistry {
    /// Registry with only the identity fallback.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            identity: Arc::new(Identity),
        }
    }

    /// Registry with every built-in converter.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Identity));
        registry.register(Arc::new(Boolean));
        registry.register(Arc::new(Scale));
        registry.register(Arc::new(Percent));
        registry.register(Arc::new(EnumTable));
        registry.register(Arc::new(CoverPosition));
        registry.register(Arc::new(Temperature));
        registry.register(Arc::new(Humidity));
        registry.register(Arc::new(Battery));
        registry.register(Arc::new(Illuminance));
        registry
    }

    /// Register a converter under its own name, replacing any previous one.
    pub fn register(&mut self, converter: Arc<dyn Converter>) {
        self.converters.insert(converter.name(), converter);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Converter>> {
        self.converters.get(name).cloned()
    }

    /// Resolve a name, substituting identity for unknown ones.
    pub fn resolve(&self, name: &str) -> ResolvedConverter {
        match self.converters.get(name) {
            Some(converter) => ResolvedConverter {
                converter: Arc::clone(converter),
                fallback: false,
            },
            None => {
                warn!(name, "unknown converter name, falling back to identity");
                ResolvedConverter {
                    converter: Arc::clone(&self.identity),
                    fallback: true,
                }
            }
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.converters.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
