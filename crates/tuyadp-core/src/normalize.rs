//! Inbound value normalization.
//!
//! Transports hand this crate data in wildly different shapes: binary
//! buffers, hex or JSON text, integer arrays, nested report objects.
//! [`Normalizer`] reduces every one of them to a single canonical
//! [`DpValue`] plus a provenance tag, using dispatch rules tuned against
//! real hardware.
//!
//! ## Dispatch order
//!
//! 1. Null, booleans and numbers pass through.
//! 2. Text: JSON when delimited, then decimal, then `0x` hex, then
//!    boolean words, else kept as text.
//! 3. Byte sequences: width plus context directed integer reads, datapoint
//!    stream delegation to the frame codec, printable text fallback.
//! 4. Arrays of small integers re-enter rule 3 as bytes.
//! 5. Arrays of datapoint objects become record lists.
//! 6. A single datapoint object becomes a one-record list.
//! 7. Attribute report objects unwrap to their measured value field.
//! 8. Anything else passes through as compact JSON text.
//!
//! The rule order and the width heuristics are compatibility fixtures:
//! deployed firmware depends on them, so changes here must be driven by
//! observed hardware, not by taste.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::frame::FrameCodec;
use crate::value::{DpRecord, DpValue};

/// Field names that mark an object as a single datapoint record.
const ID_FIELDS: [&str; 4] = ["dp", "dpId", "datapoint", "id"];

/// Field names that carry a datapoint record's value.
const VALUE_FIELDS: [&str; 2] = ["value", "data"];

/// Field names that mark an object as a standard attribute report.
const REPORT_FIELDS: [&str; 3] = ["measuredValue", "presentValue", "value"];

/// Semantic context for normalization, usually derived from the capability
/// a datapoint maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticHint {
    /// No particular expectation.
    #[default]
    General,
    /// Switch, alarm or button style flag.
    Boolean,
    /// Signed centi-degree readings.
    Temperature,
    /// Centi-percent readings.
    Humidity,
    /// Payload is expected to carry framed datapoint entries.
    DatapointStream,
}

impl SemanticHint {
    /// Derive a hint from a capability name.
    pub fn from_capability(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        const FLAGS: [&str; 11] = [
            "onoff",
            "switch",
            "alarm",
            "button",
            "contact",
            "occupancy",
            "presence",
            "leak",
            "smoke",
            "tamper",
            "lock",
        ];
        if FLAGS.iter().any(|flag| name.contains(flag)) || name.ends_with("_low") {
            Self::Boolean
        } else if name.contains("temperature") {
            Self::Temperature
        } else if name.contains("humidity") || name.contains("moisture") {
            Self::Humidity
        } else {
            Self::General
        }
    }

    fn implies_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }

    fn implies_signed(&self) -> bool {
        matches!(self, Self::Temperature | Self::Humidity)
    }
}

/// Context handed to [`Normalizer::normalize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeContext {
    pub hint: SemanticHint,
}

impl NormalizeContext {
    pub fn with_hint(hint: SemanticHint) -> Self {
        Self { hint }
    }

    pub fn for_capability(name: &str) -> Self {
        Self {
            hint: SemanticHint::from_capability(name),
        }
    }
}

/// Inbound payload shapes, one variant per dispatch rule family.
///
/// Transports construct this explicitly (or via the [`From`] impls below),
/// so the normalizer can match exhaustively instead of probing types at
/// runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<RawInput>),
    Record(Vec<(String, RawInput)>),
}

impl RawInput {
    fn field(&self, name: &str) -> Option<&RawInput> {
        match self {
            Self::Record(fields) => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// JSON rendering used by the structured passthrough rule.
    fn to_json(&self) -> serde_json::Value {
        use base64::{Engine as _, engine::general_purpose::STANDARD};
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::Number(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(v) => serde_json::Value::String(v.clone()),
            Self::Bytes(v) => serde_json::Value::String(STANDARD.encode(v)),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(RawInput::to_json).collect())
            }
            Self::Record(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for RawInput {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(v) => Self::Bool(v),
            serde_json::Value::Number(v) => Self::Number(v.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(v) => Self::Text(v),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(RawInput::from).collect())
            }
            serde_json::Value::Object(fields) => Self::Record(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, RawInput::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Vec<u8>> for RawInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for RawInput {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Shape tag describing how a value was derived, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// Null input or empty byte sequence.
    Null,
    /// Boolean or number passthrough.
    Scalar,
    /// Text parsed as decimal.
    DecimalText,
    /// Text parsed as `0x` hex.
    HexText,
    /// Text matched a boolean word.
    BooleanWord,
    /// Text kept verbatim.
    Text,
    /// Single byte read as a flag.
    BoolByte,
    /// Bytes read as a big-endian unsigned integer.
    UnsignedInt,
    /// Bytes reinterpreted as a signed integer.
    SignedInt,
    /// Bytes delegated to the frame codec.
    DatapointStream,
    /// Printable bytes decoded as text.
    ByteText,
    /// Bytes kept verbatim.
    ByteArray,
    /// Array of datapoint objects.
    RecordList,
    /// Single datapoint object.
    RecordObject,
    /// Attribute report unwrapped to its measured field.
    AttributeReport,
    /// Structured input kept as compact JSON text.
    Structured,
}

/// A canonical value plus the shape it was derived through.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedValue {
    pub value: DpValue,
    pub shape: ValueShape,
}

impl NormalizedValue {
    fn new(value: DpValue, shape: ValueShape) -> Self {
        Self { value, shape }
    }

    pub fn into_value(self) -> DpValue {
        self.value
    }
}

/// Reduces heterogeneous raw inputs to canonical values.
///
/// Total over all inputs: no combination of input and context produces an
/// error or a panic.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    codec: FrameCodec,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share the codec configuration used for datapoint stream delegation.
    pub fn with_codec(codec: FrameCodec) -> Self {
        Self { codec }
    }

    pub fn normalize(&self, raw: RawInput, ctx: &NormalizeContext) -> NormalizedValue {
        match raw {
            RawInput::Null => NormalizedValue::new(DpValue::Null, ValueShape::Null),
            RawInput::Bool(v) => NormalizedValue::new(DpValue::Bool(v), ValueShape::Scalar),
            RawInput::Number(v) => NormalizedValue::new(DpValue::Number(v), ValueShape::Scalar),
            RawInput::Text(text) => self.normalize_text(text, ctx),
            RawInput::Bytes(bytes) => self.normalize_bytes(bytes, ctx),
            RawInput::List(items) => self.normalize_list(items, ctx),
            RawInput::Record(fields) => self.normalize_record(fields, ctx),
        }
    }

    fn normalize_text(&self, text: String, ctx: &NormalizeContext) -> NormalizedValue {
        let trimmed = text.trim();

        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(trimmed) {
                trace!("normalizing JSON text payload");
                return self.normalize(RawInput::from(parsed), ctx);
            }
        }

        if let Ok(number) = trimmed.parse::<f64>() {
            if number.is_finite() {
                return NormalizedValue::new(DpValue::Number(number), ValueShape::DecimalText);
            }
        }

        if let Some(stripped) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            if let Ok(number) = u64::from_str_radix(stripped, 16) {
                return NormalizedValue::new(DpValue::Number(number as f64), ValueShape::HexText);
            }
        }

        const TRUE_WORDS: [&str; 4] = ["true", "1", "on", "yes"];
        const FALSE_WORDS: [&str; 4] = ["false", "0", "off", "no"];
        if TRUE_WORDS.iter().any(|word| trimmed.eq_ignore_ascii_case(word)) {
            return NormalizedValue::new(DpValue::Bool(true), ValueShape::BooleanWord);
        }
        if FALSE_WORDS.iter().any(|word| trimmed.eq_ignore_ascii_case(word)) {
            return NormalizedValue::new(DpValue::Bool(false), ValueShape::BooleanWord);
        }

        NormalizedValue::new(DpValue::Str(text), ValueShape::Text)
    }

    fn normalize_bytes(&self, bytes: Vec<u8>, ctx: &NormalizeContext) -> NormalizedValue {
        // A declared datapoint stream is decoded before any width heuristic.
        if ctx.hint == SemanticHint::DatapointStream && bytes.len() >= 4 {
            let frame = self.codec.decode(&bytes);
            if !frame.records.is_empty() {
                debug!(records = frame.records.len(), "normalized byte payload as datapoint stream");
                let records = frame
                    .records
                    .iter()
                    .map(|record| DpRecord {
                        dp: record.dp,
                        value: record.value(),
                    })
                    .collect();
                return NormalizedValue::new(DpValue::Records(records), ValueShape::DatapointStream);
            }
        }

        match bytes.len() {
            0 => NormalizedValue::new(DpValue::Null, ValueShape::Null),
            1 if ctx.hint.implies_boolean() => {
                NormalizedValue::new(DpValue::Bool(bytes[0] != 0), ValueShape::BoolByte)
            }
            1 => NormalizedValue::new(DpValue::Number(f64::from(bytes[0])), ValueShape::UnsignedInt),
            2 => {
                let raw = [bytes[0], bytes[1]];
                if ctx.hint.implies_signed() {
                    NormalizedValue::new(
                        DpValue::Number(f64::from(i16::from_be_bytes(raw))),
                        ValueShape::SignedInt,
                    )
                } else {
                    NormalizedValue::new(
                        DpValue::Number(f64::from(u16::from_be_bytes(raw))),
                        ValueShape::UnsignedInt,
                    )
                }
            }
            4 => {
                let unsigned = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                // Negative centi-degrees arrive as wrapped unsigned words.
                if ctx.hint == SemanticHint::Temperature && unsigned > i32::MAX as u32 {
                    NormalizedValue::new(
                        DpValue::Number(f64::from(unsigned as i32)),
                        ValueShape::SignedInt,
                    )
                } else {
                    NormalizedValue::new(DpValue::Number(f64::from(unsigned)), ValueShape::UnsignedInt)
                }
            }
            _ => {
                if bytes.iter().all(|b| is_printable(*b)) {
                    match String::from_utf8(bytes) {
                        Ok(text) => NormalizedValue::new(DpValue::Str(text), ValueShape::ByteText),
                        Err(err) => NormalizedValue::new(
                            DpValue::Bytes(err.into_bytes()),
                            ValueShape::ByteArray,
                        ),
                    }
                } else {
                    NormalizedValue::new(DpValue::Bytes(bytes), ValueShape::ByteArray)
                }
            }
        }
    }

    fn normalize_list(&self, items: Vec<RawInput>, ctx: &NormalizeContext) -> NormalizedValue {
        let small_ints: Option<Vec<u8>> = items
            .iter()
            .map(|item| match item {
                RawInput::Number(n) if n.fract() == 0.0 && (0.0..=255.0).contains(n) => {
                    Some(*n as u8)
                }
                _ => None,
            })
            .collect();
        if let Some(bytes) = small_ints {
            if !items.is_empty() {
                return self.normalize_bytes(bytes, ctx);
            }
        }

        if !items.is_empty()
            && items
                .iter()
                .all(|item| ID_FIELDS.iter().any(|field| item.field(field).is_some()))
        {
            let mut records = Vec::with_capacity(items.len());
            for item in &items {
                if let RawInput::Record(fields) = item {
                    if let Some(record) = self.record_from_fields(fields, ctx) {
                        records.push(record);
                    }
                }
            }
            if !records.is_empty() {
                return NormalizedValue::new(DpValue::Records(records), ValueShape::RecordList);
            }
        }

        let list = RawInput::List(items);
        trace!("structured list passthrough");
        NormalizedValue::new(DpValue::Str(list.to_json().to_string()), ValueShape::Structured)
    }

    fn normalize_record(
        &self,
        fields: Vec<(String, RawInput)>,
        ctx: &NormalizeContext,
    ) -> NormalizedValue {
        if let Some(record) = self.record_from_fields(&fields, ctx) {
            return NormalizedValue::new(DpValue::Records(vec![record]), ValueShape::RecordObject);
        }

        let record = RawInput::Record(fields);
        for field in REPORT_FIELDS {
            if let Some(inner) = record.field(field) {
                let normalized = self.normalize(inner.clone(), ctx);
                return NormalizedValue::new(normalized.value, ValueShape::AttributeReport);
            }
        }

        trace!("structured record passthrough");
        NormalizedValue::new(
            DpValue::Str(record.to_json().to_string()),
            ValueShape::Structured,
        )
    }

    /// Interpret an object with an id-like field as one datapoint record.
    ///
    /// Byte-sequence values are recursively normalized; scalar values pass
    /// through unparsed, the converter layer owns their meaning.
    fn record_from_fields(
        &self,
        fields: &[(String, RawInput)],
        ctx: &NormalizeContext,
    ) -> Option<DpRecord> {
        let record = RawInput::Record(fields.to_vec());
        let id = ID_FIELDS.iter().find_map(|field| record.field(field))?;
        let dp = match id {
            RawInput::Number(n) if n.fract() == 0.0 && (0.0..=255.0).contains(n) => *n as u8,
            _ => return None,
        };

        let value = VALUE_FIELDS.iter().find_map(|field| record.field(field));
        let value = match value {
            None | Some(RawInput::Null) => DpValue::Null,
            Some(RawInput::Bool(v)) => DpValue::Bool(*v),
            Some(RawInput::Number(v)) => DpValue::Number(*v),
            Some(RawInput::Text(v)) => DpValue::Str(v.clone()),
            Some(raw @ (RawInput::Bytes(_) | RawInput::List(_))) => {
                self.normalize(raw.clone(), ctx).value
            }
            Some(raw @ RawInput::Record(_)) => DpValue::Str(raw.to_json().to_string()),
        };

        Some(DpRecord { dp, value })
    }
}

fn is_printable(byte: u8) -> bool {
    byte == b'\t' || byte == b'\n' || byte == b'\r' || (0x20..=0x7E).contains(&byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(raw: RawInput) -> NormalizedValue {
        Normalizer::new().normalize(raw, &NormalizeContext::default())
    }

    fn normalize_hinted(raw: RawInput, hint: SemanticHint) -> NormalizedValue {
        Normalizer::new().normalize(raw, &NormalizeContext::with_hint(hint))
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(normalize(RawInput::Null).value, DpValue::Null);
        assert_eq!(normalize(RawInput::Bool(true)).value, DpValue::Bool(true));
        let n = normalize(RawInput::Number(42.5));
        assert_eq!(n.value, DpValue::Number(42.5));
        assert_eq!(n.shape, ValueShape::Scalar);
    }

    #[test]
    fn text_parses_decimal_then_hex_then_words() {
        assert_eq!(
            normalize(RawInput::Text("23.5".into())).value,
            DpValue::Number(23.5)
        );
        assert_eq!(
            normalize(RawInput::Text("-500".into())).value,
            DpValue::Number(-500.0)
        );

        let hex = normalize(RawInput::Text("0x1A".into()));
        assert_eq!(hex.value, DpValue::Number(26.0));
        assert_eq!(hex.shape, ValueShape::HexText);

        assert_eq!(normalize(RawInput::Text("ON".into())).value, DpValue::Bool(true));
        assert_eq!(normalize(RawInput::Text("No".into())).value, DpValue::Bool(false));
        assert_eq!(
            normalize(RawInput::Text("open".into())).value,
            DpValue::Str("open".into())
        );
    }

    #[test]
    fn delimited_text_recurses_through_json() {
        let parsed = normalize(RawInput::Text(r#"{"dp": 1, "value": true}"#.into()));
        assert_eq!(parsed.shape, ValueShape::RecordObject);
        assert_eq!(
            parsed.value,
            DpValue::Records(vec![DpRecord {
                dp: 1,
                value: DpValue::Bool(true),
            }])
        );

        // Unparseable delimited text falls through to plain text.
        let broken = normalize(RawInput::Text("{broken".into()));
        assert_eq!(broken.shape, ValueShape::Text);
    }

    #[test]
    fn byte_width_heuristics_respect_hints() {
        assert_eq!(normalize(RawInput::Bytes(vec![])).value, DpValue::Null);

        assert_eq!(
            normalize_hinted(RawInput::Bytes(vec![1]), SemanticHint::Boolean).value,
            DpValue::Bool(true)
        );
        assert_eq!(
            normalize(RawInput::Bytes(vec![0x5A])).value,
            DpValue::Number(90.0)
        );

        // Two bytes: signed only under temperature or humidity context.
        assert_eq!(
            normalize_hinted(RawInput::Bytes(vec![0xFE, 0x0C]), SemanticHint::Temperature).value,
            DpValue::Number(-500.0)
        );
        assert_eq!(
            normalize(RawInput::Bytes(vec![0xFE, 0x0C])).value,
            DpValue::Number(65036.0)
        );

        // Four bytes: wrapped negatives only under temperature context.
        let wrapped = 0xFFFF_FE0C_u32.to_be_bytes().to_vec();
        assert_eq!(
            normalize_hinted(RawInput::Bytes(wrapped.clone()), SemanticHint::Temperature).value,
            DpValue::Number(-500.0)
        );
        assert_eq!(
            normalize(RawInput::Bytes(wrapped)).value,
            DpValue::Number(4294966796.0)
        );
    }

    #[test]
    fn stream_hint_delegates_to_frame_codec() {
        let bytes = vec![0x01, 0x01, 0x00, 0x01, 0x01, 0x04, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x5A];
        let result = normalize_hinted(RawInput::Bytes(bytes), SemanticHint::DatapointStream);
        assert_eq!(result.shape, ValueShape::DatapointStream);
        assert_eq!(
            result.value,
            DpValue::Records(vec![
                DpRecord { dp: 1, value: DpValue::Bool(true) },
                DpRecord { dp: 4, value: DpValue::Number(90.0) },
            ])
        );
    }

    #[test]
    fn undecodable_stream_falls_back_to_byte_rules() {
        // Declared length overruns: no complete record, so width rules apply.
        let result = normalize_hinted(
            RawInput::Bytes(vec![0x01, 0x02, 0x00, 0xFF]),
            SemanticHint::DatapointStream,
        );
        assert_eq!(result.shape, ValueShape::UnsignedInt);
    }

    #[test]
    fn printable_bytes_decode_as_text() {
        let text = normalize(RawInput::Bytes(b"hello".to_vec()));
        assert_eq!(text.value, DpValue::Str("hello".into()));
        assert_eq!(text.shape, ValueShape::ByteText);

        let opaque = normalize(RawInput::Bytes(vec![0x00, 0x01, 0x02, 0x03, 0x80]));
        assert_eq!(opaque.shape, ValueShape::ByteArray);
    }

    #[test]
    fn small_integer_arrays_reenter_byte_rules() {
        let result = normalize(RawInput::from(json!([0, 90])));
        assert_eq!(result.value, DpValue::Number(90.0));
        assert_eq!(result.shape, ValueShape::UnsignedInt);

        // Out-of-range members disqualify the byte reinterpretation.
        let result = normalize(RawInput::from(json!([300, 1])));
        assert_eq!(result.shape, ValueShape::Structured);
    }

    #[test]
    fn datapoint_object_arrays_become_record_lists() {
        let result = normalize(RawInput::from(json!([
            { "dp": 1, "value": true },
            { "dpId": 2, "value": "open" },
        ])));
        assert_eq!(result.shape, ValueShape::RecordList);
        assert_eq!(
            result.value,
            DpValue::Records(vec![
                DpRecord { dp: 1, value: DpValue::Bool(true) },
                DpRecord { dp: 2, value: DpValue::Str("open".into()) },
            ])
        );
    }

    #[test]
    fn record_list_without_valid_ids_falls_back_to_passthrough() {
        // Every member is id-shaped, but no id fits a datapoint, so the
        // record branch yields nothing and the list passes through whole.
        let result = normalize(RawInput::from(json!([{ "dp": 999, "value": 1 }])));
        assert_eq!(result.shape, ValueShape::Structured);
        assert_eq!(
            result.value,
            DpValue::Str(r#"[{"dp":999.0,"value":1.0}]"#.into())
        );
    }

    #[test]
    fn datapoint_object_byte_values_recurse() {
        let result = normalize(RawInput::from(json!({ "dpId": 4, "data": [0, 90] })));
        assert_eq!(
            result.value,
            DpValue::Records(vec![DpRecord { dp: 4, value: DpValue::Number(90.0) }])
        );
    }

    #[test]
    fn attribute_reports_unwrap_measured_value() {
        let result = normalize(RawInput::from(json!({ "measuredValue": 2350 })));
        assert_eq!(result.value, DpValue::Number(2350.0));
        assert_eq!(result.shape, ValueShape::AttributeReport);

        let nested = normalize(RawInput::from(json!({ "presentValue": "0x10" })));
        assert_eq!(nested.value, DpValue::Number(16.0));
    }

    #[test]
    fn unrecognized_structures_pass_through_as_json() {
        let result = normalize(RawInput::from(json!({ "weird": { "nested": true } })));
        assert_eq!(result.shape, ValueShape::Structured);
        assert_eq!(
            result.value,
            DpValue::Str(r#"{"weird":{"nested":true}}"#.into())
        );
    }

    #[test]
    fn never_panics_on_adversarial_inputs() {
        let normalizer = Normalizer::new();
        let inputs = vec![
            RawInput::Text("".into()),
            RawInput::Text("0x".into()),
            RawInput::Text("[[[".into()),
            RawInput::Text("NaN".into()),
            RawInput::Bytes(vec![0xFF; 3]),
            RawInput::Bytes(vec![0xFF; 64]),
            RawInput::List(vec![]),
            RawInput::List(vec![RawInput::Null, RawInput::Bool(false)]),
            RawInput::Record(vec![]),
            RawInput::Record(vec![("dp".into(), RawInput::Text("not a number".into()))]),
            RawInput::Record(vec![("dp".into(), RawInput::Number(999.0))]),
            RawInput::from(json!({ "dp": 3 })),
        ];
        for (hint, input) in inputs.into_iter().enumerate().map(|(i, input)| {
            let hints = [
                SemanticHint::General,
                SemanticHint::Boolean,
                SemanticHint::Temperature,
                SemanticHint::Humidity,
                SemanticHint::DatapointStream,
            ];
            (hints[i % hints.len()], input)
        }) {
            let _ = normalizer.normalize(input, &NormalizeContext::with_hint(hint));
        }
    }

    #[test]
    fn record_without_value_field_yields_null_record() {
        let result = normalize(RawInput::from(json!({ "dp": 3 })));
        assert_eq!(
            result.value,
            DpValue::Records(vec![DpRecord { dp: 3, value: DpValue::Null }])
        );
    }
}
