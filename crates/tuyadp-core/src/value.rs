//! Canonical datapoint value model.
//!
//! Every component boundary in this crate exchanges data through
//! [`DpValue`], a small tagged union covering everything the Tuya datapoint
//! protocol can express: nothing, a flag, a number, text, raw bytes, or a
//! list of datapoint records (multi-DP payloads).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use num_enum::{IntoPrimitive, TryFromPrimitive};

// Custom serialization module for binary data as base64
pub(crate) mod base64_bytes {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Wire type code carried in byte 1 of every datapoint entry.
///
/// The code dictates how the value bytes are interpreted. Codes are fixed by
/// the vendor firmware and must not be renumbered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
pub enum WireType {
    /// Opaque bytes, passed through untouched.
    Raw = 0x00,
    /// Single byte, zero is false and anything else is true.
    Bool = 0x01,
    /// Big-endian unsigned integer, 1/2/4 bytes on the wire.
    Value = 0x02,
    /// UTF-8 text.
    String = 0x03,
    /// Small integer index into a profile-declared label table.
    Enum = 0x04,
    /// Big-endian unsigned integer treated as a bit field.
    Bitmap = 0x05,
}

impl WireType {
    /// Whether the value bytes are read as a big-endian unsigned integer.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Value | Self::Enum | Self::Bitmap)
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Bool => write!(f, "bool"),
            Self::Value => write!(f, "value"),
            Self::String => write!(f, "string"),
            Self::Enum => write!(f, "enum"),
            Self::Bitmap => write!(f, "bitmap"),
        }
    }
}

/// One datapoint id paired with an already-interpreted value.
///
/// Produced when a multi-DP payload is normalized; the wire-level shape
/// (type code and raw bytes) lives in `frame::DatapointRecord` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpRecord {
    /// Datapoint id, 0-255.
    pub dp: u8,
    /// Interpreted value.
    pub value: DpValue,
}

/// Canonical value exchanged between codec, normalizer, converters and the
/// host platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DpValue {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    /// Binary data serialized as base64 string
    #[serde(with = "base64_bytes")]
    Bytes(Vec<u8>),
    /// Multi-DP payload interpreted record by record.
    Records(Vec<DpRecord>),
}

impl DpValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Records(_) => "records",
        }
    }

    /// Plain JSON rendering for host-facing payloads.
    ///
    /// Unlike the derived (tagged) serialization, this flattens to the value
    /// itself: bytes become base64 text, records become `{dp, value}` objects.
    pub fn to_json(&self) -> serde_json::Value {
        use base64::{Engine as _, engine::general_purpose::STANDARD};
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::Number(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Str(v) => serde_json::Value::String(v.clone()),
            Self::Bytes(v) => serde_json::Value::String(STANDARD.encode(v)),
            Self::Records(records) => serde_json::Value::Array(
                records
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "dp": r.dp,
                            "value": r.value.to_json(),
                        })
                    })
                    .collect(),
            ),
        }
    }
}

impl std::fmt::Display for DpValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Number(v) => write!(f, "{}", v),
            Self::Str(v) => write!(f, "{}", v),
            Self::Bytes(v) => write!(f, "0x{}", hex::encode(v)),
            Self::Records(records) => write!(f, "[{} records]", records.len()),
        }
    }
}

impl From<bool> for DpValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for DpValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for DpValue {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<u32> for DpValue {
    fn from(v: u32) -> Self {
        Self::Number(v as f64)
    }
}

impl From<String> for DpValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for DpValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Vec<u8>> for DpValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}
