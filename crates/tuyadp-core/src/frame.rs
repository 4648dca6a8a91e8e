//! Tuya datapoint TLV frame codec.
//!
//! ## Wire format
//!
//! A frame is a sequence of datapoint entries with no separators:
//!
//! ```text
//! +--------+----------+-------------+----------------+
//! | dp: u8 | type: u8 | len: u16 BE | value: len * u8 |
//! +--------+----------+-------------+----------------+
//! ```
//!
//! Decoding is total: a frame that ends mid-entry yields every complete
//! entry plus a truncation flag, never an error. Encoding is strict and
//! reports values that cannot be represented on the wire.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::value::{DpValue, WireType, base64_bytes};

/// Tuya vendor cluster plumbing.
///
/// Datapoint frames travel inside the manufacturer-specific cluster below.
/// Data commands prefix the frame with a two-byte transaction sequence.
pub mod cluster {
    /// Manufacturer-specific cluster carrying datapoint traffic.
    pub const TUYA_PRIVATE: u16 = 0xEF00;

    /// Command ids observed on the private cluster.
    pub mod command {
        /// Host-initiated datapoint write.
        pub const SET_DATA: u8 = 0x00;
        /// Device response to a write or query.
        pub const DATA_RESPONSE: u8 = 0x01;
        /// Device-initiated report.
        pub const DATA_REPORT: u8 = 0x02;
        /// Host-initiated state query.
        pub const QUERY_DATA: u8 = 0x03;
        /// Device status report on some gateway firmwares.
        pub const ACTIVE_STATUS_REPORT: u8 = 0x06;
        /// MCU firmware version request.
        pub const MCU_VERSION_REQUEST: u8 = 0x10;
        /// MCU firmware version response.
        pub const MCU_VERSION_RESPONSE: u8 = 0x11;
        /// MCU wall-clock synchronization.
        pub const MCU_SYNC_TIME: u8 = 0x24;
    }
}

/// Codec configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameCodecConfig {
    /// Longest string payload accepted on the encode path, in bytes.
    pub max_string_len: usize,
}

impl Default for FrameCodecConfig {
    fn default() -> Self {
        Self {
            max_string_len: 2048,
        }
    }
}

/// Errors raised on the encode path.
///
/// Decoding never fails; see [`DecodedFrame::truncated`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("value {value} does not fit wire type {wire_type} on datapoint {dp}")]
    ValueOutOfRange {
        dp: u8,
        wire_type: WireType,
        value: f64,
    },

    #[error("string of {len} bytes exceeds the {max} byte limit on datapoint {dp}")]
    StringTooLong { dp: u8, len: usize, max: usize },

    #[error("payload of {len} bytes exceeds the 65535 byte frame limit on datapoint {dp}")]
    PayloadTooLong { dp: u8, len: usize },

    #[error("wire type {wire_type} cannot encode a {type_name} value on datapoint {dp}")]
    ShapeMismatch {
        dp: u8,
        wire_type: WireType,
        type_name: &'static str,
    },
}

/// One decoded wire entry: id, type code and the raw value bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatapointRecord {
    /// Datapoint id, 0-255.
    pub dp: u8,
    /// Wire type code from byte 1 of the entry.
    pub wire_type: WireType,
    /// Value bytes, exactly as carried on the wire.
    #[serde(with = "base64_bytes")]
    pub payload: Vec<u8>,
}

impl DatapointRecord {
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Interpret the payload according to the wire type.
    ///
    /// Integer kinds (`Value`, `Enum`, `Bitmap`) read as big-endian unsigned;
    /// an empty payload interprets as [`DpValue::Null`]. Interpretation never
    /// fails, malformed text decodes lossily and oversized integers fall back
    /// to the raw bytes.
    pub fn value(&self) -> DpValue {
        match self.wire_type {
            WireType::Raw => DpValue::Bytes(self.payload.clone()),
            WireType::Bool => {
                if self.payload.is_empty() {
                    DpValue::Null
                } else {
                    DpValue::Bool(self.payload.iter().any(|b| *b != 0))
                }
            }
            WireType::Value | WireType::Enum | WireType::Bitmap => {
                if self.payload.is_empty() {
                    DpValue::Null
                } else if self.payload.len() <= 8 {
                    DpValue::Number(be_uint(&self.payload) as f64)
                } else {
                    DpValue::Bytes(self.payload.clone())
                }
            }
            WireType::String => DpValue::Str(String::from_utf8_lossy(&self.payload).into_owned()),
        }
    }
}

/// Result of decoding one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedFrame {
    /// Complete entries in wire order. Ids may repeat; entries are not
    /// deduplicated here, precedence belongs to the caller.
    pub records: Vec<DatapointRecord>,
    /// Set when the frame ended mid-entry and a partial record was dropped.
    pub truncated: bool,
}

/// Big-endian unsigned accumulation over up to 8 bytes.
pub(crate) fn be_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

/// Stateless datapoint frame codec.
#[derive(Debug, Clone, Default)]
pub struct FrameCodec {
    config: FrameCodecConfig,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameCodecConfig) -> Self {
        Self { config }
    }

    /// Decode a frame into its complete entries.
    ///
    /// Reads entries until fewer than 4 header bytes remain or a declared
    /// length would overrun the buffer; the partial trailing record, if any,
    /// is dropped and [`DecodedFrame::truncated`] is set. Never fails.
    pub fn decode(&self, bytes: &[u8]) -> DecodedFrame {
        let mut records = Vec::new();
        let mut truncated = false;
        let mut offset = 0;

        while offset < bytes.len() {
            if offset + 4 > bytes.len() {
                truncated = true;
                break;
            }

            let dp = bytes[offset];
            let type_byte = bytes[offset + 1];
            let len = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;
            let start = offset + 4;

            if start + len > bytes.len() {
                truncated = true;
                break;
            }

            // Out-of-protocol type codes keep the record alive as raw bytes.
            let wire_type = match WireType::try_from(type_byte) {
                Ok(wire_type) => wire_type,
                Err(_) => {
                    warn!(dp, code = type_byte, "unknown wire type code, treating payload as raw");
                    WireType::Raw
                }
            };

            records.push(DatapointRecord {
                dp,
                wire_type,
                payload: bytes[start..start + len].to_vec(),
            });
            offset = start + len;
        }

        if truncated {
            debug!(
                parsed = records.len(),
                total = bytes.len(),
                "frame truncated mid-entry, kept complete records"
            );
        }

        DecodedFrame { records, truncated }
    }

    /// Encode one datapoint entry as a 4+N byte frame.
    pub fn encode(&self, dp: u8, wire_type: WireType, value: &DpValue) -> Result<Vec<u8>, FrameError> {
        let payload = self.encode_payload(dp, wire_type, value)?;

        if wire_type == WireType::String && payload.len() > self.config.max_string_len {
            return Err(FrameError::StringTooLong {
                dp,
                len: payload.len(),
                max: self.config.max_string_len,
            });
        }
        if payload.len() > usize::from(u16::MAX) {
            return Err(FrameError::PayloadTooLong {
                dp,
                len: payload.len(),
            });
        }

        let mut frame = Vec::with_capacity(4 + payload.len());
        frame.push(dp);
        frame.push(wire_type.into());
        frame.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Decode a data command payload: two sequence bytes, then a frame.
    pub fn decode_report(&self, payload: &[u8]) -> (u16, DecodedFrame) {
        if payload.len() < 2 {
            return (
                0,
                DecodedFrame {
                    records: Vec::new(),
                    truncated: !payload.is_empty(),
                },
            );
        }
        let seq = u16::from_be_bytes([payload[0], payload[1]]);
        (seq, self.decode(&payload[2..]))
    }

    /// Build a data command payload: the sequence, then each entry in order.
    pub fn encode_command(
        &self,
        seq: u16,
        entries: &[(u8, WireType, DpValue)],
    ) -> Result<Vec<u8>, FrameError> {
        let mut payload = seq.to_be_bytes().to_vec();
        for (dp, wire_type, value) in entries {
            payload.extend_from_slice(&self.encode(*dp, *wire_type, value)?);
        }
        Ok(payload)
    }

    fn encode_payload(
        &self,
        dp: u8,
        wire_type: WireType,
        value: &DpValue,
    ) -> Result<Vec<u8>, FrameError> {
        let mismatch = || FrameError::ShapeMismatch {
            dp,
            wire_type,
            type_name: value.type_name(),
        };

        match wire_type {
            WireType::Raw => match value {
                DpValue::Bytes(bytes) => Ok(bytes.clone()),
                DpValue::Str(text) => Ok(text.as_bytes().to_vec()),
                _ => Err(mismatch()),
            },
            WireType::Bool => match value {
                DpValue::Bool(flag) => Ok(vec![u8::from(*flag)]),
                DpValue::Number(n) => Ok(vec![u8::from(*n != 0.0)]),
                _ => Err(mismatch()),
            },
            WireType::String => match value {
                DpValue::Str(text) => Ok(text.as_bytes().to_vec()),
                _ => Err(mismatch()),
            },
            WireType::Value => {
                let n = self.encode_int(dp, wire_type, value)?;
                // Fixed 4-byte representation, two's complement for negatives.
                if n < i64::from(i32::MIN) || n > i64::from(u32::MAX) {
                    return Err(FrameError::ValueOutOfRange {
                        dp,
                        wire_type,
                        value: n as f64,
                    });
                }
                if n < 0 {
                    Ok((n as i32).to_be_bytes().to_vec())
                } else {
                    Ok((n as u32).to_be_bytes().to_vec())
                }
            }
            WireType::Enum => {
                let n = self.encode_int(dp, wire_type, value)?;
                if !(0..=255).contains(&n) {
                    return Err(FrameError::ValueOutOfRange {
                        dp,
                        wire_type,
                        value: n as f64,
                    });
                }
                Ok(vec![n as u8])
            }
            WireType::Bitmap => {
                let n = self.encode_int(dp, wire_type, value)?;
                if n < 0 || n > i64::from(u32::MAX) {
                    return Err(FrameError::ValueOutOfRange {
                        dp,
                        wire_type,
                        value: n as f64,
                    });
                }
                // Minimal width: 1, 2 or 4 bytes.
                if n <= 0xFF {
                    Ok(vec![n as u8])
                } else if n <= 0xFFFF {
                    Ok((n as u16).to_be_bytes().to_vec())
                } else {
                    Ok((n as u32).to_be_bytes().to_vec())
                }
            }
        }
    }

    fn encode_int(&self, dp: u8, wire_type: WireType, value: &DpValue) -> Result<i64, FrameError> {
        match value {
            DpValue::Number(n) if n.is_finite() => Ok(n.round() as i64),
            DpValue::Number(n) => Err(FrameError::ValueOutOfRange {
                dp,
                wire_type,
                value: *n,
            }),
            DpValue::Bool(flag) => Ok(i64::from(*flag)),
            _ => Err(FrameError::ShapeMismatch {
                dp,
                wire_type,
                type_name: value.type_name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> FrameCodec {
        FrameCodec::new()
    }

    #[test]
    fn decodes_single_bool_record() {
        let frame = codec().decode(&[0x01, 0x01, 0x00, 0x01, 0x01]);
        assert!(!frame.truncated);
        assert_eq!(frame.records.len(), 1);

        let record = &frame.records[0];
        assert_eq!(record.dp, 1);
        assert_eq!(record.wire_type, WireType::Bool);
        assert_eq!(record.len(), 1);
        assert_eq!(record.value(), DpValue::Bool(true));
    }

    #[test]
    fn decodes_concatenated_records_in_order() {
        // dp 1 bool=true, dp 4 value=90, dp 5 string "lo"
        let bytes = [
            0x01, 0x01, 0x00, 0x01, 0x01, //
            0x04, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x5A, //
            0x05, 0x03, 0x00, 0x02, b'l', b'o',
        ];
        let frame = codec().decode(&bytes);
        assert!(!frame.truncated);
        assert_eq!(frame.records.len(), 3);
        assert_eq!(frame.records[0].value(), DpValue::Bool(true));
        assert_eq!(frame.records[1].value(), DpValue::Number(90.0));
        assert_eq!(frame.records[2].value(), DpValue::Str("lo".into()));
    }

    #[test]
    fn truncation_yields_prefix_of_full_decode() {
        let bytes = [
            0x01, 0x01, 0x00, 0x01, 0x01, //
            0x04, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x5A,
        ];
        let full = codec().decode(&bytes);

        for k in 0..bytes.len() {
            let partial = codec().decode(&bytes[..k]);
            assert!(
                partial.records.len() <= full.records.len(),
                "cut at {k} produced more records than the full frame"
            );
            assert_eq!(
                partial.records[..],
                full.records[..partial.records.len()],
                "cut at {k} is not a prefix"
            );
        }

        // A cut inside the second record keeps the first and flags it.
        let partial = codec().decode(&bytes[..7]);
        assert!(partial.truncated);
        assert_eq!(partial.records.len(), 1);
    }

    #[test]
    fn declared_length_overrun_drops_partial_record() {
        let frame = codec().decode(&[0x01, 0x02, 0x00, 0x04, 0x00, 0x00]);
        assert!(frame.truncated);
        assert!(frame.records.is_empty());
    }

    #[test]
    fn unknown_wire_type_code_decodes_as_raw() {
        let frame = codec().decode(&[0x07, 0x66, 0x00, 0x02, 0xAA, 0xBB]);
        assert!(!frame.truncated);
        assert_eq!(frame.records[0].wire_type, WireType::Raw);
        assert_eq!(frame.records[0].value(), DpValue::Bytes(vec![0xAA, 0xBB]));
    }

    #[test]
    fn integer_widths_decode_big_endian() {
        let c = codec();
        let one = c.decode(&[0x02, 0x02, 0x00, 0x01, 0xFF]);
        let two = c.decode(&[0x02, 0x02, 0x00, 0x02, 0x01, 0x00]);
        let four = c.decode(&[0x02, 0x02, 0x00, 0x04, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(one.records[0].value(), DpValue::Number(255.0));
        assert_eq!(two.records[0].value(), DpValue::Number(256.0));
        assert_eq!(four.records[0].value(), DpValue::Number(4294967295.0));
    }

    #[test]
    fn empty_integer_payload_interprets_as_null() {
        let frame = codec().decode(&[0x02, 0x02, 0x00, 0x00]);
        assert!(!frame.truncated);
        assert_eq!(frame.records[0].value(), DpValue::Null);
    }

    #[test]
    fn encode_decode_round_trip_grid() {
        let c = codec();
        let cases: Vec<(u8, WireType, DpValue)> = vec![
            (1, WireType::Bool, DpValue::Bool(true)),
            (1, WireType::Bool, DpValue::Bool(false)),
            (2, WireType::Value, DpValue::Number(0.0)),
            (2, WireType::Value, DpValue::Number(1.0)),
            (2, WireType::Value, DpValue::Number(255.0)),
            (2, WireType::Value, DpValue::Number(65535.0)),
            (2, WireType::Value, DpValue::Number(4294967295.0)),
            (3, WireType::String, DpValue::Str(String::new())),
            (3, WireType::String, DpValue::Str("hello".into())),
            (3, WireType::String, DpValue::Str("x".repeat(255))),
            (4, WireType::Enum, DpValue::Number(2.0)),
            (5, WireType::Bitmap, DpValue::Number(0.0)),
            (5, WireType::Bitmap, DpValue::Number(0xFFFF as f64)),
            (6, WireType::Raw, DpValue::Bytes(vec![0xDE, 0xAD])),
        ];

        for (dp, wire_type, value) in cases {
            let bytes = c.encode(dp, wire_type, &value).unwrap();
            let frame = c.decode(&bytes);
            assert!(!frame.truncated);
            assert_eq!(frame.records.len(), 1, "{wire_type} {value:?}");
            let record = &frame.records[0];
            assert_eq!(record.dp, dp);
            assert_eq!(record.wire_type, wire_type);
            // An empty string payload reads back as an empty string.
            assert_eq!(record.value(), value, "{wire_type} round trip");
        }
    }

    #[test]
    fn value_encodes_fixed_four_bytes() {
        let bytes = codec().encode(4, WireType::Value, &DpValue::Number(90.0)).unwrap();
        assert_eq!(bytes, [0x04, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x5A]);
    }

    #[test]
    fn negative_value_encodes_twos_complement() {
        let bytes = codec()
            .encode(16, WireType::Value, &DpValue::Number(-500.0))
            .unwrap();
        assert_eq!(bytes, [0x10, 0x02, 0x00, 0x04, 0xFF, 0xFF, 0xFE, 0x0C]);
    }

    #[test]
    fn bitmap_uses_minimal_width() {
        let c = codec();
        assert_eq!(c.encode(5, WireType::Bitmap, &DpValue::Number(9.0)).unwrap()[3], 1);
        assert_eq!(
            c.encode(5, WireType::Bitmap, &DpValue::Number(300.0)).unwrap()[3],
            2
        );
        assert_eq!(
            c.encode(5, WireType::Bitmap, &DpValue::Number(70000.0)).unwrap()[3],
            4
        );
    }

    #[test]
    fn encode_rejects_out_of_range_and_mismatched_values() {
        let c = codec();
        assert!(matches!(
            c.encode(4, WireType::Enum, &DpValue::Number(300.0)),
            Err(FrameError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            c.encode(4, WireType::Value, &DpValue::Number(f64::from(u32::MAX) + 1.0)),
            Err(FrameError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            c.encode(4, WireType::Value, &DpValue::Number(f64::NAN)),
            Err(FrameError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            c.encode(4, WireType::Bool, &DpValue::Str("on".into())),
            Err(FrameError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            c.encode(4, WireType::String, &DpValue::Number(5.0)),
            Err(FrameError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn string_limit_is_configurable() {
        let c = FrameCodec::with_config(FrameCodecConfig { max_string_len: 4 });
        assert!(c.encode(3, WireType::String, &DpValue::Str("abcd".into())).is_ok());
        assert!(matches!(
            c.encode(3, WireType::String, &DpValue::Str("abcde".into())),
            Err(FrameError::StringTooLong { len: 5, max: 4, .. })
        ));
    }

    #[test]
    fn report_round_trip_keeps_sequence() {
        let c = codec();
        let payload = c
            .encode_command(0x1234, &[(1, WireType::Bool, DpValue::Bool(true))])
            .unwrap();
        assert_eq!(payload[..2], [0x12, 0x34]);

        let (seq, frame) = c.decode_report(&payload);
        assert_eq!(seq, 0x1234);
        assert!(!frame.truncated);
        assert_eq!(frame.records[0].value(), DpValue::Bool(true));
    }

    #[test]
    fn short_report_payload_is_flagged() {
        let (seq, frame) = codec().decode_report(&[0x09]);
        assert_eq!(seq, 0);
        assert!(frame.truncated);
        assert!(frame.records.is_empty());
    }
}
