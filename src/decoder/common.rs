//! Common types for decoder module

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoder errors
///
/// Unknown type tags are not errors; they decode to [`DecodedRecord::Unknown`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Value does not fit in a 32-bit word
    #[error("Invalid argument: 0x{value:x} does not fit in 32 bits")]
    InvalidArgument { value: u64 },

    /// Text could not be parsed as a hexadecimal word
    #[error("Invalid word: {text:?} is not a hexadecimal value")]
    InvalidWord { text: String },

    /// Byte buffer length is not a whole number of words
    #[error("Misaligned data: {len} bytes is not a multiple of 4")]
    Misaligned { len: usize },
}

/// Data type classification from the 5-bit type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    BlockHeader,
    EventHeader,
    TriggerTime1,
    TriggerTime2,
    TdcData,
    /// Tag value with no known record layout
    Unknown,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::BlockHeader,
        DataType::EventHeader,
        DataType::TriggerTime1,
        DataType::TriggerTime2,
        DataType::TdcData,
        DataType::Unknown,
    ];

    /// Human-readable name used in dumps
    pub fn label(&self) -> &'static str {
        match self {
            DataType::BlockHeader => "Block Header",
            DataType::EventHeader => "Event Header",
            DataType::TriggerTime1 => "Trigger Time 1",
            DataType::TriggerTime2 => "Trigger Time 2",
            DataType::TdcData => "TDC Data",
            DataType::Unknown => "Unknown",
        }
    }
}

/// Edge polarity of a TDC hit
///
/// Hardware convention: bit 0 = leading edge (+1), bit 1 = trailing edge (-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Leading,
    Trailing,
}

impl Edge {
    pub fn from_bit(bit: u32) -> Self {
        if bit & 0x1 == 0 {
            Edge::Leading
        } else {
            Edge::Trailing
        }
    }

    /// Sign applied to the hit time
    pub fn sign(&self) -> f64 {
        match self {
            Edge::Leading => 1.0,
            Edge::Trailing => -1.0,
        }
    }
}

/// Raw sub-fields of a TDC data word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TdcFields {
    /// Channel group (0-7)
    pub group: u8,
    /// Channel within group (0-31)
    pub raw_channel: u8,
    pub edge: Edge,
    /// Coarse time (10 bits, 4 ns clock)
    pub coarse: u16,
    /// Two-ns bit
    pub two_ns: u8,
    /// Fine time (7 bits, calibrated interpolation)
    pub fine: u8,
}

/// Decoded vfTDC word
///
/// Serialized with an internal `"type"` tag, e.g.
/// `{"type":"EventHeader","slot":4,"event_number":340405}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DecodedRecord {
    BlockHeader { slot: u8, board_id: u8 },
    EventHeader { slot: u8, event_number: u32 },
    TriggerTime1 { trigger_time: u32 },
    TriggerTime2 { trigger_time: u32 },
    TdcData { channel: u8, time_ns: f64 },
    Unknown { type_tag: u8 },
}

impl DecodedRecord {
    pub fn data_type(&self) -> DataType {
        match self {
            DecodedRecord::BlockHeader { .. } => DataType::BlockHeader,
            DecodedRecord::EventHeader { .. } => DataType::EventHeader,
            DecodedRecord::TriggerTime1 { .. } => DataType::TriggerTime1,
            DecodedRecord::TriggerTime2 { .. } => DataType::TriggerTime2,
            DecodedRecord::TdcData { .. } => DataType::TdcData,
            DecodedRecord::Unknown { .. } => DataType::Unknown,
        }
    }

    /// 5-bit type tag this record was decoded from
    pub fn type_tag(&self) -> u8 {
        use super::vftdc::constants::tag;

        match self {
            DecodedRecord::BlockHeader { .. } => tag::BLOCK_HEADER,
            DecodedRecord::EventHeader { .. } => tag::EVENT_HEADER,
            DecodedRecord::TriggerTime1 { .. } => tag::TRIGGER_TIME_1,
            DecodedRecord::TriggerTime2 { .. } => tag::TRIGGER_TIME_2,
            DecodedRecord::TdcData { .. } => tag::TDC_DATA,
            DecodedRecord::Unknown { type_tag } => *type_tag,
        }
    }

    /// Format record for display
    pub fn display(&self) -> String {
        let fields = match self {
            DecodedRecord::BlockHeader { slot, board_id } => {
                format!("Slot: {} Board ID: {}", slot, board_id)
            }
            DecodedRecord::EventHeader { slot, event_number } => {
                format!("Slot: {} Event Number: {}", slot, event_number)
            }
            DecodedRecord::TriggerTime1 { trigger_time }
            | DecodedRecord::TriggerTime2 { trigger_time } => {
                format!("Trigger Time: {}", trigger_time)
            }
            DecodedRecord::TdcData { channel, time_ns } => {
                format!("Channel: {:3} Time: {:.3} ns", channel, time_ns)
            }
            DecodedRecord::Unknown { type_tag } => format!("Tag: 0x{:02x}", type_tag),
        };
        format!(
            "{:05b} ... {:<14} {}",
            self.type_tag(),
            self.data_type().label(),
            fields
        )
    }
}

impl std::fmt::Display for DecodedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
