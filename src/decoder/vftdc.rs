//! vfTDC word decoder
//!
//! Decodes 32-bit words from the JLab vfTDC (VME FPGA TDC) data stream.
//!
//! # Data Format
//!
//! Every word carries a 5-bit type tag in bits 31-27:
//!
//! | Tag     | Record         | Fields                                        |
//! |---------|----------------|-----------------------------------------------|
//! | `10000` | Block Header   | slot [26:22], board id [21:18]                |
//! | `10010` | Event Header   | slot [26:24], event number [21:0]             |
//! | `10011` | Trigger Time 1 | trigger time [23:0]                           |
//! | `00000` | Trigger Time 2 | trigger time [23:0]                           |
//! | `10111` | TDC Data       | group, channel, edge, coarse, 2 ns, fine time |
//!
//! Any other tag decodes to [`DecodedRecord::Unknown`]. Decoding is stateless:
//! no ordering between words is checked here.

use super::common::{DecodeError, DecodedRecord, Edge, TdcFields};

pub(crate) mod constants {
    pub const TYPE_SHIFT: u32 = 27;
    pub const TYPE_MASK: u32 = 0x1F;

    pub mod tag {
        pub const BLOCK_HEADER: u8 = 0x10;
        pub const EVENT_HEADER: u8 = 0x12;
        pub const TRIGGER_TIME_1: u8 = 0x13;
        pub const TRIGGER_TIME_2: u8 = 0x00;
        pub const TDC_DATA: u8 = 0x17;
    }

    pub mod block_header {
        pub const SLOT_SHIFT: u32 = 22;
        pub const SLOT_MASK: u32 = 0x1F;
        pub const BOARD_ID_SHIFT: u32 = 18;
        pub const BOARD_ID_MASK: u32 = 0xF;
    }

    pub mod event_header {
        pub const SLOT_SHIFT: u32 = 24;
        pub const SLOT_MASK: u32 = 0x7;
        pub const EVENT_NUMBER_MASK: u32 = 0x3F_FFFF;
    }

    pub mod trigger_time {
        pub const TIME_MASK: u32 = 0xFF_FFFF;
    }

    pub mod tdc_data {
        pub const GROUP_SHIFT: u32 = 24;
        pub const GROUP_MASK: u32 = 0x7;
        pub const CHANNEL_SHIFT: u32 = 19;
        pub const CHANNEL_MASK: u32 = 0x1F;
        pub const EDGE_SHIFT: u32 = 18;
        pub const COARSE_SHIFT: u32 = 8;
        pub const COARSE_MASK: u32 = 0x3FF;
        pub const TWO_NS_SHIFT: u32 = 7;
        pub const FINE_MASK: u32 = 0x7F;

        pub const CHANNELS_PER_GROUP: u8 = 32;

        // Time weights
        pub const COARSE_WEIGHT: f64 = 4000.0;
        pub const TWO_NS_WEIGHT: f64 = 2000.0;
        pub const FINE_WEIGHT: f64 = 2000.0;
        /// Fine-time calibration (hardware value, do not round)
        pub const FINE_CALIBRATION: f64 = 105.59;
    }
}

/// Extract the 5-bit type tag
#[inline]
pub fn type_tag(word: u32) -> u8 {
    ((word >> constants::TYPE_SHIFT) & constants::TYPE_MASK) as u8
}

/// Decode a single 32-bit word
pub fn decode(word: u32) -> DecodedRecord {
    use constants::*;

    match type_tag(word) {
        tag::BLOCK_HEADER => DecodedRecord::BlockHeader {
            slot: ((word >> block_header::SLOT_SHIFT) & block_header::SLOT_MASK) as u8,
            board_id: ((word >> block_header::BOARD_ID_SHIFT) & block_header::BOARD_ID_MASK)
                as u8,
        },
        tag::EVENT_HEADER => DecodedRecord::EventHeader {
            slot: ((word >> event_header::SLOT_SHIFT) & event_header::SLOT_MASK) as u8,
            event_number: word & event_header::EVENT_NUMBER_MASK,
        },
        tag::TRIGGER_TIME_1 => DecodedRecord::TriggerTime1 {
            trigger_time: word & trigger_time::TIME_MASK,
        },
        tag::TRIGGER_TIME_2 => DecodedRecord::TriggerTime2 {
            trigger_time: word & trigger_time::TIME_MASK,
        },
        tag::TDC_DATA => {
            let fields = TdcFields::from_word(word);
            DecodedRecord::TdcData {
                channel: fields.channel(),
                time_ns: fields.time_ns(),
            }
        }
        other => DecodedRecord::Unknown { type_tag: other },
    }
}

/// Decode a value that is not yet known to fit in 32 bits
pub fn try_decode(value: u64) -> Result<DecodedRecord, DecodeError> {
    let word = u32::try_from(value).map_err(|_| DecodeError::InvalidArgument { value })?;
    Ok(decode(word))
}

impl TdcFields {
    /// Split a word into TDC data sub-fields
    ///
    /// The type tag is not checked; callers pass TDC data words.
    pub fn from_word(word: u32) -> Self {
        use constants::tdc_data::*;

        Self {
            group: ((word >> GROUP_SHIFT) & GROUP_MASK) as u8,
            raw_channel: ((word >> CHANNEL_SHIFT) & CHANNEL_MASK) as u8,
            edge: Edge::from_bit(word >> EDGE_SHIFT),
            coarse: ((word >> COARSE_SHIFT) & COARSE_MASK) as u16,
            two_ns: ((word >> TWO_NS_SHIFT) & 0x1) as u8,
            fine: (word & FINE_MASK) as u8,
        }
    }

    /// Global channel number (0-255)
    pub fn channel(&self) -> u8 {
        self.group * constants::tdc_data::CHANNELS_PER_GROUP + self.raw_channel
    }

    /// Hit time, negative for trailing edges
    pub fn time_ns(&self) -> f64 {
        use constants::tdc_data::*;

        let magnitude = COARSE_WEIGHT * self.coarse as f64
            + TWO_NS_WEIGHT * self.two_ns as f64
            + FINE_WEIGHT * self.fine as f64 / FINE_CALIBRATION;
        self.edge.sign() * magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tdc_word(group: u32, channel: u32, edge: u32, coarse: u32, two_ns: u32, fine: u32) -> u32 {
        (0x17u32 << 27)
            | (group << 24)
            | (channel << 19)
            | (edge << 18)
            | (coarse << 8)
            | (two_ns << 7)
            | fine
    }

    #[test]
    fn test_type_tag() {
        assert_eq!(type_tag(0x94c531b5), 0x12);
        assert_eq!(type_tag(0x98855c20), 0x13);
        assert_eq!(type_tag(0x00028001), 0x00);
        assert_eq!(type_tag(0xbc8c2060), 0x17);
        assert_eq!(type_tag(0x80000000), 0x10);
        assert_eq!(type_tag(0xFFFFFFFF), 0x1F);
    }

    #[test]
    fn test_decode_block_header() {
        // slot=19, board_id=5
        let word: u32 = (0x10 << 27) | (19 << 22) | (5 << 18);
        assert_eq!(
            decode(word),
            DecodedRecord::BlockHeader {
                slot: 19,
                board_id: 5
            }
        );
    }

    #[test]
    fn test_decode_block_header_synthetic_zero() {
        assert_eq!(
            decode(0x80000000),
            DecodedRecord::BlockHeader {
                slot: 0,
                board_id: 0
            }
        );
    }

    #[test]
    fn test_decode_event_header() {
        assert_eq!(
            decode(0x94c531b5),
            DecodedRecord::EventHeader {
                slot: 4,
                event_number: 340405
            }
        );
    }

    #[test]
    fn test_decode_trigger_times() {
        assert_eq!(
            decode(0x98855c20),
            DecodedRecord::TriggerTime1 {
                trigger_time: 8739872
            }
        );
        assert_eq!(
            decode(0x00028001),
            DecodedRecord::TriggerTime2 {
                trigger_time: 163841
            }
        );
    }

    #[test]
    fn test_tdc_fields() {
        let fields = TdcFields::from_word(0xbc8c2060);
        assert_eq!(fields.group, 4);
        assert_eq!(fields.raw_channel, 17);
        assert_eq!(fields.edge, Edge::Trailing);
        assert_eq!(fields.coarse, 32);
        assert_eq!(fields.two_ns, 0);
        assert_eq!(fields.fine, 96);
        assert_eq!(fields.channel(), 145);
    }

    #[test]
    fn test_tdc_time_leading_edge() {
        let word = tdc_word(0, 3, 0, 10, 1, 0);
        match decode(word) {
            DecodedRecord::TdcData { channel, time_ns } => {
                assert_eq!(channel, 3);
                assert_eq!(time_ns, 42000.0);
            }
            other => panic!("expected TDC data, got {:?}", other),
        }
    }

    #[test]
    fn test_tdc_time_trailing_edge_is_negative() {
        let leading = decode(tdc_word(2, 1, 0, 7, 0, 50));
        let trailing = decode(tdc_word(2, 1, 1, 7, 0, 50));
        match (leading, trailing) {
            (
                DecodedRecord::TdcData { time_ns: t1, .. },
                DecodedRecord::TdcData { time_ns: t2, .. },
            ) => {
                assert!(t1 > 0.0);
                assert_eq!(t2, -t1);
            }
            other => panic!("expected TDC data pair, got {:?}", other),
        }
    }

    #[test]
    fn test_tdc_fine_time_calibration() {
        let fields = TdcFields::from_word(tdc_word(0, 0, 0, 0, 0, 0x7F));
        let expected = 2000.0 * 127.0 / 105.59;
        assert!((fields.time_ns() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_tdc_max_channel() {
        let fields = TdcFields::from_word(tdc_word(7, 31, 0, 0, 0, 0));
        assert_eq!(fields.channel(), 255);
    }

    #[test]
    fn test_unknown_tags() {
        for tag in 0u32..32 {
            let word = tag << 27;
            let record = decode(word);
            match tag as u8 {
                constants::tag::BLOCK_HEADER
                | constants::tag::EVENT_HEADER
                | constants::tag::TRIGGER_TIME_1
                | constants::tag::TRIGGER_TIME_2
                | constants::tag::TDC_DATA => {
                    assert!(!matches!(record, DecodedRecord::Unknown { .. }));
                }
                other => assert_eq!(record, DecodedRecord::Unknown { type_tag: other }),
            }
            assert_eq!(record.type_tag(), tag as u8);
        }
    }

    #[test]
    fn test_try_decode_rejects_wide_values() {
        assert_eq!(
            try_decode(0x1_0000_0000),
            Err(DecodeError::InvalidArgument {
                value: 0x1_0000_0000
            })
        );
        assert_eq!(try_decode(0x94c531b5), Ok(decode(0x94c531b5)));
        assert_eq!(try_decode(u32::MAX as u64), Ok(decode(u32::MAX)));
    }

    #[test]
    fn test_constants_masks() {
        assert_eq!(constants::TYPE_SHIFT, 27);
        assert_eq!(constants::TYPE_MASK, 0x1F);
        assert_eq!(constants::tdc_data::FINE_CALIBRATION, 105.59);
    }
}
