//! Decode observers
//!
//! The decoder itself never logs. Callers that want diagnostics pass an
//! observer, which sees every word together with its decoded record.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use super::common::{DataType, DecodedRecord, TdcFields};
use super::vftdc::decode;

/// Receives each decoded word
pub trait DecodeObserver {
    fn observe(&mut self, word: u32, record: &DecodedRecord);
}

impl<F> DecodeObserver for F
where
    F: FnMut(u32, &DecodedRecord),
{
    fn observe(&mut self, word: u32, record: &DecodedRecord) {
        self(word, record)
    }
}

/// Decode one word and notify the observer
///
/// Returns exactly what [`decode`] returns.
pub fn decode_observed<O: DecodeObserver + ?Sized>(word: u32, observer: &mut O) -> DecodedRecord {
    let record = decode(word);
    observer.observe(word, &record);
    record
}

/// Decode a slice of words in order
pub fn decode_all<O: DecodeObserver + ?Sized>(
    words: &[u32],
    observer: &mut O,
) -> Vec<DecodedRecord> {
    words
        .iter()
        .map(|&word| decode_observed(word, observer))
        .collect()
}

/// Emits one `tracing` event per word
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecodeObserver for TracingObserver {
    fn observe(&mut self, word: u32, record: &DecodedRecord) {
        match *record {
            DecodedRecord::BlockHeader { slot, board_id } => {
                debug!(word = %format!("0x{:08x}", word), slot, board_id, "Block header");
            }
            DecodedRecord::EventHeader { slot, event_number } => {
                debug!(word = %format!("0x{:08x}", word), slot, event_number, "Event header");
            }
            DecodedRecord::TriggerTime1 { trigger_time } => {
                debug!(word = %format!("0x{:08x}", word), trigger_time, "Trigger time 1");
            }
            DecodedRecord::TriggerTime2 { trigger_time } => {
                debug!(word = %format!("0x{:08x}", word), trigger_time, "Trigger time 2");
            }
            DecodedRecord::TdcData { channel, time_ns } => {
                debug!(word = %format!("0x{:08x}", word), channel, time_ns, "TDC data");
                let fields = TdcFields::from_word(word);
                trace!(
                    group = fields.group,
                    raw_channel = fields.raw_channel,
                    edge = ?fields.edge,
                    coarse = fields.coarse,
                    two_ns = fields.two_ns,
                    fine = fields.fine,
                    "TDC sub-fields"
                );
            }
            DecodedRecord::Unknown { type_tag } => {
                warn!(
                    word = %format!("0x{:08x}", word),
                    type_tag = %format!("{:05b}", type_tag),
                    "Unknown vfTDC data type"
                );
            }
        }
    }
}

/// Per-type record counts and TDC time range
#[derive(Debug, Clone, Default)]
pub struct DecodeSummary {
    counts: HashMap<DataType, u64>,
    /// Words seen
    pub total: u64,
    /// Smallest TDC time seen (ns)
    pub min_time_ns: Option<f64>,
    /// Largest TDC time seen (ns)
    pub max_time_ns: Option<f64>,
}

impl DecodeSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: &DecodedRecord) {
        self.total += 1;
        *self.counts.entry(record.data_type()).or_insert(0) += 1;

        if let DecodedRecord::TdcData { time_ns, .. } = *record {
            self.min_time_ns = Some(self.min_time_ns.map_or(time_ns, |t| t.min(time_ns)));
            self.max_time_ns = Some(self.max_time_ns.map_or(time_ns, |t| t.max(time_ns)));
        }
    }

    pub fn count(&self, data_type: DataType) -> u64 {
        self.counts.get(&data_type).copied().unwrap_or(0)
    }
}

impl DecodeObserver for DecodeSummary {
    fn observe(&mut self, _word: u32, record: &DecodedRecord) {
        self.record(record);
    }
}

impl std::fmt::Display for DecodeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Decode Summary ===")?;
        writeln!(f, "  Words:          {}", self.total)?;
        for data_type in DataType::ALL {
            writeln!(f, "  {:<15} {}", format!("{}:", data_type.label()), self.count(data_type))?;
        }
        if let (Some(min), Some(max)) = (self.min_time_ns, self.max_time_ns) {
            writeln!(f, "  TDC time range: {:.3} - {:.3} ns", min, max)?;
        }
        Ok(())
    }
}
