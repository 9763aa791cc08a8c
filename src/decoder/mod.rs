//! Decoder module for vfTDC raw data
//!
//! Converts 32-bit vfTDC words into structured records.

pub mod common;
pub mod observer;
pub mod raw;
pub mod vftdc;

pub use common::{DataType, DecodeError, DecodedRecord, Edge, TdcFields};
pub use observer::{decode_all, decode_observed, DecodeObserver, DecodeSummary, TracingObserver};
pub use raw::{parse_word, words_from_bytes, ByteOrder, DEMO_WORDS};
pub use vftdc::{decode, try_decode, type_tag};
