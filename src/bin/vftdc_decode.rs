//! vftdc-decode - decode vfTDC 32-bit data words
//!
//! Usage:
//!   vftdc-decode 0x94c531b5 0x98855c20          # Decode words given in hex
//!   vftdc-decode --demo                         # Decode the sample capture
//!   vftdc-decode --file run.dat --byte-order big --summary
//!   vftdc-decode --demo --json                  # One JSON object per word
//!
//! Set RUST_LOG=vftdc_rs=debug to trace every decoded word.

use std::io::{self, BufWriter, Write};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vftdc_rs::common::DecodeArgs;
use vftdc_rs::config::Config;
use vftdc_rs::decoder::{
    decode_observed, parse_word, type_tag, words_from_bytes, DecodeObserver, DecodeSummary,
    DecodedRecord, TracingObserver, DEMO_WORDS,
};

fn main() -> anyhow::Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("vftdc_rs=info".parse()?))
        .init();

    let args = DecodeArgs::parse();
    let config = Config::load_or_default(&args.common.config_file)?;

    if !args.has_input() {
        anyhow::bail!("no input given (pass hex words, --file or --demo)");
    }

    let words = if let Some(path) = &args.file {
        let byte_order = args.byte_order.unwrap_or(config.decoder.byte_order);
        let bytes = std::fs::read(path)?;
        let words = words_from_bytes(&bytes, byte_order)?;
        info!(
            file = %path.display(),
            bytes = bytes.len(),
            words = words.len(),
            ?byte_order,
            "Read capture file"
        );
        words
    } else if args.demo {
        DEMO_WORDS.to_vec()
    } else {
        args.words
            .iter()
            .map(|text| parse_word(text))
            .collect::<Result<Vec<_>, _>>()?
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut summary = DecodeSummary::new();
    let mut tracer = TracingObserver;

    for &word in &words {
        let record = decode_observed(word, &mut tracer);
        summary.observe(word, &record);

        if args.json {
            serde_json::to_writer(&mut out, &record)?;
            writeln!(out)?;
        } else {
            print_record(&mut out, word, &record)?;
        }
    }

    if args.summary || config.decoder.summary {
        writeln!(out)?;
        write!(out, "{}", summary)?;
    }
    out.flush()?;

    Ok(())
}

/// Human-readable dump of one word
fn print_record<W: Write>(out: &mut W, word: u32, record: &DecodedRecord) -> io::Result<()> {
    writeln!(out, "Decoding vfTDC word: 0x{:08x}", word)?;
    writeln!(
        out,
        "  VF TDC data type word: {:05b} ... {}",
        type_tag(word),
        record.data_type().label()
    )?;
    match record {
        DecodedRecord::BlockHeader { slot, board_id } => {
            writeln!(out, "  Slot: {}", slot)?;
            writeln!(out, "  Board ID: {}", board_id)?;
        }
        DecodedRecord::EventHeader { slot, event_number } => {
            writeln!(out, "  Slot: {}", slot)?;
            writeln!(out, "  Event Number: {}", event_number)?;
        }
        DecodedRecord::TriggerTime1 { trigger_time } => {
            writeln!(out, "  Event Trigger Time 1: {}", trigger_time)?;
        }
        DecodedRecord::TriggerTime2 { trigger_time } => {
            writeln!(out, "  Event Trigger Time 2: {}", trigger_time)?;
        }
        DecodedRecord::TdcData { channel, time_ns } => {
            writeln!(out, "  Channel: {}", channel)?;
            writeln!(out, "  Time (ns): {:.3}", time_ns)?;
        }
        DecodedRecord::Unknown { type_tag } => {
            writeln!(out, "  Unknown tag: 0x{:02x}", type_tag)?;
        }
    }
    Ok(())
}
