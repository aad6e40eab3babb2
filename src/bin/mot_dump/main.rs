//! `mot-dump` - dump a captured MOT segment in human-readable form.
//!
//! Not part of the core codec/reassembler library; a standalone
//! diagnostic tool for inspecting captured segment bytes offline.

use clap::{Parser, ValueEnum};
use mot::codec::{DirectoryHeader, HeaderCore};

/// Segment kind to interpret the captured file as.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum SegmentMode {
    /// Header Core + parameters (type-3 segment body).
    H,
    /// Directory Header + entries (type-6 segment body).
    D,
    /// Raw body bytes (type-4 segment body); only its length is shown.
    B,
}

/// Dump a captured MOT segment body as a Header Core, a Directory Header,
/// or a body, depending on the requested mode.
#[derive(Parser, Debug)]
#[command(name = "mot-dump", version, about)]
struct Args {
    /// Which kind of segment body `file` holds.
    #[arg(value_enum)]
    mode: SegmentMode,

    /// Path to the captured segment body (preamble already stripped).
    file: std::path::PathBuf,
}

fn main() {
    env_logger::builder().try_init().ok();

    let args = Args::parse();
    let data = match std::fs::read(&args.file) {
        Ok(data) => data,
        Err(err) => {
            log::error!("failed to read {:?}: {err}", args.file);
            std::process::exit(1);
        }
    };

    let result = match args.mode {
        SegmentMode::H => dump_header(&data),
        SegmentMode::D => dump_directory(&data),
        SegmentMode::B => dump_body(&data),
    };

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn dump_header(data: &[u8]) -> mot::error::Result<()> {
    let (header, consumed) = HeaderCore::decode(data)?;
    println!("Header Core ({consumed} bytes):");
    println!("  body_size:       {}", header.body_size);
    println!(
        "  content_type:    ({}, {})",
        header.content_type.content_type(),
        header.content_type.content_subtype()
    );
    println!("  parameters:");
    for param in &header.parameters {
        println!("    {param:?}");
    }
    Ok(())
}

fn dump_directory(data: &[u8]) -> mot::error::Result<()> {
    let directory = DirectoryHeader::decode(data)?;
    println!("Directory Header:");
    println!("  compression_flag: {}", directory.compression_flag);
    println!("  carousel_period:  {:?} (tenths of a second)", directory.carousel_period);
    println!("  segment_size:     {}", directory.segment_size);
    println!("  parameters:");
    for param in &directory.parameters {
        println!("    {param:?}");
    }
    println!("  entries ({}):", directory.entries.len());
    for entry in &directory.entries {
        println!(
            "    transport_id {}: body_size={} content_type=({}, {})",
            entry.transport_id,
            entry.header.body_size,
            entry.header.content_type.content_type(),
            entry.header.content_type.content_subtype()
        );
        for param in &entry.header.parameters {
            println!("      {param:?}");
        }
    }
    Ok(())
}

fn dump_body(data: &[u8]) -> mot::error::Result<()> {
    if data.is_empty() {
        return Err(mot::error::MotError::UnsupportedDataSource(
            "empty body segment".to_string(),
        ));
    }
    println!("Body segment: {} bytes", data.len());
    Ok(())
}
