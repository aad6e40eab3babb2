//! # MOT - Multimedia Object Transfer
//!
//! Encoder/decoder for the MOT header and directory structures carried
//! over the DAB Main Service Channel (MSC), and a carousel reassembler
//! that turns a stream of segment datagroups back into whole objects.
//!
//! # Standard
//!
//! | Standard      | Title      | Link       |
//! | ------------- | ------------- | ------------- |
//! | ETSI TS 101 756 | Multimedia Object Transfer (MOT) protocol | <https://www.etsi.org/deliver/etsi_ts/101700_101799/101756/> |
//!
//! The segmentation/datagroup transport that carries MOT segments over
//! the MSC (ETSI EN 300 401) is an external collaborator: this crate
//! defines the [`object::Datagroup`] trait as the seam a transport layer
//! plugs into, but does not implement that layer itself.

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(test, deny(warnings))]

mod mot;
mod tools;

/// MOT header/directory wire codec: bit buffer primitives, the PLI
/// parameter framing, header and directory parameter variants, the time
/// codecs, the content type registry, and the segment/header/directory
/// grammar.
pub mod codec {
    pub use crate::mot::bits::{BitReader, BitWriter};
    pub use crate::mot::content_type::ContentType;
    pub use crate::mot::directory_param::{DirectoryParamKind, DirectoryParameter};
    pub use crate::mot::grammar::{DirectoryEntry, DirectoryHeader, HeaderCore, SegmentPreamble};
    pub use crate::mot::header_param::{CharSet, CompressionType, HeaderParamKind, HeaderParameter};
    pub use crate::mot::param::{decode_param, decode_preamble, encode_param, MAX_PARAMETER_LENGTH};
    pub use crate::mot::time::{
        decode_absolute_time, decode_relative_time, encode_absolute_time, encode_relative_time,
        Granularity,
    };
}

/// The object model: `MotObject`, the injected `Datagroup` supplier
/// trait, and the carousel reassembler that turns datagroups into
/// objects.
pub mod object {
    pub use crate::mot::datagroup::{Datagroup, DatagroupType, OwnedDatagroup};
    pub use crate::mot::object::MotObject;
    pub use crate::mot::reassembler::MotReassembler;
}

/// Encode-side helper for directory-mode carousels: a managed,
/// transport_id-deduplicated set of objects. Wire emission stays out of
/// scope; this fixes the interface a future directory encoder would
/// plug objects into.
pub mod encoder {
    pub use crate::mot::directory_encoder::DirectoryEncoder;
}

pub use crate::tools::error;

#[cfg(test)]
mod tests {
    pub fn init() {
        std::env::set_var("RUST_LOG", "debug");
        env_logger::builder().is_test(true).try_init().ok();
    }
}
