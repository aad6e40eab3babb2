//! The injected datagroup supplier seam.
//!
//! The segmentation/datagroup transport itself is out of scope for this
//! crate; `Datagroup` is the trait a transport layer implements so
//! [`crate::mot::reassembler::MotReassembler`] can consume its output
//! without depending on how it got there.

use std::fmt;

/// The kind of segment a datagroup carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DatagroupType {
    /// MOT header segment (type 3).
    Header = 3,
    /// MOT body segment (type 4).
    Body = 4,
    /// MOT directory segment (type 6).
    Directory = 6,
}

impl DatagroupType {
    /// Map a raw 3-bit MSC datagroup type field to a `DatagroupType`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            3 => Some(DatagroupType::Header),
            4 => Some(DatagroupType::Body),
            6 => Some(DatagroupType::Directory),
            _ => None,
        }
    }
}

/// One segment of a header, body, or directory, as produced by the MSC
/// transport layer. The reassembler consumes but never constructs these.
pub trait Datagroup: fmt::Debug {
    /// The MOT transport id this datagroup belongs to.
    fn transport_id(&self) -> u16;
    /// Header, body, or directory.
    fn kind(&self) -> DatagroupType;
    /// Monotonic 0-based position of this segment within its kind's run.
    fn segment_index(&self) -> u32;
    /// Whether this is the last segment of its kind's run.
    fn last(&self) -> bool;
    /// This segment's raw payload bytes.
    fn data(&self) -> &[u8];
}

/// A simple owned `Datagroup` implementation, suitable both for tests and
/// for transport layers that already have the fields in hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedDatagroup {
    transport_id: u16,
    kind: DatagroupType,
    segment_index: u32,
    last: bool,
    data: Vec<u8>,
}

impl OwnedDatagroup {
    /// Build an owned datagroup from its fields.
    pub fn new(
        transport_id: u16,
        kind: DatagroupType,
        segment_index: u32,
        last: bool,
        data: Vec<u8>,
    ) -> Self {
        Self {
            transport_id,
            kind,
            segment_index,
            last,
            data,
        }
    }
}

impl Datagroup for OwnedDatagroup {
    fn transport_id(&self) -> u16 {
        self.transport_id
    }

    fn kind(&self) -> DatagroupType {
        self.kind
    }

    fn segment_index(&self) -> u32 {
        self.segment_index
    }

    fn last(&self) -> bool {
        self.last
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}
