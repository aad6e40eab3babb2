//! Segment, Header Core, and Directory Header wire grammar.
//!
//! These are the byte layouts both the segment framer (encode) and the
//! carousel reassembler (decode) share; none of it depends on how
//! segments arrived (that's the external datagroup transport).

use crate::mot::bits::{BitReader, BitWriter};
use crate::mot::content_type::ContentType;
use crate::mot::directory_param::DirectoryParameter;
use crate::mot::header_param::HeaderParameter;
use crate::tools::error::{MotError, Result};

/// 16-bit segment preamble: 3-bit repetition count, 13-bit size in bytes,
/// packed as two whole bit-fields rather than a field that starts
/// mid-byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentPreamble {
    /// Number of times this segment has already been repeated on air.
    pub repetition_count: u8,
    /// Size of the segment body that follows, in bytes.
    pub size: u16,
}

impl SegmentPreamble {
    /// Encode the 2-byte preamble.
    pub fn encode(&self) -> [u8; 2] {
        let mut w = BitWriter::new();
        w.write_bits(self.repetition_count as u64 & 0x7, 3);
        w.write_bits(self.size as u64 & 0x1FFF, 13);
        let bytes = w.into_bytes();
        [bytes[0], bytes[1]]
    }

    /// Decode the 2-byte preamble.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(MotError::MalformedParameter(
                "segment preamble requires 2 bytes".to_string(),
            ));
        }
        let mut r = BitReader::new(&data[..2]);
        let repetition_count = r.read_bits(3)? as u8;
        let size = r.read_bits(13)? as u16;
        Ok(Self {
            repetition_count,
            size,
        })
    }
}

/// Decode a run of `HeaderParameter`s packed back-to-back, logging and
/// skipping unknown ids by consuming their raw span: a malformed frame
/// is fatal to the whole list, an unrecognized id is not.
pub fn decode_header_parameters(data: &[u8]) -> Result<Vec<HeaderParameter>> {
    let mut params = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        match HeaderParameter::decode(&data[offset..]) {
            Ok((param, consumed)) => {
                params.push(param);
                offset += consumed;
            }
            Err(MotError::UnknownHeaderParameter { id, raw }) => {
                log::warn!("skipping unknown header parameter id {id} ({} bytes)", raw.len());
                offset += raw.len();
            }
            Err(other) => return Err(other),
        }
    }
    Ok(params)
}

/// Decode a run of `DirectoryParameter`s, same unknown-id tolerance as
/// [`decode_header_parameters`].
pub fn decode_directory_parameters(data: &[u8]) -> Result<Vec<DirectoryParameter>> {
    let mut params = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        match DirectoryParameter::decode(&data[offset..]) {
            Ok((param, consumed)) => {
                params.push(param);
                offset += consumed;
            }
            Err(MotError::UnknownHeaderParameter { id, raw }) => {
                log::warn!(
                    "skipping unknown directory parameter id {id} ({} bytes)",
                    raw.len()
                );
                offset += raw.len();
            }
            Err(other) => return Err(other),
        }
    }
    Ok(params)
}

fn encode_header_parameters(params: &[HeaderParameter]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for param in params {
        out.extend_from_slice(&param.encode()?);
    }
    Ok(out)
}

fn encode_directory_parameters(params: &[DirectoryParameter]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for param in params {
        out.extend_from_slice(&param.encode()?);
    }
    Ok(out)
}

/// Header Core (56 bits / 7 bytes) plus the byte-aligned parameter list
/// that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCore {
    /// Size of the object body, in bytes.
    pub body_size: u32,
    /// The object's content (type, subtype).
    pub content_type: ContentType,
    /// The object's header parameters.
    pub parameters: Vec<HeaderParameter>,
}

impl HeaderCore {
    /// Encode the Header Core preamble plus its parameter list, returning
    /// the full byte span (`header_size` bytes).
    pub fn encode(&self) -> Result<Vec<u8>> {
        let param_bytes = encode_header_parameters(&self.parameters)?;
        let header_size = 7 + param_bytes.len();
        if header_size > 0x1FFF {
            return Err(MotError::OutOfRange(format!(
                "header size {header_size} exceeds 13-bit field width"
            )));
        }

        let mut w = BitWriter::new();
        w.write_bits(self.body_size as u64 & 0xFFF_FFFF, 28);
        w.write_bits(header_size as u64, 13);
        w.write_bits(self.content_type.content_type() as u64, 6);
        w.write_bits(self.content_type.content_subtype() as u64, 9);
        let mut out = w.into_bytes();
        out.extend_from_slice(&param_bytes);
        Ok(out)
    }

    /// Decode a Header Core and its parameter list from the start of
    /// `data`, returning it and the number of bytes consumed
    /// (`header_size`).
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < 7 {
            return Err(MotError::MalformedParameter(
                "header core requires at least 7 bytes".to_string(),
            ));
        }
        let mut r = BitReader::new(&data[..7]);
        let body_size = r.read_bits(28)? as u32;
        let header_size = r.read_bits(13)? as usize;
        let content_type = r.read_bits(6)? as u8;
        let content_subtype = r.read_bits(9)? as u16;
        let content_type = ContentType::new(content_type, content_subtype)?;

        if header_size < 7 || header_size > data.len() {
            return Err(MotError::MalformedParameter(format!(
                "header_size {header_size} inconsistent with {} available bytes",
                data.len()
            )));
        }
        let parameters = decode_header_parameters(&data[7..header_size])?;
        Ok((
            Self {
                body_size,
                content_type,
                parameters,
            },
            header_size,
        ))
    }
}

/// One object entry inside a Directory Header: transport id plus that
/// object's Header Core.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    /// The object's transport id.
    pub transport_id: u16,
    /// The object's Header Core (content type + parameters).
    pub header: HeaderCore,
}

impl DirectoryEntry {
    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = self.transport_id.to_be_bytes().to_vec();
        out.extend_from_slice(&self.header.encode()?);
        Ok(out)
    }

    fn decode(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < 2 {
            return Err(MotError::MalformedParameter(
                "directory entry requires at least 2 bytes for transport id".to_string(),
            ));
        }
        let transport_id = u16::from_be_bytes([data[0], data[1]]);
        let (header, header_len) = HeaderCore::decode(&data[2..])?;
        Ok((
            Self {
                transport_id,
                header,
            },
            2 + header_len,
        ))
    }
}

/// Directory Header (104 bits / 13 bytes) plus its directory-scope
/// extension parameters and per-object entries.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryHeader {
    /// Whether the directory (and the objects it describes) is compressed.
    /// Preserved but not interpreted by this crate.
    pub compression_flag: bool,
    /// Nominal carousel rotation period, in tenths of a second. `None`
    /// encodes as the wire value 0 ("undefined").
    pub carousel_period: Option<u32>,
    /// Size, in bytes, of each MSC segment carrying this directory.
    pub segment_size: u16,
    /// Directory-scope default parameters.
    pub parameters: Vec<DirectoryParameter>,
    /// One entry per object this directory describes.
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryHeader {
    /// Encode the full directory: preamble, extension parameters, then
    /// entries, recomputing `DirectorySize`/`NumberOfObjects`/
    /// `DirectoryExtensionLength` from the current contents.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let extension_bytes = encode_directory_parameters(&self.parameters)?;
        if extension_bytes.len() > u16::MAX as usize {
            return Err(MotError::OutOfRange(
                "directory extension length exceeds 16-bit field width".to_string(),
            ));
        }
        if self.entries.len() > u16::MAX as usize {
            return Err(MotError::OutOfRange(
                "number of directory entries exceeds 16-bit field width".to_string(),
            ));
        }

        let mut entries_bytes = Vec::new();
        for entry in &self.entries {
            entries_bytes.extend_from_slice(&entry.encode()?);
        }

        let directory_size = 13 + extension_bytes.len() + entries_bytes.len();
        if directory_size > 0x7FFF_FFFF {
            return Err(MotError::OutOfRange(
                "directory size exceeds 31-bit field width".to_string(),
            ));
        }

        let mut w = BitWriter::new();
        w.write_bits(self.compression_flag as u64, 1);
        w.write_bits(directory_size as u64, 31);
        w.write_bits(self.entries.len() as u64, 16);
        w.write_bits(self.carousel_period.unwrap_or(0) as u64 & 0xFF_FFFF, 24);
        w.write_bits(0, 3); // RFU
        w.write_bits(self.segment_size as u64 & 0x1FFF, 13);
        w.write_bits(extension_bytes.len() as u64, 16);

        let mut out = w.into_bytes();
        out.extend_from_slice(&extension_bytes);
        out.extend_from_slice(&entries_bytes);
        Ok(out)
    }

    /// Decode a full directory (header, extension, and entries) from
    /// `data`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < 13 {
            return Err(MotError::MalformedParameter(
                "directory header requires at least 13 bytes".to_string(),
            ));
        }
        let mut r = BitReader::new(&data[..13]);
        let compression_flag = r.read_bits(1)? != 0;
        let _directory_size = r.read_bits(31)?;
        let number_of_objects = r.read_bits(16)? as usize;
        let carousel_period_raw = r.read_bits(24)? as u32;
        r.read_bits(3)?; // RFU
        let segment_size = r.read_bits(13)? as u16;
        let extension_length = r.read_bits(16)? as usize;

        let carousel_period = (carousel_period_raw != 0).then_some(carousel_period_raw);

        let mut offset = 13;
        let extension_end = offset.checked_add(extension_length).ok_or_else(|| {
            MotError::MalformedParameter("directory extension length overflows".to_string())
        })?;
        if extension_end > data.len() {
            return Err(MotError::MalformedParameter(
                "directory extension length exceeds available data".to_string(),
            ));
        }
        let parameters = decode_directory_parameters(&data[offset..extension_end])?;
        offset = extension_end;

        let mut entries = Vec::with_capacity(number_of_objects);
        for _ in 0..number_of_objects {
            let (entry, consumed) = DirectoryEntry::decode(&data[offset..])?;
            entries.push(entry);
            offset += consumed;
        }

        Ok(Self {
            compression_flag,
            carousel_period,
            segment_size,
            parameters,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mot::header_param::CharSet;

    #[test]
    fn segment_preamble_round_trips() {
        let preamble = SegmentPreamble {
            repetition_count: 5,
            size: 4000,
        };
        let encoded = preamble.encode();
        assert_eq!(SegmentPreamble::decode(&encoded).unwrap(), preamble);
    }

    fn name_param(bytes: &[u8]) -> HeaderParameter {
        HeaderParameter::ContentName {
            charset: CharSet::IsoLatin1,
            name: bytes.to_vec(),
        }
    }

    #[test]
    fn header_core_round_trips_with_parameters() {
        let core = HeaderCore {
            body_size: 12345,
            content_type: ContentType::IMAGE_PNG,
            parameters: vec![name_param(b"a.png"), HeaderParameter::Priority(3)],
        };
        let encoded = core.encode().unwrap();
        let (decoded, consumed) = HeaderCore::decode(&encoded).unwrap();
        assert_eq!(decoded, core);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn directory_header_round_trips_with_entries() {
        let dir = DirectoryHeader {
            compression_flag: false,
            carousel_period: Some(100),
            segment_size: 500,
            parameters: vec![DirectoryParameter::DefaultPermitOutdatedVersions(true)],
            entries: vec![
                DirectoryEntry {
                    transport_id: 7,
                    header: HeaderCore {
                        body_size: 10,
                        content_type: ContentType::TEXT_ASCII,
                        parameters: vec![name_param(b"a.txt")],
                    },
                },
                DirectoryEntry {
                    transport_id: 8,
                    header: HeaderCore {
                        body_size: 20,
                        content_type: ContentType::IMAGE_PNG,
                        parameters: vec![name_param(b"b.png")],
                    },
                },
            ],
        };
        let encoded = dir.encode().unwrap();
        let decoded = DirectoryHeader::decode(&encoded).unwrap();
        assert_eq!(decoded, dir);
    }

    #[test]
    fn directory_header_undefined_carousel_period_round_trips() {
        let dir = DirectoryHeader {
            compression_flag: false,
            carousel_period: None,
            segment_size: 100,
            parameters: vec![],
            entries: vec![],
        };
        let encoded = dir.encode().unwrap();
        let decoded = DirectoryHeader::decode(&encoded).unwrap();
        assert_eq!(decoded.carousel_period, None);
    }
}
