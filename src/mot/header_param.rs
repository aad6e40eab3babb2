//! Header parameter variants (ETSI TS 101 756 clause 6.1/6.2).
//!
//! Each variant owns a fixed parameter id and its own payload codec. They
//! share the PLI/ParamId framing of [`crate::mot::param`] but not the
//! payload layout, which is per-variant.

use chrono::{DateTime, Utc};

use crate::mot::param;
use crate::mot::time;
use crate::tools::error::{MotError, Result};

/// 4-bit character set tag carried by `ContentName` (clause 6.2, table 6).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CharSet {
    /// EBU Latin based repertoire
    EbuLatin = 0,
    /// EBU Latin based, common core repertoire
    EbuLatinCommonCore = 1,
    /// EBU Latin based, core repertoire
    EbuLatinCore = 2,
    /// ISO/IEC 8859-2 (Latin-2)
    IsoLatin2 = 3,
    /// ISO/IEC 8859-1 (Latin-1)
    IsoLatin1 = 4,
    /// ISO/IEC 10646 (UCS-2 BE)
    IsoIec10646 = 15,
}

impl CharSet {
    fn from_nibble(nibble: u8) -> Result<Self> {
        match nibble {
            0 => Ok(CharSet::EbuLatin),
            1 => Ok(CharSet::EbuLatinCommonCore),
            2 => Ok(CharSet::EbuLatinCore),
            3 => Ok(CharSet::IsoLatin2),
            4 => Ok(CharSet::IsoLatin1),
            15 => Ok(CharSet::IsoIec10646),
            other => Err(MotError::MalformedParameter(format!(
                "unknown ContentName charset {other}"
            ))),
        }
    }
}

/// Compression method carried by the `Compression` parameter.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CompressionType {
    /// GZIP (RFC 1952)
    Gzip = 1,
}

impl CompressionType {
    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            1 => Ok(CompressionType::Gzip),
            other => Err(MotError::MalformedParameter(format!(
                "unknown compression type {other}"
            ))),
        }
    }
}

/// Parameter ids used by `HeaderParameter`. `Expiration` is deliberately
/// absent here: `RelativeExpiration` and `AbsoluteExpiration` share id 4
/// and are disambiguated by payload length at decode time (§4.2/§9).
const ID_EXPIRATION: u8 = 4;
const ID_PRIORITY: u8 = 10;
const ID_CONTENT_NAME: u8 = 12;
const ID_MIME_TYPE: u8 = 16;
const ID_COMPRESSION: u8 = 17;

/// Discriminant used as a map key so each `MotObject` carries at most one
/// parameter of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HeaderParamKind {
    /// `ContentName`
    ContentName,
    /// `MimeType`
    MimeType,
    /// `RelativeExpiration`
    RelativeExpiration,
    /// `AbsoluteExpiration`
    AbsoluteExpiration,
    /// `Compression`
    Compression,
    /// `Priority`
    Priority,
}

/// A single decoded/to-be-encoded header parameter.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum HeaderParameter {
    /// Object name, tagged with the character set it's encoded in. The
    /// bytes are kept opaque; transcoding to a display string is an
    /// out-of-scope concern for this crate.
    ContentName {
        /// Character set tag.
        charset: CharSet,
        /// Name bytes, verbatim.
        name: Vec<u8>,
    },
    /// RFC 2046 MIME type string, verbatim bytes.
    MimeType(Vec<u8>),
    /// Time-to-live relative to reception.
    RelativeExpiration(chrono::Duration),
    /// Absolute expiration instant, or `None` for "NOW"/unspecified.
    AbsoluteExpiration(Option<DateTime<Utc>>),
    /// Payload compression method.
    Compression(CompressionType),
    /// Carousel scheduling priority, 0 highest .. 255 lowest.
    Priority(u8),
}

impl HeaderParameter {
    /// This variant's map key.
    pub fn kind(&self) -> HeaderParamKind {
        match self {
            HeaderParameter::ContentName { .. } => HeaderParamKind::ContentName,
            HeaderParameter::MimeType(_) => HeaderParamKind::MimeType,
            HeaderParameter::RelativeExpiration(_) => HeaderParamKind::RelativeExpiration,
            HeaderParameter::AbsoluteExpiration(_) => HeaderParamKind::AbsoluteExpiration,
            HeaderParameter::Compression(_) => HeaderParamKind::Compression,
            HeaderParameter::Priority(_) => HeaderParamKind::Priority,
        }
    }

    /// This variant's fixed 6-bit parameter id.
    pub fn id(&self) -> u8 {
        match self {
            HeaderParameter::ContentName { .. } => ID_CONTENT_NAME,
            HeaderParameter::MimeType(_) => ID_MIME_TYPE,
            HeaderParameter::RelativeExpiration(_) => ID_EXPIRATION,
            HeaderParameter::AbsoluteExpiration(_) => ID_EXPIRATION,
            HeaderParameter::Compression(_) => ID_COMPRESSION,
            HeaderParameter::Priority(_) => ID_PRIORITY,
        }
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        match self {
            HeaderParameter::ContentName { charset, name } => {
                let mut payload = Vec::with_capacity(1 + name.len());
                payload.push((*charset as u8) << 4);
                payload.extend_from_slice(name);
                Ok(payload)
            }
            HeaderParameter::MimeType(bytes) => Ok(bytes.clone()),
            HeaderParameter::RelativeExpiration(duration) => {
                Ok(vec![time::encode_relative_time(*duration)?])
            }
            HeaderParameter::AbsoluteExpiration(instant) => Ok(match instant {
                Some(dt) => time::encode_absolute_time(dt),
                None => vec![0, 0, 0, 0],
            }),
            HeaderParameter::Compression(kind) => Ok(vec![*kind as u8]),
            HeaderParameter::Priority(priority) => Ok(vec![*priority]),
        }
    }

    /// Encode the full preamble + payload span for this parameter.
    pub fn encode(&self) -> Result<Vec<u8>> {
        param::encode_param(self.id(), &self.encode_payload()?)
    }

    fn decode_known(id: u8, payload: &[u8]) -> Result<Self> {
        match id {
            ID_CONTENT_NAME => {
                let first = *payload.first().ok_or_else(|| {
                    MotError::MalformedParameter("empty ContentName payload".to_string())
                })?;
                let charset = CharSet::from_nibble(first >> 4)?;
                Ok(HeaderParameter::ContentName {
                    charset,
                    name: payload[1..].to_vec(),
                })
            }
            ID_MIME_TYPE => Ok(HeaderParameter::MimeType(payload.to_vec())),
            ID_COMPRESSION => {
                let byte = *payload.first().ok_or_else(|| {
                    MotError::MalformedParameter("empty Compression payload".to_string())
                })?;
                Ok(HeaderParameter::Compression(CompressionType::from_byte(
                    byte,
                )?))
            }
            ID_PRIORITY => {
                let byte = *payload.first().ok_or_else(|| {
                    MotError::MalformedParameter("empty Priority payload".to_string())
                })?;
                Ok(HeaderParameter::Priority(byte))
            }
            ID_EXPIRATION => match payload.len() {
                1 => Ok(HeaderParameter::RelativeExpiration(
                    time::decode_relative_time(payload[0]),
                )),
                4 | 6 => Ok(HeaderParameter::AbsoluteExpiration(
                    time::decode_absolute_time(payload)?,
                )),
                other => Err(MotError::MalformedParameter(format!(
                    "expiration payload of length {other} is neither relative (1) nor absolute (4/6)"
                ))),
            },
            other => Err(MotError::UnknownHeaderParameter {
                id: other,
                raw: Vec::new(),
            }),
        }
    }

    /// Decode one parameter (preamble + payload) from the start of `data`,
    /// returning the parameter and the number of bytes consumed.
    ///
    /// Unknown ids surface as [`MotError::UnknownHeaderParameter`] carrying
    /// the full raw span so the caller can skip over it without losing its
    /// place in the parameter list.
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        let (preamble, payload, consumed) = param::decode_param(data)?;
        match Self::decode_known(preamble.id, payload) {
            Ok(parameter) => Ok((parameter, consumed)),
            Err(MotError::UnknownHeaderParameter { id, .. }) => {
                Err(MotError::UnknownHeaderParameter {
                    id,
                    raw: data[..consumed].to_vec(),
                })
            }
            Err(other) => Err(other),
        }
    }
}
