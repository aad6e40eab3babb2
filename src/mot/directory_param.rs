//! Directory-scope default parameters (ETSI TS 101 756 clause 8.1.3).
//!
//! These share the PLI framing of [`crate::mot::param`] with header
//! parameters but occupy a disjoint id namespace, pinned by the original
//! source: `DefaultPermitOutdatedVersions` is id 1,
//! `SortedHeaderInformation` is id 0, and `DefaultRelativeExpiration`/
//! `DefaultAbsoluteExpiration` share id 9, disambiguated by payload
//! length exactly the way header id 4 disambiguates its pair.

use crate::mot::param;
use crate::mot::time;
use crate::tools::error::{MotError, Result};

const ID_SORTED_HEADER_INFORMATION: u8 = 0;
const ID_DEFAULT_PERMIT_OUTDATED_VERSIONS: u8 = 1;
const ID_DEFAULT_EXPIRATION: u8 = 9;

/// Discriminant for `DirectoryParameter`, same at-most-one-per-kind role
/// as [`crate::mot::header_param::HeaderParamKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DirectoryParamKind {
    /// `DefaultPermitOutdatedVersions`
    DefaultPermitOutdatedVersions,
    /// `DefaultRelativeExpiration`
    DefaultRelativeExpiration,
    /// `DefaultAbsoluteExpiration`
    DefaultAbsoluteExpiration,
    /// `SortedHeaderInformation`
    SortedHeaderInformation,
}

/// A directory-scope default parameter, applying to every object carried
/// by that directory unless overridden by the object's own header
/// parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DirectoryParameter {
    /// Whether a receiver may keep using an outdated cached version of an
    /// object while a newer one is still arriving.
    DefaultPermitOutdatedVersions(bool),
    /// Default relative expiration for objects lacking their own.
    DefaultRelativeExpiration(chrono::Duration),
    /// Default absolute expiration for objects lacking their own.
    DefaultAbsoluteExpiration(Option<chrono::DateTime<chrono::Utc>>),
    /// Marker: directory entries are sorted by transport id.
    SortedHeaderInformation,
}

impl DirectoryParameter {
    /// This variant's map key.
    pub fn kind(&self) -> DirectoryParamKind {
        match self {
            DirectoryParameter::DefaultPermitOutdatedVersions(_) => {
                DirectoryParamKind::DefaultPermitOutdatedVersions
            }
            DirectoryParameter::DefaultRelativeExpiration(_) => {
                DirectoryParamKind::DefaultRelativeExpiration
            }
            DirectoryParameter::DefaultAbsoluteExpiration(_) => {
                DirectoryParamKind::DefaultAbsoluteExpiration
            }
            DirectoryParameter::SortedHeaderInformation => {
                DirectoryParamKind::SortedHeaderInformation
            }
        }
    }

    fn id(&self) -> u8 {
        match self {
            DirectoryParameter::DefaultPermitOutdatedVersions(_) => {
                ID_DEFAULT_PERMIT_OUTDATED_VERSIONS
            }
            DirectoryParameter::DefaultRelativeExpiration(_) => ID_DEFAULT_EXPIRATION,
            DirectoryParameter::DefaultAbsoluteExpiration(_) => ID_DEFAULT_EXPIRATION,
            DirectoryParameter::SortedHeaderInformation => ID_SORTED_HEADER_INFORMATION,
        }
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        match self {
            DirectoryParameter::DefaultPermitOutdatedVersions(permit) => {
                Ok(vec![*permit as u8])
            }
            DirectoryParameter::DefaultRelativeExpiration(duration) => {
                Ok(vec![time::encode_relative_time(*duration)?])
            }
            DirectoryParameter::DefaultAbsoluteExpiration(instant) => Ok(match instant {
                Some(dt) => time::encode_absolute_time(dt),
                None => vec![0, 0, 0, 0],
            }),
            DirectoryParameter::SortedHeaderInformation => Ok(Vec::new()),
        }
    }

    /// Encode the full preamble + payload span for this parameter.
    pub fn encode(&self) -> Result<Vec<u8>> {
        param::encode_param(self.id(), &self.encode_payload()?)
    }

    fn decode_known(id: u8, payload: &[u8]) -> Result<Self> {
        match id {
            ID_DEFAULT_PERMIT_OUTDATED_VERSIONS => {
                let byte = *payload.first().ok_or_else(|| {
                    MotError::MalformedParameter(
                        "empty DefaultPermitOutdatedVersions payload".to_string(),
                    )
                })?;
                Ok(DirectoryParameter::DefaultPermitOutdatedVersions(
                    byte != 0,
                ))
            }
            ID_DEFAULT_EXPIRATION => match payload.len() {
                1 => Ok(DirectoryParameter::DefaultRelativeExpiration(
                    time::decode_relative_time(payload[0]),
                )),
                4 | 6 => Ok(DirectoryParameter::DefaultAbsoluteExpiration(
                    time::decode_absolute_time(payload)?,
                )),
                other => Err(MotError::MalformedParameter(format!(
                    "default expiration payload of length {other} is neither relative (1) nor absolute (4/6)"
                ))),
            },
            ID_SORTED_HEADER_INFORMATION => Ok(DirectoryParameter::SortedHeaderInformation),
            other => Err(MotError::UnknownHeaderParameter {
                id: other,
                raw: Vec::new(),
            }),
        }
    }

    /// Decode one directory parameter from the start of `data`, returning
    /// it and the number of bytes consumed. Same unknown-id handling as
    /// [`crate::mot::header_param::HeaderParameter::decode`].
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
