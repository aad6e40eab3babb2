//! Parameter Length Indicator (PLI) framing, shared by `HeaderParameter`
//! and `DirectoryParameter` (ETSI TS 101 756 clause 5.1.1).

use crate::tools::error::{MotError, Result};

const PLI_EMPTY: u8 = 0;
const PLI_SINGLE: u8 = 1;
const PLI_QUAD: u8 = 2;
const PLI_EXTENDED: u8 = 3;

/// Longest payload length the extended (PLI=3) long form can signal.
pub const MAX_PARAMETER_LENGTH: usize = 32770;

/// Encode a parameter's PLI + ParamId preamble and append its payload.
///
/// `id` is masked to 6 bits; callers always pass one of the fixed ids
/// owned by a `HeaderParameter`/`DirectoryParameter` variant.
pub fn encode_param(id: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let len = payload.len();
    let mut out = Vec::with_capacity(len + 3);
    match len {
        0 => out.push((PLI_EMPTY << 6) | (id & 0x3F)),
        1 => out.push((PLI_SINGLE << 6) | (id & 0x3F)),
        4 => out.push((PLI_QUAD << 6) | (id & 0x3F)),
        2..=3 | 5..=127 => {
            out.push((PLI_EXTENDED << 6) | (id & 0x3F));
            out.push(len as u8); // Ext=0, Len:7 (len < 128, top bit already 0)
        }
        128..=MAX_PARAMETER_LENGTH => {
            out.push((PLI_EXTENDED << 6) | (id & 0x3F));
            let len_field: u16 = 0x8000 | (len as u16); // Ext=1, Len:15
            out.extend_from_slice(&len_field.to_be_bytes());
        }
        _ => {
            return Err(MotError::OutOfRange(format!(
                "parameter payload length {len} exceeds {MAX_PARAMETER_LENGTH} bytes"
            )))
        }
    }
    out.extend_from_slice(payload);
    Ok(out)
}

/// A decoded preamble: the parameter id, its payload length, and the
/// number of header bytes the preamble itself occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamPreamble {
    /// 6-bit parameter id.
    pub id: u8,
    /// Payload length in bytes.
    pub length: usize,
    /// Bytes occupied by PLI + ParamId + any length extension.
    pub header_len: usize,
}

/// Decode the PLI/ParamId preamble at the start of `data`.
///
/// Does not validate that `header_len + length <= data.len()`; callers
/// combine this with the full span length to detect truncation.
pub fn decode_preamble(data: &[u8]) -> Result<ParamPreamble> {
    let first = *data
        .first()
        .ok_or_else(|| MotError::MalformedParameter("empty parameter preamble".to_string()))?;
    let pli = (first >> 6) & 0x3;
    let id = first & 0x3F;
    let (length, header_len) = match pli {
        0 => (0usize, 1usize),
        1 => (1usize, 1usize),
        2 => (4usize, 1usize),
        3 => {
            let b1 = *data.get(1).ok_or_else(|| {
                MotError::MalformedParameter("truncated extended-length preamble".to_string())
            })?;
            if b1 & 0x80 == 0 {
                ((b1 & 0x7F) as usize, 2)
            } else {
                let b2 = *data.get(2).ok_or_else(|| {
                    MotError::MalformedParameter(
                        "truncated long extended-length preamble".to_string(),
                    )
                })?;
                let len = (((b1 & 0x7F) as usize) << 8) | b2 as usize;
                (len, 3)
            }
        }
        _ => unreachable!("PLI is a 2-bit field"),
    };
    Ok(ParamPreamble {
        id,
        length,
        header_len,
    })
}

/// Decode one parameter's preamble and payload from the start of `data`,
/// returning the preamble, the payload slice, and the total span consumed.
pub fn decode_param(data: &[u8]) -> Result<(ParamPreamble, &[u8], usize)> {
    let preamble = decode_preamble(data)?;
    let total = preamble.header_len + preamble.length;
    if total > data.len() {
        return Err(MotError::MalformedParameter(format!(
            "parameter signals {} payload bytes but only {} bytes remain",
            preamble.length,
            data.len() - preamble.header_len.min(data.len())
        )));
    }
    let payload = &data[preamble.header_len..total];
    Ok((preamble, payload, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pli_minimal_for_each_length_class() {
        assert_eq!(encode_param(0, &[]).unwrap(), vec![0x00]);
        assert_eq!(encode_param(0, &[0xAA]).unwrap(), vec![0x40, 0xAA]);
        assert_eq!(
            encode_param(0, &[1, 2, 3, 4]).unwrap(),
            vec![0x80, 1, 2, 3, 4]
        );
        let three = encode_param(0, &[1, 2, 3]).unwrap();
        assert_eq!(three[0] >> 6, 3);
        assert_eq!(three[1], 3);
    }

    #[test]
    fn long_extended_form_for_large_payload() {
        let payload = vec![0u8; 200];
        let encoded = encode_param(5, &payload).unwrap();
        assert_eq!(encoded[0] >> 6, 3);
        assert_eq!(encoded[0] & 0x3F, 5);
        assert_eq!(encoded[1] & 0x80, 0x80);
        let len = (((encoded[1] & 0x7F) as usize) << 8) | encoded[2] as usize;
        assert_eq!(len, 200);
    }

    #[test]
    fn rejects_payload_above_ceiling() {
        let payload = vec![0u8; MAX_PARAMETER_LENGTH + 1];
        assert!(matches!(
            encode_param(0, &payload),
            Err(MotError::OutOfRange(_))
        ));
    }

    #[test]
    fn round_trip_through_decode() {
        for payload in [vec![], vec![0x11], vec![1, 2, 3, 4], vec![9; 50]] {
            let encoded = encode_param(12, &payload).unwrap();
            let (preamble, decoded_payload, consumed) = decode_param(&encoded).unwrap();
            assert_eq!(preamble.id, 12);
            assert_eq!(decoded_payload, payload.as_slice());
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let encoded = encode_param(0, &[1, 2, 3, 4]).unwrap();
        assert!(decode_param(&encoded[..3]).is_err());
    }
}
