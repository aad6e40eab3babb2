//! MOT content type/subtype pairs (ETSI TS 101 756 table 17).
//!
//! A `ContentType` is a structural value: two small unsigned fields drawn
//! from a fixed enumeration. The registry below names the commonly used
//! pairs; `ContentType::new` accepts any width-valid pair, named or not.

use crate::tools::error::{MotError, Result};

/// 6-bit content type / 9-bit content subtype pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ContentType {
    content_type: u8,
    content_subtype: u16,
}

impl ContentType {
    /// Build a `ContentType`, rejecting values that don't fit their
    /// declared bit widths (6 bits for type, 9 bits for subtype).
    pub fn new(content_type: u8, content_subtype: u16) -> Result<Self> {
        if content_type > 0x3F {
            return Err(MotError::OutOfRange(format!(
                "content type {content_type} does not fit 6 bits"
            )));
        }
        if content_subtype > 0x1FF {
            return Err(MotError::OutOfRange(format!(
                "content subtype {content_subtype} does not fit 9 bits"
            )));
        }
        Ok(Self {
            content_type,
            content_subtype,
        })
    }

    /// The 6-bit type field.
    pub fn content_type(&self) -> u8 {
        self.content_type
    }

    /// The 9-bit subtype field.
    pub fn content_subtype(&self) -> u16 {
        self.content_subtype
    }
}

macro_rules! content_types {
    ($($name:ident = ($t:expr, $s:expr)),+ $(,)?) => {
        impl ContentType {
            $(
                #[allow(missing_docs)]
                pub const $name: ContentType = ContentType { content_type: $t, content_subtype: $s };
            )+
        }
    };
}

// A representative, non-exhaustive subset of ETSI TS 101 756 table 17.
content_types! {
    GENERAL_OBJECT_TRANSFER = (0, 0),
    TEXT_ASCII = (1, 0),
    TEXT_HTML = (1, 3),
    IMAGE_GIF = (2, 0),
    IMAGE_JFIF = (2, 1),
    IMAGE_BMP = (2, 2),
    IMAGE_PNG = (2, 3),
    AUDIO_MPEG1_LAYER2 = (3, 0),
    AUDIO_MPEG2_LAYER2 = (3, 2),
    VIDEO_MPEG1 = (4, 0),
    MOT_TRANSPORT_HEADER_UPDATE = (5, 0),
    SYSTEM_MHEG = (6, 0),
    SYSTEM_JAVA = (6, 1),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_oversized_fields() {
        assert!(matches!(
            ContentType::new(0x40, 0),
            Err(MotError::OutOfRange(_))
        ));
        assert!(matches!(
            ContentType::new(0, 0x200),
            Err(MotError::OutOfRange(_))
        ));
    }

    #[test]
    fn named_constants_round_trip_fields() {
        assert_eq!(ContentType::IMAGE_PNG.content_type(), 2);
        assert_eq!(ContentType::IMAGE_PNG.content_subtype(), 3);
    }
}
