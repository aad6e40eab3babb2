//! The assembled MOT object: a name, a body, a content type, and the
//! rest of an object's header parameters.

use std::collections::HashMap;

use crate::mot::content_type::ContentType;
use crate::mot::header_param::{HeaderParamKind, HeaderParameter};
use crate::tools::error::{MotError, Result};

/// A fully assembled (or caller-constructed) MOT object: a name, a body,
/// a content type, and at most one parameter of each kind.
///
/// Immutable after construction from the decode path; the encode path
/// builds one with [`MotObject::new`] and [`MotObject::set_parameter`]
/// before handing it to a directory encoder or segment framer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotObject {
    transport_id: u16,
    content_type: ContentType,
    body: Vec<u8>,
    parameters: HashMap<HeaderParamKind, HeaderParameter>,
}

impl MotObject {
    /// Build an object from its required fields. `name` becomes the
    /// object's `ContentName` parameter; every `MotObject` carries
    /// exactly one.
    pub fn new(
        transport_id: u16,
        content_type: ContentType,
        body: Vec<u8>,
        name: HeaderParameter,
    ) -> Result<Self> {
        if name.kind() != HeaderParamKind::ContentName {
            return Err(MotError::MissingName);
        }
        let mut parameters = HashMap::new();
        parameters.insert(name.kind(), name);
        Ok(Self {
            transport_id,
            content_type,
            body,
            parameters,
        })
    }

    /// Stable identity tying this object's segments together.
    pub fn transport_id(&self) -> u16 {
        self.transport_id
    }

    /// The object's content (type, subtype) pair.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// The object's body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Set (or replace) the parameter of this kind. Later duplicates
    /// overwrite earlier ones.
    pub fn set_parameter(&mut self, parameter: HeaderParameter) {
        self.parameters.insert(parameter.kind(), parameter);
    }

    /// Whether a parameter of this kind is present.
    pub fn has(&self, kind: HeaderParamKind) -> bool {
        self.parameters.contains_key(&kind)
    }

    /// Look up the parameter of this kind, if present.
    pub fn get(&self, kind: HeaderParamKind) -> Option<&HeaderParameter> {
        self.parameters.get(&kind)
    }

    /// Remove and return the parameter of this kind, if present.
    pub fn remove(&mut self, kind: HeaderParamKind) -> Option<HeaderParameter> {
        self.parameters.remove(&kind)
    }

    /// The object's `ContentName` parameter, if one is still attached.
    /// Present on every object as constructed, but `remove` is generic
    /// over all kinds so a caller can strip it after the fact.
    pub fn content_name(&self) -> Option<&HeaderParameter> {
        self.parameters.get(&HeaderParamKind::ContentName)
    }

    /// All parameters attached to this object.
    pub fn parameters(&self) -> impl Iterator<Item = &HeaderParameter> {
        self.parameters.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mot::header_param::CharSet;

    fn name(bytes: &[u8]) -> HeaderParameter {
        HeaderParameter::ContentName {
            charset: CharSet::IsoLatin1,
            name: bytes.to_vec(),
        }
    }

    #[test]
    fn rejects_construction_without_a_content_name() {
        let err = MotObject::new(
            1,
            ContentType::IMAGE_PNG,
            vec![],
            HeaderParameter::Priority(1),
        )
        .unwrap_err();
        assert_eq!(err, MotError::MissingName);
    }

    #[test]
    fn set_parameter_overwrites_same_kind() {
        let mut obj = MotObject::new(1, ContentType::IMAGE_PNG, vec![], name(b"a.png")).unwrap();
        obj.set_parameter(HeaderParameter::Priority(5));
        obj.set_parameter(HeaderParameter::Priority(9));
        assert_eq!(
            obj.get(HeaderParamKind::Priority),
            Some(&HeaderParameter::Priority(9))
        );
    }
}
