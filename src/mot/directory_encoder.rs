//! Directory encoder: manages the set of objects advertised by a carousel.
//!
//! Tracks add/remove/clear/set over a managed set of objects so a caller
//! can keep a directory's contents in sync as objects come and go.
//! Emission to the wire (building the actual
//! [`crate::mot::grammar::DirectoryHeader`] bytes for transmission, segment
//! scheduling, rotation timing) is out of scope for this crate.

use crate::mot::object::MotObject;

/// An ordered, transport_id-deduplicated set of objects destined for a
/// directory-mode carousel. Objects are appended in insertion order;
/// adding an object whose transport_id already exists replaces it in
/// place rather than appending a second entry.
#[derive(Debug, Default)]
pub struct DirectoryEncoder {
    objects: Vec<MotObject>,
}

impl DirectoryEncoder {
    /// Start with an empty managed set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `object`, replacing any existing entry with the same
    /// transport_id in place (preserving its original position).
    pub fn add(&mut self, object: MotObject) {
        match self
            .objects
            .iter()
            .position(|existing| existing.transport_id() == object.transport_id())
        {
            Some(index) => self.objects[index] = object,
            None => self.objects.push(object),
        }
    }

    /// Remove the object with the given transport_id, if present.
    pub fn remove(&mut self, transport_id: u16) -> Option<MotObject> {
        self.objects
            .iter()
            .position(|existing| existing.transport_id() == transport_id)
            .map(|index| self.objects.remove(index))
    }

    /// Remove every managed object.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Replace the full managed set in one step.
    pub fn set(&mut self, objects: Vec<MotObject>) {
        self.objects = objects;
    }

    /// The objects currently managed, in insertion order.
    pub fn objects(&self) -> &[MotObject] {
        &self.objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mot::content_type::ContentType;
    use crate::mot::header_param::{CharSet, HeaderParameter};

    fn object(tid: u16) -> MotObject {
        MotObject::new(
            tid,
            ContentType::TEXT_ASCII,
            vec![],
            HeaderParameter::ContentName {
                charset: CharSet::IsoLatin1,
                name: format!("obj-{tid}").into_bytes(),
            },
        )
        .unwrap()
    }

    #[test]
    fn adding_duplicate_transport_id_replaces_in_place() {
        let mut encoder = DirectoryEncoder::new();
        encoder.add(object(1));
        encoder.add(object(2));
        encoder.add(object(1));
        assert_eq!(encoder.objects().len(), 2);
        assert_eq!(encoder.objects()[0].transport_id(), 1);
        assert_eq!(encoder.objects()[1].transport_id(), 2);
    }

    #[test]
    fn remove_and_clear() {
        let mut encoder = DirectoryEncoder::new();
        encoder.add(object(1));
        encoder.add(object(2));
        assert!(encoder.remove(1).is_some());
        assert_eq!(encoder.objects().len(), 1);
        encoder.clear();
        assert!(encoder.objects().is_empty());
    }
}
