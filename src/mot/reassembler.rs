//! Carousel reassembly: the cache that turns an unordered, possibly
//! duplicated, possibly interleaved stream of datagroups into whole
//! [`MotObject`]s.

use std::collections::{HashMap, HashSet};

use crate::mot::content_type::ContentType;
use crate::mot::datagroup::{Datagroup, DatagroupType};
use crate::mot::grammar::{DirectoryHeader, HeaderCore};
use crate::mot::header_param::{HeaderParamKind, HeaderParameter};
use crate::mot::object::MotObject;
use crate::tools::error::{MotError, Result};

/// One memoized directory entry: an object's content type and header
/// parameters, as published by whichever directory's run last described
/// it.
type DirectoryEntry = (ContentType, Vec<HeaderParameter>);

/// Push-driven carousel reassembler. Consumes datagroups one at a time
/// and yields zero or more completed objects per push, in ascending
/// transport_id order.
#[derive(Debug, Default)]
pub struct MotReassembler {
    cache: HashMap<u16, Vec<Box<dyn Datagroup>>>,
    directory_entries: HashMap<u16, DirectoryEntry>,
    parsed_directories: HashSet<u16>,
}

fn complete_run<'a>(
    list: &'a [Box<dyn Datagroup>],
    kind: DatagroupType,
) -> Option<Vec<&'a Box<dyn Datagroup>>> {
    let segs: Vec<&Box<dyn Datagroup>> = list.iter().filter(|d| d.kind() == kind).collect();
    if segs.is_empty() {
        return None;
    }
    for (i, seg) in segs.iter().enumerate() {
        if seg.segment_index() as usize != i {
            return None;
        }
    }
    if !segs.last().unwrap().last() {
        return None;
    }
    Some(segs)
}

fn concat(segs: &[&Box<dyn Datagroup>]) -> Vec<u8> {
    let mut data = Vec::new();
    for seg in segs {
        data.extend_from_slice(seg.data());
    }
    data
}

impl MotReassembler {
    /// Start an empty reassembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transport ids with at least one pending (incomplete)
    /// datagroup.
    pub fn pending_transport_ids(&self) -> usize {
        self.cache.len()
    }

    /// Total number of datagroups currently held across all pending
    /// transport ids, for callers implementing their own eviction policy;
    /// the cache itself enforces no bound.
    pub fn pending_datagroup_count(&self) -> usize {
        self.cache.values().map(|v| v.len()).sum()
    }

    /// Ingest one datagroup, re-sort its transport id's list, refresh any
    /// newly complete directories, and return every object that became
    /// complete as a result, in ascending transport_id order.
    pub fn push(&mut self, datagroup: Box<dyn Datagroup>) -> Vec<Result<MotObject>> {
        let tid = datagroup.transport_id();
        let list = self.cache.entry(tid).or_default();
        let duplicate = list
            .iter()
            .any(|d| d.kind() == datagroup.kind() && d.segment_index() == datagroup.segment_index());
        if duplicate {
            log::debug!(
                "dropping duplicate {:?} segment {} for transport_id {tid}",
                datagroup.kind(),
                datagroup.segment_index()
            );
        } else {
            log::trace!(
                "ingested {:?} segment {} for transport_id {tid}",
                datagroup.kind(),
                datagroup.segment_index()
            );
            list.push(datagroup);
            list.sort_by_key(|d| (d.kind() as u8, d.segment_index()));
        }

        self.refresh_directories();

        let mut ready: Vec<u16> = self
            .cache
            .keys()
            .copied()
            .filter(|t| self.is_complete(*t))
            .collect();
        ready.sort_unstable();

        let mut emitted = Vec::new();
        for t in ready {
            match self.compile(t) {
                Ok(obj) => {
                    log::info!("transport_id {t} complete, emitting object ({} body bytes)", obj.body().len());
                    emitted.push(Ok(obj));
                    self.cache.remove(&t);
                }
                Err(MotError::MissingName) => {
                    emitted.push(Err(MotError::MissingName));
                    self.cache.remove(&t);
                }
                Err(err) => {
                    // Malformed framing: treated as if the segment had
                    // not been received. Datagroups stay put for the
                    // carousel to redeliver.
                    log::warn!("transport_id {t} header/directory decode failed, deferring: {err}");
                }
            }
        }
        emitted
    }

    fn is_complete(&self, tid: u16) -> bool {
        let Some(list) = self.cache.get(&tid) else {
            return false;
        };
        let body_complete = complete_run(list, DatagroupType::Body).is_some();
        let header_complete = complete_run(list, DatagroupType::Header).is_some()
            || self.directory_entries.contains_key(&tid);
        body_complete && header_complete
    }

    fn refresh_directories(&mut self) {
        let candidates: Vec<u16> = self
            .cache
            .keys()
            .copied()
            .filter(|t| !self.parsed_directories.contains(t))
            .collect();
        for tid in candidates {
            let list = &self.cache[&tid];
            let Some(segs) = complete_run(list, DatagroupType::Directory) else {
                continue;
            };
            let data = concat(&segs);
            match DirectoryHeader::decode(&data) {
                Ok(directory) => {
                    for entry in directory.entries {
                        self.directory_entries.insert(
                            entry.transport_id,
                            (entry.header.content_type, entry.header.parameters),
                        );
                    }
                    self.parsed_directories.insert(tid);
                }
                Err(err) => {
                    log::warn!("directory transport_id {tid} decode failed, deferring: {err}");
                }
            }
        }
    }

    fn compile(&mut self, tid: u16) -> Result<MotObject> {
        let list = self
            .cache
            .get(&tid)
            .expect("compile is only called for transport ids present in the cache");

        let body_segs = complete_run(list, DatagroupType::Body)
            .expect("compile is only called once is_complete confirmed body completeness");
        let body = concat(&body_segs);

        let (content_type, parameters) = if let Some(header_segs) =
            complete_run(list, DatagroupType::Header)
        {
            let data = concat(&header_segs);
            let (header_core, _) = HeaderCore::decode(&data)?;
            (header_core.content_type, header_core.parameters)
        } else if let Some((content_type, parameters)) = self.directory_entries.get(&tid) {
            (*content_type, parameters.clone())
        } else {
            return Err(MotError::UnsupportedDataSource(format!(
                "transport_id {tid} has no header run and no directory entry"
            )));
        };

        let name = parameters
            .iter()
            .rev()
            .find(|p| p.kind() == HeaderParamKind::ContentName)
            .cloned()
            .ok_or(MotError::MissingName)?;

        let mut object = MotObject::new(tid, content_type, body, name)?;
        for param in parameters {
            object.set_parameter(param);
        }
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mot::content_type::ContentType;
    use crate::mot::datagroup::OwnedDatagroup;
    use crate::mot::grammar::HeaderCore;
    use crate::mot::header_param::CharSet;

    fn name(bytes: &[u8]) -> HeaderParameter {
        HeaderParameter::ContentName {
            charset: CharSet::IsoLatin1,
            name: bytes.to_vec(),
        }
    }

    fn header_bytes(tid: u16, body_len: usize) -> Vec<u8> {
        let _ = tid;
        HeaderCore {
            body_size: body_len as u32,
            content_type: ContentType::TEXT_ASCII,
            parameters: vec![name(b"a.txt")],
        }
        .encode()
        .unwrap()
    }

    fn header_mode_datagroups(tid: u16, body0: &[u8], body1: &[u8]) -> Vec<OwnedDatagroup> {
        vec![
            OwnedDatagroup::new(
                tid,
                DatagroupType::Header,
                0,
                true,
                header_bytes(tid, body0.len() + body1.len()),
            ),
            OwnedDatagroup::new(tid, DatagroupType::Body, 0, false, body0.to_vec()),
            OwnedDatagroup::new(tid, DatagroupType::Body, 1, true, body1.to_vec()),
        ]
    }

    #[test]
    fn header_mode_reassembles_from_three_segments_in_any_order() {
        let segments = header_mode_datagroups(7, b"B0", b"B1");
        for permutation in [[0, 1, 2], [2, 1, 0], [1, 2, 0]] {
            let mut reassembler = MotReassembler::new();
            let mut emitted = Vec::new();
            for i in permutation {
                emitted.extend(reassembler.push(Box::new(segments[i].clone())));
            }
            assert_eq!(emitted.len(), 1);
            let obj = emitted.into_iter().next().unwrap().unwrap();
            assert_eq!(obj.transport_id(), 7);
            assert_eq!(obj.body(), b"B0B1");
            assert_eq!(reassembler.pending_transport_ids(), 0);
        }
    }

    #[test]
    fn duplicate_datagroup_does_not_change_output() {
        let segments = header_mode_datagroups(7, b"B0", b"B1");
        let mut reassembler = MotReassembler::new();
        let mut emitted = Vec::new();
        for seg in &segments {
            emitted.extend(reassembler.push(Box::new(seg.clone())));
        }
        // Redeliver the header segment after the object has already been
        // emitted once; it starts a fresh, still-incomplete entry.
        reassembler.push(Box::new(segments[0].clone()));
        assert_eq!(emitted.len(), 1);
    }

    #[test]
    fn directory_mode_supplies_header_metadata() {
        let directory = DirectoryHeader {
            compression_flag: false,
            carousel_period: None,
            segment_size: 100,
            parameters: vec![],
            entries: vec![crate::mot::grammar::DirectoryEntry {
                transport_id: 9,
                header: HeaderCore {
                    body_size: 4,
                    content_type: ContentType::IMAGE_PNG,
                    parameters: vec![name(b"p.png")],
                },
            }],
        }
        .encode()
        .unwrap();

        let mut reassembler = MotReassembler::new();
        let mut emitted = Vec::new();
        emitted.extend(reassembler.push(Box::new(OwnedDatagroup::new(
            9,
            DatagroupType::Body,
            0,
            true,
            b"BODY".to_vec(),
        ))));
        emitted.extend(reassembler.push(Box::new(OwnedDatagroup::new(
            500,
            DatagroupType::Directory,
            0,
            true,
            directory,
        ))));

        assert_eq!(emitted.len(), 1);
        let obj = emitted.into_iter().next().unwrap().unwrap();
        assert_eq!(obj.transport_id(), 9);
        assert_eq!(obj.content_type(), ContentType::IMAGE_PNG);
        assert_eq!(obj.body(), b"BODY");
    }

    #[test]
    fn missing_name_surfaces_and_still_clears_cache() {
        let header = HeaderCore {
            body_size: 0,
            content_type: ContentType::TEXT_ASCII,
            parameters: vec![HeaderParameter::Priority(1)],
        }
        .encode()
        .unwrap();
        let mut reassembler = MotReassembler::new();
        reassembler.push(Box::new(OwnedDatagroup::new(
            1,
            DatagroupType::Header,
            0,
            true,
            header,
        )));
        let emitted = reassembler.push(Box::new(OwnedDatagroup::new(
            1,
            DatagroupType::Body,
            0,
            true,
            vec![],
        )));
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0], Err(MotError::MissingName));
        assert_eq!(reassembler.pending_transport_ids(), 0);
    }
}
