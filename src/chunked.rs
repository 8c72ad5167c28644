use std::collections::HashMap;

use crate::identity::{Id128, RecordIdentity};
use crate::record::Record;
use crate::stream::JournalStream;

/// Where a freshly filled chunk attaches relative to the current chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    NonAdjacent,
    BeforeCurrent,
    AfterCurrent,
}

/// Whether a chunk edge is known to abut its list neighbor with no unread
/// gap in the underlying stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contiguity {
    Contiguous,
    NonContiguous,
}

/// A contiguously-read run of records, capacity-bounded by the cache's
/// chunk size. Committed chunks are never empty.
#[derive(Debug)]
pub struct Chunk {
    pub lines: Vec<Record>,
    pub lowest_by_namespace: HashMap<Id128, u64>,
    pub highest_by_namespace: HashMap<Id128, u64>,
    pub start_edge: Contiguity,
    pub end_edge: Contiguity,
}

impl Chunk {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Vec::with_capacity(capacity),
            lowest_by_namespace: HashMap::new(),
            highest_by_namespace: HashMap::new(),
            start_edge: Contiguity::NonContiguous,
            end_edge: Contiguity::NonContiguous,
        }
    }

    fn push(&mut self, record: Record) {
        let ns = record.identity.namespace;
        let seq = record.identity.sequence;
        // first seqnum seen for a namespace is its low-water mark; the most
        // recently seen one is the high-water mark, which equals the maximum
        // as long as the source emits each namespace in sequence order
        self.lowest_by_namespace.entry(ns).or_insert(seq);
        self.highest_by_namespace.insert(ns, seq);
        self.lines.push(record);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True if the per-namespace summary admits this identity. A missing
    /// low bound counts as "no bound recorded".
    fn may_contain(&self, identity: RecordIdentity) -> bool {
        match self.highest_by_namespace.get(&identity.namespace) {
            Some(&highest) if identity.sequence <= highest => self
                .lowest_by_namespace
                .get(&identity.namespace)
                .map_or(true, |&lowest| lowest <= identity.sequence),
            _ => false,
        }
    }
}

/// Stable handle to a chunk. Handles address a push-only arena and remain
/// valid no matter where later chunks are spliced into the traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkId(usize);

/// Windowed cache over a seek-only journal stream.
///
/// Chunks are kept for the lifetime of the cache in `slots` (the arena);
/// `order` lists their handles in stream traversal order. The viewing
/// position is `current` plus `line_offset`, with
/// `0 <= line_offset < current chunk length` whenever `current` is set.
pub struct ChunkedJournal<S> {
    chunk_size: usize,
    stream: S,
    slots: Vec<Chunk>,
    order: Vec<ChunkId>,
    current: Option<ChunkId>,
    line_offset: usize,
}

impl<S: JournalStream> ChunkedJournal<S> {
    pub fn new(stream: S, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        Self {
            chunk_size,
            stream,
            slots: Vec::new(),
            order: Vec::new(),
            current: None,
            line_offset: 0,
        }
    }

    #[allow(dead_code)]
    pub fn chunk_count(&self) -> usize {
        self.order.len()
    }

    /// Chunks in stream traversal order.
    #[allow(dead_code)]
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.order.iter().map(|id| &self.slots[id.0])
    }

    #[allow(dead_code)]
    pub fn chunk(&self, id: ChunkId) -> &Chunk {
        &self.slots[id.0]
    }

    #[allow(dead_code)]
    pub fn current_chunk_id(&self) -> Option<ChunkId> {
        self.current
    }

    #[allow(dead_code)]
    pub fn line_offset(&self) -> usize {
        self.line_offset
    }

    /// The record under the viewing position, if any.
    pub fn current_line(&self) -> Option<&Record> {
        let current = self.current?;
        self.slots[current.0].lines.get(self.line_offset)
    }

    /// Positions the view on the first record of the stream.
    pub fn seek_to_start(&mut self) {
        self.stream.seek_to_start();
        if !self.stream.advance() {
            return;
        }
        self.load_at_position(Adjacency::NonAdjacent, Contiguity::NonContiguous);
        self.line_offset = 0;
    }

    /// Positions the view on the last record of the stream. The loaded
    /// chunk may be shorter than the configured chunk size when the stream
    /// holds fewer records, so the offset is the last index actually read,
    /// never a fixed `chunk_size - 1`.
    pub fn seek_to_end(&mut self) {
        self.stream.seek_to_end();
        self.stream.seek_backward(self.chunk_size);
        self.load_at_position(Adjacency::NonAdjacent, Contiguity::NonContiguous);
        if let Some(current) = self.current {
            self.line_offset = self.slots[current.0].len() - 1;
        }
    }

    /// Moves the view by `delta` lines. No-op until the cache has been
    /// positioned by one of the absolute seeks.
    ///
    /// Scrolling backward past the start of the current chunk clamps to
    /// offset 0 without loading the preceding chunk.
    pub fn scroll_lines(&mut self, delta: i64) {
        let Some(current) = self.current else {
            return;
        };

        if delta < 0 {
            let back = delta.unsigned_abs() as usize;
            if back > self.line_offset {
                self.line_offset = 0;
                // TODO: mirror the forward path and load the preceding chunk
                return;
            }
            self.line_offset -= back;
            return;
        }

        let delta = delta as usize;
        let chunk_len = self.slots[current.0].len();
        if self.line_offset + delta >= chunk_len {
            let overshoot = delta - (chunk_len - self.line_offset);
            let chunks_to_skip = overshoot / self.chunk_size;
            let new_offset = overshoot - chunks_to_skip * self.chunk_size;

            let records_to_skip = chunks_to_skip * self.chunk_size;
            if records_to_skip > 0 {
                self.stream.seek_forward(records_to_skip);
            }

            let contiguity = if chunks_to_skip == 0 {
                Contiguity::Contiguous
            } else {
                Contiguity::NonContiguous
            };
            if self.load_at_position(Adjacency::AfterCurrent, contiguity) {
                let landed = self.current.expect("position was just loaded");
                self.line_offset = new_offset.min(self.slots[landed.0].len() - 1);
            } else {
                // stream exhausted past the last cached record
                self.line_offset = chunk_len - 1;
            }
            return;
        }

        self.line_offset += delta;
    }

    /// Jumps to an already-cached record, e.g. one addressed by a cursor
    /// reported earlier. Purely cache-local: returns false without touching
    /// the stream when the identity has not been cached.
    pub fn jump_to(&mut self, identity: RecordIdentity) -> bool {
        let Some(&found) = self.chunks_containing(identity).last() else {
            return false;
        };
        self.current = Some(found);
        self.line_offset = self.slots[found.0]
            .lines
            .iter()
            .position(|record| record.identity == identity)
            .unwrap_or(0);
        true
    }

    /// Up to `max_lines` records starting at the viewing position, truncated
    /// at the end of the current chunk. Never spans into a neighbor chunk.
    pub fn get_lines(&self, max_lines: usize) -> &[Record] {
        let Some(current) = self.current else {
            return &[];
        };
        let lines = &self.slots[current.0].lines;
        let end = lines.len().min(self.line_offset + max_lines);
        &lines[self.line_offset..end]
    }

    /// 1-based "chunk i/total; line j/len" status for the modeline.
    pub fn position_string(&self) -> String {
        let Some(current) = self.current else {
            return "chunk 0/0; line 0/0".to_string();
        };
        let nth = self.position_in_order(current);
        format!(
            "chunk {}/{}; line {}/{}",
            nth + 1,
            self.order.len(),
            self.line_offset + 1,
            self.slots[current.0].len()
        )
    }

    /// Reuse-or-create choke point: every navigation lands here. Returns
    /// false when the stream has no readable record, in which case the view
    /// is left untouched.
    fn load_at_position(&mut self, adjacency: Adjacency, contiguity: Contiguity) -> bool {
        let Some(identity) = self.stream.current_identity() else {
            return false;
        };
        if let Some(&found) = self.chunks_containing(identity).last() {
            // prefer the most recently visited window; the stream is left
            // where it is, no re-read
            self.current = Some(found);
            return true;
        }
        match self.create_chunk_at_position(adjacency, contiguity) {
            Some(created) => {
                self.current = Some(created);
                true
            }
            None => false,
        }
    }

    /// Every chunk whose per-namespace summary could contain `identity`,
    /// in traversal order. An empty result only means "not yet cached".
    fn chunks_containing(&self, identity: RecordIdentity) -> Vec<ChunkId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.slots[id.0].may_contain(identity))
            .collect()
    }

    /// Reads up to `chunk_size` records starting at the stream's current
    /// position and splices the chunk into the traversal order. Returns
    /// `None` when the stream yields no records at all.
    fn create_chunk_at_position(
        &mut self,
        adjacency: Adjacency,
        contiguity: Contiguity,
    ) -> Option<ChunkId> {
        let mut chunk = Chunk::with_capacity(self.chunk_size);
        for _ in 0..self.chunk_size {
            let Some(record) = self.stream.current_record() else {
                break;
            };
            chunk.push(record);
            if !self.stream.advance() {
                break;
            }
        }
        if chunk.is_empty() {
            return None;
        }

        let slot = match adjacency {
            Adjacency::NonAdjacent => self.insertion_index(&chunk),
            Adjacency::BeforeCurrent => self.position_of_current(),
            Adjacency::AfterCurrent => self.position_of_current() + 1,
        };

        let id = ChunkId(self.slots.len());
        self.slots.push(chunk);
        self.order.insert(slot, id);

        match adjacency {
            Adjacency::NonAdjacent => {}
            Adjacency::BeforeCurrent => {
                let current = self.current.expect("checked by position_of_current");
                self.slots[id.0].end_edge = contiguity;
                self.slots[current.0].start_edge = contiguity;
            }
            Adjacency::AfterCurrent => {
                let current = self.current.expect("checked by position_of_current");
                self.slots[current.0].end_edge = contiguity;
                self.slots[id.0].start_edge = contiguity;
            }
        }

        Some(id)
    }

    /// Slot scan for non-adjacent insertions: the new chunk goes right
    /// after the last chunk whose recorded high-water mark for the new
    /// chunk's leading namespace is strictly below its first sequence, or
    /// at the list head if no chunk qualifies. Stable even though the list
    /// has no global identity order.
    fn insertion_index(&self, chunk: &Chunk) -> usize {
        let first = chunk.lines[0].identity;
        let mut slot = 0;
        for (i, id) in self.order.iter().enumerate() {
            if let Some(&highest) = self.slots[id.0].highest_by_namespace.get(&first.namespace) {
                if highest < first.sequence {
                    slot = i + 1;
                }
            }
        }
        slot
    }

    fn position_of_current(&self) -> usize {
        let current = self
            .current
            .expect("adjacent insertion requires a current chunk");
        self.position_in_order(current)
    }

    fn position_in_order(&self, id: ChunkId) -> usize {
        self.order
            .iter()
            .position(|&c| c == id)
            .expect("chunk handle missing from traversal order")
    }
}
