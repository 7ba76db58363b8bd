//! Tag-scoped arena: `TagBuffer`, `TagContext`, `TagFrame`, and the
//! freelist/stack that manage them (spec.md §3 "Entities", §4.3 "Token
//! Arena System").
//!
//! Modeled on the teacher's `Lz4FDCtx`/`Lz4FCCtx` staging buffers
//! (`tmp_in`/`tmp_out_buffer`/`dict_bytes`): a fixed-capacity byte block with
//! an append cursor, reused across sessions via a size-homogeneous pool
//! rather than reallocated every time.

use crate::position::SourcePosition;

/// A fixed-capacity, append-only byte block holding one open element's name
/// and all of its attributes' bytes (spec.md §3 "TagBuffer").
pub struct TagBuffer {
    bytes: Vec<u8>,
    used: usize,
}

impl TagBuffer {
    fn new(capacity: usize) -> Self {
        TagBuffer { bytes: vec![0u8; capacity], used: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn used(&self) -> usize {
        self.used
    }

    /// Appends `data`, returning its `(offset, length)` within the buffer,
    /// or `None` if it would exceed capacity (spec.md invariant 9).
    pub fn append(&mut self, data: &[u8]) -> Option<(usize, usize)> {
        if self.used + data.len() > self.bytes.len() {
            return None;
        }
        let offset = self.used;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        self.used += data.len();
        Some((offset, data.len()))
    }

    /// Appends a single byte, as above.
    pub fn push_byte(&mut self, b: u8) -> Option<usize> {
        self.append(&[b]).map(|(off, _)| off)
    }

    pub fn slice(&self, offset: usize, len: usize) -> &[u8] {
        &self.bytes[offset..offset + len]
    }

    /// Rewinds the append cursor to `mark`, discarding everything written
    /// past it. `Freelist::give` calls this with `mark == 0` to reclaim a
    /// popped frame's buffer wholesale before pooling it.
    pub fn truncate(&mut self, mark: usize) {
        self.used = mark;
    }
}

/// Offsets/lengths within a `TagBuffer`, plus bookkeeping for the open
/// element it describes (spec.md §3 "TagContext").
#[derive(Debug, Clone, Copy, Default)]
pub struct TagContext {
    pub name_offset: usize,
    pub name_len: usize,
    pub attr_count: u32,
    pub start_position: SourcePosition,
    pub is_empty: bool,
}

/// One open element: its buffer plus the offsets describing it (spec.md §3
/// "TagFrame").
pub struct TagFrame {
    buffer: Option<TagBuffer>,
    pub context: TagContext,
}

impl TagFrame {
    fn new(start_position: SourcePosition) -> Self {
        TagFrame {
            buffer: None,
            context: TagContext { start_position, ..TagContext::default() },
        }
    }

    fn ensure_buffer(&mut self, capacity: usize, freelist: &mut Freelist) -> &mut TagBuffer {
        if self.buffer.is_none() {
            self.buffer = Some(freelist.take(capacity).unwrap_or_else(|| TagBuffer::new(capacity)));
        }
        self.buffer.as_mut().unwrap()
    }

    pub fn buffer(&self) -> Option<&TagBuffer> {
        self.buffer.as_ref()
    }

    pub fn name(&self) -> &[u8] {
        match &self.buffer {
            Some(buf) => buf.slice(self.context.name_offset, self.context.name_len),
            None => &[],
        }
    }
}

/// Pool of owned, size-homogeneous `TagBuffer`s recycled across pops
/// (spec.md §4.3 "Freelist invariant").
pub struct Freelist {
    block_size: usize,
    budget_bytes: usize,
    used_bytes: usize,
    blocks: Vec<TagBuffer>,
}

impl Freelist {
    pub fn new(block_size: usize, budget_bytes: usize) -> Self {
        Freelist { block_size, budget_bytes, used_bytes: 0, blocks: Vec::new() }
    }

    /// Purges the pool if `block_size` (i.e. the tokenizer's current
    /// `max_per_tag_bytes`) changed since it was populated (invariant 10).
    pub fn set_block_size(&mut self, block_size: usize) {
        if block_size != self.block_size {
            self.purge();
            self.block_size = block_size;
        }
    }

    pub fn purge(&mut self) {
        self.blocks.clear();
        self.used_bytes = 0;
    }

    fn take(&mut self, capacity: usize) -> Option<TagBuffer> {
        if capacity != self.block_size {
            return None;
        }
        let buf = self.blocks.pop()?;
        self.used_bytes -= buf.capacity();
        Some(buf)
    }

    fn give(&mut self, mut buf: TagBuffer) {
        buf.truncate(0);
        if buf.capacity() != self.block_size {
            return; // size changed underneath us; drop rather than corrupt the pool.
        }
        if self.used_bytes + buf.capacity() > self.budget_bytes {
            return; // freelist budget exhausted; release instead of caching.
        }
        self.used_bytes += buf.capacity();
        self.blocks.push(buf);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }
}

/// LIFO stack of open elements (spec.md §4.3 "TagFrame stack").
pub struct TagStack {
    frames: Vec<TagFrame>,
    freelist: Freelist,
    max_open_depth: usize,
    per_tag_capacity: usize,
}

impl TagStack {
    pub fn new(max_open_depth: usize, per_tag_capacity: usize, freelist_budget: usize) -> Self {
        TagStack {
            frames: Vec::new(),
            freelist: Freelist::new(per_tag_capacity, freelist_budget),
            max_open_depth,
            per_tag_capacity,
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Pushes a new frame, or returns `false` if doing so would exceed
    /// `max_open_depth` (spec.md invariant 8).
    pub fn push_frame(&mut self, start_position: SourcePosition) -> bool {
        if self.frames.len() >= self.max_open_depth {
            return false;
        }
        self.frames.push(TagFrame::new(start_position));
        true
    }

    pub fn top(&self) -> Option<&TagFrame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut TagFrame> {
        self.frames.last_mut()
    }

    /// Ensures the top frame owns a buffer, allocating or recycling from the
    /// freelist as needed (spec.md §4.3: "on the first byte appended, the
    /// frame ensures its TagBuffer is allocated").
    pub fn top_buffer_mut(&mut self) -> Option<&mut TagBuffer> {
        let capacity = self.per_tag_capacity;
        let freelist = &mut self.freelist;
        self.frames.last_mut().map(|frame| frame.ensure_buffer(capacity, freelist))
    }

    /// Pops the top frame, returning its buffer to the freelist when the
    /// budget allows (spec.md §4.3 "pop_frame").
    pub fn pop_frame(&mut self) -> Option<TagFrame> {
        let mut frame = self.frames.pop()?;
        if let Some(buf) = frame.buffer.take() {
            self.freelist.give(buf);
        }
        Some(frame)
    }

    /// Updates the per-tag capacity and purges the freelist if it changed
    /// (spec.md invariant 10). Only affects frames pushed after this call.
    pub fn set_per_tag_capacity(&mut self, capacity: usize) {
        self.per_tag_capacity = capacity;
        self.freelist.set_block_size(capacity);
    }

    pub fn freelist_len(&self) -> usize {
        self.freelist.len()
    }

    /// Drops all open frames, returning their buffers to the freelist
    /// (spec.md §4.4 "reset()").
    pub fn clear(&mut self) {
        while self.pop_frame().is_some() {}
    }
}
