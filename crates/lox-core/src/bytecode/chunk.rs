//! Chunk storage: `code` bytes, a parallel `lines` table and an owned constant pool.

use core::ops::Range;

use crate::{
    bytecode::{
        decode::{Instruction, Instructions},
        opcode::OpCode,
    },
    growth::GrowBuf,
    ChunkError, ChunkResult, GrowthStats, Value, ValuePool,
};

/// Read-only bytecode chunk.
///
/// Produced by [`ChunkBuilder::finish`]; exposes bounds-checked readers only.
/// `lines[i]` is the source line that produced `code[i]`.
#[derive(Debug, Clone)]
pub struct Chunk {
    code: GrowBuf<u8>,
    lines: GrowBuf<u32>,
    constants: ValuePool,
}

impl Chunk {
    const fn empty() -> Self {
        Self { code: GrowBuf::new("code"), lines: GrowBuf::new("lines"), constants: ValuePool::new() }
    }

    /// Number of bytes in `code` (equal to the number of line entries).
    pub fn len(&self) -> usize { self.code.len() }

    /// Whether no byte was written.
    pub fn is_empty(&self) -> bool { self.code.len() == 0 }

    /// Byte at `index`.
    pub fn byte_at(&self, index: usize) -> ChunkResult<u8> { self.code.get(index).copied() }

    /// Source line of the byte at `index`.
    pub fn line_at(&self, index: usize) -> ChunkResult<u32> { self.lines.get(index).copied() }

    /// Constant at pool `index`.
    pub fn constant_at(&self, index: usize) -> ChunkResult<&Value> { self.constants.get(index) }

    /// Raw instruction stream.
    pub fn code(&self) -> &[u8] { self.code.as_slice() }

    /// Line table, parallel to [`Chunk::code`].
    pub fn lines(&self) -> &[u32] { self.lines.as_slice() }

    /// Owned constant pool.
    pub fn constants(&self) -> &ValuePool { &self.constants }

    /// Allocated slots of `code` (same as `lines`).
    pub fn capacity(&self) -> usize { self.code.capacity() }

    /// Growth counters of `code`.
    pub fn code_growth(&self) -> GrowthStats { self.code.stats() }

    /// Growth counters of `lines`.
    pub fn line_growth(&self) -> GrowthStats { self.lines.stats() }

    /// Decode the instruction starting at `offset`.
    pub fn decode_at(&self, offset: usize) -> ChunkResult<Instruction<'_>> {
        Instruction::decode(self.code(), self.lines(), offset)
    }

    /// Walk the instruction stream from offset 0.
    pub fn instructions(&self) -> Instructions<'_> { Instructions::new(self.code(), self.lines()) }

    /// Iterate over contiguous runs of the same line.
    pub fn line_runs(&self) -> LineRuns<'_> { LineRuns { lines: self.lines(), index: 0 } }

    /// Frees `code`, `lines` and the owned pool.
    pub fn release(self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(bytes = self.len(), "chunk released");
        self.constants.release();
    }
}

/// Exclusive writer used by the emitter while a chunk is being compiled.
///
/// No instruction-level validation happens here: emitting an instruction is
/// one [`ChunkBuilder::append_byte`] per byte, all tagged with the same line.
#[derive(Debug, Clone)]
pub struct ChunkBuilder {
    chunk: Chunk,
}

impl Default for ChunkBuilder {
    fn default() -> Self { Self::new() }
}

impl ChunkBuilder {
    /// Empty chunk with an empty pool.
    pub const fn new() -> Self { Self { chunk: Chunk::empty() } }

    /// Appends one byte and its source line.
    ///
    /// Both buffers are reserved before either is written, so on
    /// `OutOfCapacity` nothing observable changes.
    pub fn append_byte(&mut self, byte: u8, line: u32) -> ChunkResult<()> {
        let reserved = self.reserve_bytes(1)?;
        self.write_reserved(reserved, &[byte], line);
        Ok(())
    }

    /// Reserves `additional` slots in `code` and `lines`; nothing is committed.
    fn reserve_bytes(&mut self, additional: usize) -> ChunkResult<(usize, usize)> {
        let code_capacity = self.chunk.code.reserve(additional)?;
        let line_capacity = self.chunk.lines.reserve(additional)?;
        Ok((code_capacity, line_capacity))
    }

    /// Commits a `reserve_bytes` result and writes `bytes`, all on `line`.
    fn write_reserved(&mut self, (code_capacity, line_capacity): (usize, usize), bytes: &[u8], line: u32) {
        let chunk = &mut self.chunk;
        chunk.code.commit(code_capacity);
        chunk.lines.commit(line_capacity);
        debug_assert_eq!(chunk.code.capacity(), chunk.lines.capacity());
        for &byte in bytes {
            chunk.code.write_slot(byte);
            chunk.lines.write_slot(line);
        }
    }

    /// Appends the opcode byte of `op`; operand bytes are the caller's job.
    pub fn write_op(&mut self, op: OpCode, line: u32) -> ChunkResult<()> {
        self.append_byte(op.as_u8(), line)
    }

    /// Registers `value` in the pool and returns its index.
    pub fn add_constant(&mut self, value: Value) -> ChunkResult<usize> {
        self.chunk.constants.append(value)
    }

    /// Registers `value` and emits `OP_CONSTANT idx` on `line`.
    ///
    /// Returns the one-byte index. Fails with `ConstantIndexOverflow` when the
    /// pool already holds 256 constants. On any error neither the pool nor the
    /// code stream changes.
    pub fn write_constant(&mut self, value: Value, line: u32) -> ChunkResult<u8> {
        let index = self.chunk.constants.len();
        let operand = u8::try_from(index).map_err(|_| ChunkError::ConstantIndexOverflow { index })?;
        let reserved = self.reserve_bytes(2)?;
        let added = self.add_constant(value)?;
        debug_assert_eq!(added, index);
        self.write_reserved(reserved, &[OpCode::Constant.as_u8(), operand], line);
        Ok(operand)
    }

    /// Bytes written so far (next write offset).
    pub fn len(&self) -> usize { self.chunk.len() }

    /// Whether no byte was written.
    pub fn is_empty(&self) -> bool { self.chunk.is_empty() }

    /// Read view of the chunk under construction.
    pub fn chunk(&self) -> &Chunk { &self.chunk }

    /// Ends emission and hands over a read-only chunk.
    pub fn finish(self) -> Chunk {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            bytes = self.chunk.len(),
            constants = self.chunk.constants.len(),
            "chunk finished"
        );
        self.chunk
    }

    /// Drops a partially emitted chunk (compilation unit aborted).
    pub fn release(self) { self.chunk.release(); }
}

/// Iterator yielding contiguous line runs `(start..end, line)`.
#[derive(Debug, Clone)]
pub struct LineRuns<'a> {
    lines: &'a [u32],
    index: usize,
}

impl Iterator for LineRuns<'_> {
    type Item = (Range<usize>, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.index;
        let line = *self.lines.get(start)?;
        let run = self.lines[start..].iter().take_while(|&&l| l == line).count();
        self.index = start + run;
        Some((start..self.index, line))
    }
}
