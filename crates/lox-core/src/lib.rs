//! lox-core — in-memory bytecode for the Lox virtual machine
//!
//! Provides:
//! - `Value` + `ValuePool` (constant pool, stable 0-based indices)
//! - `OpCode` with its compiled-in operand arity table
//! - `ChunkBuilder` (single writer) → `Chunk` (read-only after `finish`)
//! - instruction decoding, line runs and structural verification for readers
//! - `ChunkError` + alias `ChunkResult<T>`
//!
//! Features:
//! - `tracing` (default): growth, constant registration and hand-off events.
//!   No subscriber is installed here.

#![deny(missing_docs)]

use std::collections::TryReserveError;

use thiserror::Error;

/* ─────────────────────────── Public modules ─────────────────────────── */

/// Chunk, opcode table, decoding and verification.
pub mod bytecode;
/// Amortized-doubling storage shared by every growable buffer.
pub mod growth;
/// Literal values and the constant pool.
pub mod value;

pub use bytecode::{
    verify_chunk, Chunk, ChunkBuilder, Instruction, Instructions, LineRuns, OpCode,
};
pub use growth::{grow_capacity, GrowthStats, GROWTH_FACTOR, MIN_CAPACITY};
pub use value::{Value, ValuePool};

/* ─────────────────────────── Errors ─────────────────────────── */

/// Result alias used across the crate.
pub type ChunkResult<T> = Result<T, ChunkError>;

/// Errors raised by chunk emission and by readers decoding a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// A buffer could not be grown to the next capacity step.
    #[error("out of capacity: cannot grow {buffer} to {requested} slots")]
    OutOfCapacity {
        /// Buffer that failed to grow (`code`, `lines`, `constants`).
        buffer: &'static str,
        /// Capacity that was requested.
        requested: usize,
        /// Allocator failure.
        #[source]
        source: TryReserveError,
    },

    /// Read outside `0..len`; a caller bug, never a data condition.
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Sequence that was indexed.
        what: &'static str,
        /// Requested index.
        index: usize,
        /// Length at the time of the read.
        len: usize,
    },

    /// Byte at an instruction start is not an assigned opcode.
    #[error("unknown opcode 0x{byte:02X} at offset {offset}")]
    UnknownOpcode {
        /// Raw byte.
        byte: u8,
        /// Offset in `code`.
        offset: usize,
    },

    /// Code ends before all operand bytes of an instruction.
    #[error("{opcode} at offset {offset} needs {needed} operand byte(s), {available} left")]
    TruncatedInstruction {
        /// Opcode whose operands are missing.
        opcode: OpCode,
        /// Offset of the opcode.
        offset: usize,
        /// Operand bytes required by the arity table.
        needed: usize,
        /// Operand bytes actually present.
        available: usize,
    },

    /// Constant index does not fit in a single operand byte.
    #[error("too many constants in one chunk: index {index} exceeds {max}", max = u8::MAX)]
    ConstantIndexOverflow {
        /// Index returned by the pool.
        index: usize,
    },

    /// Operand refers to a constant the pool does not hold.
    #[error("{opcode} at offset {offset} references constant {index}, pool holds {pool_len}")]
    DanglingConstant {
        /// Constant-reading opcode.
        opcode: OpCode,
        /// Offset of the opcode.
        offset: usize,
        /// Operand value.
        index: usize,
        /// Pool length.
        pool_len: usize,
    },
}

impl ChunkError {
    /// Builds an `IndexOutOfRange` for `what[index]` with length `len`.
    pub const fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        ChunkError::IndexOutOfRange { what, index, len }
    }
}

/* ─────────────────────────── Prelude ─────────────────────────── */

/// Convenience re-exports for emitters and readers.
pub mod prelude {
    /// Key types and functions.
    pub use super::{
        verify_chunk, Chunk, ChunkBuilder, ChunkError, ChunkResult, GrowthStats, Instruction,
        OpCode, Value, ValuePool,
    };
}

/* ─────────────────────────── Tests ─────────────────────────── */
