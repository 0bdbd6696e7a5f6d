//! Bytecode primitives: opcode table, chunk storage, decoding and verification.
//!
//! Emitters write through a [`ChunkBuilder`]; `finish` hands a read-only
//! [`Chunk`] to the interpreter or any other reader.

/// Chunk storage (builder + read-only chunk) and line runs.
pub mod chunk;
/// Instruction decoding over a finished chunk.
pub mod decode;
/// Opcode set and operand arity table.
pub mod opcode;
/// Structural checks for readers.
pub mod verify;

pub use chunk::{Chunk, ChunkBuilder, LineRuns};
pub use decode::{Instruction, Instructions};
pub use opcode::OpCode;
pub use verify::verify_chunk;
