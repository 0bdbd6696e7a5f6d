//! Structural checks a reader may run before trusting a chunk.

use crate::{bytecode::chunk::Chunk, ChunkError, ChunkResult};

/// Basic structural validation of a chunk.
///
/// Every instruction must decode and every constant operand must refer to a
/// slot of the chunk's own pool. Never called implicitly: the builder records
/// whatever the emitter writes.
pub fn verify_chunk(chunk: &Chunk) -> ChunkResult<()> {
    debug_assert_eq!(chunk.code().len(), chunk.lines().len());

    let pool_len = chunk.constants().len();
    for ins in chunk.instructions() {
        let ins = ins?;
        if let Some(index) = ins.constant_index() {
            if index >= pool_len {
                return Err(ChunkError::DanglingConstant {
                    opcode: ins.opcode,
                    offset: ins.offset,
                    index,
                    pool_len,
                });
            }
        }
    }

    Ok(())
}

impl Chunk {
    /// See [`verify_chunk`].
    pub fn verify(&self) -> ChunkResult<()> { verify_chunk(self) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bytecode::opcode::OpCode, ChunkBuilder, Value};

    #[test]
    fn well_formed_chunk_passes() -> ChunkResult<()> {
        let mut b = ChunkBuilder::new();
        b.write_constant(Value::Number(1.0), 1)?;
        let index = b.add_constant(Value::from("x"))?;
        let name = u8::try_from(index).map_err(|_| ChunkError::ConstantIndexOverflow { index })?;
        b.write_op(OpCode::DefineGlobal, 1)?;
        b.append_byte(name, 1)?;
        b.write_op(OpCode::Return, 2)?;
        b.finish().verify()
    }

    #[test]
    fn dangling_constant_reported() -> ChunkResult<()> {
        let mut b = ChunkBuilder::new();
        b.write_op(OpCode::Nil, 1)?;
        b.write_op(OpCode::GetGlobal, 1)?;
        b.append_byte(3, 1)?;
        assert_eq!(
            verify_chunk(&b.finish()),
            Err(ChunkError::DanglingConstant {
                opcode: OpCode::GetGlobal,
                offset: 1,
                index: 3,
                pool_len: 0,
            })
        );
        Ok(())
    }

    #[test]
    fn truncated_stream_reported() -> ChunkResult<()> {
        let mut b = ChunkBuilder::new();
        b.write_op(OpCode::Constant, 9)?;
        assert!(matches!(
            b.finish().verify(),
            Err(ChunkError::TruncatedInstruction { offset: 0, .. })
        ));
        Ok(())
    }
}
