//! Fixtures shared by the chunk benchmarks.

use anyhow::{Context, Result};
use lox_core::{Chunk, ChunkBuilder, OpCode, Value};

/// About `n` bytes of `OP_CONSTANT idx; OP_RETURN` groups, one line per group.
///
/// Constant indices cycle through 0..=255 so every operand fits one byte.
pub fn build_chunk(n: usize) -> Result<Chunk> {
    let mut b = ChunkBuilder::new();
    let mut line = 1;
    let mut group = 0usize;
    while b.len() + 3 <= n {
        let idx = group % 256;
        if b.chunk().constants().len() <= idx {
            b.add_constant(Value::Number(idx as f64)).context("add_constant")?;
        }
        let operand = u8::try_from(idx).context("constant index")?;
        b.write_op(OpCode::Constant, line).context("write_op")?;
        b.append_byte(operand, line).context("append_byte")?;
        b.write_op(OpCode::Return, line).context("write_op")?;
        line += 1;
        group += 1;
    }
    Ok(b.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_is_well_formed() -> Result<()> {
        let chunk = build_chunk(1_000)?;
        assert_eq!(chunk.len(), 999);
        assert_eq!(chunk.constants().len(), 256);
        chunk.verify()?;
        Ok(())
    }
}
