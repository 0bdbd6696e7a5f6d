//! Instruction decoding over `code` + `lines`.
//!
//! `code` is a flat stream of (opcode, operand bytes) groups; the width of each
//! group comes from [`OpCode::operand_count`]. Operand bytes are never decoded
//! as opcodes.

use crate::{bytecode::opcode::OpCode, ChunkError, ChunkResult};

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// Offset of the opcode byte.
    pub offset: usize,
    /// Decoded opcode.
    pub opcode: OpCode,
    /// Operand bytes, `opcode.operand_count()` long.
    pub operands: &'a [u8],
    /// Source line of the opcode byte.
    pub line: u32,
}

impl<'a> Instruction<'a> {
    /// Decode the instruction whose opcode sits at `offset`.
    pub(crate) fn decode(code: &'a [u8], lines: &'a [u32], offset: usize) -> ChunkResult<Self> {
        let byte = *code.get(offset).ok_or_else(|| ChunkError::out_of_range("code", offset, code.len()))?;
        let opcode = OpCode::from_u8(byte).ok_or(ChunkError::UnknownOpcode { byte, offset })?;
        let needed = opcode.operand_count();
        let start = offset + 1;
        let available = code.len() - start;
        if available < needed {
            return Err(ChunkError::TruncatedInstruction { opcode, offset, needed, available });
        }
        let line = *lines.get(offset).ok_or_else(|| ChunkError::out_of_range("lines", offset, lines.len()))?;
        Ok(Self { offset, opcode, operands: &code[start..start + needed], line })
    }

    /// Bytes occupied by the instruction (opcode + operands).
    pub fn width(&self) -> usize { 1 + self.operands.len() }

    /// Offset of the following instruction.
    pub fn next_offset(&self) -> usize { self.offset + self.width() }

    /// Constant-pool index carried by constant-reading opcodes.
    pub fn constant_index(&self) -> Option<usize> {
        if self.opcode.reads_constant() {
            self.operands.first().map(|&b| usize::from(b))
        } else {
            None
        }
    }
}

/// Iterator over the instructions of a chunk, from offset 0.
///
/// Stops after the first decoding error.
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    code: &'a [u8],
    lines: &'a [u32],
    offset: usize,
    failed: bool,
}

impl<'a> Instructions<'a> {
    pub(crate) fn new(code: &'a [u8], lines: &'a [u32]) -> Self {
        Self { code, lines, offset: 0, failed: false }
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = ChunkResult<Instruction<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.code.len() {
            return None;
        }
        match Instruction::decode(self.code, self.lines, self.offset) {
            Ok(ins) => {
                self.offset = ins.next_offset();
                Some(Ok(ins))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl core::iter::FusedIterator for Instructions<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    const CONST: u8 = OpCode::Constant as u8;
    const RET: u8 = OpCode::Return as u8;

    #[test]
    fn decodes_groups_by_arity() -> ChunkResult<()> {
        let code = [CONST, 0, RET, OpCode::GetGlobal as u8, 1];
        let lines: [u32; 5] = [1, 1, 1, 2, 2];
        let decoded: Vec<_> = Instructions::new(&code, &lines).collect::<ChunkResult<_>>()?;
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].constant_index(), Some(0));
        assert_eq!(decoded[1].opcode, OpCode::Return);
        assert_eq!(decoded[1].constant_index(), None);
        assert_eq!(decoded[2].offset, 3);
        assert_eq!(decoded[2].operands, &[1u8]);
        assert_eq!(decoded[2].line, 2);
        Ok(())
    }

    #[test]
    fn operand_equal_to_opcode_byte_not_redecoded() -> ChunkResult<()> {
        // operand 4 == OP_RETURN, must stay an operand
        let code = [CONST, RET, RET];
        let lines: [u32; 3] = [7, 7, 8];
        let ops: Vec<_> = Instructions::new(&code, &lines)
            .map(|r| r.map(|i| i.opcode))
            .collect::<ChunkResult<_>>()?;
        assert_eq!(ops, vec![OpCode::Constant, OpCode::Return]);
        Ok(())
    }

    #[test]
    fn truncated_tail() {
        let code = [RET, CONST];
        let lines: [u32; 2] = [1, 1];
        let mut it = Instructions::new(&code, &lines);
        assert!(matches!(it.next(), Some(Ok(_))));
        assert_eq!(
            it.next(),
            Some(Err(ChunkError::TruncatedInstruction {
                opcode: OpCode::Constant,
                offset: 1,
                needed: 1,
                available: 0,
            }))
        );
        assert_eq!(it.next(), None);
    }

    #[test]
    fn unknown_opcode_stops_iteration() {
        let code = [0xEE, RET];
        let lines: [u32; 2] = [3, 3];
        let mut it = Instructions::new(&code, &lines);
        assert_eq!(it.next(), Some(Err(ChunkError::UnknownOpcode { byte: 0xEE, offset: 0 })));
        assert_eq!(it.next(), None);
    }

    #[test]
    fn decode_past_end_faults() {
        assert_eq!(
            Instruction::decode(&[RET], &[1u32], 1),
            Err(ChunkError::out_of_range("code", 1, 1))
        );
    }
}
