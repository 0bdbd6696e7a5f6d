//! Opcode definitions.
//!
//! Byte values and operand counts are compiled-in knowledge shared by the
//! emitter and every reader; nothing about them is stored per instruction.

use core::fmt;

/// Lox VM opcodes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Push constant `[idx]`.
    Constant = 0,
    /// Push `nil`.
    Nil = 1,
    /// Push `true`.
    True = 2,
    /// Push `false`.
    False = 3,
    /// Return from the current chunk.
    Return = 4,
    /// Pop and print.
    Print = 5,
    /// Discard the top of stack.
    Pop = 6,
    /// Arithmetic negation.
    Negate = 7,
    /// Logical not.
    Not = 8,
    /// `==`
    Equal = 9,
    /// Define global named by constant `[idx]`.
    DefineGlobal = 10,
    /// Read global named by constant `[idx]`.
    GetGlobal = 11,
    /// Assign global named by constant `[idx]`.
    SetGlobal = 12,
    /// `>`
    Greater = 13,
    /// `<`
    Less = 14,
    /// `+`
    Add = 15,
    /// `-`
    Subtract = 16,
    /// `*`
    Multiply = 17,
    /// `/`
    Divide = 18,
}

impl OpCode {
    /// Every opcode, in byte order.
    pub const ALL: [OpCode; 19] = [
        OpCode::Constant,
        OpCode::Nil,
        OpCode::True,
        OpCode::False,
        OpCode::Return,
        OpCode::Print,
        OpCode::Pop,
        OpCode::Negate,
        OpCode::Not,
        OpCode::Equal,
        OpCode::DefineGlobal,
        OpCode::GetGlobal,
        OpCode::SetGlobal,
        OpCode::Greater,
        OpCode::Less,
        OpCode::Add,
        OpCode::Subtract,
        OpCode::Multiply,
        OpCode::Divide,
    ];

    /// Convert a raw byte to an opcode.
    pub const fn from_u8(byte: u8) -> Option<Self> {
        if (byte as usize) < Self::ALL.len() {
            Some(Self::ALL[byte as usize])
        } else {
            None
        }
    }

    /// Raw byte written to `code`.
    pub const fn as_u8(self) -> u8 { self as u8 }

    /// Number of operand bytes following the opcode.
    pub const fn operand_count(self) -> usize {
        match self {
            OpCode::Constant | OpCode::DefineGlobal | OpCode::GetGlobal | OpCode::SetGlobal => 1,
            _ => 0,
        }
    }

    /// Whether the single operand is a constant-pool index.
    pub const fn reads_constant(self) -> bool {
        matches!(
            self,
            OpCode::Constant | OpCode::DefineGlobal | OpCode::GetGlobal | OpCode::SetGlobal
        )
    }

    /// Mnemonic (`OP_CONSTANT`, `OP_RETURN`, …).
    pub const fn name(self) -> &'static str {
        match self {
            OpCode::Constant => "OP_CONSTANT",
            OpCode::Nil => "OP_NIL",
            OpCode::True => "OP_TRUE",
            OpCode::False => "OP_FALSE",
            OpCode::Return => "OP_RETURN",
            OpCode::Print => "OP_PRINT",
            OpCode::Pop => "OP_POP",
            OpCode::Negate => "OP_NEGATE",
            OpCode::Not => "OP_NOT",
            OpCode::Equal => "OP_EQUAL",
            OpCode::DefineGlobal => "OP_DEFINE_GLOBAL",
            OpCode::GetGlobal => "OP_GET_GLOBAL",
            OpCode::SetGlobal => "OP_SET_GLOBAL",
            OpCode::Greater => "OP_GREATER",
            OpCode::Less => "OP_LESS",
            OpCode::Add => "OP_ADD",
            OpCode::Subtract => "OP_SUBTRACT",
            OpCode::Multiply => "OP_MULTIPLY",
            OpCode::Divide => "OP_DIVIDE",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self { op as u8 }
}
