//! EVM opcode definitions

/// Opcodes of the Constantinople instruction set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    // Stop and arithmetic
    STOP = 0x00,
    ADD = 0x01,
    MUL = 0x02,
    SUB = 0x03,
    DIV = 0x04,
    SDIV = 0x05,
    MOD = 0x06,
    SMOD = 0x07,
    ADDMOD = 0x08,
    MULMOD = 0x09,
    EXP = 0x0A,
    SIGNEXTEND = 0x0B,

    // Comparison and bitwise logic
    LT = 0x10,
    GT = 0x11,
    SLT = 0x12,
    SGT = 0x13,
    EQ = 0x14,
    ISZERO = 0x15,
    AND = 0x16,
    OR = 0x17,
    XOR = 0x18,
    NOT = 0x19,
    BYTE = 0x1A,
    SHL = 0x1B,
    SHR = 0x1C,
    SAR = 0x1D,

    // Hashing
    SHA3 = 0x20,

    // Environment
    ADDRESS = 0x30,
    BALANCE = 0x31,
    ORIGIN = 0x32,
    CALLER = 0x33,
    CALLVALUE = 0x34,
    CALLDATALOAD = 0x35,
    CALLDATASIZE = 0x36,
    CALLDATACOPY = 0x37,
    CODESIZE = 0x38,
    CODECOPY = 0x39,
    GASPRICE = 0x3A,
    EXTCODESIZE = 0x3B,
    EXTCODECOPY = 0x3C,
    RETURNDATASIZE = 0x3D,
    RETURNDATACOPY = 0x3E,
    EXTCODEHASH = 0x3F,

    // Block
    BLOCKHASH = 0x40,
    COINBASE = 0x41,
    TIMESTAMP = 0x42,
    NUMBER = 0x43,
    DIFFICULTY = 0x44,
    GASLIMIT = 0x45,

    // Stack, memory, storage and flow
    POP = 0x50,
    MLOAD = 0x51,
    MSTORE = 0x52,
    MSTORE8 = 0x53,
    SLOAD = 0x54,
    SSTORE = 0x55,
    JUMP = 0x56,
    JUMPI = 0x57,
    PC = 0x58,
    MSIZE = 0x59,
    GAS = 0x5A,
    JUMPDEST = 0x5B,

    // Push
    PUSH1 = 0x60,
    PUSH2 = 0x61,
    PUSH3 = 0x62,
    PUSH4 = 0x63,
    PUSH5 = 0x64,
    PUSH6 = 0x65,
    PUSH7 = 0x66,
    PUSH8 = 0x67,
    PUSH9 = 0x68,
    PUSH10 = 0x69,
    PUSH11 = 0x6A,
    PUSH12 = 0x6B,
    PUSH13 = 0x6C,
    PUSH14 = 0x6D,
    PUSH15 = 0x6E,
    PUSH16 = 0x6F,
    PUSH17 = 0x70,
    PUSH18 = 0x71,
    PUSH19 = 0x72,
    PUSH20 = 0x73,
    PUSH21 = 0x74,
    PUSH22 = 0x75,
    PUSH23 = 0x76,
    PUSH24 = 0x77,
    PUSH25 = 0x78,
    PUSH26 = 0x79,
    PUSH27 = 0x7A,
    PUSH28 = 0x7B,
    PUSH29 = 0x7C,
    PUSH30 = 0x7D,
    PUSH31 = 0x7E,
    PUSH32 = 0x7F,

    // Dup
    DUP1 = 0x80,
    DUP2 = 0x81,
    DUP3 = 0x82,
    DUP4 = 0x83,
    DUP5 = 0x84,
    DUP6 = 0x85,
    DUP7 = 0x86,
    DUP8 = 0x87,
    DUP9 = 0x88,
    DUP10 = 0x89,
    DUP11 = 0x8A,
    DUP12 = 0x8B,
    DUP13 = 0x8C,
    DUP14 = 0x8D,
    DUP15 = 0x8E,
    DUP16 = 0x8F,

    // Swap
    SWAP1 = 0x90,
    SWAP2 = 0x91,
    SWAP3 = 0x92,
    SWAP4 = 0x93,
    SWAP5 = 0x94,
    SWAP6 = 0x95,
    SWAP7 = 0x96,
    SWAP8 = 0x97,
    SWAP9 = 0x98,
    SWAP10 = 0x99,
    SWAP11 = 0x9A,
    SWAP12 = 0x9B,
    SWAP13 = 0x9C,
    SWAP14 = 0x9D,
    SWAP15 = 0x9E,
    SWAP16 = 0x9F,

    // Logging
    LOG0 = 0xA0,
    LOG1 = 0xA1,
    LOG2 = 0xA2,
    LOG3 = 0xA3,
    LOG4 = 0xA4,

    // System
    CREATE = 0xF0,
    CALL = 0xF1,
    CALLCODE = 0xF2,
    RETURN = 0xF3,
    DELEGATECALL = 0xF4,
    CREATE2 = 0xF5,
    STATICCALL = 0xFA,
    REVERT = 0xFD,
    INVALID = 0xFE,
    SELFDESTRUCT = 0xFF,
}

impl Opcode {
    /// Decode a byte; `None` for unassigned values
    pub fn from_byte(byte: u8) -> Option<Self> {
        let opcode = match byte {
            0x00 => Self::STOP,
            0x01 => Self::ADD,
            0x02 => Self::MUL,
            0x03 => Self::SUB,
            0x04 => Self::DIV,
            0x05 => Self::SDIV,
            0x06 => Self::MOD,
            0x07 => Self::SMOD,
            0x08 => Self::ADDMOD,
            0x09 => Self::MULMOD,
            0x0A => Self::EXP,
            0x0B => Self::SIGNEXTEND,
            0x10 => Self::LT,
            0x11 => Self::GT,
            0x12 => Self::SLT,
            0x13 => Self::SGT,
            0x14 => Self::EQ,
            0x15 => Self::ISZERO,
            0x16 => Self::AND,
            0x17 => Self::OR,
            0x18 => Self::XOR,
            0x19 => Self::NOT,
            0x1A => Self::BYTE,
            0x1B => Self::SHL,
            0x1C => Self::SHR,
            0x1D => Self::SAR,
            0x20 => Self::SHA3,
            0x30 => Self::ADDRESS,
            0x31 => Self::BALANCE,
            0x32 => Self::ORIGIN,
            0x33 => Self::CALLER,
            0x34 => Self::CALLVALUE,
            0x35 => Self::CALLDATALOAD,
            0x36 => Self::CALLDATASIZE,
            0x37 => Self::CALLDATACOPY,
            0x38 => Self::CODESIZE,
            0x39 => Self::CODECOPY,
            0x3A => Self::GASPRICE,
            0x3B => Self::EXTCODESIZE,
            0x3C => Self::EXTCODECOPY,
            0x3D => Self::RETURNDATASIZE,
            0x3E => Self::RETURNDATACOPY,
            0x3F => Self::EXTCODEHASH,
            0x40 => Self::BLOCKHASH,
            0x41 => Self::COINBASE,
            0x42 => Self::TIMESTAMP,
            0x43 => Self::NUMBER,
            0x44 => Self::DIFFICULTY,
            0x45 => Self::GASLIMIT,
            0x50 => Self::POP,
            0x51 => Self::MLOAD,
            0x52 => Self::MSTORE,
            0x53 => Self::MSTORE8,
            0x54 => Self::SLOAD,
            0x55 => Self::SSTORE,
            0x56 => Self::JUMP,
            0x57 => Self::JUMPI,
            0x58 => Self::PC,
            0x59 => Self::MSIZE,
            0x5A => Self::GAS,
            0x5B => Self::JUMPDEST,
            0x60 => Self::PUSH1,
            0x61 => Self::PUSH2,
            0x62 => Self::PUSH3,
            0x63 => Self::PUSH4,
            0x64 => Self::PUSH5,
            0x65 => Self::PUSH6,
            0x66 => Self::PUSH7,
            0x67 => Self::PUSH8,
            0x68 => Self::PUSH9,
            0x69 => Self::PUSH10,
            0x6A => Self::PUSH11,
            0x6B => Self::PUSH12,
            0x6C => Self::PUSH13,
            0x6D => Self::PUSH14,
            0x6E => Self::PUSH15,
            0x6F => Self::PUSH16,
            0x70 => Self::PUSH17,
            0x71 => Self::PUSH18,
            0x72 => Self::PUSH19,
            0x73 => Self::PUSH20,
            0x74 => Self::PUSH21,
            0x75 => Self::PUSH22,
            0x76 => Self::PUSH23,
            0x77 => Self::PUSH24,
            0x78 => Self::PUSH25,
            0x79 => Self::PUSH26,
            0x7A => Self::PUSH27,
            0x7B => Self::PUSH28,
            0x7C => Self::PUSH29,
            0x7D => Self::PUSH30,
            0x7E => Self::PUSH31,
            0x7F => Self::PUSH32,
            0x80 => Self::DUP1,
            0x81 => Self::DUP2,
            0x82 => Self::DUP3,
            0x83 => Self::DUP4,
            0x84 => Self::DUP5,
            0x85 => Self::DUP6,
            0x86 => Self::DUP7,
            0x87 => Self::DUP8,
            0x88 => Self::DUP9,
            0x89 => Self::DUP10,
            0x8A => Self::DUP11,
            0x8B => Self::DUP12,
            0x8C => Self::DUP13,
            0x8D => Self::DUP14,
            0x8E => Self::DUP15,
            0x8F => Self::DUP16,
            0x90 => Self::SWAP1,
            0x91 => Self::SWAP2,
            0x92 => Self::SWAP3,
            0x93 => Self::SWAP4,
            0x94 => Self::SWAP5,
            0x95 => Self::SWAP6,
            0x96 => Self::SWAP7,
            0x97 => Self::SWAP8,
            0x98 => Self::SWAP9,
            0x99 => Self::SWAP10,
            0x9A => Self::SWAP11,
            0x9B => Self::SWAP12,
            0x9C => Self::SWAP13,
            0x9D => Self::SWAP14,
            0x9E => Self::SWAP15,
            0x9F => Self::SWAP16,
            0xA0 => Self::LOG0,
            0xA1 => Self::LOG1,
            0xA2 => Self::LOG2,
            0xA3 => Self::LOG3,
            0xA4 => Self::LOG4,
            0xF0 => Self::CREATE,
            0xF1 => Self::CALL,
            0xF2 => Self::CALLCODE,
            0xF3 => Self::RETURN,
            0xF4 => Self::DELEGATECALL,
            0xF5 => Self::CREATE2,
            0xFA => Self::STATICCALL,
            0xFD => Self::REVERT,
            0xFE => Self::INVALID,
            0xFF => Self::SELFDESTRUCT,
            _ => return None,
        };
        Some(opcode)
    }

    /// Raw byte value
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// PUSH operand size (1-32 for PUSH1-PUSH32, 0 otherwise)
    pub fn push_size(self) -> usize {
        match self.byte() {
            b @ 0x60..=0x7F => (b - 0x5F) as usize,
            _ => 0,
        }
    }

    /// Check if this is a PUSH opcode
    pub fn is_push(self) -> bool {
        self.push_size() != 0
    }

    /// DUP depth (1-16 for DUP1-DUP16, 0 otherwise)
    pub fn dup_depth(self) -> usize {
        match self.byte() {
            b @ 0x80..=0x8F => (b - 0x7F) as usize,
            _ => 0,
        }
    }

    /// SWAP depth (1-16 for SWAP1-SWAP16, 0 otherwise)
    pub fn swap_depth(self) -> usize {
        match self.byte() {
            b @ 0x90..=0x9F => (b - 0x8F) as usize,
            _ => 0,
        }
    }

    /// LOG topic count (0-4 for LOG0-LOG4, 0 otherwise)
    pub fn log_topics(self) -> usize {
        match self.byte() {
            b @ 0xA0..=0xA4 => (b - 0xA0) as usize,
            _ => 0,
        }
    }
}
