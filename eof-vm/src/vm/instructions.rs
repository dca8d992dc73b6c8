//! Opcode constants, the per-opcode descriptor table, and instruction decoding.
//!
//! The table is closed: bytes without an entry are undefined under this format. `JUMP`,
//! `JUMPI` and `PC` have no entry, and `0x5b` is `NOP`.

pub mod op {
    pub const STOP: u8 = 0x00;
    pub const ADD: u8 = 0x01;
    pub const SUB: u8 = 0x03;
    pub const LT: u8 = 0x10;
    pub const GT: u8 = 0x11;
    pub const EQ: u8 = 0x14;
    pub const ISZERO: u8 = 0x15;
    pub const AND: u8 = 0x16;
    pub const OR: u8 = 0x17;
    pub const XOR: u8 = 0x18;
    pub const NOT: u8 = 0x19;

    pub const POP: u8 = 0x50;
    pub const MSTORE: u8 = 0x52;
    pub const SSTORE: u8 = 0x55;

    // Undefined under this format; kept for tests and diagnostics.
    pub const JUMP: u8 = 0x56;
    pub const JUMPI: u8 = 0x57;
    pub const PC: u8 = 0x58;

    pub const NOP: u8 = 0x5B;
    pub const RJUMP: u8 = 0x5C;
    pub const RJUMPI: u8 = 0x5D;
    pub const RJUMPV: u8 = 0x5E;

    pub const PUSH0: u8 = 0x5F;
    pub const PUSH1: u8 = 0x60;
    pub const PUSH2: u8 = 0x61;
    pub const PUSH32: u8 = 0x7F;
    pub const DUP1: u8 = 0x80;
    pub const DUP16: u8 = 0x8F;
    pub const SWAP1: u8 = 0x90;
    pub const SWAP16: u8 = 0x9F;

    pub const CALLF: u8 = 0xB0;
    pub const RETF: u8 = 0xB1;

    pub const RETURN: u8 = 0xF3;
    pub const REVERT: u8 = 0xFD;
    pub const INVALID: u8 = 0xFE;
}

/// Static description of one defined opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub name: &'static str,
    /// Fixed immediate size in bytes. `RJUMPV` has a variable table after this byte.
    pub immediate: u8,
    pub inputs: u8,
    pub outputs: u8,
    /// Static gas charged before the instruction runs.
    pub gas: u16,
    pub terminating: bool,
}

const fn info(name: &'static str, immediate: u8, inputs: u8, outputs: u8, gas: u16) -> Option<OpInfo> {
    Some(OpInfo { name, immediate, inputs, outputs, gas, terminating: false })
}

const fn term(name: &'static str, inputs: u8, gas: u16) -> Option<OpInfo> {
    Some(OpInfo { name, immediate: 0, inputs, outputs: 0, gas, terminating: true })
}

const PUSH_NAMES: [&str; 32] = [
    "PUSH1", "PUSH2", "PUSH3", "PUSH4", "PUSH5", "PUSH6", "PUSH7", "PUSH8", "PUSH9", "PUSH10",
    "PUSH11", "PUSH12", "PUSH13", "PUSH14", "PUSH15", "PUSH16", "PUSH17", "PUSH18", "PUSH19",
    "PUSH20", "PUSH21", "PUSH22", "PUSH23", "PUSH24", "PUSH25", "PUSH26", "PUSH27", "PUSH28",
    "PUSH29", "PUSH30", "PUSH31", "PUSH32",
];
const DUP_NAMES: [&str; 16] = [
    "DUP1", "DUP2", "DUP3", "DUP4", "DUP5", "DUP6", "DUP7", "DUP8", "DUP9", "DUP10", "DUP11",
    "DUP12", "DUP13", "DUP14", "DUP15", "DUP16",
];
const SWAP_NAMES: [&str; 16] = [
    "SWAP1", "SWAP2", "SWAP3", "SWAP4", "SWAP5", "SWAP6", "SWAP7", "SWAP8", "SWAP9", "SWAP10",
    "SWAP11", "SWAP12", "SWAP13", "SWAP14", "SWAP15", "SWAP16",
];
const LOG_NAMES: [&str; 5] = ["LOG0", "LOG1", "LOG2", "LOG3", "LOG4"];

const fn build_table() -> [Option<OpInfo>; 256] {
    let mut t: [Option<OpInfo>; 256] = [None; 256];

    t[0x00] = term("STOP", 0, 0);
    t[0x01] = info("ADD", 0, 2, 1, 3);
    t[0x02] = info("MUL", 0, 2, 1, 5);
    t[0x03] = info("SUB", 0, 2, 1, 3);
    t[0x04] = info("DIV", 0, 2, 1, 5);
    t[0x05] = info("SDIV", 0, 2, 1, 5);
    t[0x06] = info("MOD", 0, 2, 1, 5);
    t[0x07] = info("SMOD", 0, 2, 1, 5);
    t[0x08] = info("ADDMOD", 0, 3, 1, 8);
    t[0x09] = info("MULMOD", 0, 3, 1, 8);
    t[0x0A] = info("EXP", 0, 2, 1, 10);
    t[0x0B] = info("SIGNEXTEND", 0, 2, 1, 5);

    t[0x10] = info("LT", 0, 2, 1, 3);
    t[0x11] = info("GT", 0, 2, 1, 3);
    t[0x12] = info("SLT", 0, 2, 1, 3);
    t[0x13] = info("SGT", 0, 2, 1, 3);
    t[0x14] = info("EQ", 0, 2, 1, 3);
    t[0x15] = info("ISZERO", 0, 1, 1, 3);
    t[0x16] = info("AND", 0, 2, 1, 3);
    t[0x17] = info("OR", 0, 2, 1, 3);
    t[0x18] = info("XOR", 0, 2, 1, 3);
    t[0x19] = info("NOT", 0, 1, 1, 3);
    t[0x1A] = info("BYTE", 0, 2, 1, 3);
    t[0x1B] = info("SHL", 0, 2, 1, 3);
    t[0x1C] = info("SHR", 0, 2, 1, 3);
    t[0x1D] = info("SAR", 0, 2, 1, 3);

    t[0x20] = info("KECCAK256", 0, 2, 1, 30);

    t[0x30] = info("ADDRESS", 0, 0, 1, 2);
    t[0x31] = info("BALANCE", 0, 1, 1, 100);
    t[0x32] = info("ORIGIN", 0, 0, 1, 2);
    t[0x33] = info("CALLER", 0, 0, 1, 2);
    t[0x34] = info("CALLVALUE", 0, 0, 1, 2);
    t[0x35] = info("CALLDATALOAD", 0, 1, 1, 3);
    t[0x36] = info("CALLDATASIZE", 0, 0, 1, 2);
    t[0x37] = info("CALLDATACOPY", 0, 3, 0, 3);
    t[0x38] = info("CODESIZE", 0, 0, 1, 2);
    t[0x39] = info("CODECOPY", 0, 3, 0, 3);
    t[0x3A] = info("GASPRICE", 0, 0, 1, 2);
    t[0x3B] = info("EXTCODESIZE", 0, 1, 1, 100);
    t[0x3C] = info("EXTCODECOPY", 0, 4, 0, 100);
    t[0x3D] = info("RETURNDATASIZE", 0, 0, 1, 2);
    t[0x3E] = info("RETURNDATACOPY", 0, 3, 0, 3);
    t[0x3F] = info("EXTCODEHASH", 0, 1, 1, 100);

    t[0x40] = info("BLOCKHASH", 0, 1, 1, 20);
    t[0x41] = info("COINBASE", 0, 0, 1, 2);
    t[0x42] = info("TIMESTAMP", 0, 0, 1, 2);
    t[0x43] = info("NUMBER", 0, 0, 1, 2);
    t[0x44] = info("PREVRANDAO", 0, 0, 1, 2);
    t[0x45] = info("GASLIMIT", 0, 0, 1, 2);
    t[0x46] = info("CHAINID", 0, 0, 1, 2);
    t[0x47] = info("SELFBALANCE", 0, 0, 1, 5);
    t[0x48] = info("BASEFEE", 0, 0, 1, 2);

    t[0x50] = info("POP", 0, 1, 0, 2);
    t[0x51] = info("MLOAD", 0, 1, 1, 3);
    t[0x52] = info("MSTORE", 0, 2, 0, 3);
    t[0x53] = info("MSTORE8", 0, 2, 0, 3);
    t[0x54] = info("SLOAD", 0, 1, 1, 100);
    t[0x55] = info("SSTORE", 0, 2, 0, 100);
    t[0x59] = info("MSIZE", 0, 0, 1, 2);
    t[0x5A] = info("GAS", 0, 0, 1, 2);
    t[0x5B] = info("NOP", 0, 0, 0, 1);
    t[0x5C] = info("RJUMP", 2, 0, 0, 2);
    t[0x5D] = info("RJUMPI", 2, 1, 0, 4);
    t[0x5E] = info("RJUMPV", 1, 1, 0, 4);
    t[0x5F] = info("PUSH0", 0, 0, 1, 2);

    let mut i = 0;
    while i < 32 {
        t[0x60 + i] = info(PUSH_NAMES[i], (i + 1) as u8, 0, 1, 3);
        i += 1;
    }
    i = 0;
    while i < 16 {
        t[0x80 + i] = info(DUP_NAMES[i], 0, (i + 1) as u8, (i + 2) as u8, 3);
        t[0x90 + i] = info(SWAP_NAMES[i], 0, (i + 2) as u8, (i + 2) as u8, 3);
        i += 1;
    }
    i = 0;
    while i < 5 {
        t[0xA0 + i] = info(LOG_NAMES[i], 0, (i + 2) as u8, 0, 375);
        i += 1;
    }

    // CALLF arity depends on the callee; the engine checks it against the type table.
    t[0xB0] = info("CALLF", 2, 0, 0, 5);
    t[0xB1] = info("RETF", 0, 0, 0, 3);

    t[0xF0] = info("CREATE", 0, 3, 1, 32000);
    t[0xF1] = info("CALL", 0, 7, 1, 100);
    t[0xF2] = info("CALLCODE", 0, 7, 1, 100);
    t[0xF3] = term("RETURN", 2, 0);
    t[0xF4] = info("DELEGATECALL", 0, 6, 1, 100);
    t[0xF5] = info("CREATE2", 0, 4, 1, 32000);
    t[0xFA] = info("STATICCALL", 0, 6, 1, 100);
    t[0xFD] = term("REVERT", 2, 0);
    t[0xFE] = term("INVALID", 0, 0);
    t[0xFF] = term("SELFDESTRUCT", 1, 5000);

    t
}

static OPCODE_INFO: [Option<OpInfo>; 256] = build_table();

/// Descriptor for `opcode`, or `None` if the byte is undefined.
#[inline]
pub fn op_info(opcode: u8) -> Option<&'static OpInfo> {
    OPCODE_INFO[opcode as usize].as_ref()
}

/// Relative jump table of `RJUMPV`: big-endian i16 offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTable<'a> {
    raw: &'a [u8],
}

impl<'a> JumpTable<'a> {
    pub fn len(&self) -> usize {
        self.raw.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<i16> {
        let b = self.raw.get(2 * i..2 * i + 2)?;
        Some(i16::from_be_bytes([b[0], b[1]]))
    }

    pub fn iter(&self) -> impl Iterator<Item = i16> + 'a {
        self.raw
            .chunks_exact(2)
            .map(|b| i16::from_be_bytes([b[0], b[1]]))
    }
}

/// A decoded instruction. Everything the engine does not implement natively is `External`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    Stop,
    Add,
    Sub,
    Lt,
    Gt,
    Eq,
    IsZero,
    And,
    Or,
    Xor,
    Not,
    Pop,
    Nop,
    Rjump(i16),
    Rjumpi(i16),
    Rjumpv(JumpTable<'a>),
    /// PUSH0..PUSH32 with the pushed bytes (empty for PUSH0).
    Push(&'a [u8]),
    Dup(u8),
    Swap(u8),
    Callf(u16),
    Retf,
    Return,
    Revert,
    Invalid,
    External(u8),
}

/// Why an instruction could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Undefined(u8),
    Truncated(u8),
}

/// A decoded instruction together with its encoded length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<'a> {
    pub opcode: u8,
    pub instr: Instruction<'a>,
    pub info: &'static OpInfo,
    /// Encoded length including opcode and all immediate bytes.
    pub len: usize,
}

impl<'a> Instruction<'a> {
    /// Decode the instruction starting at `pc`.
    pub fn decode(code: &'a [u8], pc: usize) -> Result<Decoded<'a>, DecodeError> {
        let opcode = *code.get(pc).ok_or(DecodeError::Truncated(op::STOP))?;
        let info = op_info(opcode).ok_or(DecodeError::Undefined(opcode))?;
        let imm_start = pc + 1;
        let mut len = 1 + info.immediate as usize;
        let imm = code
            .get(imm_start..pc + len)
            .ok_or(DecodeError::Truncated(opcode))?;

        let instr = match opcode {
            op::STOP => Instruction::Stop,
            op::ADD => Instruction::Add,
            op::SUB => Instruction::Sub,
            op::LT => Instruction::Lt,
            op::GT => Instruction::Gt,
            op::EQ => Instruction::Eq,
            op::ISZERO => Instruction::IsZero,
            op::AND => Instruction::And,
            op::OR => Instruction::Or,
            op::XOR => Instruction::Xor,
            op::NOT => Instruction::Not,
            op::POP => Instruction::Pop,
            op::NOP => Instruction::Nop,
            op::RJUMP => Instruction::Rjump(i16::from_be_bytes([imm[0], imm[1]])),
            op::RJUMPI => Instruction::Rjumpi(i16::from_be_bytes([imm[0], imm[1]])),
            op::RJUMPV => {
                let count = imm[0] as usize;
                len += 2 * count;
                let raw = code
                    .get(imm_start + 1..pc + len)
                    .ok_or(DecodeError::Truncated(opcode))?;
                Instruction::Rjumpv(JumpTable { raw })
            }
            op::PUSH0..=op::PUSH32 => Instruction::Push(imm),
            op::DUP1..=op::DUP16 => Instruction::Dup(opcode - op::DUP1 + 1),
            op::SWAP1..=op::SWAP16 => Instruction::Swap(opcode - op::SWAP1 + 1),
            op::CALLF => Instruction::Callf(u16::from_be_bytes([imm[0], imm[1]])),
            op::RETF => Instruction::Retf,
            op::RETURN => Instruction::Return,
            op::REVERT => Instruction::Revert,
            op::INVALID => Instruction::Invalid,
            other => Instruction::External(other),
        };
        Ok(Decoded {
            opcode,
            instr,
            info,
            len,
        })
    }
}

/// Absolute target of a relative jump whose encoding ends at `next_pc`.
#[inline]
pub fn relative_target(next_pc: usize, offset: i16) -> Option<usize> {
    let target = next_pc as isize + offset as isize;
    usize::try_from(target).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_opcodes_are_undefined() {
        assert!(op_info(op::JUMP).is_none());
        assert!(op_info(op::JUMPI).is_none());
        assert!(op_info(op::PC).is_none());
        assert!(op_info(0x0C).is_none());
        assert_eq!(op_info(op::NOP).map(|i| i.name), Some("NOP"));
        assert_eq!(op_info(op::NOP).map(|i| i.gas), Some(1));
        assert_eq!(op_info(op::CALLF).map(|i| i.gas), Some(5));
        assert_eq!(op_info(op::RETF).map(|i| i.gas), Some(3));
    }

    #[test]
    fn decode_immediates() {
        let code = [op::PUSH2, 0x01, 0x02, op::CALLF, 0x00, 0x07, op::RJUMPV, 0x02, 0x00, 0x01, 0xFF, 0xFE];
        let d = Instruction::decode(&code, 0).unwrap();
        assert_eq!(d.instr, Instruction::Push(&[0x01, 0x02]));
        assert_eq!(d.len, 3);
        let d = Instruction::decode(&code, 3).unwrap();
        assert_eq!(d.instr, Instruction::Callf(7));
        let d = Instruction::decode(&code, 6).unwrap();
        assert_eq!(d.len, 6);
        match d.instr {
            Instruction::Rjumpv(t) => assert_eq!(t.iter().collect::<Vec<_>>(), vec![1, -2]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_truncation_and_undefined() {
        assert_eq!(
            Instruction::decode(&[op::CALLF, 0x00], 0),
            Err(DecodeError::Truncated(op::CALLF))
        );
        assert_eq!(
            Instruction::decode(&[op::RJUMPV, 0x02, 0x00, 0x00], 0),
            Err(DecodeError::Truncated(op::RJUMPV))
        );
        assert_eq!(
            Instruction::decode(&[op::JUMP], 0),
            Err(DecodeError::Undefined(op::JUMP))
        );
    }

    #[test]
    fn relative_targets() {
        assert_eq!(relative_target(3, -3), Some(0));
        assert_eq!(relative_target(3, -4), None);
        assert_eq!(relative_target(3, 10), Some(13));
    }
}
