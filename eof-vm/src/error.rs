//! Crate-level error types: deploy-time (structural, validation) and runtime halts.

use thiserror::Error;

pub use crate::binary::StructuralError;

/// Either deploy-time error. Returned by [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EofError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A code section failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("code section {section} invalid at offset {offset}: {kind}")]
pub struct ValidationError {
    pub section: usize,
    pub offset: usize,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(section: usize, offset: usize, kind: ValidationErrorKind) -> Self {
        Self { section, offset, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    #[error("undefined opcode 0x{opcode:02x}")]
    UndefinedOpcode { opcode: u8 },

    #[error("immediate of opcode 0x{opcode:02x} runs past the end of the section")]
    TruncatedImmediate { opcode: u8 },

    #[error("CALLF target {target} out of range ({sections} code sections)")]
    CallfTargetOutOfRange { target: usize, sections: usize },

    #[error("relative jump target {target} outside section of length {len}")]
    JumpOutOfBounds { target: isize, len: usize },

    #[error("relative jump target {target} lands on a CALLF immediate")]
    JumpIntoCallfImmediate { target: usize },

    #[error("relative jump target {target} lands on immediate data")]
    JumpIntoImmediate { target: usize },

    #[error("RJUMPV with an empty jump table")]
    EmptyJumpTable,

    #[error("entry section must have 0 inputs and 0 outputs, found {inputs} -> {outputs}")]
    InvalidEntryType { inputs: u8, outputs: u8 },

    #[error("inputs {inputs} exceed 127")]
    InputsOutOfRange { inputs: u8 },

    #[error("outputs {outputs} exceed 127")]
    OutputsOutOfRange { outputs: u8 },

    #[error("max_stack_height {height} exceeds 1023")]
    MaxStackHeightOutOfRange { height: u16 },
}

/// Reasons for an exceptional halt. Every one is fatal to the running execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Halt {
    #[error("stack underflow: need {required} items above the frame floor, {available} visible")]
    StackUnderflow { required: usize, available: usize },

    #[error("stack overflow: limit {limit}")]
    StackOverflow { limit: usize },

    #[error("return stack overflow: limit {limit}")]
    ReturnStackOverflow { limit: usize },

    #[error("CALLF target {target} out of range")]
    CallfTargetOutOfRange { target: usize },

    #[error("CALLF at stack height {height} may exceed the limit (callee max_stack_height {max_stack_height})")]
    CallfStackLimit { height: usize, max_stack_height: u16 },

    #[error("RETF expected stack height {expected}, found {actual}")]
    RetfOutputMismatch { expected: usize, actual: usize },

    #[error("out of gas")]
    OutOfGas,

    #[error("INVALID instruction executed")]
    InvalidInstruction,

    #[error("undefined opcode 0x{opcode:02x}")]
    UndefinedInstruction { opcode: u8 },

    #[error("opcode 0x{opcode:02x} is not supported by the host")]
    Unsupported { opcode: u8 },

    #[error("immediate of opcode 0x{opcode:02x} is truncated")]
    TruncatedImmediate { opcode: u8 },

    #[error("relative jump to invalid target")]
    InvalidJump,

    #[error("host returned {actual} outputs for opcode 0x{opcode:02x}, expected {expected}")]
    HostOutputMismatch { opcode: u8, expected: usize, actual: usize },
}
