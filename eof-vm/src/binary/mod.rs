//! Container decoding: byte cursor, header records, and the top-level container parser.
//! Decoding is purely structural; instruction-level checks live in `crate::validate`.

pub mod cursor;
pub mod header;
pub mod sections;

use thiserror::Error;

/// Result alias for container decoding.
pub type Result<T> = core::result::Result<T, StructuralError>;

/// Two-byte magic every container starts with.
pub const MAGIC: [u8; 2] = [0xEF, 0x00];
/// The only container version this decoder accepts. Version 0 is reserved for legacy code.
pub const VERSION: u8 = 0x01;

pub const KIND_TYPE: u8 = 0x01;
pub const KIND_CODE: u8 = 0x02;
pub const KIND_DATA: u8 = 0x03;
pub const TERMINATOR: u8 = 0x00;

/// Bytes of type-section metadata per code section.
pub const TYPE_ENTRY_SIZE: usize = 4;
pub const MAX_CODE_SECTIONS: usize = 1024;

/// Structural (header/body layout) errors. The first violated rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("bad magic: expected 0xef00")]
    BadMagic,

    #[error("unsupported container version {version}")]
    UnsupportedVersion { version: u8 },

    #[error("unexpected section kind 0x{found:02x} at offset {offset} (expected 0x{expected:02x})")]
    UnexpectedSectionKind { offset: usize, expected: u8, found: u8 },

    #[error("invalid number of code sections: {count} (must be 1..=1024)")]
    InvalidCodeSectionCount { count: usize },

    #[error("code section {index} declares size 0")]
    ZeroCodeSize { index: usize },

    #[error("type section size {declared} does not match 4 * {sections} code sections")]
    TypeSectionSizeMismatch { declared: usize, sections: usize },

    #[error("missing header terminator at offset {offset} (found 0x{found:02x})")]
    MissingTerminator { offset: usize, found: u8 },

    #[error("container body is {actual} bytes, header declares {expected}")]
    BodySizeMismatch { expected: usize, actual: usize },
}
