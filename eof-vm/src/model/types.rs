//! Core value and metadata types: per-section type metadata and the 256-bit stack word.

use std::fmt;

use alloy_primitives::U256;

/// Largest legal `inputs`/`outputs` value in a type entry.
pub const MAX_IO: u8 = 127;
/// Largest legal `max_stack_height` value in a type entry.
pub const MAX_STACK_HEIGHT: u16 = 1023;

/// Type-section entry for one code section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CodeMeta {
    pub inputs: u8,
    pub outputs: u8,
    /// Trusted as computed by the stack-height analysis; only its range is checked here.
    pub max_stack_height: u16,
}

impl CodeMeta {
    pub const fn new(inputs: u8, outputs: u8, max_stack_height: u16) -> Self {
        Self {
            inputs,
            outputs,
            max_stack_height,
        }
    }

    /// Decode from the 4-byte wire form `(inputs, outputs, max_stack_height:u16be)`.
    pub fn from_bytes(b: [u8; 4]) -> Self {
        Self {
            inputs: b[0],
            outputs: b[1],
            max_stack_height: u16::from_be_bytes([b[2], b[3]]),
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        let h = self.max_stack_height.to_be_bytes();
        [self.inputs, self.outputs, h[0], h[1]]
    }
}

/// 256-bit stack word.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Word(U256);

impl Word {
    pub const ZERO: Word = Word(U256::ZERO);
    pub const ONE: Word = Word(U256::from_limbs([1, 0, 0, 0]));
    pub const MAX: Word = Word(U256::MAX);

    /// Interpret up to 32 big-endian bytes (shorter input is left-padded with zeros).
    pub fn from_be_slice(bytes: &[u8]) -> Self {
        let tail = &bytes[bytes.len().saturating_sub(32)..];
        Word(U256::try_from_be_slice(tail).unwrap_or(U256::ZERO))
    }

    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The value as `u64` if it fits.
    pub fn as_u64(&self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }

    pub fn wrapping_add(self, rhs: Word) -> Word {
        Word(self.0.wrapping_add(rhs.0))
    }

    pub fn wrapping_sub(self, rhs: Word) -> Word {
        Word(self.0.wrapping_sub(rhs.0))
    }

    pub fn bit_and(self, rhs: Word) -> Word {
        Word(self.0 & rhs.0)
    }

    pub fn bit_or(self, rhs: Word) -> Word {
        Word(self.0 | rhs.0)
    }

    pub fn bit_xor(self, rhs: Word) -> Word {
        Word(self.0 ^ rhs.0)
    }

    pub fn bit_not(self) -> Word {
        Word(!self.0)
    }

    pub fn from_bool(b: bool) -> Word {
        if b {
            Word::ONE
        } else {
            Word::ZERO
        }
    }
}

impl From<u64> for Word {
    fn from(v: u64) -> Self {
        Word(U256::from(v))
    }
}

impl From<U256> for Word {
    fn from(v: U256) -> Self {
        Word(v)
    }
}

impl From<Word> for U256 {
    fn from(w: Word) -> Self {
        w.0
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        let bytes = self.to_be_bytes();
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(31);
        for b in &bytes[first..] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_meta_wire_form() {
        let m = CodeMeta::from_bytes([0x02, 0x01, 0x03, 0xFF]);
        assert_eq!(m, CodeMeta::new(2, 1, 0x03FF));
        assert_eq!(m.to_bytes(), [0x02, 0x01, 0x03, 0xFF]);
    }

    #[test]
    fn word_add_sub_wrap() {
        assert_eq!(Word::MAX.wrapping_add(Word::ONE), Word::ZERO);
        assert_eq!(Word::ZERO.wrapping_sub(Word::ONE), Word::MAX);
        let a = Word::from(u64::MAX);
        let b = a.wrapping_add(Word::ONE);
        assert_eq!(b.as_u64(), None);
        assert_eq!(b.wrapping_sub(Word::ONE), a);
    }

    #[test]
    fn word_bytes_and_order() {
        let w = Word::from_be_slice(&[0x01, 0x00]);
        assert_eq!(w, Word::from(256));
        assert_eq!(Word::from_be_slice(&w.to_be_bytes()), w);
        let high = Word::from_be_slice(&[0x01; 32]);
        assert!(high > Word::from(u64::MAX));
        assert_eq!(format!("{:?}", Word::from(0x1234)), "0x1234");
        assert_eq!(format!("{:?}", Word::ZERO), "0x00");
    }

    #[test]
    fn word_matches_u256_arithmetic() {
        let a = U256::from(0xFFFF_FFFF_FFFF_FFFFu64) << 64;
        let b = U256::from(0x1234u64);
        assert_eq!(<U256 as From<Word>>::from(Word::from(a).wrapping_add(Word::from(b))), a + b);
        assert_eq!(<U256 as From<Word>>::from(Word::from(b).wrapping_sub(Word::from(a))), b.wrapping_sub(a));
        assert_eq!(<U256 as From<Word>>::from(Word::from(a).bit_not()), !a);
        assert_eq!(Word::from_be_slice(&[0xAB; 40]), Word::from_be_slice(&[0xAB; 32]));
        assert_eq!(Word::from(a).as_u64(), None);
    }
}
