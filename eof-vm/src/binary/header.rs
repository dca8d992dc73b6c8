//! Header records: magic, version, section kinds and sizes, terminator.

use super::{
    cursor::Cursor, Result, StructuralError, KIND_CODE, KIND_DATA, KIND_TYPE, MAGIC,
    MAX_CODE_SECTIONS, TERMINATOR, TYPE_ENTRY_SIZE, VERSION,
};

/// Decoded container header. Sizes are as declared; the body has not been read yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub type_size: u16,
    pub code_sizes: Vec<u16>,
    pub data_size: u16,
}

impl Header {
    /// Total body length declared by the header.
    pub fn body_len(&self) -> usize {
        self.type_size as usize
            + self.code_sizes.iter().map(|&s| s as usize).sum::<usize>()
            + self.data_size as usize
    }

    /// Encoded header length: 13 fixed bytes plus 2 per code section.
    pub fn encoded_len(&self) -> usize {
        13 + 2 * self.code_sizes.len()
    }

    /// Re-emit the header bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&MAGIC);
        out.push(self.version);
        out.push(KIND_TYPE);
        out.extend_from_slice(&self.type_size.to_be_bytes());
        out.push(KIND_CODE);
        out.extend_from_slice(&(self.code_sizes.len() as u16).to_be_bytes());
        for size in &self.code_sizes {
            out.extend_from_slice(&size.to_be_bytes());
        }
        out.push(KIND_DATA);
        out.extend_from_slice(&self.data_size.to_be_bytes());
        out.push(TERMINATOR);
        out
    }
}

fn expect_kind(cur: &mut Cursor, expected: u8) -> Result<()> {
    let offset = cur.offset();
    let found = cur.read_u8()?;
    if found != expected {
        return Err(StructuralError::UnexpectedSectionKind {
            offset,
            expected,
            found,
        });
    }
    Ok(())
}

/// Read the header, applying every header-level gate in wire order.
pub fn read_header(cur: &mut Cursor) -> Result<Header> {
    let magic = cur.read_bytes(2).map_err(|_| StructuralError::BadMagic)?;
    if magic != MAGIC {
        return Err(StructuralError::BadMagic);
    }
    let version = cur.read_u8()?;
    if version != VERSION {
        return Err(StructuralError::UnsupportedVersion { version });
    }

    expect_kind(cur, KIND_TYPE)?;
    let type_size = cur.read_u16_be()?;

    expect_kind(cur, KIND_CODE)?;
    let count = cur.read_u16_be()? as usize;
    if count == 0 || count > MAX_CODE_SECTIONS {
        return Err(StructuralError::InvalidCodeSectionCount { count });
    }
    if type_size as usize != TYPE_ENTRY_SIZE * count {
        return Err(StructuralError::TypeSectionSizeMismatch {
            declared: type_size as usize,
            sections: count,
        });
    }
    let mut code_sizes = Vec::with_capacity(count);
    for index in 0..count {
        let size = cur.read_u16_be()?;
        if size == 0 {
            return Err(StructuralError::ZeroCodeSize { index });
        }
        code_sizes.push(size);
    }

    expect_kind(cur, KIND_DATA)?;
    let data_size = cur.read_u16_be()?;

    let offset = cur.offset();
    let found = cur.read_u8()?;
    if found != TERMINATOR {
        return Err(StructuralError::MissingTerminator { offset, found });
    }

    Ok(Header {
        version,
        type_size,
        code_sizes,
        data_size,
    })
}
