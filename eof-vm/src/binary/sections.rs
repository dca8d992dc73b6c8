//! Top-level container parser: header followed by type, code, and data section bodies.

use super::{cursor::Cursor, header::read_header, Result, StructuralError, TYPE_ENTRY_SIZE};
use crate::model::{CodeMeta, Container};

fn read_type_section(cur: &mut Cursor, count: usize) -> Result<Vec<CodeMeta>> {
    let mut types = Vec::with_capacity(count);
    for _ in 0..count {
        types.push(CodeMeta::from_bytes(cur.read_array::<TYPE_ENTRY_SIZE>()?));
    }
    Ok(types)
}

/// Parse a complete container from raw bytes.
///
/// Every gate is structural; instruction streams are copied out untouched.
pub fn parse_container(bytes: &[u8]) -> Result<Container> {
    let mut cur = Cursor::new(bytes);
    let header = read_header(&mut cur)?;

    // The body must match the declared sizes exactly, in both directions.
    let expected = header.body_len();
    let actual = cur.remaining();
    if actual != expected {
        return Err(StructuralError::BodySizeMismatch { expected, actual });
    }

    let types = read_type_section(&mut cur, header.code_sizes.len())?;
    let mut code_sections = Vec::with_capacity(header.code_sizes.len());
    for &size in &header.code_sizes {
        code_sections.push(cur.read_bytes(size as usize)?.to_vec());
    }
    let data = cur.read_bytes(header.data_size as usize)?.to_vec();
    debug_assert!(cur.is_eof());

    Ok(Container {
        version: header.version,
        types,
        code_sections,
        data,
    })
}
