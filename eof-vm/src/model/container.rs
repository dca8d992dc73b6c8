//! The decoded container and a byte-level builder for assembling containers.

use super::types::CodeMeta;
use crate::binary::header::Header;
use crate::binary::VERSION;

/// A structurally well-formed container. Only the decoder constructs one; it is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub(crate) version: u8,
    pub(crate) types: Vec<CodeMeta>,
    pub(crate) code_sections: Vec<Vec<u8>>,
    pub(crate) data: Vec<u8>,
}

impl Container {
    pub fn version(&self) -> u8 {
        self.version
    }

    /// The type table, one entry per code section.
    pub fn types(&self) -> &[CodeMeta] {
        &self.types
    }

    pub fn code_meta(&self, index: usize) -> Option<&CodeMeta> {
        self.types.get(index)
    }

    pub fn code_section(&self, index: usize) -> Option<&[u8]> {
        self.code_sections.get(index).map(Vec::as_slice)
    }

    pub fn code_sections(&self) -> &[Vec<u8>] {
        &self.code_sections
    }

    pub fn num_code_sections(&self) -> usize {
        self.code_sections.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Header describing this container's layout.
    pub fn header(&self) -> Header {
        Header {
            version: self.version,
            type_size: (self.types.len() * crate::binary::TYPE_ENTRY_SIZE) as u16,
            code_sizes: self.code_sections.iter().map(|c| c.len() as u16).collect(),
            data_size: self.data.len() as u16,
        }
    }

    /// Re-encode header and body. For a decoded container this reproduces the input bytes.
    pub fn encode(&self) -> Vec<u8> {
        let header = self.header();
        let mut out = header.encode();
        out.reserve(header.body_len());
        for meta in &self.types {
            out.extend_from_slice(&meta.to_bytes());
        }
        for code in &self.code_sections {
            out.extend_from_slice(code);
        }
        out.extend_from_slice(&self.data);
        out
    }
}

/// Assembles encoded container bytes. The output still has to go through the decoder.
///
/// Sizes are written as given (truncated to 16 bits), so the builder can also produce
/// deliberately malformed containers.
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
    sections: Vec<(CodeMeta, Vec<u8>)>,
    data: Vec<u8>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a code section with its type metadata.
    pub fn code(mut self, meta: CodeMeta, code: impl Into<Vec<u8>>) -> Self {
        self.sections.push((meta, code.into()));
        self
    }

    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let header = Header {
            version: VERSION,
            type_size: (self.sections.len() * crate::binary::TYPE_ENTRY_SIZE) as u16,
            code_sizes: self.sections.iter().map(|(_, c)| c.len() as u16).collect(),
            data_size: self.data.len() as u16,
        };
        let mut out = header.encode();
        for (meta, _) in &self.sections {
            out.extend_from_slice(&meta.to_bytes());
        }
        for (_, code) in &self.sections {
            out.extend_from_slice(code);
        }
        out.extend_from_slice(&self.data);
        out
    }
}
