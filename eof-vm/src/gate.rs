//! Creation gate: routes code to legacy or container handling and turns a validation verdict
//! into the outcome a creation flow acts on.

use tracing::debug;

use crate::binary::MAGIC;
use crate::error::EofError;
use crate::model::Container;

/// Which execution path a piece of code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Legacy,
    Eof,
}

impl CodeKind {
    /// Containers start with the two magic bytes; everything else is legacy code.
    pub fn classify(code: &[u8]) -> Self {
        if code.starts_with(&MAGIC) {
            CodeKind::Eof
        } else {
            CodeKind::Legacy
        }
    }
}

/// The creation flow that submitted initcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateKind {
    Transaction,
    Create,
    Create2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateVerdict {
    /// Not a container; hand to the legacy path.
    Legacy,
    Deploy(Container),
    /// Creation step of a transaction fails; the transaction stays valid and its gas is charged.
    CreationFailed(EofError),
    /// `CREATE`/`CREATE2` push 0 to the caller instead of aborting it.
    PushZero(EofError),
}

impl CreateVerdict {
    pub fn container(&self) -> Option<&Container> {
        match self {
            CreateVerdict::Deploy(c) => Some(c),
            _ => None,
        }
    }
}

pub fn gate(kind: CreateKind, initcode: &[u8]) -> CreateVerdict {
    if CodeKind::classify(initcode) == CodeKind::Legacy {
        return CreateVerdict::Legacy;
    }
    match crate::validate(initcode) {
        Ok(container) => CreateVerdict::Deploy(container),
        Err(e) => {
            debug!(?kind, error = %e, "initcode rejected");
            match kind {
                CreateKind::Transaction => CreateVerdict::CreationFailed(e),
                CreateKind::Create | CreateKind::Create2 => CreateVerdict::PushZero(e),
            }
        }
    }
}
