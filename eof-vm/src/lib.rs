//! eof-vm: versioned code container with static functions.
//!
//! Bytes go through three layers. [`decode`] checks the container layout and produces a
//! [`Container`]; [`validate`] additionally checks every code section's instruction stream;
//! [`execute`] runs a validated container from section 0 with `CALLF`/`RETF` function calls
//! over an explicit return stack.

pub mod binary;
pub mod config;
pub mod disasm;
pub mod error;
pub mod gate;
pub mod host;
pub mod model;
pub mod validate;
pub mod vm;

pub use config::Limits;
pub use disasm::disassemble;
pub use error::{EofError, Halt, StructuralError, ValidationError, ValidationErrorKind};
pub use gate::{gate, CodeKind, CreateKind, CreateVerdict};
pub use host::{BasicHost, GasMeter, Host};
pub use model::{CodeMeta, Container, ContainerBuilder, Word};
pub use validate::validate_container;
pub use vm::{execute, ExecutionOutcome, Vm};

use tracing::debug;

/// Decode container bytes without looking inside code sections.
pub fn decode(bytes: &[u8]) -> Result<Container, StructuralError> {
    let container = binary::sections::parse_container(bytes).map_err(|e| {
        debug!(error = %e, len = bytes.len(), "container rejected");
        e
    })?;
    debug!(
        sections = container.num_code_sections(),
        data = container.data().len(),
        "container decoded"
    );
    Ok(container)
}

/// Decode and validate. A container returned from here is safe to hand to [`execute`].
pub fn validate(bytes: &[u8]) -> Result<Container, EofError> {
    let container = decode(bytes)?;
    validate_container(&container)?;
    Ok(container)
}
