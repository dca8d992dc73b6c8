//! Execution engine: data stack, return stack, instruction table and dispatch loop.

pub mod frames;
pub mod instructions;
pub mod interpreter;
pub mod stack;

use crate::error::Halt;
use crate::host::Host;
use crate::model::{Container, Word};

pub use interpreter::{ExecutionContext, Vm};

/// How one top-level execution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// STOP, RETURN, RETF from the entry section, or running off a section's end.
    Success { stack: Vec<Word>, gas_used: u64 },
    Revert { gas_used: u64 },
    /// Fatal fault. `section`/`pc` locate the faulting instruction; `return_depth`
    /// counts the sentinel frame.
    ExceptionalHalt {
        reason: Halt,
        section: usize,
        pc: usize,
        return_depth: usize,
    },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    pub fn halt_reason(&self) -> Option<&Halt> {
        match self {
            ExecutionOutcome::ExceptionalHalt { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Gas reported by the host; `None` for exceptional halts, which consume everything.
    pub fn gas_used(&self) -> Option<u64> {
        match self {
            ExecutionOutcome::Success { gas_used, .. } | ExecutionOutcome::Revert { gas_used } => {
                Some(*gas_used)
            }
            ExecutionOutcome::ExceptionalHalt { .. } => None,
        }
    }
}

/// Run `container` with default limits.
pub fn execute<H: Host>(container: &Container, host: &mut H) -> ExecutionOutcome {
    Vm::default().run(container, host)
}
