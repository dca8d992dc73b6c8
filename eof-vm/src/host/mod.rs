//! Host seam: gas accounting and the instructions this crate does not implement itself.

pub mod gas;

use crate::error::Halt;
use crate::model::Word;

pub use gas::GasMeter;

/// Collaborator hosting the engine.
///
/// The engine has already enforced the frame floor and the stack limit for `opcode`'s
/// declared arity before `execute_external` runs.
pub trait Host {
    /// Charge `amount` gas; fail with [`Halt::OutOfGas`] when exhausted.
    fn charge_gas(&mut self, amount: u64) -> Result<(), Halt>;

    /// Run a defined opcode the engine delegates. `inputs` are in push order (deepest first)
    /// and the result must hold exactly the opcode's declared number of outputs.
    fn execute_external(&mut self, opcode: u8, inputs: &[Word]) -> Result<Vec<Word>, Halt> {
        let _ = inputs;
        Err(Halt::Unsupported { opcode })
    }

    /// Gas consumed so far, reported in the execution outcome.
    fn gas_used(&self) -> u64;
}

/// Meters gas and rejects every delegated opcode. `RETURN`/`REVERT` are accepted as no-ops.
#[derive(Debug, Clone)]
pub struct BasicHost {
    gas: GasMeter,
}

impl BasicHost {
    pub fn new(gas_limit: u64) -> Self {
        Self { gas: GasMeter::new(gas_limit) }
    }

    pub fn gas(&self) -> &GasMeter {
        &self.gas
    }
}

impl Default for BasicHost {
    fn default() -> Self {
        Self::new(u64::MAX)
    }
}

impl Host for BasicHost {
    fn charge_gas(&mut self, amount: u64) -> Result<(), Halt> {
        self.gas.charge(amount)
    }

    fn execute_external(&mut self, opcode: u8, _inputs: &[Word]) -> Result<Vec<Word>, Halt> {
        match opcode {
            crate::vm::instructions::op::RETURN | crate::vm::instructions::op::REVERT => Ok(Vec::new()),
            _ => Err(Halt::Unsupported { opcode }),
        }
    }

    fn gas_used(&self) -> u64 {
        self.gas.used()
    }
}
