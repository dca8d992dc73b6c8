use crate::error::Halt;

/// Simple gas counter against a fixed limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasMeter {
    limit: u64,
    used: u64,
}

impl GasMeter {
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    pub fn charge(&mut self, amount: u64) -> Result<(), Halt> {
        let next = self.used.checked_add(amount).ok_or(Halt::OutOfGas)?;
        if next > self.limit {
            // An exceptional halt consumes everything that was allotted.
            self.used = self.limit;
            return Err(Halt::OutOfGas);
        }
        self.used = next;
        Ok(())
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn remaining(&self) -> u64 {
        self.limit - self.used
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}
