//! Execution limits.

/// Data-stack bound.
pub const STACK_LIMIT: usize = 1024;
/// Return-stack bound, sentinel frame included.
pub const RETURN_STACK_LIMIT: usize = 1024;

/// Limits applied to one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub stack_limit: usize,
    pub return_stack_limit: usize,
    /// Gas available to [`crate::host::BasicHost`]; other hosts meter on their own.
    pub gas_limit: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            stack_limit: STACK_LIMIT,
            return_stack_limit: RETURN_STACK_LIMIT,
            gas_limit: u64::MAX,
        }
    }
}

impl Limits {
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }
}
