//! Data stack shared by every function of one execution.
//!
//! All accessors take the active frame's floor: slots below it belong to callers and are
//! never readable from the running function.

use crate::error::Halt;
use crate::model::Word;

#[derive(Debug)]
pub struct DataStack {
    stack: Vec<Word>,
    limit: usize,
}

impl DataStack {
    pub fn new(limit: usize) -> Self {
        Self {
            stack: Vec::with_capacity(limit.min(1024)),
            limit,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Items visible above `floor`.
    #[inline]
    pub fn visible(&self, floor: usize) -> usize {
        self.stack.len().saturating_sub(floor)
    }

    /// Fail unless at least `n` items sit above `floor`.
    #[inline]
    pub fn require(&self, floor: usize, n: usize) -> Result<(), Halt> {
        let available = self.visible(floor);
        if available < n {
            return Err(Halt::StackUnderflow {
                required: n,
                available,
            });
        }
        Ok(())
    }

    pub fn push(&mut self, v: Word) -> Result<(), Halt> {
        if self.stack.len() >= self.limit {
            return Err(Halt::StackOverflow { limit: self.limit });
        }
        self.stack.push(v);
        Ok(())
    }

    pub fn pop(&mut self, floor: usize) -> Result<Word, Halt> {
        self.require(floor, 1)?;
        self.stack.pop().ok_or(Halt::StackUnderflow {
            required: 1,
            available: 0,
        })
    }

    /// Pop `n` items, returned in push order (deepest first).
    pub fn pop_n(&mut self, floor: usize, n: usize) -> Result<Vec<Word>, Halt> {
        self.require(floor, n)?;
        let at = self.stack.len() - n;
        Ok(self.stack.split_off(at))
    }

    /// Copy the item `depth` places from the top (1 = top) onto the stack.
    pub fn dup(&mut self, floor: usize, depth: usize) -> Result<(), Halt> {
        self.require(floor, depth)?;
        let v = self.stack[self.stack.len() - depth];
        self.push(v)
    }

    /// Exchange the top with the item `depth` places below it.
    pub fn swap(&mut self, floor: usize, depth: usize) -> Result<(), Halt> {
        self.require(floor, depth + 1)?;
        let top = self.stack.len() - 1;
        self.stack.swap(top, top - depth);
        Ok(())
    }

    pub fn as_slice(&self) -> &[Word] {
        &self.stack
    }

    pub fn into_vec(self) -> Vec<Word> {
        self.stack
    }
}
