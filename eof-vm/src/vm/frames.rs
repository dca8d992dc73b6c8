//! Return-stack frames used by CALLF/RETF.

use crate::error::Halt;

/// Resume point of a caller plus the floor of the callee it called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnStackFrame {
    /// Section to resume in after the matching RETF.
    pub code_section_index: usize,
    /// Program counter to resume at (just past the CALLF immediate).
    pub offset: usize,
    /// Data-stack height below which the running function may not read.
    pub stack_height: usize,
}

impl ReturnStackFrame {
    pub const SENTINEL: ReturnStackFrame = ReturnStackFrame {
        code_section_index: 0,
        offset: 0,
        stack_height: 0,
    };

    pub fn new(code_section_index: usize, offset: usize, stack_height: usize) -> Self {
        Self { code_section_index, offset, stack_height }
    }
}

/// Bounded, array-backed return stack. Never empty while execution is active.
#[derive(Debug)]
pub struct ReturnStack {
    frames: Vec<ReturnStackFrame>,
    limit: usize,
}

impl ReturnStack {
    /// A return stack holding only the sentinel frame.
    pub fn new(limit: usize) -> Self {
        let mut frames = Vec::with_capacity(limit.min(1024));
        frames.push(ReturnStackFrame::SENTINEL);
        Self { frames, limit }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.limit
    }

    /// Floor of the running function (the top frame's recorded height).
    #[inline]
    pub fn floor(&self) -> usize {
        self.frames.last().map_or(0, |f| f.stack_height)
    }

    pub fn top(&self) -> Option<&ReturnStackFrame> {
        self.frames.last()
    }

    pub fn push(&mut self, frame: ReturnStackFrame) -> Result<(), Halt> {
        if self.is_full() {
            return Err(Halt::ReturnStackOverflow { limit: self.limit });
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<ReturnStackFrame> {
        self.frames.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
