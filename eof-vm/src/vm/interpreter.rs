//! Instruction dispatch loop with CALLF/RETF over an explicit return stack (no Rust recursion).

use tracing::{debug, trace};

use crate::config::Limits;
use crate::error::Halt;
use crate::host::Host;
use crate::model::{Container, Word};
use crate::vm::frames::{ReturnStack, ReturnStackFrame};
use crate::vm::instructions::{op, relative_target, DecodeError, Decoded, Instruction};
use crate::vm::stack::DataStack;
use crate::vm::ExecutionOutcome;

/// Mutable state of one execution. Exactly one per top-level call.
#[derive(Debug)]
pub struct ExecutionContext {
    pub section: usize,
    pub pc: usize,
    pub stack: DataStack,
    pub returns: ReturnStack,
}

impl ExecutionContext {
    /// Entry state: section 0, pc 0, empty data stack, sentinel return frame.
    pub fn new(limits: &Limits) -> Self {
        Self {
            section: 0,
            pc: 0,
            stack: DataStack::new(limits.stack_limit),
            returns: ReturnStack::new(limits.return_stack_limit),
        }
    }

    /// Floor of the running function.
    #[inline]
    pub fn floor(&self) -> usize {
        self.returns.floor()
    }
}

/// How a step ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Stop,
    Revert,
}

#[derive(Debug, Clone)]
pub struct Vm {
    limits: Limits,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl Vm {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Execute `container` from section 0 until it halts.
    pub fn run<H: Host>(&self, container: &Container, host: &mut H) -> ExecutionOutcome {
        let mut ctx = ExecutionContext::new(&self.limits);
        let exit = loop {
            match step(container, host, &mut ctx) {
                Ok(None) => continue,
                Ok(Some(exit)) => break Ok(exit),
                Err(halt) => break Err(halt),
            }
        };
        match exit {
            Ok(Exit::Stop) => ExecutionOutcome::Success {
                gas_used: host.gas_used(),
                stack: ctx.stack.into_vec(),
            },
            Ok(Exit::Revert) => ExecutionOutcome::Revert {
                gas_used: host.gas_used(),
            },
            Err(reason) => {
                debug!(
                    section = ctx.section,
                    pc = ctx.pc,
                    depth = ctx.returns.depth(),
                    %reason,
                    "exceptional halt"
                );
                ExecutionOutcome::ExceptionalHalt {
                    reason,
                    section: ctx.section,
                    pc: ctx.pc,
                    return_depth: ctx.returns.depth(),
                }
            }
        }
    }
}

fn decode_at(code: &[u8], pc: usize) -> Result<Decoded<'_>, Halt> {
    Instruction::decode(code, pc).map_err(|e| match e {
        DecodeError::Undefined(opcode) => Halt::UndefinedInstruction { opcode },
        DecodeError::Truncated(opcode) => Halt::TruncatedImmediate { opcode },
    })
}

fn jump_to(code: &[u8], next: usize, offset: i16) -> Result<usize, Halt> {
    relative_target(next, offset)
        .filter(|&t| t < code.len())
        .ok_or(Halt::InvalidJump)
}

fn binop(
    ctx: &mut ExecutionContext,
    floor: usize,
    f: impl Fn(Word, Word) -> Word,
) -> Result<(), Halt> {
    let a = ctx.stack.pop(floor)?;
    let b = ctx.stack.pop(floor)?;
    ctx.stack.push(f(a, b))
}

fn unop(ctx: &mut ExecutionContext, floor: usize, f: impl Fn(Word) -> Word) -> Result<(), Halt> {
    let a = ctx.stack.pop(floor)?;
    ctx.stack.push(f(a))
}

/// Execute one instruction. `ctx.pc` keeps pointing at the instruction until it completes,
/// so a halt reports the faulting location.
fn step<H: Host>(
    container: &Container,
    host: &mut H,
    ctx: &mut ExecutionContext,
) -> Result<Option<Exit>, Halt> {
    let code = container
        .code_section(ctx.section)
        .ok_or(Halt::CallfTargetOutOfRange { target: ctx.section })?;
    // Falling off the end of a section is an implicit STOP.
    if ctx.pc >= code.len() {
        return Ok(Some(Exit::Stop));
    }

    let decoded = decode_at(code, ctx.pc)?;
    let info = decoded.info;
    let next = ctx.pc + decoded.len;
    let floor = ctx.floor();

    trace!(
        section = ctx.section,
        pc = ctx.pc,
        op = info.name,
        height = ctx.stack.len(),
        floor,
        "step"
    );

    // Frame-relative underflow and global overflow, checked for every instruction.
    let inputs = info.inputs as usize;
    ctx.stack.require(floor, inputs)?;
    if ctx.stack.len() - inputs + info.outputs as usize > ctx.stack.limit() {
        return Err(Halt::StackOverflow {
            limit: ctx.stack.limit(),
        });
    }
    // CALLF and RETF charge after their own checks.
    if !matches!(decoded.instr, Instruction::Callf(_) | Instruction::Retf) {
        host.charge_gas(info.gas as u64)?;
    }

    match decoded.instr {
        Instruction::Stop => return Ok(Some(Exit::Stop)),
        Instruction::Add => binop(ctx, floor, Word::wrapping_add)?,
        Instruction::Sub => binop(ctx, floor, Word::wrapping_sub)?,
        Instruction::Lt => binop(ctx, floor, |a, b| Word::from_bool(a < b))?,
        Instruction::Gt => binop(ctx, floor, |a, b| Word::from_bool(a > b))?,
        Instruction::Eq => binop(ctx, floor, |a, b| Word::from_bool(a == b))?,
        Instruction::IsZero => unop(ctx, floor, |a| Word::from_bool(a.is_zero()))?,
        Instruction::And => binop(ctx, floor, Word::bit_and)?,
        Instruction::Or => binop(ctx, floor, Word::bit_or)?,
        Instruction::Xor => binop(ctx, floor, Word::bit_xor)?,
        Instruction::Not => unop(ctx, floor, Word::bit_not)?,
        Instruction::Pop => {
            ctx.stack.pop(floor)?;
        }
        Instruction::Nop => {}
        Instruction::Rjump(offset) => {
            ctx.pc = jump_to(code, next, offset)?;
            return Ok(None);
        }
        Instruction::Rjumpi(offset) => {
            let cond = ctx.stack.pop(floor)?;
            if !cond.is_zero() {
                ctx.pc = jump_to(code, next, offset)?;
                return Ok(None);
            }
        }
        Instruction::Rjumpv(table) => {
            let case = ctx.stack.pop(floor)?;
            let offset = case
                .as_u64()
                .and_then(|c| usize::try_from(c).ok())
                .and_then(|c| table.get(c));
            if let Some(offset) = offset {
                ctx.pc = jump_to(code, next, offset)?;
                return Ok(None);
            }
        }
        Instruction::Push(bytes) => ctx.stack.push(Word::from_be_slice(bytes))?,
        Instruction::Dup(n) => ctx.stack.dup(floor, n as usize)?,
        Instruction::Swap(n) => ctx.stack.swap(floor, n as usize)?,
        Instruction::Callf(target) => {
            callf(container, host, ctx, target as usize, next, info.gas)?;
            return Ok(None);
        }
        Instruction::Retf => return retf(container, host, ctx, info.gas),
        Instruction::Return | Instruction::Revert => {
            let args = ctx.stack.pop_n(floor, inputs)?;
            let results = host.execute_external(decoded.opcode, &args)?;
            if results.len() != info.outputs as usize {
                return Err(Halt::HostOutputMismatch {
                    opcode: decoded.opcode,
                    expected: info.outputs as usize,
                    actual: results.len(),
                });
            }
            return Ok(Some(if decoded.opcode == op::REVERT {
                Exit::Revert
            } else {
                Exit::Stop
            }));
        }
        Instruction::Invalid => return Err(Halt::InvalidInstruction),
        Instruction::External(opcode) => {
            let args = ctx.stack.pop_n(floor, inputs)?;
            let results = host.execute_external(opcode, &args)?;
            if results.len() != info.outputs as usize {
                return Err(Halt::HostOutputMismatch {
                    opcode,
                    expected: info.outputs as usize,
                    actual: results.len(),
                });
            }
            for v in results {
                ctx.stack.push(v)?;
            }
            if info.terminating {
                return Ok(Some(Exit::Stop));
            }
        }
    }

    ctx.pc = next;
    Ok(None)
}

fn callf<H: Host>(
    container: &Container,
    host: &mut H,
    ctx: &mut ExecutionContext,
    target: usize,
    resume: usize,
    gas: u16,
) -> Result<(), Halt> {
    let callee = *container
        .code_meta(target)
        .ok_or(Halt::CallfTargetOutOfRange { target })?;
    let inputs = callee.inputs as usize;
    ctx.stack.require(ctx.floor(), inputs)?;
    let height = ctx.stack.len();
    if height > ctx.stack.limit().saturating_sub(callee.max_stack_height as usize) {
        return Err(Halt::CallfStackLimit {
            height,
            max_stack_height: callee.max_stack_height,
        });
    }
    if ctx.returns.is_full() {
        return Err(Halt::ReturnStackOverflow {
            limit: ctx.returns.limit(),
        });
    }
    host.charge_gas(gas as u64)?;

    // The callee's floor sits just below its arguments.
    ctx.returns
        .push(ReturnStackFrame::new(ctx.section, resume, height - inputs))?;
    trace!(
        from = ctx.section,
        to = target,
        floor = height - inputs,
        depth = ctx.returns.depth(),
        "CALLF"
    );
    ctx.section = target;
    ctx.pc = 0;
    Ok(())
}

fn retf<H: Host>(
    container: &Container,
    host: &mut H,
    ctx: &mut ExecutionContext,
    gas: u16,
) -> Result<Option<Exit>, Halt> {
    let outputs = container
        .code_meta(ctx.section)
        .map_or(0, |m| m.outputs as usize);
    let expected = ctx.floor() + outputs;
    let actual = ctx.stack.len();
    if actual != expected {
        return Err(Halt::RetfOutputMismatch { expected, actual });
    }
    host.charge_gas(gas as u64)?;

    let frame = ctx.returns.pop().ok_or(Halt::RetfOutputMismatch { expected, actual })?;
    if ctx.returns.is_empty() {
        trace!(section = ctx.section, "RETF from entry frame");
        return Ok(Some(Exit::Stop));
    }
    trace!(
        from = ctx.section,
        to = frame.code_section_index,
        pc = frame.offset,
        depth = ctx.returns.depth(),
        "RETF"
    );
    ctx.section = frame.code_section_index;
    ctx.pc = frame.offset;
    Ok(None)
}
