//! Code-section validator.
//!
//! One linear pass per section checks opcode legality, immediates, CALLF targets and type
//! metadata ranges; relative-jump targets are checked against the immediate map afterwards.
//! Sections are independent once the type table is decoded, so they are validated in parallel.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{ValidationError, ValidationErrorKind};
use crate::model::{CodeMeta, Container, MAX_IO, MAX_STACK_HEIGHT};
use crate::vm::instructions::{DecodeError, Instruction};

type VResult<T> = Result<T, ValidationError>;

/// What occupies a byte of the instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteKind {
    Opcode,
    Immediate,
    CallfImmediate,
}

/// Relative jump recorded during the pass, checked once the immediate map is complete.
struct PendingJump {
    at: usize,
    target: isize,
}

fn check_meta(section: usize, meta: &CodeMeta) -> VResult<()> {
    let err = |kind| Err(ValidationError::new(section, 0, kind));
    if section == 0 && (meta.inputs != 0 || meta.outputs != 0) {
        return err(ValidationErrorKind::InvalidEntryType {
            inputs: meta.inputs,
            outputs: meta.outputs,
        });
    }
    if meta.inputs > MAX_IO {
        return err(ValidationErrorKind::InputsOutOfRange { inputs: meta.inputs });
    }
    if meta.outputs > MAX_IO {
        return err(ValidationErrorKind::OutputsOutOfRange { outputs: meta.outputs });
    }
    if meta.max_stack_height > MAX_STACK_HEIGHT {
        return err(ValidationErrorKind::MaxStackHeightOutOfRange {
            height: meta.max_stack_height,
        });
    }
    Ok(())
}

/// Validate code section `section`; `types` is the whole type table, indexed by section.
pub(crate) fn validate_section(section: usize, code: &[u8], types: &[CodeMeta]) -> VResult<()> {
    check_meta(section, &types[section])?;

    let err = |offset, kind| ValidationError::new(section, offset, kind);
    let mut kinds = vec![ByteKind::Opcode; code.len()];
    let mut jumps: Vec<PendingJump> = Vec::new();

    let mut pc = 0;
    while pc < code.len() {
        let decoded = Instruction::decode(code, pc).map_err(|e| match e {
            DecodeError::Undefined(opcode) => {
                err(pc, ValidationErrorKind::UndefinedOpcode { opcode })
            }
            DecodeError::Truncated(opcode) => {
                err(pc, ValidationErrorKind::TruncatedImmediate { opcode })
            }
        })?;
        let next = pc + decoded.len;
        let imm_kind = match decoded.instr {
            Instruction::Callf(_) => ByteKind::CallfImmediate,
            _ => ByteKind::Immediate,
        };
        for k in &mut kinds[pc + 1..next] {
            *k = imm_kind;
        }

        match decoded.instr {
            Instruction::Callf(target) => {
                if target as usize >= types.len() {
                    return Err(err(
                        pc,
                        ValidationErrorKind::CallfTargetOutOfRange {
                            target: target as usize,
                            sections: types.len(),
                        },
                    ));
                }
            }
            Instruction::Rjump(offset) | Instruction::Rjumpi(offset) => {
                jumps.push(PendingJump {
                    at: pc,
                    target: next as isize + offset as isize,
                });
            }
            Instruction::Rjumpv(table) => {
                if table.is_empty() {
                    return Err(err(pc, ValidationErrorKind::EmptyJumpTable));
                }
                for offset in table.iter() {
                    jumps.push(PendingJump {
                        at: pc,
                        target: next as isize + offset as isize,
                    });
                }
            }
            _ => {}
        }
        pc = next;
    }

    for jump in &jumps {
        let target = usize::try_from(jump.target)
            .ok()
            .filter(|&t| t < code.len())
            .ok_or_else(|| {
                err(
                    jump.at,
                    ValidationErrorKind::JumpOutOfBounds {
                        target: jump.target,
                        len: code.len(),
                    },
                )
            })?;
        match kinds[target] {
            ByteKind::Opcode => {}
            ByteKind::CallfImmediate => {
                return Err(err(jump.at, ValidationErrorKind::JumpIntoCallfImmediate { target }))
            }
            ByteKind::Immediate => {
                return Err(err(jump.at, ValidationErrorKind::JumpIntoImmediate { target }))
            }
        }
    }

    Ok(())
}

/// Validate every code section of a decoded container.
///
/// When several sections are invalid, the error of the lowest-indexed one is returned.
pub fn validate_container(container: &Container) -> VResult<()> {
    let types = container.types();
    let verdict = container
        .code_sections()
        .par_iter()
        .enumerate()
        .map(|(i, code)| validate_section(i, code, types))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<VResult<()>>();
    match &verdict {
        Ok(()) => debug!(sections = types.len(), "container valid"),
        Err(e) => debug!(section = e.section, offset = e.offset, error = %e.kind, "container invalid"),
    }
    verdict
}
