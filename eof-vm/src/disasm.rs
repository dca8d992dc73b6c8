//! Text disassembly of a decoded container.
//!
//! One line per instruction, `section:offset  NAME immediates`. Relative jumps show their
//! resolved absolute target. Disassembly is best-effort: a byte that does not decode is printed
//! as `.byte` and the rest of that section is dumped raw.

use core::fmt;

use crate::model::Container;
use crate::vm::instructions::{relative_target, Instruction};

/// Displayable view over a container.
#[derive(Debug, Clone, Copy)]
pub struct Disassembly<'a> {
    container: &'a Container,
}

impl<'a> Disassembly<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }
}

#[must_use]
pub fn disassemble(container: &Container) -> String {
    Disassembly::new(container).to_string()
}

fn fmt_target(f: &mut fmt::Formatter<'_>, next: usize, offset: i16) -> fmt::Result {
    match relative_target(next, offset) {
        Some(t) => write!(f, " {offset:+} -> {t:#06x}"),
        None => write!(f, " {offset:+} -> <before start>"),
    }
}

fn fmt_section(f: &mut fmt::Formatter<'_>, section: usize, code: &[u8]) -> fmt::Result {
    let mut pc = 0;
    while pc < code.len() {
        let decoded = match Instruction::decode(code, pc) {
            Ok(d) => d,
            Err(_) => {
                for (at, b) in code.iter().enumerate().skip(pc) {
                    writeln!(f, "{section}:{at:04x}  .byte {b:#04x}")?;
                }
                return Ok(());
            }
        };
        write!(f, "{section}:{pc:04x}  ")?;
        let next = pc + decoded.len;
        f.write_str(decoded.info.name)?;
        match decoded.instr {
            Instruction::Push(bytes) if !bytes.is_empty() => {
                f.write_str(" 0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
            }
            Instruction::Callf(target) => write!(f, " {target}")?,
            Instruction::Rjump(off) | Instruction::Rjumpi(off) => fmt_target(f, next, off)?,
            Instruction::Rjumpv(table) => {
                write!(f, " {}", table.len())?;
                for off in table.iter() {
                    fmt_target(f, next, off)?;
                }
            }
            _ => {}
        }
        writeln!(f)?;
        pc = next;
    }
    Ok(())
}

impl fmt::Display for Disassembly<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.container;
        for (i, (meta, code)) in c.types().iter().zip(c.code_sections()).enumerate() {
            writeln!(
                f,
                "section {i} (inputs {}, outputs {}, max_stack_height {})",
                meta.inputs, meta.outputs, meta.max_stack_height
            )?;
            fmt_section(f, i, code)?;
        }
        writeln!(f, "data: {} bytes", c.data().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::sections::parse_container;
    use crate::model::{CodeMeta, ContainerBuilder};
    use crate::vm::instructions::op;

    #[test]
    fn lists_instructions_with_targets() {
        let bytes = ContainerBuilder::new()
            .code(
                CodeMeta::new(0, 0, 1),
                vec![op::PUSH1, 0x2A, op::RJUMPI, 0xFF, 0xFB, op::CALLF, 0x00, 0x01, op::STOP],
            )
            .code(CodeMeta::new(0, 0, 0), vec![op::RETF])
            .data(vec![1, 2])
            .build();
        let c = parse_container(&bytes).unwrap();
        let text = disassemble(&c);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "section 0 (inputs 0, outputs 0, max_stack_height 1)",
                "0:0000  PUSH1 0x2a",
                "0:0002  RJUMPI -5 -> 0x0000",
                "0:0005  CALLF 1",
                "0:0008  STOP",
                "section 1 (inputs 0, outputs 0, max_stack_height 0)",
                "1:0000  RETF",
                "data: 2 bytes",
            ]
        );
    }

    #[test]
    fn undecodable_tail_is_dumped() {
        let bytes = ContainerBuilder::new()
            .code(CodeMeta::default(), vec![op::NOP, op::JUMP, op::PUSH2, 0x01])
            .build();
        let c = parse_container(&bytes).unwrap();
        let text = disassemble(&c);
        assert!(text.contains("0:0000  NOP\n"));
        assert!(text.contains("0:0001  .byte 0x56\n0:0002  .byte 0x61\n0:0003  .byte 0x01\n"));
    }
}
