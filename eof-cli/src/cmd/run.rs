use miette::{miette, IntoDiagnostic};

use eof_vm::{BasicHost, ExecutionOutcome, Limits, Vm};

use super::input::Input;

/// Validate a container and execute it from section 0
#[derive(clap::Args)]
pub struct Args {
    #[command(flatten)]
    input: Input,

    /// Gas available to the execution
    #[arg(long, value_name = "GAS")]
    gas_limit: Option<u64>,
}

impl Args {
    pub fn exec(self) -> miette::Result<()> {
        super::init_tracing(self.input.debug);
        let bytes = self.input.read()?;
        let container = eof_vm::validate(&bytes).into_diagnostic()?;

        let mut limits = Limits::default();
        if let Some(gas) = self.gas_limit {
            limits = limits.with_gas_limit(gas);
        }
        let mut host = BasicHost::new(limits.gas_limit);
        match Vm::new(limits).run(&container, &mut host) {
            ExecutionOutcome::Success { stack, gas_used } => {
                println!("success, gas used {gas_used}");
                for (depth, word) in stack.iter().rev().enumerate() {
                    println!("  [{depth}] {word}");
                }
                Ok(())
            }
            ExecutionOutcome::Revert { gas_used } => {
                println!("reverted, gas used {gas_used}");
                Ok(())
            }
            ExecutionOutcome::ExceptionalHalt {
                reason,
                section,
                pc,
                return_depth,
            } => Err(miette!(
                "exceptional halt at {section}:{pc:04x} (return depth {return_depth}): {reason}"
            )),
        }
    }
}
