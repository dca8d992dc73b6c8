use miette::IntoDiagnostic;

use super::input::Input;

/// Print the instructions of every code section
#[derive(clap::Args)]
pub struct Args {
    #[command(flatten)]
    input: Input,

    /// Only decode the layout; do not validate code sections
    #[arg(long)]
    no_validate: bool,
}

impl Args {
    pub fn exec(self) -> miette::Result<()> {
        super::init_tracing(self.input.debug);
        let bytes = self.input.read()?;
        let container = if self.no_validate {
            eof_vm::decode(&bytes).into_diagnostic()?
        } else {
            eof_vm::validate(&bytes).into_diagnostic()?
        };
        print!("{}", eof_vm::disassemble(&container));
        Ok(())
    }
}
