use miette::IntoDiagnostic;

use super::input::Input;

/// Decode and validate a container
#[derive(clap::Args)]
pub struct Args {
    #[command(flatten)]
    input: Input,
}

impl Args {
    pub fn exec(self) -> miette::Result<()> {
        super::init_tracing(self.input.debug);
        let bytes = self.input.read()?;
        let container = eof_vm::validate(&bytes).into_diagnostic()?;
        println!(
            "valid: {} code section(s), {} data byte(s)",
            container.num_code_sections(),
            container.data().len()
        );
        Ok(())
    }
}
