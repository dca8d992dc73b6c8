use clap::Parser;
use tracing::Level;

mod disasm;
mod input;
mod run;
mod validate;

/// Validate, disassemble and run EOF containers
#[derive(Parser)]
#[clap(version, about)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

impl Default for Cli {
    fn default() -> Self {
        Self::parse()
    }
}

impl Cli {
    pub fn exec(self) -> miette::Result<()> {
        self.cmd.exec()
    }
}

#[derive(clap::Subcommand)]
pub enum Cmd {
    Validate(validate::Args),
    Disasm(disasm::Args),
    Run(run::Args),
}

impl Cmd {
    pub fn exec(self) -> miette::Result<()> {
        match self {
            Cmd::Validate(args) => args.exec(),
            Cmd::Disasm(args) => args.exec(),
            Cmd::Run(args) => args.exec(),
        }
    }
}

pub(crate) fn init_tracing(debug: bool) {
    let level = if debug { Level::TRACE } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_max_level(level)
        .try_init();
}
