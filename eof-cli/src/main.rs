mod cmd;

fn main() -> miette::Result<()> {
    let cli = cmd::Cli::default();

    cli.exec()
}
