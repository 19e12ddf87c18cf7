use std::process::ExitCode;

use clap::Parser;
use intently_cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    intently_util::init_tracing(args.verbose);

    match args.command.execute() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            for cause in error.chain().skip(1) {
                eprintln!("  caused by: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}
