//! Sincecheck CLI entry point.

use clap::Parser;
use sincecheck::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.global.verbose, cli.global.quiet);
    sincecheck::init();

    let exit_code = match &cli.command {
        Commands::Build(args) => match cli::run_build(args, &cli.global) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_ERROR
            }
        },
        Commands::Detect(args) => match cli::run_detect(args, &cli.global) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_ERROR
            }
        },
    };

    std::process::exit(exit_code);
}
