//! Command line entry point for the pasc compiler.
mod cli;
mod logger;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pascc", about = "Compiler for the pasc language", version)]
struct Args {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Compiles a source file into IR text for the native backend
    Build {
        /// The source file to compile
        file: PathBuf,
        /// Where to write the IR; defaults to the source path with the
        /// extension replaced by .ll
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Verbosity; repeat for more detail
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,
    },
    /// Checks a source file without writing any output
    Check {
        /// The source file to check
        file: PathBuf,
        /// Verbosity; repeat for more detail
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,
    },
}

fn main() {
    let args = Args::parse();
    let result = match args.action {
        Action::Build {
            file,
            output,
            verbose,
        } => logger::configure(verbose).and_then(|_| cli::build(&file, output.as_deref())),
        Action::Check { file, verbose } => {
            logger::configure(verbose).and_then(|_| cli::check(&file))
        }
    };
    if let Err(message) = result {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}
