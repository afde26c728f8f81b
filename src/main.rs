use std::{path::PathBuf, process};

use clap::{error::ErrorKind, Parser};
use slex::{read_script, run_prompt, Slex, EX_NOINPUT, EX_USAGE};

/// Interpreter for the slex scripting language. Starts an interactive
/// prompt when no script is given.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print every parsed statement to stderr before running it.
    #[arg(long)]
    dump_ast: bool,

    /// Script to run.
    script: Option<PathBuf>,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(EX_USAGE);
        }
    };
    init_tracing();

    match args.script {
        Some(path) => {
            let source = read_script(&path).unwrap_or_else(|e| {
                eprintln!("{e}");
                process::exit(EX_NOINPUT);
            });
            let status = Slex::default().with_ast_dump(args.dump_ast).run(&source);
            process::exit(status.exit_code());
        }
        None => {
            if let Err(e) = run_prompt(args.dump_ast) {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    }
}
