use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::exit,
};

use anyhow::Context;
use auld::{codec::Console, Error, Script};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// Exit codes
const FATAL_USAGE: i32 = 1;
const FATAL_READ: i32 = 2;
const FATAL_RUN: i32 = 4;
const FATAL_INPUT: i32 = 5;

#[derive(Parser)]
#[command(name = "auld", about = "Run an Auld Lang Syne script")]
struct Cli {
    /// Script to run.
    script: PathBuf,

    /// Prompt printed before each line of input is read.
    #[arg(long, default_value = Console::DEFAULT_PROMPT)]
    prompt: String,

    /// Log the tape after every instruction.
    #[arg(long)]
    trace: bool,
}

/// Logs go to stderr so they never mix with the script output. `Kevlin`
/// tape dumps are logged at info and show up without `RUST_LOG`.
fn init_logging(trace: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if trace { "auld=trace" } else { "warn,auld=info" })
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            exit(FATAL_USAGE);
        }
        Err(e) => {
            let _ = e.print();
            exit(0);
        }
    };

    init_logging(cli.trace);

    let program = match fs::read_to_string(&cli.script)
        .with_context(|| format!("failed to read {}", cli.script.display()))
    {
        Ok(program) => program,
        Err(e) => fail(FATAL_READ, e),
    };

    let mut script = Script::load(&program)
        .with_console(Console::stdio().with_prompt(cli.prompt))
        .with_debug(cli.trace);

    let result = script.run();

    // Whatever was printed before a failure is still shown.
    print!("{}", script.output());
    let _ = io::stdout().flush();

    if let Err(e) = result {
        let code = match e {
            Error::Input(_) => FATAL_INPUT,
            Error::InvalidAllocation { .. } | Error::Syntax { .. } => FATAL_RUN,
        };
        fail(code, e.into());
    }
}

fn fail(code: i32, err: anyhow::Error) -> ! {
    eprintln!("{:#}", err);
    exit(code);
}
