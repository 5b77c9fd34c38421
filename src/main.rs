//! `cstepper` — a thin, non-interactive front end over the `cstepper`
//! library for scripting/CI use and manual smoke-testing. Reads the
//! source file, runs lex → parse → interpret stage by stage, and
//! prints errors per stage to stderr prefixed `[ERROR]`.

use std::fs;
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use tracing::{info, info_span};

use cstepper::interpreter::{Interpreter, StepResult};
use cstepper::options::{CVersion, Options};
use cstepper::{lexer, parser};

#[derive(Parser)]
#[command(name = "cstepper", about = "Run a C source file through the cstepper interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lex, parse, and run a C source file to completion.
    Run {
        file: String,

        #[arg(long, value_enum, default_value = "c17")]
        c_version: CliCVersion,

        #[arg(long)]
        strict: bool,

        #[arg(long, default_value_t = 10_000)]
        max_steps: u64,

        #[arg(long, default_value_t = 10_000)]
        max_history: usize,

        #[arg(long)]
        detect_leaks: bool,

        #[arg(long)]
        validate_accesses: bool,

        /// Text fed to the program's stdin (`scanf`/`gets`/`getchar`) up front.
        #[arg(long)]
        input: Option<String>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliCVersion {
    C90,
    C99,
    C11,
    C17,
    C23,
}

impl From<CliCVersion> for CVersion {
    fn from(v: CliCVersion) -> Self {
        match v {
            CliCVersion::C90 => CVersion::C90,
            CliCVersion::C99 => CVersion::C99,
            CliCVersion::C11 => CVersion::C11,
            CliCVersion::C17 => CVersion::C17,
            CliCVersion::C23 => CVersion::C23,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let Command::Run { file, c_version, strict, max_steps, max_history, detect_leaks, validate_accesses, input } = cli.command;

    let source = match fs::read_to_string(&file) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("[ERROR] could not read '{file}': {err}");
            return ExitCode::FAILURE;
        }
    };

    let options = Options {
        c_version: c_version.into(),
        strict_mode: strict,
        detect_leaks,
        validate_accesses,
        max_steps,
        max_history,
    };

    let lexed = {
        let _span = info_span!("lex").entered();
        lexer::lex(&source, &file, &options)
    };
    for err in &lexed.errors {
        eprintln!("{err}");
    }

    let parsed = {
        let _span = info_span!("parse").entered();
        parser::parse(&lexed.tokens, &options)
    };
    for err in &parsed.errors {
        eprintln!("{err}");
    }
    for warn in &parsed.warnings {
        eprintln!("{warn}");
    }
    if !lexed.errors.is_empty() || !parsed.errors.is_empty() {
        return ExitCode::FAILURE;
    }

    let mut interp = Interpreter::new(parsed.ast, options, Rc::from(file.as_str()));
    if let Some(text) = &input {
        interp.provide_input(text);
    }

    let report = loop {
        let _span = info_span!("step").entered();
        match interp.run() {
            StepResult::Finished(report) => break report,
            StepResult::Errored(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
            StepResult::NeedsInput => {
                eprintln!("[ERROR] program requested input but none remains");
                return ExitCode::FAILURE;
            }
            StepResult::BreakpointHit | StepResult::Paused => continue,
        }
    };

    print!("{}", interp.consume_output());
    info!(exit_code = report.summary.exit_code, steps = report.statistics.total_steps, "run finished");

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("[ERROR] could not serialise execution report: {err}"),
    }

    if report.summary.errored {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
