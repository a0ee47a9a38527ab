// hoax - A small bytecode-compiled Lisp
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use hoax_embed::{Engine, EngineConfig};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

const HISTORY_FILE: &str = ".hoax_history";

const HELP: &str = "\
Enter expressions to compile and run them.
  :help          show this message
  :dis <expr>    show the bytecode for <expr> without running it
  :quit          leave the REPL (so does (quit))";

/// Compile and run Hoax programs, or start an interactive session.
#[derive(Debug, Parser)]
#[command(name = "hoax", version)]
struct Cli {
    /// Source file to run. Starts a REPL when omitted.
    file: Option<PathBuf>,

    /// Evaluate an expression and print the result.
    #[arg(short, long, value_name = "EXPR", conflicts_with = "file")]
    eval: Option<String>,

    /// Print the compiled bytecode instead of running it.
    #[arg(long)]
    disassemble: bool,

    /// Start with instruction tracing on.
    #[arg(long)]
    debug: bool,

    /// Maximum VM stack depth.
    #[arg(long, value_name = "N", default_value_t = hoax_vm::DEFAULT_STACK_SIZE)]
    stack_size: usize,

    /// Number of slots in the global table.
    #[arg(long, value_name = "N", default_value_t = hoax_core::DEFAULT_CAPACITY)]
    globals_capacity: usize,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            stack_size: self.stack_size,
            globals_capacity: self.globals_capacity,
            debug: self.debug,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HOAX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut engine = Engine::with_config(cli.engine_config()).context("cannot start engine")?;

    if let Some(source) = &cli.eval {
        return run_source(&mut engine, source, cli.disassemble);
    }
    match &cli.file {
        Some(path) => run_file(&mut engine, path, cli.disassemble),
        None => run_repl(&mut engine, cli.disassemble),
    }
}

/// Compile and run a whole source string, printing its value.
fn run_source(engine: &mut Engine, source: &str, disassemble: bool) -> anyhow::Result<()> {
    if disassemble {
        print!("{}", engine.disassemble(source)?);
        return Ok(());
    }
    let value = engine.eval(source)?;
    println!("{}", engine.display(&value));
    Ok(())
}

fn run_file(engine: &mut Engine, path: &Path, disassemble: bool) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    run_source(engine, &source, disassemble).with_context(|| format!("in '{}'", path.display()))
}

/// Run the interactive REPL
fn run_repl(engine: &mut Engine, always_disassemble: bool) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new().context("cannot start line editor")?;
    let history = history_path();
    if let Some(path) = &history {
        if let Err(e) = editor.load_history(path) {
            // A missing history file is normal on first run
            if !is_not_found(&e) {
                tracing::warn!(error = %e, "cannot load history");
            }
        }
    }

    println!("Hoax v{} (:help for commands)", env!("CARGO_PKG_VERSION"));

    loop {
        let line = match editor.readline("hoax> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("cannot read input"),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        editor.add_history_entry(input)?;

        match input {
            ":quit" | ":q" => break,
            ":help" | ":h" => {
                println!("{}", HELP);
                continue;
            }
            _ => {}
        }
        if let Some(source) = dis_command(input) {
            match engine.disassemble(source) {
                Ok(listing) => print!("{}", listing),
                Err(e) => eprintln!("{}", e),
            }
            continue;
        }

        if always_disassemble {
            match engine.disassemble(input) {
                Ok(listing) => print!("{}", listing),
                Err(e) => {
                    eprintln!("{}", e);
                    continue;
                }
            }
        }

        match engine.eval_line(input) {
            Ok(Some(evaluation)) => {
                if let Some(listing) = evaluation.disassembly.filter(|_| !always_disassemble) {
                    print!("{}", listing);
                }
                println!("{}", evaluation.value);
                if evaluation.halted {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("{}", e),
        }
    }

    if let Some(path) = &history {
        if let Err(e) = editor.save_history(path) {
            tracing::warn!(error = %e, "cannot save history");
        }
    }
    Ok(())
}

/// The source after a `:dis` command, if `input` is one.
fn dis_command(input: &str) -> Option<&str> {
    input
        .strip_prefix(":dis")
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

fn is_not_found(e: &ReadlineError) -> bool {
    matches!(e, ReadlineError::Io(io) if io.kind() == std::io::ErrorKind::NotFound)
}

fn history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(HISTORY_FILE))
}
