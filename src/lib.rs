pub mod util;
pub mod compiler;
pub mod repl;

use std::path::PathBuf;
use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;
use crate::compiler::evaluator::DEFAULT_MAX_DEPTH;
use crate::compiler::object::{Object, RuntimeError};
use crate::compiler::parser::SyntaxErrors;

pub use crate::compiler::interpreter::{evaluate, parse, Interpreter};

#[derive(ClapParser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    #[clap(help = "Program file to run; starts an interactive session if omitted")]
    pub input: Option<PathBuf>,
    #[clap(long, default_value_t = DEFAULT_MAX_DEPTH, help = "Maximum depth of nested function calls")]
    pub max_depth: usize,
    #[clap(long, help = "Print the parsed program instead of running it")]
    pub print_ast: bool,

    #[clap(short, long, help = "Print verbose log output")]
    pub verbose: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("Syntax errors:\n{0}")]
    Syntax(#[from] SyntaxErrors),
    #[error("ERROR: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(config: &Config) -> Result<(), Error> {
    let mut interpreter = Interpreter::new(config.max_depth);

    let path = match &config.input {
        Some(path) => path,
        None => {
            let stdin = std::io::stdin();
            repl::start(stdin.lock(), std::io::stdout(), &mut interpreter)?;
            return Ok(());
        },
    };

    tracing::info!(path = %path.display(), "loading program");
    let source = std::fs::read_to_string(path)?;

    if config.print_ast {
        let program = parse(&source)?;

        for stmt in &program.statements {
            println!("{}", stmt);
        }

        return Ok(());
    }

    match interpreter.evaluate(&source)? {
        Object::Error(error) => Err(Error::Runtime(error)),
        Object::Null => Ok(()),
        value => {
            println!("{}", value);
            Ok(())
        },
    }
}
