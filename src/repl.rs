use std::io::{BufRead, Write};
use crate::compiler::interpreter::Interpreter;

pub const PROMPT: &str = ">> ";

/// Reads one line at a time until end of input. Bindings persist from one line to the next.
pub fn start(mut input: impl BufRead, mut output: impl Write, interpreter: &mut Interpreter) -> std::io::Result<()> {
    let mut line = String::new();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();

        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(());
        }

        if line.trim().is_empty() {
            continue;
        }

        match interpreter.evaluate(&line) {
            Ok(value) => writeln!(output, "{}", value)?,
            Err(errors) => {
                writeln!(output, "Syntax errors:")?;

                for error in &errors.0 {
                    writeln!(output, "    {}", error)?;
                }
            },
        }
    }
}
