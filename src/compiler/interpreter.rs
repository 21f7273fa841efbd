use std::cell::RefCell;
use std::rc::Rc;
use crate::compiler::ast::Program;
use crate::compiler::environment::Environment;
use crate::compiler::evaluator::{Evaluator, DEFAULT_MAX_DEPTH};
use crate::compiler::lexer::Lexer;
use crate::compiler::object::Object;
use crate::compiler::parser::{Parser, SyntaxErrors};

/// Parses a whole source text. Any syntax error makes the program unusable, so all of them are returned together.
pub fn parse(source: &str) -> Result<Program, SyntaxErrors> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if parser.had_error() {
        Err(SyntaxErrors(parser.into_errors()))
    } else {
        Ok(program)
    }
}

/// Evaluates `source` in a fresh root environment.
pub fn evaluate(source: &str) -> Result<Object, SyntaxErrors> {
    Interpreter::default().evaluate(source)
}

/// The whole pipeline over one root environment that persists across [`Interpreter::evaluate`] calls.
pub struct Interpreter {
    environment: Rc<RefCell<Environment>>,
    evaluator: Evaluator,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new(DEFAULT_MAX_DEPTH)
    }
}

impl Interpreter {
    pub fn new(max_depth: usize) -> Interpreter {
        Interpreter {
            environment: Environment::new_global(),
            evaluator: Evaluator::new(max_depth),
        }
    }

    /// A syntax error means nothing is evaluated. Runtime errors come back as [`Object::Error`].
    pub fn evaluate(&mut self, source: &str) -> Result<Object, SyntaxErrors> {
        let program = parse(source)?;
        Ok(self.evaluator.eval_program(&program, &self.environment))
    }

    pub fn environment(&self) -> &Rc<RefCell<Environment>> {
        &self.environment
    }
}
