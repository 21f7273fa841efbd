pub mod ast;
pub mod lexer;
pub mod parser;
pub mod object;
pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod interpreter;
