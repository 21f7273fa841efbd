use std::cell::RefCell;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use crate::compiler::ast::FunctionLiteral;
use crate::compiler::builtins::Builtin;
use crate::compiler::environment::Environment;

pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
pub const NULL: Object = Object::Null;

/// Runtime values.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
    Null,
    Array(Rc<Vec<Object>>),
    Function(Rc<Function>),
    Builtin(Builtin),
    Error(RuntimeError),
}

impl Object {
    pub fn from_bool(value: bool) -> Object {
        if value { TRUE } else { FALSE }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::String(_) => "STRING",
            Object::Null => "NULL",
            Object::Array(_) => "ARRAY",
            Object::Function(_) => "FUNCTION",
            Object::Builtin(_) => "BUILTIN",
            Object::Error(_) => "ERROR",
        }
    }

    /// `null` and `false` are falsy, everything else (including `0`) is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => f.write_str(value),
            Object::Null => f.write_str("null"),
            Object::Array(elements) => {
                f.write_str("[")?;

                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }

                    match element {
                        Object::String(value) => write!(f, "\"{}\"", value)?,
                        element => write!(f, "{}", element)?,
                    }
                }

                f.write_str("]")
            },
            Object::Function(function) => write!(f, "{}", function.literal),
            Object::Builtin(builtin) => write!(f, "builtin function {}", builtin.name()),
            Object::Error(error) => write!(f, "ERROR: {}", error),
        }
    }
}

/// A closure: the function literal together with the environment it was defined in.
pub struct Function {
    pub literal: Rc<FunctionLiteral>,
    pub env: Rc<RefCell<Environment>>,
}

impl Function {
    pub fn name(&self) -> Option<&str> {
        self.literal.name.as_ref().map(|name| name.source())
    }

    pub fn arity(&self) -> usize {
        self.literal.parameters.len()
    }
}

// Two function values are the same function if they come from the same literal
// evaluated in the same environment
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.literal, &other.literal) && Rc::ptr_eq(&self.env, &other.env)
    }
}

// The environment can reach the function again through its bindings
impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    UnknownIdentifier(String),
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: &'static str,
        operator: String,
        right: &'static str,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: &'static str,
        operator: String,
        right: &'static str,
    },
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: String,
        operand: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    ArityMismatch {
        expected: usize,
        got: usize,
    },
    #[error("not a function: {0}")]
    NotAFunction(&'static str),
    #[error("index operator not supported: {receiver}[{index}]")]
    UnsupportedIndex {
        receiver: &'static str,
        index: &'static str,
    },
    #[error("argument to `{builtin}` not supported, got {got}")]
    BuiltinArgument {
        builtin: &'static str,
        got: &'static str,
    },
    #[error("maximum call depth of {0} exceeded")]
    MaxCallDepth(usize),
}
