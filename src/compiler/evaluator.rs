use std::cell::RefCell;
use std::rc::Rc;
use crate::compiler::ast::{BlockStatement, Expr, Program, Stmt};
use crate::compiler::builtins::Builtin;
use crate::compiler::environment::Environment;
use crate::compiler::lexer::{Token, TokenType};
use crate::compiler::object::{Function, Object, RuntimeError, NULL};
use crate::util;

#[cfg(test)]
mod tests;

pub const DEFAULT_MAX_DEPTH: usize = 10_000;

type EvalResult = Result<Object, Flow>;
type Env = Rc<RefCell<Environment>>;

/// Anything that unwinds evaluation past the expression being evaluated.
#[derive(Debug)]
enum Flow {
    /// A `return` on its way to the enclosing call, or to the end of the program.
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Flow {
    fn from(error: RuntimeError) -> Self {
        Flow::Error(error)
    }
}

pub struct Evaluator {
    depth: usize, max_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new(DEFAULT_MAX_DEPTH)
    }
}

impl Evaluator {
    pub fn new(max_depth: usize) -> Evaluator {
        Evaluator {
            depth: 0, max_depth,
        }
    }

    /// Evaluates every statement in order. A top-level `return` ends the program early with its value.
    ///
    /// Runtime errors are returned as [`Object::Error`]; the first one aborts the whole program.
    pub fn eval_program(&mut self, program: &Program, env: &Env) -> Object {
        self.depth = 0;

        match self.eval_statements(&program.statements, env) {
            Ok(value) | Err(Flow::Return(value)) => value,
            Err(Flow::Error(error)) => {
                tracing::debug!(%error, "runtime error");
                Object::Error(error)
            },
        }
    }

    fn eval_statements(&mut self, statements: &[Stmt], env: &Env) -> EvalResult {
        let mut result = NULL;

        for stmt in statements {
            result = self.eval_statement(stmt, env)?;
        }

        Ok(result)
    }

    fn eval_block(&mut self, block: &BlockStatement, env: &Env) -> EvalResult {
        self.eval_statements(&block.statements, env)
    }

    fn eval_statement(&mut self, stmt: &Stmt, env: &Env) -> EvalResult {
        match stmt {
            Stmt::Const { name, value, .. } | Stmt::Var { name, value, .. } => {
                let value = self.eval_expression(value, env)?;
                Ok(env.borrow_mut().set(name.source().to_owned(), value))
            },
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.eval_expression(value, env)?,
                    None => NULL,
                };

                Err(Flow::Return(value))
            },
            Stmt::Expression { expr, .. } => self.eval_expression(expr, env),
        }
    }

    fn eval_expression(&mut self, expr: &Expr, env: &Env) -> EvalResult {
        util::ensure_sufficient_stack(|| match expr {
            Expr::Identifier(name) => Ok(Self::eval_identifier(name, env)?),
            Expr::Integer { value, .. } => Ok(Object::Integer(*value)),
            Expr::Boolean { value, .. } => Ok(Object::from_bool(*value)),
            Expr::String(value) => Ok(Object::String(Rc::from(value.source()))),

            Expr::Prefix { operator, right } => {
                let right = self.eval_expression(right, env)?;
                Ok(Self::eval_prefix_expression(operator, right)?)
            },
            Expr::Infix { left, operator, right } => {
                let left = self.eval_expression(left, env)?;
                let right = self.eval_expression(right, env)?;
                Ok(Self::eval_infix_expression(operator, left, right)?)
            },
            Expr::If { condition, consequence, alternative, .. } => {
                let condition = self.eval_expression(condition, env)?;

                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Ok(NULL)
                }
            },
            Expr::Function(literal) => {
                let function = Object::Function(Rc::new(Function { literal: Rc::clone(literal), env: Rc::clone(env) }));

                // A named function can refer to itself through the scope it captured
                if let Some(name) = &literal.name {
                    env.borrow_mut().set(name.source().to_owned(), function.clone());
                }

                Ok(function)
            },
            Expr::Call { callee, args, .. } => {
                let callee = self.eval_expression(callee, env)?;
                let args = self.eval_expressions(args, env)?;

                self.apply_function(callee, args)
            },
            Expr::Array { elements, .. } => Ok(Object::Array(Rc::new(self.eval_expressions(elements, env)?))),
            Expr::Index { receiver, index, .. } => {
                let receiver = self.eval_expression(receiver, env)?;
                let index = self.eval_expression(index, env)?;

                Ok(Self::eval_index_expression(receiver, index)?)
            },
        })
    }

    /// Left to right, stopping at the first error.
    fn eval_expressions(&mut self, exprs: &[Expr], env: &Env) -> Result<Vec<Object>, Flow> {
        exprs.iter().map(|expr| self.eval_expression(expr, env)).collect()
    }

    fn eval_identifier(name: &Token, env: &Env) -> Result<Object, RuntimeError> {
        env.borrow().get(name.source())
            .or_else(|| Builtin::lookup(name.source()).map(Object::Builtin))
            .ok_or_else(|| RuntimeError::UnknownIdentifier(name.source().to_owned()))
    }

    fn eval_prefix_expression(operator: &Token, right: Object) -> Result<Object, RuntimeError> {
        match (operator.token_type(), right) {
            (TokenType::Not, right) => Ok(Object::from_bool(!right.is_truthy())),
            (TokenType::Minus, Object::Integer(value)) => Ok(Object::Integer(value.wrapping_neg())),
            (_, right) => Err(RuntimeError::UnknownPrefixOperator {
                operator: operator.source().to_owned(), operand: right.type_name(),
            }),
        }
    }

    fn eval_infix_expression(operator: &Token, left: Object, right: Object) -> Result<Object, RuntimeError> {
        match (&left, &right) {
            (Object::Integer(left), Object::Integer(right)) => Self::eval_integer_infix_expression(operator, *left, *right),
            _ => match operator.token_type() {
                TokenType::Equal => Ok(Object::from_bool(left == right)),
                TokenType::NotEqual => Ok(Object::from_bool(left != right)),
                _ if left.type_name() != right.type_name() => Err(RuntimeError::TypeMismatch {
                    left: left.type_name(), operator: operator.source().to_owned(), right: right.type_name(),
                }),
                _ => Err(RuntimeError::UnknownInfixOperator {
                    left: left.type_name(), operator: operator.source().to_owned(), right: right.type_name(),
                }),
            },
        }
    }

    fn eval_integer_infix_expression(operator: &Token, left: i64, right: i64) -> Result<Object, RuntimeError> {
        Ok(match operator.token_type() {
            TokenType::Plus => Object::Integer(left.wrapping_add(right)),
            TokenType::Minus => Object::Integer(left.wrapping_sub(right)),
            TokenType::Multiply => Object::Integer(left.wrapping_mul(right)),
            TokenType::Divide => {
                if right == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }

                Object::Integer(left.wrapping_div(right))
            },
            TokenType::Less => Object::from_bool(left < right),
            TokenType::LessEqual => Object::from_bool(left <= right),
            TokenType::Greater => Object::from_bool(left > right),
            TokenType::GreaterEqual => Object::from_bool(left >= right),
            TokenType::Equal => Object::from_bool(left == right),
            TokenType::NotEqual => Object::from_bool(left != right),
            _ => return Err(RuntimeError::UnknownInfixOperator {
                left: "INTEGER", operator: operator.source().to_owned(), right: "INTEGER",
            }),
        })
    }

    fn eval_index_expression(receiver: Object, index: Object) -> Result<Object, RuntimeError> {
        match (&receiver, &index) {
            (Object::Array(elements), Object::Integer(index)) => Ok(usize::try_from(*index).ok()
                .and_then(|index| elements.get(index))
                .cloned()
                .unwrap_or(NULL)),
            _ => Err(RuntimeError::UnsupportedIndex { receiver: receiver.type_name(), index: index.type_name() }),
        }
    }

    fn apply_function(&mut self, callee: Object, args: Vec<Object>) -> EvalResult {
        let function = match callee {
            Object::Function(function) => function,
            Object::Builtin(builtin) => {
                tracing::trace!(builtin = builtin.name(), args = args.len(), "calling builtin");
                return Ok(builtin.call(args)?);
            },
            other => return Err(RuntimeError::NotAFunction(other.type_name()).into()),
        };

        // Checked before anything is bound in the new scope
        if args.len() != function.arity() {
            return Err(RuntimeError::ArityMismatch { expected: function.arity(), got: args.len() }.into());
        }

        if self.depth >= self.max_depth {
            return Err(RuntimeError::MaxCallDepth(self.max_depth).into());
        }

        tracing::trace!(function = function.name().unwrap_or("<anonymous>"), args = args.len(), depth = self.depth, "calling function");

        let call_env = Environment::new_enclosed(Rc::clone(&function.env));

        {
            let mut call_env = call_env.borrow_mut();

            for (parameter, arg) in function.literal.parameters.iter().zip(args) {
                call_env.set(parameter.name.source().to_owned(), arg);
            }
        }

        self.depth += 1;
        let result = self.eval_block(&function.literal.body, &call_env);
        self.depth -= 1;

        match result {
            Ok(value) | Err(Flow::Return(value)) => Ok(value),
            Err(error) => Err(error),
        }
    }
}
