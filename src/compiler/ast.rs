use std::fmt::{Display, Formatter};
use std::rc::Rc;
use crate::compiler::lexer::Token;

/// Root of the syntax tree; owns every statement of one parsed source text.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn token_literal(&self) -> &str {
        self.statements.first().map(Stmt::token_literal).unwrap_or("")
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&join(&self.statements, "; "))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Const {
        token: Token,
        name: Token,
        type_annotation: Option<Token>,
        value: Expr,
    },
    Var {
        token: Token,
        name: Token,
        type_annotation: Option<Token>,
        value: Expr,
    },
    Return {
        token: Token,
        value: Option<Expr>,
    },
    Expression {
        token: Token,
        expr: Expr,
    },
}

impl Stmt {
    pub fn token_literal(&self) -> &str {
        match self {
            Stmt::Const { token, .. } | Stmt::Var { token, .. }
            | Stmt::Return { token, .. } | Stmt::Expression { token, .. } => token.source(),
        }
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Const { name, type_annotation, value, .. } =>
                write!(f, "const {}{} = {}", name.source(), render_annotation(type_annotation), value),
            Stmt::Var { name, type_annotation, value, .. } =>
                write!(f, "var {}{} = {}", name.source(), render_annotation(type_annotation), value),
            Stmt::Return { value: Some(value), .. } => write!(f, "return {}", value),
            Stmt::Return { value: None, .. } => f.write_str("return"),
            Stmt::Expression { expr, .. } => write!(f, "{}", expr),
        }
    }
}

fn render_annotation(type_annotation: &Option<Token>) -> String {
    type_annotation.as_ref().map(|token| format!(": {}", token.source())).unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Stmt>,
}

impl BlockStatement {
    pub fn token_literal(&self) -> &str {
        self.token.source()
    }
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.statements.is_empty() {
            f.write_str("{ }")
        } else {
            write!(f, "{{ {} }}", join(&self.statements, "; "))
        }
    }
}

/// A parameter is always introduced by a type marker: `int n`.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub type_token: Token,
    pub name: Token,
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.type_token.source(), self.name.source())
    }
}

/// Shared with every function value created from it, so closures outlive the program that defined them.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionLiteral {
    pub token: Token,
    pub name: Option<Token>,
    pub parameters: Vec<Parameter>,
    pub body: BlockStatement,
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "func{}({}) {}",
               self.name.as_ref().map(|name| format!(" {}", name.source())).unwrap_or_default(),
               join(&self.parameters, ", "), self.body)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Identifier(Token),
    Integer {
        token: Token,
        value: i64,
    },
    Boolean {
        token: Token,
        value: bool,
    },
    String(Token),

    Prefix {
        operator: Token,
        right: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Call {
        token: Token,
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        token: Token,
        receiver: Box<Expr>,
        index: Box<Expr>,
    },
    Array {
        token: Token,
        elements: Vec<Expr>,
    },
    If {
        token: Token,
        condition: Box<Expr>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    Function(Rc<FunctionLiteral>),
}

impl Expr {
    pub fn token_literal(&self) -> &str {
        match self {
            Expr::Identifier(token) | Expr::String(token) => token.source(),
            Expr::Integer { token, .. } | Expr::Boolean { token, .. } => token.source(),
            Expr::Prefix { operator, .. } | Expr::Infix { operator, .. } => operator.source(),
            Expr::Call { token, .. } | Expr::Index { token, .. }
            | Expr::Array { token, .. } | Expr::If { token, .. } => token.source(),
            Expr::Function(function) => function.token.source(),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Identifier(name) => f.write_str(name.source()),
            Expr::Integer { token, .. } | Expr::Boolean { token, .. } => f.write_str(token.source()),
            Expr::String(value) => write!(f, "\"{}\"", value.source()),
            Expr::Prefix { operator, right } => write!(f, "({}{})", operator.source(), right),
            Expr::Infix { left, operator, right } => write!(f, "({} {} {})", left, operator.source(), right),
            Expr::Call { callee, args, .. } => write!(f, "{}({})", callee, join(args, ", ")),
            Expr::Index { receiver, index, .. } => write!(f, "({}[{}])", receiver, index),
            Expr::Array { elements, .. } => write!(f, "[{}]", join(elements, ", ")),
            Expr::If { condition, consequence, alternative, .. } => {
                write!(f, "if ({}) {}", condition, consequence)?;

                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }

                Ok(())
            },
            Expr::Function(function) => write!(f, "{}", function),
        }
    }
}

fn join<T: Display>(items: &[T], separator: &str) -> String {
    items.iter().map(|item| item.to_string()).collect::<Vec<String>>().join(separator)
}
