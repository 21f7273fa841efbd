use std::collections::HashMap;
use std::rc::Rc;
use lazy_static::lazy_static;
use crate::compiler::ast::{BlockStatement, Expr, FunctionLiteral, Parameter, Program, Stmt};
use crate::compiler::lexer::{Lexer, Token, TokenPos, TokenType};
use crate::util;


#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

lazy_static! {
    static ref PRECEDENCES: HashMap<TokenType, Precedence> = HashMap::from([
        (TokenType::Equal, Precedence::Equals),
        (TokenType::NotEqual, Precedence::Equals),
        (TokenType::Less, Precedence::LessGreater),
        (TokenType::LessEqual, Precedence::LessGreater),
        (TokenType::Greater, Precedence::LessGreater),
        (TokenType::GreaterEqual, Precedence::LessGreater),
        (TokenType::Plus, Precedence::Sum),
        (TokenType::Minus, Precedence::Sum),
        (TokenType::Multiply, Precedence::Product),
        (TokenType::Divide, Precedence::Product),
        (TokenType::ParenthesisLeft, Precedence::Call),
        (TokenType::SquareBracketLeft, Precedence::Call),
    ]);
}

/// How deeply expressions may nest, counting both recursion and left-associated operator chains.
pub const MAX_NESTING_DEPTH: usize = 1_000;

fn precedence_of(token_type: TokenType) -> Precedence {
    PRECEDENCES.get(&token_type).copied().unwrap_or(Precedence::Lowest)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{pos} Expected {expected}, got {got} instead")]
    ExpectedToken {
        pos: TokenPos,
        expected: TokenType,
        got: String,
    },
    #[error("{pos} No prefix parse function for {got}")]
    NoPrefixParseFn {
        pos: TokenPos,
        got: String,
    },
    #[error("{pos} Illegal character '{character}'")]
    IllegalCharacter {
        pos: TokenPos,
        character: String,
    },
    #[error("{pos} Could not parse {literal} as an integer")]
    InvalidInteger {
        pos: TokenPos,
        literal: String,
    },
    #[error("{pos} Expected a parameter type (int, bool, str or arr), got {got} instead")]
    ExpectedParameterType {
        pos: TokenPos,
        got: String,
    },
    #[error("{pos} Expected a type after ':', got {got} instead")]
    ExpectedType {
        pos: TokenPos,
        got: String,
    },
    #[error("{pos} Duplicate parameter '{name}'")]
    DuplicateParameter {
        pos: TokenPos,
        name: String,
    },
    #[error("{pos} Expression nested more than {limit} levels deep")]
    NestingTooDeep {
        pos: TokenPos,
        limit: usize,
    },
}

/// Every syntax error collected while parsing one source text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", render_errors(.0))]
pub struct SyntaxErrors(pub Vec<ParseError>);

fn render_errors(errors: &[ParseError]) -> String {
    errors.iter().map(|error| error.to_string()).collect::<Vec<String>>().join("\n")
}

type PrefixParseFn<'source> = fn(&mut Parser<'source>) -> Option<Expr>;
type InfixParseFn<'source> = fn(&mut Parser<'source>, Expr) -> Option<Expr>;

pub struct Parser<'source> {
    lexer: Lexer<'source>,
    current: Token, peek: Token,
    depth: usize,

    errors: Vec<ParseError>,
    too_deep: bool,
}

impl<'source> Parser<'source> {
    pub fn new(mut lexer: Lexer<'source>) -> Parser<'source> {
        let current = lexer.next_token();
        let peek = lexer.next_token();

        Parser {
            lexer,
            current, peek,
            depth: 0,
            errors: Vec::new(),
            too_deep: false,
        }
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// Parses the whole input. A statement that fails to parse is dropped and parsing resumes after it,
    /// so [`Parser::errors`] holds every syntax error, not only the first.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.current_is(TokenType::Eof) {
            if !self.current_is(TokenType::Semicolon) {
                if let Some(stmt) = self.parse_statement() {
                    program.statements.push(stmt);
                }
            }

            self.next_token();
        }

        program
    }

    // Statement parsing

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.current.token_type() {
            TokenType::Const | TokenType::Var => self.parse_declaration(),
            TokenType::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_declaration(&mut self) -> Option<Stmt> {
        let token = self.current.clone();

        self.expect_peek(TokenType::Identifier)?;
        let name = self.current.clone();

        let type_annotation = if self.peek_is(TokenType::Colon) {
            self.next_token();

            if !self.peek.token_type().is_type_marker() {
                let error = ParseError::ExpectedType { pos: *self.peek.start(), got: self.peek.to_string() };
                self.error(error);
                return None;
            }

            self.next_token();
            Some(self.current.clone())
        } else {
            None
        };

        self.expect_peek(TokenType::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(if token.token_type() == TokenType::Const {
            Stmt::Const { token, name, type_annotation, value }
        } else {
            Stmt::Var { token, name, type_annotation, value }
        })
    }

    fn parse_return_statement(&mut self) -> Option<Stmt> {
        let token = self.current.clone();

        if self.peek_is(TokenType::Semicolon) || self.peek_is(TokenType::BracketRight)
            || self.peek_is(TokenType::Else) || self.peek_is(TokenType::Eof) {
            self.skip_semicolon();
            return Some(Stmt::Return { token, value: None });
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(Stmt::Return { token, value: Some(value) })
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let token = self.current.clone();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(Stmt::Expression { token, expr })
    }

    /// Expects the current token to be `{`; stops on the matching `}`.
    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        let token = self.current.clone();
        let mut statements = Vec::new();

        self.next_token();

        while !self.current_is(TokenType::BracketRight) {
            if self.current_is(TokenType::Eof) {
                let error = ParseError::ExpectedToken {
                    pos: *self.current.start(), expected: TokenType::BracketRight, got: self.current.to_string(),
                };
                self.error(error);
                return None;
            }

            if !self.current_is(TokenType::Semicolon) {
                if let Some(stmt) = self.parse_statement() {
                    statements.push(stmt);
                }
            }

            self.next_token();
        }

        Some(BlockStatement { token, statements })
    }

    /// A `{ }` block, or a single statement that becomes a block of its own.
    fn parse_branch(&mut self) -> Option<BlockStatement> {
        self.next_token();

        if self.current_is(TokenType::BracketLeft) {
            return self.parse_block_statement();
        }

        let token = self.current.clone();
        let stmt = self.parse_statement()?;

        Some(BlockStatement { token, statements: vec![stmt] })
    }

    // Expression parsing

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let depth = self.depth;

        let expr = util::ensure_sufficient_stack(|| {
            self.enter_nesting()?;

            let prefix = match Self::prefix_parse_fn(self.current.token_type()) {
                Some(prefix) => prefix,
                None => {
                    self.no_prefix_parse_fn_error();
                    return None;
                },
            };

            let mut left = prefix(self)?;

            while !self.peek_is(TokenType::Eof) && precedence < self.peek_precedence() {
                let infix = match Self::infix_parse_fn(self.peek.token_type()) {
                    Some(infix) => infix,
                    None => return Some(left),
                };

                // Each operator applied in this loop wraps `left` one level deeper
                self.enter_nesting()?;

                self.next_token();
                left = infix(self, left)?;
            }

            Some(left)
        });

        self.depth = depth;
        expr
    }

    /// Past the limit the rest of the input is skipped, since no statement boundary can be trusted.
    fn enter_nesting(&mut self) -> Option<()> {
        self.depth += 1;

        if self.depth <= MAX_NESTING_DEPTH {
            return Some(());
        }

        self.error(ParseError::NestingTooDeep { pos: *self.current.start(), limit: MAX_NESTING_DEPTH });
        self.too_deep = true;

        while !self.current_is(TokenType::Eof) {
            self.next_token();
        }

        None
    }

    fn prefix_parse_fn(token_type: TokenType) -> Option<PrefixParseFn<'source>> {
        match token_type {
            TokenType::Identifier => Some(Self::parse_identifier),
            TokenType::Int => Some(Self::parse_integer_literal),
            TokenType::String => Some(Self::parse_string_literal),
            TokenType::True | TokenType::False => Some(Self::parse_boolean),
            TokenType::Not | TokenType::Minus => Some(Self::parse_prefix_expression),
            TokenType::ParenthesisLeft => Some(Self::parse_grouped_expression),
            TokenType::SquareBracketLeft => Some(Self::parse_array_literal),
            TokenType::If => Some(Self::parse_if_expression),
            TokenType::Function => Some(Self::parse_function_literal),
            _ => None,
        }
    }

    fn infix_parse_fn(token_type: TokenType) -> Option<InfixParseFn<'source>> {
        match token_type {
            TokenType::Plus | TokenType::Minus | TokenType::Multiply | TokenType::Divide
            | TokenType::Equal | TokenType::NotEqual
            | TokenType::Less | TokenType::LessEqual
            | TokenType::Greater | TokenType::GreaterEqual => Some(Self::parse_infix_expression),
            TokenType::ParenthesisLeft => Some(Self::parse_call_expression),
            TokenType::SquareBracketLeft => Some(Self::parse_index_expression),
            _ => None,
        }
    }

    fn parse_identifier(&mut self) -> Option<Expr> {
        Some(Expr::Identifier(self.current.clone()))
    }

    fn parse_integer_literal(&mut self) -> Option<Expr> {
        let token = self.current.clone();

        match token.source().parse::<i64>() {
            Ok(value) => Some(Expr::Integer { token, value }),
            Err(_) => {
                self.error(ParseError::InvalidInteger { pos: *token.start(), literal: token.source().to_owned() });
                None
            },
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expr> {
        Some(Expr::String(self.current.clone()))
    }

    fn parse_boolean(&mut self) -> Option<Expr> {
        Some(Expr::Boolean { token: self.current.clone(), value: self.current_is(TokenType::True) })
    }

    fn parse_prefix_expression(&mut self) -> Option<Expr> {
        let operator = self.current.clone();
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expr::Prefix { operator, right: Box::new(right) })
    }

    fn parse_infix_expression(&mut self, left: Expr) -> Option<Expr> {
        let operator = self.current.clone();
        let precedence = self.current_precedence();
        self.next_token();

        let right = self.parse_expression(precedence)?;
        Some(Expr::Infix { left: Box::new(left), operator, right: Box::new(right) })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expr> {
        self.next_token();

        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::ParenthesisRight)?;

        Some(expr)
    }

    fn parse_array_literal(&mut self) -> Option<Expr> {
        let token = self.current.clone();
        let elements = self.parse_expression_list(TokenType::SquareBracketRight)?;

        Some(Expr::Array { token, elements })
    }

    fn parse_call_expression(&mut self, callee: Expr) -> Option<Expr> {
        let token = self.current.clone();
        let args = self.parse_expression_list(TokenType::ParenthesisRight)?;

        Some(Expr::Call { token, callee: Box::new(callee), args })
    }

    fn parse_index_expression(&mut self, receiver: Expr) -> Option<Expr> {
        let token = self.current.clone();
        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::SquareBracketRight)?;

        Some(Expr::Index { token, receiver: Box::new(receiver), index: Box::new(index) })
    }

    /// Comma-separated expressions up to `end`; the current token is the opening delimiter.
    fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expr>> {
        let mut list = Vec::new();

        if self.peek_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Some(list)
    }

    fn parse_if_expression(&mut self) -> Option<Expr> {
        let token = self.current.clone();

        self.expect_peek(TokenType::ParenthesisLeft)?;
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::ParenthesisRight)?;

        let consequence = self.parse_branch()?;

        let alternative = if self.peek_is(TokenType::Else) {
            self.next_token();
            Some(self.parse_branch()?)
        } else {
            None
        };

        Some(Expr::If { token, condition: Box::new(condition), consequence, alternative })
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        let token = self.current.clone();

        let name = if self.peek_is(TokenType::Identifier) {
            self.next_token();
            Some(self.current.clone())
        } else {
            None
        };

        self.expect_peek(TokenType::ParenthesisLeft)?;
        let parameters = self.parse_function_parameters()?;

        let body = if self.peek_is(TokenType::Arrow) {
            self.next_token();
            let arrow = self.current.clone();
            self.next_token();

            // `-> expr` is shorthand for `{ return expr }`
            let value = self.parse_expression(Precedence::Lowest)?;
            let return_token = Token::synthetic(TokenType::Return, "return", *arrow.start());

            BlockStatement { token: arrow, statements: vec![Stmt::Return { token: return_token, value: Some(value) }] }
        } else {
            self.expect_peek(TokenType::BracketLeft)?;
            self.parse_block_statement()?
        };

        Some(Expr::Function(Rc::new(FunctionLiteral { token, name, parameters, body })))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Parameter>> {
        let mut parameters: Vec<Parameter> = Vec::new();

        if self.peek_is(TokenType::ParenthesisRight) {
            self.next_token();
            return Some(parameters);
        }

        loop {
            self.next_token();

            if !self.current.token_type().is_type_marker() {
                let error = ParseError::ExpectedParameterType { pos: *self.current.start(), got: self.current.to_string() };
                self.error(error);
                return None;
            }

            let type_token = self.current.clone();
            self.expect_peek(TokenType::Identifier)?;
            let name = self.current.clone();

            if parameters.iter().any(|parameter| parameter.name.source() == name.source()) {
                self.error(ParseError::DuplicateParameter { pos: *name.start(), name: name.source().to_owned() });
            }

            parameters.push(Parameter { type_token, name });

            if !self.peek_is(TokenType::Comma) {
                break;
            }

            self.next_token();
        }

        self.expect_peek(TokenType::ParenthesisRight)?;
        Some(parameters)
    }

    // Token handling

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    #[inline]
    fn current_is(&self, token_type: TokenType) -> bool {
        self.current.token_type() == token_type
    }

    #[inline]
    fn peek_is(&self, token_type: TokenType) -> bool {
        self.peek.token_type() == token_type
    }

    fn expect_peek(&mut self, token_type: TokenType) -> Option<()> {
        if self.peek_is(token_type) {
            self.next_token();
            return Some(());
        }

        let error = ParseError::ExpectedToken { pos: *self.peek.start(), expected: token_type, got: self.peek.to_string() };
        self.error(error);
        None
    }

    fn skip_semicolon(&mut self) {
        if self.peek_is(TokenType::Semicolon) {
            self.next_token();
        }
    }

    fn current_precedence(&self) -> Precedence {
        precedence_of(self.current.token_type())
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.token_type())
    }

    // Error handling

    fn no_prefix_parse_fn_error(&mut self) {
        let error = if self.current_is(TokenType::Illegal) {
            ParseError::IllegalCharacter { pos: *self.current.start(), character: self.current.source().to_owned() }
        } else {
            ParseError::NoPrefixParseFn { pos: *self.current.start(), got: self.current.to_string() }
        };

        self.error(error);
    }

    fn error(&mut self, error: ParseError) {
        // Enclosing constructs fail one after another once the input has been skipped
        if self.too_deep {
            return;
        }

        tracing::debug!(%error, "syntax error");
        self.errors.push(error);
    }
}
