use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::Chars;
use lazy_static::lazy_static;
use crate::util;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenPos {
    pub line: i32,
    pub column: i32,
}

impl TokenPos {
    pub fn new(line: i32, column: i32) -> TokenPos {
        TokenPos { line, column }
    }

    pub fn begin() -> TokenPos {
        TokenPos::new(1, 1)
    }
}

impl Display for TokenPos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {} column {}]", self.line, self.column)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenType {
    Illegal,

    ParenthesisLeft, ParenthesisRight,
    BracketLeft, BracketRight,
    SquareBracketLeft, SquareBracketRight,
    Comma, Semicolon, Colon,
    Arrow,

    Assign, Equal,
    Not, NotEqual,
    Greater, GreaterEqual,
    Less, LessEqual,

    Plus, Minus,
    Multiply, Divide,

    Identifier,
    Int,
    String,

    // Keywords
    Const, Var,
    Function,
    Return,
    If, Else,
    True, False,

    // Type markers
    TypeInt, TypeBool, TypeString, TypeArray,

    // EOF
    Eof,
}

impl TokenType {
    pub fn is_type_marker(self) -> bool {
        matches!(self, TokenType::TypeInt | TokenType::TypeBool | TokenType::TypeString | TokenType::TypeArray)
    }
}

impl Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenType::Illegal => "illegal character",
            TokenType::ParenthesisLeft => "'('",
            TokenType::ParenthesisRight => "')'",
            TokenType::BracketLeft => "'{'",
            TokenType::BracketRight => "'}'",
            TokenType::SquareBracketLeft => "'['",
            TokenType::SquareBracketRight => "']'",
            TokenType::Comma => "','",
            TokenType::Semicolon => "';'",
            TokenType::Colon => "':'",
            TokenType::Arrow => "'->'",
            TokenType::Assign => "'='",
            TokenType::Equal => "'=='",
            TokenType::Not => "'!'",
            TokenType::NotEqual => "'!='",
            TokenType::Greater => "'>'",
            TokenType::GreaterEqual => "'>='",
            TokenType::Less => "'<'",
            TokenType::LessEqual => "'<='",
            TokenType::Plus => "'+'",
            TokenType::Minus => "'-'",
            TokenType::Multiply => "'*'",
            TokenType::Divide => "'/'",
            TokenType::Identifier => "identifier",
            TokenType::Int => "integer literal",
            TokenType::String => "string literal",
            TokenType::Const => "'const'",
            TokenType::Var => "'var'",
            TokenType::Function => "'func'",
            TokenType::Return => "'return'",
            TokenType::If => "'if'",
            TokenType::Else => "'else'",
            TokenType::True => "'true'",
            TokenType::False => "'false'",
            TokenType::TypeInt => "'int'",
            TokenType::TypeBool => "'bool'",
            TokenType::TypeString => "'str'",
            TokenType::TypeArray => "'arr'",
            TokenType::Eof => "end of input",
        };

        f.write_str(name)
    }
}

lazy_static! {
    // The rune spellings are aliases for the same keywords
    static ref KEYWORDS: HashMap<&'static str, TokenType> = HashMap::from([
        ("const", TokenType::Const), ("Λ", TokenType::Const),
        ("var", TokenType::Var),
        ("func", TokenType::Function), ("Π", TokenType::Function),
        ("return", TokenType::Return),
        ("if", TokenType::If),
        ("else", TokenType::Else),
        ("true", TokenType::True),
        ("false", TokenType::False),
        ("int", TokenType::TypeInt),
        ("bool", TokenType::TypeBool),
        ("str", TokenType::TypeString),
        ("arr", TokenType::TypeArray),
    ]);
}

pub fn lookup_identifier(name: &str) -> TokenType {
    KEYWORDS.get(name).copied().unwrap_or(TokenType::Identifier)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    token_type: TokenType,
    source: String,
    start: TokenPos, end: TokenPos,
}

impl Token {
    pub fn new(token_type: TokenType, source: String, start: TokenPos, end: TokenPos) -> Token {
        Token {
            token_type, source,
            start, end
        }
    }

    /// A token that doesn't come from the source text, e.g. the `return` of an arrow body.
    pub fn synthetic(token_type: TokenType, source: &str, pos: TokenPos) -> Token {
        Token::new(token_type, source.to_owned(), pos, pos)
    }

    pub fn token_type(&self) -> TokenType { self.token_type }
    pub fn source(&self) -> &str { &self.source }
    pub fn start(&self) -> &TokenPos { &self.start }
    pub fn end(&self) -> &TokenPos { &self.end }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.token_type {
            TokenType::Eof => f.write_str("end of input"),
            TokenType::String => write!(f, "`\"{}\"`", self.source),
            _ => write!(f, "`{}`", self.source),
        }
    }
}

pub struct Lexer<'source> {
    input: &'source str,

    chars: Chars<'source>,
    peek: Option<char>,

    start_index: usize,
    current_index: usize,

    start_pos: TokenPos,
    current_pos: TokenPos,

    finished: bool,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Lexer<'source> {
        Lexer {
            input: source,

            chars: source.chars(),
            peek: None,

            start_index: 0,
            current_index: 0,

            start_pos: TokenPos::begin(),
            current_pos: TokenPos::begin(),

            finished: false,
        }
    }

    /// Rewinds to the beginning of the input.
    pub fn reset(&mut self) {
        *self = Lexer::new(self.input);
    }

    /// Scans the next token. Once the input is exhausted, every call returns an `Eof` token.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            self.start_index = self.current_index;
            self.start_pos = self.current_pos;

            let c = match self.consume() {
                Some(c) => c,
                None => return self.make_token(TokenType::Eof),
            };

            return match c {
                '(' => self.make_token(TokenType::ParenthesisLeft),
                ')' => self.make_token(TokenType::ParenthesisRight),
                '{' => self.make_token(TokenType::BracketLeft),
                '}' => self.make_token(TokenType::BracketRight),
                '[' => self.make_token(TokenType::SquareBracketLeft),
                ']' => self.make_token(TokenType::SquareBracketRight),
                ',' => self.make_token(TokenType::Comma),
                ';' | '⁞' => self.make_token(TokenType::Semicolon),
                ':' => self.make_token(TokenType::Colon),
                '→' => self.make_token(TokenType::Arrow),
                '—' => self.make_token(TokenType::Var),
                '□' => self.make_token(TokenType::TypeInt),
                '∞' => self.make_token(TokenType::TypeString),
                '≡' => self.make_token(TokenType::TypeArray),

                '=' => if self.expect('=') { self.make_token(TokenType::Equal) } else {
                    self.make_token(TokenType::Assign)
                },
                '!' => if self.expect('=') { self.make_token(TokenType::NotEqual) } else {
                    self.make_token(TokenType::Not)
                },
                '>' => if self.expect('=') { self.make_token(TokenType::GreaterEqual) } else {
                    self.make_token(TokenType::Greater)
                },
                '<' => if self.expect('=') { self.make_token(TokenType::LessEqual) } else {
                    self.make_token(TokenType::Less)
                },

                '+' => self.make_token(TokenType::Plus),
                '-' => if self.expect('>') { self.make_token(TokenType::Arrow) } else {
                    self.make_token(TokenType::Minus)
                },
                '*' => self.make_token(TokenType::Multiply),
                '/' => if self.expect('/') {
                    self.skip_line();
                    continue;
                } else if self.expect('*') {
                    self.skip_block_comment();
                    continue;
                } else {
                    self.make_token(TokenType::Divide)
                },

                '"' => self.scan_string(),
                c if util::is_numeric(c) => self.scan_number(),
                c if util::is_alphabetic(c) => self.scan_identifier(),

                _ => self.make_token(TokenType::Illegal),
            };
        }
    }

    fn scan_string(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }

            self.consume();
        }

        // An unterminated string runs to the end of the input
        let closed = self.expect('"');
        let end_index = if closed { self.current_index - 1 } else { self.current_index };

        // Don't add leading and trailing '"' characters to token
        Token {
            token_type: TokenType::String,
            source: self.input[(self.start_index + 1)..end_index].to_owned(),
            start: self.start_pos, end: self.current_pos,
        }
    }

    fn scan_number(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if !util::is_numeric(c) {
                break;
            }

            self.consume();
        }

        self.make_token(TokenType::Int)
    }

    fn scan_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if !util::is_alphanumeric(c) {
                break;
            }

            self.consume();
        }

        let name = &self.input[self.start_index..self.current_index];
        Token { source: name.to_owned(), token_type: lookup_identifier(name), start: self.start_pos, end: self.current_pos }
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        Token {
            token_type,
            source: self.input[self.start_index..self.current_index].to_owned(),

            start: self.start_pos, end: self.current_pos,
        }
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek.take().or_else(|| self.chars.next())?;

        self.current_index += c.len_utf8();

        if c == '\n' {
            self.current_pos.line += 1;
            self.current_pos.column = 1;
        } else {
            self.current_pos.column += 1;
        }

        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        if self.peek.is_none() {
            self.peek = self.chars.next();
        }

        self.peek
    }

    fn expect(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.consume();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                return;
            }

            self.consume();
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.consume() {
            if c == '\n' {
                return;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let mut comment_count = 1;

        while let Some(c) = self.consume() {
            if c == '/' && self.peek() == Some('*') {
                self.consume();
                comment_count += 1;
            } else if c == '*' && self.peek() == Some('/') {
                self.consume();
                comment_count -= 1;
            }

            if comment_count <= 0 {
                return;
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token up to and including the first `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        self.finished = token.token_type() == TokenType::Eof;
        Some(token)
    }
}
