use tracing::trace;

use crate::{
    diagnostics::Diagnostics,
    syntax::token::{Literal, Token, TokenType},
};

pub struct Scanner<'a> {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    line_start: usize,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &str, diagnostics: &'a mut Diagnostics) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: vec![],
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
            diagnostics,
        }
    }

    /// Scans the whole source. Bad characters are reported and skipped, so
    /// the result always ends with exactly one `Eof` token.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens
            .push(Token::new(TokenType::Eof, "", Literal::None, self.line));
        trace!(count = self.tokens.len(), lines = self.line, "scanned tokens");
        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenType::LeftParen, Literal::None),
            ')' => self.add_token(TokenType::RightParen, Literal::None),
            '{' => self.add_token(TokenType::LeftBrace, Literal::None),
            '}' => self.add_token(TokenType::RightBrace, Literal::None),
            '[' => self.add_token(TokenType::LeftBracket, Literal::None),
            ']' => self.add_token(TokenType::RightBracket, Literal::None),
            ',' => self.add_token(TokenType::Comma, Literal::None),
            '.' => self.add_token(TokenType::Dot, Literal::None),
            '-' => self.add_token(TokenType::Minus, Literal::None),
            '+' => self.add_token(TokenType::Plus, Literal::None),
            ';' => self.add_token(TokenType::Semicolon, Literal::None),
            '*' => self.add_token(TokenType::Star, Literal::None),

            // single or double length operators
            '!' => {
                let token_type = if self.match_next('=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(token_type, Literal::None);
            }
            '=' => {
                let token_type = if self.match_next('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.add_token(token_type, Literal::None);
            }
            '<' => {
                let token_type = if self.match_next('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(token_type, Literal::None);
            }
            '>' => {
                let token_type = if self.match_next('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type, Literal::None);
            }
            '/' => {
                if self.match_next('/') {
                    // comment goes until the end of the line
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.current += 1;
                    }
                } else {
                    self.add_token(TokenType::Slash, Literal::None);
                }
            }

            // newlines and whitespace
            ' ' | '\r' | '\t' => {}
            '\n' => self.newline(),

            '"' => self.add_string(),

            _ => {
                if c.is_ascii_digit() {
                    self.add_number();
                } else if is_alpha(c) {
                    self.add_identifier();
                } else {
                    self.diagnostics.error(
                        self.line,
                        format!(
                            "Unexpected character '{c}' (column {}).",
                            self.start - self.line_start + 1
                        ),
                    );
                }
            }
        }
    }

    fn newline(&mut self) {
        self.line += 1;
        self.line_start = self.current;
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }

        self.current += 1;
        true
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, token_type: TokenType, literal: Literal) {
        let token = Token::new(token_type, self.lexeme(), literal, self.line);
        trace!(line = token.line, %token, "token");
        self.tokens.push(token);
    }

    fn add_string(&mut self) {
        // a string token is stamped with the line it started on
        let start_line = self.line;
        while self.peek() != '"' && !self.is_at_end() {
            self.current += 1;
            if self.source[self.current - 1] == '\n' {
                self.newline();
            }
        }

        if self.is_at_end() {
            self.diagnostics.error(self.line, "Unterminated string.");
            return;
        }

        // the closing "
        self.current += 1;

        let value: String = self.source[(self.start + 1)..(self.current - 1)]
            .iter()
            .collect();
        self.tokens.push(Token::new(
            TokenType::String,
            self.lexeme(),
            Literal::String(value),
            start_line,
        ));
    }

    fn add_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.current += 1;
        }

        // look for fractional part of number
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            // consume the '.'
            self.current += 1;

            while self.peek().is_ascii_digit() {
                self.current += 1;
            }
        }

        match self.lexeme().parse::<f64>() {
            Ok(value) => self.add_token(TokenType::Number, Literal::Number(value)),
            Err(_) => self.diagnostics.error(self.line, "Invalid number literal."),
        }
    }

    fn add_identifier(&mut self) {
        while is_alpha_numeric(self.peek()) {
            self.current += 1;
        }

        let token_type = TokenType::keyword(&self.lexeme()).unwrap_or(TokenType::Identifier);
        self.add_token(token_type, Literal::None);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alpha_numeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}
