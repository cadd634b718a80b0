//! Lexical Analyzer for the Rinha Scripting Language
//!
//! This module implements the tokenization phase of the Rinha interpreter
//! pipeline. It converts raw source code text into a stream of tokens that
//! the parser then assembles into an AST.
//!
//! ## Tokenization Process
//!
//! The lexer performs several key functions:
//! 1. **Character Processing**: iterates through source code character by character
//! 2. **Token Recognition**: identifies keywords, operators, literals, and identifiers
//! 3. **Error Handling**: reports malformed tokens with line/column information
//! 4. **Comment Filtering**: strips `//` line comments and `/* … */` block comments
//! 5. **Position Tracking**: maintains accurate line and column numbers for diagnostics
//!
//! ## Design Notes
//!
//! The lexer uses a simple character-by-character scanning approach with
//! one character of lookahead for multi-character tokens like `==`, `>=`,
//! `&&`, and `=>`.

use crate::error::{RinhaError, SourceLocation};
use std::fmt;

/// Represents all possible tokens in the Rinha scripting language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === LITERAL TOKENS ===
    /// Integer literal: `42`, `0`, `6765`. Parsed as a signed 64-bit value.
    Integer(i64),
    /// String literal, delimited by `'` or `"`. No escape sequences.
    String(String),
    /// Identifier: `fib`, `my_var`, `_`.
    Identifier(String),

    // === KEYWORD TOKENS ===
    Let,
    Fn,
    If,
    Else,
    True,
    False,
    Print,
    First,
    Second,

    // === OPERATOR TOKENS ===
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    EqualEqual,
    BangEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    AndAnd,
    OrOr,
    FatArrow,

    // === DELIMITER TOKENS ===
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,

    /// End of file marker. Always the last token produced by the lexer.
    Eof,
}

/// A single lexical token together with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.kind)
    }
}

/// Lexical analyzer that converts source code into a flat token stream.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Creates a new lexer for the given source code.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenizes the entire input into a vector of tokens ending with `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, RinhaError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, RinhaError> {
        self.skip_whitespace_and_comments()?;

        let line = self.line;
        let column = self.column;

        if self.is_at_end() {
            return Ok(Token { kind: TokenKind::Eof, line, column });
        }

        let c = self.advance();

        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => {
                if self.peek() == '=' {
                    self.advance();
                    TokenKind::EqualEqual
                } else if self.peek() == '>' {
                    self.advance();
                    TokenKind::FatArrow
                } else {
                    TokenKind::Equal
                }
            }
            '!' => {
                if self.peek() == '=' {
                    self.advance();
                    TokenKind::BangEqual
                } else {
                    return Err(RinhaError::LexError {
                        message: "unexpected character '!'".to_string(),
                        location: SourceLocation { line, column },
                    });
                }
            }
            '>' => {
                if self.peek() == '=' {
                    self.advance();
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                }
            }
            '<' => {
                if self.peek() == '=' {
                    self.advance();
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                }
            }
            '&' if self.peek() == '&' => {
                self.advance();
                TokenKind::AndAnd
            }
            '|' if self.peek() == '|' => {
                self.advance();
                TokenKind::OrOr
            }
            '\'' | '"' => return self.string_literal(c, line, column),
            c if c.is_ascii_digit() => return self.integer_literal(c, line, column),
            c if c.is_ascii_alphabetic() || c == '_' => return self.identifier_or_keyword(c, line, column),
            c => {
                return Err(RinhaError::LexError {
                    message: format!("unexpected character '{}'", c),
                    location: SourceLocation { line, column },
                })
            }
        };

        Ok(Token { kind, line, column })
    }

    fn string_literal(&mut self, quote: char, line: usize, column: usize) -> Result<Token, RinhaError> {
        let mut value = String::new();
        loop {
            if self.is_at_end() {
                return Err(RinhaError::LexError {
                    message: "unterminated string literal".to_string(),
                    location: SourceLocation { line, column },
                });
            }
            let c = self.advance();
            if c == quote {
                break;
            }
            value.push(c);
        }
        Ok(Token { kind: TokenKind::String(value), line, column })
    }

    fn integer_literal(&mut self, first_digit: char, line: usize, column: usize) -> Result<Token, RinhaError> {
        let mut value = String::from(first_digit);
        while self.peek().is_ascii_digit() {
            value.push(self.advance());
        }
        match value.parse::<i64>() {
            Ok(n) => Ok(Token { kind: TokenKind::Integer(n), line, column }),
            Err(_) => Err(RinhaError::LexError {
                message: format!("invalid integer literal '{}'", value),
                location: SourceLocation { line, column },
            }),
        }
    }

    fn identifier_or_keyword(&mut self, first_char: char, line: usize, column: usize) -> Result<Token, RinhaError> {
        let mut value = String::from(first_char);
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            value.push(self.advance());
        }

        let kind = match value.as_str() {
            "let" => TokenKind::Let,
            "fn" => TokenKind::Fn,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "print" => TokenKind::Print,
            "first" => TokenKind::First,
            "second" => TokenKind::Second,
            _ => TokenKind::Identifier(value),
        };

        Ok(Token { kind, line, column })
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), RinhaError> {
        loop {
            match self.peek() {
                ' ' | '\r' | '\t' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                '/' if self.peek_next() == '/' => {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                }
                '/' if self.peek_next() == '*' => {
                    let line = self.line;
                    let column = self.column;
                    self.advance();
                    self.advance();
                    loop {
                        if self.is_at_end() {
                            return Err(RinhaError::LexError {
                                message: "unterminated block comment".to_string(),
                                location: SourceLocation { line, column },
                            });
                        }
                        if self.peek() == '*' && self.peek_next() == '/' {
                            self.advance();
                            self.advance();
                            break;
                        }
                        if self.peek() == '\n' {
                            self.line += 1;
                            self.column = 0;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn advance(&mut self) -> char {
        if !self.is_at_end() {
            self.column += 1;
            let c = self.input[self.position];
            self.position += 1;
            c
        } else {
            '\0'
        }
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.input[self.position]
        }
    }

    fn peek_next(&self) -> char {
        if self.position + 1 >= self.input.len() {
            '\0'
        } else {
            self.input[self.position + 1]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_let_binding() {
        assert_eq!(
            kinds("let x = 42;"),
            vec![
                TokenKind::Let,
                TokenKind::Identifier("x".to_string()),
                TokenKind::Equal,
                TokenKind::Integer(42),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenizes_string_with_either_quote_style() {
        assert_eq!(
            kinds(r#"'a' "b""#),
            vec![
                TokenKind::String("a".to_string()),
                TokenKind::String("b".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenizes_multi_character_operators() {
        assert_eq!(
            kinds("== != <= >= && || =>"),
            vec![
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::FatArrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strips_line_and_block_comments() {
        assert_eq!(
            kinds("1 // trailing\n/* skip\nme */2"),
            vec![TokenKind::Integer(1), TokenKind::Integer(2), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(matches!(
            Lexer::new("\"abc").tokenize(),
            Err(RinhaError::LexError { .. })
        ));
    }

    #[test]
    fn reserved_words_are_not_identifiers() {
        assert_eq!(
            kinds("let fn if else true false print first second"),
            vec![
                TokenKind::Let,
                TokenKind::Fn,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Print,
                TokenKind::First,
                TokenKind::Second,
                TokenKind::Eof,
            ]
        );
    }
}
