//! Parser for the Rinha Scripting Language
//!
//! This module implements a recursive descent parser with operator
//! precedence climbing to convert a stream of tokens into an Abstract
//! Syntax Tree (AST). Unlike the reference implementation, which
//! interprets directly over the token stream, this parser builds the
//! complete tree up front; the evaluator (`interpreter.rs`) then walks it.
//!
//! ## Parser Architecture
//!
//! The parser uses a **recursive descent** approach with one method per
//! grammar production:
//!
//! ```text
//! Precedence Levels (loosest to tightest):
//! 1. Assignment (=)                    - right-associative
//! 2. Logical OR (||)                   - left-associative, no short-circuit
//! 3. Logical AND (&&)                  - left-associative, no short-circuit
//! 4. Comparison (==, !=, <, <=, >, >=) - non-associative (one comparison per level)
//! 5. Addition/subtraction (+, -)       - left-associative
//! 6. Multiplication/division/modulo (*, /, %) - left-associative
//! 7. Primary (literals, identifiers, calls, parens, tuples, fn literals)
//! ```
//!
//! Identifiers are interned into `SymbolId`s as they are parsed (see
//! `symbol::SymbolTable`), so the resulting AST never carries raw strings
//! for variable or function names.

use crate::ast::*;
use crate::error::{RinhaError, Result, SourceLocation};
use crate::lexer::{Token, TokenKind};
use crate::symbol::SymbolTable;

/// Recursive descent parser for the Rinha scripting language.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    symbols: SymbolTable,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0, symbols: SymbolTable::new() }
    }

    /// Parses the complete token stream into a `Program`, returning the
    /// symbol table built up while interning identifiers.
    pub fn parse(mut self) -> Result<(Program, SymbolTable)> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.statement()?);
        }
        Ok((Program { statements }, self.symbols))
    }

    /// `statement := 'let' identifier '=' expression ';'? | expression ';'?`
    fn statement(&mut self) -> Result<Statement> {
        if self.check(&TokenKind::Let) {
            self.advance();
            let name = self.expect_identifier()?;
            self.expect(&TokenKind::Equal, "'='")?;
            let value = self.expression()?;
            self.consume_optional_semicolon();
            return Ok(Statement::Let { name, value });
        }

        let expr = self.expression()?;
        self.consume_optional_semicolon();
        Ok(Statement::Expression(expr))
    }

    /// `block := '{' statement* '}' | statement`
    fn block(&mut self) -> Result<Expression> {
        if self.check(&TokenKind::LeftBrace) {
            self.advance();
            let mut statements = Vec::new();
            while !self.check(&TokenKind::RightBrace) {
                if self.is_at_end() {
                    return self.error("'}'");
                }
                statements.push(self.statement()?);
            }
            self.advance(); // consume '}'
            Ok(Expression::Block(statements))
        } else {
            Ok(Expression::Block(vec![self.statement()?]))
        }
    }

    fn expression(&mut self) -> Result<Expression> {
        self.assignment()
    }

    /// `assignment := or ( '=' assignment )?`
    fn assignment(&mut self) -> Result<Expression> {
        let expr = self.or()?;

        if self.check(&TokenKind::Equal) {
            self.advance();
            let name = match expr {
                Expression::Identifier(name, _) => name,
                _ => return self.error("assignment target to be an identifier"),
            };
            let value = self.assignment()?;
            return Ok(Expression::Assignment { name, value: Box::new(value) });
        }

        Ok(expr)
    }

    /// `or := and ( '||' and )*`
    fn or(&mut self) -> Result<Expression> {
        let mut expr = self.and()?;
        while self.check(&TokenKind::OrOr) {
            let location = self.location();
            self.advance();
            let right = self.and()?;
            expr = Expression::Binary {
                left: Box::new(expr),
                operator: BinaryOperator::Or,
                right: Box::new(right),
                location,
            };
        }
        Ok(expr)
    }

    /// `and := cmp ( '&&' cmp )*`
    fn and(&mut self) -> Result<Expression> {
        let mut expr = self.comparison()?;
        while self.check(&TokenKind::AndAnd) {
            let location = self.location();
            self.advance();
            let right = self.comparison()?;
            expr = Expression::Binary {
                left: Box::new(expr),
                operator: BinaryOperator::And,
                right: Box::new(right),
                location,
            };
        }
        Ok(expr)
    }

    /// `cmp := calc ( ('=='|'!='|'<'|'<='|'>'|'>=') calc )?`
    fn comparison(&mut self) -> Result<Expression> {
        let mut expr = self.calc()?;
        let operator = match self.peek_kind() {
            TokenKind::EqualEqual => Some(BinaryOperator::Equal),
            TokenKind::BangEqual => Some(BinaryOperator::NotEqual),
            TokenKind::Less => Some(BinaryOperator::Less),
            TokenKind::LessEqual => Some(BinaryOperator::LessEqual),
            TokenKind::Greater => Some(BinaryOperator::Greater),
            TokenKind::GreaterEqual => Some(BinaryOperator::GreaterEqual),
            _ => None,
        };
        if let Some(operator) = operator {
            let location = self.location();
            self.advance();
            let right = self.calc()?;
            expr = Expression::Binary { left: Box::new(expr), operator, right: Box::new(right), location };
        }
        Ok(expr)
    }

    /// `calc := term ( ('+'|'-') term )*`
    fn calc(&mut self) -> Result<Expression> {
        let mut expr = self.term()?;
        loop {
            let operator = match self.peek_kind() {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            let location = self.location();
            self.advance();
            let right = self.term()?;
            expr = Expression::Binary { left: Box::new(expr), operator, right: Box::new(right), location };
        }
        Ok(expr)
    }

    /// `term := primary ( ('*'|'/'|'%') primary )*`
    fn term(&mut self) -> Result<Expression> {
        let mut expr = self.primary()?;
        loop {
            let operator = match self.peek_kind() {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                TokenKind::Percent => BinaryOperator::Modulo,
                _ => break,
            };
            let location = self.location();
            self.advance();
            let right = self.primary()?;
            expr = Expression::Binary { left: Box::new(expr), operator, right: Box::new(right), location };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expression> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Expression::Integer(n))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expression::String(s))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::Boolean(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::Boolean(false))
            }
            TokenKind::Identifier(name) => {
                let location = self.location();
                self.advance();
                let symbol = self.symbols.intern(&name);
                if self.check(&TokenKind::LeftParen) {
                    let args = self.call_arguments()?;
                    Ok(Expression::Call {
                        callee: Box::new(Expression::Identifier(symbol, location)),
                        args,
                        location,
                    })
                } else {
                    Ok(Expression::Identifier(symbol, location))
                }
            }
            TokenKind::LeftParen => {
                self.advance();
                let first = self.expression()?;
                if self.check(&TokenKind::Comma) {
                    self.advance();
                    let second = self.expression()?;
                    self.expect(&TokenKind::RightParen, "')'")?;
                    Ok(Expression::Tuple(Box::new(first), Box::new(second)))
                } else {
                    self.expect(&TokenKind::RightParen, "')'")?;
                    Ok(first)
                }
            }
            TokenKind::Fn => {
                self.advance();
                self.expect(&TokenKind::LeftParen, "'('")?;
                let mut params = Vec::new();
                if !self.check(&TokenKind::RightParen) {
                    loop {
                        let name = self.expect_identifier()?;
                        params.push(name);
                        if self.check(&TokenKind::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                self.expect(&TokenKind::RightParen, "')'")?;
                self.expect(&TokenKind::FatArrow, "'=>'")?;
                let body = self.block()?;
                Ok(Expression::FunctionLiteral { params, body: Box::new(body) })
            }
            TokenKind::If => {
                let location = self.location();
                self.advance();
                self.expect(&TokenKind::LeftParen, "'('")?;
                let condition = self.expression()?;
                self.expect(&TokenKind::RightParen, "')'")?;
                let then_branch = self.block()?;
                let else_branch = if self.check(&TokenKind::Else) {
                    self.advance();
                    Some(Box::new(self.block()?))
                } else {
                    None
                };
                Ok(Expression::If {
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch,
                    location,
                })
            }
            TokenKind::Print => {
                self.advance();
                self.expect(&TokenKind::LeftParen, "'('")?;
                let arg = self.expression()?;
                self.expect(&TokenKind::RightParen, "')'")?;
                Ok(Expression::Print(Box::new(arg)))
            }
            TokenKind::First => {
                let location = self.location();
                self.advance();
                self.expect(&TokenKind::LeftParen, "'('")?;
                let arg = self.expression()?;
                self.expect(&TokenKind::RightParen, "')'")?;
                Ok(Expression::First(Box::new(arg), location))
            }
            TokenKind::Second => {
                let location = self.location();
                self.advance();
                self.expect(&TokenKind::LeftParen, "'('")?;
                let arg = self.expression()?;
                self.expect(&TokenKind::RightParen, "')'")?;
                Ok(Expression::Second(Box::new(arg), location))
            }
            _ => self.error("an expression"),
        }
    }

    fn call_arguments(&mut self) -> Result<Vec<Expression>> {
        self.expect(&TokenKind::LeftParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightParen, "')'")?;
        Ok(args)
    }

    fn expect_identifier(&mut self) -> Result<crate::symbol::SymbolId> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(self.symbols.intern(&name))
            }
            _ => self.error("an identifier"),
        }
    }

    fn consume_optional_semicolon(&mut self) {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.peek().kind == kind
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn location(&self) -> SourceLocation {
        let token = self.peek();
        SourceLocation { line: token.line, column: token.column }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            self.error(what)
        }
    }

    fn error<T>(&self, expected: &str) -> Result<T> {
        let token = self.peek();
        Err(RinhaError::ParseError {
            message: format!("expected {}, found {:?}", expected, token.kind),
            location: SourceLocation { line: token.line, column: token.column },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Program {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap().0
    }

    #[test]
    fn parses_let_binding() {
        let program = parse("let x = 1;");
        assert_eq!(program.statements.len(), 1);
        assert!(matches!(program.statements[0], Statement::Let { .. }));
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let program = parse("1 + 2 * 3;");
        match &program.statements[0] {
            Statement::Expression(Expression::Binary { operator: BinaryOperator::Add, right, .. }) => {
                assert!(matches!(**right, Expression::Binary { operator: BinaryOperator::Multiply, .. }));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn parses_function_literal_and_call() {
        let program = parse("let sum = fn(a, b) => { a + b }; sum(1, 2);");
        assert!(matches!(program.statements[0], Statement::Let { .. }));
        assert!(matches!(
            program.statements[1],
            Statement::Expression(Expression::Call { .. })
        ));
    }

    #[test]
    fn parses_if_else_as_expression() {
        let program = parse("if (true) { 1 } else { 2 };");
        assert!(matches!(
            program.statements[0],
            Statement::Expression(Expression::If { .. })
        ));
    }

    #[test]
    fn parses_tuple_literal() {
        let program = parse("(1, 2);");
        assert!(matches!(
            program.statements[0],
            Statement::Expression(Expression::Tuple(..))
        ));
    }

    #[test]
    fn assignment_is_right_associative() {
        let program = parse("a = b = 1;");
        match &program.statements[0] {
            Statement::Expression(Expression::Assignment { value, .. }) => {
                assert!(matches!(**value, Expression::Assignment { .. }));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn missing_closing_paren_is_a_parse_error() {
        let tokens = Lexer::new("print(1;").tokenize().unwrap();
        assert!(matches!(Parser::new(tokens).parse(), Err(RinhaError::ParseError { .. })));
    }
}
