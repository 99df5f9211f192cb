//! Expressions, terms and subroutine calls.
use std::{convert::TryFrom, io::Write};

use super::CompilationEngine;
use crate::{
    constants::{INT_MAX, MATH_DIVIDE, MATH_MULTIPLY, STRING_APPEND_CHAR, STRING_NEW},
    error::JackResult,
    tokens::{Keyword, Symbol, TokenKind},
    vm_writer::{ArithmeticOp, Segment},
};

/// How a binary operator is carried out on the target machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    /// Native stack command.
    Native(ArithmeticOp),
    /// Two argument library routine.
    Routine(&'static str),
}

impl BinaryOp {
    #[rustfmt::skip]
    fn from_token(kind: TokenKind) -> Option<Self> {
        use ArithmeticOp as A;
        use Symbol as S;

        match kind {
            TokenKind::Symbol(symbol) => match symbol {
                S::Plus    => Some(Self::Native(A::Add)),
                S::Minus   => Some(Self::Native(A::Sub)),
                S::Star    => Some(Self::Routine(MATH_MULTIPLY)),
                S::Slash   => Some(Self::Routine(MATH_DIVIDE)),
                S::Amp     => Some(Self::Native(A::And)),
                S::Pipe    => Some(Self::Native(A::Or)),
                S::Less    => Some(Self::Native(A::Lt)),
                S::Greater => Some(Self::Native(A::Gt)),
                S::Eq      => Some(Self::Native(A::Eq)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl<'a, W: Write> CompilationEngine<'a, W> {
    /// Operators have no precedence, and are applied left to right.
    ///
    /// ```text
    /// term (op term)*
    /// ```
    pub(super) fn compile_expression(&mut self) -> JackResult<()> {
        self.compile_term()?;

        while let Some(op) = BinaryOp::from_token(self.input.peek_kind()) {
            self.input.next_token();
            self.compile_term()?;

            match op {
                BinaryOp::Native(op) => self.writer.write_arithmetic(op)?,
                BinaryOp::Routine(name) => self.writer.write_call(name, 2)?,
            }
        }

        Ok(())
    }

    /// ```text
    /// integerConstant | stringConstant | keywordConstant
    ///     | varName | varName '[' expression ']' | subroutineCall
    ///     | '(' expression ')' | unaryOp term
    /// ```
    fn compile_term(&mut self) -> JackResult<()> {
        use Keyword as K;
        use Symbol as S;

        match self.input.peek_kind() {
            TokenKind::Int(value) => {
                self.input.next_token();
                self.writer.write_push(Segment::Constant, value)?;
            }
            TokenKind::Str => self.compile_string()?,
            TokenKind::Keyword(keyword @ (K::True | K::False | K::Null | K::This)) => {
                self.input.next_token();
                match keyword {
                    K::This => self.writer.write_push(Segment::Pointer, 0)?,
                    K::True => {
                        self.writer.write_push(Segment::Constant, 0)?;
                        self.writer.write_arithmetic(ArithmeticOp::Not)?;
                    }
                    _ => self.writer.write_push(Segment::Constant, 0)?,
                }
            }
            TokenKind::Symbol(S::LeftParen) => {
                self.input.next_token();
                self.compile_expression()?;
                self.input.consume(S::RightParen)?;
            }
            TokenKind::Symbol(symbol @ (S::Minus | S::Tilde)) => {
                self.input.next_token();
                self.compile_term()?;
                let op = if symbol == S::Minus {
                    ArithmeticOp::Neg
                } else {
                    ArithmeticOp::Not
                };
                self.writer.write_arithmetic(op)?;
            }
            TokenKind::Ident => {
                // The token after the name decides between the four
                // constructs an identifier can start.
                match self.input.peek_nth(1).kind {
                    TokenKind::Symbol(S::LeftBracket) => self.compile_array_access()?,
                    TokenKind::Symbol(S::LeftParen | S::Dot) => self.compile_subroutine_call()?,
                    _ => {
                        let (token, name) = self.input.consume_ident()?;
                        let (segment, index) = self.resolve(&token, name)?;
                        self.writer.write_push(segment, index)?;
                    }
                }
            }
            _ => return Err(self.input.unexpected("an expression").into()),
        }

        Ok(())
    }

    /// ```text
    /// varName '[' expression ']'
    /// ```
    fn compile_array_access(&mut self) -> JackResult<()> {
        let (token, name) = self.input.consume_ident()?;
        let (segment, index) = self.resolve(&token, name)?;

        self.writer.write_push(segment, index)?;
        self.input.consume(Symbol::LeftBracket)?;
        self.compile_expression()?;
        self.input.consume(Symbol::RightBracket)?;
        self.writer.write_arithmetic(ArithmeticOp::Add)?;

        self.writer.write_pop(Segment::Pointer, 1)?;
        self.writer.write_push(Segment::That, 0)?;
        Ok(())
    }

    /// Build a string object one character at a time.
    fn compile_string(&mut self) -> JackResult<()> {
        let token = self.input.consume(TokenKind::Str)?;
        let text = self.input.text(&token);

        let mut codes = Vec::with_capacity(text.len());
        for c in text.chars() {
            match u16::try_from(u32::from(c)) {
                Ok(code) => codes.push(code),
                Err(_) => {
                    let message = format!("character {:?} can't be stored in a string", c);
                    return Err(self.error_at(&token, message));
                }
            }
        }

        // The length is pushed as an integer constant.
        let length = match u16::try_from(codes.len()) {
            Ok(length) if length <= INT_MAX => length,
            _ => {
                let message = format!("string constant is longer than {} characters", INT_MAX);
                return Err(self.error_at(&token, message));
            }
        };

        self.writer.write_push(Segment::Constant, length)?;
        self.writer.write_call(STRING_NEW, 1)?;

        for code in codes {
            self.writer.write_push(Segment::Constant, code)?;
            self.writer.write_call(STRING_APPEND_CHAR, 2)?;
        }

        Ok(())
    }

    /// Calls come in three shapes:
    ///
    /// - `name(..)` calls a method on the current object.
    /// - `var.name(..)` calls a method on the object held in `var`.
    /// - `Class.name(..)` calls a function or constructor of another class.
    ///
    /// A prefix that isn't a declared variable is taken to be a class name.
    ///
    /// ```text
    /// subroutineName '(' expressionList ')'
    ///     | (className | varName) '.' subroutineName '(' expressionList ')'
    /// ```
    pub(super) fn compile_subroutine_call(&mut self) -> JackResult<()> {
        let (token, prefix) = self.input.consume_ident()?;

        let (callee, receiver_count) = if self.input.match_token(Symbol::Dot) {
            let (_, name) = self.input.consume_ident()?;

            match self.symbols.lookup(prefix).cloned() {
                Some(symbol) => {
                    self.writer.write_push(symbol.kind.segment(), symbol.index)?;
                    (format!("{}.{}", symbol.ty, name), 1)
                }
                None => (format!("{}.{}", prefix, name), 0),
            }
        } else {
            self.writer.write_push(Segment::Pointer, 0)?;
            (format!("{}.{}", self.class_name, prefix), 1)
        };

        self.input.consume(Symbol::LeftParen)?;
        let arg_count = self.compile_expression_list()?;
        self.input.consume(Symbol::RightParen)?;

        let total = match arg_count.checked_add(receiver_count) {
            Some(total) if total <= INT_MAX => total,
            _ => {
                let message = format!("call to {} has more than {} arguments", callee, INT_MAX);
                return Err(self.error_at(&token, message));
            }
        };

        self.writer.write_call(&callee, total)?;
        Ok(())
    }

    /// Returns the number of expressions compiled.
    ///
    /// ```text
    /// (expression (',' expression)*)?
    /// ```
    fn compile_expression_list(&mut self) -> JackResult<u16> {
        if self.input.peek_kind().is_symbol(Symbol::RightParen) {
            return Ok(0);
        }

        let mut count: u16 = 1;
        self.compile_expression()?;

        while self.input.match_token(Symbol::Comma) {
            // Stop counting before the total can no longer be represented.
            if count >= INT_MAX {
                let message = format!("more than {} arguments", INT_MAX);
                return Err(self.error_at(self.input.peek(), message));
            }
            self.compile_expression()?;
            count += 1;
        }

        Ok(count)
    }
}
