//! Statements.
use std::io::Write;

use super::CompilationEngine;
use crate::{
    error::JackResult,
    tokens::{Keyword, Symbol, TokenKind},
    vm_writer::{ArithmeticOp, Segment},
};

impl<'a, W: Write> CompilationEngine<'a, W> {
    /// ```text
    /// statement*
    /// ```
    pub(super) fn compile_statements(&mut self) -> JackResult<()> {
        use Keyword as K;

        loop {
            match self.input.peek_kind() {
                TokenKind::Keyword(K::Let) => self.compile_let()?,
                TokenKind::Keyword(K::If) => self.compile_if()?,
                TokenKind::Keyword(K::While) => self.compile_while()?,
                TokenKind::Keyword(K::Do) => self.compile_do()?,
                TokenKind::Keyword(K::Return) => self.compile_return()?,
                _ => return Ok(()),
            }
        }
    }

    /// ```text
    /// 'let' varName ('[' expression ']')? '=' expression ';'
    /// ```
    fn compile_let(&mut self) -> JackResult<()> {
        self.input.consume(Keyword::Let)?;
        let (token, name) = self.input.consume_ident()?;
        let (segment, index) = self.resolve(&token, name)?;

        if self.input.match_token(Symbol::LeftBracket) {
            // Element address stays on the stack until the value is in temp 0.
            self.writer.write_push(segment, index)?;
            self.compile_expression()?;
            self.input.consume(Symbol::RightBracket)?;
            self.writer.write_arithmetic(ArithmeticOp::Add)?;

            self.input.consume(Symbol::Eq)?;
            self.compile_expression()?;
            self.input.consume(Symbol::Semicolon)?;

            self.writer.write_pop(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::Pointer, 1)?;
            self.writer.write_push(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::That, 0)?;
        } else {
            self.input.consume(Symbol::Eq)?;
            self.compile_expression()?;
            self.input.consume(Symbol::Semicolon)?;

            self.writer.write_pop(segment, index)?;
        }

        Ok(())
    }

    /// ```text
    /// 'if' '(' expression ')' '{' statements '}' ('else' '{' statements '}')?
    /// ```
    fn compile_if(&mut self) -> JackResult<()> {
        let else_label = self.next_label();
        let end_label = self.next_label();

        self.input.consume(Keyword::If)?;
        self.input.consume(Symbol::LeftParen)?;
        self.compile_expression()?;
        self.input.consume(Symbol::RightParen)?;

        self.writer.write_arithmetic(ArithmeticOp::Not)?;
        self.writer.write_if(&else_label)?;

        self.compile_block()?;
        self.writer.write_goto(&end_label)?;
        self.writer.write_label(&else_label)?;

        if self.input.match_token(Keyword::Else) {
            self.compile_block()?;
        }

        self.writer.write_label(&end_label)?;
        Ok(())
    }

    /// ```text
    /// 'while' '(' expression ')' '{' statements '}'
    /// ```
    fn compile_while(&mut self) -> JackResult<()> {
        let top_label = self.next_label();
        let exit_label = self.next_label();

        self.input.consume(Keyword::While)?;
        self.writer.write_label(&top_label)?;

        self.input.consume(Symbol::LeftParen)?;
        self.compile_expression()?;
        self.input.consume(Symbol::RightParen)?;

        self.writer.write_arithmetic(ArithmeticOp::Not)?;
        self.writer.write_if(&exit_label)?;

        self.compile_block()?;
        self.writer.write_goto(&top_label)?;
        self.writer.write_label(&exit_label)?;
        Ok(())
    }

    /// ```text
    /// 'do' subroutineCall ';'
    /// ```
    fn compile_do(&mut self) -> JackResult<()> {
        self.input.consume(Keyword::Do)?;
        self.compile_subroutine_call()?;
        self.input.consume(Symbol::Semicolon)?;

        // Every call leaves a value, even void ones.
        self.writer.write_pop(Segment::Temp, 0)?;
        Ok(())
    }

    /// ```text
    /// 'return' expression? ';'
    /// ```
    fn compile_return(&mut self) -> JackResult<()> {
        self.input.consume(Keyword::Return)?;

        if self.input.peek_kind().is_symbol(Symbol::Semicolon) {
            self.writer.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }

        self.input.consume(Symbol::Semicolon)?;
        self.writer.write_return()?;
        Ok(())
    }

    /// ```text
    /// '{' statements '}'
    /// ```
    fn compile_block(&mut self) -> JackResult<()> {
        self.input.consume(Symbol::LeftBrace)?;
        self.compile_statements()?;
        self.input.consume(Symbol::RightBrace)?;
        Ok(())
    }
}
