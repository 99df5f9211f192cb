//! Subroutine declarations, parameters and bodies.
use std::io::Write;

use log::debug;

use super::{CompilationEngine, SubroutineKind};
use crate::{
    constants::{MEMORY_ALLOC, RECEIVER},
    error::JackResult,
    symbol::Kind,
    tokens::{Keyword, Symbol, TokenKind},
    vm_writer::Segment,
};

impl<'a, W: Write> CompilationEngine<'a, W> {
    /// ```text
    /// ('constructor' | 'function' | 'method') ('void' | type) subroutineName
    ///     '(' parameterList ')' subroutineBody
    /// ```
    pub(super) fn compile_subroutine_dec(&mut self) -> JackResult<()> {
        use Keyword as K;

        let keyword = self
            .input
            .consume_any(&[K::Constructor.into(), K::Function.into(), K::Method.into()])?;
        let kind = match keyword.kind {
            TokenKind::Keyword(K::Constructor) => SubroutineKind::Constructor,
            TokenKind::Keyword(K::Method) => SubroutineKind::Method,
            _ => SubroutineKind::Function,
        };

        self.symbols.start_subroutine();

        // The receiver must claim argument 0 before any declared parameter.
        if kind == SubroutineKind::Method {
            self.define(&keyword, RECEIVER, self.class_name.clone(), Kind::Argument)?;
        }

        // Return type has no bearing on the generated code.
        self.compile_type(true)?;

        let (_, name) = self.input.consume_ident()?;
        debug!("compiling {} {}.{}", kind, self.class_name, name);

        self.input.consume(Symbol::LeftParen)?;
        self.compile_parameter_list()?;
        self.input.consume(Symbol::RightParen)?;

        self.compile_subroutine_body(kind, name)
    }

    /// ```text
    /// ((type varName) (',' type varName)*)?
    /// ```
    fn compile_parameter_list(&mut self) -> JackResult<()> {
        if self.input.peek_kind().is_symbol(Symbol::RightParen) {
            return Ok(());
        }

        loop {
            let ty = self.compile_type(false)?;
            let (token, name) = self.input.consume_ident()?;
            self.define(&token, name, ty, Kind::Argument)?;

            if !self.input.match_token(Symbol::Comma) {
                return Ok(());
            }
        }
    }

    /// Locals are declared before the `function` command is written,
    /// because the command carries the local count.
    ///
    /// ```text
    /// '{' varDec* statements '}'
    /// ```
    fn compile_subroutine_body(&mut self, kind: SubroutineKind, name: &str) -> JackResult<()> {
        self.input.consume(Symbol::LeftBrace)?;

        while self.input.peek_kind().is_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let function_name = format!("{}.{}", self.class_name, name);
        let local_count = self.symbols.var_count(Kind::Local);
        self.writer.write_function(&function_name, local_count)?;

        match kind {
            SubroutineKind::Constructor => {
                // Allocate one word per field, and bind it as the receiver.
                let field_count = self.symbols.var_count(Kind::Field);
                self.writer.write_push(Segment::Constant, field_count)?;
                self.writer.write_call(MEMORY_ALLOC, 1)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Method => {
                self.writer.write_push(Segment::Argument, 0)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements()?;
        self.input.consume(Symbol::RightBrace)?;

        Ok(())
    }

    /// ```text
    /// 'var' type varName (',' varName)* ';'
    /// ```
    fn compile_var_dec(&mut self) -> JackResult<()> {
        self.input.consume(Keyword::Var)?;
        let ty = self.compile_type(false)?;
        self.compile_var_names(&ty, Kind::Local)?;
        self.input.consume(Symbol::Semicolon)?;
        Ok(())
    }
}
