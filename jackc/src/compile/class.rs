//! Class level declarations.
use std::io::Write;

use log::debug;
use smol_str::SmolStr;

use super::CompilationEngine;
use crate::{
    error::JackResult,
    symbol::Kind,
    tokens::{Keyword, Symbol, TokenKind},
};

impl<'a, W: Write> CompilationEngine<'a, W> {
    /// Compile a whole class, then flush and return the output.
    ///
    /// ```text
    /// 'class' className '{' classVarDec* subroutineDec* '}'
    /// ```
    pub fn compile_class(mut self) -> JackResult<W> {
        use Keyword as K;

        self.input.consume(K::Class)?;
        let (_, name) = self.input.consume_ident()?;
        self.class_name = SmolStr::from(name);
        debug!("compiling class {}", self.class_name);

        self.input.consume(Symbol::LeftBrace)?;

        while let TokenKind::Keyword(K::Static | K::Field) = self.input.peek_kind() {
            self.compile_class_var_dec()?;
        }

        while let TokenKind::Keyword(K::Constructor | K::Function | K::Method) =
            self.input.peek_kind()
        {
            self.compile_subroutine_dec()?;
        }

        self.input.consume(Symbol::RightBrace)?;

        // One class per unit.
        if self.input.peek_kind() != TokenKind::EOF {
            return Err(self.input.unexpected("end-of-file").into());
        }

        Ok(self.writer.into_inner()?)
    }

    /// ```text
    /// ('static' | 'field') type varName (',' varName)* ';'
    /// ```
    fn compile_class_var_dec(&mut self) -> JackResult<()> {
        let keyword = self
            .input
            .consume_any(&[Keyword::Static.into(), Keyword::Field.into()])?;
        let kind = if keyword.kind.is_keyword(Keyword::Static) {
            Kind::Static
        } else {
            Kind::Field
        };

        let ty = self.compile_type(false)?;
        self.compile_var_names(&ty, kind)?;

        self.input.consume(Symbol::Semicolon)?;
        Ok(())
    }

    /// Comma separated names sharing one type.
    ///
    /// ```text
    /// varName (',' varName)*
    /// ```
    pub(super) fn compile_var_names(&mut self, ty: &SmolStr, kind: Kind) -> JackResult<()> {
        loop {
            let (token, name) = self.input.consume_ident()?;
            self.define(&token, name, ty.clone(), kind)?;

            if !self.input.match_token(Symbol::Comma) {
                return Ok(());
            }
        }
    }

    /// A primitive type or a class name, and `void` when
    /// declaring a subroutine's return type.
    ///
    /// ```text
    /// 'int' | 'char' | 'boolean' | className
    /// ```
    pub(super) fn compile_type(&mut self, allow_void: bool) -> JackResult<SmolStr> {
        use Keyword as K;

        match self.input.peek_kind() {
            TokenKind::Keyword(K::Int | K::Char | K::Boolean) | TokenKind::Ident => {}
            TokenKind::Keyword(K::Void) if allow_void => {}
            _ if allow_void => return Err(self.input.unexpected("a type or 'void'").into()),
            _ => return Err(self.input.unexpected("a type").into()),
        }

        match self.input.next_token() {
            Some(token) => Ok(SmolStr::from(self.input.text(&token))),
            None => Err(self.input.unexpected("a type").into()),
        }
    }
}
