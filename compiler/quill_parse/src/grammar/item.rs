//! Functions, parameter lists and classes.

use std::sync::Arc;

use quill_eval::exec::{
    BaseSpec, Block, ClassDecl, ClassDef, ClassItem, CtorParam, FieldDef, FnDef, Param,
};
use quill_ir::{Name, Pos, TokenKind};

use super::stmt::Stmt;
use crate::{ParseError, Parser};

impl Parser {
    /// Parameters and body of a function whose name has been read.
    pub(crate) fn function(&mut self, name: Name, pos: Pos) -> Result<Arc<FnDef>, ParseError> {
        let params = self.params()?;
        let body = self.in_function(Self::function_body)?;
        Ok(Arc::new(FnDef::new(name, pos, params, body)))
    }

    /// A function body runs directly in its call frame.
    fn function_body(&mut self) -> Result<Block, ParseError> {
        let pos = self.expect(TokenKind::LBrace, "'{'")?.pos;
        let (statements, declared) = self.statements_until(TokenKind::RBrace)?;
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Block::unscoped(pos, statements, declared))
    }

    /// `(a, b = 1, rest...)`
    fn params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) {
            params.push(self.param()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        validate_params(&params)?;
        Ok(params)
    }

    fn param(&mut self) -> Result<Param, ParseError> {
        let (name, pos) = self.ident("a parameter name")?;
        let variadic = self.eat_ellipsis();
        let default = if !variadic && self.eat(TokenKind::Eq) {
            Some(self.expression()?.into_node())
        } else {
            None
        };
        Ok(Param {
            name,
            pos,
            default,
            variadic,
        })
    }

    /// `...`, lexed as `..` followed by `.`.
    fn eat_ellipsis(&mut self) -> bool {
        if self.check(TokenKind::DotDot) && self.cursor.peek(1).kind == TokenKind::Dot {
            self.advance();
            self.advance();
            return true;
        }
        false
    }

    /// `class Name(ctorParams) : Base1(args), Base2 { body }`
    pub(crate) fn class_decl(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.advance().pos;
        let (name, _) = self.ident("a class name")?;
        let params = if self.check(TokenKind::LParen) {
            self.ctor_params()?
        } else {
            Vec::new()
        };
        let mut bases = Vec::new();
        if self.eat(TokenKind::Colon) {
            loop {
                let (base, base_pos) = self.ident("a base class name")?;
                let args = if self.check(TokenKind::LParen) {
                    self.arguments()?
                } else {
                    Vec::new()
                };
                bases.push(BaseSpec {
                    name: base,
                    pos: base_pos,
                    args,
                });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let items = if self.check(TokenKind::LBrace) {
            self.in_function(Self::class_body)?
        } else {
            Vec::new()
        };
        let def = ClassDef::new(name, pos.clone(), params, bases, items);
        Ok(Stmt {
            node: Box::new(ClassDecl {
                pos,
                def: Arc::new(def),
            }),
            declares: true,
        })
    }

    /// `(val a, var b = 1, c)`: without `val` a parameter is mutable.
    fn ctor_params(&mut self) -> Result<Vec<CtorParam>, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        let mut mutability = Vec::new();
        while !self.check(TokenKind::RParen) {
            let mutable = !self.eat_word("val");
            if mutable {
                self.eat_word("var");
            }
            let param = self.param()?;
            if param.variadic {
                return Err(ParseError::new(
                    &param.pos,
                    "constructor parameters cannot be variadic",
                ));
            }
            params.push(param);
            mutability.push(mutable);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        validate_params(&params)?;
        Ok(params
            .into_iter()
            .zip(mutability)
            .map(|(param, mutable)| CtorParam { param, mutable })
            .collect())
    }

    /// Fields, methods and `init` blocks.
    fn class_body(&mut self) -> Result<Vec<ClassItem>, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut items = Vec::new();
        loop {
            while self.eat(TokenKind::Semicolon) {}
            if self.check(TokenKind::RBrace) || self.is_at_end() {
                break;
            }
            if self.check_word("val") || self.check_word("var") {
                let mutable = self.advance().lexeme == "var";
                let (name, pos) = self.ident("a field name")?;
                let init = if self.eat(TokenKind::Eq) {
                    Some(self.expression()?.into_node())
                } else {
                    None
                };
                items.push(ClassItem::Field(FieldDef {
                    name,
                    pos,
                    mutable,
                    init,
                }));
            } else if self.check_word("fun") || self.check_word("fn") {
                let pos = self.advance().pos;
                let (name, _) = self.ident("a method name")?;
                items.push(ClassItem::Method(self.function(name, pos)?));
            } else if self.eat_word("init") {
                items.push(ClassItem::Init(self.block()?));
            } else {
                return Err(ParseError::expected(
                    "a field, method or init block",
                    self.current(),
                ));
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(items)
    }
}

/// Names are unique; once a parameter has a default every later one
/// needs one; a variadic parameter comes last.
fn validate_params(params: &[Param]) -> Result<(), ParseError> {
    let mut defaulted = false;
    for (i, param) in params.iter().enumerate() {
        if params[..i].iter().any(|p| p.name == param.name) {
            return Err(ParseError::new(
                &param.pos,
                format!("duplicate parameter {}", param.name),
            ));
        }
        if param.variadic {
            if i + 1 != params.len() {
                return Err(ParseError::new(
                    &param.pos,
                    "variadic parameter must be last",
                ));
            }
        } else if param.default.is_some() {
            defaulted = true;
        } else if defaulted {
            return Err(ParseError::new(
                &param.pos,
                "missing default value after a defaulted parameter",
            ));
        }
    }
    Ok(())
}
