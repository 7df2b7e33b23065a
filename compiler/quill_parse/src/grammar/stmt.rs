//! Statements: keyword dispatch, blocks, loops, jumps and `try`.

use quill_eval::ensure_sufficient_stack;
use quill_eval::exec::{
    Block, Break, Catch, Continue, DoWhile, ExtensionDecl, FnDecl, ForIn, NodeBox, Return, Throw,
    Try, VarDecl, While,
};
use quill_ir::{Name, Pos, Token, TokenKind};

use crate::{is_keyword, ParseError, Parser};

/// How far back a loop looks for its `name:` label.
const LABEL_LOOKBEHIND: usize = 2;

/// A compiled statement.
pub(crate) struct Stmt {
    pub node: NodeBox,
    /// Whether it binds a name in the enclosing block.
    pub declares: bool,
}

impl Stmt {
    fn plain(node: NodeBox) -> Self {
        Stmt {
            node,
            declares: false,
        }
    }

    fn binding(node: NodeBox) -> Self {
        Stmt {
            node,
            declares: true,
        }
    }
}

type StatementParser = fn(&mut Parser) -> Result<Stmt, ParseError>;

/// Statement keywords. Anything else is an expression statement.
const STATEMENTS: &[(&str, StatementParser)] = &[
    ("val", Parser::val_decl),
    ("var", Parser::var_decl),
    ("if", Parser::if_statement),
    ("while", Parser::while_loop),
    ("do", Parser::do_while),
    ("for", Parser::for_in),
    ("fun", Parser::fun_decl),
    ("fn", Parser::fun_decl),
    ("class", Parser::class_decl),
    ("break", Parser::break_statement),
    ("continue", Parser::continue_statement),
    ("return", Parser::return_statement),
    ("throw", Parser::throw_statement),
    ("try", Parser::try_statement),
];

const LOOP_KEYWORDS: &[&str] = &["while", "do", "for"];

impl Parser {
    pub(crate) fn statement(&mut self) -> Result<Stmt, ParseError> {
        ensure_sufficient_stack(|| self.statement_inner())
    }

    fn statement_inner(&mut self) -> Result<Stmt, ParseError> {
        if self.at_label() {
            self.advance();
            self.advance();
        }
        let keyword = STATEMENTS
            .iter()
            .find(|(word, _)| self.check_word(word))
            .map(|(_, parse)| *parse);
        if let Some(parse) = keyword {
            return parse(self);
        }
        let node = self.expression()?.into_node();
        Ok(Stmt::plain(node))
    }

    /// `name:` directly before a loop keyword.
    fn at_label(&self) -> bool {
        let token = self.current();
        token.kind == TokenKind::Id
            && !is_keyword(&token.lexeme)
            && self.cursor.peek(1).kind == TokenKind::Colon
            && LOOP_KEYWORDS
                .iter()
                .any(|word| self.cursor.peek(2).is_word(word))
    }

    /// The label of the loop whose keyword is at the cursor, with the
    /// label's position.
    fn pending_label(&self) -> Option<(Name, Pos)> {
        let colon = self.cursor.behind(1)?;
        let label = self.cursor.behind(LABEL_LOOKBEHIND)?;
        (colon.kind == TokenKind::Colon && label.kind == TokenKind::Id)
            .then(|| (Name::intern(&label.lexeme), label.pos.clone()))
    }

    /// Consumes the loop keyword. A labeled loop starts at its label.
    fn loop_head(&mut self) -> (Option<Name>, Pos) {
        let label = self.pending_label();
        let keyword = self.advance().pos;
        match label {
            Some((name, pos)) => (Some(name), pos),
            None => (None, keyword),
        }
    }

    /// Statements up to (not including) `end`; `;` separators are optional.
    /// Returns the statements and how many of them declare a binding.
    pub(crate) fn statements_until(
        &mut self,
        end: TokenKind,
    ) -> Result<(Vec<NodeBox>, usize), ParseError> {
        let mut statements = Vec::new();
        let mut declared = 0;
        loop {
            while self.eat(TokenKind::Semicolon) {}
            if self.check(end) || self.is_at_end() {
                break;
            }
            let statement = self.statement()?;
            declared += usize::from(statement.declares);
            statements.push(statement.node);
        }
        Ok((statements, declared))
    }

    /// `{ statements }`
    pub(crate) fn block(&mut self) -> Result<Block, ParseError> {
        let pos = self.expect(TokenKind::LBrace, "'{'")?.pos;
        let (statements, declared) = self.statements_until(TokenKind::RBrace)?;
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Block::new(pos, statements, declared))
    }

    /// A braced block or a single statement.
    pub(crate) fn body(&mut self) -> Result<Block, ParseError> {
        if self.check(TokenKind::LBrace) {
            return self.block();
        }
        let pos = self.current_pos().clone();
        let statement = self.statement()?;
        Ok(Block::new(
            pos,
            vec![statement.node],
            usize::from(statement.declares),
        ))
    }

    /// `( expr )`
    pub(crate) fn condition(&mut self) -> Result<NodeBox, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.expression()?.into_node();
        self.expect(TokenKind::RParen, "')'")?;
        Ok(cond)
    }

    fn val_decl(&mut self) -> Result<Stmt, ParseError> {
        self.binding(false)
    }

    fn var_decl(&mut self) -> Result<Stmt, ParseError> {
        self.binding(true)
    }

    fn binding(&mut self, mutable: bool) -> Result<Stmt, ParseError> {
        let pos = self.advance().pos;
        let (name, _) = self.ident("a variable name")?;
        let init = if self.eat(TokenKind::Eq) {
            Some(self.expression()?.into_node())
        } else {
            None
        };
        Ok(Stmt::binding(Box::new(VarDecl {
            pos,
            name,
            mutable,
            init,
        })))
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        Ok(Stmt::plain(self.if_expr()?))
    }

    fn while_loop(&mut self) -> Result<Stmt, ParseError> {
        let (label, pos) = self.loop_head();
        let cond = self.condition()?;
        let body = self.in_loop(label, Self::body)?;
        Ok(Stmt::plain(Box::new(While {
            pos,
            label,
            cond,
            body,
        })))
    }

    /// `do body while (cond)`
    fn do_while(&mut self) -> Result<Stmt, ParseError> {
        let (label, pos) = self.loop_head();
        let body = self.in_loop(label, Self::body)?;
        while self.check(TokenKind::Semicolon) && self.cursor.peek(1).is_word("while") {
            self.advance();
        }
        if !self.eat_word("while") {
            return Err(ParseError::expected("'while'", self.current()));
        }
        let cond = self.condition()?;
        Ok(Stmt::plain(Box::new(DoWhile {
            pos,
            label,
            body,
            cond,
        })))
    }

    /// `for (name in iterable) body`
    fn for_in(&mut self) -> Result<Stmt, ParseError> {
        let (label, pos) = self.loop_head();
        self.expect(TokenKind::LParen, "'('")?;
        let (var, _) = self.ident("a loop variable")?;
        if !self.eat_word("in") {
            return Err(ParseError::expected("'in'", self.current()));
        }
        let iterable = self.expression()?.into_node();
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.in_loop(label, Self::body)?;
        Ok(Stmt::plain(Box::new(ForIn {
            pos,
            label,
            var,
            iterable,
            body,
        })))
    }

    /// `fun name(..) { .. }` or `fun Class.name(..) { .. }`. A `fun`
    /// followed by `(` is a function literal in statement position.
    fn fun_decl(&mut self) -> Result<Stmt, ParseError> {
        if self.cursor.peek(1).kind == TokenKind::LParen {
            let node = self.expression()?.into_node();
            return Ok(Stmt::plain(node));
        }
        let pos = self.advance().pos;
        let (first, first_pos) = self.ident("a function name")?;
        if self.eat(TokenKind::Dot) {
            let (name, _) = self.ident("a method name")?;
            let def = self.function(name, pos.clone())?;
            return Ok(Stmt::plain(Box::new(ExtensionDecl {
                pos,
                class: first,
                class_pos: first_pos,
                def,
            })));
        }
        let def = self.function(first, pos.clone())?;
        Ok(Stmt::binding(Box::new(FnDecl { pos, def })))
    }

    fn break_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.advance();
        let label = self.jump_label(&keyword)?;
        Ok(Stmt::plain(Box::new(Break {
            pos: keyword.pos,
            label,
        })))
    }

    fn continue_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.advance();
        let label = self.jump_label(&keyword)?;
        Ok(Stmt::plain(Box::new(Continue {
            pos: keyword.pos,
            label,
        })))
    }

    /// The optional label after `break`/`continue`, which must be on the
    /// same line and name an enclosing loop.
    fn jump_label(&mut self, keyword: &Token) -> Result<Option<Name>, ParseError> {
        let token = self.current();
        let label = if token.kind == TokenKind::Id
            && !is_keyword(&token.lexeme)
            && self.cursor.on_same_line()
        {
            let token = self.advance();
            let name = Name::intern(&token.lexeme);
            if !self.labels.contains(&name) {
                return Err(ParseError::new(
                    &token.pos,
                    format!("undefined label: {name}"),
                ));
            }
            Some(name)
        } else {
            None
        };
        if self.loop_depth == 0 {
            return Err(ParseError::new(
                &keyword.pos,
                format!("'{}' outside of a loop", keyword.lexeme),
            ));
        }
        Ok(label)
    }

    /// `return [expr]`; the value must start on the same line.
    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.advance().pos;
        let has_value = self.cursor.on_same_line()
            && !matches!(
                self.current_kind(),
                TokenKind::RBrace | TokenKind::Semicolon | TokenKind::Eof
            );
        let value = if has_value {
            Some(self.expression()?.into_node())
        } else {
            None
        };
        Ok(Stmt::plain(Box::new(Return { pos, value })))
    }

    fn throw_statement(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.advance().pos;
        let value = self.expression()?.into_node();
        Ok(Stmt::plain(Box::new(Throw { pos, value })))
    }

    /// `try { } catch (e) { } catch (e: Type) { } finally { }`
    fn try_statement(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.advance().pos;
        let body = self.block()?;
        let mut catches = Vec::new();
        while self.check_word("catch") {
            let pos = self.advance().pos;
            self.expect(TokenKind::LParen, "'('")?;
            let (name, _) = self.ident("an exception variable")?;
            let class = if self.eat(TokenKind::Colon) {
                Some(self.ident("an exception class")?)
            } else {
                None
            };
            self.expect(TokenKind::RParen, "')'")?;
            let body = self.block()?;
            catches.push(Catch {
                pos,
                name,
                class,
                body,
            });
        }
        let finally = if self.eat_word("finally") {
            Some(self.block()?)
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() {
            return Err(ParseError::expected("'catch' or 'finally'", self.current()));
        }
        Ok(Stmt::plain(Box::new(Try {
            pos,
            body,
            catches,
            finally,
        })))
    }
}
