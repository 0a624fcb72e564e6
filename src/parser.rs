//! Token slice -> AST. Recursive-descent with an explicit precedence-climbing
//! expression parser (one function per precedence level), operating over a
//! cursor index into a `&[Token]` rather than over raw text.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};

pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

type PResult<T> = Result<T, ParseError>;

const STMT_RESYNC: &[TokenKind] = &[TokenKind::Semicolon, TokenKind::End, TokenKind::Eof];

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_program(&mut self) -> PResult<Program> {
        let mut statements = Vec::new();
        while !self.at_eof() {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    // ---- token cursor helpers ----

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// One token past the current one, for disambiguating the optional
    /// `: type` that precedes the mandatory block-opening `:`.
    fn peek2_kind(&self) -> &TokenKind {
        let idx = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn is_type_token(kind: &TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::TypeInt | TokenKind::TypeFloat | TokenKind::TypeString | TokenKind::TypeBool
        )
    }

    /// Parse the function/lambda `(":" type)? ":"` tail: a return-type
    /// annotation is present only when a type keyword follows the colon,
    /// which disambiguates it from the block-opening colon that always
    /// follows (with or without a type in between).
    fn parse_optional_return_type(&mut self) -> PResult<Option<TypeAnnotation>> {
        let return_ty = if self.check(&TokenKind::Colon) && Self::is_type_token(self.peek2_kind()) {
            self.advance(); // the return-type-opening colon
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        self.expect(TokenKind::Colon, "':'")?;
        Ok(return_ty)
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: format!("{:?}", self.peek_kind()),
            line: self.peek().line,
        }
    }

    fn skip_semicolons(&mut self) {
        while self.matches(&TokenKind::Semicolon) {}
    }

    /// Skip to the next statement boundary after a parse failure.
    fn resync(&mut self) {
        while !STMT_RESYNC.contains(self.peek_kind()) && !self.at_eof() {
            self.advance();
        }
        self.matches(&TokenKind::Semicolon);
    }

    fn expect_ident(&mut self) -> PResult<String> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn parse_type_annotation(&mut self) -> PResult<TypeAnnotation> {
        let ty = match self.peek_kind() {
            TokenKind::TypeInt => TypeAnnotation::Int,
            TokenKind::TypeFloat => TypeAnnotation::Float,
            TokenKind::TypeString => TypeAnnotation::Str,
            TokenKind::TypeBool => TypeAnnotation::Bool,
            _ => return Err(self.unexpected("type annotation")),
        };
        self.advance();
        Ok(ty)
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> PResult<Stmt> {
        let stmt = match self.peek_kind() {
            TokenKind::Let => self.parse_let(),
            TokenKind::Func => self.parse_func_decl(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Print => self.parse_print(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Use => self.parse_use(),
            TokenKind::Break => {
                let line = self.advance().line;
                Ok(Stmt::Break { line })
            }
            TokenKind::Continue => {
                let line = self.advance().line;
                Ok(Stmt::Continue { line })
            }
            _ => self.parse_assign_or_expr_stmt(),
        };
        match stmt {
            Ok(s) => {
                self.skip_semicolons();
                Ok(s)
            }
            Err(e) => {
                self.resync();
                Err(e)
            }
        }
    }

    fn parse_block_until(&mut self, terminators: &[TokenKind]) -> PResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while !terminators.contains(self.peek_kind()) && !self.at_eof() {
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_let(&mut self) -> PResult<Stmt> {
        let line = self.advance().line; // 'let'
        let name = self.expect_ident()?;
        let ty = if self.matches(&TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_expression()?;
        Ok(Stmt::Let {
            name,
            ty,
            value,
            line,
        })
    }

    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let name = self.expect_ident()?;
            let ty = if self.matches(&TokenKind::Colon) {
                Some(self.parse_type_annotation()?)
            } else {
                None
            };
            params.push(Param { name, ty });
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn parse_func_decl(&mut self) -> PResult<Stmt> {
        let line = self.advance().line; // 'func'
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, "')'")?;
        let return_ty = self.parse_optional_return_type()?;
        let body = self.parse_block_until(&[TokenKind::End])?;
        self.expect(TokenKind::End, "'end'")?;
        Ok(Stmt::FuncDef {
            name,
            params,
            return_ty,
            body,
            line,
        })
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let line = self.advance().line; // 'if'
        let cond = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let then_block = self.parse_block_until(&[TokenKind::Else, TokenKind::End])?;
        let else_block = if self.matches(&TokenKind::Else) {
            self.expect(TokenKind::Colon, "':'")?;
            Some(self.parse_block_until(&[TokenKind::End])?)
        } else {
            None
        };
        self.expect(TokenKind::End, "'end'")?;
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
            line,
        })
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let line = self.advance().line; // 'while'
        let cond = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let body = self.parse_block_until(&[TokenKind::End])?;
        self.expect(TokenKind::End, "'end'")?;
        Ok(Stmt::While { cond, body, line })
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        let line = self.advance().line; // 'for'
        let var = self.expect_ident()?;
        self.expect(TokenKind::In, "'in'")?;
        let start = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let end = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        // The colon just consumed opens either an optional step expression or
        // the block. Try the step reading; if it doesn't resolve to
        // `expression ":"`, rewind and treat the colon as the block's.
        let rewind_pos = self.pos;
        let step = match self.parse_expression() {
            Ok(expr) if self.check(&TokenKind::Colon) => {
                self.advance(); // the block-opening colon
                Some(expr)
            }
            _ => {
                self.pos = rewind_pos;
                None
            }
        };
        let body = self.parse_block_until(&[TokenKind::End])?;
        self.expect(TokenKind::End, "'end'")?;
        Ok(Stmt::ForRange {
            var,
            start,
            end,
            step,
            body,
            line,
        })
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let line = self.advance().line; // 'return'
        let value = if matches!(
            self.peek_kind(),
            TokenKind::Semicolon | TokenKind::End | TokenKind::Eof
        ) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Ok(Stmt::Return { value, line })
    }

    fn parse_print(&mut self) -> PResult<Stmt> {
        let line = self.advance().line; // 'print'
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(Stmt::Print { args, line })
    }

    fn parse_switch(&mut self) -> PResult<Stmt> {
        let line = self.advance().line; // 'switch'
        let subject = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let mut cases = Vec::new();
        let mut default = None;
        loop {
            match self.peek_kind() {
                TokenKind::Case => {
                    let case_line = self.advance().line;
                    let value = self.parse_expression()?;
                    self.expect(TokenKind::Colon, "':'")?;
                    let body =
                        self.parse_block_until(&[TokenKind::Case, TokenKind::Default, TokenKind::End])?;
                    cases.push(CaseArm {
                        value,
                        body,
                        line: case_line,
                    });
                }
                TokenKind::Default => {
                    self.advance();
                    self.expect(TokenKind::Colon, "':'")?;
                    default = Some(self.parse_block_until(&[TokenKind::End])?);
                }
                _ => break,
            }
        }
        self.expect(TokenKind::End, "'end'")?;
        Ok(Stmt::Switch {
            subject,
            cases,
            default,
            line,
        })
    }

    fn parse_try(&mut self) -> PResult<Stmt> {
        let line = self.advance().line; // 'try'
        self.expect(TokenKind::Colon, "':'")?;
        let body = self.parse_block_until(&[TokenKind::Catch])?;
        self.expect(TokenKind::Catch, "'catch'")?;
        let error_var = self.expect_ident()?;
        self.expect(TokenKind::Colon, "':'")?;
        let handler = self.parse_block_until(&[TokenKind::End])?;
        self.expect(TokenKind::End, "'end'")?;
        Ok(Stmt::Try {
            body,
            error_var,
            handler,
            line,
        })
    }

    fn parse_use(&mut self) -> PResult<Stmt> {
        let line = self.advance().line; // 'use'
        let path = match self.peek_kind().clone() {
            TokenKind::Str(s) => {
                self.advance();
                s
            }
            TokenKind::Ident(name) => {
                self.advance();
                name
            }
            _ => return Err(self.unexpected("module path")),
        };
        self.expect(TokenKind::As, "'as'")?;
        let alias = self.expect_ident()?;
        Ok(Stmt::Use { path, alias, line })
    }

    /// Disambiguates plain assignment, array-assign, object-assign, and bare
    /// expression statements, all of which start with a primary expression.
    fn parse_assign_or_expr_stmt(&mut self) -> PResult<Stmt> {
        let line = self.peek().line;
        let start_pos = self.pos;

        if let TokenKind::Ident(name) = self.peek_kind().clone() {
            self.advance();
            if self.matches(&TokenKind::Assign) {
                let value = self.parse_expression()?;
                return Ok(Stmt::Assign { name, value, line });
            }
            if self.check(&TokenKind::LBracket) {
                self.advance();
                let index = self.parse_expression()?;
                self.expect(TokenKind::RBracket, "']'")?;
                if self.matches(&TokenKind::Assign) {
                    let value = self.parse_expression()?;
                    return Ok(Stmt::ArrayAssign {
                        subject: Expr::Ident(name, line),
                        index,
                        value,
                        line,
                    });
                }
                // Not an assignment after all; rewind and fall through to a
                // full expression parse so postfix chains still work.
                self.pos = start_pos;
            } else if self.check(&TokenKind::Dot) {
                self.advance();
                let property = self.expect_ident()?;
                if self.matches(&TokenKind::Assign) {
                    let value = self.parse_expression()?;
                    return Ok(Stmt::ObjectAssign {
                        subject: Expr::Ident(name, line),
                        property,
                        value,
                        line,
                    });
                }
                self.pos = start_pos;
            } else {
                self.pos = start_pos;
            }
        }

        let expr = self.parse_expression()?;
        Ok(Stmt::ExprStmt { expr, line })
    }

    // ---- expressions: precedence-climbing ----

    pub fn parse_expression(&mut self) -> PResult<Expr> {
        self.parse_ternary()
    }

    /// `cond ? then : else`, binding looser than every other binary operator
    /// and right-associative, so `a ? b : c ? d : e` reads as
    /// `a ? b : (c ? d : e)`.
    fn parse_ternary(&mut self) -> PResult<Expr> {
        let cond = self.parse_or()?;
        if self.check(&TokenKind::Question) {
            let line = self.advance().line;
            let then_branch = self.parse_ternary()?;
            self.expect(TokenKind::Colon, "':'")?;
            let else_branch = self.parse_ternary()?;
            Ok(Expr::Ternary {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                line,
            })
        } else {
            Ok(cond)
        }
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::Or) {
            let line = self.advance().line;
            let right = self.parse_and()?;
            left = Expr::Binary {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::And) {
            let line = self.advance().line;
            let right = self.parse_equality()?;
            left = Expr::Binary {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::NotEq,
                _ => break,
            };
            let line = self.advance().line;
            let right = self.parse_relational()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            let line = self.advance().line;
            let right = self.parse_additive()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let line = self.advance().line;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let line = self.advance().line;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        match self.peek_kind() {
            TokenKind::Minus => {
                let line = self.advance().line;
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnOp::Neg,
                    operand: Box::new(operand),
                    line,
                })
            }
            TokenKind::Not => {
                let line = self.advance().line;
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                    line,
                })
            }
            _ => self.parse_postfix(),
        }
    }

    /// Primary expression followed by any chain of call / index / dot
    /// postfix operators.
    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    let line = self.advance().line;
                    let args = self.parse_call_args()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        line,
                    };
                }
                TokenKind::LBracket => {
                    let line = self.advance().line;
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr::ArrayAccess {
                        subject: Box::new(expr),
                        index: Box::new(index),
                        line,
                    };
                }
                TokenKind::Dot => {
                    let line = self.advance().line;
                    let name = self.expect_ident()?;
                    if self.check(&TokenKind::LParen) {
                        self.advance();
                        let args = self.parse_call_args()?;
                        expr = Expr::DotCall {
                            left: Box::new(expr),
                            method: name,
                            args,
                            line,
                        };
                    } else {
                        expr = Expr::DotAccess {
                            left: Box::new(expr),
                            right: name,
                            line,
                        };
                    }
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    /// `func(params): body end` in expression position is an anonymous
    /// function literal (`Expr::Lambda`) that closes over its defining scope;
    /// named `func` declarations only ever appear at statement position.
    fn parse_lambda(&mut self) -> PResult<Expr> {
        let line = self.advance().line; // 'func'
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.parse_optional_return_type()?;
        let body = self.parse_block_until(&[TokenKind::End])?;
        self.expect(TokenKind::End, "'end'")?;
        Ok(Expr::Lambda { params, body, line })
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let line = self.peek().line;
        match self.peek_kind().clone() {
            TokenKind::Func => self.parse_lambda(),
            TokenKind::Int(v) => {
                self.advance();
                Ok(Expr::IntLit(v, line))
            }
            TokenKind::Float(v) => {
                self.advance();
                Ok(Expr::FloatLit(v, line))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::StrLit(s, line))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::BoolLit(true, line))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::BoolLit(false, line))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Ident(name, line))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    loop {
                        items.push(self.parse_expression()?);
                        if !self.matches(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(Expr::ArrayLit { items, line })
            }
            _ => Err(self.unexpected("expression")),
        }
    }
}

/// Parse a full program from an already-lexed token slice.
pub fn parse(tokens: &[Token]) -> PResult<Program> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_src(src: &str) -> Program {
        let tokens = Lexer::new(src).tokenize();
        parse(&tokens).expect("parse should succeed")
    }

    #[test]
    fn parses_let_with_precedence() {
        let program = parse_src("let x = 2 + 3 * 4;");
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Stmt::Let { name, value, .. } => {
                assert_eq!(name, "x");
                match value {
                    Expr::Binary { op: BinOp::Add, right, .. } => {
                        assert!(matches!(**right, Expr::Binary { op: BinOp::Mul, .. }));
                    }
                    other => panic!("unexpected expr {other:?}"),
                }
            }
            other => panic!("unexpected stmt {other:?}"),
        }
    }

    #[test]
    fn parses_for_range_with_step() {
        let program = parse_src("for i in 10:1:-2: print(i); end");
        assert_eq!(program.statements.len(), 1);
        assert!(matches!(
            &program.statements[0],
            Stmt::ForRange { step: Some(_), .. }
        ));
    }

    #[test]
    fn parses_for_range_without_step() {
        let program = parse_src("for i in 1:5: print(i); end");
        assert!(matches!(
            &program.statements[0],
            Stmt::ForRange { step: None, .. }
        ));
    }

    #[test]
    fn parses_function_definition() {
        let program = parse_src("func double(n): return n * 2; end");
        match &program.statements[0] {
            Stmt::FuncDef { name, params, .. } => {
                assert_eq!(name, "double");
                assert_eq!(params.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_function_definition_with_return_type_and_no_step_for_loop() {
        // regression check: the optional `: type` before the block-opening
        // colon must not swallow the colon it shares a token kind with.
        let program = parse_src("func double(n: int): int: return n * 2; end for i in 1:5: print(i); end");
        assert!(matches!(&program.statements[0], Stmt::FuncDef { return_ty: Some(TypeAnnotation::Int), .. }));
        assert!(matches!(
            &program.statements[1],
            Stmt::ForRange { step: None, .. }
        ));
    }

    #[test]
    fn parses_anonymous_lambda_literal() {
        let program = parse_src("let add = func(n): return n + 1; end");
        match &program.statements[0] {
            Stmt::Let { value: Expr::Lambda { params, .. }, .. } => {
                assert_eq!(params.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_try_catch() {
        let program = parse_src("try: let x = 10 / 0; catch err: print(err); end");
        assert!(matches!(&program.statements[0], Stmt::Try { .. }));
    }

    #[test]
    fn parses_use_statement() {
        let program = parse_src(r#"use "m" as m;"#);
        assert!(matches!(&program.statements[0], Stmt::Use { .. }));
    }

    #[test]
    fn parses_module_qualified_call() {
        let program = parse_src("print(m.double(21));");
        assert!(matches!(&program.statements[0], Stmt::Print { .. }));
    }

    #[test]
    fn parses_array_literal_and_index() {
        let program = parse_src("let a = [1, 2, 3]; let x = a[0];");
        assert!(matches!(
            &program.statements[0],
            Stmt::Let { value: Expr::ArrayLit { .. }, .. }
        ));
    }

    #[test]
    fn parses_array_assign() {
        let program = parse_src("a[0] = 5;");
        assert!(matches!(&program.statements[0], Stmt::ArrayAssign { .. }));
    }

    #[test]
    fn bare_identifier_is_expr_statement() {
        let program = parse_src("x;");
        assert!(matches!(&program.statements[0], Stmt::ExprStmt { .. }));
    }

    #[test]
    fn parses_ternary_expression() {
        let program = parse_src("let x = a > b ? a : b;");
        match &program.statements[0] {
            Stmt::Let { value: Expr::Ternary { .. }, .. } => {}
            other => panic!("unexpected stmt {other:?}"),
        }
    }

    #[test]
    fn parses_break_and_continue_inside_a_loop_body() {
        let program = parse_src("while true: if x: break; end continue; end");
        assert!(matches!(&program.statements[0], Stmt::While { .. }));
        let Stmt::While { body, .. } = &program.statements[0] else {
            unreachable!()
        };
        assert!(matches!(body[0], Stmt::If { .. }));
        assert!(matches!(body[1], Stmt::Continue { .. }));
    }
}
