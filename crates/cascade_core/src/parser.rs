use crate::ast::{
    AssignTarget, BinaryOp, Expr, ExprKind, FieldDecl, FieldInit, Function, Item, Param, Program,
    Stmt, StructDecl, UnaryOp,
};
use crate::diagnostics::Span;
use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub code: &'static str,
    pub message: String,
    pub span: Span,
}

pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    Parser::new(tokens).parse_program()
}

struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, index: 0 }
    }

    fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();
        while !self.is_eof() {
            match self.peek_kind() {
                TokenKind::Struct => items.push(Item::Struct(self.parse_struct()?)),
                TokenKind::Fn => items.push(Item::Function(self.parse_function()?)),
                TokenKind::Semicolon => {
                    self.bump();
                }
                _ => items.push(Item::Stmt(self.parse_stmt()?)),
            }
        }
        Ok(Program { items })
    }

    fn parse_struct(&mut self) -> Result<StructDecl, ParseError> {
        let start = self.expect_simple(TokenKind::Struct, "Expected 'struct' keyword.")?;
        let name = self.expect_ident("Expected struct name.")?;
        self.expect_simple(TokenKind::LBrace, "Expected '{' after struct name.")?;
        let mut fields: Vec<FieldDecl> = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            let field = self.parse_field_decl()?;
            if fields.iter().any(|existing| existing.name == field.name) {
                return Err(ParseError {
                    code: "E0203",
                    message: format!("Duplicate field '{}' in struct '{name}'.", field.name),
                    span: field.span,
                });
            }
            fields.push(field);
            if matches!(self.peek_kind(), TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        let end = self.expect_simple(TokenKind::RBrace, "Expected '}' to close struct.")?;
        Ok(StructDecl {
            name,
            fields,
            span: Span::new(start.span.start, end.span.end),
        })
    }

    fn parse_field_decl(&mut self) -> Result<FieldDecl, ParseError> {
        let start = self.current_span();
        let optional = match self.peek_kind() {
            TokenKind::Optional => {
                self.bump();
                true
            }
            TokenKind::Mandatory => {
                self.bump();
                false
            }
            _ => false,
        };
        let name = self.expect_ident("Expected field name.")?;
        Ok(FieldDecl {
            name,
            optional,
            span: Span::new(start.start, self.previous_span().end),
        })
    }

    fn parse_function(&mut self) -> Result<Function, ParseError> {
        let start = self.expect_simple(TokenKind::Fn, "Expected 'fn' keyword.")?;
        let name = self.expect_ident("Expected function name.")?;
        self.expect_simple(TokenKind::LParen, "Expected '(' after function name.")?;
        let mut params = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::RParen) {
            loop {
                let span = self.current_span();
                let param = self.expect_ident("Expected parameter name.")?;
                params.push(Param { name: param, span });
                if matches!(self.peek_kind(), TokenKind::Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect_simple(TokenKind::RParen, "Expected ')' after parameters.")?;
        let body = self.parse_block()?;
        Ok(Function {
            name,
            params,
            body,
            span: Span::new(start.span.start, self.previous_span().end),
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect_simple(TokenKind::LBrace, "Expected '{' to open block.")?;
        let mut stmts = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            if matches!(self.peek_kind(), TokenKind::Semicolon) {
                self.bump();
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect_simple(TokenKind::RBrace, "Expected '}' to close block.")?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Print => self.parse_print(),
            _ => self.parse_assign_or_expr(),
        }
    }

    fn parse_let(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_simple(TokenKind::Let, "Expected 'let' keyword.")?;
        let name = self.expect_ident("Expected variable name after 'let'.")?;
        self.expect_simple(TokenKind::Assign, "Expected '=' after variable name.")?;
        let expr = self.parse_expr("Expected expression after '='.")?;
        let span = Span::new(start.span.start, expr.span.end);
        self.eat_semicolon();
        Ok(Stmt::Let { name, expr, span })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_simple(TokenKind::If, "Expected 'if' keyword.")?;
        self.expect_simple(TokenKind::LParen, "Expected '(' after 'if'.")?;
        let cond = self.parse_expr("Expected condition expression.")?;
        self.expect_simple(TokenKind::RParen, "Expected ')' after condition.")?;
        let then_body = self.parse_block()?;
        let else_body = if matches!(self.peek_kind(), TokenKind::Else) {
            self.bump();
            if matches!(self.peek_kind(), TokenKind::If) {
                vec![self.parse_if()?]
            } else {
                self.parse_block()?
            }
        } else {
            Vec::new()
        };
        Ok(Stmt::If {
            cond,
            then_body,
            else_body,
            span: Span::new(start.span.start, self.previous_span().end),
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_simple(TokenKind::While, "Expected 'while' keyword.")?;
        self.expect_simple(TokenKind::LParen, "Expected '(' after 'while'.")?;
        let cond = self.parse_expr("Expected condition expression.")?;
        self.expect_simple(TokenKind::RParen, "Expected ')' after condition.")?;
        let body = self.parse_block()?;
        Ok(Stmt::While {
            cond,
            body,
            span: Span::new(start.span.start, self.previous_span().end),
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_simple(TokenKind::Return, "Expected 'return' keyword.")?;
        let expr = if matches!(
            self.peek_kind(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) {
            None
        } else {
            Some(self.parse_expr("Expected expression after 'return'.")?)
        };
        let span = Span::new(start.span.start, self.previous_span().end);
        self.eat_semicolon();
        Ok(Stmt::Return { expr, span })
    }

    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_simple(TokenKind::Print, "Expected 'print' keyword.")?;
        let expr = self.parse_expr("Expected expression after 'print'.")?;
        let span = Span::new(start.span.start, expr.span.end);
        self.eat_semicolon();
        Ok(Stmt::Print { expr, span })
    }

    fn parse_assign_or_expr(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr("Expected statement.")?;
        if matches!(self.peek_kind(), TokenKind::Assign) {
            self.bump();
            let target = assign_target(expr)?;
            let value = self.parse_expr("Expected expression after '='.")?;
            let span = Span::new(target_span(&target).start, value.span.end);
            self.eat_semicolon();
            return Ok(Stmt::Assign {
                target,
                expr: value,
                span,
            });
        }
        let span = expr.span;
        self.eat_semicolon();
        Ok(Stmt::Expr { expr, span })
    }

    fn eat_semicolon(&mut self) {
        if matches!(self.peek_kind(), TokenKind::Semicolon) {
            self.bump();
        }
    }

    fn parse_expr(&mut self, message: &str) -> Result<Expr, ParseError> {
        if matches!(self.peek_kind(), TokenKind::Eof) {
            return Err(self.error("E0200", message));
        }
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_and()?;
        while matches!(self.peek_kind(), TokenKind::OrOr) {
            self.bump();
            let right = self.parse_and()?;
            let span = Span::new(expr.span.start, right.span.end);
            expr = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(expr),
                    op: BinaryOp::OrOr,
                    right: Box::new(right),
                },
                span,
            };
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_equality()?;
        while matches!(self.peek_kind(), TokenKind::AndAnd) {
            self.bump();
            let right = self.parse_equality()?;
            let span = Span::new(expr.span.start, right.span.end);
            expr = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(expr),
                    op: BinaryOp::AndAnd,
                    right: Box::new(right),
                },
                span,
            };
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_compare()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::EqEq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.bump();
            let right = self.parse_compare()?;
            let span = Span::new(expr.span.start, right.span.end);
            expr = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                span,
            };
        }
        Ok(expr)
    }

    fn parse_compare(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_add()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.bump();
            let right = self.parse_add()?;
            let span = Span::new(expr.span.start, right.span.end);
            expr = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                span,
            };
        }
        Ok(expr)
    }

    fn parse_add(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_mul()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.bump();
            let right = self.parse_mul()?;
            let span = Span::new(expr.span.start, right.span.end);
            expr = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                span,
            };
        }
        Ok(expr)
    }

    fn parse_mul(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.bump();
            let right = self.parse_unary()?;
            let span = Span::new(expr.span.start, right.span.end);
            expr = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                span,
            };
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let start = self.bump().span.start;
        let expr = self.parse_unary()?;
        let span = Span::new(start, expr.span.end);
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
            span,
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.bump();
                    let field = self.expect_ident("Expected field name after '.'.")?;
                    let span = Span::new(expr.span.start, self.previous_span().end);
                    expr = Expr {
                        kind: ExprKind::Field {
                            base: Box::new(expr),
                            field,
                        },
                        span,
                    };
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.parse_expr("Expected index expression.")?;
                    let end =
                        self.expect_simple(TokenKind::RBracket, "Expected ']' after index.")?;
                    let span = Span::new(expr.span.start, end.span.end);
                    expr = Expr {
                        kind: ExprKind::Index {
                            base: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    };
                }
                TokenKind::LParen => {
                    self.bump();
                    let mut args = Vec::new();
                    if !matches!(self.peek_kind(), TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr("Expected call argument.")?);
                            if matches!(self.peek_kind(), TokenKind::Comma) {
                                self.bump();
                            } else {
                                break;
                            }
                        }
                    }
                    let end =
                        self.expect_simple(TokenKind::RParen, "Expected ')' after arguments.")?;
                    let span = Span::new(expr.span.start, end.span.end);
                    expr = Expr {
                        kind: ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek_kind().clone();
        match token {
            TokenKind::NumberLit(value) => {
                let token = self.bump();
                Ok(Expr {
                    kind: ExprKind::Number(value),
                    span: token.span,
                })
            }
            TokenKind::BoolLit(value) => {
                let token = self.bump();
                Ok(Expr {
                    kind: ExprKind::Bool(value),
                    span: token.span,
                })
            }
            TokenKind::StringLit(value) => {
                let token = self.bump();
                Ok(Expr {
                    kind: ExprKind::Str(value),
                    span: token.span,
                })
            }
            TokenKind::Null => {
                let token = self.bump();
                Ok(Expr {
                    kind: ExprKind::Null,
                    span: token.span,
                })
            }
            TokenKind::Ident(name) => {
                let token = self.bump();
                Ok(Expr {
                    kind: ExprKind::Ident(name),
                    span: token.span,
                })
            }
            TokenKind::New => self.parse_new_expr(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LParen => {
                let start = self.bump().span.start;
                let expr = self.parse_expr("Expected expression in parentheses.")?;
                let end = self.expect_simple(TokenKind::RParen, "Expected ')' after expression.")?;
                Ok(Expr {
                    kind: expr.kind,
                    span: Span::new(start, end.span.end),
                })
            }
            _ => Err(self.error("E0200", "Expected expression.")),
        }
    }

    fn parse_new_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect_simple(TokenKind::New, "Expected 'new'.")?;
        let type_name = self.expect_ident("Expected type name after 'new'.")?;
        self.expect_simple(TokenKind::LBrace, "Expected '{' after type name.")?;
        let fields = self.parse_field_inits()?;
        let end = self.expect_simple(TokenKind::RBrace, "Expected '}' after field list.")?;
        Ok(Expr {
            kind: ExprKind::New { type_name, fields },
            span: Span::new(start.span.start, end.span.end),
        })
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect_simple(TokenKind::LBrace, "Expected '{'.")?;
        let fields = self.parse_field_inits()?;
        let end = self.expect_simple(TokenKind::RBrace, "Expected '}' after field list.")?;
        Ok(Expr {
            kind: ExprKind::ObjectLit(fields),
            span: Span::new(start.span.start, end.span.end),
        })
    }

    fn parse_field_inits(&mut self) -> Result<Vec<FieldInit>, ParseError> {
        let mut fields: Vec<FieldInit> = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            let start = self.current_span();
            let name = self.expect_ident("Expected field name.")?;
            if fields.iter().any(|existing| existing.name == name) {
                return Err(ParseError {
                    code: "E0203",
                    message: format!("Duplicate field '{name}' in initializer."),
                    span: Span::new(start.start, self.previous_span().end),
                });
            }
            self.expect_simple(TokenKind::Colon, "Expected ':' after field name.")?;
            let expr = self.parse_expr("Expected field value expression.")?;
            let span = Span::new(start.start, expr.span.end);
            fields.push(FieldInit { name, expr, span });
            if matches!(self.peek_kind(), TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        Ok(fields)
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.bump().span.start;
        let mut elements = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::RBracket) {
            loop {
                elements.push(self.parse_expr("Expected array element expression.")?);
                if matches!(self.peek_kind(), TokenKind::Comma) {
                    self.bump();
                    if matches!(self.peek_kind(), TokenKind::RBracket) {
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        let end = self.expect_simple(TokenKind::RBracket, "Expected ']' after array literal.")?;
        Ok(Expr {
            kind: ExprKind::ArrayLit(elements),
            span: Span::new(start, end.span.end),
        })
    }

    fn expect_simple(&mut self, expected: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.peek_kind() == &expected {
            Ok(self.bump())
        } else {
            Err(self.error("E0200", message))
        }
    }

    fn expect_ident(&mut self, message: &str) -> Result<String, ParseError> {
        match self.peek_kind() {
            TokenKind::Ident(_) => {
                let token = self.bump();
                match token.kind {
                    TokenKind::Ident(name) => Ok(name),
                    _ => unreachable!("peeked identifier token"),
                }
            }
            _ => Err(self.error("E0201", message)),
        }
    }

    fn error(&self, code: &'static str, message: &str) -> ParseError {
        ParseError {
            code,
            message: message.to_string(),
            span: self.current_span(),
        }
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.index.min(self.tokens.len() - 1)].kind
    }

    fn current_span(&self) -> Span {
        self.tokens[self.index.min(self.tokens.len() - 1)].span
    }

    fn previous_span(&self) -> Span {
        let index = self.index.saturating_sub(1);
        self.tokens[index.min(self.tokens.len() - 1)].span
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.index.min(self.tokens.len() - 1)].clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }
}

fn assign_target(expr: Expr) -> Result<AssignTarget, ParseError> {
    let span = expr.span;
    match expr.kind {
        ExprKind::Ident(name) => Ok(AssignTarget::Ident { name, span }),
        ExprKind::Field { base, field } => Ok(AssignTarget::Field {
            base: *base,
            field,
            span,
        }),
        ExprKind::Index { base, index } => Ok(AssignTarget::Index {
            base: *base,
            index: *index,
            span,
        }),
        _ => Err(ParseError {
            code: "E0202",
            message: "Invalid assignment target.".to_string(),
            span,
        }),
    }
}

fn target_span(target: &AssignTarget) -> Span {
    match target {
        AssignTarget::Ident { span, .. }
        | AssignTarget::Field { span, .. }
        | AssignTarget::Index { span, .. } => *span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_source(source: &str) -> Program {
        let tokens = lex(source).unwrap();
        parse(&tokens).unwrap()
    }

    fn parse_error(source: &str) -> ParseError {
        let tokens = lex(source).unwrap();
        parse(&tokens).unwrap_err()
    }

    #[test]
    fn parse_struct_with_prefixes_and_trailing_comma() {
        let program = parse_source("struct N { mandatory id, optional next, }");
        let Item::Struct(decl) = &program.items[0] else {
            panic!("expected struct item");
        };
        assert_eq!(decl.name, "N");
        assert_eq!(decl.fields.len(), 2);
        assert!(!decl.fields[0].optional);
        assert!(decl.fields[1].optional);
    }

    #[test]
    fn parse_unprefixed_field_is_mandatory() {
        let program = parse_source("struct N { id }");
        let Item::Struct(decl) = &program.items[0] else {
            panic!("expected struct item");
        };
        assert!(!decl.fields[0].optional);
    }

    #[test]
    fn parse_rejects_duplicate_struct_field() {
        let err = parse_error("struct N { id, id }");
        assert_eq!(err.code, "E0203");
    }

    #[test]
    fn parse_new_with_field_inits() {
        let program = parse_source("let a = new N { id: 1, next: null }");
        let Item::Stmt(Stmt::Let { expr, .. }) = &program.items[0] else {
            panic!("expected let item");
        };
        let ExprKind::New { type_name, fields } = &expr.kind else {
            panic!("expected new expression");
        };
        assert_eq!(type_name, "N");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "id");
    }

    #[test]
    fn parse_untyped_object_literal() {
        let program = parse_source("let o = { x: 1 }");
        let Item::Stmt(Stmt::Let { expr, .. }) = &program.items[0] else {
            panic!("expected let item");
        };
        assert!(matches!(expr.kind, ExprKind::ObjectLit(ref fields) if fields.len() == 1));
    }

    #[test]
    fn parse_field_assignment_target() {
        let program = parse_source("a.next = b;");
        let Item::Stmt(Stmt::Assign { target, .. }) = &program.items[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(target, AssignTarget::Field { field, .. } if field == "next"));
    }

    #[test]
    fn parse_index_assignment_target() {
        let program = parse_source("xs[0] = null");
        let Item::Stmt(Stmt::Assign { target, .. }) = &program.items[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(target, AssignTarget::Index { .. }));
    }

    #[test]
    fn parse_rejects_invalid_assignment_target() {
        let err = parse_error("1 + 2 = 3");
        assert_eq!(err.code, "E0202");
    }

    #[test]
    fn parse_if_else_chain() {
        let program = parse_source("if (a < 1) { print 1 } else if (a < 2) { print 2 } else { print 3 }");
        let Item::Stmt(Stmt::If { else_body, .. }) = &program.items[0] else {
            panic!("expected if statement");
        };
        assert!(matches!(else_body[0], Stmt::If { .. }));
    }

    #[test]
    fn parse_function_and_call() {
        let program = parse_source("fn add(a, b) { return a + b } let x = add(1, 2)");
        assert!(matches!(program.items[0], Item::Function(ref f) if f.params.len() == 2));
        let Item::Stmt(Stmt::Let { expr, .. }) = &program.items[1] else {
            panic!("expected let item");
        };
        assert!(matches!(expr.kind, ExprKind::Call { ref args, .. } if args.len() == 2));
    }

    #[test]
    fn parse_bare_return() {
        let program = parse_source("fn noop() { return }");
        let Item::Function(function) = &program.items[0] else {
            panic!("expected function");
        };
        assert!(matches!(function.body[0], Stmt::Return { expr: None, .. }));
    }

    #[test]
    fn parse_precedence_mul_binds_tighter_than_add() {
        let program = parse_source("let x = 1 + 2 * 3");
        let Item::Stmt(Stmt::Let { expr, .. }) = &program.items[0] else {
            panic!("expected let item");
        };
        let ExprKind::Binary { op, right, .. } = &expr.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            right.kind,
            ExprKind::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn parse_postfix_chain() {
        let program = parse_source("let v = a.items[0].next");
        let Item::Stmt(Stmt::Let { expr, .. }) = &program.items[0] else {
            panic!("expected let item");
        };
        assert!(matches!(expr.kind, ExprKind::Field { ref field, .. } if field == "next"));
    }

    #[test]
    fn parse_statements_without_semicolons() {
        let program = parse_source("let a = 1 let b = 2 a = b");
        assert_eq!(program.items.len(), 3);
    }
}
