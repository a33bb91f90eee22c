//! Recursive-descent parsing straight into the AST.
//!
//! The grammar's scaffolding productions (`Exp2`, `Exp3`, `Term2`, `Term3`)
//! only live long enough to fold into the final right-leaning `Exp` tree;
//! everywhere else the parse tree and the AST are the same shape, so this
//! parser builds the AST directly rather than maintaining two separate
//! tree types. The one place the two-phase "parse scaffolding, then fold"
//! structure survives is [`Parser::exp`]/[`Parser::term`] below, which
//! collect a left-to-right list of operator/operand pairs and then fold it
//! right-associatively — not a naive left-fold.

use nanoc_lex::{Token, TokenKind};
use nanoc_util::{Span, Symbol};
use thiserror::Error;

use crate::ast::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected token at {span:?}: expected {expected}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
        span: Span,
    },
    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: &'static str },
}

type PResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    kw_int: Symbol,
    kw_if: Symbol,
    kw_else: Symbol,
    kw_return: Symbol,
}

/// Parse a complete token stream (already terminated with [`TokenKind::Eof`]
/// per `nanoc_lex::tokenize`) into a [`Program`].
pub fn parse(tokens: &[Token], interner: &nanoc_util::symbol::Interner) -> PResult<Program> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        kw_int: interner.kw_int(),
        kw_if: interner.kw_if(),
        kw_else: interner.kw_else(),
        kw_return: interner.kw_return(),
    };
    parser.program()
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn is_ident(&self, sym: Symbol) -> bool {
        matches!(self.peek().kind, TokenKind::Identifier(s) if s == sym)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos];
        if !tok.is_eof() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> PResult<Token> {
        let tok = *self.peek();
        if tok.kind == kind {
            self.bump();
            Ok(tok)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let tok = *self.peek();
        if tok.is_eof() {
            ParseError::UnexpectedEof { expected }
        } else {
            ParseError::Unexpected {
                expected,
                found: format!("{:?}", tok.kind),
                span: tok.span,
            }
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> PResult<(Symbol, Span)> {
        let tok = *self.peek();
        if let TokenKind::Identifier(sym) = tok.kind {
            self.bump();
            Ok((sym, tok.span))
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_keyword(&mut self, kw: Symbol, expected: &'static str) -> PResult<Span> {
        let tok = *self.peek();
        if self.is_ident(kw) {
            self.bump();
            Ok(tok.span)
        } else {
            Err(self.unexpected(expected))
        }
    }

    // program -> def*
    fn program(&mut self) -> PResult<Program> {
        let mut funcs = Vec::new();
        while !self.peek().is_eof() {
            funcs.push(self.func_def()?);
        }
        Ok(funcs)
    }

    // def -> "int" ident "(" params? ")" block
    fn func_def(&mut self) -> PResult<Func> {
        let start = self.expect_keyword(self.kw_int, "`int`")?;
        let (name, _) = self.expect_ident("function name")?;
        self.expect(TokenKind::LeftParen, "`(`")?;
        let params = if self.peek().kind == TokenKind::RightParen {
            Vec::new()
        } else {
            self.params()?
        };
        self.expect(TokenKind::RightParen, "`)`")?;
        let body = self.block()?;
        Ok(Func {
            name,
            params,
            span: start,
            body,
            nbr_locals: std::cell::Cell::new(None),
        })
    }

    fn params(&mut self) -> PResult<Vec<Param>> {
        let mut params = vec![self.param()?];
        while self.peek().kind == TokenKind::Comma {
            self.bump();
            params.push(self.param()?);
        }
        Ok(params)
    }

    // param -> "int" ident
    fn param(&mut self) -> PResult<Param> {
        self.expect_keyword(self.kw_int, "`int`")?;
        let (name, span) = self.expect_ident("parameter name")?;
        Ok(Param {
            name,
            span,
            slot: std::cell::Cell::new(None),
        })
    }

    // block -> "{" stmt* "}"
    fn block(&mut self) -> PResult<Block> {
        self.expect(TokenKind::LeftBracket, "`{`")?;
        let mut stmts = Vec::new();
        while self.peek().kind != TokenKind::RightBracket {
            stmts.push(self.stmt()?);
        }
        self.expect(TokenKind::RightBracket, "`}`")?;
        Ok(Block { stmts })
    }

    // stmt -> decl | assignment | func_call ";" | if_stmt | return_stmt | block
    fn stmt(&mut self) -> PResult<Stmt> {
        if self.peek().kind == TokenKind::LeftBracket {
            return Ok(Stmt::Block(self.block()?));
        }
        if self.is_ident(self.kw_if) {
            return self.if_stmt();
        }
        if self.is_ident(self.kw_return) {
            return self.return_stmt();
        }
        if self.is_ident(self.kw_int) {
            return self.decl();
        }
        // Remaining alternatives both start with an identifier: either a
        // bare assignment (`name = exp;`) or a call used as a statement
        // (`name(args);`). One token of extra lookahead distinguishes them.
        let (name, span) = self.expect_ident("statement")?;
        if self.peek().kind == TokenKind::LeftParen {
            let call = self.func_call_tail(name, span)?;
            self.expect(TokenKind::Semicolon, "`;`")?;
            Ok(Stmt::Call(call))
        } else {
            self.expect(TokenKind::Equals, "`=`")?;
            let exp = self.exp()?;
            self.expect(TokenKind::Semicolon, "`;`")?;
            Ok(Stmt::Assignment {
                name,
                exp,
                span,
                slot: std::cell::Cell::new(None),
            })
        }
    }

    // decl -> "int" ident opt_assign ";"
    fn decl(&mut self) -> PResult<Stmt> {
        self.expect_keyword(self.kw_int, "`int`")?;
        let (name, span) = self.expect_ident("variable name")?;
        let init = if self.peek().kind == TokenKind::Equals {
            self.bump();
            Some(self.exp()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "`;`")?;
        Ok(Stmt::Decl {
            name,
            init,
            span,
            slot: std::cell::Cell::new(None),
        })
    }

    // if_stmt -> "if" "(" condition ")" stmt ("else" stmt)?
    fn if_stmt(&mut self) -> PResult<Stmt> {
        let span = self.expect_keyword(self.kw_if, "`if`")?;
        self.expect(TokenKind::LeftParen, "`(`")?;
        let cond = self.condition()?;
        self.expect(TokenKind::RightParen, "`)`")?;
        let then_branch = Box::new(self.stmt()?);
        let else_branch = if self.is_ident(self.kw_else) {
            self.bump();
            Some(Box::new(self.stmt()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
            span,
        })
    }

    // return_stmt -> "return" exp ";"
    fn return_stmt(&mut self) -> PResult<Stmt> {
        let span = self.expect_keyword(self.kw_return, "`return`")?;
        let exp = self.exp()?;
        self.expect(TokenKind::Semicolon, "`;`")?;
        Ok(Stmt::Return { exp, span })
    }

    // condition -> exp opt_comparison
    // opt_comparison -> (("<" "="? | ">" "="? | "=" "=" | "!" "=") exp)?
    fn condition(&mut self) -> PResult<Condition> {
        let left = self.exp()?;
        let span = left.span();
        let rel = match self.peek().kind {
            TokenKind::LessThan => {
                self.bump();
                let op = if self.peek().kind == TokenKind::Equals {
                    self.bump();
                    RelOp::LessEqual
                } else {
                    RelOp::LessThan
                };
                Some((op, self.exp()?))
            }
            TokenKind::GreaterThan => {
                self.bump();
                let op = if self.peek().kind == TokenKind::Equals {
                    self.bump();
                    RelOp::GreaterEqual
                } else {
                    RelOp::GreaterThan
                };
                Some((op, self.exp()?))
            }
            TokenKind::Equals => {
                self.bump();
                self.expect(TokenKind::Equals, "`=` (forming `==`)")?;
                Some((RelOp::Equal, self.exp()?))
            }
            TokenKind::Not => {
                self.bump();
                self.expect(TokenKind::Equals, "`=` (forming `!=`)")?;
                Some((RelOp::NotEqual, self.exp()?))
            }
            _ => None,
        };
        Ok(Condition { left, rel, span })
    }

    // exp -> term (("+" | "-") term)*, folded right-associatively:
    // `a - b - c` parses as `a - (b - c)`.
    fn exp(&mut self) -> PResult<Exp> {
        let first = self.term()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.bump();
            rest.push((op, self.term()?));
        }
        Ok(fold_right(first, rest))
    }

    // term -> factor (("*" | "/") factor)*, same right-leaning fold.
    fn term(&mut self) -> PResult<Exp> {
        let first = self.factor()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.bump();
            rest.push((op, self.factor()?));
        }
        Ok(fold_right(first, rest))
    }

    // factor -> "(" exp ")" | int_literal | ident opt_func_call
    fn factor(&mut self) -> PResult<Exp> {
        let tok = *self.peek();
        match tok.kind {
            TokenKind::LeftParen => {
                self.bump();
                let exp = self.exp()?;
                self.expect(TokenKind::RightParen, "`)`")?;
                Ok(exp)
            }
            TokenKind::IntLiteral(value) => {
                self.bump();
                Ok(Exp::Literal {
                    value,
                    span: tok.span,
                })
            }
            TokenKind::Identifier(name) => {
                self.bump();
                if self.peek().kind == TokenKind::LeftParen {
                    Ok(Exp::Call(self.func_call_tail(name, tok.span)?))
                } else {
                    Ok(Exp::Var {
                        name,
                        span: tok.span,
                        slot: std::cell::Cell::new(None),
                    })
                }
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    // func_call -> ident "(" args? ")", with the leading ident already
    // consumed by the caller.
    fn func_call_tail(&mut self, name: Symbol, span: Span) -> PResult<FuncCall> {
        self.expect(TokenKind::LeftParen, "`(`")?;
        let args = if self.peek().kind == TokenKind::RightParen {
            Vec::new()
        } else {
            self.args()?
        };
        self.expect(TokenKind::RightParen, "`)`")?;
        Ok(FuncCall { name, args, span })
    }

    fn args(&mut self) -> PResult<Vec<Exp>> {
        let mut args = vec![self.exp()?];
        while self.peek().kind == TokenKind::Comma {
            self.bump();
            args.push(self.exp()?);
        }
        Ok(args)
    }
}

/// Fold a left-to-right `(first, [(op, operand), ...])` list into a
/// right-leaning binary tree: `fold_right(a, [(-, b), (-, c)])` builds
/// `a - (b - c)`, not `(a - b) - c`.
fn fold_right(first: Exp, rest: Vec<(BinOp, Exp)>) -> Exp {
    if rest.is_empty() {
        return first;
    }
    let mut operands = Vec::with_capacity(rest.len() + 1);
    let mut ops = Vec::with_capacity(rest.len());
    operands.push(first);
    for (op, operand) in rest {
        ops.push(op);
        operands.push(operand);
    }

    let mut acc = operands.pop().expect("at least one operand");
    while let Some(op) = ops.pop() {
        let left = operands.pop().expect("one operand per operator");
        let span = left.span();
        acc = Exp::Binary {
            op,
            left: Box::new(left),
            right: Box::new(acc),
            span,
        };
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanoc_lex::tokenize;
    use nanoc_util::symbol::Interner;

    fn parse_src(src: &str) -> (Program, Interner) {
        let mut interner = Interner::new();
        let tokens = tokenize(src, &mut interner).unwrap();
        let program = parse(&tokens, &interner).unwrap();
        (program, interner)
    }

    #[test]
    fn parses_empty_main() {
        let (prog, interner) = parse_src("int main() { return 0; }");
        assert_eq!(prog.len(), 1);
        assert_eq!(interner.resolve(prog[0].name), Some("main"));
    }

    #[test]
    fn rejects_missing_semicolon() {
        let mut interner = Interner::new();
        let tokens = tokenize("int main() { return 0 }", &mut interner).unwrap();
        assert!(parse(&tokens, &interner).is_err());
    }

    #[test]
    fn parses_params_and_call() {
        let (prog, _interner) = parse_src(
            "int add(int a, int b) { return a + b; } \
             int main() { print(add(1, 2)); return 0; }",
        );
        assert_eq!(prog.len(), 2);
        assert_eq!(prog[0].params.len(), 2);
    }

    #[test]
    fn condition_without_comparison_is_bare_expression() {
        let (prog, _) = parse_src("int main() { if (1) { return 1; } return 0; }");
        let Stmt::If { cond, .. } = &prog[0].body.stmts[0] else {
            panic!("expected if statement");
        };
        assert!(cond.rel.is_none());
    }

    #[test]
    fn not_equal_requires_two_tokens() {
        let (prog, _) = parse_src("int main() { if (1 != 2) { return 1; } return 0; }");
        let Stmt::If { cond, .. } = &prog[0].body.stmts[0] else {
            panic!("expected if statement");
        };
        assert_eq!(cond.rel.as_ref().unwrap().0, RelOp::NotEqual);
    }

    #[test]
    fn equal_requires_two_tokens() {
        let (prog, _) = parse_src("int main() { if (1 == 2) { return 1; } return 0; }");
        let Stmt::If { cond, .. } = &prog[0].body.stmts[0] else {
            panic!("expected if statement");
        };
        assert_eq!(cond.rel.as_ref().unwrap().0, RelOp::Equal);
    }

    #[test]
    fn lone_equals_in_a_condition_is_a_parse_error() {
        let mut interner = Interner::new();
        let tokens = tokenize(
            "int main() { if (1 = 2) { return 1; } return 0; }",
            &mut interner,
        )
        .unwrap();
        assert!(parse(&tokens, &interner).is_err());
    }

    #[test]
    fn subtraction_is_right_leaning() {
        let (prog, _) = parse_src("int main() { int x = 10 - 3 - 2; return x; }");
        let Stmt::Decl { init: Some(exp), .. } = &prog[0].body.stmts[0] else {
            panic!("expected decl with initializer");
        };
        // 10 - (3 - 2), so the outer node's right child is itself a
        // subtraction, and its left child is the literal 3.
        let Exp::Binary { op: BinOp::Sub, right, .. } = exp else {
            panic!("expected subtraction");
        };
        assert!(matches!(**right, Exp::Binary { op: BinOp::Sub, .. }));
    }
}
