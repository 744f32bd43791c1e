// SPDX: CC0-1.0

// recursive descent with precedence climbing; the entire expression
// language is arithmetic operators, numeric literals, identifier
// references, and calls into a fixed function table

use crate::{
    lex::{self, LexErr, LexErrTyp, Span, Tok, TokTyp},
    Number,
};
use core::{fmt, num::ParseFloatError};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnOp {
    Neg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub const fn precedence(&self) -> i8 {
        match self {
            Self::Add | Self::Sub => 2,
            Self::Mul | Self::Div => 3,
            Self::Pow => 5,
        }
    }

    pub const fn is_right_assoc(&self) -> bool {
        matches!(self, Self::Pow)
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
        }
    }

    const fn from_tok(typ: TokTyp) -> Option<Self> {
        Some(match typ {
            TokTyp::Plus => Self::Add,
            TokTyp::Minus => Self::Sub,
            TokTyp::Star => Self::Mul,
            TokTyp::Slash => Self::Div,
            TokTyp::Caret => Self::Pow,
            _ => return None,
        })
    }
}

// unary minus binds tighter than '*' and '/' but looser than '^',
// so -u^2 reads as -(u^2)
const NEG_PRECEDENCE: i8 = 4;

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Span,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Num(Number),
    /// Variable or constant reference; the name is `loc.get()`.
    Ident,
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call { name: Span, args: Vec<Expr> },
}

#[derive(Debug)]
pub enum ParseErrTyp {
    Lex(LexErrTyp),
    Number(ParseFloatError),
    ParenMismatch,
    Unexpected(TokTyp),
    UnexpectedEnd,
    Empty,
}

impl fmt::Display for ParseErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "{err}"),
            Self::Number(err) => write!(f, "invalid number: {err}"),
            Self::ParenMismatch => write!(f, "mismatched parentheses"),
            Self::Unexpected(typ) => write!(f, "unexpected {}", typ.describe()),
            Self::UnexpectedEnd => write!(f, "unexpected end of expression"),
            Self::Empty => write!(f, "empty expression"),
        }
    }
}

#[derive(Debug)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: Span,
}

impl ParseErr {
    pub fn hint(&self) -> Option<&'static str> {
        match self.typ {
            ParseErrTyp::Lex(typ) => LexErr {
                typ,
                loc: self.loc.clone(),
            }
            .hint(),
            ParseErrTyp::Number(_) => Some("parsing as floating point number"),
            ParseErrTyp::Unexpected(TokTyp::Number | TokTyp::Ident | TokTyp::OpenParen) => Some(
                "implicit multiplication is not supported, so for example '5u' would be '5*u'",
            ),
            _ => None,
        }
    }
}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::Lex(err.typ),
            loc: err.loc,
        }
    }
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
    src: Arc<String>,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.toks.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn end_loc(&self) -> Span {
        Span::end_of(Arc::clone(&self.src))
    }

    fn expr(&mut self, min_precedence: i8) -> Result<Expr, ParseErr> {
        let mut lhs = self.prefix()?;

        while let Some(tok) = self.peek() {
            let op = match BinOp::from_tok(tok.typ) {
                Some(op) => op,
                None => break,
            };
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.bump();

            let next_min = if op.is_right_assoc() {
                precedence
            } else {
                precedence + 1
            };
            let rhs = self.expr(next_min)?;

            let loc = lhs.loc.join(&rhs.loc);
            lhs = Expr {
                kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
                loc,
            };
        }

        Ok(lhs)
    }

    fn prefix(&mut self) -> Result<Expr, ParseErr> {
        let tok = match self.bump() {
            Some(tok) => tok,
            None => {
                return Err(ParseErr {
                    typ: ParseErrTyp::UnexpectedEnd,
                    loc: self.end_loc(),
                })
            }
        };

        match tok.typ {
            TokTyp::Minus => {
                let operand = self.expr(NEG_PRECEDENCE)?;
                let loc = tok.loc.join(&operand.loc);
                Ok(Expr {
                    kind: ExprKind::Unary(UnOp::Neg, Box::new(operand)),
                    loc,
                })
            }

            TokTyp::Number => {
                let num: Number = match tok.loc.get().parse() {
                    Ok(val) => val,
                    Err(err) => {
                        return Err(ParseErr {
                            typ: ParseErrTyp::Number(err),
                            loc: tok.loc,
                        })
                    }
                };
                Ok(Expr {
                    kind: ExprKind::Num(num),
                    loc: tok.loc,
                })
            }

            TokTyp::Ident => {
                if self.peek().map(|next| next.typ) == Some(TokTyp::OpenParen) {
                    self.call(tok.loc)
                } else {
                    Ok(Expr {
                        kind: ExprKind::Ident,
                        loc: tok.loc,
                    })
                }
            }

            TokTyp::OpenParen => {
                let inner = self.expr(0)?;
                // keep the inner span: an Ident's name is read from its loc
                self.expect_close_paren(&tok.loc)?;
                Ok(inner)
            }

            TokTyp::Plus
            | TokTyp::Star
            | TokTyp::Slash
            | TokTyp::Caret
            | TokTyp::Comma
            | TokTyp::CloseParen => Err(ParseErr {
                typ: ParseErrTyp::Unexpected(tok.typ),
                loc: tok.loc,
            }),
        }
    }

    fn call(&mut self, name: Span) -> Result<Expr, ParseErr> {
        let open = match self.bump() {
            Some(tok) => tok.loc,
            // caller peeked the open paren
            None => unreachable!(),
        };

        let mut args = Vec::new();
        if self.peek().map(|tok| tok.typ) != Some(TokTyp::CloseParen) {
            loop {
                args.push(self.expr(0)?);
                match self.peek().map(|tok| tok.typ) {
                    Some(TokTyp::Comma) => {
                        self.bump();
                    }
                    _ => break,
                }
            }
        }
        let close = self.expect_close_paren(&open)?;

        Ok(Expr {
            loc: name.join(&close),
            kind: ExprKind::Call { name, args },
        })
    }

    fn expect_close_paren(&mut self, open: &Span) -> Result<Span, ParseErr> {
        match self.bump() {
            Some(tok) if tok.typ == TokTyp::CloseParen => Ok(tok.loc),
            Some(tok) => Err(ParseErr {
                typ: ParseErrTyp::Unexpected(tok.typ),
                loc: tok.loc,
            }),
            None => Err(ParseErr {
                typ: ParseErrTyp::ParenMismatch,
                loc: open.clone(),
            }),
        }
    }
}

pub fn parse(src: &Arc<String>) -> Result<Expr, ParseErr> {
    let toks = lex::tokenize(src)?;
    if toks.is_empty() {
        return Err(ParseErr {
            typ: ParseErrTyp::Empty,
            loc: Span::all(Arc::clone(src)),
        });
    }

    let mut parser = Parser {
        toks,
        pos: 0,
        src: Arc::clone(src),
    };
    let expr = parser.expr(0)?;

    // trailing tokens: either a stray ')' or juxtaposition like "5u"
    if let Some(tok) = parser.peek() {
        let typ = if tok.typ == TokTyp::CloseParen {
            ParseErrTyp::ParenMismatch
        } else {
            ParseErrTyp::Unexpected(tok.typ)
        };
        return Err(ParseErr {
            typ,
            loc: tok.loc.clone(),
        });
    }

    Ok(expr)
}
