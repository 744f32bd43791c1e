// SPDX: CC0-1.0

use crate::{
    lex::Span,
    parse::{BinOp, Expr, ExprKind, UnOp},
    Number,
};
use core::fmt;
use std::collections::HashMap;

#[derive(Debug)]
pub struct Fun {
    pub arity: usize,
    pub fun: fn(&[Number]) -> Number,
}

impl Fun {
    pub const fn new(arity: usize, fun: fn(&[Number]) -> Number) -> Self {
        Self { arity, fun }
    }
}

/// Everything an expression can name. The table is closed: a name that is
/// not in it does not resolve to anything, so user text cannot reach code
/// or state outside this map.
#[derive(Debug)]
pub enum Ident {
    Var(Option<Number>),
    Const(Number),
    Fun(Fun),
}

impl Ident {
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Var(_) => "variable",
            Self::Const(_) => "constant",
            Self::Fun(_) => "function",
        }
    }
}

#[derive(Clone, Debug, Eq)]
pub enum IdentKey {
    Span(Span),
    Static(&'static str),
}

impl PartialEq for IdentKey {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl core::hash::Hash for IdentKey {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.get().hash(state)
    }
}

impl IdentKey {
    pub fn get(&self) -> &str {
        match self {
            Self::Span(s) => s.get(),
            Self::Static(s) => s,
        }
    }
}

impl fmt::Display for IdentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

impl From<Span> for IdentKey {
    fn from(s: Span) -> Self {
        Self::Span(s)
    }
}

impl From<&'static str> for IdentKey {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

pub type Idents = HashMap<IdentKey, Ident>;

#[derive(Debug)]
pub enum EvalErrTyp {
    UndefinedIdent,
    /// Variable is declared but has no value in this context (a parameter
    /// referenced in a range-endpoint field, where no point is bound).
    UnboundVar,
    NotAFunction { kind: &'static str },
    FunAsValue,
    Arity { arity: usize, found: usize },
}

#[derive(Debug)]
pub struct EvalErr {
    pub typ: EvalErrTyp,
    pub loc: Span,
}

impl fmt::Display for EvalErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.loc.get();
        match &self.typ {
            EvalErrTyp::UndefinedIdent => write!(f, "undefined identifier '{name}'"),

            EvalErrTyp::UnboundVar => write!(
                f,
                "variable '{name}' has no value here (parameters are only bound while sampling the surface)"
            ),

            EvalErrTyp::NotAFunction { kind } => {
                write!(f, "'{name}' is a {kind}, not a function")
            }

            EvalErrTyp::FunAsValue => {
                write!(f, "'{name}' is a function and must be called, like {name}(u)")
            }

            EvalErrTyp::Arity { arity, found } => write!(
                f,
                "function '{name}' takes {arity} argument{s}, but found {found}",
                s = if *arity == 1 { "" } else { "s" }
            ),
        }
    }
}

pub fn eval(expr: &Expr, idents: &Idents) -> Result<Number, EvalErr> {
    match &expr.kind {
        ExprKind::Num(val) => Ok(*val),

        ExprKind::Ident => {
            let key = IdentKey::from(expr.loc.clone());
            match idents.get(&key) {
                Some(Ident::Var(Some(val))) | Some(Ident::Const(val)) => Ok(*val),
                Some(Ident::Var(None)) => Err(EvalErr {
                    typ: EvalErrTyp::UnboundVar,
                    loc: expr.loc.clone(),
                }),
                Some(Ident::Fun(_)) => Err(EvalErr {
                    typ: EvalErrTyp::FunAsValue,
                    loc: expr.loc.clone(),
                }),
                None => Err(EvalErr {
                    typ: EvalErrTyp::UndefinedIdent,
                    loc: expr.loc.clone(),
                }),
            }
        }

        ExprKind::Unary(UnOp::Neg, operand) => Ok(-eval(operand, idents)?),

        ExprKind::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs, idents)?;
            let rhs = eval(rhs, idents)?;
            // IEEE semantics throughout: 1/0 is inf, ln of a negative is
            // NaN, neither is an evaluation error
            Ok(match op {
                BinOp::Add => lhs + rhs,
                BinOp::Sub => lhs - rhs,
                BinOp::Mul => lhs * rhs,
                BinOp::Div => lhs / rhs,
                BinOp::Pow => lhs.powf(rhs),
            })
        }

        ExprKind::Call { name, args } => {
            let key = IdentKey::from(name.clone());
            let fun = match idents.get(&key) {
                Some(Ident::Fun(fun)) => fun,
                Some(other) => {
                    return Err(EvalErr {
                        typ: EvalErrTyp::NotAFunction {
                            kind: other.describe(),
                        },
                        loc: name.clone(),
                    })
                }
                None => {
                    return Err(EvalErr {
                        typ: EvalErrTyp::UndefinedIdent,
                        loc: name.clone(),
                    })
                }
            };

            if args.len() != fun.arity {
                return Err(EvalErr {
                    typ: EvalErrTyp::Arity {
                        arity: fun.arity,
                        found: args.len(),
                    },
                    loc: name.clone(),
                });
            }

            let mut vals = Vec::with_capacity(args.len());
            for arg in args {
                vals.push(eval(arg, idents)?);
            }
            Ok((fun.fun)(&vals))
        }
    }
}

/// Most similarly named table entry, for "did you mean" notes on undefined
/// identifiers.
pub fn nearest<'i>(name: &str, idents: &'i Idents) -> Option<(&'i IdentKey, &'i Ident)> {
    const THRESHOLD: f64 = 0.3;

    let lower = name.to_ascii_lowercase();
    idents
        .iter()
        .map(|(key, ident)| {
            let sim =
                strsim::normalized_damerau_levenshtein(&lower, &key.get().to_ascii_lowercase());
            (sim, key, ident)
        })
        .reduce(|acc, elem| if elem.0 > acc.0 { elem } else { acc })
        .filter(|(sim, _, _)| *sim > THRESHOLD)
        .map(|(_, key, ident)| (key, ident))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, stdlib};
    use std::sync::Arc;

    fn eval_str(src: &str) -> Result<Number, EvalErr> {
        let idents = stdlib::standard_idents();
        let expr = parse::parse(&Arc::new(String::from(src))).unwrap();
        eval(&expr, &idents)
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval_str("1 + 2 * 3").unwrap(), 7.0);
        assert_eq!(eval_str("(1 + 2) * 3").unwrap(), 9.0);
        assert_eq!(eval_str("7 / 2").unwrap(), 3.5);
        assert_eq!(eval_str("10 - 4 - 3").unwrap(), 3.0);
    }

    #[test]
    fn pow_chain_is_right_associative() {
        assert_eq!(eval_str("2 ^ 3 ^ 2").unwrap(), 512.0);
    }

    #[test]
    fn negation() {
        assert_eq!(eval_str("-3 + 5").unwrap(), 2.0);
        assert_eq!(eval_str("-2^2").unwrap(), -4.0);
        assert_eq!(eval_str("(-2)^2").unwrap(), 4.0);
    }

    #[test]
    fn constants_resolve() {
        assert_eq!(eval_str("2 * pi").unwrap(), core::f64::consts::TAU);
        assert_eq!(eval_str("e").unwrap(), core::f64::consts::E);
    }

    #[test]
    fn calls_resolve() {
        assert_eq!(eval_str("log(8, 2)").unwrap(), 3.0);
        assert!((eval_str("sin(pi)").unwrap()).abs() < 1e-12);
    }

    #[test]
    fn undefined_ident() {
        let err = eval_str("q + 1").unwrap_err();
        assert!(matches!(err.typ, EvalErrTyp::UndefinedIdent));
        assert_eq!(err.loc.get(), "q");
    }

    #[test]
    fn unbound_parameter() {
        // u and v are declared but carry no value outside sampling
        let err = eval_str("u + 1").unwrap_err();
        assert!(matches!(err.typ, EvalErrTyp::UnboundVar));
    }

    #[test]
    fn arity_mismatch() {
        let err = eval_str("sin(1, 2)").unwrap_err();
        assert!(matches!(
            err.typ,
            EvalErrTyp::Arity { arity: 1, found: 2 }
        ));
    }

    #[test]
    fn constant_is_not_callable() {
        let err = eval_str("pi(2)").unwrap_err();
        assert!(matches!(err.typ, EvalErrTyp::NotAFunction { .. }));
    }

    #[test]
    fn function_is_not_a_value() {
        let err = eval_str("sin + 1").unwrap_err();
        assert!(matches!(err.typ, EvalErrTyp::FunAsValue));
    }

    #[test]
    fn non_finite_results_pass_through() {
        assert!(eval_str("1 / 0").unwrap().is_infinite());
        assert!(eval_str("sqrt(0 - 1)").unwrap().is_nan());
        assert!(eval_str("ln(-1)").unwrap().is_nan());
    }

    #[test]
    fn nearest_suggests_similar_names() {
        let idents = stdlib::standard_idents();
        // "sqrtt" is strictly closest to "sqrt"; names like "sine" tie
        // between "sin" and "sinh" and would make this test order-dependent
        let (key, ident) = nearest("sqrtt", &idents).unwrap();
        assert_eq!(key.get(), "sqrt");
        assert_eq!(ident.describe(), "function");
    }

    #[test]
    fn nearest_gives_up_on_garbage() {
        let idents = stdlib::standard_idents();
        assert!(nearest("qqqqqqqqqq", &idents).is_none());
    }
}
