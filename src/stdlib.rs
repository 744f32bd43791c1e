// SPDX: CC0-1.0

use crate::{eval::*, Number};
use core::f64::consts;
use std::collections::HashMap; // assumes Number = f64

/// Surface parameter names. Bound to a point while sampling, declared but
/// unbound while validating range-endpoint fields.
pub const U: &str = "u";
pub const V: &str = "v";

/// The whole namespace visible to user expressions. Nothing outside this
/// table resolves.
pub fn standard_idents() -> Idents {
    let mut ret = HashMap::new();

    ret.insert(U.into(), Ident::Var(None));
    ret.insert(V.into(), Ident::Var(None));

    ret.insert("abs".into(), Ident::Fun(Fun::new(1, abs)));
    ret.insert("floor".into(), Ident::Fun(Fun::new(1, floor)));
    ret.insert("ceil".into(), Ident::Fun(Fun::new(1, ceil)));
    ret.insert("round".into(), Ident::Fun(Fun::new(1, round)));

    ret.insert("sqrt".into(), Ident::Fun(Fun::new(1, sqrt)));
    ret.insert("cbrt".into(), Ident::Fun(Fun::new(1, cbrt)));
    ret.insert("exp".into(), Ident::Fun(Fun::new(1, exp)));
    ret.insert("ln".into(), Ident::Fun(Fun::new(1, ln)));
    ret.insert("log".into(), Ident::Fun(Fun::new(2, log)));
    ret.insert("log10".into(), Ident::Fun(Fun::new(1, log10)));
    ret.insert("pow".into(), Ident::Fun(Fun::new(2, pow)));
    ret.insert("hypot".into(), Ident::Fun(Fun::new(2, hypot)));
    ret.insert("min".into(), Ident::Fun(Fun::new(2, min)));
    ret.insert("max".into(), Ident::Fun(Fun::new(2, max)));

    // trig
    ret.insert("sin".into(), Ident::Fun(Fun::new(1, sin)));
    ret.insert("cos".into(), Ident::Fun(Fun::new(1, cos)));
    ret.insert("tan".into(), Ident::Fun(Fun::new(1, tan)));
    ret.insert("asin".into(), Ident::Fun(Fun::new(1, arcsin)));
    ret.insert("acos".into(), Ident::Fun(Fun::new(1, arccos)));
    ret.insert("atan".into(), Ident::Fun(Fun::new(1, arctan)));
    ret.insert("arcsin".into(), Ident::Fun(Fun::new(1, arcsin)));
    ret.insert("arccos".into(), Ident::Fun(Fun::new(1, arccos)));
    ret.insert("arctan".into(), Ident::Fun(Fun::new(1, arctan)));
    ret.insert("atan2".into(), Ident::Fun(Fun::new(2, atan2)));
    ret.insert("sinh".into(), Ident::Fun(Fun::new(1, sinh)));
    ret.insert("cosh".into(), Ident::Fun(Fun::new(1, cosh)));
    ret.insert("tanh".into(), Ident::Fun(Fun::new(1, tanh)));

    ret.insert("pi".into(), Ident::Const(consts::PI));
    ret.insert("tau".into(), Ident::Const(consts::TAU));
    ret.insert("e".into(), Ident::Const(consts::E));
    ret
}

#[track_caller]
fn expect_n<const N: usize>(args: &[Number]) -> [Number; N] {
    assert_eq!(args.len(), N);
    args[..N].try_into().unwrap()
}

pub fn abs(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.abs()
}

pub fn floor(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.floor()
}

pub fn ceil(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.ceil()
}

pub fn round(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.round()
}

pub fn sqrt(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sqrt()
}

pub fn cbrt(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.cbrt()
}

pub fn exp(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.exp()
}

pub fn ln(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.ln()
}

pub fn log(args: &[Number]) -> Number {
    let [x, base] = expect_n::<2>(args);
    x.log(base)
}

pub fn log10(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.log10()
}

pub fn pow(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x.powf(y)
}

pub fn hypot(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x.hypot(y)
}

pub fn min(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x.min(y)
}

pub fn max(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x.max(y)
}

pub fn sin(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sin()
}

pub fn cos(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.cos()
}

pub fn tan(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.tan()
}

pub fn arcsin(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.asin()
}

pub fn arccos(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.acos()
}

pub fn arctan(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.atan()
}

pub fn atan2(args: &[Number]) -> Number {
    let [y, x] = expect_n::<2>(args);
    y.atan2(x)
}

pub fn sinh(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sinh()
}

pub fn cosh(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.cosh()
}

pub fn tanh(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.tanh()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_start_unbound() {
        let idents = standard_idents();
        assert!(matches!(
            idents.get(&IdentKey::from(U)),
            Some(Ident::Var(None))
        ));
        assert!(matches!(
            idents.get(&IdentKey::from(V)),
            Some(Ident::Var(None))
        ));
    }

    #[test]
    fn table_is_closed_over_expected_names() {
        let idents = standard_idents();
        for name in ["sin", "cos", "sqrt", "atan", "hypot", "pi", "tau", "e"] {
            assert!(idents.contains_key(&IdentKey::from(name)), "missing '{name}'");
        }
        for name in ["eval", "import", "open", "system", "np", "math"] {
            assert!(
                !idents.contains_key(&IdentKey::from(name)),
                "unexpected '{name}'"
            );
        }
    }

    #[test]
    fn spot_checks() {
        assert_eq!(sqrt(&[9.0]), 3.0);
        assert_eq!(log(&[8.0, 2.0]), 3.0);
        assert_eq!(hypot(&[3.0, 4.0]), 5.0);
        assert_eq!(max(&[1.0, 2.0]), 2.0);
        assert_eq!(atan2(&[0.0, 1.0]), 0.0);
    }
}
