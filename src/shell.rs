// SPDX: CC0-1.0

use crate::{
    lex::Span,
    parse::{Expr, ExprKind},
};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SetRange,
    SetEquations,
    Show,
    DumpAst,
    Plot,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::SetRange,
            Self::SetEquations,
            Self::Show,
            Self::Plot,
            Self::DumpAst,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::SetRange => "set the u/v parameter ranges and the grid resolution",
            Self::SetEquations => "set the x/y/z equations of the surface",
            Self::Show => "show the current ranges and equations",
            Self::DumpAst => "print the compiled form of each equation (for debugging)",
            Self::Plot => "sample the surface and hand it to gnuplot",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::SetRange => "range",
            Self::SetEquations => "set",
            Self::Show => "show",
            Self::DumpAst => "ast",
            Self::Plot => "plot",
        }
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for c in Self::exhaustive() {
            if s == c.name() {
                return Ok(*c);
            }
        }
        Err(())
    }
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<String> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<String> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut stdin = stdin().lock();
        let mut s = String::new();
        stdin.read_line(&mut s)?;
        Ok(s.trim().to_string())
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn read_fromstr<W: Write, T: core::str::FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
    ignore_empty: bool,
) -> anyhow::Result<Result<Option<T>, <T as core::str::FromStr>::Err>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let input = Arc::new(input(&mut out, prompt)?);
    if ignore_empty && input.is_empty() {
        return Ok(Ok(None));
    }
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &Span::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &Span) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.start()),
        // zero-width spans (end of input) still get one caret
        "^".repeat(span.len().max(1))
    )?;
    Ok(())
}

pub fn dump_expr<W: Write>(mut out: W, expr: &Expr, title: core::fmt::Arguments) -> io::Result<()> {
    writeln!(out, "{title}:")?;
    dump_expr_at(&mut out, expr, 1)
}

fn dump_expr_at<W: Write>(out: &mut W, expr: &Expr, depth: usize) -> io::Result<()> {
    let pad = "  ".repeat(depth);
    match &expr.kind {
        ExprKind::Num(val) => writeln!(out, "{pad}num {val}"),
        ExprKind::Ident => writeln!(out, "{pad}ident '{}'", expr.loc.get()),
        ExprKind::Unary(_, operand) => {
            writeln!(out, "{pad}neg")?;
            dump_expr_at(out, operand, depth + 1)
        }
        ExprKind::Binary(op, lhs, rhs) => {
            writeln!(out, "{pad}op '{}'", op.symbol())?;
            dump_expr_at(out, lhs, depth + 1)?;
            dump_expr_at(out, rhs, depth + 1)
        }
        ExprKind::Call { name, args } => {
            writeln!(out, "{pad}call '{name}'")?;
            for arg in args {
                dump_expr_at(out, arg, depth + 1)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn command_names_round_trip() {
        for cmd in Command::exhaustive() {
            assert_eq!(cmd.name().parse::<Command>().unwrap(), *cmd);
        }
        assert!("bogus".parse::<Command>().is_err());
    }

    #[test]
    fn underline_points_at_the_span() {
        let src = Arc::new(String::from("1 + qq"));
        let span = Span::new(Arc::clone(&src), 4, 2);
        let mut out = Vec::new();
        underline(&mut out, &span).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 + qq\n    ^^\n");
    }

    #[test]
    fn underline_zero_width_span() {
        let src = Arc::new(String::from("2*"));
        let mut out = Vec::new();
        underline(&mut out, &Span::end_of(src)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2*\n  ^\n");
    }

    #[test]
    fn dump_is_indented() {
        let expr = parse::parse(&Arc::new(String::from("sin(u) * 2"))).unwrap();
        let mut out = Vec::new();
        dump_expr(&mut out, &expr, format_args!("x equation")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "x equation:\n  op '*'\n    call 'sin'\n      ident 'u'\n    num 2\n"
        );
    }
}
