// SPDX: CC0-1.0

//! Validation of the free-text input fields into a plot request.

use crate::{
    eval::{self, EvalErr, Idents},
    parse::{self, ParseErr},
    Domain, Number,
};
use core::{fmt, num::NonZeroU16};
use std::sync::Arc;

/// The seven text fields, decoupled from whatever front end collected
/// them.
#[derive(Clone, Debug, Default)]
pub struct RawInput {
    pub u_start: String,
    pub u_end: String,
    pub v_start: String,
    pub v_end: String,
    pub x_eq: String,
    pub y_eq: String,
    pub z_eq: String,
}

#[derive(Debug)]
pub enum FieldErrTyp {
    /// Blank input is its own kind, distinct from a malformed expression.
    Empty,
    Parse(ParseErr),
    Eval(EvalErr),
    NonFinite(Number),
    /// Resolution above [`Domain::MAX_RESOLUTION`].
    Resolution(u16),
}

#[derive(Debug)]
pub struct FieldErr {
    pub field: &'static str,
    pub typ: FieldErrTyp,
}

impl fmt::Display for FieldErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match &self.typ {
            FieldErrTyp::Empty => write!(f, "field '{field}' is blank"),
            FieldErrTyp::Parse(err) => write!(f, "field '{field}': {}", err.typ),
            FieldErrTyp::Eval(err) => write!(f, "field '{field}': {err}"),
            FieldErrTyp::NonFinite(val) => {
                write!(f, "field '{field}' evaluates to {val}, which is not finite")
            }
            FieldErrTyp::Resolution(n) => write!(
                f,
                "field '{field}' is {n}, above the maximum of {max}",
                max = Domain::MAX_RESOLUTION
            ),
        }
    }
}

/// Validate one range-endpoint field. The text is evaluated under the
/// restricted table with no point bound, so an endpoint may itself be an
/// expression like `2*pi`.
pub fn scalar(field: &'static str, text: &str, idents: &Idents) -> Result<Number, FieldErr> {
    if text.trim().is_empty() {
        return Err(FieldErr {
            field,
            typ: FieldErrTyp::Empty,
        });
    }

    let src = Arc::new(String::from(text));
    let expr = parse::parse(&src).map_err(|err| FieldErr {
        field,
        typ: FieldErrTyp::Parse(err),
    })?;
    let val = eval::eval(&expr, idents).map_err(|err| FieldErr {
        field,
        typ: FieldErrTyp::Eval(err),
    })?;

    if val.is_finite() {
        Ok(val)
    } else {
        Err(FieldErr {
            field,
            typ: FieldErrTyp::NonFinite(val),
        })
    }
}

/// Everything the grid evaluator needs, produced only once all four range
/// fields validated.
#[derive(Clone, Debug)]
pub struct PlotRequest {
    pub domain: Domain,
    pub x_eq: Arc<String>,
    pub y_eq: Arc<String>,
    pub z_eq: Arc<String>,
}

/// Aggregate failure over the range fields and the resolution. Every
/// field is checked independently so the user sees every bad one at once.
#[derive(Debug)]
pub struct RangeErr {
    pub failures: Vec<FieldErr>,
}

impl fmt::Display for RangeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{n} input field{s} failed validation",
            n = self.failures.len(),
            s = if self.failures.len() == 1 { "" } else { "s" }
        )
    }
}

pub fn validate(
    input: &RawInput,
    idents: &Idents,
    resolution: NonZeroU16,
) -> Result<PlotRequest, RangeErr> {
    let mut vals = [0.0; 4];
    let mut failures = Vec::new();

    for (dst, (field, text)) in vals.iter_mut().zip([
        ("u_start", &input.u_start),
        ("u_end", &input.u_end),
        ("v_start", &input.v_start),
        ("v_end", &input.v_end),
    ]) {
        match scalar(field, text, idents) {
            Ok(val) => *dst = val,
            Err(err) => failures.push(err),
        }
    }

    if resolution.get() > Domain::MAX_RESOLUTION {
        failures.push(FieldErr {
            field: "resolution",
            typ: FieldErrTyp::Resolution(resolution.get()),
        });
    }

    if !failures.is_empty() {
        return Err(RangeErr { failures });
    }

    let [u_start, u_end, v_start, v_end] = vals;
    Ok(PlotRequest {
        domain: Domain {
            u: u_start..u_end,
            v: v_start..v_end,
            resolution,
        },
        x_eq: Arc::new(input.x_eq.clone()),
        y_eq: Arc::new(input.y_eq.clone()),
        z_eq: Arc::new(input.z_eq.clone()),
    })
}
