// SPDX: CC0-1.0

//! Sampling the three coordinate fields over the parameter grid.

use crate::{
    eval::{self, EvalErr, Ident, Idents},
    parse::{self, Expr, ParseErr},
    stdlib::{U, V},
    Domain, Number,
};
use core::{fmt, num::NonZeroU16, ops::Range};
use std::sync::Arc;

/// Dense row-major 2D array. Row index follows `v`, column index follows
/// `u`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    cols: usize,
    data: Vec<Number>,
}

impl Grid {
    fn from_data(cols: usize, data: Vec<Number>) -> Self {
        debug_assert!(cols > 0 && data.len() % cols == 0);
        Self { cols, data }
    }

    pub fn rows(&self) -> usize {
        self.data.len() / self.cols
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn at(&self, row: usize, col: usize) -> Number {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[Number] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn iter(&self) -> impl Iterator<Item = Number> + '_ {
        self.data.iter().copied()
    }
}

/// `n` evenly spaced samples covering the range, both endpoints included.
/// A reversed range yields a descending sequence.
pub fn linspace(range: &Range<Number>, n: NonZeroU16) -> Vec<Number> {
    let n = usize::from(n.get());
    if n == 1 {
        return vec![range.start];
    }

    let step = (range.end - range.start) / ((n - 1) as Number);
    let mut vals: Vec<Number> = (0..n)
        .map(|i| range.start + step * (i as Number))
        .collect();
    // pin the last sample to the endpoint, accumulation error aside
    if let Some(last) = vals.last_mut() {
        *last = range.end;
    }
    vals
}

/// Cross product of the two sample sequences: every cell holds that cell's
/// u and v coordinate.
#[derive(Clone, Debug)]
pub struct SampleGrid {
    pub u: Grid,
    pub v: Grid,
}

impl SampleGrid {
    pub fn mesh(domain: &Domain) -> Self {
        let us = linspace(&domain.u, domain.resolution);
        let vs = linspace(&domain.v, domain.resolution);
        let cols = us.len();

        let mut u_data = Vec::with_capacity(cols * vs.len());
        let mut v_data = Vec::with_capacity(cols * vs.len());
        for &v in &vs {
            for &u in &us {
                u_data.push(u);
                v_data.push(v);
            }
        }

        Self {
            u: Grid::from_data(cols, u_data),
            v: Grid::from_data(cols, v_data),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }
}

/// One of the three coordinate expressions failed to compile.
#[derive(Debug)]
pub struct CompileErr {
    pub axis: Axis,
    pub err: ParseErr,
}

impl fmt::Display for CompileErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} equation failed to compile: {}",
            self.axis.label(),
            self.err.typ
        )
    }
}

/// The three coordinate expressions, compiled.
#[derive(Clone, Debug)]
pub struct SurfaceExprs {
    pub x: Expr,
    pub y: Expr,
    pub z: Expr,
}

impl SurfaceExprs {
    pub fn compile(
        x_eq: &Arc<String>,
        y_eq: &Arc<String>,
        z_eq: &Arc<String>,
    ) -> Result<Self, CompileErr> {
        let compile = |axis, eq: &Arc<String>| {
            parse::parse(eq).map_err(|err| CompileErr { axis, err })
        };
        Ok(Self {
            x: compile(Axis::X, x_eq)?,
            y: compile(Axis::Y, y_eq)?,
            z: compile(Axis::Z, z_eq)?,
        })
    }
}

/// A sample-point evaluation failed, so the whole surface is abandoned; no
/// partial surface is ever produced.
#[derive(Debug)]
pub struct SurfaceErr {
    pub axis: Axis,
    pub u: Number,
    pub v: Number,
    pub err: EvalErr,
}

impl fmt::Display for SurfaceErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} equation failed at (u, v) = ({}, {}): {}",
            self.axis.label(),
            self.u,
            self.v,
            self.err
        )
    }
}

/// The three coordinate fields, all the same shape as the sample grid.
#[derive(Clone, Debug)]
pub struct Surface {
    pub grid: SampleGrid,
    pub x: Grid,
    pub y: Grid,
    pub z: Grid,
}

impl Surface {
    pub fn rows(&self) -> usize {
        self.x.rows()
    }

    pub fn cols(&self) -> usize {
        self.x.cols()
    }
}

/// Evaluate the three expressions at every grid cell. Leaves `u`/`v`
/// unbound in the table on return, whatever the outcome, so endpoint
/// validation for the next plot can't see stale point values.
pub fn sample(
    exprs: &SurfaceExprs,
    idents: &mut Idents,
    domain: &Domain,
) -> Result<Surface, SurfaceErr> {
    let ret = sample_inner(exprs, idents, domain);
    idents.insert(U.into(), Ident::Var(None));
    idents.insert(V.into(), Ident::Var(None));
    ret
}

fn sample_inner(
    exprs: &SurfaceExprs,
    idents: &mut Idents,
    domain: &Domain,
) -> Result<Surface, SurfaceErr> {
    let grid = SampleGrid::mesh(domain);
    let rows = grid.u.rows();
    let cols = grid.u.cols();

    let mut sample_axis = |axis: Axis, expr: &Expr| -> Result<Grid, SurfaceErr> {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let (u, v) = (grid.u.at(row, col), grid.v.at(row, col));
                idents.insert(U.into(), Ident::Var(Some(u)));
                idents.insert(V.into(), Ident::Var(Some(v)));

                match eval::eval(expr, idents) {
                    Ok(val) => data.push(val),
                    Err(err) => return Err(SurfaceErr { axis, u, v, err }),
                }
            }
        }
        Ok(Grid::from_data(cols, data))
    };

    let x = sample_axis(Axis::X, &exprs.x)?;
    let y = sample_axis(Axis::Y, &exprs.y)?;
    let z = sample_axis(Axis::Z, &exprs.z)?;
    Ok(Surface { grid, x, y, z })
}
