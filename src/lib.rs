// SPDX: CC0-1.0

pub mod eval;
pub mod field;
pub mod lex;
pub mod parse;
pub mod shell;
pub mod stdlib;
pub mod surface;

use core::{fmt, num::NonZeroU16, ops::Range};

pub type Number = f64;

/// Parameter region the surface is sampled over. No ordering constraint on
/// the ranges: start past end just yields a reversed sample sequence.
#[derive(Clone, Debug)]
pub struct Domain {
    pub u: Range<Number>,
    pub v: Range<Number>,
    pub resolution: NonZeroU16,
}

impl Domain {
    /// 100 samples per parameter, the tool's stock grid.
    pub const DEFAULT_RESOLUTION: u16 = 100;

    /// Upper bound on samples per parameter. Five n-by-n f64 grids are
    /// live while plotting, so past this an oversized request is an
    /// error, not an allocation that kills the process.
    pub const MAX_RESOLUTION: u16 = 2000;
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("u range", &self.u)
            .field("v range", &self.v)
            .field("resolution", &self.resolution)
            .finish()
    }
}
