//! The score-only and traceback-producing recurrences, one module per
//! algorithm plus a score-only module shared by all three.

pub mod gotoh;
pub mod nwsw;
pub mod score_only;
pub mod wsb;

use crate::error::AlignError;
use crate::grid::Grid;
use crate::scoring::{Algorithm, Mode, ScoringScheme};
use crate::trace::{GapLists, GotohCell, TraceCell, WsbCell};

/// The filled-in trace table an `align()` call hands to a
/// [`crate::path::PathGenerator`]. Which variant is produced is decided
/// by [`Algorithm::select`].
#[derive(Clone)]
pub enum TraceTable {
    NwSw(Grid<TraceCell>),
    Gotoh(Grid<GotohCell>),
    Wsb(Grid<WsbCell>, GapLists),
}

impl TraceTable {
    pub fn rows(&self) -> usize {
        match self {
            TraceTable::NwSw(g) => g.rows(),
            TraceTable::Gotoh(g) => g.rows(),
            TraceTable::Wsb(g, _) => g.rows(),
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            TraceTable::NwSw(g) => g.cols(),
            TraceTable::Gotoh(g) => g.cols(),
            TraceTable::Wsb(g, _) => g.cols(),
        }
    }
}

/// Dispatch to the score-only recurrence selected by `scheme`'s
/// algorithm. `sa`/`sb` are already encoded to `0..26` residue indices.
pub fn score(
    scheme: &ScoringScheme,
    mode: Mode,
    sa: &[u8],
    sb: &[u8],
) -> Result<f64, AlignError> {
    match scheme.algorithm() {
        Algorithm::NwSw => score_only::nwsw_score(scheme, mode, sa, sb),
        Algorithm::Gotoh => score_only::gotoh_score(scheme, mode, sa, sb),
        Algorithm::Wsb => score_only::wsb_score(scheme, mode, sa, sb),
    }
}

/// Dispatch to the traceback-producing recurrence selected by `scheme`'s
/// algorithm.
pub fn align(
    scheme: &ScoringScheme,
    mode: Mode,
    sa: &[u8],
    sb: &[u8],
) -> Result<(f64, TraceTable), AlignError> {
    match scheme.algorithm() {
        Algorithm::NwSw => {
            let (score, cells) = nwsw::align(scheme, mode, sa, sb)?;
            Ok((score, TraceTable::NwSw(cells)))
        }
        Algorithm::Gotoh => {
            let (score, cells) = gotoh::align(scheme, mode, sa, sb)?;
            Ok((score, TraceTable::Gotoh(cells)))
        }
        Algorithm::Wsb => {
            let (score, cells, lists) = wsb::align(scheme, mode, sa, sb)?;
            Ok((score, TraceTable::Wsb(cells, lists)))
        }
    }
}
