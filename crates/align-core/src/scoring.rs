//! Scoring configuration: substitution scores, gap costs, and algorithm
//! selection.

use std::cell::OnceCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Side};
use crate::sequence::UNKNOWN_INDEX;

/// Alignment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Global,
    Local,
}

/// The three DP recurrences this crate implements, derived from a
/// [`ScoringScheme`] by [`Algorithm::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    NwSw,
    Gotoh,
    Wsb,
}

/// Substitution scoring: either a flat match/mismatch pair, or a full
/// 26x26 matrix (case-insensitively symmetrized at construction time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Substitution {
    Simple {
        match_score: f64,
        mismatch_score: f64,
    },
    Matrix(Box<[[f64; 26]; 26]>),
}

impl Substitution {
    pub fn matrix(entries: [[f64; 26]; 26]) -> Result<Self, ConfigError> {
        for a in 0..26u8 {
            for b in 0..26u8 {
                let x = entries[a as usize][b as usize];
                let y = entries[b as usize][a as usize];
                if (x - y).abs() > 1e-9 {
                    return Err(ConfigError::AsymmetricMatrix(a, b));
                }
            }
        }
        Ok(Substitution::Matrix(Box::new(entries)))
    }

    pub fn simple(match_score: f64, mismatch_score: f64) -> Self {
        Substitution::Simple {
            match_score,
            mismatch_score,
        }
    }

    /// Score of aligning residue indices `a` and `b` (each `0..26`).
    ///
    /// The unknown-residue index always self-matches at score 0,
    /// overriding whatever the installed scheme says.
    pub fn score(&self, a: u8, b: u8) -> f64 {
        if a == b && a == UNKNOWN_INDEX {
            return 0.0;
        }
        match self {
            Substitution::Simple {
                match_score,
                mismatch_score,
            } => {
                if a == b {
                    *match_score
                } else {
                    *mismatch_score
                }
            }
            Substitution::Matrix(m) => m[a as usize][b as usize],
        }
    }

    pub fn match_mismatch(&self) -> Result<(f64, f64), ConfigError> {
        match self {
            Substitution::Simple {
                match_score,
                mismatch_score,
            } => Ok((*match_score, *mismatch_score)),
            Substitution::Matrix(_) => Err(ConfigError::NoScalarMatchScore),
        }
    }

    pub fn matrix_ref(&self) -> Result<&[[f64; 26]; 26], ConfigError> {
        match self {
            Substitution::Matrix(m) => Ok(m),
            Substitution::Simple { .. } => Err(ConfigError::NoMatrix),
        }
    }
}

/// Open/extend pair for one (side, region) combination. An affine gap of
/// length `len >= 1` costs `open + extend * (len - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapParams {
    pub open: f64,
    pub extend: f64,
}

impl GapParams {
    pub fn new(open: f64, extend: f64) -> Self {
        Self { open, extend }
    }

    fn is_linear(&self) -> bool {
        (self.open - self.extend).abs() < 1e-12
    }
}

/// The twelve affine gap parameters: `{target, query} x {open, extend} x
/// {internal, left, right}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapCosts {
    pub target_internal: GapParams,
    pub target_left: GapParams,
    pub target_right: GapParams,
    pub query_internal: GapParams,
    pub query_left: GapParams,
    pub query_right: GapParams,
}

impl GapCosts {
    /// The same open/extend pair used everywhere, for both sides.
    pub fn uniform(open: f64, extend: f64) -> Self {
        let p = GapParams::new(open, extend);
        Self {
            target_internal: p,
            target_left: p,
            target_right: p,
            query_internal: p,
            query_left: p,
            query_right: p,
        }
    }

    pub fn params(&self, side: Side, region: Region) -> GapParams {
        match (side, region) {
            (Side::Target, Region::Internal) => self.target_internal,
            (Side::Target, Region::Left) => self.target_left,
            (Side::Target, Region::Right) => self.target_right,
            (Side::Query, Region::Internal) => self.query_internal,
            (Side::Query, Region::Left) => self.query_left,
            (Side::Query, Region::Right) => self.query_right,
        }
    }

    /// A side is "linear" (usable by the unified NW/SW recurrence) only if
    /// open == extend in every region for that side.
    fn side_is_linear(&self, side: Side) -> bool {
        [Region::Internal, Region::Left, Region::Right]
            .into_iter()
            .all(|r| self.params(side, r).is_linear())
    }

    pub fn is_linear(&self) -> bool {
        self.side_is_linear(Side::Target) && self.side_is_linear(Side::Query)
    }

    /// Horizontal-move (consumes the query sequence, gap appears in the
    /// target) extend cost at the boundary determined by which row `i` the
    /// move is confined to: row 0 is the left boundary, row `total_rows`
    /// is the right boundary, anything else is interior.
    pub fn target_extend_at(&self, i: usize, total_rows: usize) -> f64 {
        self.target_internal_extend(self.region_for(i, total_rows))
    }

    pub fn target_open_at(&self, i: usize, total_rows: usize) -> f64 {
        self.params(Side::Target, self.region_for(i, total_rows)).open
    }

    /// Vertical-move (consumes the target sequence, gap appears in the
    /// query) extend cost at the boundary determined by column `j`.
    pub fn query_extend_at(&self, j: usize, total_cols: usize) -> f64 {
        self.query_internal_extend(self.region_for(j, total_cols))
    }

    pub fn query_open_at(&self, j: usize, total_cols: usize) -> f64 {
        self.params(Side::Query, self.region_for(j, total_cols)).open
    }

    fn region_for(&self, pos: usize, total: usize) -> Region {
        if pos == 0 {
            Region::Left
        } else if pos == total {
            Region::Right
        } else {
            Region::Internal
        }
    }

    fn target_internal_extend(&self, r: Region) -> f64 {
        self.params(Side::Target, r).extend
    }

    fn query_internal_extend(&self, r: Region) -> f64 {
        self.params(Side::Query, r).extend
    }
}

/// Which boundary region a DP cell's gap move falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Internal,
    Left,
    Right,
}

/// Arbitrary-length gap cost, the abstraction behind the
/// Waterman-Smith-Beyer recurrence: a polymorphic gap-cost provider in
/// place of a bare callback.
pub trait GapCostProvider {
    /// Cost of a length-`len` gap starting immediately after position
    /// `pos`. Returns `Err` if a user-supplied callback fails.
    fn cost(&self, pos: usize, len: usize) -> Result<f64, String>;
}

/// The affine closed form, expressed as a `GapCostProvider` so WSB-style
/// code can treat it uniformly with user-supplied functions.
pub struct AffineGapFn {
    pub open: f64,
    pub extend: f64,
}

impl GapCostProvider for AffineGapFn {
    fn cost(&self, _pos: usize, len: usize) -> Result<f64, String> {
        Ok(self.open + self.extend * (len as f64 - 1.0))
    }
}

/// A user-supplied gap cost function, `gap(pos, len) -> cost`.
pub struct UserGapFn<F>(pub F)
where
    F: Fn(usize, usize) -> Result<f64, String>;

impl<F> GapCostProvider for UserGapFn<F>
where
    F: Fn(usize, usize) -> Result<f64, String>,
{
    fn cost(&self, pos: usize, len: usize) -> Result<f64, String> {
        (self.0)(pos, len)
    }
}

/// Immutable scoring configuration for one `score`/`align` call.
pub struct ScoringScheme {
    pub substitution: Substitution,
    pub gaps: GapCosts,
    pub gap_fn_target: Option<Rc<dyn GapCostProvider>>,
    pub gap_fn_query: Option<Rc<dyn GapCostProvider>>,
    pub epsilon: f64,
    algorithm: OnceCell<Algorithm>,
}

impl Clone for ScoringScheme {
    fn clone(&self) -> Self {
        Self {
            substitution: self.substitution.clone(),
            gaps: self.gaps.clone(),
            gap_fn_target: self.gap_fn_target.clone(),
            gap_fn_query: self.gap_fn_query.clone(),
            epsilon: self.epsilon,
            algorithm: OnceCell::new(),
        }
    }
}

impl std::fmt::Debug for ScoringScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringScheme")
            .field("substitution", &self.substitution)
            .field("gaps", &self.gaps)
            .field("has_gap_fn_target", &self.gap_fn_target.is_some())
            .field("has_gap_fn_query", &self.gap_fn_query.is_some())
            .field("epsilon", &self.epsilon)
            .finish()
    }
}

impl ScoringScheme {
    pub fn new(substitution: Substitution, gaps: GapCosts) -> Self {
        Self {
            substitution,
            gaps,
            gap_fn_target: None,
            gap_fn_query: None,
            epsilon: 1e-6,
            algorithm: OnceCell::new(),
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_gap_fns(
        mut self,
        target: Rc<dyn GapCostProvider>,
        query: Rc<dyn GapCostProvider>,
    ) -> Self {
        self.gap_fn_target = Some(target);
        self.gap_fn_query = Some(query);
        self
    }

    /// Algorithm selection is memoized on the configuration: repeated
    /// calls after the first reuse the cached decision.
    pub fn algorithm(&self) -> Algorithm {
        *self.algorithm.get_or_init(|| Algorithm::select(self))
    }
}

impl Algorithm {
    /// WSB if either gap function is present; NW/SW if every region's
    /// open equals its extend on both sides; Gotoh otherwise.
    pub fn select(scheme: &ScoringScheme) -> Algorithm {
        if scheme.gap_fn_target.is_some() || scheme.gap_fn_query.is_some() {
            Algorithm::Wsb
        } else if scheme.gaps.is_linear() {
            Algorithm::NwSw
        } else {
            Algorithm::Gotoh
        }
    }
}
