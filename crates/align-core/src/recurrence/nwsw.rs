//! Needleman-Wunsch / Smith-Waterman unified traceback recurrence.

use crate::error::AlignError;
use crate::grid::Grid;
use crate::scoring::{Mode, ScoringScheme};
use crate::trace::{tied, TraceCell, DIAGONAL, ENDPOINT, HORIZONTAL, STARTPOINT, VERTICAL};

/// Fill a full `(nA+1) x (nB+1)` trace table and return the optimal
/// score alongside it.
pub fn align(
    scheme: &ScoringScheme,
    mode: Mode,
    sa: &[u8],
    sb: &[u8],
) -> Result<(f64, Grid<TraceCell>), AlignError> {
    let n_a = sa.len();
    let n_b = sb.len();
    let eps = scheme.epsilon;

    let mut scores = Grid::<f64>::try_new(n_a + 1, n_b + 1)?;
    let mut cells = Grid::<TraceCell>::try_new(n_a + 1, n_b + 1)?;

    scores.set(0, 0, 0.0);
    if mode == Mode::Global {
        for j in 1..=n_b {
            let v = *scores.get(0, j - 1) + scheme.gaps.target_extend_at(0, n_a);
            scores.set(0, j, v);
            cells.get_mut(0, j).set_trace(HORIZONTAL);
        }
        for i in 1..=n_a {
            let v = *scores.get(i - 1, 0) + scheme.gaps.query_extend_at(0, n_b);
            scores.set(i, 0, v);
            cells.get_mut(i, 0).set_trace(VERTICAL);
        }
    } else {
        // Local mode: row 0 and column 0 are trivial empty-prefix cells,
        // always scoring zero, and are therefore always valid path leaves.
        for j in 0..=n_b {
            cells.get_mut(0, j).set_trace(STARTPOINT);
        }
        for i in 0..=n_a {
            cells.get_mut(i, 0).set_trace(STARTPOINT);
        }
    }

    let mut global_max = if mode == Mode::Local { 0.0 } else { f64::MIN };
    let mut endpoints: Vec<(usize, usize)> = Vec::new();

    for i in 1..=n_a {
        for j in 1..=n_b {
            let sub = scheme.substitution.score(sa[i - 1], sb[j - 1]);
            let diag = *scores.get(i - 1, j - 1) + sub;
            let horiz = *scores.get(i, j - 1) + scheme.gaps.target_extend_at(i, n_a);
            let vert = *scores.get(i - 1, j) + scheme.gaps.query_extend_at(j, n_b);

            let mut best = diag.max(horiz).max(vert);
            if mode == Mode::Local {
                best = best.max(0.0);
            }
            scores.set(i, j, best);

            let mut trace = 0u8;
            if tied(diag, best, eps) {
                trace |= DIAGONAL;
            }
            if tied(horiz, best, eps) {
                trace |= HORIZONTAL;
            }
            if tied(vert, best, eps) {
                trace |= VERTICAL;
            }

            if mode == Mode::Local {
                if best <= eps {
                    // Score rounds to zero: this cell can only be a fresh
                    // start, not an extension of a negative-scoring path.
                    trace = STARTPOINT;
                } else if tied(best, global_max, eps) {
                    endpoints.push((i, j));
                } else if best > global_max + eps {
                    endpoints.clear();
                    endpoints.push((i, j));
                }
                global_max = global_max.max(best);
            }

            cells.get_mut(i, j).set_trace(trace);
        }
    }

    if mode == Mode::Local {
        for &(i, j) in &endpoints {
            cells.get_mut(i, j).add_trace(ENDPOINT);
        }
        crate::reachability::prune_nwsw(&mut cells)?;
        Ok((global_max, cells))
    } else {
        Ok((*scores.get(n_a, n_b), cells))
    }
}
