//! Score-only recurrences: no trace table, just the optimal score.
//! NW/SW and Gotoh stream one (or three) row vectors, giving O(nB)
//! memory. WSB cannot: an arbitrary gap-cost function can look back to
//! any earlier row/column, so its `M` and `Iy`/`Ix` histories are kept
//! in full.

use crate::error::{AlignError, ConfigError, Side};
use crate::scoring::{Mode, ScoringScheme};
use crate::trace::NEG_INF;

/// Needleman-Wunsch / Smith-Waterman unified recurrence, streaming one
/// row of `O(nB)` state.
pub fn nwsw_score(
    scheme: &ScoringScheme,
    mode: Mode,
    sa: &[u8],
    sb: &[u8],
) -> Result<f64, AlignError> {
    let n_a = sa.len();
    let n_b = sb.len();

    let mut prev = vec![0.0f64; n_b + 1];
    if mode == Mode::Global {
        for j in 1..=n_b {
            prev[j] = prev[j - 1] + scheme.gaps.target_extend_at(0, n_a);
        }
    }

    let mut best = 0.0f64;
    for i in 1..=n_a {
        let mut cur = vec![0.0f64; n_b + 1];
        if mode == Mode::Global {
            cur[0] = prev[0] + scheme.gaps.query_extend_at(0, n_b);
        }
        for j in 1..=n_b {
            let sub = scheme.substitution.score(sa[i - 1], sb[j - 1]);
            let diag = prev[j - 1] + sub;
            let horiz = cur[j - 1] + scheme.gaps.target_extend_at(i, n_a);
            let vert = prev[j] + scheme.gaps.query_extend_at(j, n_b);
            let mut val = diag.max(horiz).max(vert);
            if mode == Mode::Local {
                val = val.max(0.0);
                best = best.max(val);
            }
            cur[j] = val;
        }
        prev = cur;
    }

    Ok(match mode {
        Mode::Global => prev[n_b],
        Mode::Local => best,
    })
}

/// Gotoh's three-state affine recurrence, streaming three row vectors.
pub fn gotoh_score(
    scheme: &ScoringScheme,
    mode: Mode,
    sa: &[u8],
    sb: &[u8],
) -> Result<f64, AlignError> {
    let n_a = sa.len();
    let n_b = sb.len();

    let mut m_prev = vec![NEG_INF; n_b + 1];
    let mut ix_prev = vec![NEG_INF; n_b + 1];
    let mut iy_prev = vec![NEG_INF; n_b + 1];

    match mode {
        Mode::Global => {
            m_prev[0] = 0.0;
            let open = scheme.gaps.target_open_at(0, n_a);
            let ext = scheme.gaps.target_extend_at(0, n_a);
            for j in 1..=n_b {
                iy_prev[j] = (m_prev[j - 1] + open).max(iy_prev[j - 1] + ext);
            }
        }
        Mode::Local => {
            for j in 0..=n_b {
                m_prev[j] = 0.0;
                ix_prev[j] = 0.0;
                iy_prev[j] = 0.0;
            }
        }
    }

    let mut best = 0.0f64;
    for i in 1..=n_a {
        let mut m_cur = vec![NEG_INF; n_b + 1];
        let mut ix_cur = vec![NEG_INF; n_b + 1];
        let mut iy_cur = vec![NEG_INF; n_b + 1];

        match mode {
            Mode::Global => {
                let open = scheme.gaps.query_open_at(0, n_b);
                let ext = scheme.gaps.query_extend_at(0, n_b);
                ix_cur[0] = (m_prev[0] + open).max(ix_prev[0] + ext);
            }
            Mode::Local => {
                m_cur[0] = 0.0;
                ix_cur[0] = 0.0;
                iy_cur[0] = 0.0;
            }
        }

        let t_open = scheme.gaps.target_open_at(i, n_a);
        let t_ext = scheme.gaps.target_extend_at(i, n_a);

        for j in 1..=n_b {
            let sub = scheme.substitution.score(sa[i - 1], sb[j - 1]);
            let mut m_val = m_prev[j - 1].max(ix_prev[j - 1]).max(iy_prev[j - 1]) + sub;

            let q_open = scheme.gaps.query_open_at(j, n_b);
            let q_ext = scheme.gaps.query_extend_at(j, n_b);
            let mut ix_val = (m_prev[j] + q_open)
                .max(ix_prev[j] + q_ext)
                .max(iy_prev[j] + q_open);

            let mut iy_val = (m_cur[j - 1] + t_open)
                .max(ix_cur[j - 1] + t_open)
                .max(iy_cur[j - 1] + t_ext);

            if mode == Mode::Local {
                m_val = m_val.max(0.0);
                ix_val = ix_val.max(0.0);
                iy_val = iy_val.max(0.0);
                best = best.max(m_val);
            }

            m_cur[j] = m_val;
            ix_cur[j] = ix_val;
            iy_cur[j] = iy_val;
        }

        m_prev = m_cur;
        ix_prev = ix_cur;
        iy_prev = iy_cur;
    }

    Ok(match mode {
        Mode::Global => m_prev[n_b].max(ix_prev[n_b]).max(iy_prev[n_b]),
        Mode::Local => best,
    })
}

/// Waterman-Smith-Beyer: arbitrary-length gap costs supplied by a
/// [`crate::scoring::GapCostProvider`]. `Ix`/`Iy` additionally maximize
/// over every gap length via an explicit inner loop.
pub fn wsb_score(
    scheme: &ScoringScheme,
    mode: Mode,
    sa: &[u8],
    sb: &[u8],
) -> Result<f64, AlignError> {
    let gap_t = scheme
        .gap_fn_target
        .as_ref()
        .ok_or(ConfigError::MissingGapFn(Side::Target))?;
    let gap_q = scheme
        .gap_fn_query
        .as_ref()
        .ok_or(ConfigError::MissingGapFn(Side::Query))?;

    let n_a = sa.len();
    let n_b = sb.len();
    let cols = n_b + 1;
    let idx = |i: usize, j: usize| i * cols + j;

    let mut m = vec![NEG_INF; (n_a + 1) * cols];
    let mut ix = vec![NEG_INF; (n_a + 1) * cols];
    let mut iy = vec![NEG_INF; (n_a + 1) * cols];

    match mode {
        Mode::Global => {
            m[idx(0, 0)] = 0.0;
            for j in 1..=n_b {
                let mut best_iy = NEG_INF;
                for ell in 1..=j {
                    let cost = gap_t.cost(0, ell).map_err(AlignError::Callback)?;
                    best_iy = best_iy
                        .max(m[idx(0, j - ell)] + cost)
                        .max(iy[idx(0, j - ell)] + cost);
                }
                iy[idx(0, j)] = best_iy;
            }
            for i in 1..=n_a {
                let mut best_ix = NEG_INF;
                for ell in 1..=i {
                    let cost = gap_q.cost(0, ell).map_err(AlignError::Callback)?;
                    best_ix = best_ix
                        .max(m[idx(i - ell, 0)] + cost)
                        .max(iy[idx(i - ell, 0)] + cost);
                }
                ix[idx(i, 0)] = best_ix;
            }
        }
        Mode::Local => {
            for j in 0..=n_b {
                m[idx(0, j)] = 0.0;
                ix[idx(0, j)] = 0.0;
                iy[idx(0, j)] = 0.0;
            }
            for i in 0..=n_a {
                m[idx(i, 0)] = 0.0;
                ix[idx(i, 0)] = 0.0;
                iy[idx(i, 0)] = 0.0;
            }
        }
    }

    let mut best = 0.0f64;
    for i in 1..=n_a {
        for j in 1..=n_b {
            let sub = scheme.substitution.score(sa[i - 1], sb[j - 1]);
            let mut m_val = m[idx(i - 1, j - 1)]
                .max(ix[idx(i - 1, j - 1)])
                .max(iy[idx(i - 1, j - 1)])
                + sub;

            let mut ix_val = NEG_INF;
            for ell in 1..=i {
                let cost = gap_q.cost(j, ell).map_err(AlignError::Callback)?;
                ix_val = ix_val
                    .max(m[idx(i - ell, j)] + cost)
                    .max(iy[idx(i - ell, j)] + cost);
            }

            let mut iy_val = NEG_INF;
            for ell in 1..=j {
                let cost = gap_t.cost(i, ell).map_err(AlignError::Callback)?;
                iy_val = iy_val
                    .max(m[idx(i, j - ell)] + cost)
                    .max(ix[idx(i, j - ell)] + cost);
            }

            if mode == Mode::Local {
                m_val = m_val.max(0.0);
                ix_val = ix_val.max(0.0);
                iy_val = iy_val.max(0.0);
                best = best.max(m_val);
            }

            m[idx(i, j)] = m_val;
            ix[idx(i, j)] = ix_val;
            iy[idx(i, j)] = iy_val;
        }
    }

    Ok(match mode {
        Mode::Global => m[idx(n_a, n_b)].max(ix[idx(n_a, n_b)]).max(iy[idx(n_a, n_b)]),
        Mode::Local => best,
    })
}
