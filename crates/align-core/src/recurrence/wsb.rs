//! Waterman-Smith-Beyer traceback recurrence: arbitrary gap-length
//! costs via a [`crate::scoring::GapCostProvider`], with every tied
//! gap length recorded rather than only the best.

use crate::error::{AlignError, ConfigError, Side};
use crate::grid::Grid;
use crate::scoring::{Mode, ScoringScheme};
use crate::trace::{
    tied, GapLists, WsbCell, DIAGONAL, ENDPOINT, HORIZONTAL, NEG_INF, STARTPOINT, VERTICAL,
};

/// Fill full `(nA+1) x (nB+1)` `M`/`Ix`/`Iy` score grids and a
/// `WsbCell` trace grid backed by a [`GapLists`] arena, returning the
/// optimal score, the trace grid, and the arena.
pub fn align(
    scheme: &ScoringScheme,
    mode: Mode,
    sa: &[u8],
    sb: &[u8],
) -> Result<(f64, Grid<WsbCell>, GapLists), AlignError> {
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
    let eps = scheme.epsilon;
    let cols = n_b + 1;
    let idx = |i: usize, j: usize| i * cols + j;

    let mut m = vec![NEG_INF; (n_a + 1) * cols];
    let mut ix = vec![NEG_INF; (n_a + 1) * cols];
    let mut iy = vec![NEG_INF; (n_a + 1) * cols];
    let mut cells = Grid::<WsbCell>::try_new(n_a + 1, n_b + 1)?;
    let mut lists = GapLists::default();

    match mode {
        Mode::Global => {
            m[idx(0, 0)] = 0.0;
            for j in 1..=n_b {
                let mut costs = Vec::with_capacity(j);
                for ell in 1..=j {
                    costs.push(gap_t.cost(0, ell).map_err(AlignError::Callback)?);
                }
                let mut best_iy = NEG_INF;
                for ell in 1..=j {
                    let cost = costs[ell - 1];
                    best_iy = best_iy
                        .max(m[idx(0, j - ell)] + cost)
                        .max(iy[idx(0, j - ell)] + cost);
                }
                iy[idx(0, j)] = best_iy;
                let mut m_iy = Vec::new();
                let mut ix_iy = Vec::new();
                for ell in 1..=j {
                    let cost = costs[ell - 1];
                    if tied(m[idx(0, j - ell)] + cost, best_iy, eps) {
                        m_iy.push(ell as u32);
                    }
                    if tied(ix[idx(0, j - ell)] + cost, best_iy, eps) {
                        ix_iy.push(ell as u32);
                    }
                }
                let cell = cells.get_mut(0, j);
                cell.main.set_trace(HORIZONTAL);
                cell.m_iy = lists.push(&m_iy);
                cell.ix_iy = lists.push(&ix_iy);
            }
            for i in 1..=n_a {
                let mut costs = Vec::with_capacity(i);
                for ell in 1..=i {
                    costs.push(gap_q.cost(0, ell).map_err(AlignError::Callback)?);
                }
                let mut best_ix = NEG_INF;
                for ell in 1..=i {
                    let cost = costs[ell - 1];
                    best_ix = best_ix
                        .max(m[idx(i - ell, 0)] + cost)
                        .max(iy[idx(i - ell, 0)] + cost);
                }
                ix[idx(i, 0)] = best_ix;
                let mut m_ix = Vec::new();
                let mut iy_ix = Vec::new();
                for ell in 1..=i {
                    let cost = costs[ell - 1];
                    if tied(m[idx(i - ell, 0)] + cost, best_ix, eps) {
                        m_ix.push(ell as u32);
                    }
                    if tied(iy[idx(i - ell, 0)] + cost, best_ix, eps) {
                        iy_ix.push(ell as u32);
                    }
                }
                let cell = cells.get_mut(i, 0);
                cell.main.set_trace(VERTICAL);
                cell.m_ix = lists.push(&m_ix);
                cell.iy_ix = lists.push(&iy_ix);
            }
        }
        Mode::Local => {
            for j in 0..=n_b {
                m[idx(0, j)] = 0.0;
                ix[idx(0, j)] = 0.0;
                iy[idx(0, j)] = 0.0;
                cells.get_mut(0, j).main.set_trace(STARTPOINT);
            }
            for i in 0..=n_a {
                m[idx(i, 0)] = 0.0;
                ix[idx(i, 0)] = 0.0;
                iy[idx(i, 0)] = 0.0;
                cells.get_mut(i, 0).main.set_trace(STARTPOINT);
            }
        }
    }

    let mut global_max = if mode == Mode::Local { 0.0 } else { f64::MIN };
    let mut endpoints: Vec<(usize, usize)> = Vec::new();

    for i in 1..=n_a {
        for j in 1..=n_b {
            let sub = scheme.substitution.score(sa[i - 1], sb[j - 1]);
            let mut m_val = m[idx(i - 1, j - 1)]
                .max(ix[idx(i - 1, j - 1)])
                .max(iy[idx(i - 1, j - 1)])
                + sub;

            let mut q_costs = Vec::with_capacity(i);
            for ell in 1..=i {
                q_costs.push(gap_q.cost(j, ell).map_err(AlignError::Callback)?);
            }
            let mut ix_val = NEG_INF;
            for ell in 1..=i {
                let cost = q_costs[ell - 1];
                ix_val = ix_val
                    .max(m[idx(i - ell, j)] + cost)
                    .max(iy[idx(i - ell, j)] + cost);
            }

            let mut t_costs = Vec::with_capacity(j);
            for ell in 1..=j {
                t_costs.push(gap_t.cost(i, ell).map_err(AlignError::Callback)?);
            }
            let mut iy_val = NEG_INF;
            for ell in 1..=j {
                let cost = t_costs[ell - 1];
                iy_val = iy_val
                    .max(m[idx(i, j - ell)] + cost)
                    .max(ix[idx(i, j - ell)] + cost);
            }

            if mode == Mode::Local {
                m_val = m_val.max(0.0);
                ix_val = ix_val.max(0.0);
                iy_val = iy_val.max(0.0);
            }

            m[idx(i, j)] = m_val;
            ix[idx(i, j)] = ix_val;
            iy[idx(i, j)] = iy_val;

            let mut m_ix = Vec::new();
            let mut iy_ix = Vec::new();
            for ell in 1..=i {
                let cost = q_costs[ell - 1];
                if tied(m[idx(i - ell, j)] + cost, ix_val, eps) {
                    m_ix.push(ell as u32);
                }
                if tied(iy[idx(i - ell, j)] + cost, ix_val, eps) {
                    iy_ix.push(ell as u32);
                }
            }

            let mut m_iy = Vec::new();
            let mut ix_iy = Vec::new();
            for ell in 1..=j {
                let cost = t_costs[ell - 1];
                if tied(m[idx(i, j - ell)] + cost, iy_val, eps) {
                    m_iy.push(ell as u32);
                }
                if tied(ix[idx(i, j - ell)] + cost, iy_val, eps) {
                    ix_iy.push(ell as u32);
                }
            }

            let best = m_val.max(ix_val).max(iy_val);
            let mut trace = 0u8;
            if tied(m_val, best, eps) {
                trace |= DIAGONAL;
            }
            if tied(ix_val, best, eps) {
                trace |= VERTICAL;
            }
            if tied(iy_val, best, eps) {
                trace |= HORIZONTAL;
            }

            if mode == Mode::Local {
                if m_val <= eps {
                    trace = STARTPOINT;
                } else if tied(m_val, global_max, eps) {
                    endpoints.push((i, j));
                } else if m_val > global_max + eps {
                    endpoints.clear();
                    endpoints.push((i, j));
                }
                global_max = global_max.max(m_val);
            }

            let cell = cells.get_mut(i, j);
            cell.main.set_trace(trace);
            cell.m_ix = lists.push(&m_ix);
            cell.iy_ix = lists.push(&iy_ix);
            cell.m_iy = lists.push(&m_iy);
            cell.ix_iy = lists.push(&ix_iy);
        }
    }

    if mode == Mode::Local {
        for &(i, j) in &endpoints {
            cells.get_mut(i, j).main.add_trace(ENDPOINT);
        }
        let pruned = crate::reachability::prune_wsb(&mut cells, &lists)?;
        Ok((global_max, cells, pruned))
    } else {
        let final_score = m[idx(n_a, n_b)].max(ix[idx(n_a, n_b)]).max(iy[idx(n_a, n_b)]);
        Ok((final_score, cells, lists))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::score_only;
    use crate::scoring::{AffineGapFn, GapCosts, Substitution};
    use std::rc::Rc;

    fn encode(s: &[u8]) -> Vec<u8> {
        s.iter().map(|&b| b - b'A').collect()
    }

    fn affine_scheme(match_score: f64, mismatch: f64, open: f64, extend: f64) -> ScoringScheme {
        ScoringScheme::new(
            Substitution::simple(match_score, mismatch),
            GapCosts::uniform(open, extend),
        )
        .with_gap_fns(
            Rc::new(AffineGapFn { open, extend }),
            Rc::new(AffineGapFn { open, extend }),
        )
    }

    #[test]
    fn test_align_score_matches_score_only_global() {
        let scheme = affine_scheme(1.0, -1.0, -2.0, -1.0);
        let sa = encode(b"AAA");
        let sb = encode(b"AAAA");
        let (score, _, _) = align(&scheme, Mode::Global, &sa, &sb).unwrap();
        let only = score_only::wsb_score(&scheme, Mode::Global, &sa, &sb).unwrap();
        assert_eq!(score, only);
    }

    #[test]
    fn test_align_score_matches_score_only_local() {
        let scheme = affine_scheme(2.0, -1.0, -2.0, -1.0);
        let sa = encode(b"ACACACTA");
        let sb = encode(b"AGCACACA");
        let (score, cells, lists) = align(&scheme, Mode::Local, &sa, &sb).unwrap();
        let only = score_only::wsb_score(&scheme, Mode::Local, &sa, &sb).unwrap();
        assert_eq!(score, only);

        let mut saw_endpoint = false;
        let max_len = sa.len().max(sb.len()) as u32;
        for i in 0..=sa.len() {
            for j in 0..=sb.len() {
                let cell = cells.get(i, j);
                if cell.main.has(ENDPOINT) {
                    saw_endpoint = true;
                }
                for ell in lists.iter(cell.m_ix).chain(lists.iter(cell.m_iy)) {
                    assert!(ell >= 1 && ell <= max_len);
                }
            }
        }
        assert!(saw_endpoint);
    }

    #[test]
    fn test_gap_length_lists_record_every_tied_length() {
        // Two mismatches bracketing a run that a length-2 and a
        // length-1-plus-length-1 gap both reach identically under a
        // pure linear (affine with zero open) cost: both lengths tie.
        let scheme = ScoringScheme::new(Substitution::simple(1.0, -1.0), GapCosts::uniform(-1.0, -1.0))
            .with_gap_fns(
                Rc::new(AffineGapFn { open: 0.0, extend: -1.0 }),
                Rc::new(AffineGapFn { open: 0.0, extend: -1.0 }),
            );
        let sa = encode(b"AA");
        let sb = encode(b"AAAA");
        let (_, cells, lists) = align(&scheme, Mode::Global, &sa, &sb).unwrap();
        let cell = cells.get(2, 4);
        let total = lists.len_of(cell.m_iy) + lists.len_of(cell.ix_iy);
        assert!(total >= 1);
    }
}
