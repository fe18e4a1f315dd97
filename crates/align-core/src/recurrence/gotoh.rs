//! Gotoh three-state affine-gap traceback recurrence.

use crate::error::AlignError;
use crate::grid::Grid;
use crate::scoring::{Mode, ScoringScheme};
use crate::trace::{
    tied, GotohCell, DIAGONAL, ENDPOINT, HORIZONTAL, NEG_INF, SRC_IX, SRC_IY, SRC_M, STARTPOINT,
    VERTICAL,
};

/// Fill full `(nA+1) x (nB+1)` `M`/`Ix`/`Iy` score grids and a
/// `GotohCell` trace grid, returning the optimal score alongside the
/// trace grid.
pub fn align(
    scheme: &ScoringScheme,
    mode: Mode,
    sa: &[u8],
    sb: &[u8],
) -> Result<(f64, Grid<GotohCell>), AlignError> {
    let n_a = sa.len();
    let n_b = sb.len();
    let eps = scheme.epsilon;

    let mut m = Grid::<f64>::try_new(n_a + 1, n_b + 1)?;
    let mut ix = Grid::<f64>::try_new(n_a + 1, n_b + 1)?;
    let mut iy = Grid::<f64>::try_new(n_a + 1, n_b + 1)?;
    let mut cells = Grid::<GotohCell>::try_new(n_a + 1, n_b + 1)?;

    for i in 0..=n_a {
        for j in 0..=n_b {
            m.set(i, j, NEG_INF);
            ix.set(i, j, NEG_INF);
            iy.set(i, j, NEG_INF);
        }
    }

    match mode {
        Mode::Global => {
            m.set(0, 0, 0.0);
            let open = scheme.gaps.target_open_at(0, n_a);
            let ext = scheme.gaps.target_extend_at(0, n_a);
            for j in 1..=n_b {
                let from_m = *m.get(0, j - 1) + open;
                let from_iy = *iy.get(0, j - 1) + ext;
                let val = from_m.max(from_iy);
                iy.set(0, j, val);
                let mut src = 0u8;
                if tied(from_m, val, eps) {
                    src |= SRC_M;
                }
                if tied(from_iy, val, eps) {
                    src |= SRC_IY;
                }
                cells.get_mut(0, j).main.set_trace(HORIZONTAL);
                cells.get_mut(0, j).gaps.set_iy_src(src);
            }
            let open = scheme.gaps.query_open_at(0, n_b);
            let ext = scheme.gaps.query_extend_at(0, n_b);
            for i in 1..=n_a {
                let from_m = *m.get(i - 1, 0) + open;
                let from_ix = *ix.get(i - 1, 0) + ext;
                let val = from_m.max(from_ix);
                ix.set(i, 0, val);
                let mut src = 0u8;
                if tied(from_m, val, eps) {
                    src |= SRC_M;
                }
                if tied(from_ix, val, eps) {
                    src |= SRC_IX;
                }
                cells.get_mut(i, 0).main.set_trace(VERTICAL);
                cells.get_mut(i, 0).gaps.set_ix_src(src);
            }
        }
        Mode::Local => {
            for j in 0..=n_b {
                m.set(0, j, 0.0);
                ix.set(0, j, 0.0);
                iy.set(0, j, 0.0);
                cells.get_mut(0, j).main.set_trace(STARTPOINT);
            }
            for i in 0..=n_a {
                m.set(i, 0, 0.0);
                ix.set(i, 0, 0.0);
                iy.set(i, 0, 0.0);
                cells.get_mut(i, 0).main.set_trace(STARTPOINT);
            }
        }
    }

    let mut global_max = if mode == Mode::Local { 0.0 } else { f64::MIN };
    let mut endpoints: Vec<(usize, usize)> = Vec::new();

    for i in 1..=n_a {
        let t_open = scheme.gaps.target_open_at(i, n_a);
        let t_ext = scheme.gaps.target_extend_at(i, n_a);
        for j in 1..=n_b {
            let sub = scheme.substitution.score(sa[i - 1], sb[j - 1]);
            let from_m_diag = *m.get(i - 1, j - 1);
            let from_ix_diag = *ix.get(i - 1, j - 1);
            let from_iy_diag = *iy.get(i - 1, j - 1);
            let best_diag_pred = from_m_diag.max(from_ix_diag).max(from_iy_diag);
            let mut m_val = best_diag_pred + sub;

            let q_open = scheme.gaps.query_open_at(j, n_b);
            let q_ext = scheme.gaps.query_extend_at(j, n_b);
            let from_m_v = *m.get(i - 1, j) + q_open;
            let from_ix_v = *ix.get(i - 1, j) + q_ext;
            let from_iy_v = *iy.get(i - 1, j) + q_open;
            let mut ix_val = from_m_v.max(from_ix_v).max(from_iy_v);

            let from_m_h = *m.get(i, j - 1) + t_open;
            let from_ix_h = *ix.get(i, j - 1) + t_open;
            let from_iy_h = *iy.get(i, j - 1) + t_ext;
            let mut iy_val = from_m_h.max(from_ix_h).max(from_iy_h);

            if mode == Mode::Local {
                m_val = m_val.max(0.0);
                ix_val = ix_val.max(0.0);
                iy_val = iy_val.max(0.0);
            }

            m.set(i, j, m_val);
            ix.set(i, j, ix_val);
            iy.set(i, j, iy_val);

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

            let mut ix_src = 0u8;
            if tied(from_m_v, ix_val, eps) {
                ix_src |= SRC_M;
            }
            if tied(from_ix_v, ix_val, eps) {
                ix_src |= SRC_IX;
            }
            if tied(from_iy_v, ix_val, eps) {
                ix_src |= SRC_IY;
            }

            let mut iy_src = 0u8;
            if tied(from_m_h, iy_val, eps) {
                iy_src |= SRC_M;
            }
            if tied(from_ix_h, iy_val, eps) {
                iy_src |= SRC_IX;
            }
            if tied(from_iy_h, iy_val, eps) {
                iy_src |= SRC_IY;
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
            cell.gaps.set_ix_src(ix_src);
            cell.gaps.set_iy_src(iy_src);
        }
    }

    if mode == Mode::Local {
        for &(i, j) in &endpoints {
            cells.get_mut(i, j).main.add_trace(ENDPOINT);
        }
        crate::reachability::prune_gotoh(&mut cells)?;
        Ok((global_max, cells))
    } else {
        let final_score = m.get(n_a, n_b).max(*ix.get(n_a, n_b)).max(*iy.get(n_a, n_b));
        Ok((final_score, cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::score_only;
    use crate::scoring::{GapCosts, Substitution};

    fn encode(s: &[u8]) -> Vec<u8> {
        s.iter().map(|&b| b - b'A').collect()
    }

    #[test]
    fn test_align_score_matches_score_only_global() {
        let scheme = ScoringScheme::new(Substitution::simple(1.0, 0.0), GapCosts::uniform(-2.0, -1.0));
        let sa = encode(b"AAAA");
        let sb = encode(b"AA");
        let (score, _) = align(&scheme, Mode::Global, &sa, &sb).unwrap();
        let only = score_only::gotoh_score(&scheme, Mode::Global, &sa, &sb).unwrap();
        assert_eq!(score, only);
    }

    #[test]
    fn test_align_score_matches_score_only_local() {
        let scheme = ScoringScheme::new(Substitution::simple(2.0, -1.0), GapCosts::uniform(-2.0, -1.0));
        let sa = encode(b"ACACACTA");
        let sb = encode(b"AGCACACA");
        let (score, cells) = align(&scheme, Mode::Local, &sa, &sb).unwrap();
        let only = score_only::gotoh_score(&scheme, Mode::Local, &sa, &sb).unwrap();
        assert_eq!(score, only);

        let mut saw_endpoint = false;
        for i in 0..=sa.len() {
            for j in 0..=sb.len() {
                if cells.get(i, j).main.has(ENDPOINT) {
                    saw_endpoint = true;
                }
            }
        }
        assert!(saw_endpoint);
    }

    #[test]
    fn test_local_mode_forbids_trailing_gap_endpoint() {
        // An all-gap-extension tail can never register as the local
        // optimum: `best` in local mode only ever tracks `m_val`.
        let scheme = ScoringScheme::new(Substitution::simple(1.0, -5.0), GapCosts::uniform(-1.0, -1.0));
        let sa = encode(b"AAAA");
        let sb = encode(b"AAAAAA");
        let (score, _) = align(&scheme, Mode::Local, &sa, &sb).unwrap();
        assert_eq!(score, 4.0);
    }

    #[test]
    fn test_global_boundary_gap_src_recorded() {
        let scheme = ScoringScheme::new(Substitution::simple(1.0, -1.0), GapCosts::uniform(-2.0, -1.0));
        let sa = encode(b"AAA");
        let sb = encode(b"A");
        let (_, cells) = align(&scheme, Mode::Global, &sa, &sb).unwrap();
        assert_eq!(cells.get(0, 0).main.trace(), 0);
        assert!(cells.get(2, 0).main.has(VERTICAL));
        assert_ne!(cells.get(2, 0).gaps.ix_src(), 0);
    }
}
