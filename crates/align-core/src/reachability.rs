//! The local-mode reachability sweep: after DP completion, clear trace
//! bits that cannot transitively reach a `STARTPOINT`, so the enumerator
//! never produces a path through a dead end.
//!
//! Global mode never runs this pass -- only local mode can have cells
//! whose only trace bits point toward a sub-zero extension that was
//! itself pruned.

use crate::error::AlignError;
use crate::grid::Grid;
use crate::trace::{
    src_to_state_bits, GapLists, GotohCell, TraceCell, WsbCell, DIAGONAL, ENDPOINT, HORIZONTAL,
    NO_LIST, STARTPOINT, VERTICAL,
};

/// The three direction bits, reused as the `{M, Ix, Iy}` state mask for
/// Gotoh/WSB (see `trace.rs`).
const STATE_BITS: u8 = DIAGONAL | VERTICAL | HORIZONTAL;

/// NW/SW: a cell is reachable if it is itself a `STARTPOINT`, or at
/// least one of its set direction bits points at a reachable
/// predecessor. Unreachable cells lose every trace bit, including
/// `ENDPOINT`.
pub fn prune_nwsw(cells: &mut Grid<TraceCell>) -> Result<(), AlignError> {
    let rows = cells.rows();
    let cols = cells.cols();
    let mut reachable = Grid::<bool>::try_new(rows, cols)?;

    for i in 0..rows {
        for j in 0..cols {
            let cell = *cells.get(i, j);
            let mut r = cell.has(STARTPOINT);
            if !r && i > 0 && j > 0 && cell.has(DIAGONAL) && *reachable.get(i - 1, j - 1) {
                r = true;
            }
            if !r && j > 0 && cell.has(HORIZONTAL) && *reachable.get(i, j - 1) {
                r = true;
            }
            if !r && i > 0 && cell.has(VERTICAL) && *reachable.get(i - 1, j) {
                r = true;
            }
            reachable.set(i, j, r);
            if !r {
                cells.get_mut(i, j).clear_trace();
            }
        }
    }
    Ok(())
}

/// Gotoh: reachability is tracked per matrix state (`M`/`Ix`/`Iy`),
/// since a later cell's gap-source nibble can reference an earlier
/// cell's `Ix` or `Iy` state even when that state didn't tie for the
/// earlier cell's own overall best.
pub fn prune_gotoh(cells: &mut Grid<GotohCell>) -> Result<(), AlignError> {
    let rows = cells.rows();
    let cols = cells.cols();
    let mut reach = Grid::<u8>::try_new(rows, cols)?;

    for i in 0..rows {
        for j in 0..cols {
            let cell = *cells.get(i, j);
            let is_start = cell.main.has(STARTPOINT);
            let overall = cell.main.trace() & STATE_BITS;

            let m_ok = is_start
                || (i > 0 && j > 0 && *reach.get(i - 1, j - 1) & DIAGONAL != 0);
            let ix_ok = is_start
                || (i > 0 && src_to_state_bits(cell.gaps.ix_src()) & *reach.get(i - 1, j) != 0);
            let iy_ok = is_start
                || (j > 0 && src_to_state_bits(cell.gaps.iy_src()) & *reach.get(i, j - 1) != 0);

            let mut mask = 0u8;
            if m_ok {
                mask |= DIAGONAL;
            }
            if ix_ok {
                mask |= VERTICAL;
            }
            if iy_ok {
                mask |= HORIZONTAL;
            }
            reach.set(i, j, mask);

            let mut new_trace = overall & mask;
            if is_start {
                new_trace |= STARTPOINT;
            }
            if cell.main.has(ENDPOINT) && mask != 0 {
                new_trace |= ENDPOINT;
            }

            let updated = cells.get_mut(i, j);
            updated.main.set_trace(new_trace);
            if !ix_ok {
                updated.gaps.set_ix_src(0);
            }
            if !iy_ok {
                updated.gaps.set_iy_src(0);
            }
        }
    }
    Ok(())
}

/// WSB: like Gotoh, but a gap state's predecessors are an explicit list
/// of lengths rather than a 3-bit mask. Lists are rebuilt into a fresh
/// arena retaining only entries whose predecessor (state, cell) is
/// reachable.
pub fn prune_wsb(cells: &mut Grid<WsbCell>, lists: &GapLists) -> Result<GapLists, AlignError> {
    let rows = cells.rows();
    let cols = cells.cols();
    let mut reach = Grid::<u8>::try_new(rows, cols)?;
    let mut out = GapLists::default();

    for i in 0..rows {
        for j in 0..cols {
            let cell = *cells.get(i, j);
            let is_start = cell.main.has(STARTPOINT);
            let overall = cell.main.trace() & STATE_BITS;

            let m_ok = is_start
                || (i > 0 && j > 0 && *reach.get(i - 1, j - 1) & DIAGONAL != 0);

            let mut ix_m = Vec::new();
            let mut ix_iy = Vec::new();
            for ell in lists.iter(cell.m_ix) {
                let p = ell as usize;
                if p <= i && *reach.get(i - p, j) & DIAGONAL != 0 {
                    ix_m.push(ell);
                }
            }
            for ell in lists.iter(cell.iy_ix) {
                let p = ell as usize;
                if p <= i && *reach.get(i - p, j) & HORIZONTAL != 0 {
                    ix_iy.push(ell);
                }
            }
            let ix_ok = is_start || !ix_m.is_empty() || !ix_iy.is_empty();

            let mut iy_m = Vec::new();
            let mut iy_ix = Vec::new();
            for ell in lists.iter(cell.m_iy) {
                let p = ell as usize;
                if p <= j && *reach.get(i, j - p) & DIAGONAL != 0 {
                    iy_m.push(ell);
                }
            }
            for ell in lists.iter(cell.ix_iy) {
                let p = ell as usize;
                if p <= j && *reach.get(i, j - p) & VERTICAL != 0 {
                    iy_ix.push(ell);
                }
            }
            let iy_ok = is_start || !iy_m.is_empty() || !iy_ix.is_empty();

            let mut mask = 0u8;
            if m_ok {
                mask |= DIAGONAL;
            }
            if ix_ok {
                mask |= VERTICAL;
            }
            if iy_ok {
                mask |= HORIZONTAL;
            }
            reach.set(i, j, mask);

            let mut new_trace = overall & mask;
            if is_start {
                new_trace |= STARTPOINT;
            }
            if cell.main.has(ENDPOINT) && mask != 0 {
                new_trace |= ENDPOINT;
            }

            let updated = cells.get_mut(i, j);
            updated.main.set_trace(new_trace);
            updated.m_ix = if ix_ok { out.push(&ix_m) } else { NO_LIST };
            updated.iy_ix = if ix_ok { out.push(&ix_iy) } else { NO_LIST };
            updated.m_iy = if iy_ok { out.push(&iy_m) } else { NO_LIST };
            updated.ix_iy = if iy_ok { out.push(&iy_iy) } else { NO_LIST };
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{DIAGONAL, HORIZONTAL, STARTPOINT, SRC_M};

    #[test]
    fn test_prune_nwsw_drops_dangling_chain() {
        // A 1x3 strip where cell (0,2) claims a horizontal predecessor
        // at (0,1), but (0,1) has no trace at all (not a STARTPOINT,
        // no incoming bit): the chain never bottoms out, so (0,2)'s
        // bit must be dropped.
        let mut cells = Grid::<TraceCell>::try_new(1, 3).unwrap();
        cells.get_mut(0, 2).set_trace(HORIZONTAL);
        prune_nwsw(&mut cells).unwrap();
        assert_eq!(cells.get(0, 2).trace(), 0);
    }

    #[test]
    fn test_prune_nwsw_keeps_chain_rooted_at_startpoint() {
        let mut cells = Grid::<TraceCell>::try_new(1, 3).unwrap();
        cells.get_mut(0, 0).set_trace(STARTPOINT);
        cells.get_mut(0, 1).set_trace(HORIZONTAL);
        cells.get_mut(0, 2).set_trace(HORIZONTAL);
        prune_nwsw(&mut cells).unwrap();
        assert_eq!(cells.get(0, 1).trace(), HORIZONTAL);
        assert_eq!(cells.get(0, 2).trace(), HORIZONTAL);
    }

    #[test]
    fn test_prune_gotoh_clears_dangling_ix_source() {
        let mut cells = Grid::<GotohCell>::try_new(2, 1).unwrap();
        cells.get_mut(1, 0).main.set_trace(DIAGONAL | VERTICAL);
        cells.get_mut(1, 0).gaps.set_ix_src(SRC_M);
        // (0,0) has no STARTPOINT and no trace: unreachable.
        prune_gotoh(&mut cells).unwrap();
        assert_eq!(cells.get(1, 0).main.trace(), 0);
        assert_eq!(cells.get(1, 0).gaps.ix_src(), 0);
    }
}
