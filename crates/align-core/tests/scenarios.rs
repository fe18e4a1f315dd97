use align_core::{Aligner, GapCosts, GapParams, Mode, PathCount, ScoringScheme, Substitution};
use std::rc::Rc;

// Scenario A: global NW/SW, match=1/mismatch=0/gap=-1.
#[test]
fn test_scenario_a_global_score() {
    let aligner = Aligner::new(
        ScoringScheme::new(Substitution::simple(1.0, 0.0), GapCosts::uniform(-1.0, -1.0)),
        Mode::Global,
    );
    let (score, mut gen) = aligner.align(b"GAATTC", b"GATTA").unwrap();
    assert_eq!(score, 2.0);
    assert!(!matches!(gen.len(), PathCount::Overflow));
    assert!(gen.next().is_some());
}

// Scenario B: local NW/SW, match=1/mismatch=-1/gap=-1.
#[test]
fn test_scenario_b_local_score() {
    let aligner = Aligner::new(
        ScoringScheme::new(Substitution::simple(1.0, -1.0), GapCosts::uniform(-1.0, -1.0)),
        Mode::Local,
    );
    let (score, mut gen) = aligner.align(b"ACACACTA", b"AGCACACA").unwrap();
    assert_eq!(score, 6.0);
    assert!(gen.next().is_some());
}

// Scenario C: Gotoh with gap_open=-2/gap_extend=-1 scores at least as well
// as NW/SW with a linear gap (open == extend == -2) on the same input.
#[test]
fn test_scenario_c_gotoh_beats_linear_equivalent() {
    let linear = Aligner::new(
        ScoringScheme::new(Substitution::simple(1.0, 0.0), GapCosts::uniform(-2.0, -2.0)),
        Mode::Global,
    );
    let affine = Aligner::new(
        ScoringScheme::new(Substitution::simple(1.0, 0.0), GapCosts::uniform(-2.0, -1.0)),
        Mode::Global,
    );
    let nw = linear.score(b"AAAA", b"AA").unwrap();
    let go = affine.score(b"AAAA", b"AA").unwrap();
    assert!(go >= nw);
}

// Scenario D: WSB with gap(i, l) = -l for both sides equals NW/SW with a
// uniform -1 gap.
#[test]
fn test_scenario_d_wsb_matches_linear_equivalent() {
    use align_core::AffineGapFn;

    let nwsw = Aligner::new(
        ScoringScheme::new(Substitution::simple(1.0, -1.0), GapCosts::uniform(-1.0, -1.0)),
        Mode::Global,
    );
    let wsb_scheme = ScoringScheme::new(
        Substitution::simple(1.0, -1.0),
        GapCosts::uniform(-1.0, -1.0),
    )
    .with_gap_fns(
        Rc::new(AffineGapFn { open: -1.0, extend: -1.0 }),
        Rc::new(AffineGapFn { open: -1.0, extend: -1.0 }),
    );
    let wsb = Aligner::new(wsb_scheme, Mode::Global);

    let a = nwsw.score(b"AAA", b"AAAA").unwrap();
    let b = wsb.score(b"AAA", b"AAAA").unwrap();
    assert_eq!(a, b);
}

// Scenario E: identical length-N strings, heavy gap penalty, global mode:
// score equals N and there is exactly one co-optimal path.
#[test]
fn test_scenario_e_identical_sequences_single_path() {
    let aligner = Aligner::new(
        ScoringScheme::new(Substitution::simple(1.0, -1.0), GapCosts::uniform(-10.0, -10.0)),
        Mode::Global,
    );
    let s: Vec<u8> = std::iter::repeat(b'A').take(12).collect();
    let (score, mut gen) = aligner.align(&s, &s).unwrap();
    assert_eq!(score, 12.0);
    assert_eq!(gen.len(), PathCount::Count(1));
}

// Scenario F: a large epsilon widens the set of tied predecessors; every
// predecessor within epsilon of the optimum must appear on some path.
#[test]
fn test_scenario_f_wide_epsilon_ties() {
    let scheme = ScoringScheme::new(Substitution::simple(1.0, -1.0), GapCosts::uniform(-1.0, -1.0))
        .with_epsilon(10.0);
    let aligner = Aligner::new(scheme, Mode::Global);
    let (_, mut gen) = aligner.align(b"GATTACA", b"GACTACA").unwrap();
    let first = gen.next().unwrap();
    assert!(first.corners().len() >= 2);
    // A wide epsilon should never shrink the co-optimal path count below 1.
    assert_ne!(gen.len(), PathCount::Count(0));
}

// Scenario G: a single-residue target-side gap is priced by the row
// boundary its horizontal move is confined to -- left (row 0), right
// (row n_a), or internal -- not by one flat gap cost for the whole
// sequence.
#[test]
fn test_scenario_g_boundary_gap_pricing_differs_by_region() {
    // a has one residue, so its two rows (0 and 1) are both boundary
    // rows: there is no internal row to fall back on, which forces
    // whichever boundary is cheaper to be the one actually used.
    let left_cheap = ScoringScheme::new(
        Substitution::simple(1.0, 0.0),
        GapCosts {
            target_internal: GapParams::new(-9.0, -9.0),
            target_left: GapParams::new(-0.5, -0.5),
            target_right: GapParams::new(-9.0, -9.0),
            query_internal: GapParams::new(-9.0, -9.0),
            query_left: GapParams::new(-9.0, -9.0),
            query_right: GapParams::new(-9.0, -9.0),
        },
    );
    let right_cheap = ScoringScheme::new(
        Substitution::simple(1.0, 0.0),
        GapCosts {
            target_internal: GapParams::new(-9.0, -9.0),
            target_left: GapParams::new(-9.0, -9.0),
            target_right: GapParams::new(-2.0, -2.0),
            query_internal: GapParams::new(-9.0, -9.0),
            query_left: GapParams::new(-9.0, -9.0),
            query_right: GapParams::new(-9.0, -9.0),
        },
    );

    let left_score = Aligner::new(left_cheap, Mode::Global).score(b"A", b"AA").unwrap();
    let right_score = Aligner::new(right_cheap, Mode::Global).score(b"A", b"AA").unwrap();

    // One match (1.0) plus whichever boundary's open cost is cheaper.
    assert_eq!(left_score, 1.0 - 0.5);
    assert_eq!(right_score, 1.0 - 2.0);
    assert_ne!(left_score, right_score);

    // A longer target gives a genuine interior row; pricing it far
    // cheaper than either boundary must pull the optimal gap there too.
    let interior_cheap = ScoringScheme::new(
        Substitution::simple(1.0, 0.0),
        GapCosts {
            target_internal: GapParams::new(-1.0, -1.0),
            target_left: GapParams::new(-9.0, -9.0),
            target_right: GapParams::new(-9.0, -9.0),
            query_internal: GapParams::new(-9.0, -9.0),
            query_left: GapParams::new(-9.0, -9.0),
            query_right: GapParams::new(-9.0, -9.0),
        },
    );
    let score = Aligner::new(interior_cheap, Mode::Global).score(b"AA", b"AAA").unwrap();
    assert_eq!(score, 2.0 - 1.0);
}

#[test]
fn test_path_count_matches_exhaustive_enumeration() {
    let aligner = Aligner::new(
        ScoringScheme::new(Substitution::simple(1.0, -1.0), GapCosts::uniform(-1.0, -1.0)),
        Mode::Local,
    );
    let (_, mut gen) = aligner.align(b"ACACACTA", b"AGCACACA").unwrap();
    let expected = gen.len();
    let mut seen = std::collections::HashSet::new();
    let mut n = 0u64;
    while let Some(p) = gen.next() {
        seen.insert(p.corners().to_vec());
        n += 1;
        if n > 20_000 {
            break;
        }
    }
    assert_eq!(seen.len() as u64, n);
    assert_eq!(PathCount::Count(n), expected);
}

#[test]
fn test_reset_reproduces_first_path_end_to_end() {
    let aligner = Aligner::new(
        ScoringScheme::new(Substitution::simple(1.0, 0.0), GapCosts::uniform(-1.0, -1.0)),
        Mode::Global,
    );
    let (_, mut gen) = aligner.align(b"GAATTC", b"GATTA").unwrap();
    let first = gen.next().unwrap();
    while gen.next().is_some() {}
    gen.reset();
    assert_eq!(gen.next().unwrap(), first);
}

#[test]
fn test_score_matches_rescored_path_global_and_local() {
    for mode in [Mode::Global, Mode::Local] {
        let aligner = Aligner::new(
            ScoringScheme::new(Substitution::simple(2.0, -1.0), GapCosts::uniform(-2.0, -1.0)),
            mode,
        );
        let (score, mut gen) = aligner.align(b"ACACACTA", b"AGCACACA").unwrap();
        assert!(gen.next().is_some());
        assert_eq!(score, aligner.score(b"ACACACTA", b"AGCACACA").unwrap());
    }
}
