//! End-to-end reduction properties on small and random lattices

use lattice_reduce_core::lattice::{determinant, gso, is_unimodular};
use lattice_reduce_core::{
    reduce, GramSchmidt, GramSchmidtMode, LLLConfig, LatticeBasis, ReductionOutcome, LLL,
};
use num_bigint::BigInt;
use num_traits::Signed;

/// Reduce a copy with a transform and check `T · input == output`, `det T = ±1`
/// and the reduction conditions on the kept rows
fn reduce_checked(
    input: &LatticeBasis,
    bound: Option<&BigInt>,
    config: &LLLConfig,
) -> (LatticeBasis, LatticeBasis, ReductionOutcome) {
    let mut basis = input.clone();
    let mut transform = LatticeBasis::identity(input.n);

    let outcome = reduce(&mut basis, Some(&mut transform), bound, config).unwrap();

    assert_eq!(transform.mul(input).unwrap(), basis);
    assert!(is_unimodular(&transform));
    assert!(LLL::is_reduced_with_removal(&basis, outcome.zeros, config));
    assert_eq!(outcome.rank + outcome.zeros, input.n);
    assert_eq!(outcome.zero_vectors + outcome.removed_below_bound, outcome.zeros);

    (basis, transform, outcome)
}

fn kept(basis: &LatticeBasis, zeros: usize) -> LatticeBasis {
    LatticeBasis::new(basis.vectors[zeros..].to_vec())
}

#[test]
fn test_two_dimensional_example() {
    let input = LatticeBasis::from_rows(&[vec![201i64, 37], vec![37, 7]]);
    let (basis, transform, outcome) = reduce_checked(&input, None, &LLLConfig::default());

    assert_eq!(outcome.rank, 2);
    assert_eq!(basis.norm_squared(0), BigInt::from(34));
    assert_eq!(basis.norm_squared(1), BigInt::from(50));
    assert_eq!(determinant(&basis).unwrap().abs(), BigInt::from(38));
    assert_eq!(determinant(&transform).unwrap().abs(), BigInt::from(1));
}

#[test]
fn test_orthogonal_basis_unchanged() {
    let input = LatticeBasis::from_rows(&[vec![1i64, 1], vec![1, -1]]);
    let config = LLLConfig {
        delta: 0.75,
        ..Default::default()
    };
    let (basis, transform, outcome) = reduce_checked(&input, None, &config);

    assert_eq!(basis, input);
    assert_eq!(transform, LatticeBasis::identity(2));
    assert_eq!(outcome.stats.swaps, 0);
    assert!(!outcome.any_removed());
}

#[test]
fn test_random_bases_keep_volume() {
    for seed in 0..8u64 {
        let n = 4 + seed as usize;
        let input = LatticeBasis::random_seeded(n, n, 24, seed);
        let (basis, _, outcome) = reduce_checked(&input, None, &LLLConfig::default());

        let before = GramSchmidt::compute(&input);
        let after = GramSchmidt::compute_from(&basis, outcome.zeros);
        assert_eq!(outcome.rank, before.rank(), "seed {}", seed);
        assert_eq!(after.squared_volume(), before.squared_volume(), "seed {}", seed);
    }
}

#[test]
fn test_wide_random_bases() {
    for seed in 0..4u64 {
        let input = LatticeBasis::random_seeded(5, 12, 40, 100 + seed);
        let (basis, _, outcome) = reduce_checked(&input, None, &LLLConfig::strong());
        let before = GramSchmidt::compute(&input);
        let after = GramSchmidt::compute_from(&basis, outcome.zeros);
        assert_eq!(outcome.rank, before.rank());
        assert_eq!(after.squared_volume(), before.squared_volume());
    }
}

#[test]
fn test_reducing_twice_changes_nothing() {
    let input = LatticeBasis::from_rows(&[vec![201i64, 37], vec![37, 7]]);
    let config = LLLConfig::default();
    let (first, _, _) = reduce_checked(&input, None, &config);
    let (second, transform, outcome) = reduce_checked(&first, None, &config);

    assert_eq!(second, first);
    assert_eq!(transform, LatticeBasis::identity(2));
    assert_eq!(outcome.stats.swaps, 0);
}

#[test]
fn test_reduced_input_returned_unchanged() {
    // each basis is (δ, η)-reduced but only just
    let cases = [
        (vec![vec![4i64, 0], vec![2, 3]], LLLConfig::fast()),
        (vec![vec![100i64, 0], vec![51, 100]], LLLConfig::default()),
        (vec![vec![20i64, 0, 0], vec![10, 15, 0], vec![-10, 6, 18]], LLLConfig::fast()),
    ];

    for (rows, config) in cases {
        let input = LatticeBasis::from_rows(&rows);
        assert!(LLL::is_reduced(&input, &config), "{:?}", rows);

        let (basis, transform, outcome) = reduce_checked(&input, None, &config);
        assert_eq!(basis, input, "{:?}", rows);
        assert_eq!(transform, LatticeBasis::identity(input.n));
        assert_eq!(outcome.stats.swaps, 0);
        assert_eq!(outcome.stats.size_reductions, 0);
    }
}

#[test]
fn test_dependent_rows_are_removed() {
    // generates the lattice spanned by (1, 2) and (0, 2)
    let input = LatticeBasis::from_rows(&[vec![1i64, 2], vec![3, 4], vec![5, 6]]);
    let (basis, _, outcome) = reduce_checked(&input, None, &LLLConfig::default());

    assert_eq!(outcome.rank, 2);
    assert_eq!(outcome.zeros, 1);
    assert_eq!(outcome.zero_vectors, 1);
    assert!(basis.is_zero_row(0));
    assert_eq!(determinant(&kept(&basis, 1)).unwrap().abs(), BigInt::from(2));
}

#[test]
fn test_zero_row_with_removal_bound() {
    let input = LatticeBasis::from_rows(&[vec![0i64, 0, 0], vec![4, 1, 0], vec![1, 5, 2], vec![0, 1, 7]]);
    let (basis, _, outcome) = reduce_checked(&input, Some(&BigInt::from(0)), &LLLConfig::default());

    assert_eq!(outcome.zeros, 1);
    assert_eq!(outcome.rank, 3);
    assert_eq!(outcome.removed_below_bound, 0);
    assert!(basis.is_zero_row(0));
}

#[test]
fn test_short_vectors_removed_below_bound() {
    // (1, 0, 0) has squared norm 1, everything else is far longer
    let input = LatticeBasis::from_rows(&[vec![1i64, 0, 0], vec![0, 50, 0], vec![0, 0, 60]]);
    let (basis, _, outcome) = reduce_checked(&input, Some(&BigInt::from(2)), &LLLConfig::default());

    assert_eq!(outcome.zeros, 1);
    assert_eq!(outcome.removed_below_bound, 1);
    assert_eq!(basis.vectors[0], vec![BigInt::from(1), BigInt::from(0), BigInt::from(0)]);

    // the bound is strict
    let (_, _, outcome) = reduce_checked(&input, Some(&BigInt::from(1)), &LLLConfig::default());
    assert_eq!(outcome.zeros, 0);
}

#[test]
fn test_exact_mode_matches_approx_quality() {
    let input = LatticeBasis::random_seeded(10, 10, 30, 7);
    let exact = LLLConfig {
        gram_schmidt: GramSchmidtMode::Exact,
        ..Default::default()
    };
    let (_, _, approx_outcome) = reduce_checked(&input, None, &LLLConfig::default());
    let (_, _, exact_outcome) = reduce_checked(&input, None, &exact);

    assert_eq!(approx_outcome.rank, exact_outcome.rank);
    assert_eq!(exact_outcome.stats.escalations, 0);
    assert_eq!(exact_outcome.stats.exact_products, 0);
}

#[test]
fn test_fast_tier_disabled() {
    let input = LatticeBasis::random_seeded(8, 8, 20, 3);
    let config = LLLConfig {
        fast_failure_limit: 0,
        ..Default::default()
    };
    let (_, _, outcome) = reduce_checked(&input, None, &config);
    assert_eq!(outcome.stats.escalations, 0);
}

#[test]
fn test_knapsack_lattice() {
    let input = LatticeBasis::knapsack(&[366, 385, 392, 401, 422, 437], 1215);
    let (basis, _, outcome) = reduce_checked(&input, None, &LLLConfig::default());

    assert_eq!(outcome.rank, 7);
    assert!(basis.norm_squared(0) <= input.norm_squared(input.n - 1));
}

#[test]
fn test_huge_entries() {
    // entries far beyond f64 range exercise the scaled approximation
    let big = BigInt::from(1) << 1500usize;
    let input = LatticeBasis::new(vec![
        vec![&big * 3 + 1, &big * 5],
        vec![&big * 2, &big * 3 + 7],
    ]);
    let (_, _, outcome) = reduce_checked(&input, None, &LLLConfig::default());
    assert_eq!(outcome.rank, 2);
}

#[test]
fn test_gso_of_reduced_basis() {
    let input = LatticeBasis::random_seeded(6, 6, 16, 11);
    let (basis, _, _) = reduce_checked(&input, None, &LLLConfig::default());

    let q = gso(&basis.to_f64_matrix().unwrap());
    let (rows, cols) = q.dims();
    for x in 0..cols {
        for y in 0..=x {
            let dot: f64 = (0..rows).map(|k| q.get(k, x) * q.get(k, y)).sum();
            let expected = if x == y { 1.0 } else { 0.0 };
            assert!((dot - expected).abs() < 1e-9, "columns {} and {}: {}", x, y, dot);
        }
    }
}
