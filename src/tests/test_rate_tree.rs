use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{rate_tree::RateTree, utils::DEFAULT_SEED};

/// Builds a tree over the given rates, fully recomputed.
fn tree_over(rates: &[f64]) -> RateTree {
    let mut tree = RateTree::new(rates.len());
    tree.recompute_all(|leaf| rates[leaf]);
    tree
}

/// The cumulated range owned by each leaf, from the leaf rates.
fn cumulated(rates: &[f64]) -> Vec<f64> {
    rates
        .iter()
        .scan(0., |acc, rate| {
            *acc += rate;
            Some(*acc)
        })
        .collect()
}

#[test]
fn test_total_rate() {
    let rates = [1., 2., 0., 4.5, 0.25];
    let tree = tree_over(&rates);
    assert!((tree.total_rate() - 7.75).abs() < 1e-12);
}

#[test]
fn test_single_leaf() {
    let tree = tree_over(&[3.]);
    assert_eq!(tree.len(), 1);
    assert!((tree.total_rate() - 3.).abs() < 1e-12);
    assert_eq!(tree.find(0.), 0);
    assert_eq!(tree.find(2.999), 0);
}

/// `find` maps every value to the leaf whose cumulated range contains it,
/// and zero-rate leaves own no range.
#[test]
fn test_find_ownership() {
    let rates = [2., 0., 3., 0., 5., 1., 0.5, 8., 0., 2.5];
    let tree = tree_over(&rates);
    let bounds = cumulated(&rates);

    let mut lower = 0.;
    for (leaf, &upper) in bounds.iter().enumerate() {
        if rates[leaf] == 0. {
            continue;
        }
        assert_eq!(tree.find(lower), leaf);
        assert_eq!(tree.find(upper - 1e-9), leaf);
        lower = upper;
    }
}

/// After any sequence of leaf invalidations followed by an update sweep,
/// every aggregate matches a tree rebuilt from scratch exactly: the lazy
/// path recomputation introduces no drift.
#[test]
fn test_lazy_updates_no_drift() {
    let rng = &mut StdRng::seed_from_u64(DEFAULT_SEED);
    let size = 13;
    let mut rates = (0..size).map(|_| rng.random::<f64>()).collect::<Vec<_>>();
    let mut tree = tree_over(&rates);

    for _ in 0..200 {
        for _ in 0..rng.random_range(1..5) {
            let leaf = rng.random_range(0..size);
            rates[leaf] = if rng.random::<f64>() < 0.2 {
                0.
            } else {
                rng.random::<f64>() * 10.
            };
            tree.invalidate(leaf);
        }
        tree.update_rates(|leaf| rates[leaf]);

        let mut rebuilt = RateTree::new(size);
        rebuilt.recompute_all(|leaf| rates[leaf]);
        assert_eq!(tree.total_rate(), rebuilt.total_rate());

        // The selected leaf must agree with the cumulated ranges as well.
        // Querying range midpoints keeps the check clear of the rounding
        // differences between linear and pairwise summation.
        let bounds = cumulated(&rates);
        let mut lower = 0.;
        for (leaf, &upper) in bounds.iter().enumerate() {
            if upper - lower > 1e-6 {
                assert_eq!(tree.find((lower + upper) / 2.), leaf, "rates: {rates:?}");
            }
            lower = upper;
        }
    }
}

/// Invalidating an already-invalidated leaf is a no-op: the update sweep
/// still recomputes every stale node exactly once per report batch.
#[test]
fn test_idempotent_invalidation() {
    let mut rates = [1., 2., 3., 4.];
    let mut tree = tree_over(&rates);

    rates[2] = 7.;
    tree.invalidate(2);
    tree.invalidate(2);
    tree.invalidate(2);
    tree.update_rates(|leaf| rates[leaf]);
    assert!((tree.total_rate() - 14.).abs() < 1e-12);
    assert_eq!(tree.find(6.999), 2);
    assert_eq!(tree.find(10.5), 3);
}

/// An update sweep with no invalidation leaves the tree untouched.
#[test]
fn test_empty_update() {
    let rates = [1., 2., 3.];
    let mut tree = tree_over(&rates);
    tree.update_rates(|_| unreachable!("No leaf was invalidated"));
    assert!((tree.total_rate() - 6.).abs() < 1e-12);
}
