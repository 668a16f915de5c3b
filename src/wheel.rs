use itertools::Itertools;
use num_traits::Zero;

/// A weighted-index selection structure, or biased wheel.
///
/// Built from a vector of nonnegative weights, the wheel stores the running
/// sums of the strictly positive entries together with a map back to the
/// original indices, so that zero-weight entries can never be selected.
/// A value in `[0, total)` is translated to an original index by binary
/// search over the cumulated weights. The wheel is immutable; when weights
/// change it is rebuilt, not patched.
#[derive(Clone, Debug)]
pub struct BiasedWheel<T> {
    /// The running sums of the positive weights, strictly increasing.
    cumulated: Vec<T>,
    /// The original index of every kept weight.
    original_indices: Vec<usize>,
}

impl<T: Copy + PartialOrd + Zero> BiasedWheel<T> {
    pub fn new(weights: &[T]) -> BiasedWheel<T> {
        let mut cumulated = Vec::with_capacity(weights.len());
        let mut original_indices = Vec::with_capacity(weights.len());
        let mut total = T::zero();
        for (idx, &weight) in weights.iter().enumerate() {
            assert!(
                weight >= T::zero(),
                "A weight cannot be negative (index {idx})"
            );
            if weight > T::zero() {
                total = total + weight;
                cumulated.push(total);
                original_indices.push(idx);
            }
        }
        BiasedWheel {
            cumulated,
            original_indices,
        }
    }

    /// The total weight of the wheel, equal to the sum of all input weights.
    pub fn total(&self) -> T {
        self.cumulated.last().copied().unwrap_or_else(T::zero)
    }

    /// The running sums over the kept (positive) weights.
    pub fn cumulated_weights(&self) -> &[T] {
        &self.cumulated
    }

    /// Translates a value in `[0, total)` to the original index whose
    /// cumulated range contains it. A value exactly on the lower boundary of
    /// a range belongs to that range, not the previous one.
    pub fn find_index(&self, value: T) -> usize {
        assert!(
            !self.cumulated.is_empty(),
            "Attempted to select an index from a wheel with no positive weight"
        );
        assert!(
            value >= T::zero() && value < self.total(),
            "The selection value is outside the wheel range"
        );
        let pos = self.cumulated.partition_point(|&cum| cum <= value);
        self.original_indices[pos]
    }

    /// Translates a batch of values to original indices, one per value,
    /// in the order the values were given.
    ///
    /// The queries are answered in sorted order with a single sweep over the
    /// cumulated weights, but the results are reported positionally.
    pub fn find_multiple_indices(&self, values: &[T]) -> Vec<usize> {
        if values.is_empty() {
            return Vec::new();
        }
        assert!(
            !self.cumulated.is_empty(),
            "Attempted to select indices from a wheel with no positive weight"
        );
        let order = (0..values.len())
            .sorted_unstable_by(|&a, &b| {
                values[a]
                    .partial_cmp(&values[b])
                    .expect("The selection values cannot be ordered")
            })
            .collect_vec();

        let mut res = vec![0; values.len()];
        let mut pos = 0;
        for &query in &order {
            let value = values[query];
            assert!(
                value >= T::zero() && value < self.total(),
                "A selection value is outside the wheel range"
            );
            while self.cumulated[pos] <= value {
                pos += 1;
            }
            res[query] = self.original_indices[pos];
        }
        res
    }
}
