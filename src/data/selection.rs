//! Selection helpers shared by the views.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Default number of series picked by the "random" button.
pub const DEFAULT_SUGGEST_COUNT: usize = 3;

/// The current selection leaves nothing to draw. Recoverable: the user should
/// broaden the selection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmptySelectionError {
    #[error("Pick at least one event type or category.")]
    NoSeriesChosen,
    #[error("Selected categories contain no matching events in the dataset.")]
    NoMatchingEventTypes,
    #[error("No events match the current selection.")]
    NoMatchingEvents,
    #[error("No data after filters. Try widening filters (event types / severity).")]
    NoRowsAfterFilters,
}

/// Pick `n` candidates uniformly without replacement, or all of them when
/// there are not more than `n`.
pub fn suggest_series<T: Clone, R: Rng + ?Sized>(candidates: &[T], n: usize, rng: &mut R) -> Vec<T> {
    if candidates.len() <= n {
        return candidates.to_vec();
    }
    candidates.choose_multiple(rng, n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    #[test]
    fn returns_everything_when_few_candidates() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = suggest_series(&["flood", "drought"], 3, &mut rng);
        assert_eq!(picked, vec!["flood", "drought"]);
    }

    #[test]
    fn draws_distinct_candidates() {
        let candidates: Vec<u32> = (0..20).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let picked = suggest_series(&candidates, 3, &mut rng);

        assert_eq!(picked.len(), 3);
        let unique: BTreeSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(picked.iter().all(|p| candidates.contains(p)));
    }

    #[test]
    fn same_seed_same_pick() {
        let candidates: Vec<u32> = (0..20).collect();
        let a = suggest_series(&candidates, 4, &mut StdRng::seed_from_u64(1));
        let b = suggest_series(&candidates, 4, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
