// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Picks a bounded random subset of shows for promotional display.
///
/// The sampler is seeded once per session, so the same input yields the same
/// picks for the lifetime of the sampler. Not suitable for anything security
/// related.
#[derive(Debug, Clone, Copy)]
pub struct RandomSampler {
    seed: u64,
}

impl RandomSampler {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Sampler with a fresh random seed
    pub fn from_entropy() -> Self {
        Self::with_seed(rand::random())
    }

    /// Copy `min(count, items.len())` distinct elements out of `items`
    pub fn sample<T: Clone>(&self, items: &[T], count: usize) -> Vec<T> {
        let amount = count.min(items.len());
        let mut rng = StdRng::seed_from_u64(self.seed);

        rand::seq::index::sample(&mut rng, items.len(), amount)
            .into_iter()
            .map(|index| items[index].clone())
            .collect()
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn returns_bounded_distinct_elements() {
        let items: Vec<u32> = (0..12).collect();
        let sampler = RandomSampler::with_seed(7);

        for count in 0..=items.len() + 5 {
            let picked = sampler.sample(&items, count);
            assert_eq!(picked.len(), count.min(items.len()));

            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), picked.len());
            assert!(picked.iter().all(|item| items.contains(item)));
        }
    }

    #[test]
    fn empty_input_yields_empty_sample() {
        let items: Vec<String> = Vec::new();
        assert!(RandomSampler::with_seed(1).sample(&items, 5).is_empty());
    }

    #[test]
    fn same_seed_is_stable_within_a_session() {
        let items: Vec<u32> = (0..50).collect();
        let sampler = RandomSampler::with_seed(42);
        assert_eq!(sampler.sample(&items, 5), sampler.sample(&items, 5));
    }

    #[test]
    fn source_is_left_untouched() {
        let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let before = items.clone();
        let _ = RandomSampler::with_seed(3).sample(&items, 3);
        assert_eq!(items, before);
    }
}
