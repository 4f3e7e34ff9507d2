// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typo-tolerant title search.
//!
//! Every show title is scored against the query with a distance in `[0, 1]`,
//! where `0` is a perfect hit and `1` shares nothing. A title containing the
//! query verbatim (ignoring case) scores `0`. Otherwise the query is slid
//! across the title and compared by normalized Levenshtein similarity against
//! windows one character shorter, equal, and one longer than itself, keeping
//! the best window. A show matches when its distance is at most the threshold.

use std::cmp::Ordering;
use std::sync::Arc;

use strsim::normalized_levenshtein;

use crate::catalog::{CatalogSnapshot, Show};

/// Moderate fuzziness: tolerates a couple of typos in a short word
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Title index over one catalog snapshot
#[derive(Debug, Clone)]
pub struct SearchIndex {
    snapshot: Arc<CatalogSnapshot>,
    titles: Vec<Vec<char>>,
}

struct Hit {
    position: usize,
    distance: f64,
}

impl SearchIndex {
    /// Build an index for a snapshot
    pub fn build(snapshot: Arc<CatalogSnapshot>) -> Self {
        let titles = snapshot
            .shows()
            .iter()
            .map(|show| fold(&show.title))
            .collect();

        Self { snapshot, titles }
    }

    /// Whether this index is still valid for the given snapshot
    pub fn is_for(&self, snapshot: &CatalogSnapshot) -> bool {
        self.snapshot.id() == snapshot.id()
    }

    pub fn snapshot(&self) -> &Arc<CatalogSnapshot> {
        &self.snapshot
    }

    /// Rank shows whose title matches `text` within `threshold`
    ///
    /// An empty (or whitespace-only) query returns every show in snapshot
    /// order. Results are ordered by distance, then by snapshot position.
    pub fn query(&self, text: &str, threshold: f64) -> Vec<&Show> {
        let shows = self.snapshot.shows();
        let needle = fold(text.trim());
        if needle.is_empty() {
            return shows.iter().collect();
        }

        let mut hits: Vec<Hit> = self
            .titles
            .iter()
            .enumerate()
            .filter_map(|(position, title)| {
                let distance = title_distance(title, &needle);
                (distance <= threshold).then_some(Hit { position, distance })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.position.cmp(&b.position))
        });

        hits.into_iter().map(|hit| &shows[hit.position]).collect()
    }
}

fn fold(text: &str) -> Vec<char> {
    text.chars().flat_map(char::to_lowercase).collect()
}

fn title_distance(title: &[char], needle: &[char]) -> f64 {
    if contains(title, needle) {
        return 0.0;
    }

    if title.len() <= needle.len() {
        return 1.0 - similarity(title, needle);
    }

    let needle_str: String = needle.iter().collect();
    let mut best: f64 = 0.0;

    for width in [needle.len().saturating_sub(1), needle.len(), needle.len() + 1] {
        if width == 0 || width > title.len() {
            continue;
        }
        for window in title.windows(width) {
            let window: String = window.iter().collect();
            best = best.max(normalized_levenshtein(&window, &needle_str));
        }
    }

    1.0 - best
}

fn contains(haystack: &[char], needle: &[char]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn similarity(a: &[char], b: &[char]) -> f64 {
    let a: String = a.iter().collect();
    let b: String = b.iter().collect();
    normalized_levenshtein(&a, &b)
}
