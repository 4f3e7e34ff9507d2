// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use url::Url;

use crate::search::DEFAULT_THRESHOLD;

/// Base URL of the public podcast catalog API
pub const DEFAULT_API_BASE: &str = "https://podcast-api.netlify.app";

/// Options for fetching and presenting the catalog
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Root of the catalog API; `/shows` and `/id/{id}` are resolved against it
    pub api_base: Url,
    /// Fuzzy search looseness in `[0, 1]`, lower is stricter
    pub search_threshold: f64,
    /// Seed for the promotional sampler, fixed for the whole session
    pub sample_seed: u64,
}

impl CatalogConfig {
    /// Create a config for the given API root with default search settings
    pub fn new(api_base: Url) -> Self {
        Self {
            api_base,
            ..Default::default()
        }
    }

    /// Set the search threshold, clamped to `[0, 1]`
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.search_threshold = if threshold.is_nan() {
            DEFAULT_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.sample_seed = seed;
        self
    }

    /// URL of the full show listing
    pub fn catalog_url(&self) -> Result<Url, url::ParseError> {
        join_segments(&self.api_base, &["shows"])
    }

    /// URL of a single show's detail record
    pub fn show_url(&self, show_id: &str) -> Result<Url, url::ParseError> {
        join_segments(&self.api_base, &["id", show_id])
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("valid default API URL"),
            search_threshold: DEFAULT_THRESHOLD,
            sample_seed: rand::random(),
        }
    }
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, url::ParseError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
