// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use crate::catalog::{CatalogSnapshot, Show, fetch_catalog};
use crate::config::CatalogConfig;
use crate::detail::{ShowDetail, fetch_show_detail};
use crate::error::{DetailError, IngestionError};
use crate::favorites::{FavoritesStorage, FavoritesStore};
use crate::filter::{self, FilterMode};
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::sample::RandomSampler;
use crate::search::SearchIndex;

/// Where the catalog is in its fetch lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug)]
enum LoadState {
    Idle,
    Loading,
    Ready(SearchIndex),
    Failed(IngestionError),
}

/// What presentation renders for the catalog list
#[derive(Debug)]
pub struct ViewState<'a> {
    pub status: CatalogStatus,
    pub shows: Vec<&'a Show>,
    pub error: Option<String>,
}

/// Owns the catalog fetch and turns search text and filter mode into a list.
///
/// The catalog is loaded exactly once; there is no refresh. A failed load is
/// final for the lifetime of the controller.
pub struct CatalogController {
    config: CatalogConfig,
    state: LoadState,
    query: String,
    mode: FilterMode,
    sampler: RandomSampler,
    reporter: SharedProgressReporter,
}

/// Puts the state back to `Idle` if a load is dropped before it settles
struct LoadingGuard<'a> {
    state: &'a mut LoadState,
    settled: bool,
}

impl<'a> LoadingGuard<'a> {
    fn enter(state: &'a mut LoadState) -> Self {
        *state = LoadState::Loading;
        Self {
            state,
            settled: false,
        }
    }

    fn settle(mut self, next: LoadState) {
        *self.state = next;
        self.settled = true;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("catalog load aborted");
            *self.state = LoadState::Idle;
        }
    }
}

impl CatalogController {
    pub fn new(config: CatalogConfig, reporter: SharedProgressReporter) -> Self {
        let sampler = RandomSampler::with_seed(config.sample_seed);
        Self {
            config,
            state: LoadState::Idle,
            query: String::new(),
            mode: FilterMode::default(),
            sampler,
            reporter,
        }
    }

    pub fn status(&self) -> CatalogStatus {
        match self.state {
            LoadState::Idle => CatalogStatus::Idle,
            LoadState::Loading => CatalogStatus::Loading,
            LoadState::Ready(_) => CatalogStatus::Ready,
            LoadState::Failed(_) => CatalogStatus::Failed,
        }
    }

    /// Fetch the catalog once and settle into `Ready` or `Failed`
    ///
    /// Only acts from `Idle`. Dropping the returned future before it
    /// completes leaves the controller `Idle`.
    pub async fn load<C: HttpClient + ?Sized>(&mut self, client: &C) -> CatalogStatus {
        if !matches!(self.state, LoadState::Idle) {
            tracing::warn!(status = ?self.status(), "catalog already loaded, ignoring");
            return self.status();
        }

        let Self {
            state,
            config,
            reporter,
            ..
        } = &mut *self;
        let guard = LoadingGuard::enter(state);

        let url = config
            .catalog_url()
            .map(|url| url.to_string())
            .unwrap_or_else(|_| config.api_base.to_string());
        reporter.report(ProgressEvent::FetchingCatalog { url });

        let next = match fetch_catalog(client, config).await {
            Ok(snapshot) => {
                tracing::info!(shows = snapshot.len(), "catalog ready");
                reporter.report(ProgressEvent::CatalogReady {
                    show_count: snapshot.len(),
                });
                LoadState::Ready(SearchIndex::build(Arc::new(snapshot)))
            }
            Err(e) => {
                tracing::error!(error = %e, "catalog ingestion failed");
                reporter.report(ProgressEvent::CatalogFailed {
                    error: e.to_string(),
                });
                LoadState::Failed(e)
            }
        };

        guard.settle(next);
        self.status()
    }

    /// The ingestion failure, once the controller is `Failed`
    pub fn error(&self) -> Option<&IngestionError> {
        match &self.state {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<&Arc<CatalogSnapshot>> {
        self.index().map(SearchIndex::snapshot)
    }

    fn index(&self) -> Option<&SearchIndex> {
        match &self.state {
            LoadState::Ready(index) => Some(index),
            _ => None,
        }
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> &FilterMode {
        &self.mode
    }

    /// Search, then filter or sort the results; empty unless `Ready`
    pub fn compute_view(&self, query: &str, mode: &FilterMode) -> Vec<&Show> {
        let Some(index) = self.index() else {
            return Vec::new();
        };

        let ranked = index.query(query, self.config.search_threshold);
        filter::apply(&ranked, mode)
    }

    /// The list for the current query and mode
    pub fn view_state(&self) -> ViewState<'_> {
        ViewState {
            status: self.status(),
            shows: self.compute_view(&self.query, &self.mode),
            error: self.error().map(|e| e.to_string()),
        }
    }

    /// Random picks from the whole catalog, independent of query and mode
    pub fn promotional_sample(&self, count: usize) -> Vec<Show> {
        match self.snapshot() {
            Some(snapshot) => self.sampler.sample(snapshot.shows(), count),
            None => Vec::new(),
        }
    }

    /// Favorited shows present in the catalog, ordered or filtered by `mode`
    ///
    /// Favorites whose show is missing from the catalog are left out.
    pub fn favorite_shows<S: FavoritesStorage>(
        &self,
        favorites: &FavoritesStore<S>,
        mode: &FilterMode,
    ) -> Vec<&Show> {
        let Some(snapshot) = self.snapshot() else {
            return Vec::new();
        };

        let shows: Vec<&Show> = favorites
            .show_ids()
            .into_iter()
            .filter_map(|id| snapshot.get(id))
            .collect();
        filter::apply(&shows, mode)
    }

    /// Fetch the detail record of one show
    pub async fn show_detail<C: HttpClient + ?Sized>(
        &self,
        client: &C,
        show_id: &str,
    ) -> Result<ShowDetail, DetailError> {
        self.reporter.report(ProgressEvent::FetchingShow {
            show_id: show_id.to_string(),
        });

        let detail = fetch_show_detail(client, &self.config, show_id).await?;

        self.reporter.report(ProgressEvent::ShowLoaded {
            show_id: show_id.to_string(),
            title: detail.title.clone(),
            season_count: detail.seasons.len(),
        });
        Ok(detail)
    }
}
