// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

/// Events emitted while the catalog and show details are being fetched
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The catalog request has been issued
    FetchingCatalog { url: String },

    /// The catalog was fetched and normalized
    CatalogReady { show_count: usize },

    /// The catalog could not be ingested; the view is blocked
    CatalogFailed { error: String },

    /// A show detail request has been issued
    FetchingShow { show_id: String },

    /// A show detail was fetched and normalized
    ShowLoaded {
        show_id: String,
        title: String,
        season_count: usize,
    },
}

/// Trait for reporting progress events.
///
/// Implementations can use this to display a loading indicator, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
