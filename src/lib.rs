pub mod catalog;
pub mod config;
pub mod controller;
pub mod detail;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod http;
pub mod progress;
pub mod sample;
pub mod search;

// Re-export main types for convenience
pub use catalog::{
    CatalogNormalizer, CatalogSnapshot, Genre, GenreDirectory, Show, fetch_catalog, normalize,
};
pub use config::{CatalogConfig, DEFAULT_API_BASE};
pub use controller::{CatalogController, CatalogStatus, ViewState};
pub use detail::{EpisodeSummary, Season, ShowDetail, fetch_show_detail};
pub use error::{DetailError, FavoritesError, IngestionError, NormalizeError};
pub use favorites::{
    EpisodeRef, FavoriteEntry, FavoritesStorage, FavoritesStore, FileStorage, MemoryStorage,
};
pub use filter::FilterMode;
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use sample::RandomSampler;
pub use search::{DEFAULT_THRESHOLD, SearchIndex};
