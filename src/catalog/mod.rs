mod fetch;
mod genre;
mod normalize;

pub use fetch::{fetch_catalog, fetch_catalog_bytes, parse_catalog};
pub use genre::{Genre, GenreDirectory, UNKNOWN_GENRE};
pub use normalize::{
    CatalogNormalizer, CatalogSnapshot, DEFAULT_DESCRIPTION, DEFAULT_TITLE, Show, SnapshotId,
    UNKNOWN_DATE, UNREADABLE_GENRE_ID, normalize,
};

pub(crate) use normalize::{count_field, id_field, parse_updated, text_field};
