mod entry;
mod storage;
mod store;

pub use entry::{EpisodeRef, FavoriteEntry};
pub use storage::{FavoritesStorage, FileStorage, MemoryStorage};
pub use store::{FAVORITES_KEY, FavoritesStore};
