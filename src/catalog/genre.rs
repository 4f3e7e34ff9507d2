// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::LazyLock;

/// Title given to genre ids that have no entry in the directory
pub const UNKNOWN_GENRE: &str = "Unknown Genre";

/// A show genre as published by the catalog API
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Genre {
    pub id: i64,
    pub title: String,
}

impl Genre {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    /// Placeholder for an id the directory does not know about
    pub fn unknown(id: i64) -> Self {
        Self::new(id, UNKNOWN_GENRE)
    }

    pub fn is_unknown(&self) -> bool {
        self.title == UNKNOWN_GENRE
    }
}

const STANDARD_GENRES: &[(i64, &str)] = &[
    (1, "Personal Growth"),
    (2, "Investigative Journalism"),
    (3, "History"),
    (4, "Comedy"),
    (5, "Entertainment"),
    (6, "Business"),
    (7, "Fiction"),
    (8, "News"),
    (9, "Kids and Family"),
];

static STANDARD: LazyLock<GenreDirectory> = LazyLock::new(|| {
    GenreDirectory::new(
        STANDARD_GENRES
            .iter()
            .map(|(id, title)| Genre::new(*id, *title)),
    )
});

/// Lookup table from genre id to display name
#[derive(Debug, Clone, Default)]
pub struct GenreDirectory {
    genres: Vec<Genre>,
}

impl GenreDirectory {
    /// Build a directory from an explicit genre list; later duplicates of an id are ignored
    pub fn new(genres: impl IntoIterator<Item = Genre>) -> Self {
        let mut directory = Self { genres: Vec::new() };
        for genre in genres {
            if directory.lookup(genre.id).is_none() {
                directory.genres.push(genre);
            }
        }
        directory
    }

    /// The directory matching the public catalog API, loaded once per process
    pub fn standard() -> &'static GenreDirectory {
        &STANDARD
    }

    pub fn lookup(&self, id: i64) -> Option<&Genre> {
        self.genres.iter().find(|genre| genre.id == id)
    }

    /// Resolve an id, falling back to the "Unknown Genre" placeholder
    pub fn resolve(&self, id: i64) -> Genre {
        self.lookup(id)
            .cloned()
            .unwrap_or_else(|| Genre::unknown(id))
    }

    pub fn by_title(&self, title: &str) -> Option<&Genre> {
        self.genres.iter().find(|genre| genre.title == title)
    }

    /// All genres in directory order
    pub fn all(&self) -> &[Genre] {
        &self.genres
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_directory_has_nine_genres() {
        let directory = GenreDirectory::standard();
        assert_eq!(directory.all().len(), 9);
        assert_eq!(directory.lookup(4).unwrap().title, "Comedy");
        assert_eq!(directory.by_title("News").unwrap().id, 8);
    }

    #[test]
    fn resolve_unknown_id_yields_placeholder() {
        let genre = GenreDirectory::standard().resolve(42);
        assert_eq!(genre, Genre::new(42, "Unknown Genre"));
        assert!(genre.is_unknown());
    }

    #[test]
    fn duplicate_ids_keep_first_entry() {
        let directory = GenreDirectory::new([Genre::new(1, "First"), Genre::new(1, "Second")]);
        assert_eq!(directory.all().len(), 1);
        assert_eq!(directory.resolve(1).title, "First");
    }
}
