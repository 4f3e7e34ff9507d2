// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::catalog::{GenreDirectory, Show};

/// How a list of shows is narrowed or reordered after search
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Title ascending ("A-Z")
    TitleAscending,
    /// Title descending ("Z-A")
    TitleDescending,
    Newest,
    Oldest,
    /// The "Genres" sentinel: leave the list untouched
    #[default]
    All,
    /// Keep only shows tagged with this genre title
    Genre(String),
}

impl FilterMode {
    /// Parse a mode label; unrecognized labels are treated as genre titles
    pub fn parse(label: &str) -> Self {
        match label {
            "A-Z" => Self::TitleAscending,
            "Z-A" => Self::TitleDescending,
            "Newest" => Self::Newest,
            "Oldest" => Self::Oldest,
            "Genres" => Self::All,
            other => Self::Genre(other.to_string()),
        }
    }

    /// Fixed modes followed by one genre mode per directory entry
    pub fn all_for(directory: &GenreDirectory) -> Vec<FilterMode> {
        let mut modes = vec![
            Self::All,
            Self::TitleAscending,
            Self::TitleDescending,
            Self::Newest,
            Self::Oldest,
        ];
        modes.extend(
            directory
                .all()
                .iter()
                .map(|genre| Self::Genre(genre.title.clone())),
        );
        modes
    }
}

impl FromStr for FilterMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TitleAscending => f.write_str("A-Z"),
            Self::TitleDescending => f.write_str("Z-A"),
            Self::Newest => f.write_str("Newest"),
            Self::Oldest => f.write_str("Oldest"),
            Self::All => f.write_str("Genres"),
            Self::Genre(title) => f.write_str(title),
        }
    }
}

/// Narrow or reorder `shows` according to `mode`
///
/// Works on owned shows or references alike and never touches the input.
/// All sorts are stable, so equal keys keep their incoming relative order.
pub fn apply<T>(shows: &[T], mode: &FilterMode) -> Vec<T>
where
    T: Borrow<Show> + Clone,
{
    let mut result = shows.to_vec();

    match mode {
        FilterMode::TitleAscending => {
            result.sort_by(|a, b| collate(&a.borrow().title, &b.borrow().title));
        }
        FilterMode::TitleDescending => {
            result.sort_by(|a, b| collate(&b.borrow().title, &a.borrow().title));
        }
        FilterMode::Newest => {
            result.sort_by(|a, b| b.borrow().updated_at.cmp(&a.borrow().updated_at));
        }
        FilterMode::Oldest => {
            result.sort_by(|a, b| a.borrow().updated_at.cmp(&b.borrow().updated_at));
        }
        FilterMode::All => {}
        FilterMode::Genre(title) => {
            result.retain(|show| show.borrow().has_genre(title));
        }
    }

    result
}

/// Title ordering that ignores case and accents.
///
/// `"Émile"` sorts next to `"Emile"`. Titles that fold to the same text put
/// the unaccented form first, then lowercase before uppercase.
pub fn collate(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| lowercase(a).cmp(lowercase(b)))
        .then_with(|| b.cmp(a))
}

/// Decompose, drop combining marks and lowercase
fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn lowercase(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}
