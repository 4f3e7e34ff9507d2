// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use crate::error::{NormalizeError, json_kind};

use super::genre::{Genre, GenreDirectory};

pub const DEFAULT_TITLE: &str = "No Title";
pub const DEFAULT_DESCRIPTION: &str = "No Description";
pub const UNKNOWN_DATE: &str = "Unknown Date";
/// Id given to genre entries that are not a number at all
pub const UNREADABLE_GENRE_ID: i64 = -1;

const DISPLAY_DATE_FORMAT: &str = "%B %-d, %Y";

/// A normalized catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct Show {
    pub id: String,
    pub image: String,
    pub title: String,
    pub description: String,
    pub seasons: u32,
    /// Resolved genres, deduplicated by id in first-seen order
    pub genres: Vec<Genre>,
    /// `None` when the raw value was missing or unparseable
    pub updated_at: Option<NaiveDate>,
    pub updated_display: String,
}

impl Show {
    pub fn has_genre(&self, title: &str) -> bool {
        self.genres.iter().any(|genre| genre.title == title)
    }
}

/// Identity of one normalization pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotId(u64);

static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(1);

impl SnapshotId {
    fn next() -> Self {
        Self(NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One complete catalog, produced atomically and replaced wholesale
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    id: SnapshotId,
    shows: Vec<Show>,
}

impl CatalogSnapshot {
    /// Wrap already-normalized shows in a fresh snapshot
    pub fn new(shows: Vec<Show>) -> Self {
        Self {
            id: SnapshotId::next(),
            shows,
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn shows(&self) -> &[Show] {
        &self.shows
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }

    /// First show carrying the given id
    pub fn get(&self, id: &str) -> Option<&Show> {
        self.shows.iter().find(|show| show.id == id)
    }
}

/// Turns raw API records into validated [`Show`] values
#[derive(Debug, Clone, Copy)]
pub struct CatalogNormalizer<'a> {
    directory: &'a GenreDirectory,
}

impl Default for CatalogNormalizer<'static> {
    fn default() -> Self {
        Self::new(GenreDirectory::standard())
    }
}

impl<'a> CatalogNormalizer<'a> {
    pub fn new(directory: &'a GenreDirectory) -> Self {
        Self { directory }
    }

    /// Normalize a top-level API payload
    ///
    /// Fails only when the payload is not an array. Problems inside individual
    /// records are absorbed with defaults, so every record yields one show.
    pub fn normalize(&self, raw: &Value) -> Result<CatalogSnapshot, NormalizeError> {
        let records = raw.as_array().ok_or(NormalizeError::NotASequence {
            found: json_kind(raw),
        })?;

        Ok(self.normalize_records(records))
    }

    pub fn normalize_records(&self, records: &[Value]) -> CatalogSnapshot {
        let mut seen_ids = HashSet::new();

        let shows = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let show = self.normalize_record(record);
                if show.id.is_empty() {
                    tracing::debug!(index, "show record has no id");
                } else if !seen_ids.insert(show.id.clone()) {
                    tracing::warn!(index, id = %show.id, "duplicate show id in catalog");
                }
                show
            })
            .collect();

        CatalogSnapshot::new(shows)
    }

    /// Normalize one record; non-object records become an all-defaults show
    pub fn normalize_record(&self, record: &Value) -> Show {
        let empty = Map::new();
        let fields = match record.as_object() {
            Some(fields) => fields,
            None => {
                tracing::debug!(kind = json_kind(record), "show record is not an object");
                &empty
            }
        };

        let (updated_at, updated_display) = parse_updated(fields.get("updated"));

        Show {
            id: id_field(fields.get("id")).unwrap_or_default(),
            image: text_field(fields.get("image")).unwrap_or_default(),
            title: text_field(fields.get("title")).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: text_field(fields.get("description"))
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            seasons: count_field(fields.get("seasons")),
            genres: self.resolve_genres(fields.get("genres")),
            updated_at,
            updated_display,
        }
    }

    fn resolve_genres(&self, value: Option<&Value>) -> Vec<Genre> {
        let Some(Value::Array(items)) = value else {
            return Vec::new();
        };

        // Only readable ids can repeat; every unreadable entry keeps its slot
        let mut seen = HashSet::new();
        items
            .iter()
            .filter_map(|item| match genre_id(item) {
                Some(id) if seen.insert(id) => Some(self.directory.resolve(id)),
                Some(_) => None,
                None => {
                    tracing::debug!(kind = json_kind(item), "unreadable genre id");
                    Some(Genre::unknown(UNREADABLE_GENRE_ID))
                }
            })
            .collect()
    }
}

/// Normalize a payload against the standard genre directory
pub fn normalize(raw: &Value) -> Result<CatalogSnapshot, NormalizeError> {
    CatalogNormalizer::default().normalize(raw)
}

pub(crate) fn text_field(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

pub(crate) fn id_field(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn count_field(value: Option<&Value>) -> u32 {
    let count = match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    count
        .map(|count| u32::try_from(count).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

fn genre_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| s.parse().ok().and_then(integral))
        }
        _ => None,
    }
}

/// Whole-valued floats such as `2.0` still name a genre
fn integral(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

/// Parse the raw `updated` value into a date and its display text
pub(crate) fn parse_updated(value: Option<&Value>) -> (Option<NaiveDate>, String) {
    let date = match value {
        Some(Value::String(s)) => parse_date(s.trim()),
        _ => None,
    };

    match date {
        Some(date) => (Some(date), date.format(DISPLAY_DATE_FORMAT).to_string()),
        None => (None, UNKNOWN_DATE.to_string()),
    }
}

fn parse_date(date_str: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(date_str)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok())
}
