// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Points at one episode of a show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub season: u32,
    pub episode: u32,
}

impl EpisodeRef {
    pub fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

/// A favorited show, or a favorited episode of a show
///
/// Unknown fields in persisted data are ignored, so older builds can read
/// records written by newer ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub show_id: String,
    #[serde(default)]
    pub episode_ref: Option<EpisodeRef>,
    pub added_at: DateTime<Utc>,
}

impl FavoriteEntry {
    /// Identity used for uniqueness: one entry per (show, episode) pair
    pub fn key(&self) -> (&str, Option<EpisodeRef>) {
        (&self.show_id, self.episode_ref)
    }

    pub fn matches(&self, show_id: &str, episode_ref: Option<EpisodeRef>) -> bool {
        self.show_id == show_id && self.episode_ref == episode_ref
    }
}
