// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde_json::{Map, Value};

use crate::catalog::{
    DEFAULT_DESCRIPTION, DEFAULT_TITLE, count_field, id_field, parse_updated, text_field,
};
use crate::config::CatalogConfig;
use crate::error::DetailError;
use crate::favorites::EpisodeRef;
use crate::http::HttpClient;

/// Full record of one show, with its seasons and episodes
#[derive(Debug, Clone, PartialEq)]
pub struct ShowDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    /// Genre titles as published by the detail endpoint
    pub genres: Vec<String>,
    pub updated_display: String,
    pub seasons: Vec<Season>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Season {
    pub number: u32,
    pub title: String,
    pub image: String,
    pub episodes: Vec<EpisodeSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub number: u32,
    pub title: String,
    pub description: String,
    /// Audio file URL, empty when the API gave none
    pub file: String,
}

impl ShowDetail {
    pub fn season(&self, number: u32) -> Option<&Season> {
        self.seasons.iter().find(|season| season.number == number)
    }

    /// Look up the episode an [`EpisodeRef`] points at
    pub fn episode(&self, episode_ref: EpisodeRef) -> Option<&EpisodeSummary> {
        self.season(episode_ref.season)?
            .episodes
            .iter()
            .find(|episode| episode.number == episode_ref.episode)
    }

    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|season| season.episodes.len()).sum()
    }
}

/// Fetch and normalize one show's detail record
pub async fn fetch_show_detail<C: HttpClient + ?Sized>(
    client: &C,
    config: &CatalogConfig,
    show_id: &str,
) -> Result<ShowDetail, DetailError> {
    let url = config.show_url(show_id)?.to_string();

    let response = client
        .get(&url)
        .await
        .map_err(|e| DetailError::FetchFailed {
            url: url.clone(),
            source: e,
        })?;

    if !response.is_success() {
        return Err(DetailError::HttpStatus {
            url,
            status: response.status,
        });
    }

    let raw: Value = serde_json::from_slice(&response.body)?;
    normalize_detail(&raw, show_id)
}

/// Normalize a detail payload with the same defaults as catalog records
pub fn normalize_detail(raw: &Value, show_id: &str) -> Result<ShowDetail, DetailError> {
    let fields = raw.as_object().ok_or_else(|| DetailError::NotAnObject {
        show_id: show_id.to_string(),
    })?;

    let (_, updated_display) = parse_updated(fields.get("updated"));

    let genres = match fields.get("genres") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };

    let seasons = list_of_objects(fields.get("seasons"))
        .enumerate()
        .map(|(index, season)| normalize_season(season, index))
        .collect();

    Ok(ShowDetail {
        id: id_field(fields.get("id")).unwrap_or_else(|| show_id.to_string()),
        title: text_field(fields.get("title")).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: text_field(fields.get("description"))
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        image: text_field(fields.get("image")).unwrap_or_default(),
        genres,
        updated_display,
        seasons,
    })
}

fn normalize_season(fields: &Map<String, Value>, index: usize) -> Season {
    let number = position_number(fields.get("season"), index);

    Season {
        number,
        title: text_field(fields.get("title")).unwrap_or_else(|| format!("Season {number}")),
        image: text_field(fields.get("image")).unwrap_or_default(),
        episodes: list_of_objects(fields.get("episodes"))
            .enumerate()
            .map(|(index, episode)| normalize_episode(episode, index))
            .collect(),
    }
}

fn normalize_episode(fields: &Map<String, Value>, index: usize) -> EpisodeSummary {
    EpisodeSummary {
        number: position_number(fields.get("episode"), index),
        title: text_field(fields.get("title")).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: text_field(fields.get("description"))
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        file: text_field(fields.get("file")).unwrap_or_default(),
    }
}

/// Explicit number if present and positive, otherwise 1-based position
fn position_number(value: Option<&Value>, index: usize) -> u32 {
    match count_field(value) {
        0 => u32::try_from(index + 1).unwrap_or(u32::MAX),
        number => number,
    }
}

fn list_of_objects(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::http::HttpResponse;
    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingClient {
        body: String,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpClient for RecordingClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(HttpResponse {
                status: 200,
                body: Bytes::from(self.body.clone()),
            })
        }
    }

    fn sample_detail() -> Value {
        json!({
            "id": "10716",
            "title": "Something Was Wrong",
            "genres": ["Personal Growth", "Investigative Journalism"],
            "updated": "2022-11-03T07:00:00.000Z",
            "seasons": [
                {
                    "season": 1,
                    "title": "Season 1",
                    "episodes": [
                        { "episode": 1, "title": "Intro", "file": "https://example.com/1.mp3" },
                        { "title": "Untitled number" }
                    ]
                },
                {
                    "season": 2,
                    "episodes": []
                }
            ]
        })
    }

    #[test]
    fn normalizes_seasons_and_episodes() {
        let detail = normalize_detail(&sample_detail(), "10716").unwrap();

        assert_eq!(detail.title, "Something Was Wrong");
        assert_eq!(detail.description, DEFAULT_DESCRIPTION);
        assert_eq!(detail.updated_display, "November 3, 2022");
        assert_eq!(detail.genres.len(), 2);
        assert_eq!(detail.seasons.len(), 2);
        assert_eq!(detail.seasons[1].title, "Season 2");
        assert_eq!(detail.episode_count(), 2);

        let second = detail.episode(EpisodeRef::new(1, 2)).unwrap();
        assert_eq!(second.title, "Untitled number");
        assert_eq!(second.file, "");
        assert!(detail.episode(EpisodeRef::new(3, 1)).is_none());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = normalize_detail(&json!([]), "x").unwrap_err();
        assert!(matches!(err, DetailError::NotAnObject { .. }));
    }

    #[test]
    fn missing_id_falls_back_to_requested_id() {
        let detail = normalize_detail(&json!({}), "abc").unwrap();
        assert_eq!(detail.id, "abc");
        assert!(detail.seasons.is_empty());
    }

    #[tokio::test]
    async fn fetch_requests_show_url() {
        let client = RecordingClient {
            body: sample_detail().to_string(),
            requested: Mutex::new(Vec::new()),
        };

        let detail = fetch_show_detail(&client, &CatalogConfig::default(), "10716")
            .await
            .unwrap();

        assert_eq!(detail.id, "10716");
        assert_eq!(
            client.requested.lock().unwrap().as_slice(),
            ["https://podcast-api.netlify.app/id/10716"]
        );
    }
}
