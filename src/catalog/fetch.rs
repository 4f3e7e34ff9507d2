// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::Bytes;
use serde_json::Value;

use crate::config::CatalogConfig;
use crate::error::IngestionError;
use crate::http::HttpClient;

use super::normalize::{CatalogNormalizer, CatalogSnapshot};

/// Fetch the raw catalog body, rejecting non-2xx responses
pub async fn fetch_catalog_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Bytes, IngestionError> {
    let response = client
        .get(url)
        .await
        .map_err(|e| IngestionError::FetchFailed {
            url: url.to_string(),
            source: e,
        })?;

    if !response.is_success() {
        return Err(IngestionError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    Ok(response.body)
}

/// Parse a catalog body into a snapshot
pub fn parse_catalog(
    body: &[u8],
    normalizer: &CatalogNormalizer<'_>,
) -> Result<CatalogSnapshot, IngestionError> {
    let raw: Value = serde_json::from_slice(body)?;
    Ok(normalizer.normalize(&raw)?)
}

/// Fetch and normalize the full show catalog
pub async fn fetch_catalog<C: HttpClient + ?Sized>(
    client: &C,
    config: &CatalogConfig,
) -> Result<CatalogSnapshot, IngestionError> {
    let url = config.catalog_url()?;
    let bytes = fetch_catalog_bytes(client, url.as_str()).await?;
    parse_catalog(&bytes, &CatalogNormalizer::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::http::HttpResponse;
    use async_trait::async_trait;

    struct StaticClient {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClient for StaticClient {
        async fn get(&self, _url: &str) -> Result<HttpResponse, reqwest::Error> {
            Ok(HttpResponse {
                status: self.status,
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }

    #[tokio::test]
    async fn fetches_and_normalizes() {
        let client = StaticClient {
            status: 200,
            body: r#"[{"id": "1", "title": "One"}, {"id": "2"}]"#,
        };

        let snapshot = fetch_catalog(&client, &CatalogConfig::default()).await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.shows()[0].title, "One");
    }

    #[tokio::test]
    async fn non_2xx_is_an_error() {
        let client = StaticClient {
            status: 503,
            body: "[]",
        };

        let err = fetch_catalog(&client, &CatalogConfig::default()).await.unwrap_err();
        assert!(matches!(err, IngestionError::HttpStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn non_array_body_is_an_error() {
        let client = StaticClient {
            status: 200,
            body: r#"{"error": "nope"}"#,
        };

        let err = fetch_catalog(&client, &CatalogConfig::default()).await.unwrap_err();
        assert!(matches!(err, IngestionError::Malformed(_)));
    }

    #[tokio::test]
    async fn invalid_json_is_an_error() {
        let client = StaticClient {
            status: 200,
            body: "<html>",
        };

        let err = fetch_catalog(&client, &CatalogConfig::default()).await.unwrap_err();
        assert!(matches!(err, IngestionError::InvalidJson(_)));
    }
}
