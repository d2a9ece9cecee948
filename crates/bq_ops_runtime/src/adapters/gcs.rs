//! Thin blocking REST client for the GCS JSON API objects.list surface.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::adapters::object_store::ObjectLister;

const BASE_URL: &str = "https://storage.googleapis.com/storage/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum GcsError {
    Http(reqwest::Error),
    Json(reqwest::Error),
}

impl fmt::Display for GcsError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(error) => write!(formatter, "gcs request failed: {error}"),
            Self::Json(error) => write!(formatter, "gcs response malformed: {error}"),
        }
    }
}

impl std::error::Error for GcsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(error) | Self::Json(error) => Some(error),
        }
    }
}

impl From<reqwest::Error> for GcsError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectListResponse {
    #[serde(default)]
    items: Vec<ObjectResource>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectResource {
    name: String,
}

/// Thin HTTP client for listing bucket objects. The caller supplies a ready
/// bearer token; credential acquisition is out of scope.
#[derive(Debug, Clone)]
pub struct GcsClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GcsClient {
    pub fn new(access_token: &str) -> Self {
        Self::with_base_url(BASE_URL, access_token)
    }

    pub fn with_base_url(base_url: &str, access_token: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build GCS client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// All object names under the prefix, following `nextPageToken`
    /// pagination until the listing is exhausted.
    fn fetch_object_names(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<String>, GcsError> {
        let url = format!("{}/b/{bucket}/o", self.base_url);
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(url.as_str())
                .bearer_auth(&self.access_token)
                .query(&[("fields", "items/name,nextPageToken")]);
            if let Some(prefix) = prefix {
                request = request.query(&[("prefix", prefix)]);
            }
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send()?.error_for_status()?;
            let parsed: ObjectListResponse = response.json().map_err(GcsError::Json)?;

            names.extend(parsed.items.into_iter().map(|object| object.name));
            match parsed.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(names),
            }
        }
    }
}

impl ObjectLister for GcsClient {
    fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<String>, String> {
        self.fetch_object_names(bucket, prefix)
            .map_err(|error| error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_page_decodes_names_and_token() {
        let raw = serde_json::json!({
            "items": [
                {"name": "inbound/2024-03-01 revenue.csv"},
                {"name": "inbound/static_data.csv"}
            ],
            "nextPageToken": "page-2"
        });

        let page: ObjectListResponse = serde_json::from_value(raw).expect("page should decode");
        let names: Vec<String> = page.items.into_iter().map(|object| object.name).collect();
        assert_eq!(
            names,
            vec!["inbound/2024-03-01 revenue.csv", "inbound/static_data.csv"]
        );
        assert_eq!(page.next_page_token.as_deref(), Some("page-2"));
    }

    #[test]
    fn final_page_decodes_without_token() {
        let page: ObjectListResponse =
            serde_json::from_value(serde_json::json!({})).expect("empty page should decode");
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
