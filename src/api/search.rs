// src/api/search.rs
//! Client for the unofficial search endpoint.
//!
//! This endpoint is not part of the public API: it authenticates with a
//! logged-in session's `token_v2` cookie plus the active-user header,
//! scopes the query to an ancestor block, and ranks by relevance.

use crate::error::AppError;
use crate::types::{NotionId, SearchCredentials};
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_SEARCH_API_URL: &str = "https://www.notion.so/api/v3";
const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// A search request: free text plus optional limit and filter overrides.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: String,
    pub limit: Option<u32>,
    /// Merged over the default filter flags, passed through verbatim.
    pub filters: Option<Value>,
}

/// One ranked hit. Highlights come back as HTML-ish snippets.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(default)]
    pub highlight: Option<SearchHighlight>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHighlight {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "pathText", default)]
    pub path_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub total: u64,
}

pub struct SearchClient {
    client: reqwest::Client,
    api_url: String,
    credentials: SearchCredentials,
}

impl SearchClient {
    pub fn new(credentials: SearchCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: DEFAULT_SEARCH_API_URL.to_string(),
            credentials,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Builds the request body the endpoint expects: ancestor scope,
    /// relevance sort, and the default filter flags merged with any
    /// caller-supplied overrides.
    fn request_body(&self, ancestor: &NotionId, query: &SearchQuery) -> Value {
        let mut filters = json!({
            "isDeletedOnly": false,
            "isNavigableOnly": false,
            "excludeTemplates": true,
            "requireEditPermissions": false,
            "ancestors": [],
            "createdBy": [],
            "editedBy": [],
            "lastEditedTime": {},
            "createdTime": {},
        });
        if let Some(Value::Object(overrides)) = &query.filters {
            for (k, v) in overrides {
                filters[k] = v.clone();
            }
        }

        json!({
            "type": "BlocksInAncestor",
            "source": "quick_find_public",
            "ancestorId": ancestor.to_hyphenated(),
            "sort": { "field": "relevance" },
            "limit": query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            "query": query.query,
            "filters": filters,
        })
    }

    /// Searches all blocks under `ancestor`.
    pub async fn search(
        &self,
        ancestor: &NotionId,
        query: &SearchQuery,
    ) -> Result<SearchResults, AppError> {
        let url = format!("{}/search", self.api_url);
        log::debug!("POST {} (query: '{}')", url, query.query);

        let response = self
            .client
            .post(&url)
            .header(
                reqwest::header::COOKIE,
                format!("token_v2={}", self.credentials.token_v2),
            )
            .header("x-notion-active-user-header", &self.credentials.active_user)
            .json(&self.request_body(ancestor, query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::NotionService {
                code: crate::error::NotionErrorCode::from_http_status(response.status().as_u16()),
                message: format!("search endpoint returned {}", response.status()),
                status: response.status(),
                retry_after: None,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SearchClient {
        SearchClient::new(SearchCredentials::new("tok", "user@example.com").unwrap())
    }

    #[test]
    fn body_carries_ancestor_and_defaults() {
        let ancestor = NotionId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let body = client().request_body(
            &ancestor,
            &SearchQuery {
                query: "rust".to_string(),
                ..Default::default()
            },
        );

        assert_eq!(body["type"], "BlocksInAncestor");
        assert_eq!(
            body["ancestorId"],
            "550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(body["limit"], 20);
        assert_eq!(body["filters"]["excludeTemplates"], true);
        assert_eq!(body["sort"]["field"], "relevance");
    }

    #[test]
    fn filter_overrides_merge_over_defaults() {
        let ancestor = NotionId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let body = client().request_body(
            &ancestor,
            &SearchQuery {
                query: "q".to_string(),
                limit: Some(5),
                filters: Some(json!({ "isDeletedOnly": true })),
            },
        );

        assert_eq!(body["limit"], 5);
        assert_eq!(body["filters"]["isDeletedOnly"], true);
        assert_eq!(body["filters"]["excludeTemplates"], true);
    }
}
