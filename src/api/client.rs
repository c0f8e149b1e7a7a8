// src/api/client.rs
//! Pure HTTP client wrapper for the public Notion API.
//!
//! A thin layer over reqwest that handles authentication headers and
//! request/response plumbing without parsing or business logic. The one
//! piece of protocol knowledge here is pulling the `Retry-After` header
//! off a response before the body is consumed, so the retry policy can
//! honor server-supplied backoff.

use super::{DatabaseQuery, NotionGateway, Paginated};
use crate::error::AppError;
use crate::model::{Block, DatabaseSchema, PageBlock, PageRecord};
use crate::types::{ApiKey, NotionId};
use reqwest::{header, Client, Response};
use serde::Serialize;
use std::time::Duration;

const NOTION_VERSION: &str = "2022-06-28";
const API_BASE_URL: &str = "https://api.notion.com/v1";

/// A thin wrapper around a reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .build()?;
        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Points the client at a different base URL. Test servers use this.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Makes a GET request to the specified endpoint path.
    pub async fn get(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Response, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).query(query).send().await?)
    }

    /// Makes a POST request with a JSON body.
    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
    /// Server backoff hint from the `Retry-After` header, when present.
    pub retry_after: Option<Duration>,
}

/// Extracts the response body as text with metadata.
///
/// The `Retry-After` header must be read here — once the body is
/// consumed the response is gone, and rate-limit recovery depends on
/// that hint surviving into the parsed error.
pub async fn read_response(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs);
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
        retry_after,
    })
}

#[async_trait::async_trait]
impl NotionGateway for NotionHttpClient {
    async fn retrieve_page(&self, id: &NotionId) -> Result<PageBlock, AppError> {
        let endpoint = format!("pages/{}", id.to_hyphenated());
        let response = self.get(&endpoint, &[]).await?;
        super::parser::parse_page_response(read_response(response).await?)
    }

    async fn fetch_children(
        &self,
        parent: &NotionId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Paginated<Block>, AppError> {
        let endpoint = format!("blocks/{}/children", parent.to_hyphenated());
        let mut query = vec![("page_size", page_size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("start_cursor", cursor));
        }
        let response = self.get(&endpoint, &query).await?;
        super::parser::parse_children_response(read_response(response).await?)
    }

    async fn retrieve_database(&self, id: &NotionId) -> Result<DatabaseSchema, AppError> {
        let endpoint = format!("databases/{}", id.to_hyphenated());
        let response = self.get(&endpoint, &[]).await?;
        super::parser::parse_schema_response(read_response(response).await?)
    }

    async fn query_database(
        &self,
        id: &NotionId,
        query: &DatabaseQuery,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Paginated<PageRecord>, AppError> {
        let endpoint = format!("databases/{}/query", id.to_hyphenated());

        let mut body = serde_json::to_value(query)?;
        body["page_size"] = serde_json::json!(page_size);
        if let Some(cursor) = cursor {
            body["start_cursor"] = serde_json::json!(cursor);
        }

        let response = self.post(&endpoint, &body).await?;
        super::parser::parse_rows_response(read_response(response).await?)
    }
}
