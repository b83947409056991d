//! Annict GraphQL API client.

use super::source::{MetadataError, MetadataSource, SearchPage, Work};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ANNICT_ENDPOINT: &str = "https://api.annict.com/graphql";
pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(10);

const SEARCH_WORKS_QUERY: &str = r#"
query SearchWorks($title: String!, $limit: Int!, $after: String) {
    searchWorks(
        titles: [$title],
        first: $limit,
        after: $after,
        orderBy: { field: SEASON, direction: DESC }
    ) {
        nodes {
            annictId
            title
            seasonYear
            image { recommendedImageUrl }
        }
        pageInfo { hasNextPage endCursor }
    }
}
"#;

const LOOKUP_WORK_QUERY: &str = r#"
query LookupWork($id: Int!) {
    searchWorks(annictIds: [$id], first: 1) {
        nodes {
            annictId
            title
            seasonYear
            image { recommendedImageUrl }
        }
        pageInfo { hasNextPage endCursor }
    }
}
"#;

#[derive(Serialize)]
struct GraphQlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Serialize)]
struct SearchVariables<'a> {
    title: &'a str,
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<&'a str>,
}

#[derive(Serialize)]
struct LookupVariables {
    id: i64,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<ResponseData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    search_works: Option<WorkConnection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkConnection {
    nodes: Vec<AnnictWork>,
    page_info: PageInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnictWork {
    annict_id: i64,
    title: String,
    season_year: Option<i32>,
    image: Option<AnnictImage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnictImage {
    recommended_image_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

impl From<AnnictWork> for Work {
    fn from(work: AnnictWork) -> Self {
        Work {
            external_id: work.annict_id,
            title: work.title,
            season_year: work.season_year,
            image_url: work.image.and_then(|i| i.recommended_image_url),
        }
    }
}

/// Metadata source backed by the Annict GraphQL API.
pub struct AnnictClient {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

impl AnnictClient {
    /// Create a client for `endpoint`. Every request is bounded by `timeout`.
    pub fn new(
        endpoint: impl Into<String>,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build metadata HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            access_token,
        })
    }

    async fn post_query<V: Serialize + Send + Sync>(
        &self,
        query: &str,
        variables: V,
    ) -> Result<WorkConnection, MetadataError> {
        let mut req_builder = self
            .client
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables });
        if let Some(token) = &self.access_token {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                MetadataError::Timeout
            } else {
                MetadataError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Annict request failed");
            return Err(MetadataError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: GraphQlResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                MetadataError::Timeout
            } else {
                MetadataError::InvalidResponse(format!("Failed to parse Annict response: {}", e))
            }
        })?;

        if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(MetadataError::Provider(message));
        }

        body.data
            .and_then(|data| data.search_works)
            .ok_or_else(|| MetadataError::InvalidResponse("Missing searchWorks in data".to_string()))
    }
}

#[async_trait]
impl MetadataSource for AnnictClient {
    fn name(&self) -> &str {
        "annict"
    }

    async fn search(
        &self,
        keyword: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<SearchPage, MetadataError> {
        debug!(keyword, limit, ?after, "Searching Annict works");
        let connection = self
            .post_query(
                SEARCH_WORKS_QUERY,
                SearchVariables {
                    title: keyword,
                    limit,
                    after,
                },
            )
            .await?;

        let next_cursor = if connection.page_info.has_next_page {
            connection.page_info.end_cursor
        } else {
            None
        };
        Ok(SearchPage {
            works: connection.nodes.into_iter().map(Work::from).collect(),
            next_cursor,
        })
    }

    async fn lookup(&self, external_id: i64) -> Result<Work, MetadataError> {
        debug!(external_id, "Looking up Annict work");
        let connection = self
            .post_query(LOOKUP_WORK_QUERY, LookupVariables { id: external_id })
            .await?;

        connection
            .nodes
            .into_iter()
            .find(|w| w.annict_id == external_id)
            .map(Work::from)
            .ok_or(MetadataError::NotFound(external_id))
    }
}
