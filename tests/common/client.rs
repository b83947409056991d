//! HTTP client for end-to-end tests
//!
//! When API routes or request formats change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client carrying an optional bearer token.
pub struct TestClient {
    pub client: reqwest::Client,
    pub base_url: String,
    pub token: Option<String>,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Registers the account, logs in and keeps the issued token.
    ///
    /// # Panics
    ///
    /// Panics if registration or login fails.
    pub async fn registered(base_url: String, username: &str, email: &str, password: &str) -> Self {
        let mut client = Self::new(base_url);

        let response = client.register(username, email, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let response = client.login(email, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Login body is not JSON");
        client.token = Some(
            body["token"]
                .as_str()
                .expect("Login body has no token")
                .to_string(),
        );
        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get(&self, path: &str) -> Response {
        self.authorize(self.client.get(self.url(path)))
            .send()
            .await
            .expect("Request failed")
    }

    async fn post(&self, path: &str, body: Value) -> Response {
        self.authorize(self.client.post(self.url(path)).json(&body))
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Response {
        self.post(
            "/v1/auth/register",
            json!({"username": username, "email": email, "password": password}),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post(
            "/v1/auth/login",
            json!({"email": email, "password": password}),
        )
        .await
    }

    pub async fn create_review(&self, external_id: i64, score: i64, comment: Option<&str>) -> Response {
        self.post(
            "/v1/reviews",
            json!({"externalId": external_id, "score": score, "comment": comment}),
        )
        .await
    }

    pub async fn list_catalog(&self, page: i64, page_size: i64) -> Response {
        self.get(&format!("/v1/catalog?page={}&pageSize={}", page, page_size))
            .await
    }

    pub async fn search(&self, keyword: &str, limit: i64, cursor: Option<&str>) -> Response {
        let mut request = self
            .client
            .get(self.url("/v1/catalog/search"))
            .query(&[("q", keyword.to_string()), ("limit", limit.to_string())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }
        request.send().await.expect("Request failed")
    }

    pub async fn get_item(&self, external_id: i64) -> Response {
        self.get(&format!("/v1/catalog/{}", external_id)).await
    }

    pub async fn get_item_reviews(&self, external_id: i64) -> Response {
        self.get(&format!("/v1/catalog/{}/reviews", external_id))
            .await
    }

    pub async fn get_my_reviews(&self) -> Response {
        self.get("/v1/user/reviews").await
    }

    pub async fn health(&self) -> Response {
        self.get("/health").await
    }
}
