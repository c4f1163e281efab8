//! HTTP client for the bag service.
//!
//! Thin reqwest wrapper. Status handling and body parsing are pure functions
//! so they can be tested without a server.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::BagApi;
use super::types::{Bag, ErrorBody, GuestSessionRequest, NewBag, SavedBag, TokenResponse};
use crate::config::HttpTimeouts;
use crate::error::{ApiOperation, BagError};

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpBagApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBagApi {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, BagError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| BagError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, op: ApiOperation, request: reqwest::RequestBuilder) -> Result<String, BagError> {
        let response = request
            .send()
            .await
            .map_err(|e| BagError::Transport { op, message: e.to_string() })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| BagError::Transport { op, message: e.to_string() })?;
        debug!(%op, status, "bag api response");

        check_status(op, status, &text)?;
        Ok(text)
    }
}

#[async_trait::async_trait]
impl BagApi for HttpBagApi {
    async fn start_guest_session(&self, email: &str) -> Result<String, BagError> {
        let op = ApiOperation::StartSession;
        let request = self
            .http
            .post(endpoint(&self.base_url, "/user/guest"))
            .json(&GuestSessionRequest { email });
        let text = self.send(op, request).await?;
        let body: TokenResponse = parse_body(op, &text)?;
        token_from(body)
    }

    async fn list_bags(&self) -> Result<Vec<Bag>, BagError> {
        let op = ApiOperation::ListDesigns;
        let text = self
            .send(op, self.http.get(endpoint(&self.base_url, "/bag")))
            .await?;
        parse_body(op, &text)
    }

    async fn submit_bag(&self, token: &str, bag: &NewBag) -> Result<String, BagError> {
        let op = ApiOperation::SubmitDesign;
        let request = self
            .http
            .post(endpoint(&self.base_url, "/bag"))
            .bearer_auth(token)
            .json(bag);
        let text = self.send(op, request).await?;
        let saved: SavedBag = parse_body(op, &text)?;
        Ok(saved.id)
    }

    async fn cast_vote(&self, token: &str, bag_id: &str) -> Result<(), BagError> {
        let request = self
            .http
            .post(endpoint(&self.base_url, &vote_path(bag_id)))
            .bearer_auth(token);
        self.send(ApiOperation::CastVote, request).await?;
        Ok(())
    }
}

// =============================================================================
// PURE HELPERS
// =============================================================================

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{base_url}{path}")
}

fn vote_path(bag_id: &str) -> String {
    format!("/vote/{bag_id}")
}

/// Turn a non-2xx response into [`BagError::Remote`], carrying the server's
/// `error` (or `message`) text when the body has one.
fn check_status(op: ApiOperation, status: u16, body: &str) -> Result<(), BagError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed.error.or(parsed.message).filter(|m| !m.trim().is_empty());
    Err(BagError::Remote { op, status, message })
}

fn parse_body<T: DeserializeOwned>(op: ApiOperation, body: &str) -> Result<T, BagError> {
    serde_json::from_str(body).map_err(|e| BagError::Parse { op, message: e.to_string() })
}

fn token_from(body: TokenResponse) -> Result<String, BagError> {
    match body.token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(BagError::MissingToken),
    }
}
