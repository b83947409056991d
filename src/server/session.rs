use super::state::ServerState;
use crate::error::ServiceError;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::debug;

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account_id: i64,
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

fn extract_session_token_from_cookies(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(Cookie::value)
        .map(|s| s.to_string())
}

/// Accepts both `Bearer <token>` and a bare token.
fn extract_session_token_from_headers(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(HEADER_SESSION_TOKEN_KEY)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Header token first, then cookie. A stale cookie does not shadow a valid header.
fn candidate_session_tokens(parts: &Parts) -> Vec<String> {
    extract_session_token_from_headers(parts)
        .into_iter()
        .chain(extract_session_token_from_cookies(parts))
        .collect()
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let tokens = candidate_session_tokens(parts);
        if tokens.is_empty() {
            debug!("No token in headers nor cookies.");
            return Err(ServiceError::Unauthorized);
        }

        for token in &tokens {
            match state.authenticator.authenticate(token) {
                Ok(account) => {
                    return Ok(Session {
                        account_id: account.id,
                    })
                }
                Err(ServiceError::Unauthorized) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(ServiceError::Unauthorized)
    }
}
