//! Authentication collaborator
//!
//! Tokens are issued elsewhere; this crate only asks whether a bearer token
//! identifies a user.

use std::collections::HashMap;

use async_trait::async_trait;

/// Identity attached to requests that passed the bearer check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolves a bearer token, or `None` when it is not recognized.
    async fn authenticate(&self, token: &str) -> Option<AuthenticatedUser>;
}

/// Accepts a fixed table of tokens, typically loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, String>,
}

impl StaticTokenAuthenticator {
    /// `tokens` maps each accepted token to the user id it stands for.
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, token: &str) -> Option<AuthenticatedUser> {
        self.tokens.get(token).map(|user| AuthenticatedUser {
            id: user.clone(),
        })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
