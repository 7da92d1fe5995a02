//! Principal resolution
//!
//! Every submission is attributed to a principal resolved from the request
//! itself; nothing about the acting user is cached between requests.

use async_trait::async_trait;
use http::HeaderMap;
use http::header::{AUTHORIZATION, COOKIE};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::PrincipalId;

/// Cookie carrying the session token for browser form posts.
pub const SESSION_COOKIE: &str = "clubroom_session";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authentication required")]
    Unauthenticated,
}

/// Malformed entry in the startup session seed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid session seed '{0}': expected token=principal")]
pub struct SeedError(pub String);

#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// Resolves the acting principal or fails with `Unauthenticated`.
    async fn current_principal(&self, headers: &HeaderMap) -> Result<PrincipalId, AuthError>;
}

/// Token to principal table shared by all requests.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, PrincipalId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses seeds of the form `token=principal[,token=principal...]`.
    pub fn from_seed(seed: &str) -> Result<Self, SeedError> {
        let mut sessions = HashMap::new();
        for entry in seed.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, principal) = entry
                .split_once('=')
                .map(|(t, p)| (t.trim(), p.trim()))
                .filter(|(t, p)| !t.is_empty() && !p.is_empty())
                .ok_or_else(|| SeedError(entry.to_string()))?;
            sessions.insert(token.to_string(), PrincipalId::new(principal));
        }
        Ok(Self {
            sessions: RwLock::new(sessions),
        })
    }

    pub async fn insert(&self, token: impl Into<String>, principal: PrincipalId) {
        self.sessions.write().await.insert(token.into(), principal);
    }

    /// Returns `true` if a session was removed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PrincipalResolver for SessionRegistry {
    async fn current_principal(&self, headers: &HeaderMap) -> Result<PrincipalId, AuthError> {
        let token = session_token(headers).ok_or(AuthError::Unauthenticated)?;
        self.sessions
            .read()
            .await
            .get(&token)
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Extracts the session token: bearer authorization first, then the cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
