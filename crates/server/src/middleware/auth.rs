//! Token authentication extractors.
//!
//! Handlers take [`RequireUser`] (or [`MaybeUser`] on endpoints open to
//! anonymous callers) to get the authenticated user. The extractor resolves
//! the token against the store and loads the caller's current group
//! memberships on every request, so a roster change is visible on the very
//! next call. Nothing about the role is cached between requests.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::db::UserRepository;
use crate::error::ApiError;
use crate::models::CurrentUser;
use crate::policy::RoleSet;
use crate::state::AppState;

/// Extractor that requires an authenticated user.
///
/// Rejects with 401 when the `Authorization` header is missing, malformed,
/// or carries an unknown token.
pub struct RequireUser(pub CurrentUser);

/// Extractor for endpoints that are open to anonymous callers.
///
/// A missing header yields `None`; a header that is present but invalid is
/// still rejected with 401.
pub struct MaybeUser(pub Option<CurrentUser>);

/// Pull the token key out of `Authorization: Token <key>`. `Bearer` is
/// accepted as an alias.
fn token_key(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| invalid_header())?;

    let (scheme, key) = value.split_once(' ').ok_or_else(invalid_header)?;
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return Err(invalid_header());
    }
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid_header());
    }
    Ok(Some(key))
}

fn invalid_header() -> ApiError {
    ApiError::Unauthorized("Invalid authorization header.".to_owned())
}

async fn resolve(state: &AppState, key: &str) -> Result<CurrentUser, ApiError> {
    let repo = UserRepository::new(state.pool());
    let user = repo
        .get_by_token(key)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token.".to_owned()))?;
    let names = repo.group_names(user.id).await?;

    Ok(CurrentUser {
        user,
        roles: RoleSet::from_group_names(names),
    })
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = token_key(parts)?.ok_or_else(|| {
            ApiError::Unauthorized("Authentication credentials were not provided.".to_owned())
        })?;
        Ok(Self(resolve(state, key).await?))
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match token_key(parts)? {
            Some(key) => Ok(Self(Some(resolve(state, key).await?))),
            None => Ok(Self(None)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/orders/");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_token_key_absent() {
        let parts = parts_with_header(None);
        assert!(token_key(&parts).unwrap().is_none());
    }

    #[test]
    fn test_token_key_schemes() {
        let parts = parts_with_header(Some("Token abc123"));
        assert_eq!(token_key(&parts).unwrap(), Some("abc123"));

        let parts = parts_with_header(Some("Bearer abc123"));
        assert_eq!(token_key(&parts).unwrap(), Some("abc123"));

        let parts = parts_with_header(Some("bearer abc123"));
        assert_eq!(token_key(&parts).unwrap(), Some("abc123"));
    }

    #[test]
    fn test_token_key_rejects_malformed() {
        for bad in ["abc123", "Basic abc123", "Token ", "Token"] {
            let parts = parts_with_header(Some(bad));
            assert!(token_key(&parts).is_err(), "accepted {bad:?}");
        }
    }
}
