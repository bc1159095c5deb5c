//! Authentication and authorization middleware
//!
//! `authenticate_jwt` runs on every request. It decodes a bearer token when
//! one is present and stores the resulting [`AuthUser`] in the request
//! extensions; a missing or invalid token simply leaves the request
//! anonymous. The `require_*` layers then gate individual route groups and
//! halt the request with [`ApiError::Unauthorized`] when their condition is
//! not met.

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    jwt::{Claims, JwtService},
};

const BEARER_PREFIX: &str = "bearer ";

/// Authenticated user information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub username: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            username: claims.username,
            is_admin: claims.is_admin,
            iat: claims.iat,
        }
    }
}

/// Outcome of inspecting a request's credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    Authenticated(AuthUser),
    Anonymous,
}

impl Authentication {
    pub fn into_user(self) -> Option<AuthUser> {
        match self {
            Authentication::Authenticated(user) => Some(user),
            Authentication::Anonymous => None,
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
///
/// The scheme is matched case-insensitively and surrounding whitespace is
/// ignored.
pub fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let (scheme, token) = header.split_at_checked(BEARER_PREFIX.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the caller's identity from the request headers
///
/// Never fails: anything short of a valid token is anonymous.
pub fn authenticate(headers: &HeaderMap, jwt: &JwtService) -> Authentication {
    let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(bearer_token)
    else {
        return Authentication::Anonymous;
    };

    match jwt.validate_token(token) {
        Ok(claims) => Authentication::Authenticated(claims.into()),
        Err(e) => {
            debug!("Ignoring invalid bearer token: {}", e);
            Authentication::Anonymous
        }
    }
}

/// Authentication middleware
///
/// Stores the authenticated user in the request extensions, if any, and
/// always continues with the request.
pub async fn authenticate_jwt(
    State(jwt): State<JwtService>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(user) = authenticate(req.headers(), &jwt).into_user() {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

/// Require any authenticated user
pub fn ensure_logged_in(user: Option<&AuthUser>) -> ApiResult<()> {
    match user {
        Some(_) => Ok(()),
        None => Err(ApiError::Unauthorized),
    }
}

/// Require an authenticated admin
pub fn ensure_admin(user: Option<&AuthUser>) -> ApiResult<()> {
    match user {
        Some(user) if user.is_admin => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

/// Require an admin, or the user named by `username`
///
/// `username` is the identity the request targets. The match is exact and
/// case-sensitive; with no target only admins pass.
pub fn ensure_self_or_admin(user: Option<&AuthUser>, username: Option<&str>) -> ApiResult<()> {
    match user {
        Some(user) if user.is_admin => Ok(()),
        Some(user) if username == Some(user.username.as_str()) => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

/// Middleware form of [`ensure_logged_in`]
pub async fn require_logged_in(req: Request<Body>, next: Next) -> ApiResult<Response> {
    ensure_logged_in(req.extensions().get::<AuthUser>())?;
    Ok(next.run(req).await)
}

/// Middleware form of [`ensure_admin`]
pub async fn require_admin(req: Request<Body>, next: Next) -> ApiResult<Response> {
    ensure_admin(req.extensions().get::<AuthUser>())?;
    Ok(next.run(req).await)
}

/// Middleware form of [`ensure_self_or_admin`], targeting the `username`
/// path parameter
pub async fn require_self_or_admin(
    params: Option<Path<HashMap<String, String>>>,
    req: Request<Body>,
    next: Next,
) -> ApiResult<Response> {
    let target = params
        .as_ref()
        .and_then(|Path(params)| params.get("username"))
        .map(String::as_str);

    ensure_self_or_admin(req.extensions().get::<AuthUser>(), target)?;
    Ok(next.run(req).await)
}
