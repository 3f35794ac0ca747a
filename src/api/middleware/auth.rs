//! Session authentication middleware.
//!
//! A session is a JWT carried either as a Bearer token or in the
//! HTTP-only session cookie set at login.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, SESSION_COOKIE_NAME};
use crate::errors::AppError;
use crate::services::Actor;

/// Authenticated user extracted from the session token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

impl CurrentUser {
    /// The caller as seen by the services
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.is_admin)
    }
}

/// Bearer header first, then the session cookie
fn session_token(request: &Request) -> Option<String> {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(request.headers())
            .get(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string())
    })
}

/// Authentication middleware.
///
/// Resolves the session token, if any, to the stored account and injects
/// the CurrentUser into the request extensions. Roles come from the
/// account row, never from the token. Public routes pass through without
/// a session; handlers that need one take [`CurrentUser`] as an extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = session_token(&request) {
        match state.services.auth().authenticate(&token).await {
            Ok(user) => {
                request.extensions_mut().insert(CurrentUser {
                    id: user.id,
                    email: user.email,
                    is_admin: user.is_admin,
                });
            }
            Err(e @ (AppError::Database(_) | AppError::Internal(_))) => return Err(e),
            Err(e) => tracing::debug!(error = %e, "Ignoring invalid session token"),
        }
    }

    Ok(next.run(request).await)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Admin-only routes: 403 for everyone else.
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;
    require_admin(user)?;
    Ok(next.run(request).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::COOKIE;

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let request = Request::builder()
            .header(AUTHORIZATION, "Bearer header-token")
            .header(COOKIE, "session=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(session_token(&request).as_deref(), Some("header-token"));
    }

    #[test]
    fn test_cookie_used_without_header() {
        let request = Request::builder()
            .header(COOKIE, "theme=dark; session=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(session_token(&request).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn test_non_bearer_scheme_is_ignored() {
        let request = Request::builder()
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        assert_eq!(session_token(&request), None);
    }

    #[test]
    fn test_require_admin() {
        let mut user = CurrentUser {
            id: Uuid::new_v4(),
            email: "guest@example.com".to_string(),
            is_admin: false,
        };
        assert!(matches!(require_admin(&user), Err(AppError::Forbidden)));
        user.is_admin = true;
        assert!(require_admin(&user).is_ok());
    }
}
