//! Bearer token authentication.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use stash_core::User;
use stash_metadata::{MetadataError, UserRepo};
use tracing::Instrument;
use uuid::Uuid;

/// Maximum length for trace IDs.
/// Longer trace IDs are truncated to prevent log bloat and potential log injection.
const MAX_TRACE_ID_LEN: usize = 128;

/// Trace ID for request correlation.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Sanitise a client-provided value to printable ASCII.
    pub fn from_client(value: &str) -> Self {
        let sanitized: String = value
            .chars()
            .take(MAX_TRACE_ID_LEN)
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect();

        if sanitized.is_empty() {
            Self::new()
        } else {
            Self(sanitized)
        }
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

/// The user behind a valid bearer token.
///
/// Inserted by [`auth_middleware`]; extracting it in a handler rejects
/// unauthenticated requests with -2000.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user: User,
}

impl AuthenticatedUser {
    /// Require that the path's `{user}` segment names the caller.
    pub fn require_user(&self, name: &str) -> ApiResult<()> {
        if self.user.name == name {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "token does not belong to user {name}"
            )))
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

/// Extract bearer token from Authorization header.
/// Per RFC 6750, the "Bearer" scheme is case-insensitive.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(v[7..].trim())
            } else {
                None
            }
        })
        .filter(|token| !token.is_empty())
}

fn extract_or_generate_trace_id(req: &Request) -> TraceId {
    req.headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(TraceId::from_client)
        .unwrap_or_default()
}

/// Resolve the bearer token, if any, and run the request in a traced span.
///
/// Unknown tokens are not rejected here; routes that need a user extract
/// [`AuthenticatedUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let trace_id = extract_or_generate_trace_id(&req);
    let trace_id_str = trace_id.0.clone();
    req.extensions_mut().insert(trace_id);

    if let Some(token) = extract_bearer_token(&req) {
        match state.metadata.user_by_auth_token(token).await {
            Ok(user) => {
                req.extensions_mut().insert(AuthenticatedUser { user });
            }
            Err(MetadataError::NotFound(_)) => {
                tracing::debug!("unknown bearer token");
            }
            Err(e) => return Err(ApiError::Internal(e.to_string())),
        }
    }

    let response = next
        .run(req)
        .instrument(tracing::info_span!("request", trace_id = %trace_id_str))
        .await;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: &str) -> Request {
        Request::builder()
            .header(AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        for header in ["Bearer tok", "bearer tok", "BEARER tok"] {
            let req = request_with_auth(header);
            assert_eq!(extract_bearer_token(&req), Some("tok"), "{header}");
        }
    }

    #[test]
    fn test_malformed_authorization_is_ignored() {
        for header in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer   ", "tok"] {
            let req = request_with_auth(header);
            assert_eq!(extract_bearer_token(&req), None, "{header}");
        }
    }

    #[test]
    fn test_trace_id_is_sanitised() {
        let id = TraceId::from_client("abc\ndef\u{1b}[31m");
        assert_eq!(id.0, "abcdef[31m");

        let long = "x".repeat(500);
        assert_eq!(TraceId::from_client(&long).0.len(), MAX_TRACE_ID_LEN);

        assert_eq!(TraceId::from_client("\n\n").0.len(), 36);
    }

    #[test]
    fn test_require_user() {
        let auth = AuthenticatedUser {
            user: User {
                name: "alice".to_string(),
                auth_token: "t".to_string(),
            },
        };
        assert!(auth.require_user("alice").is_ok());
        assert_eq!(auth.require_user("bob").unwrap_err().code(), -2001);
    }
}
