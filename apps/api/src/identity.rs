//! The identity gate. Sign-in itself is handled by the external identity provider,
//! which forwards the authenticated user id in `x-user-id`; the API only needs to
//! know whether the caller may proceed.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const SIGN_IN_PATH: &str = "/auth/sign-in";

/// Extractor that only succeeds for signed-in callers.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user_id: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SignedIn {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match user_id {
            Some(user_id) => Ok(SignedIn {
                user_id: user_id.to_string(),
            }),
            None => Err(AppError::Unauthorized {
                redirect: sign_in_redirect(parts.uri.path()),
            }),
        }
    }
}

/// `/auth/sign-in?next=<path>` so the caller lands back where it started.
pub fn sign_in_redirect(next: &str) -> String {
    format!("{SIGN_IN_PATH}?next={next}")
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> Result<SignedIn, AppError> {
        let (mut parts, _) = request.into_parts();
        SignedIn::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_signed_in_caller_proceeds() {
        let request = Request::builder()
            .uri("/api/v1/resumes")
            .header(USER_ID_HEADER, "user_123")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap().user_id, "user_123");
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_redirected() {
        let request = Request::builder()
            .uri("/api/v1/resumes/analyze")
            .body(())
            .unwrap();
        match extract(request).await.unwrap_err() {
            AppError::Unauthorized { redirect } => {
                assert_eq!(redirect, "/auth/sign-in?next=/api/v1/resumes/analyze")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_blank_header_is_anonymous() {
        let request = Request::builder()
            .uri("/api/v1/resumes")
            .header(USER_ID_HEADER, "   ")
            .body(())
            .unwrap();
        assert!(extract(request).await.is_err());
    }
}
