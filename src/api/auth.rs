//! Request identity
//!
//! Identity verification happens upstream at the identity provider's
//! gateway, which forwards the verified user id in `X-User-Id`. Handlers
//! take a [`CurrentUser`] to require it.
//!
//! Subscription sync is a billing-provider call, not a user action. It
//! additionally takes a [`BillingProvider`], which checks `X-Billing-Secret`
//! against the configured shared secret.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::error::ApiError;
use super::state::AppState;

/// Header carrying the authenticated user id
pub const USER_HEADER: &str = "x-user-id";

/// Header carrying the billing provider's shared secret
pub const BILLING_SECRET_HEADER: &str = "x-billing-secret";

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0
    }

    /// Forbid access to a document owned by someone else
    pub fn ensure_owns(&self, owner_id: &str, what: &str) -> Result<(), ApiError> {
        if owner_id == self.0 {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!("{} belongs to another user", what)))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

        let user_id = value
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Malformed X-User-Id header".to_string()))?
            .trim();

        if user_id.is_empty() {
            return Err(ApiError::Unauthorized("Empty X-User-Id header".to_string()));
        }

        Ok(CurrentUser(user_id.to_string()))
    }
}

/// Proof that the request came from the billing provider
#[derive(Debug, Clone, Copy)]
pub struct BillingProvider;

#[async_trait]
impl FromRequestParts<Arc<AppState>> for BillingProvider {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.billing_secret.as_deref() else {
            return Err(ApiError::Forbidden(
                "Subscription sync is not enabled".to_string(),
            ));
        };

        let presented = parts
            .headers
            .get(BILLING_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim);

        match presented {
            Some(secret) if secret == expected => Ok(BillingProvider),
            _ => {
                tracing::warn!("Rejected subscription change without billing credential");
                Err(ApiError::Forbidden(
                    "Subscription changes must come from the billing provider".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::ApiConfig;
    use crate::gamification::GamificationSettings;
    use crate::storage::Repository;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<CurrentUser, ApiError> {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header("X-User-Id", h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_header_present() {
        assert_eq!(extract(Some(" u1 ")).await.unwrap(), CurrentUser("u1".into()));
    }

    #[tokio::test]
    async fn test_missing_or_blank_rejected() {
        assert!(matches!(extract(None).await, Err(ApiError::Unauthorized(_))));
        assert!(matches!(extract(Some("  ")).await, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_ensure_owns() {
        let user = CurrentUser("u1".into());
        assert!(user.ensure_owns("u1", "Item").is_ok());
        assert!(matches!(user.ensure_owns("u2", "Item"), Err(ApiError::Forbidden(_))));
    }

    async fn extract_provider(
        secret: Option<&str>,
        header: Option<&str>,
    ) -> Result<BillingProvider, ApiError> {
        let config = ApiConfig {
            billing_secret: secret.map(str::to_string),
            ..Default::default()
        };
        let state = Arc::new(AppState::new(
            Repository::in_memory().unwrap(),
            GamificationSettings::default(),
            config,
        ));
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header("X-Billing-Secret", h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        BillingProvider::from_request_parts(&mut parts, &state).await
    }

    #[tokio::test]
    async fn test_billing_secret_required() {
        assert!(extract_provider(Some("s3cret"), Some("s3cret")).await.is_ok());
        assert!(matches!(
            extract_provider(Some("s3cret"), None).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            extract_provider(Some("s3cret"), Some("guess")).await,
            Err(ApiError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_billing_sync_disabled_without_secret() {
        assert!(matches!(
            extract_provider(None, Some("anything")).await,
            Err(ApiError::Forbidden(_))
        ));
    }
}
