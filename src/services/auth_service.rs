use reqwest::Method;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::models::auth::RefreshRequest;
use crate::models::{LoginRequest, ProfileUpdate, RegisterRequest, TokenPair, User};
use crate::services::api_client::ApiClient;
use crate::services::token::{self, Credentials};

pub async fn login(api: &ApiClient, request: &LoginRequest) -> Result<TokenPair, ApiError> {
    let req = api
        .request(Method::POST, "/api/auth/login", None)
        .json(request);
    api.json(req, "Login failed").await
}

pub async fn register(api: &ApiClient, request: &RegisterRequest) -> Result<(), ApiError> {
    let req = api
        .request(Method::POST, "/api/auth/register", None)
        .json(request);
    api.empty(req, "Error occurred during registration.").await
}

pub async fn current_user(api: &ApiClient, token: &str) -> Result<User, ApiError> {
    let req = api.request(Method::GET, "/api/auth/me", Some(token));
    api.json(req, "Failed to load user data").await
}

pub async fn update_profile(
    api: &ApiClient,
    token: &str,
    user_id: i64,
    update: &ProfileUpdate,
) -> Result<User, ApiError> {
    let req = api
        .request(Method::PUT, &format!("/api/users/{}", user_id), Some(token))
        .json(update);
    api.json(req, "Failed to update user").await
}

pub async fn logout(api: &ApiClient, token: &str) -> Result<(), ApiError> {
    let req = api.request(Method::DELETE, "/api/auth/logout", Some(token));
    api.empty(req, "Logout failed").await
}

pub async fn refresh(api: &ApiClient, refresh_token: &str) -> Result<TokenPair, ApiError> {
    let req = api
        .request(Method::POST, "/api/auth/refresh", None)
        .json(&RefreshRequest { refresh_token });
    api.json(req, "Session expired").await
}

pub async fn forgot_password(api: &ApiClient, email: &str) -> Result<(), ApiError> {
    let req = api
        .request(Method::POST, "/api/forgot-password", None)
        .query(&[("email", email)]);
    api.empty(req, "Error sending reset instructions.").await
}

pub async fn validate_reset_token(api: &ApiClient, reset_token: &str) -> Result<(), ApiError> {
    let req = api
        .request(Method::GET, "/api/validate-reset-token", None)
        .query(&[("token", reset_token)]);
    api.empty(req, "This reset link is invalid or has expired.")
        .await
}

pub async fn reset_password(
    api: &ApiClient,
    reset_token: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    let req = api
        .request(Method::PUT, "/api/reset-password", None)
        .form(&[("token", reset_token), ("newPassword", new_password)]);
    api.empty(req, "Error resetting password").await
}

/// Returns a bearer token that is not known to be expired, exchanging the
/// refresh token first when needed.
///
/// Fails with [`ApiError::Unauthenticated`] without touching the network when
/// there is no token, or when it expired and no refresh is possible. A refresh
/// the backend rejects clears the stored credentials. Any other failure is
/// returned as is and leaves them in place for the next attempt.
pub async fn fresh_access_token(
    api: &ApiClient,
    credentials: &mut Credentials,
) -> Result<String, ApiError> {
    let Some(current) = credentials.token.clone() else {
        return Err(ApiError::Unauthenticated);
    };

    let now = chrono::Utc::now().timestamp();
    if !token::is_expired(&current, now) {
        return Ok(current);
    }

    let Some(refresh_token) = credentials.refresh_token.clone() else {
        credentials.clear();
        return Err(ApiError::Unauthenticated);
    };

    match refresh(api, &refresh_token).await {
        Ok(pair) => {
            info!("Access token refreshed");
            let token = pair.access_token.clone();
            credentials.store(pair);
            Ok(token)
        }
        Err(e) if e.requires_login() || e.is_forbidden() => {
            warn!("Refresh token rejected: {}", e);
            credentials.clear();
            Err(ApiError::Unauthenticated)
        }
        Err(e) => {
            warn!("Token refresh failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::token::jwt_with_exp;

    fn unreachable_api() -> ApiClient {
        // Port 9 (discard) on localhost: nothing listens, so every request
        // fails to connect.
        ApiClient::new("http://127.0.0.1:9").expect("client builds")
    }

    #[tokio::test]
    async fn missing_token_fails_locally() {
        let mut creds = Credentials::default();
        let err = fresh_access_token(&unreachable_api(), &mut creds)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn live_token_is_used_as_is() {
        let token = jwt_with_exp(chrono::Utc::now().timestamp() + 3600);
        let mut creds = Credentials::new(Some(token.clone()), None);
        let got = fresh_access_token(&unreachable_api(), &mut creds)
            .await
            .expect("token is live");
        assert_eq!(got, token);
        assert!(!creds.is_changed());
    }

    #[tokio::test]
    async fn expired_token_without_refresh_token_signs_out() {
        let token = jwt_with_exp(chrono::Utc::now().timestamp() - 60);
        let mut creds = Credentials::new(Some(token), None);
        let err = fresh_access_token(&unreachable_api(), &mut creds)
            .await
            .unwrap_err();
        assert!(err.requires_login());
        assert!(creds.token.is_none());
        assert!(creds.is_changed());
    }

    #[tokio::test]
    async fn unreachable_backend_keeps_the_credentials() {
        let token = jwt_with_exp(chrono::Utc::now().timestamp() - 60);
        let mut creds = Credentials::new(Some(token.clone()), Some("r1".into()));
        let err = fresh_access_token(&unreachable_api(), &mut creds)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(!err.requires_login());
        assert_eq!(creds.token, Some(token));
        assert_eq!(creds.refresh_token.as_deref(), Some("r1"));
        assert!(!creds.is_changed());
    }
}
