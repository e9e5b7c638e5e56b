use tracing::warn;

use crate::error::ApiError;
use crate::models::{LoginRequest, ProfileUpdate, User};
use crate::services::{auth_service, ApiClient, Credentials};
use crate::store::slice::RequestStatus;

/// Who is signed in for this session.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub status: RequestStatus,
}

impl AuthState {
    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref().filter(|_| self.is_authenticated)
    }

    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(User::is_admin)
    }

    fn set_user(&mut self, user: &User) {
        self.user = Some(user.clone());
        self.is_authenticated = true;
    }

    /// Forgets the user locally. Credentials are the caller's to clear.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.is_authenticated = false;
        self.status = RequestStatus::default();
    }

    /// Exchanges username and password for tokens, then loads the profile
    /// behind them. Tokens are stored only when both steps succeed.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        credentials: &mut Credentials,
        request: &LoginRequest,
    ) -> Result<User, ApiError> {
        let call = async {
            let pair = auth_service::login(api, request).await?;
            let user = auth_service::current_user(api, &pair.access_token).await?;
            Ok((pair, user))
        };

        self.status.begin();
        match call.await {
            Ok((pair, user)) => {
                credentials.store(pair);
                self.set_user(&user);
                self.status.fulfil();
                Ok(user)
            }
            Err(err) => {
                self.user = None;
                self.is_authenticated = false;
                self.status.reject(&err);
                Err(err)
            }
        }
    }

    pub async fn load_current_user(&mut self, api: &ApiClient, token: &str) -> Result<User, ApiError> {
        self.status.begin();
        match auth_service::current_user(api, token).await {
            Ok(user) => {
                self.set_user(&user);
                self.status.fulfil();
                Ok(user)
            }
            Err(err) => {
                self.user = None;
                self.is_authenticated = false;
                self.status.reject(&err);
                Err(err)
            }
        }
    }

    pub async fn update_profile(
        &mut self,
        api: &ApiClient,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        let Some(user_id) = self.current_user().map(|u| u.id) else {
            return Err(ApiError::Unauthenticated);
        };

        self.status.begin();
        match auth_service::update_profile(api, token, user_id, update).await {
            Ok(user) => {
                self.set_user(&user);
                self.status.fulfil();
                Ok(user)
            }
            Err(err) => {
                self.status.reject(&err);
                Err(err)
            }
        }
    }

    /// Tells the backend (best effort) and always ends the session locally.
    pub async fn logout(&mut self, api: &ApiClient, credentials: &mut Credentials) {
        if let Some(token) = credentials.token.clone() {
            if let Err(e) = auth_service::logout(api, &token).await {
                warn!("Backend logout failed: {}", e);
            }
        }
        credentials.clear();
        self.sign_out();
    }
}
