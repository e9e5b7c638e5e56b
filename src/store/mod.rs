//! Client-side state, one [`Store`] per browser session.
//!
//! Every domain lives in its own slice and is only ever changed by its own
//! actions. An action marks the slice loading, awaits the backend call and then
//! either applies the confirmed result or records the error message.

pub mod activities;
pub mod admin;
pub mod auth;
pub mod news;
pub mod responses;
pub mod reviews;
pub mod slice;

use crate::error::ApiError;
use crate::services::{auth_service, ApiClient, Credentials};

pub use activities::ActivitiesState;
pub use admin::AdminState;
pub use auth::AuthState;
pub use news::NewsState;
pub use responses::ResponsesState;
pub use reviews::ReviewsState;
pub use slice::{RequestStatus, Slice};

#[derive(Debug, Clone, Default)]
pub struct Store {
    pub auth: AuthState,
    pub activities: ActivitiesState,
    pub reviews: ReviewsState,
    pub responses: ResponsesState,
    pub news: NewsState,
    pub admin: AdminState,
}

impl Store {
    /// Drops every cached slice except `auth`, so nothing loaded before a
    /// sign-in is shown to the new user.
    pub fn keep_only_auth(&mut self) {
        let auth = std::mem::take(&mut self.auth);
        *self = Store {
            auth,
            ..Store::default()
        };
    }
}

/// Everything the server keeps for one browser: its store and its credentials.
#[derive(Debug, Default)]
pub struct ClientSession {
    pub store: Store,
    pub credentials: Credentials,
}

impl ClientSession {
    /// Bearer token for an authenticated call, refreshed when it has expired.
    /// Losing the credentials on the way also signs the store out.
    pub async fn access_token(&mut self, api: &ApiClient) -> Result<String, ApiError> {
        let result = auth_service::fresh_access_token(api, &mut self.credentials).await;
        if matches!(&result, Err(e) if e.requires_login()) {
            self.store.auth.sign_out();
        }
        result
    }

    /// Token for public calls, which pass it along only when there is a usable one.
    pub async fn optional_token(&mut self, api: &ApiClient) -> Option<String> {
        if self.credentials.token.is_none() {
            return None;
        }
        self.access_token(api).await.ok()
    }

    /// Drops credentials and every cached slice.
    pub fn reset(&mut self) {
        self.credentials.clear();
        self.store = Store::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewsItem, User};

    #[test]
    fn signing_in_forgets_everything_but_the_user() {
        let mut store = Store::default();
        store.auth.user = Some(User {
            id: 2,
            username: "anna".into(),
            email: "anna@example.org".into(),
            roles: vec!["ROLE_USER".into()],
            active: true,
        });
        store.auth.is_authenticated = true;
        store.activities.registered.insert(7);
        store.news.list.records.push(NewsItem {
            id: 1,
            title: "Only for admins".into(),
            description: String::new(),
            created_by: "root".into(),
            created_at: String::new(),
        });
        store.responses.status.error = Some("Failed to fetch responses".into());

        store.keep_only_auth();

        assert_eq!(store.auth.current_user().map(|u| u.id), Some(2));
        assert!(store.activities.registered.is_empty());
        assert!(store.news.list.records.is_empty());
        assert!(store.responses.status.error.is_none());
    }
}
