use crate::error::ApiError;
use crate::models::User;
use crate::services::{user_service, ApiClient};
use crate::store::slice::Slice;

/// User management for administrators.
#[derive(Debug, Clone, Default)]
pub struct AdminState {
    pub users: Slice<User>,
    pub selected: Option<User>,
}

impl AdminState {
    pub async fn fetch_users(&mut self, api: &ApiClient, token: &str) -> Result<Vec<User>, ApiError> {
        self.users.fetch_all(user_service::list_users(api, token)).await
    }

    pub async fn fetch_user(
        &mut self,
        api: &ApiClient,
        token: &str,
        user_id: i64,
    ) -> Result<User, ApiError> {
        let selected = &mut self.selected;
        self.users
            .status
            .track(user_service::get_user(api, token, user_id), |user: &User| {
                *selected = Some(user.clone());
            })
            .await
    }

    pub async fn delete_user(
        &mut self,
        api: &ApiClient,
        token: &str,
        user_id: i64,
    ) -> Result<(), ApiError> {
        self.users
            .remove(user_id, user_service::delete_user(api, token, user_id))
            .await?;
        if self.selected.as_ref().map(|u| u.id) == Some(user_id) {
            self.selected = None;
        }
        Ok(())
    }
}
