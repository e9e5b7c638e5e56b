use reqwest::Method;

use crate::error::ApiError;
use crate::models::User;
use crate::services::api_client::ApiClient;

pub async fn list_users(api: &ApiClient, token: &str) -> Result<Vec<User>, ApiError> {
    let req = api.request(Method::GET, "/api/users", Some(token));
    api.json(req, "Failed to fetch users").await
}

pub async fn get_user(api: &ApiClient, token: &str, user_id: i64) -> Result<User, ApiError> {
    let req = api.request(Method::GET, &format!("/api/users/{}", user_id), Some(token));
    api.json(req, "Failed to fetch user").await
}

pub async fn delete_user(api: &ApiClient, token: &str, user_id: i64) -> Result<(), ApiError> {
    let req = api.request(Method::DELETE, &format!("/api/users/{}", user_id), Some(token));
    api.empty(req, "Failed to delete user").await
}
