use reqwest::Method;

use crate::error::ApiError;
use crate::models::{Review, ReviewDraft};
use crate::services::api_client::ApiClient;

pub async fn list_reviews(api: &ApiClient, token: Option<&str>) -> Result<Vec<Review>, ApiError> {
    let req = api.request(Method::GET, "/api/reviews", token);
    api.json(req, "Failed to fetch reviews").await
}

pub async fn create_review(
    api: &ApiClient,
    token: &str,
    draft: &ReviewDraft,
) -> Result<Review, ApiError> {
    let req = api
        .request(Method::POST, "/api/reviews", Some(token))
        .json(draft);
    api.json(req, "Failed to add review").await
}

pub async fn update_review(
    api: &ApiClient,
    token: &str,
    review_id: i64,
    draft: &ReviewDraft,
) -> Result<Review, ApiError> {
    let req = api
        .request(Method::PUT, &format!("/api/reviews/{}", review_id), Some(token))
        .json(draft);
    api.json(req, "Failed to edit review").await
}

pub async fn delete_review(api: &ApiClient, token: &str, review_id: i64) -> Result<(), ApiError> {
    let req = api.request(
        Method::DELETE,
        &format!("/api/reviews/{}", review_id),
        Some(token),
    );
    api.empty(req, "Failed to delete review").await
}
