use reqwest::Method;

use crate::error::ApiError;
use crate::models::{Response, ResponseDraft};
use crate::services::api_client::ApiClient;

pub async fn list_responses(
    api: &ApiClient,
    token: Option<&str>,
    review_id: i64,
) -> Result<Vec<Response>, ApiError> {
    let req = api.request(
        Method::GET,
        &format!("/api/responses/review/{}", review_id),
        token,
    );
    api.json(req, "Failed to fetch responses").await
}

pub async fn create_response(
    api: &ApiClient,
    token: &str,
    review_id: i64,
    draft: &ResponseDraft,
) -> Result<Response, ApiError> {
    let req = api
        .request(
            Method::POST,
            &format!("/api/responses/review/{}", review_id),
            Some(token),
        )
        .json(draft);
    api.json(req, "Failed to add response").await
}

pub async fn delete_response(api: &ApiClient, token: &str, response_id: i64) -> Result<(), ApiError> {
    let req = api.request(
        Method::DELETE,
        &format!("/api/responses/{}", response_id),
        Some(token),
    );
    api.empty(req, "Failed to delete response").await
}
