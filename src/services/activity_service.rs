use reqwest::Method;

use crate::error::ApiError;
use crate::models::{Activity, ActivityDraft};
use crate::services::api_client::ApiClient;

/// Public listing; the token is attached when the visitor has one.
pub async fn list_activities(api: &ApiClient, token: Option<&str>) -> Result<Vec<Activity>, ApiError> {
    let req = api.request(Method::GET, "/api/activity", token);
    api.json(req, "Failed to fetch activities").await
}

pub async fn create_activity(
    api: &ApiClient,
    token: &str,
    draft: &ActivityDraft,
) -> Result<Activity, ApiError> {
    let req = api
        .request(Method::POST, "/api/activity", Some(token))
        .json(draft);
    api.json(req, "Failed to create activity").await
}

pub async fn update_activity(
    api: &ApiClient,
    token: &str,
    activity_id: i64,
    draft: &ActivityDraft,
) -> Result<Activity, ApiError> {
    let req = api
        .request(
            Method::PUT,
            &format!("/api/activity/update/{}", activity_id),
            Some(token),
        )
        .json(draft);
    api.json(req, "Failed to update activity").await
}

pub async fn delete_activity(api: &ApiClient, token: &str, activity_id: i64) -> Result<(), ApiError> {
    let req = api.request(
        Method::DELETE,
        &format!("/api/activity/{}", activity_id),
        Some(token),
    );
    api.empty(req, "Failed to delete activity").await
}

/// Ids of the activities the signed-in user takes part in.
pub async fn registered_activity_ids(api: &ApiClient, token: &str) -> Result<Vec<i64>, ApiError> {
    let req = api.request(
        Method::GET,
        "/api/activity/user/registered-activities",
        Some(token),
    );
    api.json(req, "Failed to fetch registered activities").await
}

pub async fn join_activity(api: &ApiClient, token: &str, activity_id: i64) -> Result<(), ApiError> {
    let req = api.request(
        Method::PUT,
        &format!("/api/activity/{}/add-user", activity_id),
        Some(token),
    );
    api.empty(
        req,
        "Failed to register for the event. Please try again.",
    )
    .await
}

pub async fn leave_activity(api: &ApiClient, token: &str, activity_id: i64) -> Result<(), ApiError> {
    let req = api.request(
        Method::DELETE,
        &format!("/api/activity/{}/remove-user", activity_id),
        Some(token),
    );
    api.empty(
        req,
        "Failed to revoke your participation. Please try again.",
    )
    .await
}
