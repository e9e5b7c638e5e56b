use reqwest::Method;

use crate::error::ApiError;
use crate::models::{NewsDraft, NewsItem};
use crate::services::api_client::ApiClient;

pub async fn list_news(api: &ApiClient, token: &str) -> Result<Vec<NewsItem>, ApiError> {
    let req = api.request(Method::GET, "/api/news", Some(token));
    api.json(req, "Failed to fetch news").await
}

pub async fn get_news(api: &ApiClient, token: &str, news_id: i64) -> Result<NewsItem, ApiError> {
    let req = api.request(Method::GET, &format!("/api/news/{}", news_id), Some(token));
    api.json(req, "Failed to fetch news by ID").await
}

pub async fn create_news(api: &ApiClient, token: &str, draft: &NewsDraft) -> Result<NewsItem, ApiError> {
    let req = api
        .request(Method::POST, "/api/news", Some(token))
        .json(draft);
    api.json(req, "Failed to create news").await
}

pub async fn update_news(
    api: &ApiClient,
    token: &str,
    news_id: i64,
    draft: &NewsDraft,
) -> Result<NewsItem, ApiError> {
    let req = api
        .request(Method::PUT, &format!("/api/news/{}", news_id), Some(token))
        .json(draft);
    api.json(req, "Failed to update news").await
}

pub async fn delete_news(api: &ApiClient, token: &str, news_id: i64) -> Result<(), ApiError> {
    let req = api.request(Method::DELETE, &format!("/api/news/{}", news_id), Some(token));
    api.empty(req, "Failed to delete news").await
}
