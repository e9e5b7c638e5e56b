use crate::error::ApiError;
use crate::models::{Review, ReviewDraft};
use crate::services::{review_service, ApiClient};
use crate::store::slice::Slice;

#[derive(Debug, Clone, Default)]
pub struct ReviewsState {
    pub list: Slice<Review>,
}

impl ReviewsState {
    pub async fn fetch_all(
        &mut self,
        api: &ApiClient,
        token: Option<&str>,
    ) -> Result<Vec<Review>, ApiError> {
        self.list
            .fetch_all(review_service::list_reviews(api, token))
            .await
    }

    pub async fn create(
        &mut self,
        api: &ApiClient,
        token: &str,
        draft: &ReviewDraft,
    ) -> Result<Review, ApiError> {
        self.list
            .append(review_service::create_review(api, token, draft))
            .await
    }

    pub async fn update(
        &mut self,
        api: &ApiClient,
        token: &str,
        review_id: i64,
        draft: &ReviewDraft,
    ) -> Result<Review, ApiError> {
        self.list
            .replace(review_service::update_review(api, token, review_id, draft))
            .await
    }

    pub async fn delete(
        &mut self,
        api: &ApiClient,
        token: &str,
        review_id: i64,
    ) -> Result<(), ApiError> {
        self.list
            .remove(
                review_id,
                review_service::delete_review(api, token, review_id),
            )
            .await
    }
}
