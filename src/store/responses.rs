use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::models::{Record, Response, ResponseDraft};
use crate::services::{response_service, ApiClient};
use crate::store::slice::{upsert_back, RequestStatus};

/// Responses grouped under the id of the review they answer.
#[derive(Debug, Clone, Default)]
pub struct ResponsesState {
    pub by_review: BTreeMap<i64, Vec<Response>>,
    pub status: RequestStatus,
}

impl ResponsesState {
    pub fn for_review(&self, review_id: i64) -> &[Response] {
        self.by_review
            .get(&review_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub async fn fetch_for_review(
        &mut self,
        api: &ApiClient,
        token: Option<&str>,
        review_id: i64,
    ) -> Result<Vec<Response>, ApiError> {
        let by_review = &mut self.by_review;
        self.status
            .track(
                response_service::list_responses(api, token, review_id),
                |fetched: &Vec<Response>| {
                    by_review.insert(review_id, fetched.clone());
                },
            )
            .await
    }

    pub async fn create(
        &mut self,
        api: &ApiClient,
        token: &str,
        review_id: i64,
        draft: &ResponseDraft,
    ) -> Result<Response, ApiError> {
        let call = response_service::create_response(api, token, review_id, draft);
        self.settle_create(review_id, call).await
    }

    async fn settle_create(
        &mut self,
        review_id: i64,
        call: impl std::future::Future<Output = Result<Response, ApiError>>,
    ) -> Result<Response, ApiError> {
        let by_review = &mut self.by_review;
        self.status
            .track(call, |created: &Response| {
                upsert_back(by_review.entry(review_id).or_default(), created);
            })
            .await
    }

    pub async fn delete(
        &mut self,
        api: &ApiClient,
        token: &str,
        review_id: i64,
        response_id: i64,
    ) -> Result<(), ApiError> {
        let call = response_service::delete_response(api, token, response_id);
        self.settle_delete(review_id, response_id, call).await
    }

    async fn settle_delete(
        &mut self,
        review_id: i64,
        response_id: i64,
        call: impl std::future::Future<Output = Result<(), ApiError>>,
    ) -> Result<(), ApiError> {
        let by_review = &mut self.by_review;
        self.status
            .track(call, |_: &()| {
                if let Some(list) = by_review.get_mut(&review_id) {
                    list.retain(|r| r.id() != response_id);
                }
            })
            .await
    }
}
