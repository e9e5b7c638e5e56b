use crate::error::ApiError;
use crate::models::{NewsDraft, NewsItem};
use crate::services::{news_service, ApiClient};
use crate::store::slice::{replace_record, Slice};

#[derive(Debug, Clone, Default)]
pub struct NewsState {
    pub list: Slice<NewsItem>,
    /// Item loaded for the edit form.
    pub selected: Option<NewsItem>,
}

impl NewsState {
    pub async fn fetch_all(&mut self, api: &ApiClient, token: &str) -> Result<Vec<NewsItem>, ApiError> {
        self.list.fetch_all(news_service::list_news(api, token)).await
    }

    pub async fn fetch_one(
        &mut self,
        api: &ApiClient,
        token: &str,
        news_id: i64,
    ) -> Result<NewsItem, ApiError> {
        let selected = &mut self.selected;
        self.list
            .status
            .track(news_service::get_news(api, token, news_id), |item: &NewsItem| {
                *selected = Some(item.clone());
            })
            .await
    }

    /// Newest first: a created item goes to the top of the list.
    pub async fn create(
        &mut self,
        api: &ApiClient,
        token: &str,
        draft: &NewsDraft,
    ) -> Result<NewsItem, ApiError> {
        self.list
            .prepend(news_service::create_news(api, token, draft))
            .await
    }

    pub async fn update(
        &mut self,
        api: &ApiClient,
        token: &str,
        news_id: i64,
        draft: &NewsDraft,
    ) -> Result<NewsItem, ApiError> {
        self.settle_update(news_service::update_news(api, token, news_id, draft))
            .await
    }

    pub async fn delete(&mut self, api: &ApiClient, token: &str, news_id: i64) -> Result<(), ApiError> {
        self.settle_delete(news_id, news_service::delete_news(api, token, news_id))
            .await
    }

    async fn settle_update(
        &mut self,
        call: impl std::future::Future<Output = Result<NewsItem, ApiError>>,
    ) -> Result<NewsItem, ApiError> {
        let selected = &mut self.selected;
        let records = &mut self.list.records;
        self.list
            .status
            .track(call, |updated: &NewsItem| {
                replace_record(records, updated);
                if selected.as_ref().map(|s| s.id) == Some(updated.id) {
                    *selected = Some(updated.clone());
                }
            })
            .await
    }

    async fn settle_delete(
        &mut self,
        news_id: i64,
        call: impl std::future::Future<Output = Result<(), ApiError>>,
    ) -> Result<(), ApiError> {
        self.list.remove(news_id, call).await?;
        if self.selected.as_ref().map(|s| s.id) == Some(news_id) {
            self.selected = None;
        }
        Ok(())
    }
}
