use std::collections::BTreeSet;

use crate::error::ApiError;
use crate::models::{Activity, ActivityDraft};
use crate::services::{activity_service, ApiClient};
use crate::store::slice::Slice;

#[derive(Debug, Clone, Default)]
pub struct ActivitiesState {
    pub list: Slice<Activity>,
    /// Activities the signed-in user takes part in.
    pub registered: BTreeSet<i64>,
}

impl ActivitiesState {
    pub fn is_registered(&self, activity_id: i64) -> bool {
        self.registered.contains(&activity_id)
    }

    pub async fn fetch_all(
        &mut self,
        api: &ApiClient,
        token: Option<&str>,
    ) -> Result<Vec<Activity>, ApiError> {
        self.list
            .fetch_all(activity_service::list_activities(api, token))
            .await
    }

    /// Returns the cached record, fetching the whole list once if it is missing.
    pub async fn find_or_fetch(
        &mut self,
        api: &ApiClient,
        token: Option<&str>,
        activity_id: i64,
    ) -> Result<Option<Activity>, ApiError> {
        if let Some(found) = self.list.find(activity_id) {
            return Ok(Some(found.clone()));
        }
        self.fetch_all(api, token).await?;
        Ok(self.list.find(activity_id).cloned())
    }

    pub async fn create(
        &mut self,
        api: &ApiClient,
        token: &str,
        draft: &ActivityDraft,
    ) -> Result<Activity, ApiError> {
        self.list
            .append(activity_service::create_activity(api, token, draft))
            .await
    }

    pub async fn update(
        &mut self,
        api: &ApiClient,
        token: &str,
        activity_id: i64,
        draft: &ActivityDraft,
    ) -> Result<Activity, ApiError> {
        self.list
            .replace(activity_service::update_activity(
                api,
                token,
                activity_id,
                draft,
            ))
            .await
    }

    pub async fn delete(
        &mut self,
        api: &ApiClient,
        token: &str,
        activity_id: i64,
    ) -> Result<(), ApiError> {
        self.list
            .remove(
                activity_id,
                activity_service::delete_activity(api, token, activity_id),
            )
            .await?;
        self.registered.remove(&activity_id);
        Ok(())
    }

    pub async fn fetch_registered(&mut self, api: &ApiClient, token: &str) -> Result<(), ApiError> {
        let registered = &mut self.registered;
        self.list
            .status
            .track(
                activity_service::registered_activity_ids(api, token),
                |ids: &Vec<i64>| *registered = ids.iter().copied().collect(),
            )
            .await
            .map(|_| ())
    }

    pub async fn join(
        &mut self,
        api: &ApiClient,
        token: &str,
        activity_id: i64,
    ) -> Result<(), ApiError> {
        let call = activity_service::join_activity(api, token, activity_id);
        self.settle_participation(activity_id, true, call).await
    }

    pub async fn leave(
        &mut self,
        api: &ApiClient,
        token: &str,
        activity_id: i64,
    ) -> Result<(), ApiError> {
        let call = activity_service::leave_activity(api, token, activity_id);
        self.settle_participation(activity_id, false, call).await
    }

    async fn settle_participation(
        &mut self,
        activity_id: i64,
        joined: bool,
        call: impl std::future::Future<Output = Result<(), ApiError>>,
    ) -> Result<(), ApiError> {
        let registered = &mut self.registered;
        self.list
            .status
            .track(call, |_: &()| {
                if joined {
                    registered.insert(activity_id);
                } else {
                    registered.remove(&activity_id);
                }
            })
            .await
    }
}
