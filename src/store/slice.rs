use std::future::Future;

use crate::error::ApiError;
use crate::models::Record;

/// Loading flag plus the latest error message of one slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStatus {
    pub is_loading: bool,
    pub error: Option<String>,
}

impl RequestStatus {
    pub fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub fn fulfil(&mut self) {
        self.is_loading = false;
    }

    pub fn reject(&mut self, err: &ApiError) {
        self.is_loading = false;
        self.error = Some(err.to_string());
    }

    /// Drives `call` through pending and settle, invoking `apply` only on success.
    pub async fn track<R, Fut>(
        &mut self,
        call: Fut,
        apply: impl FnOnce(&R),
    ) -> Result<R, ApiError>
    where
        Fut: Future<Output = Result<R, ApiError>>,
    {
        self.begin();
        let result = call.await;
        match &result {
            Ok(value) => {
                apply(value);
                self.fulfil();
            }
            Err(err) => self.reject(err),
        }
        result
    }
}

/// Client-side mirror of one backend collection.
#[derive(Debug, Clone)]
pub struct Slice<T> {
    pub records: Vec<T>,
    pub status: RequestStatus,
}

impl<T> Default for Slice<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            status: RequestStatus::default(),
        }
    }
}

impl<T: Record + Clone> Slice<T> {
    pub fn is_loading(&self) -> bool {
        self.status.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error.as_deref()
    }

    pub fn find(&self, id: i64) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Runs `call`; on success `apply` edits the records, on failure they stay
    /// exactly as they were.
    pub async fn run<R, Fut>(
        &mut self,
        call: Fut,
        apply: impl FnOnce(&mut Vec<T>, &R),
    ) -> Result<R, ApiError>
    where
        Fut: Future<Output = Result<R, ApiError>>,
    {
        let records = &mut self.records;
        self.status.track(call, |value| apply(records, value)).await
    }

    pub async fn fetch_all<Fut>(&mut self, call: Fut) -> Result<Vec<T>, ApiError>
    where
        Fut: Future<Output = Result<Vec<T>, ApiError>>,
    {
        self.run(call, |records, fetched: &Vec<T>| *records = fetched.clone())
            .await
    }

    pub async fn append<Fut>(&mut self, call: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.run(call, |records, created: &T| upsert_back(records, created))
            .await
    }

    pub async fn prepend<Fut>(&mut self, call: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.run(call, |records, created: &T| {
            records.retain(|r| r.id() != created.id());
            records.insert(0, created.clone());
        })
        .await
    }

    pub async fn replace<Fut>(&mut self, call: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.run(call, |records, updated: &T| replace_record(records, updated))
            .await
    }

    /// `call` resolves once the backend confirmed the delete of `id`.
    pub async fn remove<Fut>(&mut self, id: i64, call: Fut) -> Result<(), ApiError>
    where
        Fut: Future<Output = Result<(), ApiError>>,
    {
        self.run(call, |records, _: &()| records.retain(|r| r.id() != id))
            .await
    }
}

/// Appends `record`, dropping any stale copy with the same id so it appears once.
pub(crate) fn upsert_back<T: Record + Clone>(records: &mut Vec<T>, record: &T) {
    records.retain(|r| r.id() != record.id());
    records.push(record.clone());
}

/// Swaps in `record` where its id already sits; unknown ids are left alone.
pub(crate) fn replace_record<T: Record + Clone>(records: &mut [T], record: &T) {
    if let Some(slot) = records.iter_mut().find(|r| r.id() == record.id()) {
        *slot = record.clone();
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::models::Activity;

    fn activity(id: i64, title: &str) -> Activity {
        Activity {
            id,
            title: title.to_string(),
            address: "Park".to_string(),
            start_date: "2024-05-01".to_string(),
            description: String::new(),
            image: String::new(),
            author_id: Some(1),
        }
    }

    fn seeded() -> Slice<Activity> {
        Slice {
            records: vec![activity(1, "Chess"), activity(2, "Running")],
            status: RequestStatus::default(),
        }
    }

    #[tokio::test]
    async fn create_appends_the_server_record_once() {
        let mut slice = seeded();
        let created = slice
            .append(async { Ok(activity(9, "Yoga")) })
            .await
            .expect("create succeeds");

        assert_eq!(created.id, 9);
        assert_eq!(slice.records.len(), 3);
        assert_eq!(slice.records.iter().filter(|a| a.id == 9).count(), 1);
        assert!(!slice.is_loading());
        assert_eq!(slice.error(), None);
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let mut slice = seeded();
        slice.remove(1, async { Ok(()) }).await.expect("delete succeeds");

        assert!(slice.find(1).is_none());
        assert_eq!(slice.records, vec![activity(2, "Running")]);
    }

    #[tokio::test]
    async fn update_changes_exactly_one_record() {
        let mut slice = seeded();
        slice
            .replace(async { Ok(activity(2, "Trail running")) })
            .await
            .expect("update succeeds");

        assert_eq!(slice.records.len(), 2);
        assert_eq!(slice.records[0], activity(1, "Chess"));
        assert_eq!(slice.records[1].title, "Trail running");
    }

    #[tokio::test]
    async fn prepend_puts_new_record_first() {
        let mut slice = seeded();
        slice
            .prepend(async { Ok(activity(5, "Latest")) })
            .await
            .expect("create succeeds");
        assert_eq!(slice.records[0].id, 5);
        assert_eq!(slice.records.len(), 3);
    }

    #[tokio::test]
    async fn rejection_keeps_records_and_sets_error() {
        let mut slice = seeded();
        let before = slice.records.clone();

        let err = slice
            .append(async { Err(ApiError::server(StatusCode::BAD_REQUEST, "Title is too short")) })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Title is too short");
        assert_eq!(slice.records, before);
        assert_eq!(slice.error(), Some("Title is too short"));
        assert!(!slice.is_loading());
    }

    #[tokio::test]
    async fn a_new_request_clears_the_previous_error() {
        let mut slice = seeded();
        let _ = slice
            .fetch_all(async { Err(ApiError::Transport("refused".into())) })
            .await;
        assert!(slice.error().is_some());

        slice
            .fetch_all(async { Ok(vec![activity(3, "Swim")]) })
            .await
            .expect("fetch succeeds");
        assert_eq!(slice.error(), None);
        assert_eq!(slice.records.len(), 1);
    }

    #[test]
    fn status_is_loading_while_pending() {
        let mut status = RequestStatus {
            is_loading: false,
            error: Some("old".into()),
        };
        status.begin();
        assert!(status.is_loading);
        assert_eq!(status.error, None);
    }
}
