use serde::{Deserialize, Serialize};

use super::Record;

/// A reply posted under a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub review_id: Option<i64>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: String,
}

impl Record for Response {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseDraft {
    pub content: String,
    #[serde(rename = "created_byId")]
    pub created_by_id: i64,
}
