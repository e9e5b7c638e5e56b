use serde::{Deserialize, Serialize};

use super::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub author_id: Option<i64>,
}

impl Record for Activity {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Body of the create and update calls; the server assigns `id` and `authorId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    pub title: String,
    pub address: String,
    pub start_date: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl From<&Activity> for ActivityDraft {
    fn from(activity: &Activity) -> Self {
        Self {
            title: activity.title.clone(),
            address: activity.address.clone(),
            start_date: activity.start_date.clone(),
            description: activity.description.clone(),
            image: activity.image.clone(),
        }
    }
}
