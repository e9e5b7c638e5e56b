pub mod activity;
pub mod auth;
pub mod news;
pub mod response;
pub mod review;
pub mod user;

pub use activity::{Activity, ActivityDraft};
pub use auth::{LoginRequest, RegisterRequest, TokenPair};
pub use news::{NewsDraft, NewsItem};
pub use response::{Response, ResponseDraft};
pub use review::{Review, ReviewDraft};
pub use user::{ProfileUpdate, User, ROLE_ADMIN};

/// Anything a slice can look up, replace or remove by its server-assigned id.
pub trait Record {
    fn id(&self) -> i64;
}

/// Formats a backend timestamp as `dd.MM.yyyy HH:mm:ss`.
///
/// Accepts RFC 3339 and the naive `2024-05-01T08:30:00[.fff]` form the backend
/// emits for `LocalDateTime` columns. Anything else becomes `Invalid Date`.
pub fn display_timestamp(raw: &str) -> String {
    const OUT: &str = "%d.%m.%Y %H:%M:%S";
    let raw = raw.trim();

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format(OUT).to_string();
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(OUT).to_string();
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return dt.format(OUT).to_string();
        }
    }
    "Invalid Date".to_string()
}
