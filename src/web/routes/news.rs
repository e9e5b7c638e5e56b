use askama::Template;
use axum::{extract::State, response::Response, Extension};
use tracing::warn;

use crate::models::{display_timestamp, NewsItem};
use crate::store::ClientSession;
use crate::web::session::SessionHandle;
use crate::web::state::AppState;
use crate::web::views::{bearer, login_required, render, LayoutView};

pub struct NewsView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_by: String,
    pub created_at: String,
}

impl From<&NewsItem> for NewsView {
    fn from(item: &NewsItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            created_by: item.created_by.clone(),
            created_at: display_timestamp(&item.created_at),
        }
    }
}

pub fn news_views(session: &ClientSession) -> Vec<NewsView> {
    session
        .store
        .news
        .list
        .records
        .iter()
        .map(NewsView::from)
        .collect()
}

#[derive(Template)]
#[template(path = "news.html")]
pub struct NewsTemplate {
    pub layout: LayoutView,
    pub news: Vec<NewsView>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub async fn news_list_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    if let Err(e) = session.store.news.fetch_all(&state.api, &token).await {
        if let Some(redirect) = login_required(&mut session, &e) {
            return redirect;
        }
        warn!("News load failed: {}", e);
    }

    let list = &session.store.news.list;
    render(&NewsTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        news: news_views(&session),
        is_loading: list.is_loading(),
        error: list.error().map(str::to_string),
    })
}
