use askama::Template;
use axum::{http::StatusCode, response::Response, Extension};

use crate::store::ClientSession;
use crate::web::session::SessionHandle;
use crate::web::views::{render, render_status, LayoutView};

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: LayoutView,
    pub signed_in: bool,
}

pub async fn home_handler(Extension(handle): Extension<SessionHandle>) -> Response {
    let session = handle.lock().await;
    render(&HomeTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        signed_in: session.store.auth.current_user().is_some(),
    })
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: LayoutView,
}

pub fn not_found_page(session: &ClientSession) -> Response {
    render_status(
        StatusCode::NOT_FOUND,
        &NotFoundTemplate {
            layout: LayoutView::for_auth(&session.store.auth),
        },
    )
}

pub async fn not_found_handler(Extension(handle): Extension<SessionHandle>) -> Response {
    let session = handle.lock().await;
    not_found_page(&session)
}
