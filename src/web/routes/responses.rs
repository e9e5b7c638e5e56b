use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use tracing::warn;

use crate::forms::{self, FieldErrors, ResponseForm, RESPONSE_SCHEMA};
use crate::models::{display_timestamp, ResponseDraft, Review};
use crate::store::ClientSession;
use crate::web::session::SessionHandle;
use crate::web::state::AppState;
use crate::web::views::{bearer, login_required, render, to_login, LayoutView};

pub struct ResponseView {
    pub id: i64,
    pub content: String,
    pub created_by: String,
    pub created_at: String,
    pub can_delete: bool,
}

#[derive(Template)]
#[template(path = "responses.html")]
pub struct ResponsesTemplate {
    pub layout: LayoutView,
    pub review_id: i64,
    pub review: Option<Review>,
    pub responses: Vec<ResponseView>,
    pub signed_in: bool,
    pub form: ResponseForm,
    pub errors: FieldErrors,
    pub is_loading: bool,
    pub error: Option<String>,
}

fn responses_page(
    session: &ClientSession,
    review_id: i64,
    form: ResponseForm,
    errors: FieldErrors,
) -> ResponsesTemplate {
    let auth = &session.store.auth;
    let username = auth.current_user().map(|u| u.username.as_str());
    let state = &session.store.responses;
    ResponsesTemplate {
        layout: LayoutView::for_auth(auth),
        review_id,
        review: session.store.reviews.list.find(review_id).cloned(),
        responses: state
            .for_review(review_id)
            .iter()
            .map(|r| ResponseView {
                id: r.id,
                content: r.content.clone(),
                created_by: r.created_by.clone(),
                created_at: display_timestamp(&r.created_at),
                can_delete: auth.is_admin() || username == Some(r.created_by.as_str()),
            })
            .collect(),
        signed_in: username.is_some(),
        form,
        errors,
        is_loading: state.status.is_loading,
        error: state.status.error.clone(),
    }
}

pub async fn responses_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(review_id): Path<i64>,
) -> Response {
    let mut session = handle.lock().await;
    let token = session.optional_token(&state.api).await;

    if session.store.reviews.list.find(review_id).is_none() {
        if let Err(e) = session
            .store
            .reviews
            .fetch_all(&state.api, token.as_deref())
            .await
        {
            warn!("Review list load failed: {}", e);
        }
    }
    if let Err(e) = session
        .store
        .responses
        .fetch_for_review(&state.api, token.as_deref(), review_id)
        .await
    {
        warn!("Responses for review {} failed: {}", review_id, e);
    }

    render(&responses_page(
        &session,
        review_id,
        ResponseForm::default(),
        FieldErrors::default(),
    ))
}

pub async fn add_response_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(review_id): Path<i64>,
    Form(form): Form<ResponseForm>,
) -> Response {
    let mut session = handle.lock().await;
    if let Err(errors) = forms::validate(&form, RESPONSE_SCHEMA) {
        return render(&responses_page(&session, review_id, form, errors));
    }

    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };
    let Some(author) = session.store.auth.current_user().map(|u| u.id) else {
        return to_login();
    };

    let draft = ResponseDraft {
        content: form.content.trim().to_string(),
        created_by_id: author,
    };
    match session
        .store
        .responses
        .create(&state.api, &token, review_id, &draft)
        .await
    {
        Ok(_) => Redirect::to(&format!("/review/{}/responses", review_id)).into_response(),
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            render(&responses_page(&session, review_id, form, FieldErrors::default()))
        }
    }
}

pub async fn delete_response_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path((review_id, response_id)): Path<(i64, i64)>,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    match session
        .store
        .responses
        .delete(&state.api, &token, review_id, response_id)
        .await
    {
        Ok(()) => Redirect::to(&format!("/review/{}/responses", review_id)).into_response(),
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            render(&responses_page(
                &session,
                review_id,
                ResponseForm::default(),
                FieldErrors::default(),
            ))
        }
    }
}
