use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use tracing::warn;

use crate::forms::{self, FieldErrors, TitledForm, REVIEW_SCHEMA};
use crate::models::{display_timestamp, Review};
use crate::store::ClientSession;
use crate::web::routes::home::not_found_page;
use crate::web::session::SessionHandle;
use crate::web::state::AppState;
use crate::web::views::{bearer, login_required, render, LayoutView};

pub struct ReviewView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_by: String,
    pub created_at: String,
    pub can_manage: bool,
}

impl ReviewView {
    fn new(review: &Review, username: Option<&str>, is_admin: bool) -> Self {
        Self {
            id: review.id,
            title: review.title.clone(),
            description: review.description.clone(),
            created_by: review.created_by.clone(),
            created_at: display_timestamp(&review.created_at),
            can_manage: is_admin || username == Some(review.created_by.as_str()),
        }
    }
}

#[derive(Template)]
#[template(path = "reviews.html")]
pub struct ReviewsTemplate {
    pub layout: LayoutView,
    pub reviews: Vec<ReviewView>,
    pub signed_in: bool,
    pub form: TitledForm,
    pub errors: FieldErrors,
    pub is_loading: bool,
    pub error: Option<String>,
}

fn reviews_page(session: &ClientSession, form: TitledForm, errors: FieldErrors) -> ReviewsTemplate {
    let auth = &session.store.auth;
    let username = auth.current_user().map(|u| u.username.as_str());
    let slice = &session.store.reviews.list;
    ReviewsTemplate {
        layout: LayoutView::for_auth(auth),
        reviews: slice
            .records
            .iter()
            .map(|r| ReviewView::new(r, username, auth.is_admin()))
            .collect(),
        signed_in: username.is_some(),
        form,
        errors,
        is_loading: slice.is_loading(),
        error: slice.error().map(str::to_string),
    }
}

pub async fn reviews_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
) -> Response {
    let mut session = handle.lock().await;
    let token = session.optional_token(&state.api).await;
    if let Err(e) = session
        .store
        .reviews
        .fetch_all(&state.api, token.as_deref())
        .await
    {
        warn!("Review list load failed: {}", e);
    }
    render(&reviews_page(&session, TitledForm::default(), FieldErrors::default()))
}

pub async fn add_review_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Form(form): Form<TitledForm>,
) -> Response {
    let mut session = handle.lock().await;
    if let Err(errors) = forms::validate(&form, REVIEW_SCHEMA) {
        return render(&reviews_page(&session, form, errors));
    }

    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    let author = session.store.auth.current_user().map(|u| u.id);
    let draft = form.to_review_draft(author);
    match session.store.reviews.create(&state.api, &token, &draft).await {
        Ok(_) => Redirect::to("/review").into_response(),
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            render(&reviews_page(&session, form, FieldErrors::default()))
        }
    }
}

#[derive(Template)]
#[template(path = "review_edit.html")]
pub struct ReviewEditTemplate {
    pub layout: LayoutView,
    pub review_id: i64,
    pub form: TitledForm,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

fn edit_page(
    session: &ClientSession,
    review_id: i64,
    form: TitledForm,
    errors: FieldErrors,
) -> ReviewEditTemplate {
    ReviewEditTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        review_id,
        form,
        errors,
        error: session.store.reviews.list.error().map(str::to_string),
    }
}

pub async fn edit_review_page(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(review_id): Path<i64>,
) -> Response {
    let mut session = handle.lock().await;
    if session.store.reviews.list.find(review_id).is_none() {
        let token = session.optional_token(&state.api).await;
        if let Err(e) = session
            .store
            .reviews
            .fetch_all(&state.api, token.as_deref())
            .await
        {
            warn!("Review list load failed: {}", e);
        }
    }

    let Some(review) = session.store.reviews.list.find(review_id) else {
        return not_found_page(&session);
    };
    let form = TitledForm {
        title: review.title.clone(),
        description: review.description.clone(),
    };
    render(&edit_page(&session, review_id, form, FieldErrors::default()))
}

pub async fn edit_review_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(review_id): Path<i64>,
    Form(form): Form<TitledForm>,
) -> Response {
    let mut session = handle.lock().await;
    if let Err(errors) = forms::validate(&form, REVIEW_SCHEMA) {
        return render(&edit_page(&session, review_id, form, errors));
    }

    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    let draft = form.to_review_draft(None);
    match session
        .store
        .reviews
        .update(&state.api, &token, review_id, &draft)
        .await
    {
        Ok(_) => Redirect::to("/review").into_response(),
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            render(&edit_page(&session, review_id, form, FieldErrors::default()))
        }
    }
}

pub async fn delete_review_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(review_id): Path<i64>,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    match session.store.reviews.delete(&state.api, &token, review_id).await {
        Ok(()) => Redirect::to("/review").into_response(),
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            render(&reviews_page(&session, TitledForm::default(), FieldErrors::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review() -> Review {
        Review {
            id: 5,
            title: "Great club".into(),
            description: "Friendly people".into(),
            created_by: "anna".into(),
            created_at: "2024-05-01T09:30:00".into(),
        }
    }

    #[test]
    fn only_author_or_admin_manage_a_review() {
        assert!(ReviewView::new(&review(), Some("anna"), false).can_manage);
        assert!(ReviewView::new(&review(), Some("root"), true).can_manage);
        assert!(!ReviewView::new(&review(), Some("ben"), false).can_manage);
        assert!(!ReviewView::new(&review(), None, false).can_manage);
    }

    #[test]
    fn timestamps_are_formatted_for_display() {
        let view = ReviewView::new(&review(), None, false);
        assert_eq!(view.created_at, "01.05.2024 09:30:00");
    }
}
