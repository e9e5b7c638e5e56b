use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::forms::{self, ActivityForm, FieldErrors, ACTIVITY_SCHEMA};
use crate::models::{Activity, ActivityDraft};
use crate::store::ClientSession;
use crate::web::routes::home::not_found_page;
use crate::web::session::SessionHandle;
use crate::web::state::AppState;
use crate::web::views::{bearer, login_required, render, LayoutView};

pub struct ActivityCardView {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub start_date: String,
    pub can_edit: bool,
    pub registered: bool,
}

#[derive(Template)]
#[template(path = "activity_list.html")]
pub struct ActivityListTemplate {
    pub layout: LayoutView,
    pub activities: Vec<ActivityCardView>,
    pub query: String,
    pub signed_in: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ActivityListQuery {
    #[serde(default)]
    pub q: String,
}

/// Case-insensitive title match; an empty query matches everything.
pub fn matches_query(activity: &Activity, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty() || activity.title.to_lowercase().contains(&query)
}

fn card(session: &ClientSession, activity: &Activity) -> ActivityCardView {
    let user_id = session.store.auth.current_user().map(|u| u.id);
    ActivityCardView {
        id: activity.id,
        title: activity.title.clone(),
        image: activity.image.clone(),
        start_date: activity.start_date.clone(),
        can_edit: user_id.is_some() && activity.author_id == user_id,
        registered: session.store.activities.is_registered(activity.id),
    }
}

fn list_page(session: &ClientSession, query: &str) -> ActivityListTemplate {
    let slice = &session.store.activities.list;
    ActivityListTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        activities: slice
            .records
            .iter()
            .filter(|a| matches_query(a, query))
            .map(|a| card(session, a))
            .collect(),
        query: query.to_string(),
        signed_in: session.store.auth.current_user().is_some(),
        is_loading: slice.is_loading(),
        error: slice.error().map(str::to_string),
    }
}

async fn load_registered(session: &mut ClientSession, state: &AppState, token: Option<&str>) {
    let Some(token) = token else {
        return;
    };
    if session.store.auth.current_user().is_none() {
        return;
    }
    if let Err(e) = session
        .store
        .activities
        .fetch_registered(&state.api, token)
        .await
    {
        warn!("Registered activities load failed: {}", e);
    }
}

pub async fn activity_list_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Query(query): Query<ActivityListQuery>,
) -> Response {
    let mut session = handle.lock().await;
    let token = session.optional_token(&state.api).await;

    load_registered(&mut session, &state, token.as_deref()).await;
    if let Err(e) = session
        .store
        .activities
        .fetch_all(&state.api, token.as_deref())
        .await
    {
        warn!("Activity list load failed: {}", e);
    }

    render(&list_page(&session, &query.q))
}

#[derive(Template)]
#[template(path = "activity_detail.html")]
pub struct ActivityDetailTemplate {
    pub layout: LayoutView,
    pub activity: Activity,
    pub signed_in: bool,
    pub can_edit: bool,
    pub registered: bool,
    pub error: Option<String>,
}

fn detail_page(session: &ClientSession, activity: Activity) -> ActivityDetailTemplate {
    let view = card(session, &activity);
    ActivityDetailTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        signed_in: session.store.auth.current_user().is_some(),
        can_edit: view.can_edit,
        registered: view.registered,
        error: session.store.activities.list.error().map(str::to_string),
        activity,
    }
}

pub async fn activity_detail_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(activity_id): Path<i64>,
) -> Response {
    let mut session = handle.lock().await;
    let token = session.optional_token(&state.api).await;
    load_registered(&mut session, &state, token.as_deref()).await;

    let found = session
        .store
        .activities
        .find_or_fetch(&state.api, token.as_deref(), activity_id)
        .await;

    match found {
        Ok(Some(activity)) => render(&detail_page(&session, activity)),
        Ok(None) => not_found_page(&session),
        Err(e) => {
            warn!("Activity {} load failed: {}", activity_id, e);
            render(&list_page(&session, ""))
        }
    }
}

#[derive(Template)]
#[template(path = "activity_form.html")]
pub struct ActivityFormTemplate {
    pub layout: LayoutView,
    pub heading: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub form: ActivityForm,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

fn add_form(session: &ClientSession, form: ActivityForm, errors: FieldErrors) -> ActivityFormTemplate {
    ActivityFormTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        heading: "Add activity",
        action: "/activityList/addActivity".to_string(),
        submit_label: "Create",
        form,
        errors,
        error: None,
    }
}

fn edit_form(
    session: &ClientSession,
    activity_id: i64,
    form: ActivityForm,
    errors: FieldErrors,
) -> ActivityFormTemplate {
    ActivityFormTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        heading: "Edit activity",
        action: format!("/activityList/update/{}", activity_id),
        submit_label: "Save",
        form,
        errors,
        error: None,
    }
}

pub async fn add_activity_page(Extension(handle): Extension<SessionHandle>) -> Response {
    let session = handle.lock().await;
    render(&add_form(&session, ActivityForm::default(), FieldErrors::default()))
}

pub async fn add_activity_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Form(form): Form<ActivityForm>,
) -> Response {
    let mut session = handle.lock().await;
    if let Err(errors) = forms::validate(&form, ACTIVITY_SCHEMA) {
        return render(&add_form(&session, form, errors));
    }

    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    let draft = form.to_draft();
    match session
        .store
        .activities
        .create(&state.api, &token, &draft)
        .await
    {
        Ok(created) => {
            info!("Activity {} created", created.id);
            Redirect::to(&format!("/activityList/{}", created.id)).into_response()
        }
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            let mut page = add_form(&session, form, FieldErrors::default());
            page.error = Some(e.to_string());
            render(&page)
        }
    }
}

pub async fn edit_activity_page(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(activity_id): Path<i64>,
) -> Response {
    let mut session = handle.lock().await;
    let token = session.optional_token(&state.api).await;
    let found = session
        .store
        .activities
        .find_or_fetch(&state.api, token.as_deref(), activity_id)
        .await;

    match found {
        Ok(Some(activity)) => {
            let form = ActivityForm::from(&ActivityDraft::from(&activity));
            render(&edit_form(&session, activity_id, form, FieldErrors::default()))
        }
        Ok(None) => not_found_page(&session),
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            let mut page = edit_form(
                &session,
                activity_id,
                ActivityForm::default(),
                FieldErrors::default(),
            );
            page.error = Some(e.to_string());
            render(&page)
        }
    }
}

pub async fn edit_activity_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(activity_id): Path<i64>,
    Form(form): Form<ActivityForm>,
) -> Response {
    let mut session = handle.lock().await;
    if let Err(errors) = forms::validate(&form, ACTIVITY_SCHEMA) {
        return render(&edit_form(&session, activity_id, form, errors));
    }

    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    let draft = form.to_draft();
    match session
        .store
        .activities
        .update(&state.api, &token, activity_id, &draft)
        .await
    {
        Ok(updated) => Redirect::to(&format!("/activityList/{}", updated.id)).into_response(),
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            let mut page = edit_form(&session, activity_id, form, FieldErrors::default());
            page.error = Some(e.to_string());
            render(&page)
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ParticipationForm {
    pub return_to: Option<String>,
}

/// Only same-site relative paths are followed after a participation change.
/// Browsers read `\` as `/`, so no backslash may appear.
fn return_target(form: &ParticipationForm) -> &str {
    form.return_to
        .as_deref()
        .filter(|s| {
            s.starts_with('/') && !s.starts_with("//") && !s.contains("://") && !s.contains('\\')
        })
        .unwrap_or("/activityList")
}

pub async fn participate_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(activity_id): Path<i64>,
    Form(form): Form<ParticipationForm>,
) -> Response {
    participation(state, handle, activity_id, form, true).await
}

pub async fn revoke_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(activity_id): Path<i64>,
    Form(form): Form<ParticipationForm>,
) -> Response {
    participation(state, handle, activity_id, form, false).await
}

async fn participation(
    state: AppState,
    handle: SessionHandle,
    activity_id: i64,
    form: ParticipationForm,
    join: bool,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    let activities = &mut session.store.activities;
    let result = if join {
        activities.join(&state.api, &token, activity_id).await
    } else {
        activities.leave(&state.api, &token, activity_id).await
    };

    match result {
        Ok(()) => Redirect::to(return_target(&form)).into_response(),
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            warn!("Participation change for {} failed: {}", activity_id, e);
            render(&list_page(&session, ""))
        }
    }
}
