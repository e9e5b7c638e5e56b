use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use tracing::{info, warn};

use crate::forms::{self, FieldErrors, TitledForm, NEWS_SCHEMA};
use crate::models::{Activity, User};
use crate::store::ClientSession;
use crate::web::routes::home::not_found_page;
use crate::web::routes::news::{news_views, NewsView};
use crate::web::session::SessionHandle;
use crate::web::state::AppState;
use crate::web::views::{bearer, login_required, render, LayoutView};

#[derive(Template)]
#[template(path = "admin_panel.html")]
pub struct AdminPanelTemplate {
    pub layout: LayoutView,
}

pub async fn admin_panel_handler(Extension(handle): Extension<SessionHandle>) -> Response {
    let session = handle.lock().await;
    render(&AdminPanelTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
    })
}

pub struct UserRowView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: String,
    pub active: bool,
    pub is_self: bool,
}

impl UserRowView {
    fn new(user: &User, current_id: Option<i64>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            roles: user.roles.join(", "),
            active: user.active,
            is_self: current_id == Some(user.id),
        }
    }
}

#[derive(Template)]
#[template(path = "admin_users.html")]
pub struct AdminUsersTemplate {
    pub layout: LayoutView,
    pub users: Vec<UserRowView>,
    pub is_loading: bool,
    pub error: Option<String>,
}

fn users_page(session: &ClientSession) -> AdminUsersTemplate {
    let current_id = session.store.auth.current_user().map(|u| u.id);
    let slice = &session.store.admin.users;
    AdminUsersTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        users: slice
            .records
            .iter()
            .map(|u| UserRowView::new(u, current_id))
            .collect(),
        is_loading: slice.is_loading(),
        error: slice.error().map(str::to_string),
    }
}

pub async fn users_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    if let Err(e) = session.store.admin.fetch_users(&state.api, &token).await {
        if let Some(redirect) = login_required(&mut session, &e) {
            return redirect;
        }
        warn!("User list load failed: {}", e);
    }
    render(&users_page(&session))
}

#[derive(Template)]
#[template(path = "admin_user.html")]
pub struct AdminUserTemplate {
    pub layout: LayoutView,
    pub user: Option<UserRowView>,
    pub error: Option<String>,
}

pub async fn user_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(user_id): Path<i64>,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    let result = session.store.admin.fetch_user(&state.api, &token, user_id).await;
    if let Err(e) = &result {
        if let Some(redirect) = login_required(&mut session, e) {
            return redirect;
        }
        if e.status() == Some(http::StatusCode::NOT_FOUND) {
            return not_found_page(&session);
        }
        warn!("User {} load failed: {}", user_id, e);
    }

    let current_id = session.store.auth.current_user().map(|u| u.id);
    render(&AdminUserTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        user: result.ok().map(|u| UserRowView::new(&u, current_id)),
        error: session.store.admin.users.error().map(str::to_string),
    })
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(user_id): Path<i64>,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    match session.store.admin.delete_user(&state.api, &token, user_id).await {
        Ok(()) => {
            info!("User {} deleted", user_id);
            Redirect::to("/admin/users").into_response()
        }
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            render(&users_page(&session))
        }
    }
}

#[derive(Template)]
#[template(path = "admin_activities.html")]
pub struct AdminActivitiesTemplate {
    pub layout: LayoutView,
    pub activities: Vec<Activity>,
    pub is_loading: bool,
    pub error: Option<String>,
}

fn activities_page(session: &ClientSession) -> AdminActivitiesTemplate {
    let slice = &session.store.activities.list;
    AdminActivitiesTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        activities: slice.records.clone(),
        is_loading: slice.is_loading(),
        error: slice.error().map(str::to_string),
    }
}

pub async fn activities_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    if let Err(e) = session
        .store
        .activities
        .fetch_all(&state.api, Some(token.as_str()))
        .await
    {
        if let Some(redirect) = login_required(&mut session, &e) {
            return redirect;
        }
        warn!("Activity list load failed: {}", e);
    }
    render(&activities_page(&session))
}

pub async fn delete_activity_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(activity_id): Path<i64>,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    match session
        .store
        .activities
        .delete(&state.api, &token, activity_id)
        .await
    {
        Ok(()) => {
            info!("Activity {} deleted", activity_id);
            Redirect::to("/admin/activities").into_response()
        }
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            render(&activities_page(&session))
        }
    }
}

#[derive(Template)]
#[template(path = "admin_news.html")]
pub struct AdminNewsTemplate {
    pub layout: LayoutView,
    pub news: Vec<NewsView>,
    pub form: TitledForm,
    pub errors: FieldErrors,
    pub is_loading: bool,
    pub error: Option<String>,
}

fn news_page(session: &ClientSession, form: TitledForm, errors: FieldErrors) -> AdminNewsTemplate {
    let slice = &session.store.news.list;
    AdminNewsTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        news: news_views(session),
        form,
        errors,
        is_loading: slice.is_loading(),
        error: slice.error().map(str::to_string),
    }
}

pub async fn news_handler(
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
    render(&news_page(&session, TitledForm::default(), FieldErrors::default()))
}

pub async fn create_news_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Form(form): Form<TitledForm>,
) -> Response {
    let mut session = handle.lock().await;
    if let Err(errors) = forms::validate(&form, NEWS_SCHEMA) {
        return render(&news_page(&session, form, errors));
    }

    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    let draft = form.to_news_draft();
    match session.store.news.create(&state.api, &token, &draft).await {
        Ok(created) => {
            info!("News {} published", created.id);
            Redirect::to("/admin/news").into_response()
        }
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            render(&news_page(&session, form, FieldErrors::default()))
        }
    }
}

#[derive(Template)]
#[template(path = "admin_news_edit.html")]
pub struct AdminNewsEditTemplate {
    pub layout: LayoutView,
    pub news_id: i64,
    pub form: TitledForm,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

fn news_edit_page(
    session: &ClientSession,
    news_id: i64,
    form: TitledForm,
    errors: FieldErrors,
) -> AdminNewsEditTemplate {
    AdminNewsEditTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        news_id,
        form,
        errors,
        error: session.store.news.list.error().map(str::to_string),
    }
}

pub async fn edit_news_page(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(news_id): Path<i64>,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    match session.store.news.fetch_one(&state.api, &token, news_id).await {
        Ok(item) => {
            let form = TitledForm {
                title: item.title,
                description: item.description,
            };
            render(&news_edit_page(&session, news_id, form, FieldErrors::default()))
        }
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            if e.status() == Some(http::StatusCode::NOT_FOUND) {
                return not_found_page(&session);
            }
            render(&news_edit_page(
                &session,
                news_id,
                TitledForm::default(),
                FieldErrors::default(),
            ))
        }
    }
}

pub async fn edit_news_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(news_id): Path<i64>,
    Form(form): Form<TitledForm>,
) -> Response {
    let mut session = handle.lock().await;
    if let Err(errors) = forms::validate(&form, NEWS_SCHEMA) {
        return render(&news_edit_page(&session, news_id, form, errors));
    }

    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    let draft = form.to_news_draft();
    match session
        .store
        .news
        .update(&state.api, &token, news_id, &draft)
        .await
    {
        Ok(_) => Redirect::to("/admin/news").into_response(),
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            render(&news_edit_page(&session, news_id, form, FieldErrors::default()))
        }
    }
}

pub async fn delete_news_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Path(news_id): Path<i64>,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    match session.store.news.delete(&state.api, &token, news_id).await {
        Ok(()) => Redirect::to("/admin/news").into_response(),
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            render(&news_page(&session, TitledForm::default(), FieldErrors::default()))
        }
    }
}
