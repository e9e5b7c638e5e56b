use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use tracing::{info, warn};

use crate::forms::{self, FieldErrors, ProfileForm, PROFILE_SCHEMA};
use crate::models::Activity;
use crate::store::ClientSession;
use crate::web::guard::LOGIN_PATH;
use crate::web::session::SessionHandle;
use crate::web::state::AppState;
use crate::web::views::{bearer, login_required, render, to_login, LayoutView};

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: LayoutView,
    pub username: String,
    pub email: String,
    pub joined: Vec<Activity>,
    pub authored: Vec<Activity>,
    pub error: Option<String>,
}

pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
) -> Response {
    let mut session = handle.lock().await;
    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };

    let activities = &mut session.store.activities;
    let loaded = match activities.fetch_registered(&state.api, &token).await {
        Ok(()) => activities
            .fetch_all(&state.api, Some(token.as_str()))
            .await
            .map(|_| ()),
        Err(e) => Err(e),
    };
    if let Err(e) = loaded {
        if let Some(redirect) = login_required(&mut session, &e) {
            return redirect;
        }
        warn!("Dashboard load failed: {}", e);
    }

    let Some(user) = session.store.auth.current_user() else {
        return to_login();
    };
    let activities = &session.store.activities;
    let (authored, others): (Vec<&Activity>, Vec<&Activity>) = activities
        .list
        .records
        .iter()
        .partition(|a| a.author_id == Some(user.id));

    render(&DashboardTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        username: user.username.clone(),
        email: user.email.clone(),
        joined: others
            .into_iter()
            .filter(|a| activities.is_registered(a.id))
            .cloned()
            .collect(),
        authored: authored.into_iter().cloned().collect(),
        error: activities.list.error().map(str::to_string),
    })
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub layout: LayoutView,
    pub form: ProfileForm,
    pub errors: FieldErrors,
    pub notice: Option<String>,
    pub error: Option<String>,
}

fn profile_page(session: &ClientSession, form: ProfileForm, errors: FieldErrors) -> ProfileTemplate {
    ProfileTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        form,
        errors,
        notice: None,
        error: session.store.auth.status.error.clone(),
    }
}

pub async fn edit_profile_page(Extension(handle): Extension<SessionHandle>) -> Response {
    let session = handle.lock().await;
    let Some(user) = session.store.auth.current_user() else {
        return to_login();
    };
    let form = ProfileForm {
        username: user.username.clone(),
        email: user.email.clone(),
    };
    render(&profile_page(&session, form, FieldErrors::default()))
}

pub async fn edit_profile_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let mut session = handle.lock().await;
    if let Err(errors) = forms::validate(&form, PROFILE_SCHEMA) {
        return render(&profile_page(&session, form, errors));
    }

    let token = match bearer(&mut session, &state.api).await {
        Ok(token) => token,
        Err(redirect) => return redirect,
    };
    let Some(previous) = session.store.auth.current_user().map(|u| u.username.clone()) else {
        return to_login();
    };

    let update = form.to_update();
    match session
        .store
        .auth
        .update_profile(&state.api, &token, &update)
        .await
    {
        Ok(user) if user.username != previous => {
            // The token names the old username, so it is useless from here on.
            info!("{} renamed to {}, signing out", previous, user.username);
            session.reset();
            Redirect::to(LOGIN_PATH).into_response()
        }
        Ok(user) => {
            let form = ProfileForm {
                username: user.username,
                email: user.email,
            };
            let mut page = profile_page(&session, form, FieldErrors::default());
            page.notice = Some("Profile updated.".into());
            render(&page)
        }
        Err(e) => {
            if let Some(redirect) = login_required(&mut session, &e) {
                return redirect;
            }
            render(&profile_page(&session, form, FieldErrors::default()))
        }
    }
}
