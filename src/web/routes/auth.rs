use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::forms::{
    self, FieldErrors, ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm,
    FORGOT_PASSWORD_SCHEMA, LOGIN_SCHEMA, REGISTER_SCHEMA, RESET_PASSWORD_SCHEMA,
};
use crate::services::auth_service;
use crate::store::ClientSession;
use crate::web::guard::{HOME_PATH, LOGIN_PATH};
use crate::web::session::SessionHandle;
use crate::web::state::AppState;
use crate::web::views::{render, LayoutView};

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub layout: LayoutView,
    pub username: String,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

fn login_page(session: &ClientSession, username: String, errors: FieldErrors) -> LoginTemplate {
    LoginTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        username,
        errors,
        error: session.store.auth.status.error.clone(),
    }
}

pub async fn login_page_handler(Extension(handle): Extension<SessionHandle>) -> Response {
    let session = handle.lock().await;
    render(&LoginTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        username: String::new(),
        errors: FieldErrors::default(),
        error: None,
    })
}

pub async fn login_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut guard = handle.lock().await;
    let session = &mut *guard;
    if let Err(errors) = forms::validate(&form, LOGIN_SCHEMA) {
        return render(&login_page(session, form.username, errors));
    }

    let request = form.to_request();
    match session
        .store
        .auth
        .login(&state.api, &mut session.credentials, &request)
        .await
    {
        Ok(user) => {
            info!("{} signed in", user.username);
            session.store.keep_only_auth();

            let target = if user.is_admin() { "/admin" } else { HOME_PATH };
            Redirect::to(target).into_response()
        }
        Err(e) => {
            warn!("Login for {} failed: {}", request.username, e);
            render(&login_page(session, form.username, FieldErrors::default()))
        }
    }
}

pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
) -> Response {
    let mut guard = handle.lock().await;
    let session = &mut *guard;
    session
        .store
        .auth
        .logout(&state.api, &mut session.credentials)
        .await;
    session.reset();
    Redirect::to(LOGIN_PATH).into_response()
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub layout: LayoutView,
    pub username: String,
    pub email: String,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

pub async fn register_page(Extension(handle): Extension<SessionHandle>) -> Response {
    let session = handle.lock().await;
    render(&RegisterTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        username: String::new(),
        email: String::new(),
        errors: FieldErrors::default(),
        error: None,
    })
}

pub async fn register_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let session = handle.lock().await;
    let page = |errors: FieldErrors, error: Option<String>| RegisterTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        username: form.username.clone(),
        email: form.email.clone(),
        errors,
        error,
    };

    if let Err(errors) = forms::validate(&form, REGISTER_SCHEMA) {
        return render(&page(errors, None));
    }

    match auth_service::register(&state.api, &form.to_request()).await {
        Ok(()) => {
            info!("Registered {}", form.username.trim());
            Redirect::to("/registration-confirmed").into_response()
        }
        Err(e) => render(&page(FieldErrors::default(), Some(e.to_string()))),
    }
}

#[derive(Template)]
#[template(path = "registration_confirmed.html")]
pub struct RegistrationConfirmedTemplate {
    pub layout: LayoutView,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfirmationQuery {
    pub code: Option<String>,
}

pub async fn registration_confirmed_handler(
    Extension(handle): Extension<SessionHandle>,
    Query(query): Query<ConfirmationQuery>,
) -> Response {
    let session = handle.lock().await;
    render(&RegistrationConfirmedTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        code: query.code.filter(|c| !c.is_empty()),
    })
}

#[derive(Template)]
#[template(path = "forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub layout: LayoutView,
    pub email: String,
    pub errors: FieldErrors,
    pub notice: Option<String>,
    pub error: Option<String>,
}

pub async fn forgot_password_page(Extension(handle): Extension<SessionHandle>) -> Response {
    let session = handle.lock().await;
    render(&ForgotPasswordTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        email: String::new(),
        errors: FieldErrors::default(),
        notice: None,
        error: None,
    })
}

pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let session = handle.lock().await;
    let mut page = ForgotPasswordTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        email: form.email.clone(),
        errors: FieldErrors::default(),
        notice: None,
        error: None,
    };

    if let Err(errors) = forms::validate(&form, FORGOT_PASSWORD_SCHEMA) {
        page.errors = errors;
        return render(&page);
    }

    match auth_service::forgot_password(&state.api, form.email.trim()).await {
        Ok(()) => {
            page.notice = Some("Password reset instructions have been sent to your email.".into());
            page.email.clear();
        }
        Err(e) => page.error = Some(e.to_string()),
    }
    render(&page)
}

#[derive(Template)]
#[template(path = "reset_password.html")]
pub struct ResetPasswordTemplate {
    pub layout: LayoutView,
    pub token: String,
    pub token_valid: bool,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ResetQuery {
    pub token: Option<String>,
}

pub async fn reset_password_page(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Query(query): Query<ResetQuery>,
) -> Response {
    let session = handle.lock().await;
    let token = query.token.unwrap_or_default();
    let mut page = ResetPasswordTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        token: token.clone(),
        token_valid: false,
        errors: FieldErrors::default(),
        error: None,
    };

    if token.is_empty() {
        page.error = Some("Invalid reset link".into());
        return render(&page);
    }

    match auth_service::validate_reset_token(&state.api, &token).await {
        Ok(()) => page.token_valid = true,
        Err(e) => page.error = Some(e.to_string()),
    }
    render(&page)
}

pub async fn reset_password_handler(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let session = handle.lock().await;
    let mut page = ResetPasswordTemplate {
        layout: LayoutView::for_auth(&session.store.auth),
        token: form.token.clone(),
        token_valid: !form.token.is_empty(),
        errors: FieldErrors::default(),
        error: None,
    };

    if form.token.is_empty() {
        page.error = Some("Invalid reset link".into());
        return render(&page);
    }
    if let Err(errors) = forms::validate(&form, RESET_PASSWORD_SCHEMA) {
        page.errors = errors;
        return render(&page);
    }

    match auth_service::reset_password(&state.api, &form.token, &form.password).await {
        Ok(()) => {
            info!("Password reset completed");
            Redirect::to(LOGIN_PATH).into_response()
        }
        Err(e) => {
            page.error = Some(e.to_string());
            render(&page)
        }
    }
}
