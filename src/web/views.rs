use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{error, warn};

use crate::error::ApiError;
use crate::services::ApiClient;
use crate::store::{AuthState, ClientSession};
use crate::web::guard::LOGIN_PATH;

pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

/// Data every page hands to `base.html`.
pub struct LayoutView {
    pub links: Vec<NavLink>,
    pub username: Option<String>,
    pub build_id: &'static str,
}

impl LayoutView {
    pub fn for_auth(auth: &AuthState) -> Self {
        let mut links = vec![
            NavLink {
                label: "Home",
                href: "/",
            },
            NavLink {
                label: "Courses",
                href: "/activityList",
            },
        ];

        let user = auth.current_user();
        if user.is_some() {
            links.push(NavLink {
                label: "Dashboard",
                href: "/dashBoard",
            });
            links.push(NavLink {
                label: "Review",
                href: "/review",
            });
            links.push(NavLink {
                label: "News",
                href: "/NewsList",
            });
        }
        if auth.is_admin() {
            links.push(NavLink {
                label: "Admin",
                href: "/admin",
            });
        }

        Self {
            links,
            username: user.map(|u| u.username.clone()),
            build_id: crate::BUILD_ID,
        }
    }
}

pub fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template render failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

pub fn render_status<T: Template>(status: StatusCode, template: &T) -> Response {
    let mut response = render(template);
    if response.status().is_success() {
        *response.status_mut() = status;
    }
    response
}

pub fn to_login() -> Response {
    Redirect::to(LOGIN_PATH).into_response()
}

/// Bearer token for an authenticated action. Without a usable login this is
/// the redirect to the login page; a refresh that could not reach the backend
/// answers with its message instead.
pub async fn bearer(session: &mut ClientSession, api: &ApiClient) -> Result<String, Response> {
    session.access_token(api).await.map_err(|e| {
        if e.requires_login() {
            warn!("Action needs a login: {}", e);
            to_login()
        } else {
            warn!("Could not renew the access token: {}", e);
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    })
}

/// Ends the session and yields the login redirect when `err` means the
/// backend no longer accepts the credentials.
pub fn login_required(session: &mut ClientSession, err: &ApiError) -> Option<Response> {
    if !err.requires_login() {
        return None;
    }
    session.credentials.clear();
    session.store.auth.sign_out();
    Some(to_login())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn labels(layout: &LayoutView) -> Vec<&'static str> {
        layout.links.iter().map(|l| l.label).collect()
    }

    #[test]
    fn navigation_follows_the_auth_state() {
        let mut auth = AuthState::default();
        assert_eq!(labels(&LayoutView::for_auth(&auth)), ["Home", "Courses"]);

        auth.user = Some(User {
            id: 1,
            username: "anna".into(),
            email: "anna@example.org".into(),
            roles: vec!["ROLE_USER".into()],
            active: true,
        });
        auth.is_authenticated = true;
        let layout = LayoutView::for_auth(&auth);
        assert_eq!(
            labels(&layout),
            ["Home", "Courses", "Dashboard", "Review", "News"]
        );
        assert_eq!(layout.username.as_deref(), Some("anna"));

        if let Some(user) = auth.user.as_mut() {
            user.roles.push("ROLE_ADMIN".into());
        }
        assert_eq!(
            labels(&LayoutView::for_auth(&auth)),
            ["Home", "Courses", "Dashboard", "Review", "News", "Admin"]
        );
    }

    #[test]
    fn only_login_failures_end_the_session() {
        let mut session = ClientSession::default();
        session.credentials.token = Some("t".into());

        let forbidden = ApiError::server(StatusCode::FORBIDDEN, "Access denied");
        assert!(login_required(&mut session, &forbidden).is_none());
        assert!(session.credentials.token.is_some());

        let redirect = login_required(&mut session, &ApiError::Unauthenticated);
        assert!(redirect.is_some_and(|r| r.status() == StatusCode::SEE_OTHER));
        assert!(session.credentials.token.is_none());
    }
}
