use crate::store::AuthState;

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    Redirect(&'static str),
}

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Decides whether the view behind `access` may render for this auth state.
pub fn evaluate(access: Access, auth: &AuthState) -> GuardOutcome {
    let signed_in = auth
        .current_user()
        .is_some_and(|user| !user.username.is_empty());

    match access {
        Access::Public => GuardOutcome::Render,
        Access::Authenticated if signed_in => GuardOutcome::Render,
        Access::Admin if signed_in && auth.is_admin() => GuardOutcome::Render,
        Access::Admin if signed_in => GuardOutcome::Redirect(HOME_PATH),
        _ => GuardOutcome::Redirect(LOGIN_PATH),
    }
}
