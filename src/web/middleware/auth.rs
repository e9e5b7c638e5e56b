use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use tracing::{debug, warn};

use crate::services::ApiClient;
use crate::store::ClientSession;
use crate::web::guard::{self, Access, GuardOutcome};
use crate::web::session::SessionHandle;

/// Loads the user behind the session's token when the store has none yet.
///
/// A token the backend rejects, or one that expired without a way to refresh
/// it, ends the session locally.
pub async fn ensure_current_user(session: &mut ClientSession, api: &ApiClient) {
    if session.credentials.token.is_none() || session.store.auth.current_user().is_some() {
        return;
    }

    let token = match session.access_token(api).await {
        Ok(token) => token,
        Err(e) => {
            debug!("No usable access token: {}", e);
            return;
        }
    };

    if let Err(e) = session.store.auth.load_current_user(api, &token).await {
        if e.requires_login() {
            session.credentials.clear();
        }
        warn!("Loading current user failed: {}", e);
    }
}

async fn guarded(access: Access, handle: SessionHandle, request: Request, next: Next) -> Response {
    let outcome = {
        let session = handle.lock().await;
        guard::evaluate(access, &session.store.auth)
    };

    match outcome {
        GuardOutcome::Render => next.run(request).await,
        GuardOutcome::Redirect(to) => {
            debug!("Guard redirects {} to {}", request.uri().path(), to);
            Redirect::to(to).into_response()
        }
    }
}

pub async fn require_auth(
    Extension(handle): Extension<SessionHandle>,
    request: Request,
    next: Next,
) -> Response {
    guarded(Access::Authenticated, handle, request, next).await
}

pub async fn require_admin(
    Extension(handle): Extension<SessionHandle>,
    request: Request,
    next: Next,
) -> Response {
    guarded(Access::Admin, handle, request, next).await
}
