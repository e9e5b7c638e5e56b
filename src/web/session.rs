use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::{Cookie, SameSite};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard, OwnedMutexGuard};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use tracing::{debug, error, warn};

use crate::config::AppConfig;
use crate::services::Credentials;
use crate::store::ClientSession;
use crate::web::middleware::auth::ensure_current_user;
use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "sid";
pub const TOKEN_COOKIE: &str = "token";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Key under which the cookie session remembers its [`ClientSession`].
const CLIENT_KEY: &str = "client";

/// Shared handle to one browser's [`ClientSession`].
///
/// [`attach_session`] takes the browser's turn before anything else and keeps
/// it until the response cookies are written, so the requests of one browser
/// run one after another. Code running inside a request locks the state
/// freely.
#[derive(Clone, Default)]
pub struct SessionHandle {
    turn: Arc<AsyncMutex<()>>,
    state: Arc<AsyncMutex<ClientSession>>,
}

impl SessionHandle {
    pub async fn begin(&self) -> OwnedMutexGuard<()> {
        self.turn.clone().lock_owned().await
    }

    pub async fn lock(&self) -> MutexGuard<'_, ClientSession> {
        self.state.lock().await
    }
}

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Client stores of live browser sessions, keyed by the id kept in the
/// cookie session.
#[derive(Clone)]
pub struct Sessions {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    idle: Duration,
}

impl Sessions {
    pub fn new(idle: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            idle,
        }
    }

    /// Handle for `key`, created on first use. Stores nobody touched for the
    /// idle period are dropped on the way.
    pub fn handle(&self, key: &str) -> SessionHandle {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let idle = self.idle;
        entries.retain(|k, entry| k == key || now.duration_since(entry.last_seen) < idle);

        let entry = entries.entry(key.to_string()).or_insert_with(|| {
            debug!("Opened client store for session {}", key);
            Entry {
                handle: SessionHandle::default(),
                last_seen: now,
            }
        });
        entry.last_seen = now;
        entry.handle.clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Cookie session layer: issues the `sid` cookie and forgets it after the
/// configured inactivity.
pub fn session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore> {
    let idle = time::Duration::try_from(config.session_idle).unwrap_or(time::Duration::MAX);
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(config.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(idle))
}

/// Id of the client store behind this cookie session, issued on first visit.
async fn client_key(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(key) = session.get::<String>(CLIENT_KEY).await? {
        return Ok(key);
    }
    let key = uuid::Uuid::new_v4().simple().to_string();
    session.insert(CLIENT_KEY, &key).await?;
    Ok(key)
}

/// Binds the request to its client store, syncs credentials with the cookies
/// and writes changed cookies back on the response. Runs inside
/// [`session_layer`].
pub async fn attach_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(cookie_session) = request.extensions().get::<Session>().cloned() else {
        error!("Request reached attach_session without a cookie session");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let key = match client_key(&cookie_session).await {
        Ok(key) => key,
        Err(e) => {
            error!("Session lookup failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let headers = request.headers();
    let incoming = Credentials::new(
        cookie_value(headers, TOKEN_COOKIE),
        cookie_value(headers, REFRESH_COOKIE),
    );

    let handle = state.sessions.handle(&key);
    let _turn = handle.begin().await;
    {
        let mut session = handle.lock().await;
        if session.credentials.token != incoming.token {
            // Signed in elsewhere, signed out, or cookies cleared.
            session.store.auth.sign_out();
        }
        session.credentials = incoming;
        ensure_current_user(&mut session, &state.api).await;
    }

    request.extensions_mut().insert(handle.clone());
    let mut response = next.run(request).await;

    let secure = state.config.secure_cookies;
    let headers = response.headers_mut();
    let mut session = handle.lock().await;
    if session.credentials.take_changed() {
        append_cookie(
            headers,
            credential_cookie(TOKEN_COOKIE, session.credentials.token.as_deref(), secure),
        );
        append_cookie(
            headers,
            credential_cookie(
                REFRESH_COOKIE,
                session.credentials.refresh_token.as_deref(),
                secure,
            ),
        );
    }

    response
}

/// Value of cookie `name` from any `Cookie` header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|hv| hv.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value_trimmed().to_string())
        .filter(|value| !value.is_empty())
}

fn base_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie
}

/// `Some` sets the credential, `None` expires it in the browser.
fn credential_cookie(name: &'static str, value: Option<&str>, secure: bool) -> Cookie<'static> {
    match value {
        Some(value) => base_cookie(name, value.to_string(), secure),
        None => {
            let mut cookie = base_cookie(name, String::new(), secure);
            cookie.make_removal();
            cookie
        }
    }
}

fn append_cookie(headers: &mut HeaderMap, cookie: Cookie<'static>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => warn!("Dropping unencodable cookie {}: {}", cookie.name(), e),
    }
}
