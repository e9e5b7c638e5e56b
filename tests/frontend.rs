//! Drives the real router against an in-memory REST backend.

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};

use clubactiv::config::AppConfig;
use clubactiv::web::{app, state::AppState};

#[derive(Default)]
struct Backend {
    activities: Vec<Value>,
    next_id: i64,
    registered: BTreeSet<i64>,
}

type Shared = Arc<Mutex<Backend>>;

fn user_for(token: &str) -> Option<Value> {
    match token {
        "tok-anna" | "tok-anna-fresh" => Some(json!({
            "id": 2,
            "username": "anna",
            "email": "anna@example.org",
            "roles": ["ROLE_USER"]
        })),
        "tok-bea" => Some(json!({
            "id": 3,
            "username": "bea",
            "email": "bea@example.org",
            "roles": ["ROLE_USER"]
        })),
        "tok-root" => Some(json!({
            "id": 1,
            "username": "root",
            "email": "root@example.org",
            "roles": ["ROLE_USER", "ROLE_ADMIN"]
        })),
        _ => None,
    }
}

fn bearer_user(headers: &HeaderMap) -> Option<Value> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(user_for)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Unauthorized" })),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if username == "bea" {
        // Slow enough for a second request to arrive while this one runs.
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    match (username, password) {
        ("anna" | "bea" | "root", "secret") => Json(json!({
            "accessToken": format!("tok-{}", username),
            "refreshToken": format!("ref-{}", username)
        }))
        .into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid username or password" })),
        )
            .into_response(),
    }
}

async fn refresh(Json(body): Json<Value>) -> Response {
    if body["refreshToken"] == "ref-anna" {
        Json(json!({ "accessToken": "tok-anna-fresh", "refreshToken": "ref-anna" })).into_response()
    } else {
        unauthorized()
    }
}

async fn me(headers: HeaderMap) -> Response {
    match bearer_user(&headers) {
        Some(user) => Json(user).into_response(),
        None => unauthorized(),
    }
}

async fn list_activities(State(backend): State<Shared>) -> Json<Vec<Value>> {
    let backend = backend.lock().unwrap();
    Json(backend.activities.clone())
}

async fn create_activity(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let Some(user) = bearer_user(&headers) else {
        return unauthorized();
    };
    let mut backend = backend.lock().unwrap();
    backend.next_id += 1;
    body["id"] = json!(backend.next_id);
    body["authorId"] = user["id"].clone();
    backend.activities.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn registered(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    if bearer_user(&headers).is_none() {
        return unauthorized();
    }
    let backend = backend.lock().unwrap();
    Json(json!(backend.registered)).into_response()
}

async fn add_user(
    State(backend): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if bearer_user(&headers).is_none() {
        return unauthorized();
    }
    backend.lock().unwrap().registered.insert(id);
    StatusCode::OK.into_response()
}

async fn remove_user(
    State(backend): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if bearer_user(&headers).is_none() {
        return unauthorized();
    }
    backend.lock().unwrap().registered.remove(&id);
    StatusCode::OK.into_response()
}

async fn update_user(Path(id): Path<i64>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let Some(mut user) = bearer_user(&headers) else {
        return unauthorized();
    };
    if user["id"] != id {
        return (StatusCode::FORBIDDEN, Json(json!({ "message": "Not your profile" })))
            .into_response();
    }
    user["username"] = body["username"].clone();
    user["email"] = body["email"].clone();
    Json(user).into_response()
}

async fn validate_reset_token(Query(query): Query<BTreeMap<String, String>>) -> Response {
    match query.get("token").map(String::as_str) {
        Some("good") => StatusCode::OK.into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Reset link has expired" })),
        )
            .into_response(),
    }
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

struct Harness {
    base: String,
    http: reqwest::Client,
    backend: Shared,
}

impl Harness {
    async fn start() -> Self {
        let shared = Shared::default();
        let backend = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/refresh", post(refresh))
            .route("/api/auth/me", get(me))
            .route("/api/activity", get(list_activities).post(create_activity))
            .route("/api/activity/user/registered-activities", get(registered))
            .route("/api/activity/:id/add-user", put(add_user))
            .route("/api/activity/:id/remove-user", delete(remove_user))
            .route("/api/users/:id", put(update_user))
            .route("/api/validate-reset-token", get(validate_reset_token))
            .with_state(shared.clone());
        let backend_addr = spawn(backend).await;

        let config = AppConfig {
            api_url: format!("http://{}", backend_addr),
            ..AppConfig::default()
        };
        let state = AppState::new(config).unwrap();
        let frontend_addr = spawn(app(state, "assets")).await;

        Self {
            base: format!("http://{}", frontend_addr),
            http: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap(),
            backend: shared,
        }
    }

    /// Puts an activity straight into the backend, authored by `author_id`.
    fn seed_activity(&self, title: &str, author_id: i64) -> i64 {
        let mut backend = self.backend.lock().unwrap();
        backend.next_id += 1;
        let id = backend.next_id;
        backend.activities.push(json!({
            "id": id,
            "title": title,
            "address": "Club house",
            "startDate": "2024-06-01",
            "description": "Weekly session",
            "image": "",
            "authorId": author_id
        }));
        id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str, jar: &Jar) -> reqwest::Response {
        self.http
            .get(self.url(path))
            .header(header::COOKIE, jar.header())
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, jar: &Jar, form: &[(&str, &str)]) -> reqwest::Response {
        self.http
            .post(self.url(path))
            .header(header::COOKIE, jar.header())
            .form(form)
            .send()
            .await
            .unwrap()
    }

    async fn login(&self, username: &str) -> Jar {
        let mut jar = Jar::default();
        let resp = self
            .post(
                "/login",
                &jar,
                &[("username", username), ("password", "secret")],
            )
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        jar.absorb(&resp);
        jar
    }
}

/// Just enough of a browser cookie store for these tests.
#[derive(Default)]
struct Jar(BTreeMap<String, String>);

impl Jar {
    fn absorb(&mut self, resp: &reqwest::Response) {
        for value in resp.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let pair = raw.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            if value.is_empty() {
                self.0.remove(name);
            } else {
                self.0.insert(name.to_string(), value.to_string());
            }
        }
    }

    fn header(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

fn location(resp: &reqwest::Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn guarded_pages_redirect_anonymous_visitors_to_login() {
    let h = Harness::start().await;
    let jar = Jar::default();

    for path in ["/dashBoard", "/activityList/addActivity", "/NewsList", "/admin"] {
        let resp = h.get(path, &jar).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{}", path);
        assert_eq!(location(&resp), "/login", "{}", path);
        let body = resp.text().await.unwrap();
        assert!(!body.contains("Hello,"), "{}", path);
    }

    let resp = h.get("/activityList", &jar).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_stores_credentials_in_cookies() {
    let h = Harness::start().await;
    let jar = h.login("anna").await;

    assert_eq!(jar.get("token"), Some("tok-anna"));
    assert_eq!(jar.get("refreshToken"), Some("ref-anna"));
    assert!(jar.get("sid").is_some());

    let body = h.get("/dashBoard", &jar).await.text().await.unwrap();
    assert!(body.contains("Hello, anna"));
}

#[tokio::test]
async fn wrong_password_shows_the_server_message() {
    let h = Harness::start().await;
    let jar = Jar::default();
    let resp = h
        .post("/login", &jar, &[("username", "anna"), ("password", "nope")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .text()
        .await
        .unwrap()
        .contains("Invalid username or password"));
}

#[tokio::test]
async fn adding_an_activity_opens_it_and_lists_it_once() {
    let h = Harness::start().await;
    let jar = h.login("anna").await;

    let resp = h
        .post(
            "/activityList/addActivity",
            &jar,
            &[
                ("title", "Yoga"),
                ("address", "Park"),
                ("startDate", "2024-05-01"),
                ("description", "Morning session"),
                ("image", ""),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/activityList/1");

    let body = h.get("/activityList", &jar).await.text().await.unwrap();
    assert_eq!(body.matches("<h3>Yoga</h3>").count(), 1);

    let detail = h.get("/activityList/1", &jar).await.text().await.unwrap();
    assert!(detail.contains("Morning session"));
}

#[tokio::test]
async fn invalid_activity_form_never_reaches_the_backend() {
    let h = Harness::start().await;
    let jar = h.login("anna").await;

    let resp = h
        .post(
            "/activityList/addActivity",
            &jar,
            &[("title", "Y"), ("address", ""), ("startDate", ""), ("description", "")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Minimum 2 characters"));
    assert!(body.contains("Address is required"));

    let list = h.get("/activityList", &jar).await.text().await.unwrap();
    assert!(list.contains("No activities match the search query."));
}

#[tokio::test]
async fn members_are_sent_home_from_admin_pages() {
    let h = Harness::start().await;
    let jar = h.login("anna").await;

    let resp = h.get("/admin/users", &jar).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn admins_land_on_the_admin_panel() {
    let h = Harness::start().await;
    let mut jar = Jar::default();
    let resp = h
        .post("/login", &jar, &[("username", "root"), ("password", "secret")])
        .await;
    assert_eq!(location(&resp), "/admin");
    jar.absorb(&resp);

    let resp = h.get("/admin", &jar).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Manage Users"));
}

#[tokio::test]
async fn expired_token_is_refreshed_and_written_back() {
    let h = Harness::start().await;

    let payload = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"sub":"anna","exp":1000}"#);
    let expired = format!("eyJhbGciOiJIUzI1NiJ9.{}.c2ln", payload);
    let mut jar = Jar::default();
    jar.0.insert("token".into(), expired);
    jar.0.insert("refreshToken".into(), "ref-anna".into());

    let resp = h.get("/dashBoard", &jar).await;
    assert_eq!(resp.status(), StatusCode::OK);
    jar.absorb(&resp);
    assert_eq!(jar.get("token"), Some("tok-anna-fresh"));
    assert!(resp.text().await.unwrap().contains("Hello, anna"));
}

#[tokio::test]
async fn unknown_paths_render_not_found() {
    let h = Harness::start().await;
    let resp = h.get("/no/such/page", &Jar::default()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_clears_the_credential_cookies() {
    let h = Harness::start().await;
    let mut jar = h.login("anna").await;

    let resp = h.post("/logout", &jar, &[]).await;
    assert_eq!(location(&resp), "/login");
    jar.absorb(&resp);
    assert_eq!(jar.get("token"), None);

    let resp = h.get("/dashBoard", &jar).await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn a_request_racing_the_login_keeps_the_new_token() {
    let h = Harness::start().await;
    let mut jar = Jar::default();
    let resp = h.get("/login", &jar).await;
    jar.absorb(&resp);
    assert!(jar.get("sid").is_some());

    let login = h.post("/login", &jar, &[("username", "bea"), ("password", "secret")]);
    let stale = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.get("/assets/app.css", &jar).await
    };
    let (login, stale) = tokio::join!(login, stale);

    assert_eq!(location(&login), "/");
    assert_eq!(stale.status(), StatusCode::OK);
    jar.absorb(&login);
    jar.absorb(&stale);
    assert_eq!(jar.get("token"), Some("tok-bea"));

    let body = h.get("/dashBoard", &jar).await.text().await.unwrap();
    assert!(body.contains("Hello, bea"));
}

#[tokio::test]
async fn participating_swaps_the_card_button() {
    let h = Harness::start().await;
    let id = h.seed_activity("Chess", 1);
    let jar = h.login("anna").await;
    let participate = format!("/activityList/{}/participate", id);
    let revoke = format!("/activityList/{}/revoke", id);

    let body = h.get("/activityList", &jar).await.text().await.unwrap();
    assert!(body.contains(&participate));
    assert!(!body.contains(&revoke));

    let resp = h.post(&participate, &jar, &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/activityList");
    let body = h.get("/activityList", &jar).await.text().await.unwrap();
    assert!(body.contains(&revoke));
    assert!(!body.contains(&participate));

    let resp = h
        .post(&revoke, &jar, &[("return_to", "/\\evil.example")])
        .await;
    assert_eq!(location(&resp), "/activityList");
    let body = h.get("/activityList", &jar).await.text().await.unwrap();
    assert!(body.contains(&participate));
}

#[tokio::test]
async fn search_narrows_the_activity_list() {
    let h = Harness::start().await;
    h.seed_activity("Yoga", 1);
    h.seed_activity("Football", 1);

    let body = h
        .get("/activityList?q=YO", &Jar::default())
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("<h3>Yoga</h3>"));
    assert!(!body.contains("<h3>Football</h3>"));
}

#[tokio::test]
async fn reset_page_needs_a_valid_token() {
    let h = Harness::start().await;
    let jar = Jar::default();

    let body = h.get("/reset-password", &jar).await.text().await.unwrap();
    assert!(body.contains("Invalid reset link"));
    assert!(!body.contains("name=\"password\""));

    let body = h
        .get("/reset-password?token=stale", &jar)
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Reset link has expired"));
    assert!(!body.contains("name=\"password\""));

    let body = h
        .get("/reset-password?token=good", &jar)
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("name=\"password\""));
}

#[tokio::test]
async fn renaming_yourself_signs_you_out() {
    let h = Harness::start().await;
    let mut jar = h.login("anna").await;

    let resp = h
        .post(
            "/editProfile",
            &jar,
            &[("username", "anna"), ("email", "anna@club.example")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Profile updated."));

    let resp = h
        .post(
            "/editProfile",
            &jar,
            &[("username", "annabel"), ("email", "anna@club.example")],
        )
        .await;
    assert_eq!(location(&resp), "/login");
    jar.absorb(&resp);
    assert_eq!(jar.get("token"), None);

    let resp = h.get("/dashBoard", &jar).await;
    assert_eq!(location(&resp), "/login");
}
