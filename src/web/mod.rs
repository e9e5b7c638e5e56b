pub mod guard;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, get_service, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::web::middleware::auth::{require_admin, require_auth};
use crate::web::routes::{activities, admin, auth, home, news, responses, reviews, user};
use crate::web::session::{attach_session, session_layer};
use crate::web::state::AppState;

/// The whole site. Every path appears in exactly one of the three routers.
pub fn app(state: AppState, assets_dir: &str) -> Router {
    let public_routes = Router::new()
        .route("/", get(home::home_handler))
        .route("/homePage", get(home::home_handler))
        .route("/activityList", get(activities::activity_list_handler))
        .route(
            "/activityList/:activity_id",
            get(activities::activity_detail_handler),
        )
        .route("/review", get(reviews::reviews_handler))
        .route(
            "/review/:review_id/responses",
            get(responses::responses_handler),
        )
        .route(
            "/login",
            get(auth::login_page_handler).post(auth::login_handler),
        )
        .route("/logout", post(auth::logout_handler))
        .route(
            "/register",
            get(auth::register_page).post(auth::register_handler),
        )
        .route(
            "/registration-confirmed",
            get(auth::registration_confirmed_handler),
        )
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password_handler),
        )
        .route(
            "/reset-password",
            get(auth::reset_password_page).post(auth::reset_password_handler),
        );

    let protected_routes = Router::new()
        .route(
            "/activityList/addActivity",
            get(activities::add_activity_page).post(activities::add_activity_handler),
        )
        .route(
            "/activityList/update/:activity_id",
            get(activities::edit_activity_page).post(activities::edit_activity_handler),
        )
        .route(
            "/activityList/:activity_id/participate",
            post(activities::participate_handler),
        )
        .route(
            "/activityList/:activity_id/revoke",
            post(activities::revoke_handler),
        )
        .route("/review/add", post(reviews::add_review_handler))
        .route(
            "/review/:review_id/edit",
            get(reviews::edit_review_page).post(reviews::edit_review_handler),
        )
        .route(
            "/review/:review_id/delete",
            post(reviews::delete_review_handler),
        )
        .route(
            "/review/:review_id/responses/add",
            post(responses::add_response_handler),
        )
        .route(
            "/review/:review_id/responses/:response_id/delete",
            post(responses::delete_response_handler),
        )
        .route("/NewsList", get(news::news_list_handler))
        .route("/dashBoard", get(user::dashboard_handler))
        .route(
            "/editProfile",
            get(user::edit_profile_page).post(user::edit_profile_handler),
        )
        .route_layer(from_fn(require_auth));

    let admin_routes = Router::new()
        .route("/admin", get(admin::admin_panel_handler))
        .route("/admin/users", get(admin::users_handler))
        .route("/admin/users/:user_id", get(admin::user_handler))
        .route(
            "/admin/users/:user_id/delete",
            post(admin::delete_user_handler),
        )
        .route("/admin/activities", get(admin::activities_handler))
        .route(
            "/admin/activities/:activity_id/delete",
            post(admin::delete_activity_handler),
        )
        .route(
            "/admin/news",
            get(admin::news_handler).post(admin::create_news_handler),
        )
        .route(
            "/admin/news/:news_id/edit",
            get(admin::edit_news_page).post(admin::edit_news_handler),
        )
        .route(
            "/admin/news/:news_id/delete",
            post(admin::delete_news_handler),
        )
        .route_layer(from_fn(require_admin));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .nest_service(
            "/assets",
            get_service(ServeDir::new(assets_dir)).layer(SetResponseHeaderLayer::if_not_present(
                CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            )),
        )
        .fallback(home::not_found_handler)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .layer(from_fn_with_state(state.clone(), attach_session))
        .layer(session_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
