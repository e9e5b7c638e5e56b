pub mod activity_service;
pub mod api_client;
pub mod auth_service;
pub mod news_service;
pub mod response_service;
pub mod review_service;
pub mod token;
pub mod user_service;

pub use api_client::ApiClient;
pub use token::Credentials;
