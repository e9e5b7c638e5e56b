use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::services::ApiClient;
use crate::web::session::Sessions;

#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub sessions: Sessions,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(config.api_url.clone())?;
        let sessions = Sessions::new(config.session_idle);
        Ok(Self {
            api,
            sessions,
            config: Arc::new(config),
        })
    }
}
