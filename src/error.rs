use http::StatusCode;

/// Every failure of a backend call, normalized so views can show `to_string()`
/// verbatim.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Error connecting to server: {0}")]
    Transport(String),

    #[error("{message}")]
    Server { status: StatusCode, message: String },

    #[error("Authorization token is either missing or expired")]
    Unauthenticated,

    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn server(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The visitor has to sign in (again) before this can succeed.
    pub fn requires_login(&self) -> bool {
        match self {
            Self::Unauthenticated => true,
            Self::Server { status, .. } => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
