use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

use crate::models::TokenPair;

/// Bearer credentials of one browser session, mirrored from its cookies.
///
/// `changed` is raised whenever the pair is replaced or cleared so the session
/// layer knows to write fresh `Set-Cookie` headers on the way out.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    changed: bool,
}

impl Credentials {
    pub fn new(token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
            changed: false,
        }
    }

    pub fn store(&mut self, pair: TokenPair) {
        self.token = Some(pair.access_token);
        if pair.refresh_token.is_some() {
            self.refresh_token = pair.refresh_token;
        }
        self.changed = true;
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.refresh_token = None;
        self.changed = true;
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Returns and resets the change flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Reads `exp` out of a JWT payload without checking the signature; the
/// backend does that.
pub fn expires_at(token: &str) -> Option<i64> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .ok()?;
    serde_json::from_slice::<Claims>(&payload).ok()?.exp
}

/// Tokens without a readable `exp` are treated as live.
pub fn is_expired(token: &str, now: i64) -> bool {
    matches!(expires_at(token), Some(exp) if exp < now)
}

#[cfg(test)]
pub(crate) fn jwt_with_exp(exp: i64) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload =
        general_purpose::URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"anna","exp":{}}}"#, exp));
    format!("{}.{}.signature", header, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_expiry_from_jwt_payload() {
        let token = jwt_with_exp(1_700_000_000);
        assert_eq!(expires_at(&token), Some(1_700_000_000));
        assert!(is_expired(&token, 1_700_000_001));
        assert!(!is_expired(&token, 1_699_999_999));
    }

    #[test]
    fn opaque_tokens_never_count_as_expired() {
        assert_eq!(expires_at("not-a-jwt"), None);
        assert!(!is_expired("not-a-jwt", i64::MAX));
        assert!(!is_expired("a.b.c", 0));
    }

    #[test]
    fn storing_a_pair_keeps_old_refresh_token_when_none_is_issued() {
        let mut creds = Credentials::new(Some("old".into()), Some("refresh".into()));
        assert!(!creds.is_changed());

        creds.store(TokenPair {
            access_token: "new".into(),
            refresh_token: None,
        });
        assert_eq!(creds.token.as_deref(), Some("new"));
        assert_eq!(creds.refresh_token.as_deref(), Some("refresh"));
        assert!(creds.take_changed());
        assert!(!creds.is_changed());

        creds.clear();
        assert!(creds.token.is_none());
        assert!(creds.is_changed());
    }
}
