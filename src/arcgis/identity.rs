//! Sign-in against the portal's token service and a process-wide store of
//! the resulting credentials.

use super::schema::{SelfResponse, TokenResponse};
use crate::config::ArcgisConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// A bearer token registered for one server.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub server: String,
    pub user_id: String,
    pub token: String,
    pub expires: Option<DateTime<Utc>>,
    pub full_name: Option<String>,
}

impl Credential {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Credentials keyed by server URL.
#[derive(Debug, Default)]
pub struct CredentialStore {
    credentials: Mutex<HashMap<String, Credential>>,
}

static SHARED_STORE: LazyLock<Arc<CredentialStore>> =
    LazyLock::new(|| Arc::new(CredentialStore::default()));

impl CredentialStore {
    /// The process-wide store.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED_STORE)
    }

    pub fn register_token(&self, credential: Credential) {
        let mut credentials = self.credentials.lock();
        credentials.insert(normalize_server(&credential.server), credential);
    }

    /// Unexpired credential for `server`. Expired entries are dropped.
    pub fn find_credential(&self, server: &str) -> Option<Credential> {
        let key = normalize_server(server);
        let mut credentials = self.credentials.lock();
        let expired = credentials.get(&key)?.is_expired();
        if expired {
            tracing::debug!(server = %key, "stored token has expired");
            credentials.remove(&key);
            return None;
        }
        credentials.get(&key).cloned()
    }

    pub fn destroy_credentials(&self) {
        self.credentials.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.lock().is_empty()
    }
}

fn normalize_server(server: &str) -> String {
    server.trim_end_matches('/').to_lowercase()
}

/// Username/password sign-in against the portal.
#[derive(Clone)]
pub struct IdentityManager {
    http: reqwest::Client,
    portal_url: String,
    referer: String,
    expiration_minutes: u32,
    store: Arc<CredentialStore>,
}

impl IdentityManager {
    pub fn new(http: reqwest::Client, config: &ArcgisConfig, store: Arc<CredentialStore>) -> Self {
        Self {
            http,
            portal_url: config.portal_url.trim_end_matches('/').to_string(),
            referer: config.referer.clone(),
            expiration_minutes: config.token_expiration_minutes,
            store,
        }
    }

    pub fn portal_url(&self) -> &str {
        &self.portal_url
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Exchange username and password for a token, register it, and look up
    /// the user's display name. A failed name lookup does not fail sign-in.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Credential> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::SignIn(
                "Please enter both username and password.".to_string(),
            ));
        }

        let expiration = self.expiration_minutes.to_string();
        let form = [
            ("username", username),
            ("password", password),
            ("referer", self.referer.as_str()),
            ("expiration", expiration.as_str()),
            ("f", "json"),
        ];
        tracing::debug!(portal = %self.portal_url, %username, "requesting token");
        let resp = self
            .http
            .post(format!("{}/generateToken", self.portal_url))
            .form(&form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::from_response("token service", resp).await);
        }
        let parsed: TokenResponse = resp.json().await?;
        let token = match (parsed.token, parsed.error) {
            (Some(token), _) if !token.is_empty() => token,
            (_, Some(err)) => return Err(Error::SignIn(err.summary())),
            _ => return Err(Error::SignIn("token service returned no token".to_string())),
        };

        let mut credential = Credential {
            server: self.portal_url.clone(),
            user_id: username.to_string(),
            token,
            expires: parsed.expires.and_then(DateTime::<Utc>::from_timestamp_millis),
            full_name: None,
        };
        self.store.register_token(credential.clone());

        match self.fetch_full_name(&credential.token).await {
            Ok(name) => credential.full_name = name,
            Err(e) => tracing::warn!(error = %e, "could not fetch user profile"),
        }
        self.store.register_token(credential.clone());
        tracing::info!(user = %credential.user_id, "signed in");
        Ok(credential)
    }

    async fn fetch_full_name(&self, token: &str) -> Result<Option<String>> {
        let resp = self
            .http
            .get(format!("{}/community/self", self.portal_url))
            .query(&[("f", "json"), ("token", token)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::from_response("community", resp).await);
        }
        let parsed: SelfResponse = resp.json().await?;
        Ok(parsed
            .full_name
            .or(parsed.username)
            .filter(|name| !name.trim().is_empty()))
    }

    /// Current token for the portal, if signed in.
    pub fn token(&self) -> Option<String> {
        self.store
            .find_credential(&self.portal_url)
            .map(|credential| credential.token)
    }

    pub fn sign_out(&self) {
        self.store.destroy_credentials();
        tracing::info!("signed out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn credential(server: &str, expires: Option<DateTime<Utc>>) -> Credential {
        Credential {
            server: server.to_string(),
            user_id: "jdoe".to_string(),
            token: "tok".to_string(),
            expires,
            full_name: None,
        }
    }

    #[test]
    fn find_ignores_trailing_slash_and_case() {
        let store = CredentialStore::default();
        store.register_token(credential("https://www.arcgis.com/sharing/rest/", None));
        assert!(store
            .find_credential("https://WWW.arcgis.com/sharing/rest")
            .is_some());
    }

    #[test]
    fn expired_credentials_are_dropped() {
        let store = CredentialStore::default();
        store.register_token(credential("a", Some(Utc::now() - Duration::minutes(1))));
        assert!(store.find_credential("a").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn destroy_clears_everything() {
        let store = CredentialStore::default();
        store.register_token(credential("a", Some(Utc::now() + Duration::hours(1))));
        store.register_token(credential("b", None));
        store.destroy_credentials();
        assert!(store.find_credential("a").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn expiry_is_inclusive() {
        let now = Utc::now();
        let c = credential("a", Some(now));
        assert!(c.is_expired_at(now));
        assert!(!c.is_expired_at(now - Duration::seconds(1)));
    }

    #[tokio::test]
    async fn blank_credentials_fail_before_any_request() {
        let manager = IdentityManager::new(
            reqwest::Client::new(),
            &ArcgisConfig {
                portal_url: "http://127.0.0.1:9".to_string(),
                ..ArcgisConfig::default()
            },
            Arc::new(CredentialStore::default()),
        );
        let err = manager.sign_in("  ", "secret").await.unwrap_err();
        assert!(matches!(err, Error::SignIn(_)));
        let err = manager.sign_in("jdoe", "").await.unwrap_err();
        assert!(matches!(err, Error::SignIn(_)));
    }
}
