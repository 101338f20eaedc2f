use std::fmt;
use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Margin subtracted from `expires_at` before comparing with the current time,
/// so a credential is not handed out moments before the server rejects it.
pub const DEFAULT_EXPIRY_DELTA: Duration = Duration::from_secs(10);

/// A bearer credential plus the material needed to refresh it.
///
/// Values are never mutated after construction; a refresh yields a new
/// `Credential`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    token_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    refresh_token: String,
    /// `None` means the credential never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    extra: Map<String, Value>,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: Option<Timestamp>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: String::new(),
            refresh_token: refresh_token.into(),
            expires_at,
            extra: Map::new(),
        }
    }

    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns the raw access secret suitable for Authorization headers.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Authorization scheme, defaulting to `Bearer` and normalising the casing
    /// of well known schemes.
    pub fn token_type(&self) -> &str {
        let raw = self.token_type.as_str();
        if raw.is_empty() || raw.eq_ignore_ascii_case("bearer") {
            "Bearer"
        } else if raw.eq_ignore_ascii_case("mac") {
            "MAC"
        } else if raw.eq_ignore_ascii_case("basic") {
            "Basic"
        } else {
            raw
        }
    }

    /// Value for the `Authorization` header, e.g. `Bearer <access token>`.
    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.token_type(), self.access_token)
    }

    /// Reports whether the credential can still be used at `now`.
    ///
    /// An empty access token is never valid. A credential without an expiry is
    /// valid indefinitely; otherwise it must not expire within `expiry_delta`.
    pub fn is_valid_at(&self, now: Timestamp, expiry_delta: Duration) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        let Some(expires_at) = self.expires_at else {
            return true;
        };
        SignedDuration::try_from(expiry_delta)
            .ok()
            .and_then(|delta| expires_at.checked_sub(delta).ok())
            .is_some_and(|threshold| threshold > now)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Timestamp::now(), DEFAULT_EXPIRY_DELTA)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type())
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("extra", &self.extra)
            .finish()
    }
}
