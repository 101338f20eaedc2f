//! Lazily refreshing bearer credential cache and an HTTP transport that
//! authorizes requests with it.
//!
//! A [`TokenCache`] holds one [`Credential`]. [`TokenCache::get`] hands it out
//! while it is valid and otherwise refreshes it through a caller-supplied
//! [`RefreshFactory`], reports the new credential to an [`UpdateHook`] and
//! only then commits it. [`AuthTransport`] calls `get` for every request and
//! sets `Authorization: Bearer <access token>` before delegating to its base
//! [`Transport`].

pub mod context;
pub mod errors;
pub mod telemetry;
pub mod token;
pub mod transport;

pub use context::Context;
pub use errors::Error;
pub use token::{
    Credential, CredentialSource, FnSource, NoopHook, RefreshFactory, StaticSource, TokenCache,
    TokenCacheConfig, UpdateHook,
};
pub use transport::{AuthTransport, Transport};
