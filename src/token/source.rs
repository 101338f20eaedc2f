use std::future::Future;

use async_trait::async_trait;

use crate::context::Context;
use crate::errors::Error;

use super::Credential;

/// Fetches a replacement credential. Errors are handed back to callers of
/// [`TokenCache::get`](super::TokenCache::get) untouched.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self) -> Result<Credential, Error>;
}

/// Builds the source used to refresh a stale credential.
///
/// Called at most once per refresh and never for a credential that is still
/// valid. Implementations receive `stale` by reference and must copy whatever
/// they need from it.
pub trait RefreshFactory: Send + Sync {
    fn source(&self, ctx: &Context, stale: &Credential) -> Box<dyn CredentialSource>;
}

impl<F> RefreshFactory for F
where
    F: Fn(&Context, &Credential) -> Box<dyn CredentialSource> + Send + Sync,
{
    fn source(&self, ctx: &Context, stale: &Credential) -> Box<dyn CredentialSource> {
        self(ctx, stale)
    }
}

/// Side effect run once per successful refresh, before the new credential is
/// committed and while the cache lock is held.
///
/// Must not call back into the same cache: the lock is not reentrant.
#[async_trait]
pub trait UpdateHook: Send + Sync {
    async fn on_update(&self, ctx: &Context, fresh: &Credential) -> Result<(), Error>;
}

#[async_trait]
impl<F> UpdateHook for F
where
    F: Fn(&Context, &Credential) -> Result<(), Error> + Send + Sync,
{
    async fn on_update(&self, ctx: &Context, fresh: &Credential) -> Result<(), Error> {
        self(ctx, fresh)
    }
}

/// Hook for callers that do not persist refreshed credentials.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHook;

#[async_trait]
impl UpdateHook for NoopHook {
    async fn on_update(&self, _ctx: &Context, _fresh: &Credential) -> Result<(), Error> {
        Ok(())
    }
}

/// Always yields the same credential.
#[derive(Clone, Debug)]
pub struct StaticSource {
    credential: Credential,
}

impl StaticSource {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl CredentialSource for StaticSource {
    async fn fetch(&self) -> Result<Credential, Error> {
        Ok(self.credential.clone())
    }
}

/// Adapts an async closure into a [`CredentialSource`].
pub struct FnSource<F> {
    fetch: F,
}

impl<F, Fut> FnSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Credential, Error>> + Send,
{
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl<F, Fut> CredentialSource for FnSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Credential, Error>> + Send,
{
    async fn fetch(&self) -> Result<Credential, Error> {
        (self.fetch)().await
    }
}
