use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, Request, Response};
use tracing::debug;

use crate::context::Context;
use crate::errors::Error;
use crate::token::TokenCache;

/// Executes a request on behalf of a caller-supplied [`Context`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, ctx: &Context, request: Request) -> Result<Response, Error>;
}

/// Sends through `reqwest`, giving up once the context is cancelled or past its
/// deadline.
#[async_trait]
impl Transport for Client {
    async fn round_trip(&self, ctx: &Context, request: Request) -> Result<Response, Error> {
        ctx.run(async { self.execute(request).await.map_err(Error::from) }).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn round_trip(&self, ctx: &Context, request: Request) -> Result<Response, Error> {
        (**self).round_trip(ctx, request).await
    }
}

/// Wraps a base [`Transport`] and authorizes every request with the credential
/// held by a [`TokenCache`].
pub struct AuthTransport<T> {
    base: T,
    cache: Arc<TokenCache>,
}

impl<T: Transport> AuthTransport<T> {
    pub fn new(base: T, cache: Arc<TokenCache>) -> Self {
        Self { base, cache }
    }

    pub fn cache(&self) -> Arc<TokenCache> {
        Arc::clone(&self.cache)
    }

    /// Sends a copy of `request`, leaving the caller's request as it was.
    ///
    /// Requests with streaming bodies cannot be copied and are rejected with
    /// [`Error::UnclonableRequest`].
    pub async fn send(&self, ctx: &Context, request: &Request) -> Result<Response, Error> {
        let derived = request.try_clone().ok_or(Error::UnclonableRequest)?;
        self.round_trip(ctx, derived).await
    }
}

#[async_trait]
impl<T: Transport> Transport for AuthTransport<T> {
    async fn round_trip(&self, ctx: &Context, mut request: Request) -> Result<Response, Error> {
        let credential = self.cache.get(ctx).await?;
        let mut value = HeaderValue::from_str(&credential.authorization_value())?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        debug!(
            context_id = %ctx.id(),
            method = %request.method(),
            url = %request.url(),
            "transport.authorize"
        );
        self.base.round_trip(ctx, request).await
    }
}
