use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::errors::Error;

/// Per-call handle forwarded from callers into credential refreshes.
///
/// Clones share identity, values, deadline and cancellation state, so the
/// handle a source or hook receives is observably the one passed to
/// [`TokenCache::get`](crate::token::TokenCache::get).
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    id: Uuid,
    values: BTreeMap<String, String>,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl Context {
    /// A context with no values, no deadline and nobody to cancel it.
    pub fn background() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.inner.values.get(key).map(String::as_str)
    }

    pub fn cancel(&self) {
        self.inner.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Returns the reason the context is finished, if it is.
    pub fn err(&self) -> Option<Error> {
        if self.is_cancelled() {
            return Some(Error::Cancelled);
        }
        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> Error {
        match self.inner.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.inner.cancel.cancelled() => Error::Cancelled,
                _ = tokio::time::sleep_until(deadline) => Error::DeadlineExceeded,
            },
            None => {
                self.inner.cancel.cancelled().await;
                Error::Cancelled
            }
        }
    }

    /// Drives `fut` to completion unless the context finishes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            result = fut => result,
        }
    }

    /// True when both handles were cloned from the same context.
    pub fn ptr_eq(a: &Context, b: &Context) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        Context::ptr_eq(self, other)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.inner.id)
            .field("values", &self.inner.values)
            .field("deadline", &self.inner.deadline)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    values: BTreeMap<String, String>,
    deadline: Option<Instant>,
}

impl ContextBuilder {
    pub fn value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    pub fn build(self) -> Context {
        Context {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                values: self.values,
                deadline: self.deadline,
                cancel: CancellationToken::new(),
            }),
        }
    }
}
