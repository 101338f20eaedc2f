use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::context::Context;
use crate::errors::Error;
use crate::telemetry::refresh::{RefreshStage, RefreshTelemetry};

use super::{Clock, Credential, DEFAULT_EXPIRY_DELTA, RefreshFactory, SystemClock, UpdateHook};

/// Convenience result alias for cache operations.
pub type TokenCacheResult<T> = Result<T, Error>;

/// Tunables for a [`TokenCache`], built through [`TokenCacheConfig::new`] or
/// `Default`.
#[derive(Clone)]
pub struct TokenCacheConfig {
    /// How long before `expires_at` a credential is already treated as stale.
    expiry_delta: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCacheConfig {
    pub fn new(expiry_delta: Duration) -> Result<Self, Error> {
        if expiry_delta >= Duration::from_secs(24 * 60 * 60) {
            return Err(Error::Config("Expiry delta must be shorter than one day".into()));
        }
        Ok(Self {
            expiry_delta,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for TokenCacheConfig {
    fn default() -> Self {
        Self {
            expiry_delta: DEFAULT_EXPIRY_DELTA,
            clock: Arc::new(SystemClock),
        }
    }
}

/// Holds one credential and refreshes it lazily when a caller finds it stale.
///
/// The validity check, refresh, hook call and commit all run under a single
/// lock. Callers queued behind a refresh see the refreshed credential once
/// they get the lock, so a stale credential triggers one refresh no matter
/// how many callers race on it. The flip side is that a slow refresh stalls
/// every caller of this cache, and a queued caller does not give up when its
/// own context is cancelled.
pub struct TokenCache {
    current: Mutex<Arc<Credential>>,
    factory: Arc<dyn RefreshFactory>,
    hook: Arc<dyn UpdateHook>,
    expiry_delta: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCache {
    pub fn new(
        initial: Credential,
        factory: Arc<dyn RefreshFactory>,
        hook: Arc<dyn UpdateHook>,
    ) -> Self {
        Self::with_config(initial, factory, hook, TokenCacheConfig::default())
    }

    pub fn with_config(
        initial: Credential,
        factory: Arc<dyn RefreshFactory>,
        hook: Arc<dyn UpdateHook>,
        config: TokenCacheConfig,
    ) -> Self {
        Self {
            current: Mutex::new(Arc::new(initial)),
            factory,
            hook,
            expiry_delta: config.expiry_delta,
            clock: config.clock,
        }
    }

    /// Returns the cached credential, refreshing it first if it is no longer
    /// valid.
    ///
    /// `ctx` is handed as-is to the refresh factory and the update hook. A
    /// failed fetch or hook leaves the cached credential untouched and the
    /// error is returned unchanged, so the next call retries the refresh.
    pub async fn get(&self, ctx: &Context) -> TokenCacheResult<Arc<Credential>> {
        let mut current = self.current.lock().await;
        if current.is_valid_at(self.clock.now(), self.expiry_delta) {
            debug!(context_id = %ctx.id(), "token.valid");
            return Ok(Arc::clone(&*current));
        }

        let telemetry = RefreshTelemetry::new(ctx);
        telemetry.emit_start(current.expires_at());

        let source = self.factory.source(ctx, &current);
        let fresh = match source.fetch().await {
            Ok(fresh) => fresh,
            Err(err) => {
                telemetry.emit_failure(RefreshStage::Fetch, &err);
                return Err(err);
            }
        };

        if let Err(err) = self.hook.on_update(ctx, &fresh).await {
            telemetry.emit_failure(RefreshStage::Hook, &err);
            return Err(err);
        }

        if !fresh.is_valid_at(self.clock.now(), self.expiry_delta) {
            warn!(
                attempt_id = %telemetry.attempt_id(),
                expires_at = ?fresh.expires_at(),
                "refresh returned a credential that is already stale"
            );
        }

        let fresh = Arc::new(fresh);
        *current = Arc::clone(&fresh);
        telemetry.emit_success(fresh.expires_at());
        Ok(fresh)
    }

    /// Returns the cached credential without checking or refreshing it.
    pub async fn current(&self) -> Arc<Credential> {
        Arc::clone(&*self.current.lock().await)
    }
}
