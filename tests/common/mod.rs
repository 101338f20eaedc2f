#![allow(dead_code)]

pub mod time;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};

use reactive_token::{Context, Credential, CredentialSource, Error, RefreshFactory, UpdateHook};

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub fn expiring_in(now: Timestamp, secs: i64) -> Option<Timestamp> {
    Some(now.checked_add(SignedDuration::from_secs(secs)).unwrap())
}

/// Source returning a fixed outcome, optionally after a delay.
pub struct ScriptedSource {
    outcome: Result<Credential, String>,
    delay: Duration,
}

#[async_trait]
impl CredentialSource for ScriptedSource {
    async fn fetch(&self) -> Result<Credential, Error> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone().map_err(Error::Refresh)
    }
}

/// Records every factory call together with the context and stale credential
/// it received.
pub struct RecordingFactory {
    outcomes: Mutex<Vec<Result<Credential, String>>>,
    delay: Duration,
    calls: AtomicUsize,
    contexts: Mutex<Vec<Context>>,
    stale: Mutex<Vec<Credential>>,
}

impl RecordingFactory {
    /// Yields `outcomes` in order; the last one repeats.
    pub fn new(outcomes: Vec<Result<Credential, String>>) -> Arc<Self> {
        Self::with_delay(outcomes, Duration::ZERO)
    }

    pub fn with_delay(outcomes: Vec<Result<Credential, String>>, delay: Duration) -> Arc<Self> {
        assert!(!outcomes.is_empty(), "at least one outcome");
        Arc::new(Self {
            outcomes: Mutex::new(outcomes),
            delay,
            calls: AtomicUsize::new(0),
            contexts: Mutex::new(Vec::new()),
            stale: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn contexts(&self) -> Vec<Context> {
        self.contexts.lock().unwrap().clone()
    }

    pub fn stale(&self) -> Vec<Credential> {
        self.stale.lock().unwrap().clone()
    }
}

impl RefreshFactory for RecordingFactory {
    fn source(&self, ctx: &Context, stale: &Credential) -> Box<dyn CredentialSource> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(ctx.clone());
        self.stale.lock().unwrap().push(stale.clone());
        let outcome = {
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.len() > 1 {
                outcomes.remove(0)
            } else {
                outcomes[0].clone()
            }
        };
        Box::new(ScriptedSource {
            outcome,
            delay: self.delay,
        })
    }
}

/// Hook recording what it observed; can be told to fail or to stall.
#[derive(Default)]
pub struct RecordingHook {
    fail_with: Mutex<Option<String>>,
    seen: Mutex<Vec<(Context, Credential)>>,
    delay: Duration,
}

impl RecordingHook {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub fn fail_with(&self, message: Option<&str>) {
        *self.fail_with.lock().unwrap() = message.map(str::to_string);
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn seen(&self) -> Vec<(Context, Credential)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateHook for RecordingHook {
    async fn on_update(&self, ctx: &Context, fresh: &Credential) -> Result<(), Error> {
        self.seen.lock().unwrap().push((ctx.clone(), fresh.clone()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(Error::Hook(message)),
            None => Ok(()),
        }
    }
}
