use std::fmt;

use jiff::Timestamp;
use tracing::{Level, event};
use uuid::Uuid;

use crate::context::Context;
use crate::errors::Error;

/// Step of a refresh that produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshStage {
    Fetch,
    Hook,
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshStage::Fetch => write!(f, "fetch"),
            RefreshStage::Hook => write!(f, "hook"),
        }
    }
}

/// Emits the `refresh.*` events for one refresh attempt.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    context_id: Uuid,
}

impl RefreshTelemetry {
    pub fn new(ctx: &Context) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context_id: ctx.id(),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn emit_start(&self, stale_expiry: Option<Timestamp>) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context_id = %self.context_id,
            stale_expiry = ?stale_expiry,
            "refresh.start"
        );
    }

    pub fn emit_success(&self, expires_at: Option<Timestamp>) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context_id = %self.context_id,
            expires_at = ?expires_at,
            "refresh.success"
        );
    }

    pub fn emit_failure(&self, stage: RefreshStage, error: &Error) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            context_id = %self.context_id,
            stage = %stage,
            error = %error,
            "refresh.failure"
        );
    }
}
