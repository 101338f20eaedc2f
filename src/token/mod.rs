mod cache;
mod clock;
mod credential;
mod source;

pub use cache::{TokenCache, TokenCacheConfig, TokenCacheResult};
pub use clock::{Clock, SystemClock};
pub use credential::{Credential, DEFAULT_EXPIRY_DELTA};
pub use source::{CredentialSource, FnSource, NoopHook, RefreshFactory, StaticSource, UpdateHook};
