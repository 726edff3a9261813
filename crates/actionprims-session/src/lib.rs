//! Request orchestration for wrapped actions.
//!
//! A [`Session`] sits between a UI layer and one [`Action`]. It owns the
//! request lifecycle for that call site:
//! - one in-flight request at a time; starting another cancels and supersedes it
//! - deduplication of triggers that arrive while a recent request is loading
//! - optional time-boxed caching of the last successful payload
//! - direct and optimistic mutation of the held data
//! - mount/focus/unmount reactions through an injected [`LifecycleSource`]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod payload;
mod resources;
pub mod session;

pub use actionprims_result::{Action, ActionResult};
pub use config::{ErrorCallback, SessionConfig, SuccessCallback, DEFAULT_DEDUPING_INTERVAL};
pub use error::{Result, SessionError};
pub use lifecycle::{LifecycleEvent, LifecycleHub, LifecycleSource, Listener, Subscription};
pub use payload::Payload;
pub use session::{Outcome, Session, Snapshot};
