//! Tagged action results and the boundary between raw and wrapped actions.
//!
//! A *raw* action takes a decoded [`Value`](actionprims_codec::Value) and
//! returns whatever it likes. [`wrap_action`] turns it into a *wrapped*
//! [`Action`]: flat transport in, [`ActionResult`] out, with every failure
//! mode folded into [`ActionResult::Failure`].

pub mod action;
pub mod outcome;
pub mod result;
pub mod wrap;

pub use action::{Action, RawAction};
pub use outcome::RawOutcome;
pub use result::{ActionResult, DEFAULT_FAILURE_MESSAGE, DEFAULT_SUCCESS_MESSAGE};
pub use wrap::{wrap_action, wrap_action_strict, WrappedAction, CANCELLED_MESSAGE};
