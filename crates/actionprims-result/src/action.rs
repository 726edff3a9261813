use std::fmt::Display;
use std::future::Future;

use actionprims_codec::{FlatTransport, Value};
use tokio_util::sync::CancellationToken;

use crate::outcome::RawOutcome;
use crate::result::ActionResult;

/// A wrapped action: flat transport in, tagged result out.
///
/// The token is cancelled when the caller no longer wants the result. Honoring
/// it is cooperative; a result that arrives anyway is discarded by the caller.
///
/// Implemented for any `Fn(FlatTransport, CancellationToken) -> impl Future`.
pub trait Action: Send + Sync + 'static {
    fn call(
        &self,
        transport: FlatTransport,
        cancel: CancellationToken,
    ) -> impl Future<Output = ActionResult> + Send;
}

impl<F, Fut> Action for F
where
    F: Fn(FlatTransport, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ActionResult> + Send,
{
    fn call(
        &self,
        transport: FlatTransport,
        cancel: CancellationToken,
    ) -> impl Future<Output = ActionResult> + Send {
        self(transport, cancel)
    }
}

/// A raw action: decoded structured input, loosely shaped output.
///
/// Implemented for any `Fn(Value) -> impl Future<Output = Result<RawOutcome, E>>`
/// where `E: Display`.
pub trait RawAction: Send + Sync + 'static {
    type Error: Display;

    fn invoke(&self, input: Value) -> impl Future<Output = Result<RawOutcome, Self::Error>> + Send;
}

impl<F, Fut, E> RawAction for F
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RawOutcome, E>> + Send,
    E: Display,
{
    type Error = E;

    fn invoke(&self, input: Value) -> impl Future<Output = Result<RawOutcome, E>> + Send {
        self(input)
    }
}
