use std::future::Future;

use actionprims_codec::{decode, try_decode, FlatTransport, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::action::{Action, RawAction};
use crate::result::ActionResult;

/// Message of the failure produced when the caller cancels first.
pub const CANCELLED_MESSAGE: &str = "Request cancelled";

/// A raw action adapted to the [`Action`] boundary. See [`wrap_action`].
#[derive(Debug, Clone)]
pub struct WrappedAction<R> {
    raw: R,
    strict: bool,
}

/// Adapt a raw action into a wrapped one.
///
/// The wrapped action decodes the transport, invokes the raw action and
/// classifies what it returns. Transport entries that conflict with the shape
/// built so far are dropped with a warning, so the first key addressing a
/// container decides its type. Invocation errors become failures carrying
/// the error's message; nothing escapes as an error.
pub fn wrap_action<R: RawAction>(raw: R) -> WrappedAction<R> {
    WrappedAction { raw, strict: false }
}

/// Like [`wrap_action`], but a transport with conflicting keys is answered
/// with a failure and the raw action is not invoked.
pub fn wrap_action_strict<R: RawAction>(raw: R) -> WrappedAction<R> {
    WrappedAction { raw, strict: true }
}

impl<R: RawAction> WrappedAction<R> {
    /// Borrow the raw action.
    pub fn raw(&self) -> &R {
        &self.raw
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Run the raw action against a transport, ignoring cancellation.
    pub async fn run(&self, transport: FlatTransport) -> ActionResult {
        let input = match self.decode_input(&transport) {
            Ok(input) => input,
            Err(err) => {
                warn!(error = %err, "action input could not be decoded");
                return ActionResult::failure(err.to_string());
            }
        };

        match self.raw.invoke(input).await {
            Ok(outcome) => ActionResult::from_outcome(outcome),
            Err(err) => ActionResult::failure(err.to_string()),
        }
    }
}

impl<R> WrappedAction<R> {
    fn decode_input(&self, transport: &FlatTransport) -> actionprims_codec::Result<Value> {
        if self.strict {
            try_decode(transport)
        } else {
            Ok(decode(transport))
        }
    }
}

impl<R: RawAction> Action for WrappedAction<R> {
    fn call(
        &self,
        transport: FlatTransport,
        cancel: CancellationToken,
    ) -> impl Future<Output = ActionResult> + Send {
        async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("raw action abandoned after cancellation");
                    ActionResult::failure(CANCELLED_MESSAGE)
                }
                result = self.run(transport) => result,
            }
        }
    }
}
