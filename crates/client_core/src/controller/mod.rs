//! Screen controllers.
//!
//! Each controller owns one [`AsyncState`] per operation and drives it through
//! [`run_request`]; views observe the states and the controller's navigation
//! slot.

use std::future::Future;

use shared::protocol::ApplicationVerdict;
use tracing::{debug, warn};

use crate::{
    state::{AsyncState, RequestTicket},
    ApiReply, ApiResult,
};

pub mod auth;
pub mod feed;
pub mod hackathon;
pub mod profile;
pub mod splash;

pub const EMPTY_BODY_MESSAGE: &str = "Empty response body";
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Drives `state` through one request.
///
/// Returns the accepted body only when it was applied to `state`; completions
/// of superseded requests yield `None` so callers skip their side effects.
pub(crate) async fn run_request<T, F>(
    state: &AsyncState<T>,
    operation: &'static str,
    fallback: &str,
    call: F,
) -> Option<T>
where
    T: ApplicationVerdict + Clone,
    F: Future<Output = ApiResult<T>>,
{
    let ticket = state.start();
    complete_request(state, ticket, operation, fallback, call).await
}

/// Second half of [`run_request`] for callers that must `start()` the state
/// themselves, e.g. while holding a lock.
pub(crate) async fn complete_request<T, F>(
    state: &AsyncState<T>,
    ticket: RequestTicket,
    operation: &'static str,
    fallback: &str,
    call: F,
) -> Option<T>
where
    T: ApplicationVerdict + Clone,
    F: Future<Output = ApiResult<T>>,
{
    debug!(operation, generation = ticket.generation(), "request started");

    match call.await.map(|reply| accept(reply, fallback)) {
        Ok(Ok(body)) => state.resolve_for(ticket, body.clone()).then_some(body),
        Ok(Err(message)) => {
            warn!(operation, %message, "request rejected");
            state.fail_for(ticket, message);
            None
        }
        Err(fault) => {
            warn!(operation, error = %fault, "request transport fault");
            state.fail_for(ticket, fault.to_string());
            None
        }
    }
}

/// Fails `state` without issuing a request, e.g. when local checks reject input.
pub(crate) fn reject_locally<T>(state: &AsyncState<T>, operation: &'static str, message: &str) {
    debug!(operation, %message, "request rejected before dispatch");
    let ticket = state.start();
    state.fail_for(ticket, message);
}

/// Splits a reply into the accepted body or the message the view shows.
pub fn accept<T: ApplicationVerdict>(reply: ApiReply<T>, fallback: &str) -> Result<T, String> {
    if !reply.is_success() {
        return Err(message_or(&reply.message, fallback));
    }
    let Some(body) = reply.body else {
        return Err(EMPTY_BODY_MESSAGE.to_string());
    };
    match body.rejection() {
        Some(reason) => Err(message_or(&reason, fallback)),
        None => Ok(body),
    }
}

fn message_or(message: &str, fallback: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Logs a session-store fault; store failures never fail an operation.
pub(crate) fn log_store_fault(operation: &'static str, result: anyhow::Result<()>) {
    if let Err(err) = result {
        warn!(operation, error = %err, "session store write failed");
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
