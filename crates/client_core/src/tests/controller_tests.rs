use std::time::Duration;

use shared::protocol::{RegistrationToggleResponse, SignupResponse};

use super::*;
use crate::TransportError;

fn toggle(success: bool, message: &str) -> RegistrationToggleResponse {
    RegistrationToggleResponse {
        success,
        message: message.to_string(),
        is_registered: success,
        action_at: None,
    }
}

#[test]
fn accept_prefers_server_message_then_fallback() {
    let reply: ApiReply<RegistrationToggleResponse> = ApiReply::failure(400, "Bad input");
    assert_eq!(accept(reply, "fallback").unwrap_err(), "Bad input");

    let reply: ApiReply<RegistrationToggleResponse> = ApiReply::failure(500, "");
    assert_eq!(accept(reply, "fallback").unwrap_err(), "fallback");
}

#[test]
fn accept_rejects_empty_success_body() {
    let reply: ApiReply<RegistrationToggleResponse> = ApiReply::empty(204);
    assert_eq!(accept(reply, "fallback").unwrap_err(), EMPTY_BODY_MESSAGE);
}

#[test]
fn accept_honours_application_verdict() {
    let rejected = ApiReply::ok(toggle(false, "Registration closed"));
    assert_eq!(accept(rejected, "fallback").unwrap_err(), "Registration closed");

    let silent = ApiReply::ok(toggle(false, ""));
    assert_eq!(accept(silent, "fallback").unwrap_err(), "fallback");

    let accepted = ApiReply::ok(toggle(true, "ok"));
    assert!(accept(accepted, "fallback").is_ok());
}

#[tokio::test]
async fn transport_fault_text_becomes_error() {
    let state = AsyncState::<SignupResponse>::new();
    let outcome = run_request(&state, "signup", "Signup failed", async {
        Err(TransportError::Connect("connection refused".into()))
    })
    .await;

    assert!(outcome.is_none());
    assert_eq!(
        state.snapshot().error(),
        Some("could not reach server: connection refused")
    );
}

#[tokio::test]
async fn superseded_request_skips_side_effects() {
    let state = AsyncState::<RegistrationToggleResponse>::new();

    let slow = run_request(&state, "toggle_registration", UNKNOWN_ERROR, async {
        tokio::time::sleep(Duration::from_millis(80)).await;
        Ok(ApiReply::ok(toggle(true, "slow")))
    });
    let fast = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        run_request(&state, "toggle_registration", UNKNOWN_ERROR, async {
            Ok(ApiReply::ok(toggle(true, "fast")))
        })
        .await
    };

    let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);
    assert!(slow_outcome.is_none());
    assert_eq!(fast_outcome.map(|r| r.message), Some("fast".to_string()));
    assert_eq!(
        state.snapshot().value().map(|r| r.message.as_str()),
        Some("fast")
    );
}

#[test]
fn local_rejection_moves_straight_to_error() {
    let state = AsyncState::<SignupResponse>::new();
    reject_locally(&state, "signup", "Email is required");
    assert_eq!(state.snapshot().error(), Some("Email is required"));
}
