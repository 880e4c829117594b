use std::sync::Arc;

use serde_json::json;
use storage::{InMemorySessionStore, Session, SessionStore};

use super::*;
use crate::{test_support::ScriptedApi, ApiReply, TransportError};

async fn signed_in() -> Arc<InMemorySessionStore> {
    Arc::new(
        InMemorySessionStore::with_session(Session {
            token: Some("jwt".into()),
            email: Some("ada@example.com".into()),
            email_verified: true,
            profile_setup: false,
        })
        .await,
    )
}

async fn route(
    session: Arc<InMemorySessionStore>,
    script: impl FnOnce(&ScriptedApi),
) -> (SplashDestination, Arc<ScriptedApi>) {
    let api = Arc::new(ScriptedApi::new());
    script(&api);
    let controller = SplashController::new(api.clone(), session);
    controller.check_user_state().await;
    let destination = controller.navigation.take().expect("splash always navigates");
    (destination, api)
}

#[tokio::test]
async fn missing_token_goes_to_auth_without_network() {
    let session = Arc::new(InMemorySessionStore::new());
    let (destination, api) = route(session, |_| {}).await;
    assert_eq!(destination, SplashDestination::Auth);
    assert_eq!(api.total_calls(), 0);
}

#[tokio::test]
async fn blank_token_counts_as_missing() {
    let session = Arc::new(InMemorySessionStore::new());
    session.save_token("   ").await.expect("token");
    let (destination, api) = route(session, |_| {}).await;
    assert_eq!(destination, SplashDestination::Auth);
    assert_eq!(api.total_calls(), 0);
}

#[tokio::test]
async fn complete_profile_goes_home() {
    let session = signed_in().await;
    let (destination, _) = route(session.clone(), |api| {
        api.ok(
            "profile_setup_status",
            json!({ "isProfileSetup": false, "completionPercentage": 100 }),
        );
    })
    .await;
    assert_eq!(destination, SplashDestination::Home);
    assert!(session.is_profile_setup().await.expect("flag"));
}

#[tokio::test]
async fn incomplete_profile_goes_to_setup() {
    let (destination, _) = route(signed_in().await, |api| {
        api.ok(
            "profile_setup_status",
            json!({ "isProfileSetup": false, "completionPercentage": 60 }),
        );
    })
    .await;
    assert_eq!(destination, SplashDestination::ProfileSetup);
}

#[tokio::test]
async fn success_without_body_goes_to_auth_and_keeps_session() {
    let session = signed_in().await;
    let (destination, _) = route(session.clone(), |api| {
        api.push("profile_setup_status", Ok(ApiReply::empty(200)));
    })
    .await;
    assert_eq!(destination, SplashDestination::Auth);
    assert!(session.token().await.expect("token").is_some());
}

#[tokio::test]
async fn forbidden_goes_to_email_verification() {
    let session = signed_in().await;
    let (destination, _) = route(session.clone(), |api| {
        api.status("profile_setup_status", 403, "Email not verified");
    })
    .await;
    assert_eq!(destination, SplashDestination::EmailVerification);
    assert!(session.token().await.expect("token").is_some());
}

#[tokio::test]
async fn other_rejection_clears_session() {
    let session = signed_in().await;
    let (destination, _) = route(session.clone(), |api| {
        api.status("profile_setup_status", 401, "Unauthorized");
    })
    .await;
    assert_eq!(destination, SplashDestination::Auth);
    assert_eq!(session.load().await.expect("load"), Session::default());
}

#[tokio::test]
async fn transport_fault_clears_session() {
    let session = signed_in().await;
    let (destination, _) = route(session.clone(), |api| {
        api.fault(
            "profile_setup_status",
            TransportError::Connect("connection refused".into()),
        );
    })
    .await;
    assert_eq!(destination, SplashDestination::Auth);
    assert!(session.token().await.expect("token").is_none());
}
