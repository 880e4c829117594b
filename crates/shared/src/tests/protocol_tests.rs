use crate::{
    domain::{HackathonId, SortDirection, UserId},
    error::ApiErrorBody,
    protocol::{
        ApplicationVerdict, Hackathon, HackathonFilter, LoginResponse,
        ProfileSetupStatusResponse, RegistrationToggleResponse, SignupResponse,
    },
};

#[test]
fn login_response_accepts_both_flag_spellings() {
    let gson_style: LoginResponse = serde_json::from_str(
        r#"{"token":"t","userId":7,"email":"a@b.io","role":"USER","isProfileSetup":true,"isEmailVerified":true}"#,
    )
    .expect("gson style");
    assert!(gson_style.is_profile_setup);
    assert!(gson_style.is_email_verified);
    assert_eq!(gson_style.user_id, Some(UserId(7)));

    let jackson_style: LoginResponse = serde_json::from_str(
        r#"{"token":"t","userId":7,"email":"a@b.io","role":"USER","profileSetup":false,"emailVerified":true}"#,
    )
    .expect("jackson style");
    assert!(!jackson_style.is_profile_setup);
    assert!(jackson_style.is_email_verified);
}

#[test]
fn profile_status_complete_when_either_field_says_so() {
    let flag = ProfileSetupStatusResponse {
        is_profile_setup: true,
        completion_percentage: 10,
    };
    let percentage = ProfileSetupStatusResponse {
        is_profile_setup: false,
        completion_percentage: 100,
    };
    let partial = ProfileSetupStatusResponse {
        is_profile_setup: false,
        completion_percentage: 40,
    };
    assert!(flag.is_complete());
    assert!(percentage.is_complete());
    assert!(!partial.is_complete());
}

#[test]
fn signup_response_tolerates_string_verification_flag() {
    let body: SignupResponse = serde_json::from_str(
        r#"{"userId":3,"email":"x@y.io","message":"ok","role":"USER","isEmailVerified":false,"verificationEmailSent":"true"}"#,
    )
    .expect("signup");
    assert!(body.verification_email_sent);

    let body: SignupResponse =
        serde_json::from_str(r#"{"verificationEmailSent":null}"#).expect("signup null");
    assert!(!body.verification_email_sent);
}

#[test]
fn acknowledged_bodies_report_rejections() {
    let rejected = RegistrationToggleResponse {
        success: false,
        message: "Registration closed".into(),
        is_registered: false,
        action_at: None,
    };
    assert_eq!(rejected.rejection().as_deref(), Some("Registration closed"));

    let accepted = RegistrationToggleResponse {
        success: true,
        ..rejected
    };
    assert!(accepted.rejection().is_none());
}

#[test]
fn login_without_token_is_rejected() {
    let missing: LoginResponse =
        serde_json::from_str(r#"{"isEmailVerified":true}"#).expect("missing token");
    assert!(missing.rejection().is_some());

    let blank: LoginResponse =
        serde_json::from_str(r#"{"token":"  ","isEmailVerified":true}"#).expect("blank token");
    assert!(blank.rejection().is_some());

    let issued: LoginResponse =
        serde_json::from_str(r#"{"token":"jwt","isEmailVerified":true}"#).expect("token");
    assert!(issued.rejection().is_none());
}

#[test]
fn feed_filter_serializes_backend_query_names() {
    let filter = HackathonFilter {
        search: Some("rust".into()),
        tags: vec!["ai".into(), "web".into()],
        sort_by: Some("deadline".into()),
        sort_direction: SortDirection::Desc,
        page: 2,
        size: 10,
        ..HackathonFilter::default()
    };
    let pairs = filter.to_query_pairs();
    assert!(pairs.contains(&("search", "rust".to_string())));
    assert_eq!(pairs.iter().filter(|(k, _)| *k == "tags").count(), 2);
    assert!(pairs.contains(&("showExpired", "false".to_string())));
    assert!(pairs.contains(&("sortDirection", "DESC".to_string())));
    assert!(pairs.contains(&("page", "2".to_string())));
    assert!(pairs.contains(&("size", "10".to_string())));
}

#[test]
fn registration_patch_floors_count_at_zero() {
    let mut hackathon: Hackathon = serde_json::from_str(
        r#"{"hackathonId":1,"title":"Hack","registered":true,"registrationCount":0}"#,
    )
    .expect("hackathon");
    assert_eq!(hackathon.hackathon_id, HackathonId(1));
    hackathon.apply_registration(false);
    assert!(!hackathon.is_registered);
    assert_eq!(hackathon.registration_count, 0);

    hackathon.apply_registration(true);
    assert_eq!(hackathon.registration_count, 1);
}

#[test]
fn error_envelope_includes_field_errors() {
    let body = ApiErrorBody::parse(
        br#"{"success":false,"message":"Validation failed","fieldErrors":{"email":"must be valid"},"status":400}"#,
    )
    .expect("envelope");
    assert_eq!(
        body.display_message().as_deref(),
        Some("Validation failed (email: must be valid)")
    );
    assert!(ApiErrorBody::parse(b"<html>oops</html>").is_none());
}

#[test]
fn ids_honor_width_and_alignment() {
    assert_eq!(format!("#{:<5}|", HackathonId(42)), "#42   |");
    assert_eq!(format!("{:>4}", UserId(7)), "   7");
}
