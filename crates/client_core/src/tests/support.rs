use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use shared::{
    domain::{HackathonId, UserId},
    protocol::{
        AddReviewRequest, AddReviewResponse, AiExtractionRequest, AiExtractionResponse,
        ChangePasswordRequest, ChangePasswordResponse, CreateHackathonRequest,
        CreateHackathonResponse, EmailExistenceResponse, EmailVerificationRequest,
        EmailVerificationResponse, EmailVerificationStatusResponse, ForgotPasswordRequest,
        ForgotPasswordResponse, HackathonDetailsResponse, HackathonFilter, HackathonListResponse,
        LoginRequest, LoginResponse, PrivateProfileResponse, ProfileSetupRequest,
        ProfileSetupResponse, ProfileSetupStatusResponse, ProfileUpdateRequest,
        ProfileUpdateResponse, PublicProfileResponse, RegistrationToggleRequest,
        RegistrationToggleResponse, ResetPasswordRequest, ResetPasswordResponse, SignupRequest,
        SignupResponse, StarToggleRequest, StarToggleResponse, TokenValidationResponse,
    },
};

use crate::{ApiReply, ApiResult, HackmateApi, TransportError};

struct Scripted {
    delay: Option<Duration>,
    reply: ApiResult<Value>,
}

/// Fake API answering from per-operation reply queues and recording requests.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    replies: Mutex<HashMap<&'static str, VecDeque<Scripted>>>,
    requests: Mutex<Vec<(&'static str, Value)>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, operation: &'static str, reply: ApiResult<Value>) -> &Self {
        self.push_delayed(operation, None, reply)
    }

    pub(crate) fn push_delayed(
        &self,
        operation: &'static str,
        delay: Option<Duration>,
        reply: ApiResult<Value>,
    ) -> &Self {
        self.replies
            .lock()
            .expect("replies lock")
            .entry(operation)
            .or_default()
            .push_back(Scripted { delay, reply });
        self
    }

    pub(crate) fn ok(&self, operation: &'static str, body: Value) -> &Self {
        self.push(operation, Ok(ApiReply::ok(body)))
    }

    pub(crate) fn status(&self, operation: &'static str, status: u16, message: &str) -> &Self {
        self.push(operation, Ok(ApiReply::failure(status, message)))
    }

    pub(crate) fn fault(&self, operation: &'static str, fault: TransportError) -> &Self {
        self.push(operation, Err(fault))
    }

    pub(crate) fn calls(&self, operation: &str) -> usize {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|(name, _)| *name == operation)
            .count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub(crate) fn last_request(&self, operation: &str) -> Option<Value> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .rev()
            .find(|(name, _)| *name == operation)
            .map(|(_, payload)| payload.clone())
    }

    async fn answer<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: impl Serialize,
    ) -> ApiResult<T> {
        let payload = serde_json::to_value(request).expect("serialize request");
        self.requests
            .lock()
            .expect("requests lock")
            .push((operation, payload));

        let scripted = self
            .replies
            .lock()
            .expect("replies lock")
            .get_mut(operation)
            .and_then(VecDeque::pop_front);
        let Some(Scripted { delay, reply }) = scripted else {
            return Err(TransportError::Connect(format!(
                "no scripted reply for {operation}"
            )));
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = reply?;
        let body = match reply.body {
            Some(value) => Some(serde_json::from_value(value)?),
            None => None,
        };
        Ok(ApiReply {
            status: reply.status,
            message: reply.message,
            body,
        })
    }
}

#[async_trait]
impl HackmateApi for ScriptedApi {
    async fn signup(&self, request: &SignupRequest) -> ApiResult<SignupResponse> {
        self.answer("signup", request).await
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.answer("login", request).await
    }

    async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> ApiResult<ChangePasswordResponse> {
        self.answer("change_password", request).await
    }

    async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> ApiResult<ForgotPasswordResponse> {
        self.answer("forgot_password", request).await
    }

    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> ApiResult<ResetPasswordResponse> {
        self.answer("reset_password", request).await
    }

    async fn validate_reset_token(&self, token: &str) -> ApiResult<TokenValidationResponse> {
        self.answer("validate_reset_token", json!({ "token": token }))
            .await
    }

    async fn verify_email(
        &self,
        request: &EmailVerificationRequest,
    ) -> ApiResult<EmailVerificationResponse> {
        self.answer("verify_email", request).await
    }

    async fn resend_verification(&self, email: &str) -> ApiResult<EmailVerificationResponse> {
        self.answer("resend_verification", json!({ "email": email }))
            .await
    }

    async fn profile_setup_status(&self) -> ApiResult<ProfileSetupStatusResponse> {
        self.answer("profile_setup_status", Value::Null).await
    }

    async fn check_email_exists(&self, email: &str) -> ApiResult<EmailExistenceResponse> {
        self.answer("check_email_exists", json!({ "email": email }))
            .await
    }

    async fn check_email_verification(
        &self,
        email: &str,
    ) -> ApiResult<EmailVerificationStatusResponse> {
        self.answer("check_email_verification", json!({ "email": email }))
            .await
    }

    async fn health(&self) -> ApiResult<String> {
        self.answer("health", Value::Null).await
    }

    async fn setup_profile(
        &self,
        request: &ProfileSetupRequest,
    ) -> ApiResult<ProfileSetupResponse> {
        self.answer("setup_profile", request).await
    }

    async fn update_profile(
        &self,
        request: &ProfileUpdateRequest,
    ) -> ApiResult<ProfileUpdateResponse> {
        self.answer("update_profile", request).await
    }

    async fn my_profile(&self) -> ApiResult<PrivateProfileResponse> {
        self.answer("my_profile", Value::Null).await
    }

    async fn public_profile(&self, user_id: UserId) -> ApiResult<PublicProfileResponse> {
        self.answer("public_profile", user_id).await
    }

    async fn add_review(&self, request: &AddReviewRequest) -> ApiResult<AddReviewResponse> {
        self.answer("add_review", request).await
    }

    async fn hackathon_feed(&self, filter: &HackathonFilter) -> ApiResult<HackathonListResponse> {
        let pairs: serde_json::Map<String, Value> = filter
            .to_query_pairs()
            .into_iter()
            .map(|(key, value)| (key.to_string(), Value::String(value)))
            .collect();
        self.answer("hackathon_feed", pairs).await
    }

    async fn hackathon_details(&self, id: HackathonId) -> ApiResult<HackathonDetailsResponse> {
        self.answer("hackathon_details", id).await
    }

    async fn create_hackathon(
        &self,
        request: &CreateHackathonRequest,
    ) -> ApiResult<CreateHackathonResponse> {
        self.answer("create_hackathon", request).await
    }

    async fn toggle_registration(
        &self,
        request: &RegistrationToggleRequest,
    ) -> ApiResult<RegistrationToggleResponse> {
        self.answer("toggle_registration", request).await
    }

    async fn toggle_star(&self, request: &StarToggleRequest) -> ApiResult<StarToggleResponse> {
        self.answer("toggle_star", request).await
    }

    async fn my_registered_hackathons(
        &self,
        page: u32,
        size: u32,
    ) -> ApiResult<HackathonListResponse> {
        self.answer("my_registered_hackathons", json!({ "page": page, "size": size }))
            .await
    }

    async fn my_starred_hackathons(
        &self,
        page: u32,
        size: u32,
    ) -> ApiResult<HackathonListResponse> {
        self.answer("my_starred_hackathons", json!({ "page": page, "size": size }))
            .await
    }

    async fn extract_hackathon(
        &self,
        request: &AiExtractionRequest,
    ) -> ApiResult<AiExtractionResponse> {
        self.answer("extract_hackathon", request).await
    }
}

pub(crate) fn hackathon_json(id: i64, title: &str) -> Value {
    json!({
        "hackathonId": id,
        "title": title,
        "description": format!("{title} description"),
        "registrationCount": 3,
        "isRegistered": false,
        "isStarred": false
    })
}

pub(crate) fn page_json(ids: &[i64], current_page: u32, has_next: bool) -> Value {
    let hackathons: Vec<Value> = ids
        .iter()
        .map(|id| hackathon_json(*id, &format!("Hack {id}")))
        .collect();
    let total_pages = if has_next {
        current_page + 2
    } else {
        current_page + 1
    };
    json!({
        "hackathons": hackathons,
        "currentPage": current_page,
        "totalPages": total_pages,
        "totalElements": ids.len(),
        "hasNext": has_next,
        "hasPrevious": current_page > 0
    })
}
