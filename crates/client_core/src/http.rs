use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{HackathonId, UserId},
    error::ApiErrorBody,
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
use storage::SessionStore;
use tracing::{debug, warn};
use url::Url;

use crate::{ApiReply, ApiResult, HackmateApi, TransportError};

#[derive(Debug, Clone)]
pub struct HttpApiOptions {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpApiOptions {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// reqwest-backed [`HackmateApi`].
///
/// Reads the bearer token from the session store on every call, so a login or
/// logout takes effect for the very next request.
pub struct HttpApiClient {
    http: Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
}

impl HttpApiClient {
    pub fn new(
        options: HttpApiOptions,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.timeout)
            .build()
            .map_err(|err| TransportError::Request(err.to_string()))?;
        Ok(Self {
            http,
            base_url: normalize_base_url(&options.base_url)?,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        Ok(self.base_url.join(path)?)
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, TransportError> {
        Ok(self.http.get(self.endpoint(path)?))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, TransportError> {
        Ok(self.http.post(self.endpoint(path)?))
    }

    fn put(&self, path: &str) -> Result<RequestBuilder, TransportError> {
        Ok(self.http.put(self.endpoint(path)?))
    }

    async fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token().await {
            Ok(Some(token)) if !token.trim().is_empty() => builder.bearer_auth(token),
            Ok(_) => builder,
            Err(err) => {
                warn!(error = %err, "could not read session token; sending unauthenticated");
                builder
            }
        }
    }

    async fn dispatch(
        &self,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>), TransportError> {
        let builder = self.authorize(builder).await;
        debug!(operation, "dispatching api request");
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(operation, status = status.as_u16(), "api reply received");
        Ok((status, bytes.to_vec()))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> ApiResult<T> {
        let (status, bytes) = self.dispatch(operation, builder).await?;
        interpret_json(status, &bytes)
    }

    async fn execute_text(
        &self,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> ApiResult<String> {
        let (status, bytes) = self.dispatch(operation, builder).await?;
        if !status.is_success() {
            return Ok(error_reply(status, &bytes));
        }
        let text = String::from_utf8(bytes).map_err(|err| TransportError::Decode(err.to_string()))?;
        Ok(ApiReply {
            status: status.as_u16(),
            message: reason(status),
            body: (!text.trim().is_empty()).then_some(text),
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, TransportError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TransportError::InvalidUrl(format!(
            "unsupported scheme '{other}' in {raw}"
        ))),
    }
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn error_reply<T: DeserializeOwned>(status: StatusCode, bytes: &[u8]) -> ApiReply<T> {
    let message = ApiErrorBody::parse(bytes)
        .and_then(|envelope| envelope.display_message())
        .unwrap_or_else(|| reason(status));
    ApiReply {
        status: status.as_u16(),
        message,
        // Some endpoints answer 4xx with their regular body shape.
        body: serde_json::from_slice(bytes).ok(),
    }
}

fn interpret_json<T: DeserializeOwned>(status: StatusCode, bytes: &[u8]) -> ApiResult<T> {
    if !status.is_success() {
        return Ok(error_reply(status, bytes));
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApiReply::empty(status.as_u16()));
    }
    let body = serde_json::from_slice::<T>(bytes)?;
    Ok(ApiReply {
        status: status.as_u16(),
        message: reason(status),
        body: Some(body),
    })
}

#[async_trait]
impl HackmateApi for HttpApiClient {
    async fn signup(&self, request: &SignupRequest) -> ApiResult<SignupResponse> {
        self.execute("signup", self.post("api/auth/signup")?.json(request))
            .await
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.execute("login", self.post("api/auth/login")?.json(request))
            .await
    }

    async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> ApiResult<ChangePasswordResponse> {
        self.execute(
            "change_password",
            self.post("api/auth/change-password")?.json(request),
        )
        .await
    }

    async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> ApiResult<ForgotPasswordResponse> {
        self.execute(
            "forgot_password",
            self.post("api/auth/forgot-password")?.json(request),
        )
        .await
    }

    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> ApiResult<ResetPasswordResponse> {
        self.execute(
            "reset_password",
            self.post("api/auth/reset-password")?.json(request),
        )
        .await
    }

    async fn validate_reset_token(&self, token: &str) -> ApiResult<TokenValidationResponse> {
        self.execute(
            "validate_reset_token",
            self.get("api/auth/reset-password")?
                .query(&[("token", token)]),
        )
        .await
    }

    async fn verify_email(
        &self,
        request: &EmailVerificationRequest,
    ) -> ApiResult<EmailVerificationResponse> {
        self.execute(
            "verify_email",
            self.post("api/auth/verify-email")?.json(request),
        )
        .await
    }

    async fn resend_verification(&self, email: &str) -> ApiResult<EmailVerificationResponse> {
        self.execute(
            "resend_verification",
            self.post("api/auth/resend-verification")?
                .query(&[("email", email)]),
        )
        .await
    }

    async fn profile_setup_status(&self) -> ApiResult<ProfileSetupStatusResponse> {
        self.execute(
            "profile_setup_status",
            self.get("api/auth/profile-setup-status")?,
        )
        .await
    }

    async fn check_email_exists(&self, email: &str) -> ApiResult<EmailExistenceResponse> {
        self.execute(
            "check_email_exists",
            self.get("api/auth/check-email")?.query(&[("email", email)]),
        )
        .await
    }

    async fn check_email_verification(
        &self,
        email: &str,
    ) -> ApiResult<EmailVerificationStatusResponse> {
        self.execute(
            "check_email_verification",
            self.get("api/auth/check-email-verification")?
                .query(&[("email", email)]),
        )
        .await
    }

    async fn health(&self) -> ApiResult<String> {
        self.execute_text("health", self.get("api/auth/health")?)
            .await
    }

    async fn setup_profile(
        &self,
        request: &ProfileSetupRequest,
    ) -> ApiResult<ProfileSetupResponse> {
        self.execute("setup_profile", self.post("api/profiles/setup")?.json(request))
            .await
    }

    async fn update_profile(
        &self,
        request: &ProfileUpdateRequest,
    ) -> ApiResult<ProfileUpdateResponse> {
        self.execute("update_profile", self.put("api/profiles")?.json(request))
            .await
    }

    async fn my_profile(&self) -> ApiResult<PrivateProfileResponse> {
        self.execute("my_profile", self.get("api/profiles/me")?)
            .await
    }

    async fn public_profile(&self, user_id: UserId) -> ApiResult<PublicProfileResponse> {
        self.execute(
            "public_profile",
            self.get(&format!("api/profiles/{user_id}"))?,
        )
        .await
    }

    async fn add_review(&self, request: &AddReviewRequest) -> ApiResult<AddReviewResponse> {
        self.execute("add_review", self.post("api/profiles/reviews")?.json(request))
            .await
    }

    async fn hackathon_feed(&self, filter: &HackathonFilter) -> ApiResult<HackathonListResponse> {
        self.execute(
            "hackathon_feed",
            self.get("api/hackathons/feed")?
                .query(&filter.to_query_pairs()),
        )
        .await
    }

    async fn hackathon_details(&self, id: HackathonId) -> ApiResult<HackathonDetailsResponse> {
        self.execute(
            "hackathon_details",
            self.get(&format!("api/hackathons/{id}"))?,
        )
        .await
    }

    async fn create_hackathon(
        &self,
        request: &CreateHackathonRequest,
    ) -> ApiResult<CreateHackathonResponse> {
        self.execute("create_hackathon", self.post("api/hackathons")?.json(request))
            .await
    }

    async fn toggle_registration(
        &self,
        request: &RegistrationToggleRequest,
    ) -> ApiResult<RegistrationToggleResponse> {
        self.execute(
            "toggle_registration",
            self.post("api/hackathons/register")?.json(request),
        )
        .await
    }

    async fn toggle_star(&self, request: &StarToggleRequest) -> ApiResult<StarToggleResponse> {
        self.execute("toggle_star", self.post("api/hackathons/star")?.json(request))
            .await
    }

    async fn my_registered_hackathons(
        &self,
        page: u32,
        size: u32,
    ) -> ApiResult<HackathonListResponse> {
        self.execute(
            "my_registered_hackathons",
            self.get("api/hackathons/my-registered")?
                .query(&[("page", page), ("size", size)]),
        )
        .await
    }

    async fn my_starred_hackathons(
        &self,
        page: u32,
        size: u32,
    ) -> ApiResult<HackathonListResponse> {
        self.execute(
            "my_starred_hackathons",
            self.get("api/hackathons/my-starred")?
                .query(&[("page", page), ("size", size)]),
        )
        .await
    }

    async fn extract_hackathon(
        &self,
        request: &AiExtractionRequest,
    ) -> ApiResult<AiExtractionResponse> {
        self.execute(
            "extract_hackathon",
            self.post("api/hackathons/ai-extract")?.json(request),
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
