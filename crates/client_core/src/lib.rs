use async_trait::async_trait;
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

pub mod controller;
pub mod error;
pub mod http;
pub mod navigation;
pub mod state;
pub mod validation;

pub use controller::{
    auth::{AuthController, AuthDestination},
    feed::{FeedController, FeedOptions, PagingMode},
    hackathon::{CreateHackathonController, HackathonDetailsController, HackathonDraft},
    profile::{ProfileController, ProfileSetupController, ProfileSetupDestination},
    splash::{SplashController, SplashDestination},
};
pub use error::TransportError;
pub use http::{HttpApiClient, HttpApiOptions};
pub use navigation::{NavigationIntent, NavigationSlot};
pub use state::{AsyncResult, AsyncState, RequestTicket};

/// An HTTP reply that made it back over the wire, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply<T> {
    pub status: u16,
    /// Server-provided error text, or the status reason phrase.
    pub message: String,
    pub body: Option<T>,
}

impl<T> ApiReply<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: 200,
            message: "OK".to_string(),
            body: Some(body),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            message: String::new(),
            body: None,
        }
    }

    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub type ApiResult<T> = std::result::Result<ApiReply<T>, TransportError>;

/// Remote HackMate API as consumed by the controllers.
#[async_trait]
pub trait HackmateApi: Send + Sync {
    async fn signup(&self, request: &SignupRequest) -> ApiResult<SignupResponse>;
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse>;
    async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> ApiResult<ChangePasswordResponse>;
    async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> ApiResult<ForgotPasswordResponse>;
    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> ApiResult<ResetPasswordResponse>;
    async fn validate_reset_token(&self, token: &str) -> ApiResult<TokenValidationResponse>;
    async fn verify_email(
        &self,
        request: &EmailVerificationRequest,
    ) -> ApiResult<EmailVerificationResponse>;
    async fn resend_verification(&self, email: &str) -> ApiResult<EmailVerificationResponse>;
    async fn profile_setup_status(&self) -> ApiResult<ProfileSetupStatusResponse>;
    async fn check_email_exists(&self, email: &str) -> ApiResult<EmailExistenceResponse>;
    async fn check_email_verification(
        &self,
        email: &str,
    ) -> ApiResult<EmailVerificationStatusResponse>;
    async fn health(&self) -> ApiResult<String>;

    async fn setup_profile(&self, request: &ProfileSetupRequest)
        -> ApiResult<ProfileSetupResponse>;
    async fn update_profile(
        &self,
        request: &ProfileUpdateRequest,
    ) -> ApiResult<ProfileUpdateResponse>;
    async fn my_profile(&self) -> ApiResult<PrivateProfileResponse>;
    async fn public_profile(&self, user_id: UserId) -> ApiResult<PublicProfileResponse>;
    async fn add_review(&self, request: &AddReviewRequest) -> ApiResult<AddReviewResponse>;

    async fn hackathon_feed(&self, filter: &HackathonFilter) -> ApiResult<HackathonListResponse>;
    async fn hackathon_details(&self, id: HackathonId) -> ApiResult<HackathonDetailsResponse>;
    async fn create_hackathon(
        &self,
        request: &CreateHackathonRequest,
    ) -> ApiResult<CreateHackathonResponse>;
    async fn toggle_registration(
        &self,
        request: &RegistrationToggleRequest,
    ) -> ApiResult<RegistrationToggleResponse>;
    async fn toggle_star(&self, request: &StarToggleRequest) -> ApiResult<StarToggleResponse>;
    async fn my_registered_hackathons(
        &self,
        page: u32,
        size: u32,
    ) -> ApiResult<HackathonListResponse>;
    async fn my_starred_hackathons(&self, page: u32, size: u32)
        -> ApiResult<HackathonListResponse>;
    async fn extract_hackathon(
        &self,
        request: &AiExtractionRequest,
    ) -> ApiResult<AiExtractionResponse>;
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
