use std::sync::Arc;

use shared::protocol::{
    ChangePasswordRequest, ChangePasswordResponse, EmailExistenceResponse,
    EmailVerificationRequest, EmailVerificationResponse, EmailVerificationStatusResponse,
    ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse,
    ProfileSetupStatusResponse, ResetPasswordRequest, ResetPasswordResponse, SignupRequest,
    SignupResponse, TokenValidationResponse,
};
use storage::SessionStore;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{complete_request, log_store_fault, reject_locally, run_request, UNKNOWN_ERROR};
use crate::{
    navigation::NavigationSlot,
    state::AsyncState,
    validation::{self, ValidationReport},
    HackmateApi,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDestination {
    EmailVerification,
    ProfileSetup,
    Home,
}

/// Where a freshly logged-in user goes.
///
/// `status` is the profile-setup status when that call succeeded with a body;
/// any failure of the status call is passed as `None` and routes to setup.
pub fn decide_post_login(
    email_verified: bool,
    status: Option<&ProfileSetupStatusResponse>,
) -> AuthDestination {
    if !email_verified {
        return AuthDestination::EmailVerification;
    }
    match status {
        Some(status) if status.is_complete() => AuthDestination::Home,
        _ => AuthDestination::ProfileSetup,
    }
}

pub struct AuthController {
    api: Arc<dyn HackmateApi>,
    session: Arc<dyn SessionStore>,
    pub signup_state: AsyncState<SignupResponse>,
    pub login_state: AsyncState<LoginResponse>,
    pub verify_email_state: AsyncState<EmailVerificationResponse>,
    pub resend_verification_state: AsyncState<EmailVerificationResponse>,
    pub verification_status_state: AsyncState<EmailVerificationStatusResponse>,
    pub forgot_password_state: AsyncState<ForgotPasswordResponse>,
    pub reset_token_state: AsyncState<TokenValidationResponse>,
    pub reset_password_state: AsyncState<ResetPasswordResponse>,
    pub change_password_state: AsyncState<ChangePasswordResponse>,
    pub email_exists_state: AsyncState<EmailExistenceResponse>,
    pub profile_status_state: AsyncState<ProfileSetupStatusResponse>,
    pub health_state: AsyncState<String>,
    pub navigation: NavigationSlot<AuthDestination>,
    verification_prompt: watch::Sender<bool>,
}

impl AuthController {
    pub fn new(api: Arc<dyn HackmateApi>, session: Arc<dyn SessionStore>) -> Self {
        let (verification_prompt, _) = watch::channel(false);
        Self {
            api,
            session,
            signup_state: AsyncState::new(),
            login_state: AsyncState::new(),
            verify_email_state: AsyncState::new(),
            resend_verification_state: AsyncState::new(),
            verification_status_state: AsyncState::new(),
            forgot_password_state: AsyncState::new(),
            reset_token_state: AsyncState::new(),
            reset_password_state: AsyncState::new(),
            change_password_state: AsyncState::new(),
            email_exists_state: AsyncState::new(),
            profile_status_state: AsyncState::new(),
            health_state: AsyncState::new(),
            navigation: NavigationSlot::new(),
            verification_prompt,
        }
    }

    pub fn validate_signup_input(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> ValidationReport {
        validation::validate_signup(email, password, confirm_password)
    }

    pub fn validate_login_input(&self, email: &str, password: &str) -> ValidationReport {
        validation::validate_login(email, password)
    }

    pub async fn signup(&self, email: &str, password: &str, confirm_password: &str) {
        let report = self.validate_signup_input(email, password, confirm_password);
        if let Some(message) = report.first_error() {
            reject_locally(&self.signup_state, "signup", message);
            return;
        }

        let request = SignupRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        let Some(body) = run_request(
            &self.signup_state,
            "signup",
            "Signup failed",
            self.api.signup(&request),
        )
        .await
        else {
            return;
        };

        let email = body.email.as_deref().unwrap_or(&request.email);
        log_store_fault("signup", self.session.save_email(email).await);
        self.verification_prompt.send_replace(true);
        info!(verification_email_sent = body.verification_email_sent, "signup accepted");
    }

    pub async fn login(&self, email: &str, password: &str) {
        let report = self.validate_login_input(email, password);
        if let Some(message) = report.first_error() {
            reject_locally(&self.login_state, "login", message);
            return;
        }

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let ticket = self.login_state.start();
        let Some(body) = complete_request(
            &self.login_state,
            ticket,
            "login",
            "Login failed",
            self.api.login(&request),
        )
        .await
        else {
            return;
        };

        self.persist_login(&body, &request.email).await;
        let destination = self.post_login_destination(&body).await;
        // A logout or newer login during the status call owns the session now.
        if !self.login_state.is_current(ticket) {
            debug!(?destination, "login superseded before navigation");
            return;
        }
        if destination == AuthDestination::Home {
            log_store_fault("login", self.session.save_profile_setup(true).await);
        }
        info!(?destination, "post-login destination decided");
        self.navigation.emit(destination);
    }

    async fn persist_login(&self, body: &LoginResponse, typed_email: &str) {
        if let Some(token) = body.token.as_deref() {
            log_store_fault("login", self.session.save_token(token).await);
        }
        let email = body.email.as_deref().unwrap_or(typed_email);
        log_store_fault("login", self.session.save_email(email).await);
        log_store_fault(
            "login",
            self.session.save_email_verified(body.is_email_verified).await,
        );
    }

    async fn post_login_destination(&self, body: &LoginResponse) -> AuthDestination {
        if !body.is_email_verified {
            return decide_post_login(false, None);
        }

        let status = match self.api.profile_setup_status().await {
            Ok(reply) if reply.is_success() => reply.body,
            Ok(reply) => {
                warn!(
                    status = reply.status,
                    message = %reply.message,
                    "profile status unavailable after login"
                );
                None
            }
            Err(fault) => {
                warn!(error = %fault, "profile status request failed after login");
                None
            }
        };

        decide_post_login(true, status.as_ref())
    }

    pub async fn verify_email(&self, verification_token: &str) {
        let request = EmailVerificationRequest {
            verification_token: verification_token.trim().to_string(),
        };
        if request.verification_token.is_empty() {
            reject_locally(
                &self.verify_email_state,
                "verify_email",
                "Verification token is required",
            );
            return;
        }
        if run_request(
            &self.verify_email_state,
            "verify_email",
            "Email verification failed",
            self.api.verify_email(&request),
        )
        .await
        .is_some()
        {
            log_store_fault(
                "verify_email",
                self.session.save_email_verified(true).await,
            );
        }
    }

    pub async fn resend_verification(&self, email: &str) {
        run_request(
            &self.resend_verification_state,
            "resend_verification",
            "Failed to resend verification email",
            self.api.resend_verification(email.trim()),
        )
        .await;
    }

    /// Polls whether `email` has been verified out of band.
    pub async fn check_email_verification(&self, email: &str) {
        let Some(body) = run_request(
            &self.verification_status_state,
            "check_email_verification",
            UNKNOWN_ERROR,
            self.api.check_email_verification(email.trim()),
        )
        .await
        else {
            return;
        };

        if body.verified {
            log_store_fault(
                "check_email_verification",
                self.session.save_email_verified(true).await,
            );
            self.verification_prompt.send_replace(false);
            self.navigation.emit(AuthDestination::ProfileSetup);
        }
    }

    pub async fn forgot_password(&self, email: &str) {
        if let Some(message) = validation::email_error(email) {
            reject_locally(&self.forgot_password_state, "forgot_password", &message);
            return;
        }
        let request = ForgotPasswordRequest {
            email: email.trim().to_string(),
        };
        run_request(
            &self.forgot_password_state,
            "forgot_password",
            "Failed to send reset email",
            self.api.forgot_password(&request),
        )
        .await;
    }

    pub async fn validate_reset_token(&self, token: &str) {
        run_request(
            &self.reset_token_state,
            "validate_reset_token",
            "Invalid or expired reset token",
            self.api.validate_reset_token(token.trim()),
        )
        .await;
    }

    pub async fn reset_password(&self, token: &str, new_password: &str, confirm_password: &str) {
        let problem = validation::password_error(new_password)
            .or_else(|| validation::confirmation_error(new_password, confirm_password));
        if let Some(message) = problem {
            reject_locally(&self.reset_password_state, "reset_password", &message);
            return;
        }
        let request = ResetPasswordRequest {
            reset_token: token.trim().to_string(),
            new_password: new_password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        run_request(
            &self.reset_password_state,
            "reset_password",
            "Password reset failed",
            self.api.reset_password(&request),
        )
        .await;
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirm_new_password: &str,
    ) {
        let problem = validation::password_error(new_password)
            .or_else(|| validation::confirmation_error(new_password, confirm_new_password));
        if let Some(message) = problem {
            reject_locally(&self.change_password_state, "change_password", &message);
            return;
        }
        let request = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
            confirm_new_password: confirm_new_password.to_string(),
        };
        run_request(
            &self.change_password_state,
            "change_password",
            "Password change failed",
            self.api.change_password(&request),
        )
        .await;
    }

    pub async fn check_email_exists(&self, email: &str) {
        run_request(
            &self.email_exists_state,
            "check_email_exists",
            UNKNOWN_ERROR,
            self.api.check_email_exists(email.trim()),
        )
        .await;
    }

    pub async fn profile_setup_status(&self) {
        run_request(
            &self.profile_status_state,
            "profile_setup_status",
            UNKNOWN_ERROR,
            self.api.profile_setup_status(),
        )
        .await;
    }

    pub async fn health(&self) {
        run_request(
            &self.health_state,
            "health",
            "Service unavailable",
            self.api.health(),
        )
        .await;
    }

    pub async fn logout(&self) {
        log_store_fault("logout", self.session.clear().await);
        self.signup_state.reset();
        self.login_state.reset();
        self.verify_email_state.reset();
        self.resend_verification_state.reset();
        self.verification_status_state.reset();
        self.forgot_password_state.reset();
        self.reset_token_state.reset();
        self.reset_password_state.reset();
        self.change_password_state.reset();
        self.email_exists_state.reset();
        self.profile_status_state.reset();
        self.health_state.reset();
        self.navigation.acknowledge();
        self.verification_prompt.send_replace(false);
        info!("logged out");
    }

    pub fn verification_prompt(&self) -> watch::Receiver<bool> {
        self.verification_prompt.subscribe()
    }

    pub fn is_verification_prompt_visible(&self) -> bool {
        *self.verification_prompt.borrow()
    }

    pub fn dismiss_verification_prompt(&self) {
        self.verification_prompt.send_replace(false);
    }
}

#[cfg(test)]
#[path = "../tests/auth_tests.rs"]
mod tests;
