use std::sync::Arc;

use storage::SessionStore;
use tracing::{info, warn};

use super::log_store_fault;
use crate::{navigation::NavigationSlot, HackmateApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplashDestination {
    Auth,
    EmailVerification,
    ProfileSetup,
    Home,
}

/// Restores a stored session at startup and routes to the matching screen.
pub struct SplashController {
    api: Arc<dyn HackmateApi>,
    session: Arc<dyn SessionStore>,
    pub navigation: NavigationSlot<SplashDestination>,
}

impl SplashController {
    pub fn new(api: Arc<dyn HackmateApi>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            session,
            navigation: NavigationSlot::new(),
        }
    }

    pub async fn check_user_state(&self) {
        let destination = self.resolve_destination().await;
        info!(?destination, "splash destination decided");
        self.navigation.emit(destination);
    }

    async fn resolve_destination(&self) -> SplashDestination {
        let token = match self.session.token().await {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(err) => {
                warn!(error = %err, "could not read stored session");
                None
            }
        };
        if token.is_none() {
            return SplashDestination::Auth;
        }

        match self.api.profile_setup_status().await {
            Ok(reply) if reply.is_success() => match reply.body {
                Some(status) if status.is_complete() => {
                    log_store_fault(
                        "check_user_state",
                        self.session.save_profile_setup(true).await,
                    );
                    SplashDestination::Home
                }
                Some(_) => SplashDestination::ProfileSetup,
                None => SplashDestination::Auth,
            },
            Ok(reply) if reply.status == 403 => SplashDestination::EmailVerification,
            Ok(reply) => {
                warn!(status = reply.status, "stored session rejected; clearing it");
                log_store_fault("check_user_state", self.session.clear().await);
                SplashDestination::Auth
            }
            Err(fault) => {
                warn!(error = %fault, "session check failed; clearing stored session");
                log_store_fault("check_user_state", self.session.clear().await);
                SplashDestination::Auth
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/splash_tests.rs"]
mod tests;
