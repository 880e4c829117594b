use std::sync::Arc;

use shared::{
    domain::UserId,
    protocol::{
        AddReviewRequest, AddReviewResponse, PrivateProfileResponse, ProfileSetupRequest,
        ProfileSetupResponse, ProfileUpdateRequest, ProfileUpdateResponse, PublicProfileResponse,
    },
};
use storage::SessionStore;
use tracing::info;

use super::{log_store_fault, reject_locally, run_request, UNKNOWN_ERROR};
use crate::{navigation::NavigationSlot, state::AsyncState, HackmateApi};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

pub struct ProfileController {
    api: Arc<dyn HackmateApi>,
    pub my_profile_state: AsyncState<PrivateProfileResponse>,
    pub public_profile_state: AsyncState<PublicProfileResponse>,
    pub review_state: AsyncState<AddReviewResponse>,
}

impl ProfileController {
    pub fn new(api: Arc<dyn HackmateApi>) -> Self {
        Self {
            api,
            my_profile_state: AsyncState::new(),
            public_profile_state: AsyncState::new(),
            review_state: AsyncState::new(),
        }
    }

    pub async fn load_my_profile(&self) {
        run_request(
            &self.my_profile_state,
            "my_profile",
            "Failed to load profile",
            self.api.my_profile(),
        )
        .await;
    }

    pub async fn load_public_profile(&self, user_id: UserId) {
        run_request(
            &self.public_profile_state,
            "public_profile",
            "Failed to load profile",
            self.api.public_profile(user_id),
        )
        .await;
    }

    pub async fn add_review(&self, mut request: AddReviewRequest) {
        if !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
            reject_locally(
                &self.review_state,
                "add_review",
                &format!("Rating must be between {MIN_RATING} and {MAX_RATING}"),
            );
            return;
        }
        request.comment = request
            .comment
            .as_deref()
            .and_then(crate::validation::non_blank);

        let reviewed = request.user_id_to_review;
        if run_request(
            &self.review_state,
            "add_review",
            UNKNOWN_ERROR,
            self.api.add_review(&request),
        )
        .await
        .is_some()
        {
            self.refresh_reviewed(reviewed).await;
        }
    }

    /// Reloads the public profile on screen when it belongs to `user_id`, so
    /// its rating reflects the new review.
    async fn refresh_reviewed(&self, user_id: UserId) {
        let showing = self
            .public_profile_state
            .inspect(|state| state.value().map(|profile| profile.user_id));
        if showing == Some(user_id) {
            self.load_public_profile(user_id).await;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSetupDestination {
    Home,
}

pub struct ProfileSetupController {
    api: Arc<dyn HackmateApi>,
    session: Arc<dyn SessionStore>,
    pub setup_state: AsyncState<ProfileSetupResponse>,
    pub update_state: AsyncState<ProfileUpdateResponse>,
    pub navigation: NavigationSlot<ProfileSetupDestination>,
}

impl ProfileSetupController {
    pub fn new(api: Arc<dyn HackmateApi>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            session,
            setup_state: AsyncState::new(),
            update_state: AsyncState::new(),
            navigation: NavigationSlot::new(),
        }
    }

    pub async fn setup_profile(&self, request: ProfileSetupRequest) {
        if request.full_name.trim().is_empty() {
            reject_locally(&self.setup_state, "setup_profile", "Full name is required");
            return;
        }
        if request.college.trim().is_empty() {
            reject_locally(&self.setup_state, "setup_profile", "College is required");
            return;
        }

        let Some(body) = run_request(
            &self.setup_state,
            "setup_profile",
            "Profile setup failed",
            self.api.setup_profile(&request),
        )
        .await
        else {
            return;
        };

        log_store_fault("setup_profile", self.session.save_profile_setup(true).await);
        info!(
            completion = body.profile_completion_percentage,
            "profile setup accepted"
        );
        self.navigation.emit(ProfileSetupDestination::Home);
    }

    pub async fn update_profile(&self, request: ProfileUpdateRequest) {
        run_request(
            &self.update_state,
            "update_profile",
            "Profile update failed",
            self.api.update_profile(&request),
        )
        .await;
    }
}

#[cfg(test)]
#[path = "../tests/profile_tests.rs"]
mod tests;
