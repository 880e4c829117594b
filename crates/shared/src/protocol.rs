use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{HackathonId, ReviewId, SortDirection, UserId};

/// Application-level verdict carried inside an otherwise successful reply.
///
/// Several endpoints answer HTTP 200 with `success: false` and a reason in
/// `message`; those bodies report the reason through `rejection`.
pub trait ApplicationVerdict {
    fn rejection(&self) -> Option<String> {
        None
    }
}

macro_rules! acknowledged {
    ($($name:ident),+ $(,)?) => {
        $(
            impl ApplicationVerdict for $name {
                fn rejection(&self) -> Option<String> {
                    if self.success {
                        None
                    } else {
                        Some(self.message.clone())
                    }
                }
            }
        )+
    };
}

macro_rules! no_verdict {
    ($($name:ty),+ $(,)?) => {
        $(impl ApplicationVerdict for $name {})+
    };
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(value) => value,
        Raw::Text(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "sent"
        ),
        Raw::Null => false,
    })
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "emailVerified")]
    pub is_email_verified: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub verification_email_sent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "profileSetup")]
    pub is_profile_setup: bool,
    #[serde(default, alias = "emailVerified")]
    pub is_email_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSetupStatusResponse {
    #[serde(default, alias = "profileSetup")]
    pub is_profile_setup: bool,
    #[serde(default)]
    pub completion_percentage: i32,
}

impl ProfileSetupStatusResponse {
    /// The backend reports completeness twice; either field suffices.
    pub fn is_complete(&self) -> bool {
        self.is_profile_setup || self.completion_percentage >= 100
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailVerificationRequest {
    pub verification_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailVerificationResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub verified_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailVerificationStatusResponse {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "isVerified")]
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailExistenceResponse {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub exists: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reset_email_sent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub reset_token: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub changed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenValidationResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSetupRequest {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub hackathons_participated: u32,
    #[serde(default)]
    pub hackathons_won: u32,
    pub college: String,
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_skill: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSetupResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub profile_completion_percentage: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub profile_completion_percentage: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: ReviewId,
    #[serde(default)]
    pub reviewer_name: String,
    #[serde(default)]
    pub reviewer_avatar_id: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub hackathon_name: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateProfileResponse {
    pub user_id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub hackathons_participated: u32,
    #[serde(default)]
    pub hackathons_won: u32,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub github_profile: Option<String>,
    #[serde(default)]
    pub linkedin_profile: Option<String>,
    #[serde(default)]
    pub portfolio_url: Option<String>,
    #[serde(default)]
    pub avatar_id: Option<String>,
    #[serde(default)]
    pub main_skill: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_reviews: u32,
    #[serde(default)]
    pub recent_reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfileResponse {
    pub user_id: UserId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub hackathons_participated: u32,
    #[serde(default)]
    pub hackathons_won: u32,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub github_profile: Option<String>,
    #[serde(default)]
    pub linkedin_profile: Option<String>,
    #[serde(default)]
    pub portfolio_url: Option<String>,
    #[serde(default)]
    pub avatar_id: Option<String>,
    #[serde(default)]
    pub main_skill: Option<String>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_reviews: u32,
    #[serde(default)]
    pub public_reviews: Vec<Review>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub joined_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewRequest {
    pub user_id_to_review: UserId,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hackathon_id: Option<HackathonId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub review_id: Option<ReviewId>,
    #[serde(default)]
    pub reviewed_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Hackathons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hackathon {
    pub hackathon_id: HackathonId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub registration_link: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub prize_pool: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub registration_count: u64,
    #[serde(default)]
    pub team_count: u64,
    #[serde(default, alias = "registered")]
    pub is_registered: bool,
    #[serde(default, alias = "starred")]
    pub is_starred: bool,
    #[serde(default)]
    pub urgency_level: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
}

impl Hackathon {
    /// Applies a confirmed registration toggle to the local copy.
    pub fn apply_registration(&mut self, registered: bool) {
        if self.is_registered == registered {
            return;
        }
        self.is_registered = registered;
        self.registration_count = if registered {
            self.registration_count.saturating_add(1)
        } else {
            self.registration_count.saturating_sub(1)
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HackathonListResponse {
    #[serde(default)]
    pub hackathons: Vec<Hackathon>,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
}

/// Query parameters of the public feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HackathonFilter {
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub status: Option<String>,
    pub urgency_level: Option<String>,
    pub organizer: Option<String>,
    pub location: Option<String>,
    pub show_expired: bool,
    pub sort_by: Option<String>,
    pub sort_direction: SortDirection,
    pub page: u32,
    pub size: u32,
}

impl Default for HackathonFilter {
    fn default() -> Self {
        Self {
            search: None,
            tags: Vec::new(),
            status: None,
            urgency_level: None,
            organizer: None,
            location: None,
            show_expired: false,
            sort_by: None,
            sort_direction: SortDirection::Asc,
            page: 0,
            size: 20,
        }
    }
}

impl HackathonFilter {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        for tag in &self.tags {
            pairs.push(("tags", tag.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(urgency) = &self.urgency_level {
            pairs.push(("urgencyLevel", urgency.clone()));
        }
        if let Some(organizer) = &self.organizer {
            pairs.push(("organizer", organizer.clone()));
        }
        if let Some(location) = &self.location {
            pairs.push(("location", location.clone()));
        }
        pairs.push(("showExpired", self.show_expired.to_string()));
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy", sort_by.clone()));
        }
        pairs.push(("sortDirection", self.sort_direction.as_query_value().to_string()));
        pairs.push(("page", self.page.to_string()));
        pairs.push(("size", self.size.to_string()));
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HackathonDetailsResponse {
    pub hackathon_id: HackathonId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub registration_link: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub prize_pool: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub event_start_date: Option<String>,
    #[serde(default)]
    pub event_end_date: Option<String>,
    #[serde(default)]
    pub max_team_size: Option<u32>,
    #[serde(default)]
    pub min_team_size: Option<u32>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub registration_count: u64,
    #[serde(default)]
    pub team_count: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "registered")]
    pub is_registered: bool,
    #[serde(default, alias = "starred")]
    pub is_starred: bool,
    #[serde(default, alias = "expired")]
    pub is_expired: bool,
    #[serde(default)]
    pub urgency_level: Option<String>,
    #[serde(default)]
    pub posted_by: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub approved_at: Option<String>,
}

impl HackathonDetailsResponse {
    pub fn apply_registration(&mut self, registered: bool) {
        if self.is_registered == registered {
            return;
        }
        self.is_registered = registered;
        self.registration_count = if registered {
            self.registration_count.saturating_add(1)
        } else {
            self.registration_count.saturating_sub(1)
        };
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHackathonRequest {
    pub title: String,
    pub description: String,
    pub registration_link: String,
    pub deadline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prize_pool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_team_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_team_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHackathonResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub hackathon_id: Option<HackathonId>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationToggleRequest {
    pub hackathon_id: HackathonId,
    pub register: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationToggleResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "registered")]
    pub is_registered: bool,
    #[serde(default)]
    pub action_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarToggleRequest {
    pub hackathon_id: HackathonId,
    pub star: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarToggleResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "starred")]
    pub is_starred: bool,
    #[serde(default)]
    pub action_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiExtractionRequest {
    pub message_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiExtractionResponse {
    pub success: bool,
    #[serde(default)]
    pub extracted_title: Option<String>,
    #[serde(default)]
    pub extracted_description: Option<String>,
    #[serde(default)]
    pub extracted_registration_link: Option<String>,
    #[serde(default)]
    pub extracted_deadline: Option<String>,
    #[serde(default)]
    pub extracted_tags: Option<Vec<String>>,
    #[serde(default)]
    pub extracted_organizer: Option<String>,
    #[serde(default)]
    pub extracted_location: Option<String>,
    #[serde(default)]
    pub extracted_prize_pool: Option<String>,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ApplicationVerdict for AiExtractionResponse {
    fn rejection(&self) -> Option<String> {
        if self.success {
            None
        } else {
            Some(
                self.error_message
                    .clone()
                    .unwrap_or_else(|| "Extraction failed".to_string()),
            )
        }
    }
}

impl ApplicationVerdict for LoginResponse {
    /// A login without a session token cannot authenticate anything later.
    fn rejection(&self) -> Option<String> {
        match self.token.as_deref() {
            Some(token) if !token.trim().is_empty() => None,
            _ => Some("Login failed: no session token returned".to_string()),
        }
    }
}

acknowledged!(
    EmailVerificationResponse,
    ForgotPasswordResponse,
    ResetPasswordResponse,
    ChangePasswordResponse,
    TokenValidationResponse,
    ProfileSetupResponse,
    ProfileUpdateResponse,
    AddReviewResponse,
    CreateHackathonResponse,
    RegistrationToggleResponse,
    StarToggleResponse,
);

no_verdict!(
    String,
    SignupResponse,
    ProfileSetupStatusResponse,
    EmailVerificationStatusResponse,
    EmailExistenceResponse,
    PrivateProfileResponse,
    PublicProfileResponse,
    HackathonListResponse,
    HackathonDetailsResponse,
);
