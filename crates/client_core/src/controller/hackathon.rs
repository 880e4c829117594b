use std::sync::Arc;

use shared::{
    domain::HackathonId,
    protocol::{
        AiExtractionRequest, AiExtractionResponse, CreateHackathonRequest,
        CreateHackathonResponse, HackathonDetailsResponse, RegistrationToggleRequest,
        RegistrationToggleResponse, StarToggleRequest, StarToggleResponse,
    },
};

use super::{reject_locally, run_request, UNKNOWN_ERROR};
use crate::{state::AsyncState, validation::non_blank, HackmateApi};

pub const MIN_EXTRACTION_LEN: usize = 50;

pub struct HackathonDetailsController {
    api: Arc<dyn HackmateApi>,
    pub details_state: AsyncState<HackathonDetailsResponse>,
    pub registration_state: AsyncState<RegistrationToggleResponse>,
    pub star_state: AsyncState<StarToggleResponse>,
}

impl HackathonDetailsController {
    pub fn new(api: Arc<dyn HackmateApi>) -> Self {
        Self {
            api,
            details_state: AsyncState::new(),
            registration_state: AsyncState::new(),
            star_state: AsyncState::new(),
        }
    }

    pub async fn load(&self, hackathon_id: HackathonId) {
        run_request(
            &self.details_state,
            "hackathon_details",
            "Failed to load hackathon",
            self.api.hackathon_details(hackathon_id),
        )
        .await;
    }

    pub async fn toggle_registration(&self, hackathon_id: HackathonId, register: bool) {
        let request = RegistrationToggleRequest {
            hackathon_id,
            register,
        };
        if run_request(
            &self.registration_state,
            "toggle_registration",
            "Failed to update registration",
            self.api.toggle_registration(&request),
        )
        .await
        .is_some()
        {
            self.details_state.update_success(|details| {
                if details.hackathon_id == hackathon_id {
                    details.apply_registration(register);
                }
            });
        }
    }

    pub async fn toggle_star(&self, hackathon_id: HackathonId, star: bool) {
        let request = StarToggleRequest { hackathon_id, star };
        if run_request(
            &self.star_state,
            "toggle_star",
            "Failed to update star",
            self.api.toggle_star(&request),
        )
        .await
        .is_some()
        {
            self.details_state.update_success(|details| {
                if details.hackathon_id == hackathon_id {
                    details.is_starred = star;
                }
            });
        }
    }
}

/// Hackathon submission form exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HackathonDraft {
    pub title: String,
    pub description: String,
    pub registration_link: String,
    pub deadline: String,
    pub poster_url: String,
    pub tags: Vec<String>,
    pub organizer: String,
    pub location: String,
    pub prize_pool: String,
    pub event_start_date: String,
    pub event_end_date: String,
    pub max_team_size: String,
    pub min_team_size: String,
    pub original_message: String,
    pub contact_email: String,
}

impl HackathonDraft {
    /// Checks required fields and normalizes the rest into a request.
    pub fn to_request(&self) -> Result<CreateHackathonRequest, String> {
        let required = |value: &str, label: &str| {
            non_blank(value).ok_or_else(|| format!("{label} is required"))
        };
        Ok(CreateHackathonRequest {
            title: required(&self.title, "Title")?,
            description: required(&self.description, "Description")?,
            registration_link: required(&self.registration_link, "Registration link")?,
            deadline: required(&self.deadline, "Deadline")?,
            poster_url: non_blank(&self.poster_url),
            tags: self.tags.iter().filter_map(|t| non_blank(t)).collect(),
            organizer: non_blank(&self.organizer),
            location: non_blank(&self.location),
            prize_pool: non_blank(&self.prize_pool),
            event_start_date: non_blank(&self.event_start_date),
            event_end_date: non_blank(&self.event_end_date),
            max_team_size: self.max_team_size.trim().parse().ok(),
            min_team_size: self.min_team_size.trim().parse().ok(),
            original_message: non_blank(&self.original_message),
            contact_email: non_blank(&self.contact_email),
        })
    }

    /// Prefills empty fields from an extraction result, keeping typed values.
    pub fn merge_extraction(&mut self, extraction: &AiExtractionResponse, message: &str) {
        fn fill(slot: &mut String, value: &Option<String>) {
            if slot.trim().is_empty() {
                if let Some(value) = value.as_deref().and_then(non_blank) {
                    *slot = value;
                }
            }
        }
        fill(&mut self.title, &extraction.extracted_title);
        fill(&mut self.description, &extraction.extracted_description);
        fill(
            &mut self.registration_link,
            &extraction.extracted_registration_link,
        );
        fill(&mut self.deadline, &extraction.extracted_deadline);
        fill(&mut self.organizer, &extraction.extracted_organizer);
        fill(&mut self.location, &extraction.extracted_location);
        fill(&mut self.prize_pool, &extraction.extracted_prize_pool);
        if self.tags.is_empty() {
            self.tags = extraction.extracted_tags.clone().unwrap_or_default();
        }
        if self.original_message.trim().is_empty() {
            self.original_message = message.trim().to_string();
        }
    }
}

pub struct CreateHackathonController {
    api: Arc<dyn HackmateApi>,
    pub create_state: AsyncState<CreateHackathonResponse>,
    pub extraction_state: AsyncState<AiExtractionResponse>,
}

impl CreateHackathonController {
    pub fn new(api: Arc<dyn HackmateApi>) -> Self {
        Self {
            api,
            create_state: AsyncState::new(),
            extraction_state: AsyncState::new(),
        }
    }

    pub async fn create(&self, draft: &HackathonDraft) {
        let request = match draft.to_request() {
            Ok(request) => request,
            Err(message) => {
                reject_locally(&self.create_state, "create_hackathon", &message);
                return;
            }
        };
        run_request(
            &self.create_state,
            "create_hackathon",
            UNKNOWN_ERROR,
            self.api.create_hackathon(&request),
        )
        .await;
    }

    /// Asks the server to pull hackathon fields out of a pasted announcement.
    pub async fn extract_with_ai(&self, message: &str) -> Option<AiExtractionResponse> {
        let message_text = message.trim();
        if message_text.chars().count() < MIN_EXTRACTION_LEN {
            reject_locally(
                &self.extraction_state,
                "extract_hackathon",
                &format!("Message must be at least {MIN_EXTRACTION_LEN} characters"),
            );
            return None;
        }
        let request = AiExtractionRequest {
            message_text: message_text.to_string(),
        };
        run_request(
            &self.extraction_state,
            "extract_hackathon",
            "Extraction failed",
            self.api.extract_hackathon(&request),
        )
        .await
    }
}

#[cfg(test)]
#[path = "../tests/hackathon_tests.rs"]
mod tests;
