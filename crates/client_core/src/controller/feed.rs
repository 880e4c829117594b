use std::{str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{HackathonId, SortDirection},
    protocol::{
        Hackathon, HackathonFilter, HackathonListResponse, RegistrationToggleRequest,
        RegistrationToggleResponse, StarToggleRequest, StarToggleResponse,
    },
};
use tokio::sync::Mutex;
use tracing::debug;

use super::{complete_request, run_request};
use crate::{state::AsyncState, validation::non_blank, ApiResult, HackmateApi, RequestTicket};

/// How later feed pages combine with what is already visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// Page 0 replaces the list; later pages extend it.
    #[default]
    Append,
    /// Every page replaces the list.
    Replace,
}

impl FromStr for PagingMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(PagingMode::Append),
            "replace" => Ok(PagingMode::Replace),
            other => Err(format!("unknown paging mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub page_size: u32,
    pub paging_mode: PagingMode,
    pub default_sort_by: String,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            page_size: 20,
            paging_mode: PagingMode::Append,
            default_sort_by: "deadline".to_string(),
        }
    }
}

impl FeedOptions {
    fn initial_filter(&self) -> HackathonFilter {
        HackathonFilter {
            sort_by: Some(self.default_sort_by.clone()),
            sort_direction: SortDirection::Asc,
            size: self.page_size.max(1),
            ..HackathonFilter::default()
        }
    }
}

struct FeedCursor {
    /// `page` is the last page that loaded successfully.
    filter: HackathonFilter,
    has_next: bool,
    visible: Vec<Hackathon>,
}

pub struct FeedController {
    api: Arc<dyn HackmateApi>,
    options: FeedOptions,
    cursor: Mutex<FeedCursor>,
    /// Visible list; in append mode it carries every page loaded so far.
    pub feed_state: AsyncState<HackathonListResponse>,
    pub registered_state: AsyncState<HackathonListResponse>,
    pub starred_state: AsyncState<HackathonListResponse>,
    pub registration_state: AsyncState<RegistrationToggleResponse>,
    pub star_state: AsyncState<StarToggleResponse>,
}

impl FeedController {
    pub fn new(api: Arc<dyn HackmateApi>, options: FeedOptions) -> Self {
        let cursor = FeedCursor {
            filter: options.initial_filter(),
            has_next: false,
            visible: Vec::new(),
        };
        Self {
            api,
            options,
            cursor: Mutex::new(cursor),
            feed_state: AsyncState::new(),
            registered_state: AsyncState::new(),
            starred_state: AsyncState::new(),
            registration_state: AsyncState::new(),
            star_state: AsyncState::new(),
        }
    }

    pub fn options(&self) -> &FeedOptions {
        &self.options
    }

    pub async fn current_filter(&self) -> HackathonFilter {
        self.cursor.lock().await.filter.clone()
    }

    pub async fn current_page(&self) -> u32 {
        self.cursor.lock().await.filter.page
    }

    pub async fn has_next_page(&self) -> bool {
        self.cursor.lock().await.has_next
    }

    /// Reloads page 0 with the current filters.
    pub async fn refresh(&self) {
        self.reload(|_| {}).await;
    }

    pub async fn search(&self, query: &str) {
        let search = non_blank(query);
        self.reload(move |filter| filter.search = search).await;
    }

    /// Applies arbitrary filter edits and reloads from page 0. Page size is
    /// owned by the controller and survives the edit.
    pub async fn apply_filters(&self, edit: impl FnOnce(&mut HackathonFilter)) {
        let size = self.options.page_size.max(1);
        self.reload(move |filter| {
            edit(filter);
            filter.size = size;
        })
        .await;
    }

    pub async fn reset_filters(&self) {
        let initial = self.options.initial_filter();
        self.reload(move |filter| *filter = initial).await;
    }

    /// Requests the page after the last loaded one.
    ///
    /// Returns `false` without touching the network when the last page said
    /// there is nothing more, or when a feed load is already in flight.
    pub async fn load_next_page(&self) -> bool {
        let (ticket, filter, prefix) = {
            let cursor = self.cursor.lock().await;
            if !cursor.has_next || self.feed_state.is_loading() {
                debug!(
                    page = cursor.filter.page,
                    has_next = cursor.has_next,
                    "next page request ignored"
                );
                return false;
            }
            let mut filter = cursor.filter.clone();
            filter.page += 1;
            let prefix = match self.options.paging_mode {
                PagingMode::Append => cursor.visible.clone(),
                PagingMode::Replace => Vec::new(),
            };
            (self.feed_state.start(), filter, prefix)
        };
        self.fetch(ticket, filter, prefix).await;
        true
    }

    async fn reload(&self, edit: impl FnOnce(&mut HackathonFilter)) {
        let (ticket, filter) = {
            let mut cursor = self.cursor.lock().await;
            edit(&mut cursor.filter);
            cursor.filter.page = 0;
            cursor.has_next = false;
            cursor.visible.clear();
            (self.feed_state.start(), cursor.filter.clone())
        };
        self.fetch(ticket, filter, Vec::new()).await;
    }

    async fn fetch(&self, ticket: RequestTicket, filter: HackathonFilter, prefix: Vec<Hackathon>) {
        let requested_page = filter.page;
        let call = async {
            let mut reply = self.api.hackathon_feed(&filter).await?;
            if let Some(page) = reply.body.as_mut() {
                page.hackathons.splice(0..0, prefix);
            }
            ApiResult::Ok(reply)
        };

        let Some(page) = complete_request(
            &self.feed_state,
            ticket,
            "hackathon_feed",
            "Failed to load hackathons",
            call,
        )
        .await
        else {
            return;
        };

        let mut cursor = self.cursor.lock().await;
        cursor.filter.page = requested_page;
        cursor.has_next = page.has_next;
        cursor.visible = page.hackathons;
    }

    pub async fn my_registered(&self, page: u32) {
        run_request(
            &self.registered_state,
            "my_registered_hackathons",
            "Failed to load registered hackathons",
            self.api
                .my_registered_hackathons(page, self.options.page_size.max(1)),
        )
        .await;
    }

    pub async fn my_starred(&self, page: u32) {
        run_request(
            &self.starred_state,
            "my_starred_hackathons",
            "Failed to load starred hackathons",
            self.api
                .my_starred_hackathons(page, self.options.page_size.max(1)),
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
            self.patch(hackathon_id, |h| h.apply_registration(register))
                .await;
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
            self.patch(hackathon_id, |h| h.is_starred = star).await;
        }
    }

    async fn patch(&self, hackathon_id: HackathonId, apply: impl Fn(&mut Hackathon)) {
        let patch_list = |list: &mut HackathonListResponse| {
            list.hackathons
                .iter_mut()
                .filter(|h| h.hackathon_id == hackathon_id)
                .for_each(&apply);
        };
        self.feed_state.update_success(&patch_list);
        self.registered_state.update_success(&patch_list);
        self.starred_state.update_success(&patch_list);

        let mut cursor = self.cursor.lock().await;
        cursor
            .visible
            .iter_mut()
            .filter(|h| h.hackathon_id == hackathon_id)
            .for_each(&apply);
    }
}

#[cfg(test)]
#[path = "../tests/feed_tests.rs"]
mod tests;
