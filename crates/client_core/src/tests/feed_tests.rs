use std::{sync::Arc, time::Duration};

use serde_json::json;

use super::*;
use crate::{
    state::AsyncResult,
    test_support::{page_json, ScriptedApi},
    ApiReply, TransportError,
};

fn controller(mode: PagingMode) -> (Arc<ScriptedApi>, FeedController) {
    let api = Arc::new(ScriptedApi::new());
    let controller = FeedController::new(
        api.clone(),
        FeedOptions {
            paging_mode: mode,
            ..FeedOptions::default()
        },
    );
    (api, controller)
}

fn visible_ids(controller: &FeedController) -> Vec<i64> {
    controller
        .feed_state
        .snapshot()
        .value()
        .map(|page| page.hackathons.iter().map(|h| h.hackathon_id.0).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn refresh_uses_default_filters() {
    let (api, controller) = controller(PagingMode::Append);
    api.ok("hackathon_feed", page_json(&[1, 2], 0, false));

    controller.refresh().await;

    let query = api.last_request("hackathon_feed").expect("feed request");
    assert_eq!(query["sortBy"], "deadline");
    assert_eq!(query["sortDirection"], "ASC");
    assert_eq!(query["page"], "0");
    assert_eq!(query["size"], "20");
    assert_eq!(query["showExpired"], "false");
    assert_eq!(visible_ids(&controller), vec![1, 2]);
}

#[tokio::test]
async fn next_page_after_last_page_is_noop() {
    let (api, controller) = controller(PagingMode::Append);
    api.ok("hackathon_feed", page_json(&[1], 0, false));
    controller.refresh().await;

    assert!(!controller.load_next_page().await);
    assert_eq!(controller.current_page().await, 0);
    assert_eq!(api.calls("hackathon_feed"), 1);
}

#[tokio::test]
async fn next_page_before_any_success_is_noop() {
    let (api, controller) = controller(PagingMode::Append);
    assert!(!controller.load_next_page().await);
    assert_eq!(api.total_calls(), 0);
}

#[tokio::test]
async fn append_mode_accumulates_pages() {
    let (api, controller) = controller(PagingMode::Append);
    api.ok("hackathon_feed", page_json(&[1, 2], 0, true));
    api.ok("hackathon_feed", page_json(&[3, 4], 1, false));

    controller.refresh().await;
    assert!(controller.load_next_page().await);

    assert_eq!(visible_ids(&controller), vec![1, 2, 3, 4]);
    assert_eq!(controller.current_page().await, 1);
    assert!(!controller.has_next_page().await);
    assert_eq!(
        api.last_request("hackathon_feed").expect("request")["page"],
        "1"
    );
}

#[tokio::test]
async fn replace_mode_shows_only_latest_page() {
    let (api, controller) = controller(PagingMode::Replace);
    api.ok("hackathon_feed", page_json(&[1, 2], 0, true));
    api.ok("hackathon_feed", page_json(&[3], 1, false));

    controller.refresh().await;
    controller.load_next_page().await;

    assert_eq!(visible_ids(&controller), vec![3]);
}

#[tokio::test]
async fn failed_next_page_keeps_page_index_for_retry() {
    let (api, controller) = controller(PagingMode::Append);
    api.ok("hackathon_feed", page_json(&[1], 0, true));
    api.status("hackathon_feed", 503, "Service Unavailable");
    api.ok("hackathon_feed", page_json(&[2], 1, false));

    controller.refresh().await;
    controller.load_next_page().await;
    assert_eq!(
        controller.feed_state.snapshot().error(),
        Some("Service Unavailable")
    );
    assert_eq!(controller.current_page().await, 0);

    assert!(controller.load_next_page().await);
    assert_eq!(
        api.last_request("hackathon_feed").expect("request")["page"],
        "1"
    );
    assert_eq!(visible_ids(&controller), vec![1, 2]);
}

#[tokio::test]
async fn filter_change_resets_to_first_page() {
    let (api, controller) = controller(PagingMode::Append);
    api.ok("hackathon_feed", page_json(&[1], 0, true));
    api.ok("hackathon_feed", page_json(&[2], 1, true));
    api.ok("hackathon_feed", page_json(&[9], 0, false));

    controller.refresh().await;
    controller.load_next_page().await;
    controller
        .apply_filters(|filter| {
            filter.show_expired = true;
            filter.sort_direction = SortDirection::Desc;
            filter.size = 500;
        })
        .await;

    let query = api.last_request("hackathon_feed").expect("request");
    assert_eq!(query["page"], "0");
    assert_eq!(query["showExpired"], "true");
    assert_eq!(query["sortDirection"], "DESC");
    assert_eq!(query["size"], "20");
    assert_eq!(visible_ids(&controller), vec![9]);
}

#[tokio::test]
async fn blank_search_clears_query_and_reset_restores_defaults() {
    let (api, controller) = controller(PagingMode::Append);
    for _ in 0..3 {
        api.ok("hackathon_feed", page_json(&[1], 0, false));
    }

    controller.search(" rust ").await;
    assert_eq!(
        api.last_request("hackathon_feed").expect("request")["search"],
        "rust"
    );

    controller.search("   ").await;
    assert!(api.last_request("hackathon_feed").expect("request")["search"].is_null());

    controller
        .apply_filters(|filter| filter.sort_by = Some("postedAt".into()))
        .await;
    controller.reset_filters().await;
    assert_eq!(
        controller.current_filter().await.sort_by.as_deref(),
        Some("deadline")
    );
}

#[tokio::test]
async fn slower_older_search_cannot_overwrite_newer_one() {
    let (api, controller) = controller(PagingMode::Append);
    api.push_delayed(
        "hackathon_feed",
        Some(Duration::from_millis(150)),
        Ok(ApiReply::ok(page_json(&[1], 0, false))),
    );
    api.ok("hackathon_feed", page_json(&[2], 0, false));

    let controller = Arc::new(controller);
    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.search("old").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    controller.search("new").await;
    slow.await.expect("slow search");

    assert_eq!(visible_ids(&controller), vec![2]);
    assert_eq!(
        controller.current_filter().await.search.as_deref(),
        Some("new")
    );
}

#[tokio::test]
async fn next_page_while_loading_is_noop() {
    let (api, controller) = controller(PagingMode::Append);
    api.ok("hackathon_feed", page_json(&[1], 0, true));
    api.push_delayed(
        "hackathon_feed",
        Some(Duration::from_millis(100)),
        Ok(ApiReply::ok(page_json(&[2], 1, false))),
    );
    controller.refresh().await;

    let controller = Arc::new(controller);
    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.load_next_page().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!controller.load_next_page().await);
    assert!(first.await.expect("first next page"));
    assert_eq!(api.calls("hackathon_feed"), 2);
}

#[tokio::test]
async fn registration_toggle_patches_visible_list() {
    let (api, controller) = controller(PagingMode::Append);
    api.ok("hackathon_feed", page_json(&[1, 2], 0, false));
    api.ok(
        "toggle_registration",
        json!({ "success": true, "message": "Registered", "isRegistered": true }),
    );
    controller.refresh().await;

    controller.toggle_registration(HackathonId(2), true).await;

    let page = controller.feed_state.snapshot();
    let hackathon = &page.value().expect("page").hackathons[1];
    assert!(hackathon.is_registered);
    assert_eq!(hackathon.registration_count, 4);
    assert_eq!(
        api.last_request("toggle_registration"),
        Some(json!({ "hackathonId": 2, "register": true }))
    );
}

#[tokio::test]
async fn rejected_star_toggle_leaves_list_untouched() {
    let (api, controller) = controller(PagingMode::Append);
    api.ok("hackathon_feed", page_json(&[1], 0, false));
    api.ok(
        "toggle_star",
        json!({ "success": false, "message": "Hackathon not found" }),
    );
    controller.refresh().await;

    controller.toggle_star(HackathonId(1), true).await;

    assert_eq!(
        controller.star_state.snapshot().error(),
        Some("Hackathon not found")
    );
    assert!(!controller.feed_state.snapshot().value().expect("page").hackathons[0].is_starred);
}

#[tokio::test]
async fn my_lists_use_configured_page_size() {
    let api = Arc::new(ScriptedApi::new());
    let controller = FeedController::new(
        api.clone(),
        FeedOptions {
            page_size: 5,
            ..FeedOptions::default()
        },
    );
    api.ok("my_starred_hackathons", page_json(&[4], 2, false));
    api.fault(
        "my_registered_hackathons",
        TransportError::Timeout("slow".into()),
    );

    controller.my_starred(2).await;
    controller.my_registered(0).await;

    assert_eq!(
        api.last_request("my_starred_hackathons"),
        Some(json!({ "page": 2, "size": 5 }))
    );
    assert!(controller.starred_state.snapshot().value().is_some());
    assert!(matches!(
        controller.registered_state.snapshot(),
        AsyncResult::Error(message) if message.contains("timed out")
    ));
}

#[test]
fn paging_mode_parses_case_insensitively() {
    assert_eq!("Replace".parse::<PagingMode>(), Ok(PagingMode::Replace));
    assert_eq!(" append ".parse::<PagingMode>(), Ok(PagingMode::Append));
    assert!("scroll".parse::<PagingMode>().is_err());
}
