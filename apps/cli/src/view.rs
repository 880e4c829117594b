use std::future::Future;

use anyhow::bail;
use client_core::{AsyncResult, AsyncState};
use futures::StreamExt;
use shared::protocol::{
    Hackathon, HackathonDetailsResponse, HackathonListResponse, PrivateProfileResponse,
    PublicProfileResponse, Review,
};
use tracing::debug;

/// Runs `intent` while following `state`, then returns its settled value.
///
/// Transitions are logged as they arrive; the final Success or Error decides
/// the command's outcome.
pub async fn drive<T, F>(label: &'static str, state: &AsyncState<T>, intent: F) -> anyhow::Result<T>
where
    T: Clone + Send + Sync + 'static,
    F: Future<Output = ()>,
{
    let mut transitions = state.stream();
    let observe = async {
        while let Some(current) = transitions.next().await {
            debug!(operation = label, state = current.label(), "state transition");
        }
    };
    tokio::select! {
        _ = intent => {}
        _ = observe => {}
    }

    match state.snapshot() {
        AsyncResult::Success(value) => Ok(value),
        AsyncResult::Error(message) => bail!("{label} failed: {message}"),
        other => bail!("{label} did not settle (state: {})", other.label()),
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}

pub fn hackathon_line(hackathon: &Hackathon) -> String {
    let mut flags = Vec::new();
    if hackathon.is_registered {
        flags.push("registered");
    }
    if hackathon.is_starred {
        flags.push("starred");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };
    format!(
        "#{:<5} {}  deadline: {}  location: {}  registrations: {}{}",
        hackathon.hackathon_id,
        hackathon.title,
        or_dash(hackathon.deadline.as_deref()),
        or_dash(hackathon.location.as_deref()),
        hackathon.registration_count,
        flags
    )
}

pub fn print_page(page: &HackathonListResponse) {
    if page.hackathons.is_empty() {
        println!("No hackathons found.");
    }
    for hackathon in &page.hackathons {
        println!("{}", hackathon_line(hackathon));
    }
    println!(
        "page {} of {} ({} total){}",
        page.current_page + 1,
        page.total_pages.max(1),
        page.total_elements,
        if page.has_next { ", more available" } else { "" }
    );
}

pub fn print_details(details: &HackathonDetailsResponse) {
    println!("{} (#{})", details.title, details.hackathon_id);
    println!("{}", details.description);
    println!("  organizer:     {}", or_dash(details.organizer.as_deref()));
    println!("  location:      {}", or_dash(details.location.as_deref()));
    println!("  prize pool:    {}", or_dash(details.prize_pool.as_deref()));
    println!("  deadline:      {}", or_dash(details.deadline.as_deref()));
    println!(
        "  event:         {} .. {}",
        or_dash(details.event_start_date.as_deref()),
        or_dash(details.event_end_date.as_deref())
    );
    if let (Some(min), Some(max)) = (details.min_team_size, details.max_team_size) {
        println!("  team size:     {min}-{max}");
    }
    println!("  register at:   {}", or_dash(details.registration_link.as_deref()));
    if !details.tags.is_empty() {
        println!("  tags:          {}", details.tags.join(", "));
    }
    println!(
        "  registrations: {}  views: {}  registered: {}  starred: {}{}",
        details.registration_count,
        details.view_count,
        details.is_registered,
        details.is_starred,
        if details.is_expired { "  (expired)" } else { "" }
    );
}

fn print_reviews(reviews: &[Review]) {
    for review in reviews {
        println!(
            "  {}/5 from {}: {}",
            review.rating,
            review.reviewer_name,
            or_dash(review.comment.as_deref())
        );
    }
}

pub fn print_private_profile(profile: &PrivateProfileResponse) {
    println!("{} <{}> (user #{})", profile.full_name, profile.email, profile.user_id);
    println!("  college: {} (year {})", profile.college, profile.year);
    println!("  bio:     {}", or_dash(profile.bio.as_deref()));
    println!("  skills:  {}", profile.skills.join(", "));
    println!(
        "  hackathons: {} participated, {} won",
        profile.hackathons_participated, profile.hackathons_won
    );
    println!(
        "  rating:  {:.1} from {} reviews",
        profile.average_rating, profile.total_reviews
    );
    print_reviews(&profile.recent_reviews);
}

pub fn print_public_profile(profile: &PublicProfileResponse) {
    println!("{} (user #{})", profile.full_name, profile.user_id);
    println!("  college: {} (year {})", profile.college, profile.year);
    println!("  bio:     {}", or_dash(profile.bio.as_deref()));
    if !profile.badges.is_empty() {
        println!("  badges:  {}", profile.badges.join(", "));
    }
    println!(
        "  rating:  {:.1} from {} reviews",
        profile.average_rating, profile.total_reviews
    );
    print_reviews(&profile.public_reviews);
}
