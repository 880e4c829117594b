use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AuthController, AuthDestination, CreateHackathonController, FeedController,
    HackathonDetailsController, HackathonDraft, HackmateApi, HttpApiClient, ProfileController,
    ProfileSetupController, SplashController, SplashDestination,
};
use shared::{
    domain::{HackathonId, SortDirection, UserId},
    protocol::{AddReviewRequest, ProfileSetupRequest},
};
use storage::{SessionStore, SqliteSessionStore};
use tracing::info;

mod config;
mod view;

use config::{load_settings, Settings};
use view::drive;

#[derive(Parser, Debug)]
#[command(name = "hackmate", about = "Terminal client for the HackMate API")]
struct Cli {
    /// Config file (default: ./hackmate.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Restore the stored session and report where the app would start.
    Status,
    Health,
    Signup {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: Option<String>,
    },
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Submit the token from the verification email.
    Verify {
        token: String,
    },
    VerificationStatus {
        email: Option<String>,
    },
    ResendVerification {
        email: Option<String>,
    },
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        token: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_password: Option<String>,
    },
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: Option<String>,
    },
    Logout,
    Feed {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        show_expired: bool,
        #[arg(long)]
        sort_by: Option<String>,
        /// asc or desc
        #[arg(long)]
        direction: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        location: Option<String>,
        /// Number of pages to fetch.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// List hackathons you registered for or starred.
    Mine {
        #[arg(long)]
        starred: bool,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    Hackathon {
        id: i64,
    },
    Register {
        id: i64,
        #[arg(long)]
        undo: bool,
    },
    Star {
        id: i64,
        #[arg(long)]
        undo: bool,
    },
    Profile {
        #[arg(long)]
        user: Option<i64>,
    },
    SetupProfile {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        college: String,
        #[arg(long)]
        year: String,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long = "skill")]
        skills: Vec<String>,
    },
    Review {
        user: i64,
        rating: u8,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        hackathon: Option<i64>,
    },
    /// Submit a hackathon, optionally prefilled from a pasted announcement.
    SubmitHackathon {
        #[arg(long)]
        extract_from: Option<String>,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        link: String,
        #[arg(long, default_value = "")]
        deadline: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

struct App {
    settings: Settings,
    session: Arc<dyn SessionStore>,
    api: Arc<dyn HackmateApi>,
}

impl App {
    async fn open(settings: Settings) -> Result<Self> {
        let session: Arc<dyn SessionStore> =
            Arc::new(SqliteSessionStore::open(&settings.session_db).await?);
        let api = HttpApiClient::new(settings.http_options(), session.clone())
            .context("failed to build api client")?;
        Ok(Self {
            settings,
            session,
            api: Arc::new(api),
        })
    }

    fn auth(&self) -> AuthController {
        AuthController::new(self.api.clone(), self.session.clone())
    }

    async fn stored_email(&self, explicit: Option<String>) -> Result<String> {
        if let Some(email) = explicit {
            return Ok(email);
        }
        self.session
            .email()
            .await?
            .ok_or_else(|| anyhow!("no email given and none stored; pass one explicitly"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();
    info!(api_url = %settings.api_url, session_db = %settings.session_db, "hackmate starting");

    let app = App::open(settings).await?;
    run(&app, cli.command).await
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Status => {
            let splash = SplashController::new(app.api.clone(), app.session.clone());
            splash.check_user_state().await;
            let destination = splash
                .navigation
                .take()
                .ok_or_else(|| anyhow!("session check produced no destination"))?;
            let session = app.session.load().await?;
            match session.email {
                Some(email) => println!("session: {email}"),
                None => println!("session: none"),
            }
            println!("start screen: {}", splash_hint(destination));
        }
        Command::Health => {
            let auth = app.auth();
            let text = drive("health", &auth.health_state, auth.health()).await?;
            println!("{text}");
        }
        Command::Signup {
            email,
            password,
            confirm_password,
        } => {
            let auth = app.auth();
            let confirm = confirm_password.unwrap_or_else(|| password.clone());
            let reply = drive(
                "signup",
                &auth.signup_state,
                auth.signup(&email, &password, &confirm),
            )
            .await?;
            println!(
                "{}",
                reply.message.as_deref().unwrap_or("Account created.")
            );
            if auth.is_verification_prompt_visible() {
                println!("Check your inbox, then run `hackmate verify <token>`.");
            }
        }
        Command::Login { email, password } => {
            let auth = app.auth();
            drive("login", &auth.login_state, auth.login(&email, &password)).await?;
            match auth.navigation.take() {
                Some(destination) => println!("logged in; next: {}", auth_hint(destination)),
                None => println!("logged in"),
            }
        }
        Command::Verify { token } => {
            let auth = app.auth();
            let reply = drive(
                "verify",
                &auth.verify_email_state,
                auth.verify_email(&token),
            )
            .await?;
            println!("{}", reply.message);
        }
        Command::VerificationStatus { email } => {
            let email = app.stored_email(email).await?;
            let auth = app.auth();
            let status = drive(
                "verification status",
                &auth.verification_status_state,
                auth.check_email_verification(&email),
            )
            .await?;
            println!("{email}: verified = {}", status.verified);
            if let Some(destination) = auth.navigation.take() {
                println!("next: {}", auth_hint(destination));
            }
        }
        Command::ResendVerification { email } => {
            let email = app.stored_email(email).await?;
            let auth = app.auth();
            let reply = drive(
                "resend verification",
                &auth.resend_verification_state,
                auth.resend_verification(&email),
            )
            .await?;
            println!("{}", reply.message);
        }
        Command::ForgotPassword { email } => {
            let auth = app.auth();
            let reply = drive(
                "forgot password",
                &auth.forgot_password_state,
                auth.forgot_password(&email),
            )
            .await?;
            println!("{}", reply.message);
        }
        Command::ResetPassword {
            token,
            new_password,
            confirm_password,
        } => {
            let auth = app.auth();
            drive(
                "reset token",
                &auth.reset_token_state,
                auth.validate_reset_token(&token),
            )
            .await?;
            let confirm = confirm_password.unwrap_or_else(|| new_password.clone());
            let reply = drive(
                "reset password",
                &auth.reset_password_state,
                auth.reset_password(&token, &new_password, &confirm),
            )
            .await?;
            println!("{}", reply.message);
        }
        Command::ChangePassword {
            current,
            new,
            confirm,
        } => {
            let auth = app.auth();
            let confirm = confirm.unwrap_or_else(|| new.clone());
            let reply = drive(
                "change password",
                &auth.change_password_state,
                auth.change_password(&current, &new, &confirm),
            )
            .await?;
            println!("{}", reply.message);
        }
        Command::Logout => {
            app.auth().logout().await;
            println!("logged out");
        }
        Command::Feed {
            search,
            show_expired,
            sort_by,
            direction,
            tags,
            location,
            pages,
        } => {
            let direction = match direction.as_deref() {
                Some(raw) => Some(
                    SortDirection::parse_lenient(raw)
                        .ok_or_else(|| anyhow!("unknown sort direction '{raw}'"))?,
                ),
                None => None,
            };
            let feed = FeedController::new(app.api.clone(), app.settings.feed_options());
            let default_sort = feed.options().default_sort_by.clone();
            let mut page = drive(
                "feed",
                &feed.feed_state,
                feed.apply_filters(move |filter| {
                    filter.search = search;
                    filter.show_expired = show_expired;
                    filter.sort_by = Some(sort_by.unwrap_or(default_sort));
                    filter.sort_direction = direction.unwrap_or_default();
                    filter.tags = tags;
                    filter.location = location;
                }),
            )
            .await?;
            for _ in 1..pages.max(1) {
                if !feed.has_next_page().await {
                    break;
                }
                page = drive("next page", &feed.feed_state, async {
                    feed.load_next_page().await;
                })
                .await?;
            }
            view::print_page(&page);
        }
        Command::Mine { starred, page } => {
            let feed = FeedController::new(app.api.clone(), app.settings.feed_options());
            let list = if starred {
                drive("starred", &feed.starred_state, feed.my_starred(page)).await?
            } else {
                drive(
                    "registered",
                    &feed.registered_state,
                    feed.my_registered(page),
                )
                .await?
            };
            view::print_page(&list);
        }
        Command::Hackathon { id } => {
            let details = HackathonDetailsController::new(app.api.clone());
            let loaded = drive(
                "hackathon",
                &details.details_state,
                details.load(HackathonId(id)),
            )
            .await?;
            view::print_details(&loaded);
        }
        Command::Register { id, undo } => {
            let details = HackathonDetailsController::new(app.api.clone());
            let reply = drive(
                "registration",
                &details.registration_state,
                details.toggle_registration(HackathonId(id), !undo),
            )
            .await?;
            println!("{} (registered: {})", reply.message, reply.is_registered);
        }
        Command::Star { id, undo } => {
            let details = HackathonDetailsController::new(app.api.clone());
            let reply = drive(
                "star",
                &details.star_state,
                details.toggle_star(HackathonId(id), !undo),
            )
            .await?;
            println!("{} (starred: {})", reply.message, reply.is_starred);
        }
        Command::Profile { user } => {
            let profiles = ProfileController::new(app.api.clone());
            match user {
                Some(user_id) => {
                    let profile = drive(
                        "profile",
                        &profiles.public_profile_state,
                        profiles.load_public_profile(UserId(user_id)),
                    )
                    .await?;
                    view::print_public_profile(&profile);
                }
                None => {
                    let profile = drive(
                        "profile",
                        &profiles.my_profile_state,
                        profiles.load_my_profile(),
                    )
                    .await?;
                    view::print_private_profile(&profile);
                }
            }
        }
        Command::SetupProfile {
            full_name,
            college,
            year,
            bio,
            skills,
        } => {
            let setup = ProfileSetupController::new(app.api.clone(), app.session.clone());
            let request = ProfileSetupRequest {
                full_name,
                college,
                year,
                bio,
                skills,
                ..ProfileSetupRequest::default()
            };
            let reply = drive(
                "profile setup",
                &setup.setup_state,
                setup.setup_profile(request),
            )
            .await?;
            println!(
                "{} ({}% complete)",
                reply.message, reply.profile_completion_percentage
            );
            if setup.navigation.take().is_some() {
                println!("next: home (try `hackmate feed`)");
            }
        }
        Command::Review {
            user,
            rating,
            comment,
            hackathon,
        } => {
            let profiles = ProfileController::new(app.api.clone());
            let request = AddReviewRequest {
                user_id_to_review: UserId(user),
                rating,
                comment,
                hackathon_id: hackathon.map(HackathonId),
            };
            let reply = drive(
                "review",
                &profiles.review_state,
                profiles.add_review(request),
            )
            .await?;
            println!("{}", reply.message);
        }
        Command::SubmitHackathon {
            extract_from,
            title,
            description,
            link,
            deadline,
            location,
            tags,
        } => {
            let create = CreateHackathonController::new(app.api.clone());
            let mut draft = HackathonDraft {
                title,
                description,
                registration_link: link,
                deadline,
                location,
                tags,
                ..HackathonDraft::default()
            };
            if let Some(message) = extract_from {
                let extraction = drive(
                    "extraction",
                    &create.extraction_state,
                    async {
                        create.extract_with_ai(&message).await;
                    },
                )
                .await?;
                println!(
                    "extracted fields (confidence {:.0}%)",
                    extraction.confidence_score * 100.0
                );
                draft.merge_extraction(&extraction, &message);
            }
            let reply = drive("submission", &create.create_state, create.create(&draft)).await?;
            println!(
                "{} (status: {})",
                reply.message,
                reply.status.as_deref().unwrap_or("submitted")
            );
        }
    }
    Ok(())
}

fn auth_hint(destination: AuthDestination) -> &'static str {
    match destination {
        AuthDestination::EmailVerification => {
            "verify your email (`hackmate verify <token>` or `hackmate resend-verification`)"
        }
        AuthDestination::ProfileSetup => "complete your profile (`hackmate setup-profile`)",
        AuthDestination::Home => "home (`hackmate feed`)",
    }
}

fn splash_hint(destination: SplashDestination) -> &'static str {
    match destination {
        SplashDestination::Auth => "sign in (`hackmate login <email> --password ...`)",
        SplashDestination::EmailVerification => "verify your email (`hackmate verify <token>`)",
        SplashDestination::ProfileSetup => "complete your profile (`hackmate setup-profile`)",
        SplashDestination::Home => "home (`hackmate feed`)",
    }
}
