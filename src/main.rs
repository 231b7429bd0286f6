use std::{
    env,
    io::{self, BufRead},
    sync::Arc,
    thread,
};

use colored::Colorize;
use darshan_content::{load_teaching_page, ApiClient, ContentError, TeachingPage};
use darshan_core::{
    parse_lenient_url, Config, DetailOptions, Emitter, EventReceiver, MembershipTier,
    TeachingDetail, ViewContext, ViewerSession,
};
use log::{error, info};
use thiserror::Error;
use tokio::runtime;

use crate::{embed::LoggingEmbed, replay::replay};

mod embed;
mod logging;
mod replay;

/// The API used when `DARSHAN_API_URL` isn't set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Error)]
enum AppError {
    #[error("No teaching was specified")]
    MissingSlug,

    #[error("Invalid API url: {0}")]
    InvalidApiUrl(String),

    #[error("Teaching \"{0}\" was not found")]
    NotFound(String),

    #[error("Could not read messages: {0}")]
    Input(#[from] io::Error),

    #[error("Fatal error: {0}")]
    Fatal(String),
}

/// Who is watching and where, read from the environment.
struct Viewer {
    session: ViewerSession,
    context: ViewContext,
}

impl Viewer {
    fn from_env() -> Self {
        let tier = env::var("DARSHAN_MEMBERSHIP_TIER")
            .map(MembershipTier::from)
            .unwrap_or_default();

        let session = match env::var("DARSHAN_ACCESS_TOKEN") {
            Ok(token) if !token.trim().is_empty() => ViewerSession::authenticated(tier, token),
            _ => ViewerSession::anonymous(),
        };

        let context = match env::var("DARSHAN_VIEW_CONTEXT").as_deref() {
            Ok("dashboard") => ViewContext::Dashboard,
            _ => ViewContext::Public,
        };

        Self { session, context }
    }
}

impl AppError {
    fn hint(&self) -> String {
        match self {
            AppError::MissingSlug => "Pass the slug of a teaching as the first argument, then pipe embed messages into stdin.".to_string(),
            AppError::InvalidApiUrl(_) => "Set DARSHAN_API_URL to the base url of the API, like https://example.org/api.".to_string(),
            AppError::NotFound(_) => "The teaching doesn't exist, or the viewer may not see it. Check the slug, and set DARSHAN_ACCESS_TOKEN for members-only teachings.".to_string(),
            AppError::Input(_) => "Messages are read line by line from stdin, make sure it is readable.".to_string(),
            AppError::Fatal(_) => "This error is fatal, and should not happen.".to_string(),
        }
    }
}

fn api_client() -> Result<ApiClient, AppError> {
    let api_url = env::var("DARSHAN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

    // Hosts without a scheme, like `localhost:8000/api`, are read as https
    ApiClient::new(&api_url)
        .or_else(|_| match parse_lenient_url(&api_url) {
            Some(url) => ApiClient::new(url.as_str()),
            None => Err(ContentError::InvalidUrl(api_url.clone())),
        })
        .map_err(|e| AppError::InvalidApiUrl(e.to_string()))
}

/// Logs every event the page emits until it is unmounted.
fn log_events(receiver: EventReceiver) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for event in receiver {
            match serde_json::to_string(&event) {
                Ok(json) => info!("Event {}", json),
                Err(e) => error!("Could not serialize event {:?}: {}", event, e),
            }
        }
    })
}

fn run() -> Result<(), AppError> {
    let slug = env::args().nth(1).ok_or(AppError::MissingSlug)?;
    let viewer = Viewer::from_env();
    let client = api_client()?;

    info!("Building async runtime...");
    let runtime = runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Fatal(e.to_string()))?;

    info!("Loading teaching {}...", slug);
    let page = runtime.block_on(load_teaching_page(&client, &slug, &viewer.session));

    let TeachingPage::Found { teaching, related } = page else {
        return Err(AppError::NotFound(slug));
    };

    info!(
        "Loaded \"{}\" ({:?}, {:?}) with {} related teachings",
        teaching.title,
        teaching.content_type,
        teaching.access_type,
        related.len()
    );

    let (events, receiver) = Emitter::channel();
    let logger = log_events(receiver);

    let mut detail = TeachingDetail::mount(
        teaching,
        DetailOptions {
            session: viewer.session,
            context: viewer.context,
            embed: Arc::new(LoggingEmbed::default()),
            events,
            config: Config::default(),
        },
    )
    .with_related(related);

    info!(
        "Mounted on {:?} with tabs {:?}, replaying messages from stdin",
        detail.platform(),
        detail.tabs()
    );

    let lines = io::stdin().lock().lines().collect::<Result<Vec<_>, _>>()?;
    let verdict = replay(&mut detail, lines);

    info!(
        "Finished with {:?} after {:.1}s of {:.1}s watched",
        verdict,
        detail.elapsed(),
        detail.preview().clock.budget()
    );

    detail.unmount();
    logger
        .join()
        .map_err(|_| AppError::Fatal("Event logger panicked".to_string()))?;

    Ok(())
}

fn main() {
    logging::init_logger(logging::Verbosity::from_env());

    if let Err(error) = run() {
        error!("{} Read the error below to troubleshoot the issue.", "Replay failed!".bold().red());
        error!("{}", error);
        error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());
    }
}
