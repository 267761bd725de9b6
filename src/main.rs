use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use lead_assist::api::{BackendApi, HttpBackend};
use lead_assist::config::ClientConfig;
use lead_assist::conversation::{ChatMessage, ConversationSession, Role, SessionEvents, StepToken};
use lead_assist::recommendations::{Buckets, RecommendationsViewer, ViewState};

/// Terminal renderer — the concrete `SessionEvents` collaborator.
struct TerminalEvents;

impl SessionEvents for TerminalEvents {
    fn message_appended(&self, message: &ChatMessage) {
        if message.transient {
            eprintln!("⏳ {}", message.text);
            return;
        }
        match message.role {
            Role::User => println!("You: {}", message.text),
            Role::Assistant => println!("Assistant: {}", message.text),
        }
    }

    fn step_changed(&self, step: &StepToken) {
        eprintln!("➡️  Next up: {}", step.label());
    }

    fn keywords_updated(&self, keywords: &[String]) {
        eprintln!("🔑 {}", keywords.join(" · "));
    }

    fn audio_received(&self, mp3_base64: &str) {
        eprintln!("🔊 (spoken reply available, {} base64 bytes)", mp3_base64.len());
    }

    fn recommendations_ready(&self) {
        eprintln!("✨ Your recommendations are ready — type /recommendations to view them.");
    }

    fn listening_changed(&self, active: bool) {
        if active {
            eprintln!("🎙️  Listening...");
        } else {
            eprintln!("🎙️  Stopped.");
        }
    }

    fn transcript_preview(&self, text: &str) {
        eprintln!("…{text}");
    }

    fn notice(&self, message: &str) {
        eprintln!("ℹ️  {}", message);
    }
}

fn print_view(state: ViewState) {
    match state {
        ViewState::Ready(buckets) => print_buckets(&buckets),
        ViewState::Failed(message) => println!("\n  ⚠ {message}\n"),
    }
}

fn print_buckets(buckets: &Buckets) {
    println!("\n── Companies ──");
    if buckets.companies.is_empty() {
        println!("  (no company recommendations yet — finish onboarding first)");
    }
    for company in &buckets.companies {
        let blurb = company
            .industry
            .as_deref()
            .or(company.description.as_deref())
            .unwrap_or("No description available");
        match company.match_percent {
            Some(percent) => println!("  {} — {} [{}% match]", company.name, blurb, percent),
            None => println!("  {} — {}", company.name, blurb),
        }
        if let Some(reason) = &company.fit_reason {
            println!("      Perfect fit because: {reason}");
        }
    }

    println!("── Key People ──");
    if buckets.people.is_empty() {
        println!("  (no key people yet)");
    }
    for person in &buckets.people {
        println!("  {} — {} at {}", person.name, person.title, person.company);
    }

    println!("── Events ──");
    if buckets.events.is_empty() {
        println!("  (no events found)");
    }
    for event in &buckets.events {
        println!("  {} ({}) — {}", event.name, event.date, event.location);
    }

    println!("── Latest News ──");
    if buckets.news.is_empty() {
        println!("  (no recent news)");
    }
    for article in &buckets.news {
        println!("  {} [{}]", article.title, article.company);
    }
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut config = ClientConfig::default();
    if let Ok(url) = std::env::var("LEAD_ASSIST_API_URL") {
        config.base_url = url;
    }
    if let Ok(secs) = std::env::var("LEAD_ASSIST_TIMEOUT_SECS") {
        config.request_timeout = Duration::from_secs(secs.parse().unwrap_or(30));
    }

    eprintln!("🎯 Lead Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.base_url);
    eprintln!("   Answer the questions to build your lead profile.");
    eprintln!("   Commands: /recommendations [regen], /keywords, /quit\n");

    let api: Arc<dyn BackendApi> = Arc::new(HttpBackend::new(&config)?);
    let events: Arc<dyn SessionEvents> = Arc::new(TerminalEvents);
    let session = Arc::new(ConversationSession::new(
        Arc::clone(&api),
        Arc::clone(&events),
        &config,
    ));
    let viewer = RecommendationsViewer::new(Arc::clone(&api));

    events.keywords_updated(&session.keywords().await);
    session.fetch_opening_question().await;

    let stdin = tokio::io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            "/quit" => break,
            "/keywords" => session.refresh_keywords().await,
            "/recommendations" => print_view(viewer.load(false).await),
            "/recommendations regen" => print_view(viewer.load(true).await),
            text => {
                session.submit_turn(text).await;
            }
        }
        eprint!("> ");
    }

    Ok(())
}
