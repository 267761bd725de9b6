//! Partitioning and the fetch-then-render pipeline.

use std::sync::Arc;

use serde::Serialize;

use crate::api::BackendApi;
use crate::recommendations::model::{CompanyRecord, EventRecord, NewsRecord, PersonRecord};

/// Placeholder entry some backends emit instead of an empty event list.
const NO_EVENTS_MARKER: &str = "No upcoming events";

/// Inline error text shown when the fetch fails.
pub const LOAD_FAILURE_MESSAGE: &str = "Error loading recommendations. Please try again later.";

// ── Display cards ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CompanyCard {
    pub name: String,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub fit_reason: Option<String>,
    pub match_percent: Option<u8>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonCard {
    pub name: String,
    pub title: String,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    /// The company this contact belongs to.
    pub company: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventCard {
    pub name: String,
    pub date: String,
    pub location: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub company: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsCard {
    pub title: String,
    pub date: Option<String>,
    pub source: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub company: String,
}

/// The four categorized views. A bucket left empty is a content gap the
/// front-end reflects with its empty-state indicator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Buckets {
    pub companies: Vec<CompanyCard>,
    pub people: Vec<PersonCard>,
    pub events: Vec<EventCard>,
    pub news: Vec<NewsCard>,
}

/// Result of one load: either the partitioned buckets or an inline error
/// block. Fetch failures never propagate past the viewer.
#[derive(Debug, Clone)]
pub enum ViewState {
    Ready(Buckets),
    Failed(String),
}

// ── Partitioning ────────────────────────────────────────────────────

/// Partition company records into the four display buckets.
pub fn partition(records: Vec<CompanyRecord>) -> Buckets {
    let mut buckets = Buckets::default();

    for company in records {
        let company_name = company.name.clone();

        // People: structured leads win; otherwise parse key_personnel.
        if !company.leads.is_empty() {
            for person in company.leads {
                buckets.people.push(person_card(person, &company_name));
            }
        } else {
            for entry in company.key_personnel {
                buckets
                    .people
                    .push(person_card(entry.into_person(), &company_name));
            }
        }

        for event in company.events {
            if event.name.as_deref() == Some(NO_EVENTS_MARKER) {
                continue;
            }
            buckets.events.push(event_card(event, &company_name));
        }

        // News: articles win; otherwise the legacy recent_news field.
        let articles = if !company.articles.is_empty() {
            company.articles
        } else {
            company.recent_news
        };
        for article in articles {
            buckets.news.push(news_card(article, &company_name));
        }

        buckets.companies.push(CompanyCard {
            name: company_name,
            industry: company.industry,
            description: company.description,
            fit_reason: company.fit_reason,
            match_percent: company.fit_score.map(|s| s.percent()),
            website: company.website,
        });
    }

    buckets
}

fn person_card(person: PersonRecord, company: &str) -> PersonCard {
    PersonCard {
        name: person.name.unwrap_or_else(|| "Unknown".to_string()),
        title: person.title.unwrap_or_default(),
        email: person.email,
        linkedin: person.linkedin,
        company: company.to_string(),
    }
}

fn event_card(event: EventRecord, company: &str) -> EventCard {
    EventCard {
        name: event.name.unwrap_or_else(|| "Unnamed Event".to_string()),
        date: event.date.unwrap_or_else(|| "TBD".to_string()),
        location: event
            .location
            .unwrap_or_else(|| "Location not specified".to_string()),
        description: event.description,
        url: event.url,
        company: company.to_string(),
    }
}

fn news_card(article: NewsRecord, company: &str) -> NewsCard {
    NewsCard {
        title: article
            .title
            .unwrap_or_else(|| "Untitled Article".to_string()),
        date: article.date,
        source: article.source,
        summary: article.summary.or(article.quote),
        url: article.url,
        company: company.to_string(),
    }
}

// ── Viewer ──────────────────────────────────────────────────────────

/// Stateless fetch-then-partition pipeline over the recommendations
/// endpoint. Every load replaces the previous view wholesale.
pub struct RecommendationsViewer {
    api: Arc<dyn BackendApi>,
}

impl RecommendationsViewer {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }

    /// One GET, no retry. `regenerate` asks the backend for a fresh list.
    pub async fn load(&self, regenerate: bool) -> ViewState {
        match self.api.recommendations(regenerate).await {
            Ok(records) => {
                let buckets = partition(records);
                tracing::info!(
                    companies = buckets.companies.len(),
                    people = buckets.people.len(),
                    events = buckets.events.len(),
                    news = buckets.news.len(),
                    "Recommendations loaded"
                );
                ViewState::Ready(buckets)
            }
            Err(e) => {
                tracing::warn!("Recommendations fetch failed: {e}");
                ViewState::Failed(LOAD_FAILURE_MESSAGE.to_string())
            }
        }
    }
}
