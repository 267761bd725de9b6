//! Wire model for recommendation records.
//!
//! Field names and shapes have drifted across backend versions (`leads` vs
//! `key_personnel`, `articles` vs `recent_news`, structured people vs
//! `"Name, Title"` strings), so everything is optional and absence is a
//! content gap, never an error.

use serde::Deserialize;

/// One recommended company, with whatever nested data the backend attached.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fit_reason: Option<String>,
    #[serde(default)]
    pub fit_score: Option<FitScore>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub leads: Vec<PersonRecord>,
    #[serde(default)]
    pub key_personnel: Vec<PersonnelEntry>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub articles: Vec<NewsRecord>,
    #[serde(default)]
    pub recent_news: Vec<NewsRecord>,
}

/// Match quality as scored by the recommender.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FitScore {
    #[serde(default)]
    pub overall_score: Option<f64>,
}

impl FitScore {
    /// Score out of 100 for the match meter; the recommender's historical
    /// default applies when the score is present but unscored.
    pub fn percent(&self) -> u8 {
        self.overall_score.unwrap_or(75.0).round().clamp(0.0, 100.0) as u8
    }
}

/// A structured contact at a recommended company.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
}

/// A `key_personnel` entry: either a structured person or a
/// `"Name, Title"` string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PersonnelEntry {
    Person(PersonRecord),
    Text(String),
}

impl PersonnelEntry {
    /// Normalize into a structured person. The string form splits on the
    /// first comma: name before it, title after (keeping any further
    /// commas in the title).
    pub fn into_person(self) -> PersonRecord {
        match self {
            Self::Person(person) => person,
            Self::Text(text) => match text.split_once(',') {
                Some((name, title)) => PersonRecord {
                    name: Some(name.trim().to_string()),
                    title: Some(title.trim().to_string()),
                    ..PersonRecord::default()
                },
                None => PersonRecord {
                    name: Some(text.trim().to_string()),
                    ..PersonRecord::default()
                },
            },
        }
    }
}

/// An event relevant to a recommended company.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A news article about a recommended company.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Older backends ship the pull-quote instead of a summary.
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
