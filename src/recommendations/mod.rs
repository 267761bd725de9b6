//! Recommendations viewer — fetch a finished recommendation list and
//! partition it into the four display buckets.

pub mod model;
pub mod viewer;

pub use model::{
    CompanyRecord, EventRecord, FitScore, NewsRecord, PersonRecord, PersonnelEntry,
};
pub use viewer::{
    partition, Buckets, CompanyCard, EventCard, NewsCard, PersonCard, RecommendationsViewer,
    ViewState,
};
