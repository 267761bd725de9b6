//! Lead Assist — client core for a voice-first sales-lead assistant.
//!
//! The library owns the conversational onboarding state (step progression,
//! chat transcript, keyword accumulation), the voice-capture fallback logic,
//! and the recommendations view, and talks to a backend HTTP/JSON API.
//! Presentation is behind the [`conversation::SessionEvents`] collaborator
//! trait so any front-end (terminal, web view) can plug in.

pub mod api;
pub mod capture;
pub mod config;
pub mod conversation;
pub mod error;
pub mod recommendations;
