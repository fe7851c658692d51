//! Locale negotiation and locale-prefixed URL routing for axum services.

pub mod config;
pub mod i18n;
pub mod web;
