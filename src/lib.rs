//! Larder keeps a personal recipe box in a local SQLite database and
//! serves it over a small HTTP API for an editing client.
//!
//! The interesting part of the crate is deliberately small: [`text`]
//! turns free-text instruction/ingredient blocks into structured rows and
//! back, and [`db`] reconciles a recipe's stored children against a
//! freshly parsed draft on every save. The rest is ordinary service
//! plumbing.

pub mod api;
pub mod db;
pub mod models;
pub mod text;
