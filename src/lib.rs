//! # Userdash (User Management Dashboard Client)
//!
//! `userdash` is the client side of a small user-management dashboard. It talks
//! to a REST API that issues bearer tokens on login and exposes CRUD endpoints
//! for user records.
//!
//! ## Layers
//!
//! - [`api::HttpClient`] builds requests against a configured base URL, attaches
//!   the bearer token it owns and normalizes every failure into [`api::ApiError`].
//! - [`api::DashboardApi`] is the typed facade with one method per endpoint. It
//!   unwraps the `{ "data": ..., "meta": ... }` envelope and nothing more.
//! - [`session::SessionController`] tracks who is logged in, restores the session
//!   from a [`session::SessionStore`] on startup and is the only writer of that store.
//! - [`users::UserDirectory`] and [`health::HealthMonitor`] keep view-facing state
//!   (the cached user list, the last known API status) in sync with the server.
//!
//! ## Sessions
//!
//! A session is authenticated only while both a token and a user are present. The
//! token never appears in logs or `Debug` output; it is held as a
//! [`secrecy::SecretString`] and exposed only when building the `Authorization`
//! header.

pub mod api;
pub mod cli;
pub mod config;
pub mod health;
pub mod session;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
