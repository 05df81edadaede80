// SPDX-License-Identifier: MIT

//! Glimpse: backend API for a media-sharing social app.
//!
//! This crate provides the REST API core: token-based sessions, a typed
//! store gateway, a static endpoint registry, the request dispatcher, and
//! feed assembly.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod registry;
pub mod routes;
pub mod services;

use config::Config;
use db::Db;
use services::TokenService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub tokens: TokenService,
}
