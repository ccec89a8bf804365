// SPDX-License-Identifier: MIT

//! Ecotrack: carbon-footprint tracking backend.
//!
//! This crate provides the backend API for computing CO2 emissions from
//! vehicle, flight and electricity usage, tracking per-user monthly
//! footprint snapshots, and running gamified eco-challenges.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
}
