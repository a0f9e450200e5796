//! Library exports for vitrine, shared between the binary and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;
pub mod session;
pub mod startup;
pub mod state;
pub mod token;
pub mod utils;
