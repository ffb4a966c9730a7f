//! Dispatch Backend Library
//!
//! Exposes the stores, auth layer, and router assembly for use by the
//! server binary and integration tests.

pub mod agenda;
pub mod app;
pub mod auth;
pub mod db;
pub mod middleware;
pub mod missions;

pub use app::{build_app, AppContext};
