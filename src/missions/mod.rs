//! Missions Module
//! Mission: Dispatch job records with an assignment lifecycle

pub mod api;
pub mod models;
pub mod store;

pub use api::MissionsState;
pub use store::MissionStore;
