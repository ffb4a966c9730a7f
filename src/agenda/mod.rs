//! Agenda Module
//! Per-user schedule entries (pass-through storage, owner-filtered)

pub mod api;
pub mod store;

pub use api::AgendaState;
pub use store::AgendaStore;
