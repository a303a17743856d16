//! Workflow rules between the HTTP handlers and the repositories.

pub mod auth;
pub mod categories;
pub mod laundry;
