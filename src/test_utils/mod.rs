//! Test utilities: in-memory credential store, capturing notification
//! sender, and an app-state builder for HTTP-level tests.

mod app_state_builder;
mod auth_mocks;

pub use app_state_builder::*;
pub use auth_mocks::*;
