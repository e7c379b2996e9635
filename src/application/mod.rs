pub mod app_error;
pub mod jwt;
pub mod password_policy;
pub mod use_cases;
pub mod validators;

pub use app_error::*;
