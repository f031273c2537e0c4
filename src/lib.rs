pub mod api;
pub mod config;

pub use habit_core::{db, models, service};
