//! Core library for Habit Hero.
//!
//! This crate provides the domain models, SQLite storage and habit operations
//! for Habit Hero, independent of any transport layer.
//!
//! # Usage
//!
//! ```no_run
//! use habit_core::{CheckInInput, Database, HabitService};
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let service = HabitService::new(db);
//! let toggle = service.toggle_checkin(1, &CheckInInput::for_date("2024-01-02"))?;
//! println!("checked: {}", toggle.is_checked());
//! # Ok::<(), habit_core::HabitError>(())
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod service;
mod validate;

// Re-export commonly used types at crate root
pub use db::Database;
pub use error::{HabitError, Result};
pub use models::*;
pub use service::HabitService;
