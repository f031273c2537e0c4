//! Domain models for Habit Hero.
//!
//! - [`Habit`]: a tracked behaviour; owns its check-ins and notes.
//! - [`CheckIn`]: a habit done on a given day. Created and removed only by
//!   toggling.
//! - [`Note`]: append-only free text, dated on creation.
//! - [`HabitStats`]: streak and success figures derived from check-ins.

mod checkin;
mod habit;
mod note;
mod stats;

pub use checkin::*;
pub use habit::*;
pub use note::*;
pub use stats::*;
