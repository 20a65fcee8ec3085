//! Daily habit checklist that lives in the terminal. Habits are ticked off
//! day by day, progress shows up as a fill bar, and done flags reset on
//! their own when the calendar date changes. The whole state is one JSON
//! record under the user's state directory.
//!

pub mod cli;
pub mod store;
pub mod utils;
