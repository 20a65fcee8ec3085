//! Checklist state and its persistence.
//! The basic idea is:
//!  - The whole checklist is one record, read and overwritten whole.
//!  - Every mutation goes through [checklist::Checklist], which persists as
//!    its final step.
//!  - Done flags are only valid for the day in `last_date`; the rollover
//!    check clears them when the date advances.

pub mod checklist;
pub mod entities;
pub mod state_storage;
