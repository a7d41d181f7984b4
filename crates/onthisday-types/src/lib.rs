//! Shared type definitions for the On This Day events API.
//!
//! This crate is the single source of truth for the JSON exchanged between
//! the events server and the date-picker widget. Types defined here flow
//! downstream to `TypeScript` via `ts-rs` for the browser page.
//!
//! # Modules
//!
//! - [`event`] -- Historical event records and the API response envelope
//! - [`date`] -- Validated month/day pair and its `M月D日` label

pub mod date;
pub mod event;

pub use date::{MonthDay, MonthDayError};
pub use event::{EventsResponse, HistoricalEvent};
