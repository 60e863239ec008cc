//! This crate turns Skatteverket's important dates for companies into an iCalendar.
//!
//! The dates are read from <https://www.skatteverket.se/viktiga-datum-api/api/v1/viktiga-datum-foretag>,
//! once for the upcoming and once for the past dates, filtered by the [`options::Options`] and
//! merged into one calendar ordered by date.

pub use icalendar;

pub mod calendar;
pub mod error;
pub mod event;
pub mod options;
pub mod skatteverket_client;
