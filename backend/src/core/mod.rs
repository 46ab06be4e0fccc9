//! Core utilities shared across the engine

pub mod time;

pub use time::{minutes_between, parse_timestamp, Timestamp};
