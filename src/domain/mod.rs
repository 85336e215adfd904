//! Core domain types and logic.

pub mod config_validation;
pub mod engine;
pub mod error;
pub mod fundamental;
pub mod indicator;
pub mod ohlcv;
pub mod record;
pub mod score;
pub mod screener;
pub mod series;
pub mod signal;
pub mod universe;
