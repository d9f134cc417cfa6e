//! Core domain types and logic.

pub mod config_validation;
pub mod error;
pub mod features;
pub mod forecast;
pub mod frame;
pub mod frequency;
pub mod indicator;
pub mod indicator_helpers;
pub mod model;
pub mod ohlcv;
pub mod request;
pub mod service;
pub mod simulator;
