//! Port traits for the external collaborators.

pub mod config_port;
pub mod fundamentals_port;
pub mod history_port;
