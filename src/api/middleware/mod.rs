//! API middleware components

pub mod logging;

pub use logging::request_logging;
