//! CLI command implementations
//!
//! Every command returns its process exit code:
//! 0 success, 1 partial failure, 2 configuration error,
//! 4 connection or authentication error, 5 fatal error, 130 interrupted.

pub mod cancel_all;
pub mod labels;
pub mod regions;
pub mod schedule;
pub mod status;
pub mod validate;
