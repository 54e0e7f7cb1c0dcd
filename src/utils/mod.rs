//! Helper functions shared by the store backends.
//!
//! - [`token_generator`] - Random short token generation
//! - [`db_error`] - PostgreSQL error classification

pub mod db_error;
pub mod token_generator;
