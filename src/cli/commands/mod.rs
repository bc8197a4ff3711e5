//! CLI command implementations.

pub mod guard;
pub mod run;
pub mod trade;
pub mod validate;
