//! Command implementations

pub mod env;
pub mod exec;
