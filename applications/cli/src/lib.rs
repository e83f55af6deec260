//! coverfix CLI - configuration and command runners behind the `coverfix`
//! binary

pub mod commands;
pub mod config;
pub mod error;
