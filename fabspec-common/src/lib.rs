//! # fabspec common library
//!
//! Shared code for the fabric specification tools:
//! - Error and result types
//! - TOML bootstrap configuration and API key resolution
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
