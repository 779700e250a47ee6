//! # breedid Common Library
//!
//! Shared code for the breedid crates including:
//! - Error types
//! - Bootstrap configuration loading (TOML + defaults)
//! - Timestamp formatting for gallery file names and history entries

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
