//! Configuration module for Channel-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so a run without a config
//! file uses [`Config::default`].
//!
//! # Example
//!
//! ```no_run
//! use channel_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Listing base: {}", config.listing.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ListingConfig, OutputConfig, RenderConfig};

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
pub use validation::validate;
