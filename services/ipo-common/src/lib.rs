//! IPO Common - Shared configuration, logging, and validation for IPO Desk services.
//!
//! This crate provides:
//! - Configuration types and loading (file + environment overrides)
//! - Configuration validation
//! - Logging setup with noise filtering

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod logging;
pub mod validation;

pub use config::{
    CacheConfig, Config, LlmConfig, NetworkConfig, ObservabilityConfig, ReportConfig,
    ScraperConfig, SecretsConfig,
};
pub use validation::{Validate, ValidationError, ValidationResult};
