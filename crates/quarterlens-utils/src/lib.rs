//! Shared utilities for quarterlens
//!
//! This crate provides common functionality used across the quarterlens
//! workspace: tracing setup and environment-variable helpers for the
//! configuration layer.

pub mod config;
pub mod logging;

pub use config::env_var;
pub use logging::{LogFormat, init_tracing};
