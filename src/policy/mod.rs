//! Policy engine for PromptGuard.
//!
//! This module provides the TOML-based configuration system ([`config`]) and
//! the compiled, immutable [`Policy`](config::Policy) that the sanitizer
//! consumes. A policy is validated once at construction time; a malformed
//! detector pattern is a fatal configuration error, never a scan-time error.

pub mod config;

pub use config::{Detector, FindingKind, Policy, RedactionRule};
