//! # PromptGuard
//!
//! **Data-loss-prevention proxy for AI chat traffic.**
//!
//! PromptGuard is a local HTTP proxy that sits between a client and a
//! chat-completion provider. It scans every request body with a configurable
//! set of regex detectors, redacts the sensitive spans it finds, and forwards
//! the sanitized body upstream. What was found travels back to the caller
//! out-of-band in a base64-encoded response header, so audit metadata never
//! mixes with the payload.
//!
//! ## Architecture
//!
//! - **[`sanitize`]** — detection and redaction engine (the core pipeline)
//! - **[`policy`]** — TOML-based detector and redaction-rule configuration
//! - **[`proxy`]** — axum HTTP server forwarding sanitized bodies upstream,
//!   with a mock echo fallback when the upstream is unreachable
//! - **[`cli`]** — command-line interface (clap)
//! - **[`error`]** — unified error types using `thiserror`
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a default configuration
//! promptguard init
//!
//! # Sanitize a string from the command line
//! promptguard check "Contact me at jane.doe@example.com please"
//!
//! # Start the proxy
//! promptguard start
//! ```

pub mod cli;
pub mod error;
pub mod policy;
pub mod proxy;
pub mod sanitize;
