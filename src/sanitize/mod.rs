//! Detection and redaction engine.
//!
//! The pipeline is three pure functions layered on an immutable
//! [`Policy`](crate::policy::Policy):
//!
//! - [`detect`] scans input text with every detector and produces findings.
//! - [`redact`] rewrites the input according to the policy's redaction rules.
//! - [`sanitize`] combines the two and is the single entry point consumers
//!   should use.
//!
//! All three are synchronous, stateless, and side-effect free; concurrent
//! calls share nothing beyond the read-only policy.

mod detect;
mod redact;

pub use detect::detect;
pub use redact::redact;

use serde::Serialize;

use crate::policy::{FindingKind, Policy};

/// A single detected span of sensitive content.
///
/// Offsets are byte offsets into the **original** input string, half-open
/// (`end` exclusive), satisfying `0 <= start < end <= input.len()` and
/// `input[start..end] == value`. Findings are plain value objects created
/// fresh on every detection call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Classification assigned by the detector that matched.
    #[serde(rename = "type")]
    pub kind: FindingKind,
    /// Start offset of the match in the original input.
    pub start: usize,
    /// End offset (exclusive) of the match in the original input.
    pub end: usize,
    /// The exact matched substring.
    pub value: String,
}

/// Result of a [`sanitize`] call: the redacted text plus what was found.
#[derive(Debug, Clone, Serialize)]
pub struct Sanitized {
    /// The input with all redaction rules applied.
    pub output: String,
    /// Findings against the original input, unredacted. Offsets refer to the
    /// pre-redaction string; this is an audit artifact, not a view of
    /// `output`.
    pub findings: Vec<Finding>,
}

/// Detect and redact in one step.
///
/// Findings are computed against the original input once; the same findings
/// drive redaction and are returned unmodified alongside the rewritten text.
pub fn sanitize(input: &str, policy: &Policy) -> Sanitized {
    let findings = detect(input, policy);
    let output = redact(input, &findings, policy);
    Sanitized { output, findings }
}
