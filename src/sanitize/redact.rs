use crate::policy::{Policy, RedactionRule};

use super::Finding;

/// Apply the policy's redaction rules to `findings`, rewriting `input`.
///
/// Findings are processed by `start` **descending** (stable sort, so ties
/// keep detection order). Because a rewrite may change the string's length,
/// applying edits from the highest offset down guarantees that every
/// not-yet-processed finding's offsets are still valid: all edits so far
/// happened strictly after it.
///
/// A finding whose kind has no entry in the redaction table is skipped. When
/// findings from different detectors overlap, the splice simply lands on
/// whatever the string looks like after the higher-offset edits; this order
/// is the contract, overlaps are not specially resolved.
pub fn redact(input: &str, findings: &[Finding], policy: &Policy) -> String {
    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut output = input.to_string();
    for finding in ordered {
        let Some(rule) = policy.redaction.get(&finding.kind) else {
            continue;
        };

        // Overlapping edits can leave offsets past the current end or inside
        // a multi-byte character; clamp rather than panic.
        let start = snap_to_boundary(&output, finding.start.min(output.len()));
        let end = snap_to_boundary(&output, finding.end.min(output.len()));
        if start >= end {
            continue;
        }

        let replacement = match rule {
            RedactionRule::Token { token } => token
                .clone()
                .unwrap_or_else(|| RedactionRule::default_token(finding.kind)),
            RedactionRule::Mask { mask } => {
                let span_chars = output[start..end].chars().count();
                mask.to_string().repeat(span_chars)
            }
            RedactionRule::Remove => String::new(),
        };
        output.replace_range(start..end, &replacement);
    }
    output
}

/// Largest char boundary at or below `index`.
fn snap_to_boundary(s: &str, mut index: usize) -> usize {
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
