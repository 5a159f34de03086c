//! End-to-end sanitization scenarios against the default policy.

use promptguard::policy::{FindingKind, Policy};
use promptguard::sanitize::{detect, redact, sanitize};

#[test]
fn email_is_replaced_with_token() {
    let policy = Policy::default_policy();
    let result = sanitize("Contact me at jane.doe@example.com please", &policy);
    assert_eq!(result.output, "Contact me at [REDACTED_EMAIL] please");
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].kind, FindingKind::Email);
    assert_eq!(result.findings[0].value, "jane.doe@example.com");
}

#[test]
fn secret_and_email_are_both_redacted() {
    let policy = Policy::default_policy();
    let result = sanitize(
        "key sk-1234567890abcdefghijklmnop and email a@b.com",
        &policy,
    );
    assert_eq!(
        result.output,
        "key [REDACTED_SECRET] and email [REDACTED_EMAIL]"
    );
    assert_eq!(result.findings.len(), 2);
    assert_eq!(result.findings[0].kind, FindingKind::Secret);
    assert_eq!(result.findings[1].kind, FindingKind::Email);
    assert!(result.findings[0].start < result.findings[1].start);
}

#[test]
fn invoice_number_is_redacted_with_its_prefix() {
    let policy = Policy::default_policy();
    let result = sanitize("Invoice #84921 is due", &policy);
    assert_eq!(result.output, "[REDACTED_NUMBER] is due");
    assert_eq!(result.findings[0].kind, FindingKind::Number);
    assert_eq!(result.findings[0].value, "Invoice #84921");
}

#[test]
fn phone_with_punctuation_is_redacted() {
    let policy = Policy::default_policy();
    let result = sanitize("Call +1 415-555-0199 now", &policy);
    assert_eq!(result.output, "Call [REDACTED_PHONE] now");
    assert_eq!(result.findings[0].kind, FindingKind::Phone);
    assert_eq!(result.findings[0].value, "+1 415-555-0199");
}

#[test]
fn clean_text_passes_through() {
    let policy = Policy::default_policy();
    let result = sanitize("no sensitive content here", &policy);
    assert_eq!(result.output, "no sensitive content here");
    assert!(result.findings.is_empty());
}

#[test]
fn offsets_always_index_the_original_input() {
    let policy = Policy::default_policy();
    let input = "Jane Doe (jane@corp.example) filed Invoice #112233, call +44 20 7946 0958";
    let findings = detect(input, &policy);
    assert!(findings.len() >= 4);
    for f in &findings {
        assert!(f.start < f.end, "empty span for {:?}", f);
        assert!(f.end <= input.len());
        assert_eq!(&input[f.start..f.end], f.value);
    }
}

#[test]
fn redaction_order_does_not_matter_for_disjoint_findings() {
    let policy = Policy::default_policy();
    let input = "one a@b.com two c@d.org three e@f.net";
    let mut findings = detect(input, &policy);
    let forward = redact(input, &findings, &policy);
    findings.reverse();
    let backward = redact(input, &findings, &policy);
    assert_eq!(forward, backward);
    assert_eq!(forward, "one [REDACTED_EMAIL] two [REDACTED_EMAIL] three [REDACTED_EMAIL]");
}

#[test]
fn sanitizing_redacted_output_finds_nothing_new() {
    let policy = Policy::default_policy();
    let first = sanitize(
        "Jane Doe <jane.doe@example.com>, sk-abcdefghijklmnopqrstuvwx, Invoice #555123",
        &policy,
    );
    let second = sanitize(&first.output, &policy);
    assert!(
        second.findings.is_empty(),
        "redaction tokens must not re-trigger detectors: {:?}",
        second.findings
    );
    assert_eq!(second.output, first.output);
}

#[test]
fn multiline_chat_body_is_handled() {
    let policy = Policy::default_policy();
    let input = "{\"messages\":[{\"role\":\"user\",\"content\":\"my key is sk-abcdefghijklmnopqrst and my mail is x@y.dev\"}]}";
    let result = sanitize(input, &policy);
    assert!(result.output.contains("[REDACTED_SECRET]"));
    assert!(result.output.contains("[REDACTED_EMAIL]"));
    assert!(!result.output.contains("sk-abcdefghijklmnopqrst"));
}
