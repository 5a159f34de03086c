//! TOML configuration types for PromptGuard.
//!
//! The top-level [`AppConfig`] is deserialized from `promptguard.toml` and
//! contains sections for the proxy server and the sanitization policy.
//!
//! # Example `promptguard.toml`
//!
//! ```toml
//! [proxy]
//! listen = "127.0.0.1:18090"
//! upstream = "https://api.openai.com/v1/chat/completions"
//! timeout_secs = 5
//!
//! [[policy.detectors]]
//! id = "ticket"
//! pattern = "TCK-[0-9]{6}"
//! classify_as = "CUSTOM"
//!
//! [policy.redaction.CUSTOM]
//! action = "mask"
//! ```
//!
//! Omitting `policy.detectors` or `policy.redaction` selects the built-in
//! detector set and a token rule for every finding kind respectively.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PromptGuardError, Result};

/// Default mask character used by [`RedactionRule::Mask`].
pub const DEFAULT_MASK_CHAR: char = '●';

/// Classification assigned to a detected span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FindingKind {
    /// Heuristic proper-name match (two or more capitalized words).
    Name,
    /// Email address.
    Email,
    /// Loosely formatted phone number.
    Phone,
    /// Invoice/billing/reference number.
    Number,
    /// API key, access token, or other credential shape.
    Secret,
    /// User-defined detector classification.
    Custom,
}

impl FindingKind {
    /// Wire name of the kind, as carried in the findings header.
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::Name => "NAME",
            FindingKind::Email => "EMAIL",
            FindingKind::Phone => "PHONE",
            FindingKind::Number => "NUMBER",
            FindingKind::Secret => "SECRET",
            FindingKind::Custom => "CUSTOM",
        }
    }

    /// All finding kinds, in no particular order.
    pub const ALL: [FindingKind; 6] = [
        FindingKind::Name,
        FindingKind::Email,
        FindingKind::Phone,
        FindingKind::Number,
        FindingKind::Secret,
        FindingKind::Custom,
    ];
}

/// The action applied to a finding during redaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RedactionRule {
    /// Replace the whole match with a fixed literal. `None` means the
    /// default literal `[REDACTED_<KIND>]`.
    Token {
        #[serde(default)]
        token: Option<String>,
    },
    /// Replace every character of the match with a mask character,
    /// preserving the visual length of the original span.
    Mask {
        #[serde(default = "default_mask_char")]
        mask: char,
    },
    /// Delete the match entirely.
    Remove,
}

fn default_mask_char() -> char {
    DEFAULT_MASK_CHAR
}

impl RedactionRule {
    /// Default token rule for a kind (`[REDACTED_<KIND>]`).
    pub fn token() -> Self {
        RedactionRule::Token { token: None }
    }

    /// Default token literal for a finding kind.
    pub fn default_token(kind: FindingKind) -> String {
        format!("[REDACTED_{}]", kind.as_str())
    }
}

/// Declarative detector definition, before pattern compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorSpec {
    /// Stable detector name (e.g., `"email"`).
    pub id: String,
    /// Regular expression the detector scans with.
    pub pattern: String,
    /// Kind assigned to every match of this detector.
    pub classify_as: FindingKind,
}

impl DetectorSpec {
    fn new(id: &str, pattern: &str, classify_as: FindingKind) -> Self {
        Self {
            id: id.to_string(),
            pattern: pattern.to_string(),
            classify_as,
        }
    }
}

/// A compiled detector: a named pattern-classification pair.
#[derive(Debug, Clone)]
pub struct Detector {
    pub id: String,
    pub regex: Regex,
    pub classify_as: FindingKind,
}

/// Sanitization policy configuration (`[policy]` section).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Ordered detector list. `None` selects the built-in set. Order
    /// determines the order findings are reported in.
    #[serde(default)]
    pub detectors: Option<Vec<DetectorSpec>>,
    /// Redaction rule per finding kind. `None` selects a token rule for
    /// every kind. A kind absent from the map is left unredacted.
    #[serde(default)]
    pub redaction: Option<HashMap<FindingKind, RedactionRule>>,
}

/// Proxy server configuration (`[proxy]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Address to listen on (e.g., `"127.0.0.1:18090"`).
    pub listen: String,
    /// Upstream chat-completion endpoint sanitized bodies are forwarded to.
    pub upstream: String,
    /// Upstream request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:18090".to_string(),
            upstream: "https://api.openai.com/v1/chat/completions".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Top-level application configuration deserialized from `promptguard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Proxy server settings.
    #[serde(default)]
    pub proxy: ProxyConfig,
    /// Detector and redaction configuration.
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl AppConfig {
    /// Load and parse the configuration from a TOML file at the given path.
    ///
    /// Before parsing, `${VAR}` and `$VAR` placeholders in the TOML text are
    /// replaced with the corresponding environment variable values. An error
    /// is returned if a referenced variable is not set.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let content = substitute_env_vars(&content)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Compiled, immutable sanitization policy.
///
/// Built once at startup via [`Policy::compile`] and shared read-only across
/// request handlers; `detect`/`redact` never mutate it.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Compiled detectors, in declaration (priority) order.
    pub detectors: Vec<Detector>,
    /// Redaction rule per finding kind.
    pub redaction: HashMap<FindingKind, RedactionRule>,
}

impl Policy {
    /// Compile a policy from its declarative configuration.
    ///
    /// Every detector pattern is compiled here; a malformed pattern yields
    /// [`PromptGuardError::Pattern`] naming the offending detector.
    pub fn compile(config: &PolicyConfig) -> Result<Self> {
        let specs = match &config.detectors {
            Some(specs) => specs.clone(),
            None => builtin_detectors(),
        };

        let mut detectors = Vec::with_capacity(specs.len());
        for spec in &specs {
            let regex = Regex::new(&spec.pattern).map_err(|source| PromptGuardError::Pattern {
                detector: spec.id.clone(),
                source,
            })?;
            detectors.push(Detector {
                id: spec.id.clone(),
                regex,
                classify_as: spec.classify_as,
            });
        }

        let redaction = match &config.redaction {
            Some(map) => map.clone(),
            None => default_redaction(),
        };

        Ok(Self {
            detectors,
            redaction,
        })
    }

    /// The built-in default policy: all built-in detectors, token redaction
    /// for every kind.
    pub fn default_policy() -> Self {
        // Built-in patterns are covered by tests; compilation cannot fail.
        Self::compile(&PolicyConfig::default()).expect("built-in policy compiles")
    }
}

/// The built-in detector set, in priority order.
///
/// `secret` is deliberately first so that credential shapes are reported
/// before the broader patterns that may also match inside them. No
/// cross-detector suppression is performed; overlap is tolerated and
/// resolved only by redaction order.
pub fn builtin_detectors() -> Vec<DetectorSpec> {
    vec![
        // API keys and tokens: OpenAI-style sk-, AWS access key, GitHub PAT,
        // Slack tokens, JWT shape. Greedy quantifiers and trailing \b keep a
        // match from stopping on a prefix of a longer token.
        DetectorSpec::new(
            "secret",
            r"sk-[A-Za-z0-9_-]{16,}|AKIA[0-9A-Z]{16}\b|ghp_[A-Za-z0-9]{36}\b|xox[baprs]-[A-Za-z0-9-]{10,}|eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+",
            FindingKind::Secret,
        ),
        DetectorSpec::new(
            "email",
            r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}",
            FindingKind::Email,
        ),
        // Optional +, a digit, 7+ phone-ish characters, a trailing digit.
        // The trailing \b keeps the detector off digit runs embedded in
        // longer alphanumeric tokens (e.g. inside an sk- key).
        DetectorSpec::new("phone", r"\+?\d[\d\s().-]{7,}\d\b", FindingKind::Phone),
        DetectorSpec::new(
            "number",
            r"(?i)\b(?:invoice|inv|bill|ref)[\s#-]*\d{3,}",
            FindingKind::Number,
        ),
        // Two or more consecutive capitalized words. Intentionally
        // approximate: any capitalized multi-word phrase will match.
        DetectorSpec::new(
            "name-token",
            r"[A-Z][a-z'-]+(?:\s+[A-Z][a-z'-]+)+",
            FindingKind::Name,
        ),
    ]
}

/// Default redaction table: a `[REDACTED_<KIND>]` token rule for every kind.
pub fn default_redaction() -> HashMap<FindingKind, RedactionRule> {
    FindingKind::ALL
        .iter()
        .map(|kind| (*kind, RedactionRule::token()))
        .collect()
}

/// Replace `${VAR_NAME}` and `$VAR_NAME` placeholders with environment
/// variable values.
///
/// Returns an error containing the variable name if the variable is not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    // Match ${VAR_NAME} (braces form)
    let re_braces = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    // Match $VAR_NAME (no braces, uppercase + underscore only to avoid false positives)
    let re_bare = Regex::new(r"\$([A-Z_][A-Z0-9_]*)").unwrap();

    let mut result = input.to_string();

    // First pass: ${VAR} form
    for cap in re_braces.captures_iter(input) {
        let var_name = &cap[1];
        let value = std::env::var(var_name)
            .map_err(|_| PromptGuardError::ConfigEnvVar(var_name.to_string()))?;
        result = result.replace(&cap[0], &value);
    }

    // Second pass: $VAR form on the already-substituted string
    let intermediate = result.clone();
    for cap in re_bare.captures_iter(&intermediate) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let value = std::env::var(var_name)
            .map_err(|_| PromptGuardError::ConfigEnvVar(var_name.to_string()))?;
        result = result.replace(full_match, &value);
    }

    Ok(result)
}
