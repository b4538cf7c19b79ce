//! Content safety gate — three-stage moderation of a draft's copy plus the
//! upstream vision-validation result.
//!
//! Stages, each additive to the violation/warning lists:
//! 1. visual compliance (safety flags raised by the vision validator)
//! 2. copy integrity (prohibited terms/concepts, unsafe-topic patterns, clickbait)
//! 3. identity/DEI (applied upstream by the prompt composer)

use std::sync::LazyLock;

use creative_core::types::{BrandGuidelines, VisionValidation};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum composite score a draft needs to be accepted.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.8;

const VIOLATION_PENALTY: f64 = 0.2;
const WARNING_PENALTY: f64 = 0.05;

pub const FILTER_VISUAL_COMPLIANCE: &str = "visual_compliance";
pub const FILTER_PROHIBITED_TERMS: &str = "prohibited_terms";
pub const FILTER_PROHIBITED_CONCEPTS: &str = "prohibited_concepts";
pub const FILTER_UNSAFE_PATTERNS: &str = "unsafe_patterns";
pub const FILTER_COPY_INTEGRITY: &str = "copy_integrity";

/// Unsafe-topic categories. A match is a violation.
static UNSAFE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            "violence_or_substances",
            r"(?i)\b(violence|violent|weapons?|guns?|firearms?|drugs?|narcotics?|alcohol|liquor|tobacco|cigarettes?)\b",
        ),
        (
            "hate_or_discrimination",
            r"(?i)\b(hate|hateful|racist|racism|discriminat\w*|bigot\w*)\b",
        ),
        (
            "explicit_content",
            r"(?i)\b(explicit|nsfw|nude|nudity|porn\w*|xxx)\b",
        ),
        (
            "deceptive_claims",
            r"(?i)(you won'?t believe|miracle cure|doctors hate|shocking secret|risk[- ]free)",
        ),
    ]
    .into_iter()
    .map(|(category, pattern)| (category, Regex::new(pattern).unwrap()))
    .collect()
});

/// Clickbait phrasing. A match is only a warning.
static CLICKBAIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(limited time|act now|exclusive deal|guaranteed)").unwrap()
});

/// Verdict of the safety gate for one piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyCheckResult {
    pub is_safe: bool,
    pub safety_score: f64,
    pub violations: Vec<String>,
    pub warnings: Vec<String>,
    pub filters_triggered: Vec<String>,
}

impl SafetyCheckResult {
    /// Safe and at or above [`ACCEPTANCE_THRESHOLD`].
    pub fn is_acceptable(&self) -> bool {
        self.is_safe && self.safety_score >= ACCEPTANCE_THRESHOLD
    }
}

#[derive(Debug, Default)]
struct Findings {
    violations: Vec<String>,
    warnings: Vec<String>,
    filters: Vec<&'static str>,
}

impl Findings {
    fn trigger(&mut self, filter: &'static str) {
        if !self.filters.contains(&filter) {
            self.filters.push(filter);
        }
    }
}

/// Scores content against one brand's rules. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct ContentSafetyGate {
    guidelines: BrandGuidelines,
}

impl ContentSafetyGate {
    pub fn new(guidelines: BrandGuidelines) -> Self {
        Self { guidelines }
    }

    pub fn guidelines(&self) -> &BrandGuidelines {
        &self.guidelines
    }

    /// Run all three gates and blend the findings into a score. Never fails.
    pub fn check(&self, text: &str, visual: Option<&VisionValidation>) -> SafetyCheckResult {
        let mut findings = Findings::default();

        self.visual_compliance_gate(visual, &mut findings);
        self.copy_integrity_gate(text, &mut findings);
        self.identity_gate(text, &mut findings);

        let is_safe = findings.violations.is_empty();
        let safety_score = score(
            is_safe,
            findings.violations.len(),
            findings.warnings.len(),
        );

        SafetyCheckResult {
            is_safe,
            safety_score,
            violations: findings.violations,
            warnings: findings.warnings,
            filters_triggered: findings.filters.into_iter().map(String::from).collect(),
        }
    }

    /// Whether the brand name appears in the text (case-insensitive).
    /// Evaluated separately; does not feed the safety score.
    pub fn check_brand_compliance(&self, text: &str) -> bool {
        let brand = self.guidelines.brand_name.trim().to_lowercase();
        !brand.is_empty() && text.to_lowercase().contains(&brand)
    }

    fn visual_compliance_gate(&self, visual: Option<&VisionValidation>, findings: &mut Findings) {
        let Some(visual) = visual else {
            return;
        };
        if visual.safety_flags.is_empty() {
            return;
        }
        findings
            .violations
            .extend(visual.safety_flags.iter().cloned());
        findings.trigger(FILTER_VISUAL_COMPLIANCE);
    }

    fn copy_integrity_gate(&self, text: &str, findings: &mut Findings) {
        let text_lower = text.to_lowercase();

        for term in &self.guidelines.prohibited_terms {
            let needle = term.trim().to_lowercase();
            if !needle.is_empty() && text_lower.contains(&needle) {
                findings
                    .violations
                    .push(format!("Prohibited term: '{}'", term));
                findings.trigger(FILTER_PROHIBITED_TERMS);
            }
        }

        for concept in &self.guidelines.prohibited_concepts {
            let needle = concept.trim().to_lowercase();
            if !needle.is_empty() && text_lower.contains(&needle) {
                findings
                    .violations
                    .push(format!("Prohibited concept: '{}'", concept));
                findings.trigger(FILTER_PROHIBITED_CONCEPTS);
            }
        }

        for (category, pattern) in UNSAFE_PATTERNS.iter() {
            if let Some(hit) = pattern.find(text) {
                findings.violations.push(format!(
                    "Unsafe content ({}): '{}'",
                    category,
                    hit.as_str()
                ));
                findings.trigger(FILTER_UNSAFE_PATTERNS);
            }
        }

        if let Some(hit) = CLICKBAIT_PATTERN.find(text) {
            findings
                .warnings
                .push(format!("Clickbait phrasing: '{}'", hit.as_str()));
            findings.trigger(FILTER_COPY_INTEGRITY);
        }
    }

    /// Representation checks happen during prompt composition via the
    /// brand's inclusion profile; this stage contributes no findings.
    fn identity_gate(&self, _text: &str, _findings: &mut Findings) {}
}

/// Two-branch score: safe content never drops below the acceptance threshold,
/// unsafe content loses a full 0.2 per violation.
fn score(is_safe: bool, violations: usize, warnings: usize) -> f64 {
    let warning_penalty = WARNING_PENALTY * warnings as f64;
    if is_safe {
        (1.0 - warning_penalty).max(ACCEPTANCE_THRESHOLD)
    } else {
        (1.0 - VIOLATION_PENALTY * violations as f64 - warning_penalty).max(0.0)
    }
}
