//! Per-strategy ad copy templates.

use creative_core::types::{AudiencePersona, BrandGuidelines, ProductMetadata, VariantStrategy};
use serde::{Deserialize, Serialize};

pub const MAX_HEADLINE_CHARS: usize = 40;
pub const MAX_BODY_CHARS: usize = 125;

/// Headline, body and call-to-action for one draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdCopy {
    pub headline: String,
    pub body: String,
    pub cta: String,
}

impl AdCopy {
    /// The text scored by the content safety gate.
    pub fn combined(&self) -> String {
        format!("{} {} {}", self.headline, self.body, self.cta)
    }
}

/// Fills the fixed copy template of each strategy.
#[derive(Debug, Clone, Default)]
pub struct CopyWriter;

impl CopyWriter {
    pub fn new() -> Self {
        Self
    }

    /// Headline is cut to 40 characters and body to 125, always.
    pub fn write(
        &self,
        strategy: VariantStrategy,
        product: &ProductMetadata,
        persona: &AudiencePersona,
        guidelines: &BrandGuidelines,
    ) -> AdCopy {
        let (headline, body, cta) = match strategy {
            VariantStrategy::Control => (
                format!("{}: {}", product.name, product.usp),
                format!(
                    "{} gives {} {}.",
                    product.name,
                    guidelines.target_audience,
                    feature_summary(product)
                ),
                "Learn More",
            ),
            VariantStrategy::Lifestyle => (
                format!("Life runs better with {}", product.name),
                format!(
                    "Made for people who value {}. {} fits right into your day.",
                    persona.primary_motivation(),
                    product.name
                ),
                "Shop Now",
            ),
            VariantStrategy::Abstract => (
                format!("Imagine {}", persona.primary_motivation()),
                format!(
                    "{} reimagines {}. {}.",
                    guidelines.brand_name, product.category, product.usp
                ),
                "Discover More",
            ),
            VariantStrategy::HighContrast => (
                persona.trigger_phrase.clone(),
                format!(
                    "{}. {} from {}.",
                    product.usp, product.name, guidelines.brand_name
                ),
                "Get Started",
            ),
            VariantStrategy::DataLed => (
                format!("{} by the numbers", product.name),
                format!(
                    "{}. Built for {} with {}.",
                    product.usp,
                    guidelines.target_audience,
                    feature_summary(product)
                ),
                "See the Data",
            ),
        };

        AdCopy {
            headline: truncate_chars(&headline, MAX_HEADLINE_CHARS),
            body: truncate_chars(&body, MAX_BODY_CHARS),
            cta: cta.to_string(),
        }
    }
}

fn feature_summary(product: &ProductMetadata) -> String {
    match product.features.as_slice() {
        [] => product.category.clone(),
        [only] => only.clone(),
        [first, second, ..] => format!("{first} and {second}"),
    }
}

/// Cut to at most `max` chars, dropping trailing whitespace left by the cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creative_core::GenerationRequest;

    #[test]
    fn test_templates_are_distinct() {
        let request = GenerationRequest::sample();
        let writer = CopyWriter::new();
        let copies: Vec<AdCopy> = VariantStrategy::ALL
            .iter()
            .map(|s| writer.write(*s, &request.product, &request.persona, &request.guidelines))
            .collect();

        for (i, a) in copies.iter().enumerate() {
            for b in &copies[i + 1..] {
                assert_ne!(a.headline, b.headline);
                assert_ne!(a.cta, b.cta);
            }
        }
        assert_eq!(copies[3].headline, "Stop losing hours to spreadsheets");
        assert_eq!(copies[2].headline, "Imagine efficiency");
    }

    #[test]
    fn test_hard_length_limits() {
        let mut request = GenerationRequest::sample();
        request.product.name = "An Extraordinarily Long Product Name For Testing".to_string();
        request.product.usp = "x".repeat(300);
        request.persona.trigger_phrase = "é".repeat(80);
        request.guidelines.target_audience = "everyone everywhere ".repeat(20);

        let writer = CopyWriter::new();
        for strategy in VariantStrategy::ALL {
            let copy = writer.write(strategy, &request.product, &request.persona, &request.guidelines);
            assert!(copy.headline.chars().count() <= MAX_HEADLINE_CHARS, "{strategy}");
            assert!(copy.body.chars().count() <= MAX_BODY_CHARS, "{strategy}");
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 40), "short");
        assert_eq!(truncate_chars("abc def", 4), "abc");
        assert_eq!(truncate_chars("ééééé", 3), "ééé");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_combined_text() {
        let copy = AdCopy {
            headline: "Hi".to_string(),
            body: "There".to_string(),
            cta: "Go".to_string(),
        };
        assert_eq!(copy.combined(), "Hi There Go");
    }
}
