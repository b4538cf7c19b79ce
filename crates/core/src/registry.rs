//! Rule Registry — the validated, immutable configuration of one generation
//! request. Every downstream component assumes it is fully populated, so
//! malformed input is rejected here before any external call is made.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CreativeError, CreativeResult};
use crate::types::{AudiencePersona, BrandGuidelines, PlatformFormat, ProductMetadata, StyleGuide};

/// Validated inputs shared by all five strategy pipelines of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleRegistry {
    persona: AudiencePersona,
    product: ProductMetadata,
    guidelines: BrandGuidelines,
    platform: PlatformFormat,
}

impl RuleRegistry {
    pub fn new(
        persona: AudiencePersona,
        product: ProductMetadata,
        guidelines: BrandGuidelines,
        platform: PlatformFormat,
    ) -> CreativeResult<Self> {
        validate_persona(&persona)?;
        validate_product(&product)?;
        validate_guidelines(&guidelines)?;
        debug!(
            persona_id = %persona.persona_id,
            product = %product.name,
            brand = %guidelines.brand_name,
            %platform,
            "rule registry validated"
        );
        Ok(Self {
            persona,
            product,
            guidelines,
            platform,
        })
    }

    pub fn persona(&self) -> &AudiencePersona {
        &self.persona
    }

    pub fn product(&self) -> &ProductMetadata {
        &self.product
    }

    pub fn guidelines(&self) -> &BrandGuidelines {
        &self.guidelines
    }

    pub fn platform(&self) -> PlatformFormat {
        self.platform
    }
}

/// Check that a persona carries everything the composer and copy templates key on.
pub fn validate_persona(persona: &AudiencePersona) -> CreativeResult<()> {
    if persona.persona_id.trim().is_empty() {
        return Err(CreativeError::InvalidPersona("persona_id is empty".into()));
    }
    check_unit_interval("ltv_score", persona.ltv_score)?;
    check_unit_interval("churn_risk", persona.churn_risk)?;
    match persona.motivations.first() {
        Some(primary) if !primary.trim().is_empty() => {}
        Some(_) => {
            return Err(CreativeError::InvalidPersona(format!(
                "persona '{}' has a blank primary motivation",
                persona.persona_id
            )));
        }
        None => {
            return Err(CreativeError::InvalidPersona(format!(
                "persona '{}' lists no motivations",
                persona.persona_id
            )));
        }
    }
    Ok(())
}

pub fn validate_product(product: &ProductMetadata) -> CreativeResult<()> {
    for (field, value) in [
        ("name", &product.name),
        ("usp", &product.usp),
        ("category", &product.category),
    ] {
        if value.trim().is_empty() {
            return Err(CreativeError::InvalidProduct(format!("{field} is empty")));
        }
    }
    Ok(())
}

pub fn validate_guidelines(guidelines: &BrandGuidelines) -> CreativeResult<()> {
    if guidelines.brand_name.trim().is_empty() {
        return Err(CreativeError::InvalidGuidelines("brand_name is empty".into()));
    }
    for color in guidelines
        .primary_colors
        .iter()
        .chain(&guidelines.secondary_colors)
    {
        if !is_hex_color(color) {
            return Err(CreativeError::InvalidGuidelines(format!(
                "color '{color}' is not a #RGB or #RRGGBB hex value"
            )));
        }
    }
    Ok(())
}

fn check_unit_interval(field: &str, value: f64) -> CreativeResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CreativeError::InvalidPersona(format!(
            "{field} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

// ─── Request Document ───────────────────────────────────────────────────────

/// A generation request as supplied by a caller (JSON document).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub campaign_name: Option<String>,
    pub persona: AudiencePersona,
    pub product: ProductMetadata,
    pub guidelines: BrandGuidelines,
    pub platform: PlatformFormat,
}

impl GenerationRequest {
    /// Validate the request into a [`RuleRegistry`].
    pub fn into_registry(self) -> CreativeResult<RuleRegistry> {
        RuleRegistry::new(self.persona, self.product, self.guidelines, self.platform)
    }

    /// Demo request used when no request document is supplied.
    pub fn sample() -> Self {
        let persona = AudiencePersona {
            persona_id: "persona-ops-lead".to_string(),
            segment: "Operations leaders at mid-size logistics firms".to_string(),
            ltv_score: 0.86,
            churn_risk: 0.32,
            preferred_messaging: "outcome-focused".to_string(),
            pain_points: vec![
                "manual route planning".to_string(),
                "missed delivery windows".to_string(),
            ],
            motivations: vec!["efficiency".to_string(), "predictability".to_string()],
            trigger_phrase: "Stop losing hours to spreadsheets".to_string(),
        };

        let product = ProductMetadata {
            name: "RouteWise".to_string(),
            features: vec![
                "live route optimisation".to_string(),
                "ETA forecasting".to_string(),
                "driver mobile app".to_string(),
            ],
            usp: "Cut fleet planning time by 40%".to_string(),
            category: "logistics software".to_string(),
            visual_assets: vec!["asset://routewise/dashboard.png".to_string()],
        };

        let mut dei_profile = BTreeMap::new();
        dei_profile.insert("diverse_representation".to_string(), true);
        dei_profile.insert("age_inclusive".to_string(), true);

        let guidelines = BrandGuidelines {
            brand_name: "Northwind".to_string(),
            primary_colors: vec!["#0052CC".to_string(), "#FFFFFF".to_string()],
            secondary_colors: vec!["#00B8D9".to_string()],
            fonts: vec!["Inter".to_string()],
            logo_url: Some("asset://northwind/logo.svg".to_string()),
            tone_of_voice: "confident".to_string(),
            style_guide: StyleGuide::Corporate,
            prohibited_terms: vec![
                "cheap".to_string(),
                "free".to_string(),
                "best ever".to_string(),
                "revolutionary".to_string(),
            ],
            prohibited_concepts: vec!["overworked drivers".to_string()],
            target_audience: "fleet operations teams".to_string(),
            dei_profile,
        };

        Self {
            campaign_name: Some("routewise-q3-launch".to_string()),
            persona,
            product,
            guidelines,
            platform: PlatformFormat::ProfessionalWidescreen,
        }
    }
}
