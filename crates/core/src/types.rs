//! Rule Registry data model: the immutable inputs of one generation request.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CreativeError;

// ─── Audience & Product ─────────────────────────────────────────────────────

/// The audience segment a creative slate is generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudiencePersona {
    pub persona_id: String,
    pub segment: String,
    /// Predicted lifetime value, normalised to [0, 1].
    pub ltv_score: f64,
    /// Probability of churn, in [0, 1].
    pub churn_risk: f64,
    pub preferred_messaging: String,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub motivations: Vec<String>,
    pub trigger_phrase: String,
}

impl AudiencePersona {
    /// First listed motivation. Registry validation guarantees one exists.
    pub fn primary_motivation(&self) -> &str {
        self.motivations.first().map(String::as_str).unwrap_or_default()
    }

    /// Exact membership; tags are matched verbatim.
    pub fn is_motivated_by(&self, motivation: &str) -> bool {
        self.motivations.iter().any(|m| m == motivation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub name: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub usp: String,
    pub category: String,
    #[serde(default)]
    pub visual_assets: Vec<String>,
}

// ─── Brand Guidelines ───────────────────────────────────────────────────────

/// Closed set of brand style guides. Each selects fixed style, color-theory
/// and material keyword tables in the prompt composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleGuide {
    Minimalist,
    Energetic,
    Corporate,
}

impl StyleGuide {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleGuide::Minimalist => "minimalist",
            StyleGuide::Energetic => "energetic",
            StyleGuide::Corporate => "corporate",
        }
    }
}

impl FromStr for StyleGuide {
    type Err = CreativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_tag(s).as_str() {
            "minimalist" => Ok(StyleGuide::Minimalist),
            "energetic" => Ok(StyleGuide::Energetic),
            "corporate" => Ok(StyleGuide::Corporate),
            _ => Err(CreativeError::UnknownTag {
                kind: "style guide",
                value: s.to_string(),
            }),
        }
    }
}

/// Brand rulebook shared by every variant of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandGuidelines {
    pub brand_name: String,
    #[serde(default)]
    pub primary_colors: Vec<String>,
    #[serde(default)]
    pub secondary_colors: Vec<String>,
    #[serde(default)]
    pub fonts: Vec<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub tone_of_voice: String,
    pub style_guide: StyleGuide,
    /// Ordered; the composer excludes only the first three in imagery.
    #[serde(default)]
    pub prohibited_terms: Vec<String>,
    #[serde(default)]
    pub prohibited_concepts: Vec<String>,
    pub target_audience: String,
    /// Diversity & inclusion flags, e.g. `diverse_representation: true`.
    #[serde(default)]
    pub dei_profile: BTreeMap<String, bool>,
}

// ─── Platform & Strategy ────────────────────────────────────────────────────

/// Delivery platform format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformFormat {
    VerticalShortForm,
    SquareFeed,
    ProfessionalWidescreen,
    ResponsiveMultiFormat,
}

impl PlatformFormat {
    pub const ALL: [PlatformFormat; 4] = [
        PlatformFormat::VerticalShortForm,
        PlatformFormat::SquareFeed,
        PlatformFormat::ProfessionalWidescreen,
        PlatformFormat::ResponsiveMultiFormat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFormat::VerticalShortForm => "vertical_short_form",
            PlatformFormat::SquareFeed => "square_feed",
            PlatformFormat::ProfessionalWidescreen => "professional_widescreen",
            PlatformFormat::ResponsiveMultiFormat => "responsive_multi_format",
        }
    }

    /// Nominal width:height ratio of the rendered asset.
    pub fn aspect_ratio(&self) -> &'static str {
        match self {
            PlatformFormat::VerticalShortForm => "9:16",
            PlatformFormat::SquareFeed => "1:1",
            PlatformFormat::ProfessionalWidescreen => "1.91:1",
            PlatformFormat::ResponsiveMultiFormat => "flexible",
        }
    }
}

impl fmt::Display for PlatformFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformFormat {
    type Err = CreativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_tag(s).as_str() {
            "vertical_short_form" => Ok(PlatformFormat::VerticalShortForm),
            "square_feed" => Ok(PlatformFormat::SquareFeed),
            "professional_widescreen" => Ok(PlatformFormat::ProfessionalWidescreen),
            "responsive_multi_format" => Ok(PlatformFormat::ResponsiveMultiFormat),
            _ => Err(CreativeError::UnknownTag {
                kind: "platform",
                value: s.to_string(),
            }),
        }
    }
}

/// One of the five creative-angle archetypes. Declaration order is the
/// output order of every generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantStrategy {
    Control,
    Lifestyle,
    Abstract,
    HighContrast,
    DataLed,
}

impl VariantStrategy {
    pub const ALL: [VariantStrategy; 5] = [
        VariantStrategy::Control,
        VariantStrategy::Lifestyle,
        VariantStrategy::Abstract,
        VariantStrategy::HighContrast,
        VariantStrategy::DataLed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantStrategy::Control => "control",
            VariantStrategy::Lifestyle => "lifestyle",
            VariantStrategy::Abstract => "abstract",
            VariantStrategy::HighContrast => "high_contrast",
            VariantStrategy::DataLed => "data_led",
        }
    }

    /// Position in the fixed slate order.
    pub fn position(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for VariantStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantStrategy {
    type Err = CreativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_tag(s).as_str() {
            "control" => Ok(VariantStrategy::Control),
            "lifestyle" => Ok(VariantStrategy::Lifestyle),
            "abstract" => Ok(VariantStrategy::Abstract),
            "high_contrast" => Ok(VariantStrategy::HighContrast),
            "data_led" => Ok(VariantStrategy::DataLed),
            _ => Err(CreativeError::UnknownTag {
                kind: "strategy",
                value: s.to_string(),
            }),
        }
    }
}

fn normalize_tag(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('-', "_")
}

// ─── Vision Validation ──────────────────────────────────────────────────────

/// Safety flag carried by [`VisionValidation::unavailable`].
pub const VISION_UNAVAILABLE_FLAG: &str = "vision_validation_unavailable";

/// Result returned by the external vision validator for a rendered image.
///
/// Fields the core does not know about are kept verbatim in `extra` and
/// passed through to the bundle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisionValidation {
    pub contains_product: bool,
    pub brand_safe: bool,
    pub quality_score: f64,
    pub confidence: f64,
    #[serde(default)]
    pub detected_elements: Vec<String>,
    #[serde(default)]
    pub safety_flags: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl VisionValidation {
    /// Worst-case payload for callers that must map a validator outage
    /// to something the safety gate can score.
    pub fn unavailable() -> Self {
        Self {
            contains_product: false,
            brand_safe: false,
            quality_score: 0.0,
            confidence: 0.0,
            detected_elements: Vec::new(),
            safety_flags: vec![VISION_UNAVAILABLE_FLAG.to_string()],
            extra: serde_json::Map::new(),
        }
    }

    /// True when the payload reports a validator outage rather than a verdict.
    pub fn is_unavailable(&self) -> bool {
        self.safety_flags.iter().any(|f| f == VISION_UNAVAILABLE_FLAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_order_and_tags() {
        let tags: Vec<_> = VariantStrategy::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            tags,
            vec!["control", "lifestyle", "abstract", "high_contrast", "data_led"]
        );
        for (i, strategy) in VariantStrategy::ALL.iter().enumerate() {
            assert_eq!(strategy.position(), i);
            assert_eq!(strategy.as_str().parse::<VariantStrategy>().unwrap(), *strategy);
        }
    }

    #[test]
    fn test_hyphenated_tags_parse() {
        assert_eq!(
            "high-contrast".parse::<VariantStrategy>().unwrap(),
            VariantStrategy::HighContrast
        );
        assert_eq!(
            "Vertical-Short-Form".parse::<PlatformFormat>().unwrap(),
            PlatformFormat::VerticalShortForm
        );
        assert_eq!("corporate".parse::<StyleGuide>().unwrap(), StyleGuide::Corporate);
    }

    #[test]
    fn test_unknown_tags_rejected() {
        let err = "carousel".parse::<PlatformFormat>().unwrap_err();
        assert!(matches!(err, CreativeError::UnknownTag { kind: "platform", .. }));
        assert!("testimonial".parse::<VariantStrategy>().is_err());
        assert!("brutalist".parse::<StyleGuide>().is_err());

        let json = r#""carousel""#;
        assert!(serde_json::from_str::<PlatformFormat>(json).is_err());
    }

    #[test]
    fn test_platform_aspect_ratios() {
        assert_eq!(PlatformFormat::VerticalShortForm.aspect_ratio(), "9:16");
        assert_eq!(PlatformFormat::SquareFeed.aspect_ratio(), "1:1");
        assert_eq!(PlatformFormat::ProfessionalWidescreen.aspect_ratio(), "1.91:1");
        assert_eq!(PlatformFormat::ALL.len(), 4);
    }

    #[test]
    fn test_vision_payload_keeps_unknown_fields() {
        let json = r#"{
            "contains_product": true,
            "brand_safe": true,
            "quality_score": 0.9,
            "confidence": 0.8,
            "detected_elements": ["bottle"],
            "safety_flags": [],
            "model_version": "vlm-2"
        }"#;
        let payload: VisionValidation = serde_json::from_str(json).unwrap();
        assert!(payload.contains_product);
        assert_eq!(payload.extra["model_version"], "vlm-2");

        let back = serde_json::to_value(&payload).unwrap();
        assert_eq!(back["model_version"], "vlm-2");
    }

    #[test]
    fn test_persona_motivation_lookup() {
        let persona = AudiencePersona {
            persona_id: "p-1".to_string(),
            segment: "ops leads".to_string(),
            ltv_score: 0.5,
            churn_risk: 0.1,
            preferred_messaging: "direct".to_string(),
            pain_points: vec![],
            motivations: vec!["Efficiency".to_string(), "growth".to_string()],
            trigger_phrase: "Save hours".to_string(),
        };
        assert_eq!(persona.primary_motivation(), "Efficiency");
        assert!(persona.is_motivated_by("growth"));
        assert!(persona.is_motivated_by("Efficiency"));
        assert!(!persona.is_motivated_by("efficiency"));
        assert!(!persona.is_motivated_by("status"));
    }
}
