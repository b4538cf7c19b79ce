//! Prompt composer — maps (strategy × platform × style guide × persona) to the
//! wanted/unwanted instruction pair handed to the image backend.
//!
//! Keywords wrapped as `(keyword:1.2)` carry an emphasis weight that the image
//! backend interprets; the tables below must keep that syntax verbatim.

use creative_core::types::{
    AudiencePersona, BrandGuidelines, PlatformFormat, ProductMetadata, StyleGuide,
    VariantStrategy,
};
use serde::{Deserialize, Serialize};

const COMPOSITION_RULE: &str =
    "rule of thirds, balanced negative space, clear focal point, (clean composition:1.1)";

const QUALITY_BOOSTERS: [&str; 7] = [
    "(masterpiece:1.2)",
    "(best quality:1.2)",
    "(ultra detailed:1.1)",
    "8k resolution",
    "sharp focus",
    "professional color grading",
    "award-winning advertising photography",
];

const DEFECT_EXCLUSIONS: [&str; 26] = [
    "deformed",
    "distorted",
    "disfigured",
    "bad anatomy",
    "wrong anatomy",
    "extra limbs",
    "missing limbs",
    "floating limbs",
    "extra fingers",
    "fused fingers",
    "mutated hands",
    "poorly drawn hands",
    "poorly drawn face",
    "asymmetrical eyes",
    "blurry",
    "low quality",
    "low resolution",
    "jpeg artifacts",
    "pixelated",
    "noisy",
    "oversaturated",
    "overexposed",
    "underexposed",
    "cropped",
    "out of frame",
    "duplicate",
];

const FIXED_BRAND_EXCLUSIONS: [&str; 6] = [
    "competitor logos",
    "competitor branding",
    "misleading imagery",
    "clickbait elements",
    "watermark",
    "signature",
];

/// Camera and lighting preset for one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyPreset {
    pub camera_angle: &'static str,
    pub lighting: &'static str,
}

/// Keyword tables selected by the brand style guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTable {
    pub style: &'static str,
    pub color_theory: &'static str,
    pub materials: &'static str,
}

/// Aspect-ratio and optimization phrases selected by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformPreset {
    pub aspect_ratio: &'static str,
    pub optimization: &'static str,
    pub booster: &'static str,
}

/// The (wanted, unwanted) instruction pair for one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPair {
    pub wanted: String,
    pub unwanted: String,
}

pub fn strategy_preset(strategy: VariantStrategy) -> StrategyPreset {
    match strategy {
        VariantStrategy::Control => StrategyPreset {
            camera_angle: "eye-level shot, 85mm lens, shallow depth of field",
            lighting: "soft studio lighting, three-point lighting setup",
        },
        VariantStrategy::Lifestyle => StrategyPreset {
            camera_angle: "over-the-shoulder perspective, 35mm lens, environmental framing",
            lighting: "natural window light, (golden hour warmth:1.1)",
        },
        VariantStrategy::Abstract => StrategyPreset {
            camera_angle: "dynamic dutch angle, wide-angle lens",
            lighting: "dramatic rim lighting, volumetric light rays",
        },
        VariantStrategy::HighContrast => StrategyPreset {
            camera_angle: "low-angle hero shot, 24mm lens",
            lighting: "(high-contrast chiaroscuro lighting:1.3), hard shadows",
        },
        VariantStrategy::DataLed => StrategyPreset {
            camera_angle: "straight-on flat lay, orthographic perspective",
            lighting: "even diffused lighting, no harsh shadows",
        },
    }
}

pub fn style_table(style: StyleGuide) -> StyleTable {
    match style {
        StyleGuide::Minimalist => StyleTable {
            style: "(minimalist:1.3), clean lines, uncluttered, whitespace-driven design",
            color_theory: "monochromatic palette, muted neutrals, (subtle accent color:1.1)",
            materials: "matte finishes, brushed aluminum, frosted glass",
        },
        StyleGuide::Energetic => StyleTable {
            style: "(vibrant:1.3), dynamic energy, bold graphic shapes, sense of motion",
            color_theory: "complementary color scheme, (saturated colors:1.2), neon accents",
            materials: "glossy surfaces, holographic textures, reflective chrome",
        },
        StyleGuide::Corporate => StyleTable {
            style: "(professional:1.3), polished, trustworthy, structured layout",
            color_theory: "analogous blue palette, navy and slate tones, (brand colors:1.1)",
            materials: "brushed steel, clean glass, premium paper textures",
        },
    }
}

pub fn platform_preset(platform: PlatformFormat) -> PlatformPreset {
    match platform {
        PlatformFormat::VerticalShortForm => PlatformPreset {
            aspect_ratio: "9:16 vertical aspect ratio",
            optimization: "optimized for mobile short-form feeds, thumb-stopping visual",
            booster: "(bold center focus:1.2), text-safe top and bottom margins",
        },
        PlatformFormat::SquareFeed => PlatformPreset {
            aspect_ratio: "1:1 square aspect ratio",
            optimization: "optimized for social feed scrolling, instantly readable",
            booster: "(scroll-stopping:1.2), high clarity at small sizes",
        },
        PlatformFormat::ProfessionalWidescreen => PlatformPreset {
            aspect_ratio: "1.91:1 landscape aspect ratio",
            optimization: "optimized for professional network feeds, credible and polished",
            booster: "(executive presence:1.1), refined corporate polish",
        },
        PlatformFormat::ResponsiveMultiFormat => PlatformPreset {
            aspect_ratio: "flexible aspect ratio, safe-zone centered composition",
            optimization: "optimized for responsive display placements across sizes",
            booster: "(adaptable layout:1.1), key elements inside the central safe zone",
        },
    }
}

/// Inclusion flags recognised in `dei_profile`, in the order they are applied.
const INCLUSION_PHRASES: [(&str, &str); 4] = [
    (
        "diverse_representation",
        "(diverse representation:1.1), inclusive casting across ethnicities",
    ),
    ("age_inclusive", "multigenerational people, age-inclusive casting"),
    ("body_inclusive", "body-inclusive representation, realistic body types"),
    ("accessibility", "visible accessibility features, accessible design cues"),
];

/// Builds generation instructions. Stateless; every method is a pure function.
#[derive(Debug, Clone, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    /// Compose the base instruction pair for one strategy.
    pub fn compose(
        &self,
        strategy: VariantStrategy,
        product: &ProductMetadata,
        persona: &AudiencePersona,
        platform: PlatformFormat,
        guidelines: &BrandGuidelines,
    ) -> PromptPair {
        let preset = strategy_preset(strategy);
        let style = style_table(guidelines.style_guide);
        let format = platform_preset(platform);

        let mut parts: Vec<String> = vec![
            subject_framing(strategy, product, persona),
            preset.camera_angle.to_string(),
            preset.lighting.to_string(),
            COMPOSITION_RULE.to_string(),
            style.style.to_string(),
            style_reference(guidelines),
            style.color_theory.to_string(),
            style.materials.to_string(),
            format.aspect_ratio.to_string(),
            format.optimization.to_string(),
        ];
        parts.extend(QUALITY_BOOSTERS.iter().map(|b| b.to_string()));

        PromptPair {
            wanted: parts.join(", "),
            unwanted: self.unwanted_instructions(guidelines),
        }
    }

    /// Defect exclusions followed by brand-specific and fixed brand exclusions.
    pub fn unwanted_instructions(&self, guidelines: &BrandGuidelines) -> String {
        let mut parts: Vec<&str> = DEFECT_EXCLUSIONS.to_vec();
        parts.extend(guidelines.prohibited_terms.iter().take(3).map(String::as_str));
        parts.extend(guidelines.prohibited_concepts.iter().map(String::as_str));
        parts.extend(FIXED_BRAND_EXCLUSIONS);
        parts.join(", ")
    }

    /// Append persona-driven terms to a wanted instruction.
    pub fn enhance_for_persona(&self, wanted: &str, persona: &AudiencePersona) -> String {
        let mut out = wanted.to_string();
        if persona.ltv_score > 0.8 {
            out.push_str(", (premium aesthetic:1.2), luxury finish, exclusive feel");
        }
        if persona.churn_risk > 0.6 {
            out.push_str(", (urgency:1.1), time-sensitive energy, compelling focal action");
        }
        if persona.is_motivated_by("efficiency") {
            out.push_str(", streamlined workflow imagery, (time-saving:1.1), effortless productivity");
        }
        out
    }

    /// Append the platform booster phrase to a wanted instruction.
    pub fn optimize_for_platform(&self, wanted: &str, platform: PlatformFormat) -> String {
        format!("{}, {}", wanted, platform_preset(platform).booster)
    }

    /// Append representation phrases for every enabled inclusion flag.
    pub fn apply_inclusion_profile(&self, wanted: &str, guidelines: &BrandGuidelines) -> String {
        let mut out = wanted.to_string();
        for (flag, phrase) in INCLUSION_PHRASES {
            if guidelines.dei_profile.get(flag).copied().unwrap_or(false) {
                out.push_str(", ");
                out.push_str(phrase);
            }
        }
        out
    }

    /// Base composition plus persona, platform and inclusion post-processing.
    pub fn compose_enhanced(
        &self,
        strategy: VariantStrategy,
        product: &ProductMetadata,
        persona: &AudiencePersona,
        platform: PlatformFormat,
        guidelines: &BrandGuidelines,
    ) -> PromptPair {
        let base = self.compose(strategy, product, persona, platform, guidelines);
        let wanted = self.enhance_for_persona(&base.wanted, persona);
        let wanted = self.optimize_for_platform(&wanted, platform);
        let wanted = self.apply_inclusion_profile(&wanted, guidelines);
        PromptPair {
            wanted,
            unwanted: base.unwanted,
        }
    }
}

fn subject_framing(
    strategy: VariantStrategy,
    product: &ProductMetadata,
    persona: &AudiencePersona,
) -> String {
    match strategy {
        VariantStrategy::Control => format!(
            "professional product photography of {}, {}, (centered composition:1.2), clean presentation",
            product.name, product.category
        ),
        VariantStrategy::Lifestyle => format!(
            "{} being used in an authentic everyday setting, (natural interaction:1.2), candid moment",
            product.name
        ),
        VariantStrategy::Abstract => format!(
            "conceptual visualization of {}, (abstract representation:1.3) of {}, symbolic imagery",
            persona.primary_motivation(),
            product.name
        ),
        VariantStrategy::HighContrast => format!(
            "(bold attention-grabbing:1.4) hero shot of {}, striking visual impact",
            product.name
        ),
        VariantStrategy::DataLed => format!(
            "clean infographic layout showcasing {}, (data visualization:1.2) elements, {} with key metrics",
            product.usp, product.name
        ),
    }
}

fn style_reference(guidelines: &BrandGuidelines) -> String {
    if guidelines.primary_colors.is_empty() {
        format!(
            "{} brand aesthetic, {} commercial advertising style",
            guidelines.brand_name,
            guidelines.style_guide.as_str()
        )
    } else {
        format!(
            "{} brand aesthetic, {} commercial advertising style, brand palette {}",
            guidelines.brand_name,
            guidelines.style_guide.as_str(),
            guidelines.primary_colors.join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creative_core::GenerationRequest;

    fn inputs() -> (ProductMetadata, AudiencePersona, BrandGuidelines) {
        let request = GenerationRequest::sample();
        (request.product, request.persona, request.guidelines)
    }

    #[test]
    fn test_compose_is_idempotent() {
        let (product, persona, guidelines) = inputs();
        let composer = PromptComposer::new();
        for strategy in VariantStrategy::ALL {
            let a = composer.compose(
                strategy,
                &product,
                &persona,
                PlatformFormat::SquareFeed,
                &guidelines,
            );
            let b = composer.compose(
                strategy,
                &product,
                &persona,
                PlatformFormat::SquareFeed,
                &guidelines,
            );
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_wanted_segment_order() {
        let (product, persona, guidelines) = inputs();
        let pair = PromptComposer::new().compose(
            VariantStrategy::Control,
            &product,
            &persona,
            PlatformFormat::VerticalShortForm,
            &guidelines,
        );
        let wanted = &pair.wanted;
        let preset = strategy_preset(VariantStrategy::Control);
        let style = style_table(StyleGuide::Corporate);
        let format = platform_preset(PlatformFormat::VerticalShortForm);

        assert!(wanted.starts_with("professional product photography of RouteWise"));
        let order = [
            preset.camera_angle,
            preset.lighting,
            COMPOSITION_RULE,
            style.style,
            "Northwind brand aesthetic",
            style.color_theory,
            style.materials,
            format.aspect_ratio,
            format.optimization,
            "(masterpiece:1.2)",
        ];
        let positions: Vec<usize> = order.iter().map(|p| wanted.find(p).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
        assert!(wanted.ends_with("award-winning advertising photography"));
    }

    #[test]
    fn test_presets_independent_of_content() {
        let (product, persona, guidelines) = inputs();
        let mut other_product = product.clone();
        other_product.name = "Brewly".to_string();
        other_product.usp = "Barista coffee at home".to_string();
        let mut other_persona = persona.clone();
        other_persona.motivations = vec!["status".to_string()];

        let composer = PromptComposer::new();
        for strategy in VariantStrategy::ALL {
            let preset = strategy_preset(strategy);
            for (p, q) in [(&product, &persona), (&other_product, &other_persona)] {
                let pair = composer.compose(strategy, p, q, PlatformFormat::SquareFeed, &guidelines);
                assert!(pair.wanted.contains(preset.camera_angle));
                assert!(pair.wanted.contains(preset.lighting));
            }
        }
    }

    #[test]
    fn test_keyed_substitutions() {
        let (product, persona, guidelines) = inputs();
        let composer = PromptComposer::new();

        let abstract_pair = composer.compose(
            VariantStrategy::Abstract,
            &product,
            &persona,
            PlatformFormat::SquareFeed,
            &guidelines,
        );
        assert!(abstract_pair
            .wanted
            .starts_with("conceptual visualization of efficiency"));

        let data_pair = composer.compose(
            VariantStrategy::DataLed,
            &product,
            &persona,
            PlatformFormat::SquareFeed,
            &guidelines,
        );
        assert!(data_pair
            .wanted
            .starts_with("clean infographic layout showcasing Cut fleet planning time by 40%"));
    }

    #[test]
    fn test_unwanted_brand_exclusions() {
        let (_, _, guidelines) = inputs();
        let unwanted = PromptComposer::new().unwanted_instructions(&guidelines);

        assert!(unwanted.starts_with("deformed, distorted"));
        assert!(unwanted.contains("cheap, free, best ever"));
        // Only the first three prohibited terms are excluded from imagery.
        assert!(!unwanted.contains("revolutionary"));
        assert!(unwanted.contains("overworked drivers"));
        for fixed in FIXED_BRAND_EXCLUSIONS {
            assert!(unwanted.contains(fixed));
        }
    }

    #[test]
    fn test_persona_enhancement_thresholds() {
        let (_, mut persona, _) = inputs();
        let composer = PromptComposer::new();

        persona.ltv_score = 0.8;
        persona.churn_risk = 0.6;
        persona.motivations = vec!["status".to_string()];
        assert_eq!(composer.enhance_for_persona("base", &persona), "base");

        persona.ltv_score = 0.81;
        persona.churn_risk = 0.61;
        persona.motivations.push("efficiency".to_string());
        let enhanced = composer.enhance_for_persona("base", &persona);
        assert!(enhanced.starts_with("base, (premium aesthetic:1.2)"));
        assert!(enhanced.contains("(urgency:1.1)"));
        assert!(enhanced.contains("(time-saving:1.1)"));
    }

    #[test]
    fn test_platform_and_inclusion_appends() {
        let (_, _, mut guidelines) = inputs();
        let composer = PromptComposer::new();

        let optimized = composer.optimize_for_platform("base", PlatformFormat::SquareFeed);
        assert_eq!(optimized, "base, (scroll-stopping:1.2), high clarity at small sizes");

        guidelines.dei_profile.clear();
        guidelines.dei_profile.insert("accessibility".to_string(), true);
        guidelines.dei_profile.insert("age_inclusive".to_string(), false);
        guidelines.dei_profile.insert("unknown_flag".to_string(), true);
        let inclusive = composer.apply_inclusion_profile("base", &guidelines);
        assert_eq!(
            inclusive,
            "base, visible accessibility features, accessible design cues"
        );
    }

    #[test]
    fn test_compose_enhanced_extends_base() {
        let (product, persona, guidelines) = inputs();
        let composer = PromptComposer::new();
        let base = composer.compose(
            VariantStrategy::Lifestyle,
            &product,
            &persona,
            PlatformFormat::ProfessionalWidescreen,
            &guidelines,
        );
        let enhanced = composer.compose_enhanced(
            VariantStrategy::Lifestyle,
            &product,
            &persona,
            PlatformFormat::ProfessionalWidescreen,
            &guidelines,
        );
        assert!(enhanced.wanted.starts_with(&base.wanted));
        assert!(enhanced.wanted.contains("(executive presence:1.1)"));
        assert!(enhanced.wanted.contains("(diverse representation:1.1)"));
        assert_eq!(enhanced.unwanted, base.unwanted);
    }
}
