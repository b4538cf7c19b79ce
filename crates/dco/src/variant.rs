//! Accepted creative variants, the persisted bundle, and the flat delivery
//! format handed to downstream bidding systems.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use creative_core::error::CreativeResult;
use creative_core::types::{PlatformFormat, VariantStrategy, VisionValidation};
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::orchestrator::GenerationReport;

/// A draft that cleared the safety gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeVariant {
    pub variant_id: String,
    pub strategy: VariantStrategy,
    pub image_url: String,
    pub headline: String,
    pub body: String,
    pub cta: String,
    pub platform: PlatformFormat,
    /// The wanted instruction the image was rendered from.
    pub prompt: String,
    pub brand_compliant: bool,
    #[serde(serialize_with = "round_to_thousandths")]
    pub safety_score: f64,
    pub brand_violations: Vec<String>,
    pub vision_validation: VisionValidation,
    pub persona_match: String,
    pub created_at: DateTime<Utc>,
}

fn round_to_thousandths<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 1000.0).round() / 1000.0)
}

/// Identifier unique within a run and across runs:
/// `{strategy}-{hash prefix}-{timestamp micros}`.
pub fn derive_variant_id(
    product_name: &str,
    strategy: VariantStrategy,
    timestamp: DateTime<Utc>,
    index: usize,
    run_id: Uuid,
) -> String {
    let nanos = timestamp
        .timestamp_nanos_opt()
        .unwrap_or_else(|| timestamp.timestamp_micros().saturating_mul(1000));
    let mut hasher = Sha256::new();
    hasher.update(
        format!(
            "{}:{}:{}:{}:{}",
            product_name,
            strategy.as_str(),
            nanos,
            index,
            run_id
        )
        .as_bytes(),
    );
    let digest = hex::encode(hasher.finalize());
    format!(
        "{}-{}-{}",
        strategy.as_str(),
        &digest[..12],
        timestamp.timestamp_micros()
    )
}

// ─── Bundle ─────────────────────────────────────────────────────────────────

/// The persisted slate of accepted variants for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantBundle {
    pub campaign_name: String,
    pub generated_at: DateTime<Utc>,
    pub variant_count: usize,
    pub variants: Vec<CreativeVariant>,
}

impl VariantBundle {
    pub fn new(campaign_name: impl Into<String>, variants: Vec<CreativeVariant>) -> Self {
        Self {
            campaign_name: campaign_name.into(),
            generated_at: Utc::now(),
            variant_count: variants.len(),
            variants,
        }
    }

    pub fn from_report(campaign_name: impl Into<String>, report: &GenerationReport) -> Self {
        Self::new(campaign_name, report.variants.clone())
    }

    /// Write the bundle as pretty JSON to `<dir>/<campaign>_bundle.json`.
    pub fn save_json(&self, dir: impl AsRef<Path>) -> CreativeResult<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}_bundle.json", file_stem(&self.campaign_name)));
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), variants = self.variant_count, "bundle saved");
        Ok(path)
    }

    /// Write the delivery format to `<dir>/<campaign>_delivery.json`.
    pub fn save_delivery_json(&self, dir: impl AsRef<Path>) -> CreativeResult<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}_delivery.json", file_stem(&self.campaign_name)));
        fs::write(&path, serde_json::to_string_pretty(&self.delivery_format())?)?;
        Ok(path)
    }

    pub fn load_json(path: impl AsRef<Path>) -> CreativeResult<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn delivery_format(&self) -> Vec<DeliveryCreative> {
        self.variants.iter().map(DeliveryCreative::from).collect()
    }
}

fn file_stem(campaign_name: &str) -> String {
    let stem: String = campaign_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "campaign".to_string()
    } else {
        stem
    }
}

// ─── Delivery Format ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryCreative {
    pub variant_id: String,
    pub creative: DeliveryAssets,
    pub targeting: DeliveryTargeting,
    pub quality: DeliveryQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAssets {
    pub image_url: String,
    pub headline: String,
    pub body: String,
    pub cta: String,
    pub platform: PlatformFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTargeting {
    pub persona_match: String,
    pub strategy: VariantStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryQuality {
    #[serde(serialize_with = "round_to_thousandths")]
    pub safety_score: f64,
    pub brand_compliant: bool,
    pub vision_quality_score: f64,
    pub vision_confidence: f64,
}

impl From<&CreativeVariant> for DeliveryCreative {
    fn from(variant: &CreativeVariant) -> Self {
        Self {
            variant_id: variant.variant_id.clone(),
            creative: DeliveryAssets {
                image_url: variant.image_url.clone(),
                headline: variant.headline.clone(),
                body: variant.body.clone(),
                cta: variant.cta.clone(),
                platform: variant.platform,
            },
            targeting: DeliveryTargeting {
                persona_match: variant.persona_match.clone(),
                strategy: variant.strategy,
            },
            quality: DeliveryQuality {
                safety_score: variant.safety_score,
                brand_compliant: variant.brand_compliant,
                vision_quality_score: variant.vision_validation.quality_score,
                vision_confidence: variant.vision_validation.confidence,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_variant(strategy: VariantStrategy, score: f64) -> CreativeVariant {
        CreativeVariant {
            variant_id: derive_variant_id("RouteWise", strategy, Utc::now(), 0, Uuid::new_v4()),
            strategy,
            image_url: "sim://renders/0123456789abcdef.png".to_string(),
            headline: "RouteWise by the numbers".to_string(),
            body: "Cut fleet planning time by 40%.".to_string(),
            cta: "See the Data".to_string(),
            platform: PlatformFormat::SquareFeed,
            prompt: "clean infographic layout".to_string(),
            brand_compliant: false,
            safety_score: score,
            brand_violations: vec!["brand name 'Northwind' missing from copy".to_string()],
            vision_validation: VisionValidation {
                contains_product: true,
                brand_safe: true,
                quality_score: 0.85,
                confidence: 0.9,
                ..Default::default()
            },
            persona_match: "persona-ops-lead".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_variant_id_shape_and_uniqueness() {
        let now = Utc::now();
        let run = Uuid::new_v4();
        let a = derive_variant_id("RouteWise", VariantStrategy::DataLed, now, 4, run);
        let b = derive_variant_id("RouteWise", VariantStrategy::DataLed, now, 4, Uuid::new_v4());
        let c = derive_variant_id("RouteWise", VariantStrategy::Control, now, 0, run);

        assert!(a.starts_with("data_led-"));
        assert_eq!(a.split('-').count(), 3);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, derive_variant_id("RouteWise", VariantStrategy::DataLed, now, 4, run));
    }

    #[test]
    fn test_safety_score_rounded_on_the_wire() {
        let variant = sample_variant(VariantStrategy::Control, 0.950_000_000_1);
        let json = serde_json::to_value(&variant).unwrap();
        assert_eq!(json["safety_score"], 0.95);
        assert_eq!(json["strategy"], "control");
        assert_eq!(json["platform"], "square_feed");
        assert_eq!(json["vision_validation"]["quality_score"], 0.85);
    }

    #[test]
    fn test_bundle_and_delivery_format() {
        let bundle = VariantBundle::new(
            "routewise-q3",
            vec![
                sample_variant(VariantStrategy::Control, 1.0),
                sample_variant(VariantStrategy::DataLed, 0.95),
            ],
        );
        assert_eq!(bundle.variant_count, 2);

        let json = serde_json::to_value(&bundle).unwrap();
        assert!(json["generated_at"].as_str().unwrap().contains('T'));

        let delivery = bundle.delivery_format();
        assert_eq!(delivery.len(), 2);
        assert_eq!(delivery[1].targeting.strategy, VariantStrategy::DataLed);
        assert_eq!(delivery[1].creative.cta, "See the Data");
        assert!(!delivery[1].quality.brand_compliant);

        let flat = serde_json::to_value(&delivery[0]).unwrap();
        for key in ["creative", "targeting", "quality"] {
            assert!(flat.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = VariantBundle::new(
            "spring launch/2025",
            vec![sample_variant(VariantStrategy::Lifestyle, 1.0)],
        );

        let path = bundle.save_json(dir.path()).unwrap();
        assert!(path.ends_with("spring_launch_2025_bundle.json"));
        let loaded = VariantBundle::load_json(&path).unwrap();
        assert_eq!(loaded.variant_count, 1);
        assert_eq!(loaded.variants[0].variant_id, bundle.variants[0].variant_id);

        let delivery_path = bundle.save_delivery_json(dir.path()).unwrap();
        let raw = std::fs::read_to_string(delivery_path).unwrap();
        let parsed: Vec<DeliveryCreative> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
