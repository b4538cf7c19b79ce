//! External collaborators: the image-synthesis backend and the vision
//! validator. Real adapters implement these traits; retry and backoff belong
//! in those adapters, never in the orchestrator.

use std::future::Future;

use creative_core::types::{BrandGuidelines, VisionValidation};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend quota exceeded")]
    QuotaExceeded,

    #[error("backend call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

/// Turns a (wanted, unwanted) instruction pair into a rendered image reference.
pub trait ImageBackend: Send + Sync {
    fn render(
        &self,
        wanted: &str,
        unwanted: &str,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;
}

/// Inspects a rendered image. Always yields a well-formed payload; adapters
/// over a real model map outages to [`VisionValidation::unavailable`], which
/// the orchestrator records as a backend failure.
pub trait VisionValidator: Send + Sync {
    fn validate(
        &self,
        image_ref: &str,
        expected_product: &str,
        guidelines: &BrandGuidelines,
    ) -> impl Future<Output = VisionValidation> + Send;
}

// ─── Simulated Backends ─────────────────────────────────────────────────────

/// Deterministic stand-in for an image backend: the reference is derived from
/// a hash of the instruction pair, nothing is rendered.
#[derive(Debug, Clone, Default)]
pub struct SimulatedImageBackend;

impl SimulatedImageBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for SimulatedImageBackend {
    async fn render(&self, wanted: &str, unwanted: &str) -> Result<String, BackendError> {
        let mut hasher = Sha256::new();
        hasher.update(wanted.as_bytes());
        hasher.update(b"|");
        hasher.update(unwanted.as_bytes());
        let digest = hex::encode(hasher.finalize());
        let image_ref = format!("sim://renders/{}.png", &digest[..16]);
        debug!(%image_ref, "simulated render");
        Ok(image_ref)
    }
}

/// Stand-in vision validator returning a benign, high-confidence payload.
#[derive(Debug, Clone, Default)]
pub struct SimulatedVisionValidator;

impl SimulatedVisionValidator {
    pub fn new() -> Self {
        Self
    }
}

impl VisionValidator for SimulatedVisionValidator {
    async fn validate(
        &self,
        image_ref: &str,
        expected_product: &str,
        guidelines: &BrandGuidelines,
    ) -> VisionValidation {
        debug!(%image_ref, product = %expected_product, "simulated vision validation");
        let mut detected_elements = vec![expected_product.to_string()];
        detected_elements.extend(guidelines.primary_colors.iter().cloned());
        VisionValidation {
            contains_product: true,
            brand_safe: true,
            quality_score: 0.85,
            confidence: 0.9,
            detected_elements,
            safety_flags: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creative_core::GenerationRequest;

    #[tokio::test]
    async fn test_simulated_render_is_deterministic() {
        let backend = SimulatedImageBackend::new();
        let a = backend.render("a product", "blurry").await.unwrap();
        let b = backend.render("a product", "blurry").await.unwrap();
        let c = backend.render("a product", "deformed").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("sim://renders/"));
        assert!(a.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_simulated_validation_payload() {
        let guidelines = GenerationRequest::sample().guidelines;
        let payload = SimulatedVisionValidator::new()
            .validate("sim://renders/abc.png", "RouteWise", &guidelines)
            .await;
        assert!(payload.contains_product);
        assert!(payload.brand_safe);
        assert!(payload.safety_flags.is_empty());
        assert_eq!(payload.detected_elements[0], "RouteWise");
        assert!((0.0..=1.0).contains(&payload.quality_score));
    }

    #[test]
    fn test_unavailable_payload_is_flagged() {
        let payload = VisionValidation::unavailable();
        assert!(!payload.brand_safe);
        assert_eq!(payload.safety_flags.len(), 1);
        assert!(payload.is_unavailable());
        assert!(!VisionValidation::default().is_unavailable());
    }
}
