use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use creative_core::config::GenerationConfig;
use creative_core::error::CreativeResult;
use creative_core::registry::{validate_guidelines, validate_persona, validate_product, RuleRegistry};
use creative_core::types::{
    AudiencePersona, BrandGuidelines, PlatformFormat, ProductMetadata, VariantStrategy,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backends::{BackendError, ImageBackend, VisionValidator};
use crate::composer::PromptComposer;
use crate::copy::CopyWriter;
use crate::safety::{ContentSafetyGate, SafetyCheckResult};
use crate::variant::{derive_variant_id, CreativeVariant};

/// Why a strategy slot is missing from the accepted slate.
///
/// A vision payload flagged as unavailable counts as `BackendUnavailable`,
/// not as a safety rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    BackendUnavailable,
    Timeout,
    SafetyRejected,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::BackendUnavailable => "backend_unavailable",
            RejectionReason::Timeout => "timeout",
            RejectionReason::SafetyRejected => "safety_rejected",
        }
    }
}

/// Audit record for a strategy that produced no variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionRecord {
    pub strategy: VariantStrategy,
    pub reason: RejectionReason,
    pub safety_score: Option<f64>,
    pub violations: Vec<String>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl RejectionRecord {
    fn backend(strategy: VariantStrategy, error: &BackendError) -> Self {
        let reason = match error {
            BackendError::Timeout { .. } => RejectionReason::Timeout,
            _ => RejectionReason::BackendUnavailable,
        };
        Self {
            strategy,
            reason,
            safety_score: None,
            violations: Vec::new(),
            warnings: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    fn safety(strategy: VariantStrategy, result: SafetyCheckResult) -> Self {
        Self {
            strategy,
            reason: RejectionReason::SafetyRejected,
            safety_score: Some(result.safety_score),
            violations: result.violations,
            warnings: result.warnings,
            error: None,
        }
    }
}

/// Outcome of one generation run: accepted variants in slate order plus a
/// rejection record for every missing slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub latency_ms: u64,
    pub variants: Vec<CreativeVariant>,
    pub rejections: Vec<RejectionRecord>,
}

impl GenerationReport {
    pub fn accepted_strategies(&self) -> Vec<VariantStrategy> {
        self.variants.iter().map(|v| v.strategy).collect()
    }

    pub fn missing_strategies(&self) -> Vec<VariantStrategy> {
        self.rejections.iter().map(|r| r.strategy).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.variants.len() == VariantStrategy::ALL.len()
    }
}

enum StrategyOutcome {
    Accepted(Box<CreativeVariant>),
    Rejected(RejectionRecord),
}

impl StrategyOutcome {
    fn strategy(&self) -> VariantStrategy {
        match self {
            StrategyOutcome::Accepted(variant) => variant.strategy,
            StrategyOutcome::Rejected(record) => record.strategy,
        }
    }
}

/// Inputs shared read-only by every strategy task of one run.
struct RunContext<'a> {
    run_id: Uuid,
    persona: &'a AudiencePersona,
    product: &'a ProductMetadata,
    platform: PlatformFormat,
    guidelines: &'a BrandGuidelines,
    gate: &'a ContentSafetyGate,
}

/// Drives the five-strategy generation loop against the external backends.
pub struct VariantOrchestrator<I, V> {
    image_backend: I,
    vision: V,
    composer: PromptComposer,
    copywriter: CopyWriter,
    config: GenerationConfig,
}

impl<I: ImageBackend, V: VisionValidator> VariantOrchestrator<I, V> {
    pub fn new(image_backend: I, vision: V, config: GenerationConfig) -> Self {
        Self {
            image_backend,
            vision,
            composer: PromptComposer::new(),
            copywriter: CopyWriter::new(),
            config,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate the slate for one request.
    ///
    /// Malformed inputs fail before any backend is called. After that the run
    /// is best-effort: each strategy either yields a fully validated variant or
    /// a rejection record, and the accepted list holds 0 to 5 variants in the
    /// fixed strategy order. Dropping the returned future cancels every
    /// in-flight backend call without emitting partial variants.
    pub async fn generate(
        &self,
        persona: &AudiencePersona,
        product: &ProductMetadata,
        platform: PlatformFormat,
        guidelines: &BrandGuidelines,
        gate: &ContentSafetyGate,
    ) -> CreativeResult<GenerationReport> {
        validate_persona(persona)?;
        validate_product(product)?;
        validate_guidelines(guidelines)?;

        let ctx = RunContext {
            run_id: Uuid::new_v4(),
            persona,
            product,
            platform,
            guidelines,
            gate,
        };
        Ok(self.run(&ctx).await)
    }

    /// Generate from an already validated registry.
    pub async fn generate_from_registry(
        &self,
        registry: &RuleRegistry,
        gate: &ContentSafetyGate,
    ) -> GenerationReport {
        let ctx = RunContext {
            run_id: Uuid::new_v4(),
            persona: registry.persona(),
            product: registry.product(),
            platform: registry.platform(),
            guidelines: registry.guidelines(),
            gate,
        };
        self.run(&ctx).await
    }

    async fn run(&self, ctx: &RunContext<'_>) -> GenerationReport {
        let started_at = Utc::now();
        let start = Instant::now();

        info!(
            run_id = %ctx.run_id,
            product = %ctx.product.name,
            platform = %ctx.platform,
            concurrent = self.config.concurrent,
            "starting variant generation"
        );

        let mut outcomes = if self.config.concurrent {
            join_all(
                VariantStrategy::ALL
                    .iter()
                    .enumerate()
                    .map(|(index, strategy)| self.run_strategy(ctx, *strategy, index)),
            )
            .await
        } else {
            let mut outcomes = Vec::with_capacity(VariantStrategy::ALL.len());
            for (index, strategy) in VariantStrategy::ALL.iter().enumerate() {
                outcomes.push(self.run_strategy(ctx, *strategy, index).await);
            }
            outcomes
        };
        outcomes.sort_by_key(|outcome| outcome.strategy().position());

        let mut variants = Vec::new();
        let mut rejections = Vec::new();
        for outcome in outcomes {
            match outcome {
                StrategyOutcome::Accepted(variant) => variants.push(*variant),
                StrategyOutcome::Rejected(record) => rejections.push(record),
            }
        }

        let latency_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %ctx.run_id,
            accepted = variants.len(),
            rejected = rejections.len(),
            latency_ms,
            "variant generation complete"
        );

        GenerationReport {
            run_id: ctx.run_id,
            started_at,
            latency_ms,
            variants,
            rejections,
        }
    }

    async fn run_strategy(
        &self,
        ctx: &RunContext<'_>,
        strategy: VariantStrategy,
        index: usize,
    ) -> StrategyOutcome {
        let prompt = self.composer.compose_enhanced(
            strategy,
            ctx.product,
            ctx.persona,
            ctx.platform,
            ctx.guidelines,
        );
        debug!(%strategy, wanted = %prompt.wanted, unwanted = %prompt.unwanted, "prompt composed");

        let timeout_ms = self.config.task_timeout_ms;
        let external = async {
            let image_url = self
                .image_backend
                .render(&prompt.wanted, &prompt.unwanted)
                .await?;
            let vision = self
                .vision
                .validate(&image_url, &ctx.product.name, ctx.guidelines)
                .await;
            Ok::<_, BackendError>((image_url, vision))
        };

        let (image_url, vision) =
            match tokio::time::timeout(Duration::from_millis(timeout_ms), external).await {
                Ok(Ok(rendered)) => rendered,
                Ok(Err(e)) => return self.backend_failure(strategy, e),
                Err(_) => return self.backend_failure(strategy, BackendError::Timeout { timeout_ms }),
            };
        if vision.is_unavailable() {
            return self.backend_failure(
                strategy,
                BackendError::Unavailable("vision validator unavailable".to_string()),
            );
        }

        let copy = self
            .copywriter
            .write(strategy, ctx.product, ctx.persona, ctx.guidelines);
        let text = copy.combined();
        let safety = ctx.gate.check(&text, Some(&vision));

        if !safety.is_acceptable() {
            info!(
                %strategy,
                score = safety.safety_score,
                violations = ?safety.violations,
                "variant rejected by safety gate"
            );
            metrics::counter!(
                "creative.variants.rejected",
                "strategy" => strategy.as_str(),
                "reason" => RejectionReason::SafetyRejected.as_str()
            )
            .increment(1);
            return StrategyOutcome::Rejected(RejectionRecord::safety(strategy, safety));
        }

        let brand_compliant = ctx.gate.check_brand_compliance(&text);
        let brand_violations = if brand_compliant {
            Vec::new()
        } else {
            vec![format!(
                "brand name '{}' missing from copy",
                ctx.gate.guidelines().brand_name
            )]
        };

        let created_at = Utc::now();
        let variant = CreativeVariant {
            variant_id: derive_variant_id(
                &ctx.product.name,
                strategy,
                created_at,
                index,
                ctx.run_id,
            ),
            strategy,
            image_url,
            headline: copy.headline,
            body: copy.body,
            cta: copy.cta,
            platform: ctx.platform,
            prompt: prompt.wanted,
            brand_compliant,
            safety_score: safety.safety_score,
            brand_violations,
            vision_validation: vision,
            persona_match: ctx.persona.persona_id.clone(),
            created_at,
        };

        info!(
            %strategy,
            variant_id = %variant.variant_id,
            score = variant.safety_score,
            brand_compliant,
            "variant accepted"
        );
        metrics::counter!("creative.variants.accepted", "strategy" => strategy.as_str())
            .increment(1);
        StrategyOutcome::Accepted(Box::new(variant))
    }

    fn backend_failure(&self, strategy: VariantStrategy, error: BackendError) -> StrategyOutcome {
        let record = RejectionRecord::backend(strategy, &error);
        warn!(%strategy, error = %error, "backend failed, dropping strategy");
        metrics::counter!("creative.backend.errors", "strategy" => strategy.as_str()).increment(1);
        metrics::counter!(
            "creative.variants.rejected",
            "strategy" => strategy.as_str(),
            "reason" => record.reason.as_str()
        )
        .increment(1);
        StrategyOutcome::Rejected(record)
    }
}
