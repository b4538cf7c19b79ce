//! Creative variant generation — composes image-generation prompts and ad copy
//! for five fixed creative strategies, gates each draft through a three-stage
//! content safety check, and bundles the accepted variants.

pub mod backends;
pub mod composer;
pub mod copy;
pub mod orchestrator;
pub mod safety;
pub mod variant;

pub use backends::{
    BackendError, ImageBackend, SimulatedImageBackend, SimulatedVisionValidator, VisionValidator,
};
pub use composer::{PromptComposer, PromptPair};
pub use copy::{AdCopy, CopyWriter};
pub use orchestrator::{GenerationReport, RejectionReason, RejectionRecord, VariantOrchestrator};
pub use safety::{ContentSafetyGate, SafetyCheckResult, ACCEPTANCE_THRESHOLD};
pub use variant::{CreativeVariant, DeliveryCreative, VariantBundle};
