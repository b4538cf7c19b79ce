pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use config::AppConfig;
pub use error::{CreativeError, CreativeResult};
pub use registry::{GenerationRequest, RuleRegistry};
