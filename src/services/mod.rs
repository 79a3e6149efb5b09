pub mod config_store;
pub mod detection;
pub mod pipeline;
pub mod providers;
pub mod registry;
pub mod rewrite;

pub use config_store::{AppConfig, ConfigStore, DetectionConfig};
pub use pipeline::{clean_text, PipelineOptions, StageRunner};
pub use providers::InferenceClient;
pub use registry::{ModelRegistry, BEST_CHAIN_MODELS};
