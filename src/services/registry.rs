// Model Registry
// Process-wide catalog of detection probes and paraphrase generators.
// Constructed once at startup and shared by reference; the generator-model
// selection is the only shared mutable state and sits behind an RwLock.

use std::sync::RwLock;
use tracing::{info, warn};

use super::providers::{get_api_token, GenerationOptions, InferenceClient};

/// Per-model generation settings for the paraphrase catalog.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model_id: &'static str,
    pub prefix: &'static str,
    pub max_length: usize,
    pub num_beams: u32,
    pub temperature: f64,
    pub top_k: u32,
}

/// Paraphrase generator catalog. Order matters: the first entry is the
/// default selection, and the chain endpoints walk this order.
const GENERATOR_CATALOG: &[GeneratorConfig] = &[
    GeneratorConfig {
        model_id: "humarin/chatgpt_paraphraser_on_T5_base",
        prefix: "paraphrase: ",
        max_length: 512,
        num_beams: 4,
        temperature: 0.7,
        top_k: 50,
    },
    GeneratorConfig {
        model_id: "Vamsi/T5_Paraphrase_Paws",
        prefix: "paraphrase: ",
        max_length: 512,
        num_beams: 4,
        temperature: 0.7,
        top_k: 50,
    },
    GeneratorConfig {
        model_id: "t5-small",
        prefix: "paraphrase: ",
        max_length: 512,
        num_beams: 4,
        temperature: 0.7,
        top_k: 50,
    },
    GeneratorConfig {
        model_id: "t5-base",
        prefix: "paraphrase: ",
        max_length: 512,
        num_beams: 4,
        temperature: 0.7,
        top_k: 50,
    },
    GeneratorConfig {
        model_id: "facebook/bart-base",
        prefix: "",
        max_length: 512,
        num_beams: 4,
        temperature: 0.7,
        top_k: 50,
    },
    GeneratorConfig {
        model_id: "facebook/bart-large",
        prefix: "",
        max_length: 512,
        num_beams: 4,
        temperature: 0.7,
        top_k: 50,
    },
    GeneratorConfig {
        model_id: "tuner007/pegasus_paraphrase",
        prefix: "",
        max_length: 256,
        num_beams: 10,
        temperature: 0.8,
        top_k: 40,
    },
];

/// Detection probe catalog: short probe id -> hosted classifier model path.
const PROBE_CATALOG: &[(&str, &str)] = &[
    ("chatgpt-detector", "hello-simpleai/chatgpt-detector-roberta"),
    ("mixed-detector", "andreas122001/roberta-mixed-detector"),
    ("openai-base", "roberta-base-openai-detector"),
    ("openai-large", "roberta-large-openai-detector"),
];

/// The two strongest paraphrasers, used by the short chain endpoint.
pub const BEST_CHAIN_MODELS: &[&str] = &[
    "humarin/chatgpt_paraphraser_on_T5_base",
    "Vamsi/T5_Paraphrase_Paws",
];

pub struct ModelRegistry {
    client: InferenceClient,
    current_model: RwLock<Option<String>>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            client: InferenceClient::new(),
            current_model: RwLock::new(None),
        }
    }

    pub fn with_client(client: InferenceClient) -> Self {
        Self {
            client,
            current_model: RwLock::new(None),
        }
    }

    pub fn client(&self) -> &InferenceClient {
        &self.client
    }

    // ---- Generator catalog ----

    pub fn available_models(&self) -> Vec<String> {
        GENERATOR_CATALOG.iter().map(|c| c.model_id.to_string()).collect()
    }

    pub fn generator_config(&self, model_id: &str) -> Option<&'static GeneratorConfig> {
        GENERATOR_CATALOG.iter().find(|c| c.model_id == model_id)
    }

    pub fn current_model(&self) -> Option<String> {
        self.current_model
            .read()
            .ok()
            .and_then(|guard| guard.clone())
    }

    /// Select a generator model. Unknown names are rejected before any state
    /// changes; re-selecting the already-current model is a no-op.
    pub fn select_model(&self, model_id: &str) -> Result<(), String> {
        if self.generator_config(model_id).is_none() {
            return Err(format!("Model {} not supported", model_id));
        }

        let mut guard = self
            .current_model
            .write()
            .map_err(|_| "model registry lock poisoned".to_string())?;
        if guard.as_deref() != Some(model_id) {
            info!("Selected paraphrase model: {}", model_id);
            *guard = Some(model_id.to_string());
        }
        Ok(())
    }

    /// Resolve the model to use for a paraphrase request: the explicit
    /// request override, else the current selection, else the catalog
    /// default (which then becomes the current selection).
    fn resolve_generator(&self, requested: Option<&str>) -> Result<String, String> {
        if let Some(name) = requested {
            self.select_model(name)?;
            return Ok(name.to_string());
        }

        if let Some(current) = self.current_model() {
            return Ok(current);
        }

        // Idempotent default init: first paraphrase without a selection
        // pins the catalog head.
        let default = GENERATOR_CATALOG[0].model_id.to_string();
        self.select_model(&default)?;
        Ok(default)
    }

    // ---- Paraphrase generation (Generator contract) ----

    /// Paraphrase `text`, returning either usable text or a non-empty error,
    /// never both. Empty generated output is reported as an error.
    pub async fn paraphrase(&self, text: &str, model: Option<&str>) -> (String, Option<String>) {
        let model_id = match self.resolve_generator(model) {
            Ok(m) => m,
            Err(e) => return (String::new(), Some(e)),
        };

        let api_token = match get_api_token() {
            Some(t) => t,
            None => {
                return (
                    String::new(),
                    Some("Inference API token not configured".to_string()),
                )
            }
        };

        // resolve_generator validated the id against the catalog.
        let config = match self.generator_config(&model_id) {
            Some(c) => c,
            None => return (String::new(), Some(format!("Model {} not supported", model_id))),
        };

        let input = if config.prefix.is_empty() {
            text.to_string()
        } else {
            format!("{}{}", config.prefix, text)
        };

        let word_count = text.split_whitespace().count();
        let options = GenerationOptions {
            max_length: (word_count * 2 + 50).min(config.max_length),
            num_beams: config.num_beams,
            temperature: config.temperature,
            top_k: config.top_k,
        };

        match self.client.generate(&model_id, &api_token, &input, &options).await {
            Ok(result) => {
                let mut generated = result.text.trim().to_string();
                // Some models echo the task prefix back.
                if !config.prefix.is_empty() {
                    if let Some(stripped) = generated.strip_prefix(config.prefix) {
                        generated = stripped.trim().to_string();
                    }
                }
                if generated.is_empty() {
                    return (String::new(), Some("No paraphrase generated".to_string()));
                }
                info!(
                    "Paraphrase ok model={} latency_ms={} in_len={} out_len={}",
                    model_id,
                    result.latency_ms,
                    text.len(),
                    generated.len()
                );
                (generated, None)
            }
            Err(e) => {
                warn!("Paraphrase failed model={}: {}", model_id, e);
                (String::new(), Some(format!("Error in paraphrasing: {}", e)))
            }
        }
    }

    // ---- Probe catalog ----

    pub fn available_probes(&self) -> Vec<String> {
        PROBE_CATALOG.iter().map(|(id, _)| id.to_string()).collect()
    }

    /// Map a probe id to its hosted classifier model path.
    pub fn resolve_probe(&self, probe_id: &str) -> Option<&'static str> {
        PROBE_CATALOG
            .iter()
            .find(|(id, _)| *id == probe_id)
            .map(|(_, path)| *path)
    }
}
