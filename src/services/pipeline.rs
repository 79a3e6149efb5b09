// Humanization Pipeline
// Orchestrates the paraphrase -> rewrite -> clean stage sequence. A failed
// stage passes its input through unchanged and is tagged "<stage>_failed";
// the caller always gets non-empty text back.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::models::{ChainResult, ChainStats, ChainStepReport, PipelineStats};

use super::registry::ModelRegistry;
use super::rewrite::{Refiner, TransformationEngine};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub use_paraphrasing: bool,
    pub enhanced: bool,
    pub model: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            use_paraphrasing: true,
            enhanced: true,
            model: None,
        }
    }
}

/// Final cleanup applied after every pipeline run. Em-dashes (with their
/// surrounding spacing) become ", ", and space runs left dangling before a
/// comma or period are folded into the punctuation. Applying the cleanup
/// twice changes nothing.
pub fn clean_text(text: &str) -> String {
    let em_dash = Regex::new(r"\s*\u{2014}\s*").expect("valid regex");
    let dangling_space = Regex::new(r"\s+([,.])\s*").expect("valid regex");

    let pass = em_dash.replace_all(text, ", ");
    dangling_space.replace_all(&pass, "${1}").into_owned()
}

/// Outcome of one pipeline stage. A failed stage's output equals its
/// input, so the pipeline always has text to pass forward.
struct StageResult {
    output_text: String,
    failed: bool,
    error: Option<String>,
}

impl StageResult {
    fn ok(output_text: String) -> Self {
        Self {
            output_text,
            failed: false,
            error: None,
        }
    }

    fn failed(input: &str, error: Option<String>) -> Self {
        Self {
            output_text: input.to_string(),
            failed: true,
            error,
        }
    }
}

pub struct StageRunner {
    registry: Arc<ModelRegistry>,
    engine: TransformationEngine,
    refiner: Refiner,
}

impl StageRunner {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            engine: TransformationEngine::new(),
            refiner: Refiner::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Run the full pipeline with a fresh RNG.
    pub async fn humanize(&self, text: &str, options: &PipelineOptions) -> (String, PipelineStats) {
        let mut rng = StdRng::from_entropy();
        self.humanize_with_rng(text, options, &mut rng).await
    }

    /// Run the full pipeline with caller-controlled randomness, so a seeded
    /// RNG reproduces the local stages exactly.
    pub async fn humanize_with_rng<R: Rng>(
        &self,
        text: &str,
        options: &PipelineOptions,
        rng: &mut R,
    ) -> (String, PipelineStats) {
        let mut stats = PipelineStats {
            original_length: text.chars().count() as i32,
            enhanced_rewriting_used: options.enhanced,
            ..PipelineStats::default()
        };
        let mut current = text.to_string();

        if options.use_paraphrasing {
            let result = self
                .paraphrase_stage(&current, options.model.as_deref())
                .await;
            if result.failed {
                if let Some(e) = result.error {
                    warn!("Paraphrase stage failed: {}", e);
                    stats.error.get_or_insert(e);
                }
                stats.steps.push("paraphrasing_failed".to_string());
            } else {
                stats.paraphrasing_used = true;
                stats.model_used = self.registry.current_model();
                stats.steps.push("paraphrasing".to_string());
            }
            current = result.output_text;
        }

        let result = self.rewrite_stage(&current, options.enhanced, rng);
        if result.failed {
            if let Some(e) = result.error {
                warn!("Rewrite stage failed: {}", e);
                stats.error.get_or_insert(e);
            }
            stats.steps.push("rewriting_failed".to_string());
        } else {
            stats.steps.push("rewriting".to_string());
        }
        current = result.output_text;

        current = clean_text(&current);
        stats.steps.push("text_cleaning".to_string());

        if current.trim().is_empty() {
            current = text.to_string();
        }

        stats.final_length = current.chars().count() as i32;
        stats.length_change = stats.final_length - stats.original_length;
        info!(
            "Pipeline done: steps={:?} len {} -> {}",
            stats.steps, stats.original_length, stats.final_length
        );
        (current, stats)
    }

    async fn paraphrase_stage(&self, text: &str, model: Option<&str>) -> StageResult {
        let (output, error) = self.registry.paraphrase(text, model).await;
        match error {
            None => {
                let output = strip_task_prefix(&output);
                if output.trim().is_empty() {
                    StageResult::failed(text, Some("Empty paraphrase output".to_string()))
                } else {
                    StageResult::ok(output)
                }
            }
            Some(e) => StageResult::failed(text, Some(e)),
        }
    }

    /// The local rewrite stage. Refinement always runs first; enhanced mode
    /// layers the full transformation engine on top of the refined text.
    fn rewrite_stage<R: Rng>(&self, text: &str, enhanced: bool, rng: &mut R) -> StageResult {
        let (refined, error) = self.refiner.refine(text, rng);
        if error.is_some() || refined.trim().is_empty() {
            return StageResult::failed(text, error);
        }
        let output = if enhanced {
            self.engine.transform_document(&refined, rng)
        } else {
            refined
        };
        if output.trim().is_empty() {
            StageResult::failed(text, None)
        } else {
            StageResult::ok(output)
        }
    }

    pub fn refine(&self, text: &str) -> String {
        self.refiner.normalize(text)
    }

    /// Run text through a sequence of paraphrase models. A failed step keeps
    /// the running text and is recorded in the step report and error list.
    pub async fn run_chain(&self, text: &str, models: &[String]) -> ChainResult {
        let chain_start = Instant::now();
        let mut current = text.to_string();
        let mut steps: Vec<ChainStepReport> = Vec::with_capacity(models.len());
        let mut errors: Vec<String> = Vec::new();

        for (i, model) in models.iter().enumerate() {
            let step_start = Instant::now();
            let input_length = current.chars().count() as i32;
            let (output, error) = self.registry.paraphrase(&current, Some(model)).await;
            let duration_ms = step_start.elapsed().as_millis() as i64;

            match error {
                None if !output.trim().is_empty() => {
                    current = strip_task_prefix(&output);
                    let output_length = current.chars().count() as i32;
                    steps.push(ChainStepReport {
                        step: (i + 1) as i32,
                        model: model.clone(),
                        input_length,
                        output_length,
                        length_change: output_length - input_length,
                        duration_ms,
                        success: true,
                        error: None,
                    });
                }
                other => {
                    let message = other.unwrap_or_else(|| "Empty output".to_string());
                    warn!("Chain step {} ({}) failed: {}", i + 1, model, message);
                    errors.push(format!("Step {} ({}): {}", i + 1, model, message));
                    steps.push(ChainStepReport {
                        step: (i + 1) as i32,
                        model: model.clone(),
                        input_length,
                        output_length: input_length,
                        length_change: 0,
                        duration_ms,
                        success: false,
                        error: Some(message),
                    });
                }
            }
        }

        let successful = steps.iter().filter(|s| s.success).count() as i32;
        let statistics = ChainStats {
            pipeline_steps: models.len() as i32,
            successful_steps: successful,
            failed_steps: models.len() as i32 - successful,
            original_length: text.chars().count() as i32,
            final_length: current.chars().count() as i32,
            total_length_change: current.chars().count() as i32 - text.chars().count() as i32,
            total_duration_ms: chain_start.elapsed().as_millis() as i64,
        };

        ChainResult {
            final_text: current,
            steps,
            statistics,
            models_used: models.to_vec(),
            errors,
        }
    }
}

/// Some seq2seq models echo a leading ": " from the task prefix.
fn strip_task_prefix(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.strip_prefix(": ") {
        Some(rest) => rest.trim_start().to_string(),
        None => trimmed.to_string(),
    }
}
