// Quillforge Data Models
// Typed results for detection, document analysis, and the humanization pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============ Verdicts ============

/// Document- or unit-level authorship label, derived from ai_probability > 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "AI-generated")]
    Ai,
    #[serde(rename = "Human-written")]
    Human,
}

impl Verdict {
    /// Ties break to Human: the label is only AI when probability strictly exceeds 0.5.
    pub fn from_probability(ai_probability: f64) -> Self {
        if ai_probability > 0.5 {
            Verdict::Ai
        } else {
            Verdict::Human
        }
    }
}

// ============ Probe & Ensemble ============

/// Outcome of a single classifier probe over one text unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub probe_id: String,
    pub ai_probability: f64,
    pub human_probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn ok(probe_id: &str, ai_probability: f64, human_probability: f64) -> Self {
        Self {
            probe_id: probe_id.to_string(),
            ai_probability,
            human_probability,
            error: None,
        }
    }

    /// Maximal-uncertainty fallback recorded when a probe fails to load or infer.
    pub fn degenerate(probe_id: &str, error: String) -> Self {
        Self {
            probe_id: probe_id.to_string(),
            ai_probability: 0.5,
            human_probability: 0.5,
            error: Some(error),
        }
    }
}

/// Aggregated verdict across a probe set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsembleVerdict {
    pub ai_probability: f64,
    pub human_probability: f64,
    pub confidence: f64,
    pub label: Verdict,
    pub per_probe: BTreeMap<String, ProbeResult>,
    pub probes_used: Vec<String>,
}

impl EnsembleVerdict {
    /// Returned when the probe set is empty or every probe failed.
    pub fn degenerate(
        per_probe: BTreeMap<String, ProbeResult>,
        probes_used: Vec<String>,
    ) -> Self {
        Self {
            ai_probability: 0.5,
            human_probability: 0.5,
            confidence: 0.0,
            label: Verdict::Human,
            per_probe,
            probes_used,
        }
    }
}

// ============ Document Analysis ============

/// One scored segment of a document. `index` is the 1-based ordinal of the
/// unit in the original document (line number for line mode), so dropped
/// units leave gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisUnit {
    pub index: i32,
    pub text: String,
    pub verdict: EnsembleVerdict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub units: Vec<AnalysisUnit>,
    pub mean_ai_probability: f64,
    pub mean_confidence: f64,
    /// 1 - stddev of per-unit ai probabilities, clamped at 0.
    /// Defined as 1.0 for single-unit documents and 0.0 when no unit survived.
    pub consistency: f64,
    pub label: Verdict,
    pub total_units: i32,
    pub text_length: i32,
}

impl DocumentAnalysis {
    pub fn empty(text_length: i32) -> Self {
        Self {
            units: Vec::new(),
            mean_ai_probability: 0.5,
            mean_confidence: 0.0,
            consistency: 0.0,
            label: Verdict::Human,
            total_units: 0,
            text_length,
        }
    }
}

// ============ Pipeline ============

/// Step-level record of a full humanization run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub original_length: i32,
    pub final_length: i32,
    pub length_change: i32,
    /// One tag per stage attempted: "<stage>" on success, "<stage>_failed" on
    /// failure. The clean stage always records "text_cleaning".
    pub steps: Vec<String>,
    pub paraphrasing_used: bool,
    pub enhanced_rewriting_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============ Paraphrase Chain ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStepReport {
    pub step: i32,
    pub model: String,
    pub input_length: i32,
    pub output_length: i32,
    pub length_change: i32,
    pub duration_ms: i64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChainStats {
    pub pipeline_steps: i32,
    pub successful_steps: i32,
    pub failed_steps: i32,
    pub original_length: i32,
    pub final_length: i32,
    pub total_length_change: i32,
    pub total_duration_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainResult {
    pub final_text: String,
    pub steps: Vec<ChainStepReport>,
    pub statistics: ChainStats,
    pub models_used: Vec<String>,
    pub errors: Vec<String>,
}

// ============ Transport Requests ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizeRequest {
    pub text: String,
    #[serde(default = "default_true")]
    pub paraphrasing: bool,
    #[serde(default = "default_true")]
    pub enhanced: bool,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseRequest {
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    pub text: String,
    #[serde(default)]
    pub enhanced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymRequest {
    pub word: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadModelRequest {
    pub model_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTokenRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    pub text: String,
    #[serde(default)]
    pub probes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub segment_length: Option<usize>,
    #[serde(default)]
    pub min_line_length: Option<usize>,
    #[serde(default)]
    pub probes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRequest {
    pub text: String,
    /// Absent means "use the configured highlight threshold".
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub probes: Vec<String>,
}

// ============ Transport Responses ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizeResponse {
    pub humanized_text: String,
    pub success: bool,
    pub statistics: PipelineStats,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseResponse {
    pub paraphrased_text: String,
    pub original_text: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    pub statistics: PipelineStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResponse {
    pub rewritten_text: String,
    pub original_text: String,
    pub success: bool,
    pub statistics: PipelineStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    pub refined_text: String,
    pub original_text: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynonymResponse {
    pub synonym: String,
    pub original_word: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsResponse {
    pub available_models: Vec<String>,
    pub current_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadModelResponse {
    pub message: String,
    pub current_model: Option<String>,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainResponse {
    pub final_text: String,
    pub original_text: String,
    pub success: bool,
    pub steps: Vec<ChainStepReport>,
    pub statistics: ChainStats,
    pub models_used: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub verdict: EnsembleVerdict,
    pub text_length: i32,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis: DocumentAnalysis,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightResponse {
    pub highlighted_text: String,
    pub flagged_count: i32,
    pub threshold: f64,
    pub analysis: DocumentAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthFeatures {
    pub paraphrasing_available: bool,
    pub current_paraphrase_model: Option<String>,
    pub local_refinement: bool,
    pub synonym_support: bool,
    pub detection_probes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: f64,
    pub version: String,
    pub features: HealthFeatures,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub success: bool,
}

// ============ Default Value Functions ============

fn default_true() -> bool { true }
fn default_mode() -> String { "sentences".to_string() }
fn default_format() -> String { "markdown".to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_tie_breaks_to_human() {
        assert_eq!(Verdict::from_probability(0.5), Verdict::Human);
        assert_eq!(Verdict::from_probability(0.500001), Verdict::Ai);
        assert_eq!(Verdict::from_probability(0.2), Verdict::Human);
    }

    #[test]
    fn test_degenerate_probe_result() {
        let r = ProbeResult::degenerate("chatgpt-detector", "load failed".to_string());
        assert_eq!(r.ai_probability, 0.5);
        assert_eq!(r.human_probability, 0.5);
        assert!(r.error.is_some());
    }

    #[test]
    fn test_request_defaults() {
        let req: HumanizeRequest = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert!(req.paraphrasing);
        assert!(req.enhanced);
        assert!(req.model.is_none());

        let req: AnalyzeRequest = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(req.mode, "sentences");
        assert!(req.probes.is_empty());

        let req: HighlightRequest = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert!(req.threshold.is_none());
        assert_eq!(req.format, "markdown");
    }
}
