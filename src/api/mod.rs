// HTTP API
// Thin transport over the service layer: handlers validate input, call one
// service, and shape the JSON response. No pipeline logic lives here.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::models::*;
use crate::services::detection::{
    analyze_document, analyze_document_full, build_probe_set, highlight, score_ensemble,
    FlaggedUnit, HighlightFormat, SegmentMode,
};
use crate::services::rewrite::{Lexicon, SynonymError, SynonymSource};
use crate::services::{
    ConfigStore, DetectionConfig, ModelRegistry, PipelineOptions, StageRunner, BEST_CHAIN_MODELS,
};

const MIN_TEXT_LENGTH: usize = 10;
const MAX_TEXT_LENGTH: usize = 5000;

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<StageRunner>,
    pub detection: DetectionConfig,
}

impl AppState {
    pub fn new(runner: Arc<StageRunner>, detection: DetectionConfig) -> Self {
        Self { runner, detection }
    }

    fn registry(&self) -> &Arc<ModelRegistry> {
        self.runner.registry()
    }
}

/// Error responses carry a JSON body shaped like every other response.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
            success: false,
        });
        (self.status, body).into_response()
    }
}

fn validate_text(text: &str) -> Result<(), ApiError> {
    let len = text.trim().chars().count();
    if len == 0 {
        return Err(ApiError::bad_request("No text provided"));
    }
    if len < MIN_TEXT_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Text too short (minimum {} characters)",
            MIN_TEXT_LENGTH
        )));
    }
    if len > MAX_TEXT_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Text too long (maximum {} characters)",
            MAX_TEXT_LENGTH
        )));
    }
    Ok(())
}

fn require_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::bad_request("No text provided"));
    }
    Ok(())
}

fn resolve_probes(detection: &DetectionConfig, requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        detection.default_probes.clone()
    } else {
        requested.to_vec()
    }
}

/// Units scoring strictly above the threshold get flagged; a unit sitting
/// exactly at the threshold does not.
fn flag_units(scored: Vec<(String, f64)>, threshold: f64) -> Vec<FlaggedUnit> {
    scored
        .into_iter()
        .filter(|(_, p)| *p > threshold)
        .map(|(text, ai_probability)| FlaggedUnit {
            text,
            ai_probability,
        })
        .collect()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/models", get(models))
        .route("/load_model", post(load_model))
        .route("/humanize", post(humanize))
        .route("/paraphrase", post(paraphrase_only))
        .route("/paraphrase_only", post(paraphrase_only))
        .route("/rewrite_only", post(rewrite_only))
        .route("/refine", post(refine))
        .route("/synonym", post(synonym))
        .route("/paraphrase_multi", post(paraphrase_multi))
        .route("/paraphrase_all", post(paraphrase_all))
        .route("/detect", post(detect))
        .route("/analyze", post(analyze))
        .route("/highlight", post(highlight_text))
        .route("/config", get(config))
        .route("/config/token", post(store_api_token))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = state.registry();
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
        version: env!("CARGO_PKG_VERSION").to_string(),
        features: HealthFeatures {
            paraphrasing_available: crate::services::providers::get_api_token().is_some(),
            current_paraphrase_model: registry.current_model(),
            local_refinement: true,
            synonym_support: true,
            detection_probes: registry.available_probes(),
        },
    })
}

async fn models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let registry = state.registry();
    Json(ModelsResponse {
        available_models: registry.available_models(),
        current_model: registry.current_model(),
    })
}

async fn load_model(
    State(state): State<AppState>,
    Json(request): Json<LoadModelRequest>,
) -> Result<Json<LoadModelResponse>, ApiError> {
    let registry = state.registry();
    registry
        .select_model(&request.model_name)
        .map_err(ApiError::bad_request)?;
    Ok(Json(LoadModelResponse {
        message: format!("Model {} selected", request.model_name),
        current_model: registry.current_model(),
        success: true,
    }))
}

async fn humanize(
    State(state): State<AppState>,
    Json(request): Json<HumanizeRequest>,
) -> Result<Json<HumanizeResponse>, ApiError> {
    validate_text(&request.text)?;
    let request_id = Uuid::new_v4().to_string();
    info!(
        "Humanize request {}: len={} paraphrasing={} enhanced={}",
        request_id,
        request.text.len(),
        request.paraphrasing,
        request.enhanced
    );

    let options = PipelineOptions {
        use_paraphrasing: request.paraphrasing,
        enhanced: request.enhanced,
        model: request.model.clone(),
    };
    let (humanized_text, statistics) = state.runner.humanize(&request.text, &options).await;

    Ok(Json(HumanizeResponse {
        humanized_text,
        success: true,
        statistics,
        request_id,
    }))
}

async fn paraphrase_only(
    State(state): State<AppState>,
    Json(request): Json<ParaphraseRequest>,
) -> Result<Json<ParaphraseResponse>, ApiError> {
    validate_text(&request.text)?;
    let registry = state.registry();
    let (paraphrased, error) = registry
        .paraphrase(&request.text, request.model.as_deref())
        .await;

    let success = error.is_none();
    let final_text = if success {
        paraphrased
    } else {
        request.text.clone()
    };
    let statistics = PipelineStats {
        original_length: request.text.chars().count() as i32,
        final_length: final_text.chars().count() as i32,
        length_change: final_text.chars().count() as i32 - request.text.chars().count() as i32,
        steps: vec![if success {
            "paraphrasing".to_string()
        } else {
            "paraphrasing_failed".to_string()
        }],
        paraphrasing_used: success,
        enhanced_rewriting_used: false,
        model_used: registry.current_model(),
        error,
    };

    Ok(Json(ParaphraseResponse {
        paraphrased_text: final_text,
        original_text: request.text,
        success,
        model_used: registry.current_model(),
        statistics,
    }))
}

async fn rewrite_only(
    State(state): State<AppState>,
    Json(request): Json<RewriteRequest>,
) -> Result<Json<RewriteResponse>, ApiError> {
    validate_text(&request.text)?;
    let options = PipelineOptions {
        use_paraphrasing: false,
        enhanced: request.enhanced,
        model: None,
    };
    let (rewritten_text, statistics) = state.runner.humanize(&request.text, &options).await;

    Ok(Json(RewriteResponse {
        rewritten_text,
        original_text: request.text,
        success: true,
        statistics,
    }))
}

async fn refine(
    State(state): State<AppState>,
    Json(request): Json<RefineRequest>,
) -> Result<Json<RefineResponse>, ApiError> {
    require_text(&request.text)?;
    let refined_text = state.runner.refine(&request.text);
    Ok(Json(RefineResponse {
        refined_text,
        original_text: request.text,
        success: true,
    }))
}

async fn synonym(
    Json(request): Json<SynonymRequest>,
) -> Result<Json<SynonymResponse>, ApiError> {
    if request.word.trim().is_empty() {
        return Err(ApiError::bad_request("No word provided"));
    }
    let mut rng = rand::thread_rng();
    match Lexicon::new().lookup(&request.word, &mut rng) {
        Ok(synonym) => Ok(Json(SynonymResponse {
            synonym,
            original_word: request.word,
            success: true,
        })),
        Err(SynonymError::TooShort) => {
            Err(ApiError::bad_request("Word must be at least 3 characters"))
        }
        Err(SynonymError::NotFound(word)) => {
            Err(ApiError::not_found(format!("No synonym found for '{}'", word)))
        }
    }
}

async fn paraphrase_multi(
    State(state): State<AppState>,
    Json(request): Json<ChainRequest>,
) -> Result<Json<ChainResponse>, ApiError> {
    validate_text(&request.text)?;
    let models: Vec<String> = BEST_CHAIN_MODELS.iter().map(|m| m.to_string()).collect();
    run_chain_response(&state, request.text, models).await
}

async fn paraphrase_all(
    State(state): State<AppState>,
    Json(request): Json<ChainRequest>,
) -> Result<Json<ChainResponse>, ApiError> {
    validate_text(&request.text)?;
    let models = state.registry().available_models();
    run_chain_response(&state, request.text, models).await
}

async fn run_chain_response(
    state: &AppState,
    text: String,
    models: Vec<String>,
) -> Result<Json<ChainResponse>, ApiError> {
    let result = state.runner.run_chain(&text, &models).await;
    let success = result.statistics.successful_steps > 0;
    Ok(Json(ChainResponse {
        final_text: result.final_text,
        original_text: text,
        success,
        steps: result.steps,
        statistics: result.statistics,
        models_used: result.models_used,
        errors: result.errors,
    }))
}

fn config_store() -> Result<ConfigStore, ApiError> {
    ConfigStore::default_config_dir()
        .map(ConfigStore::new)
        .ok_or_else(|| ApiError::bad_request("No config directory available"))
}

/// Returns the stored configuration with the API token redacted.
async fn config() -> Result<Json<serde_json::Value>, ApiError> {
    let store = config_store()?;
    let mut cfg = store.load().map_err(ApiError::bad_request)?;
    cfg.api_token = cfg.api_token.map(|_| "***".to_string());
    let value = serde_json::to_value(&cfg)
        .map_err(|e| ApiError::bad_request(format!("Failed to serialize config: {}", e)))?;
    Ok(Json(value))
}

async fn store_api_token(
    Json(request): Json<ApiTokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = request.token.trim();
    if token.is_empty() {
        return Err(ApiError::bad_request("No token provided"));
    }
    let store = config_store()?;
    store.set_api_token(token).map_err(ApiError::bad_request)?;
    info!("Inference API token stored");
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn detect(
    State(state): State<AppState>,
    Json(request): Json<DetectRequest>,
) -> Result<Json<DetectResponse>, ApiError> {
    require_text(&request.text)?;
    let request_id = Uuid::new_v4().to_string();
    let probe_ids = resolve_probes(&state.detection, &request.probes);
    let probes = build_probe_set(state.registry(), &probe_ids);
    let verdict = score_ensemble(&probes, &request.text).await;

    Ok(Json(DetectResponse {
        verdict,
        text_length: request.text.chars().count() as i32,
        request_id,
    }))
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    require_text(&request.text)?;
    let segment_length = request.segment_length.or(Some(state.detection.segment_length));
    let min_line_length = request.min_line_length.or(Some(state.detection.min_line_length));
    let mode = SegmentMode::parse(&request.mode, segment_length, min_line_length)
        .ok_or_else(|| {
            ApiError::bad_request(format!(
                "Unknown mode '{}' (expected chunks, lines, or sentences)",
                request.mode
            ))
        })?;

    let probe_ids = resolve_probes(&state.detection, &request.probes);
    let probes = build_probe_set(state.registry(), &probe_ids);
    let analysis = analyze_document(&probes, &request.text, &mode).await;

    Ok(Json(AnalyzeResponse {
        analysis,
        request_id: Uuid::new_v4().to_string(),
    }))
}

async fn highlight_text(
    State(state): State<AppState>,
    Json(request): Json<HighlightRequest>,
) -> Result<Json<HighlightResponse>, ApiError> {
    require_text(&request.text)?;
    let threshold = request
        .threshold
        .unwrap_or(state.detection.highlight_threshold);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ApiError::bad_request("Threshold must be between 0 and 1"));
    }
    let format = HighlightFormat::parse(&request.format).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Unknown format '{}' (expected markdown, html, or plain)",
            request.format
        ))
    })?;

    let probe_ids = resolve_probes(&state.detection, &request.probes);
    let probes = build_probe_set(state.registry(), &probe_ids);
    let (analysis, scored_units) =
        analyze_document_full(&probes, &request.text, &SegmentMode::Sentences).await;

    let flagged = flag_units(scored_units, threshold);
    let highlighted_text = highlight(&request.text, &flagged, format);

    Ok(Json(HighlightResponse {
        highlighted_text,
        flagged_count: flagged.len() as i32,
        threshold,
        analysis,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text_bounds() {
        assert!(validate_text("").is_err());
        assert!(validate_text("too short").is_err());
        assert!(validate_text("long enough to pass validation").is_ok());
        assert!(validate_text(&"x".repeat(5001)).is_err());
        assert!(validate_text(&"x".repeat(5000)).is_ok());
    }

    #[test]
    fn test_resolve_probes_falls_back_to_configured_defaults() {
        let detection = DetectionConfig::default();
        assert_eq!(
            resolve_probes(&detection, &[]),
            vec!["chatgpt-detector", "mixed-detector"]
        );
        let custom = vec!["openai-base".to_string()];
        assert_eq!(resolve_probes(&detection, &custom), custom);

        let tuned = DetectionConfig {
            default_probes: vec!["openai-large".to_string()],
            ..DetectionConfig::default()
        };
        assert_eq!(resolve_probes(&tuned, &[]), vec!["openai-large"]);
    }

    #[test]
    fn test_flag_units_excludes_scores_at_threshold() {
        let scored = vec![
            ("at threshold".to_string(), 0.7),
            ("above threshold".to_string(), 0.71),
            ("below threshold".to_string(), 0.69),
        ];
        let flagged = flag_units(scored, 0.7);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].text, "above threshold");
    }
}
