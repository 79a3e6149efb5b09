// Detection Probes
// Each probe wraps one hosted classifier and reduces its raw label
// distribution to an (ai, human) probability pair.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::services::providers::{get_api_token, LabelScore, ProviderError};
use crate::services::registry::ModelRegistry;

/// Probe ids scored when a request does not name its own set.
pub const DEFAULT_PROBES: &[&str] = &["chatgpt-detector", "mixed-detector"];

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("unknown probe: {0}")]
    UnknownProbe(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Normalized output of a single probe run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeScores {
    pub ai_probability: f64,
    pub human_probability: f64,
}

#[async_trait]
pub trait ModelProbe: Send + Sync {
    fn id(&self) -> &str;
    async fn classify(&self, text: &str) -> Result<ProbeScores, ProbeError>;
}

/// Reduce a raw label distribution to (ai, human).
///
/// Two-class outputs are matched by label alias; single-class outputs are
/// read as the AI probability. Anything else falls back to an even split
/// rather than failing the probe.
pub fn normalize_raw_scores(scores: &[LabelScore]) -> ProbeScores {
    if scores.len() == 1 {
        let ai = scores[0].score.clamp(0.0, 1.0);
        return ProbeScores {
            ai_probability: ai,
            human_probability: 1.0 - ai,
        };
    }

    if let Some(ai_entry) = scores.iter().find(|s| is_ai_label(&s.label)) {
        let ai = ai_entry.score.clamp(0.0, 1.0);
        return ProbeScores {
            ai_probability: ai,
            human_probability: 1.0 - ai,
        };
    }
    if let Some(human_entry) = scores.iter().find(|s| is_human_label(&s.label)) {
        let human = human_entry.score.clamp(0.0, 1.0);
        return ProbeScores {
            ai_probability: 1.0 - human,
            human_probability: human,
        };
    }

    debug!("unrecognized label shape: {:?}", scores);
    ProbeScores {
        ai_probability: 0.5,
        human_probability: 0.5,
    }
}

fn is_ai_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    matches!(
        lower.as_str(),
        "ai" | "fake" | "chatgpt" | "machine" | "generated" | "label_1"
    )
}

fn is_human_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    matches!(lower.as_str(), "human" | "real" | "label_0")
}

/// Probe backed by a hosted classifier reached through the shared
/// inference client.
pub struct HttpProbe {
    id: String,
    model_path: &'static str,
    registry: Arc<ModelRegistry>,
}

impl HttpProbe {
    pub fn new(id: &str, model_path: &'static str, registry: Arc<ModelRegistry>) -> Self {
        Self {
            id: id.to_string(),
            model_path,
            registry,
        }
    }
}

#[async_trait]
impl ModelProbe for HttpProbe {
    fn id(&self) -> &str {
        &self.id
    }

    async fn classify(&self, text: &str) -> Result<ProbeScores, ProbeError> {
        let token = get_api_token().ok_or(ProviderError::MissingApiToken)?;
        let raw = self
            .registry
            .client()
            .classify(self.model_path, &token, text)
            .await?;
        Ok(normalize_raw_scores(&raw))
    }
}

/// Placeholder for a probe id not present in the catalog. It always fails,
/// so requesting an unknown probe surfaces as a per-probe error instead of
/// rejecting the whole request.
pub struct UnknownProbe {
    id: String,
}

impl UnknownProbe {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl ModelProbe for UnknownProbe {
    fn id(&self) -> &str {
        &self.id
    }

    async fn classify(&self, _text: &str) -> Result<ProbeScores, ProbeError> {
        Err(ProbeError::UnknownProbe(self.id.clone()))
    }
}

/// Build the probe set for a request. Ids missing from the catalog become
/// [`UnknownProbe`] entries so their failure is reported per probe.
pub fn build_probe_set(
    registry: &Arc<ModelRegistry>,
    probe_ids: &[String],
) -> Vec<Box<dyn ModelProbe>> {
    probe_ids
        .iter()
        .map(|id| match registry.resolve_probe(id) {
            Some(path) => {
                Box::new(HttpProbe::new(id, path, Arc::clone(registry))) as Box<dyn ModelProbe>
            }
            None => Box::new(UnknownProbe::new(id)) as Box<dyn ModelProbe>,
        })
        .collect()
}

/// The default probe set as owned ids.
pub fn default_probe_ids() -> Vec<String> {
    DEFAULT_PROBES.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str, score: f64) -> LabelScore {
        LabelScore {
            label: name.to_string(),
            score,
        }
    }

    #[test]
    fn test_normalize_two_class_by_ai_alias() {
        let scores = normalize_raw_scores(&[label("Human", 0.2), label("ChatGPT", 0.8)]);
        assert!((scores.ai_probability - 0.8).abs() < 1e-9);
        assert!((scores.human_probability - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_label_aliases_are_case_insensitive() {
        let scores = normalize_raw_scores(&[label("LABEL_0", 0.9), label("LABEL_1", 0.1)]);
        assert!((scores.ai_probability - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_single_class_is_ai_probability() {
        let scores = normalize_raw_scores(&[label("whatever", 0.65)]);
        assert!((scores.ai_probability - 0.65).abs() < 1e-9);
        assert!((scores.human_probability - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_unexpected_shape_is_even_split() {
        let scores = normalize_raw_scores(&[label("foo", 0.7), label("bar", 0.3)]);
        assert_eq!(scores.ai_probability, 0.5);
        assert_eq!(scores.human_probability, 0.5);
    }

    #[tokio::test]
    async fn test_unknown_probe_always_fails() {
        let probe = UnknownProbe::new("bogus");
        assert!(matches!(
            probe.classify("text").await,
            Err(ProbeError::UnknownProbe(_))
        ));
    }
}
