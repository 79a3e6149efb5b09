// Ensemble Scoring
// Runs every probe over the same text and folds the successes into a
// single verdict. Probe failures are recorded per probe, never raised.

use std::collections::BTreeMap;
use tracing::warn;

use crate::models::{EnsembleVerdict, ProbeResult, Verdict};

use super::probe::ModelProbe;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Score `text` against the full probe set.
///
/// The verdict mean covers successful probes only; a failed probe is kept
/// in `per_probe` with its error and an even split, but does not drag the
/// mean toward 0.5. Confidence is `1 - stddev` of the successful AI
/// probabilities, clamped at 0. When nothing succeeds the verdict is the
/// degenerate even split with zero confidence.
pub async fn score_ensemble(probes: &[Box<dyn ModelProbe>], text: &str) -> EnsembleVerdict {
    let mut per_probe: BTreeMap<String, ProbeResult> = BTreeMap::new();
    let mut probes_used: Vec<String> = Vec::new();
    let mut ai_probs: Vec<f64> = Vec::new();

    for probe in probes {
        let id = probe.id().to_string();
        probes_used.push(id.clone());
        match probe.classify(text).await {
            Ok(scores) => {
                ai_probs.push(scores.ai_probability);
                per_probe.insert(
                    id.clone(),
                    ProbeResult::ok(&id, scores.ai_probability, scores.human_probability),
                );
            }
            Err(e) => {
                warn!("Probe {} failed: {}", id, e);
                per_probe.insert(id.clone(), ProbeResult::degenerate(&id, e.to_string()));
            }
        }
    }

    if ai_probs.is_empty() {
        return EnsembleVerdict::degenerate(per_probe, probes_used);
    }

    let ai = mean(&ai_probs);
    let confidence = (1.0 - std_dev(&ai_probs)).max(0.0);

    EnsembleVerdict {
        ai_probability: ai,
        human_probability: 1.0 - ai,
        confidence,
        label: Verdict::from_probability(ai),
        per_probe,
        probes_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::detection::probe::{ModelProbe, ProbeError, ProbeScores};
    use async_trait::async_trait;

    struct FixedProbe {
        id: &'static str,
        ai: f64,
    }

    #[async_trait]
    impl ModelProbe for FixedProbe {
        fn id(&self) -> &str {
            self.id
        }
        async fn classify(&self, _text: &str) -> Result<ProbeScores, ProbeError> {
            Ok(ProbeScores {
                ai_probability: self.ai,
                human_probability: 1.0 - self.ai,
            })
        }
    }

    struct FailingProbe;

    #[async_trait]
    impl ModelProbe for FailingProbe {
        fn id(&self) -> &str {
            "broken"
        }
        async fn classify(&self, _text: &str) -> Result<ProbeScores, ProbeError> {
            Err(ProbeError::UnknownProbe("broken".to_string()))
        }
    }

    fn boxed(probe: impl ModelProbe + 'static) -> Box<dyn ModelProbe> {
        Box::new(probe)
    }

    #[tokio::test]
    async fn test_two_probe_mean_and_confidence() {
        let probes = vec![
            boxed(FixedProbe { id: "a", ai: 0.8 }),
            boxed(FixedProbe { id: "b", ai: 0.6 }),
        ];
        let verdict = score_ensemble(&probes, "sample").await;
        assert!((verdict.ai_probability - 0.7).abs() < 1e-9);
        assert!((verdict.confidence - 0.9).abs() < 1e-9);
        assert_eq!(verdict.label, Verdict::Ai);
    }

    #[tokio::test]
    async fn test_failed_probe_excluded_from_mean() {
        let probes = vec![
            boxed(FixedProbe { id: "a", ai: 0.9 }),
            boxed(FailingProbe),
        ];
        let verdict = score_ensemble(&probes, "sample").await;
        assert!((verdict.ai_probability - 0.9).abs() < 1e-9);
        assert_eq!(verdict.per_probe.len(), 2);
        assert!(verdict.per_probe["broken"].error.is_some());
        assert_eq!(verdict.per_probe["broken"].ai_probability, 0.5);
    }

    #[tokio::test]
    async fn test_all_failed_gives_degenerate_verdict() {
        let probes = vec![boxed(FailingProbe)];
        let verdict = score_ensemble(&probes, "sample").await;
        assert_eq!(verdict.ai_probability, 0.5);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.label, Verdict::Human);
    }

    #[tokio::test]
    async fn test_empty_probe_set_is_degenerate() {
        let verdict = score_ensemble(&[], "sample").await;
        assert_eq!(verdict.ai_probability, 0.5);
        assert!(verdict.probes_used.is_empty());
    }

    #[tokio::test]
    async fn test_single_probe_full_confidence() {
        let probes = vec![boxed(FixedProbe { id: "a", ai: 0.4 })];
        let verdict = score_ensemble(&probes, "sample").await;
        assert!((verdict.confidence - 1.0).abs() < 1e-9);
        assert_eq!(verdict.label, Verdict::Human);
    }

    #[test]
    fn test_std_dev_population() {
        let sd = std_dev(&[0.8, 0.6]);
        assert!((sd - 0.1).abs() < 1e-9);
    }
}
