// Document Analyzer
// Segments a document, scores every unit with the probe ensemble, and
// folds the unit verdicts into document-level statistics.

use tracing::info;

use crate::models::{AnalysisUnit, DocumentAnalysis, Verdict};

use super::ensemble::{mean, score_ensemble, std_dev};
use super::probe::ModelProbe;
use super::segmenter::{segment, SegmentMode};

const PREVIEW_LENGTH: usize = 100;

/// Truncate unit text for the report; full text stays out of responses.
fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_LENGTH).collect();
    if text.chars().count() > PREVIEW_LENGTH {
        out.push_str("...");
    }
    out
}

/// Analyze `text` unit by unit. Returns the degenerate empty analysis when
/// no unit survives segmentation.
pub async fn analyze_document(
    probes: &[Box<dyn ModelProbe>],
    text: &str,
    mode: &SegmentMode,
) -> DocumentAnalysis {
    analyze_document_full(probes, text, mode).await.0
}

/// Like [`analyze_document`] but also returns each unit's untruncated text
/// with its AI probability, for callers that mark up the original document.
pub async fn analyze_document_full(
    probes: &[Box<dyn ModelProbe>],
    text: &str,
    mode: &SegmentMode,
) -> (DocumentAnalysis, Vec<(String, f64)>) {
    let text_length = text.chars().count() as i32;
    let segments = segment(text, mode);
    if segments.is_empty() {
        return (DocumentAnalysis::empty(text_length), Vec::new());
    }

    let mut units = Vec::with_capacity(segments.len());
    let mut full_texts = Vec::with_capacity(segments.len());
    let mut ai_probs = Vec::with_capacity(segments.len());
    let mut confidences = Vec::with_capacity(segments.len());

    for seg in &segments {
        let verdict = score_ensemble(probes, &seg.text).await;
        ai_probs.push(verdict.ai_probability);
        confidences.push(verdict.confidence);
        full_texts.push((seg.text.clone(), verdict.ai_probability));
        units.push(AnalysisUnit {
            index: seg.ordinal,
            text: preview(&seg.text),
            verdict,
        });
    }

    let mean_ai = mean(&ai_probs);
    let consistency = if units.len() < 2 {
        1.0
    } else {
        (1.0 - std_dev(&ai_probs)).max(0.0)
    };

    let analysis = DocumentAnalysis {
        total_units: units.len() as i32,
        mean_ai_probability: mean_ai,
        mean_confidence: mean(&confidences),
        consistency,
        label: Verdict::from_probability(mean_ai),
        units,
        text_length,
    };
    info!(
        "Document analysis: units={} mean_ai={:.3} consistency={:.3}",
        analysis.total_units, analysis.mean_ai_probability, analysis.consistency
    );
    (analysis, full_texts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::detection::probe::{ModelProbe, ProbeError, ProbeScores};
    use async_trait::async_trait;

    /// Scores by sentence content so units get distinct probabilities.
    struct ContentProbe;

    #[async_trait]
    impl ModelProbe for ContentProbe {
        fn id(&self) -> &str {
            "content"
        }
        async fn classify(&self, text: &str) -> Result<ProbeScores, ProbeError> {
            let ai = if text.contains("generated") { 0.9 } else { 0.1 };
            Ok(ProbeScores {
                ai_probability: ai,
                human_probability: 1.0 - ai,
            })
        }
    }

    fn probes() -> Vec<Box<dyn ModelProbe>> {
        vec![Box::new(ContentProbe)]
    }

    #[tokio::test]
    async fn test_units_carry_ordinals_and_scores() {
        let text = "This text looks generated by a model. This one reads naturally enough.";
        let analysis = analyze_document(&probes(), text, &SegmentMode::Sentences).await;
        assert_eq!(analysis.total_units, 2);
        assert_eq!(analysis.units[0].index, 1);
        assert_eq!(analysis.units[1].index, 2);
        assert!((analysis.units[0].verdict.ai_probability - 0.9).abs() < 1e-9);
        assert!((analysis.mean_ai_probability - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_single_unit_has_full_consistency() {
        let text = "Just one sufficiently long sentence here.";
        let analysis = analyze_document(&probes(), text, &SegmentMode::Sentences).await;
        assert_eq!(analysis.total_units, 1);
        assert_eq!(analysis.consistency, 1.0);
    }

    #[tokio::test]
    async fn test_no_units_gives_empty_analysis() {
        let analysis = analyze_document(&probes(), "Hi. Ok.", &SegmentMode::Sentences).await;
        assert_eq!(analysis.total_units, 0);
        assert_eq!(analysis.mean_ai_probability, 0.5);
        assert_eq!(analysis.consistency, 0.0);
        assert_eq!(analysis.label, Verdict::Human);
    }

    #[tokio::test]
    async fn test_long_unit_text_is_truncated() {
        let long = format!("{} generated.", "word ".repeat(60));
        let analysis = analyze_document(&probes(), &long, &SegmentMode::Sentences).await;
        assert_eq!(analysis.total_units, 1);
        assert!(analysis.units[0].text.ends_with("..."));
        assert_eq!(analysis.units[0].text.chars().count(), 103);
    }
}
