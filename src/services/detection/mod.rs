pub mod analyzer;
pub mod ensemble;
pub mod highlighter;
pub mod probe;
pub mod segmenter;

pub use analyzer::{analyze_document, analyze_document_full};
pub use ensemble::score_ensemble;
pub use highlighter::{highlight, FlaggedUnit, HighlightFormat};
pub use probe::{build_probe_set, default_probe_ids, ModelProbe, ProbeError, ProbeScores};
pub use segmenter::{segment, Segment, SegmentMode};
