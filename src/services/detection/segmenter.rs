// Document Segmentation
// Splits a document into analyzable units while preserving each unit's
// 1-based position in the original, so skipped units leave visible gaps.

pub const DEFAULT_SEGMENT_LENGTH: usize = 200;
pub const DEFAULT_MIN_LINE_LENGTH: usize = 20;
const MIN_CHUNK_CONTENT: usize = 50;
const MIN_SENTENCE_CONTENT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentMode {
    /// Fixed-length character windows. Windows whose trimmed content is
    /// shorter than [`MIN_CHUNK_CONTENT`] are dropped.
    Chunks { segment_length: usize },
    /// Physical lines; the ordinal is the original line number.
    Lines { min_line_length: usize },
    /// Sentence fragments split on runs of `.`, `!`, `?`.
    Sentences,
}

impl SegmentMode {
    /// Parse a request-level mode name with optional parameter overrides.
    pub fn parse(
        name: &str,
        segment_length: Option<usize>,
        min_line_length: Option<usize>,
    ) -> Option<Self> {
        match name {
            "chunks" => Some(SegmentMode::Chunks {
                segment_length: segment_length.unwrap_or(DEFAULT_SEGMENT_LENGTH).max(1),
            }),
            "lines" => Some(SegmentMode::Lines {
                min_line_length: min_line_length.unwrap_or(DEFAULT_MIN_LINE_LENGTH),
            }),
            "sentences" => Some(SegmentMode::Sentences),
            _ => None,
        }
    }
}

/// One segmentation unit: the 1-based ordinal in the original document and
/// its trimmed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub ordinal: i32,
    pub text: String,
}

pub fn segment(text: &str, mode: &SegmentMode) -> Vec<Segment> {
    match mode {
        SegmentMode::Chunks { segment_length } => segment_chunks(text, *segment_length),
        SegmentMode::Lines { min_line_length } => segment_lines(text, *min_line_length),
        SegmentMode::Sentences => segment_sentences(text),
    }
}

fn segment_chunks(text: &str, segment_length: usize) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut ordinal = 0i32;

    for window in chars.chunks(segment_length) {
        ordinal += 1;
        let chunk: String = window.iter().collect();
        let trimmed = chunk.trim();
        if trimmed.chars().count() < MIN_CHUNK_CONTENT {
            continue;
        }
        segments.push(Segment {
            ordinal,
            text: trimmed.to_string(),
        });
    }
    segments
}

fn segment_lines(text: &str, min_line_length: usize) -> Vec<Segment> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let trimmed = line.trim();
            if trimmed.chars().count() < min_line_length {
                return None;
            }
            Some(Segment {
                ordinal: (i + 1) as i32,
                text: trimmed.to_string(),
            })
        })
        .collect()
}

fn segment_sentences(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut ordinal = 0i32;

    for fragment in text.split(|c| matches!(c, '.' | '!' | '?')) {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            continue;
        }
        ordinal += 1;
        if trimmed.chars().count() <= MIN_SENTENCE_CONTENT {
            continue;
        }
        segments.push(Segment {
            ordinal,
            text: trimmed.to_string(),
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentences_get_sequential_ordinals() {
        let text = "This is the first sentence. This is the second one. And here is the third.";
        let segs = segment(text, &SegmentMode::Sentences);
        assert_eq!(segs.len(), 3);
        assert_eq!(
            segs.iter().map(|s| s.ordinal).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(segs[0].text, "This is the first sentence");
    }

    #[test]
    fn test_short_sentences_leave_ordinal_gaps() {
        let text = "A very long opening sentence here. Short. Another sufficiently long sentence.";
        let segs = segment(text, &SegmentMode::Sentences);
        assert_eq!(
            segs.iter().map(|s| s.ordinal).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn test_lines_preserve_original_line_numbers() {
        let text = "this first line is long enough to keep\nshort\n\nthis fourth line is also long enough";
        let segs = segment(
            text,
            &SegmentMode::Lines {
                min_line_length: DEFAULT_MIN_LINE_LENGTH,
            },
        );
        assert_eq!(
            segs.iter().map(|s| s.ordinal).collect::<Vec<_>>(),
            vec![1, 4]
        );
    }

    #[test]
    fn test_chunks_drop_short_trailing_window() {
        let body = "x".repeat(200);
        let text = format!("{}tail", body);
        let segs = segment(&text, &SegmentMode::Chunks { segment_length: 200 });
        // 4-char tail window trims below the content floor.
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].ordinal, 1);
    }

    #[test]
    fn test_chunks_split_on_character_boundaries() {
        let text = "y".repeat(440);
        let segs = segment(&text, &SegmentMode::Chunks { segment_length: 200 });
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].text.len(), 200);
        assert_eq!(
            segs.iter().map(|s| s.ordinal).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(
            SegmentMode::parse("sentences", None, None),
            Some(SegmentMode::Sentences)
        );
        assert_eq!(
            SegmentMode::parse("chunks", Some(100), None),
            Some(SegmentMode::Chunks { segment_length: 100 })
        );
        assert_eq!(SegmentMode::parse("words", None, None), None);
    }

    #[test]
    fn test_empty_text_yields_no_segments() {
        assert!(segment("", &SegmentMode::Sentences).is_empty());
        assert!(segment("   \n  ", &SegmentMode::Lines { min_line_length: 1 }).is_empty());
    }
}
