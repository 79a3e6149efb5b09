// Highlight Rendering
// Marks up the original document around units the ensemble flagged as
// AI-written. Units are located by naive substring search: repeated unit
// text therefore marks the first remaining occurrence, a known limitation.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightFormat {
    Markdown,
    Html,
    Plain,
}

impl HighlightFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "markdown" => Some(HighlightFormat::Markdown),
            "html" => Some(HighlightFormat::Html),
            "plain" => Some(HighlightFormat::Plain),
            _ => None,
        }
    }
}

/// A unit whose AI probability exceeded the highlight threshold.
#[derive(Debug, Clone)]
pub struct FlaggedUnit {
    pub text: String,
    pub ai_probability: f64,
}

fn render(format: HighlightFormat, text: &str, ai_probability: f64) -> String {
    match format {
        HighlightFormat::Markdown => format!("**{}** [AI: {:.2}]", text, ai_probability),
        HighlightFormat::Html => format!(
            "<span class=\"ai-flagged\" title=\"AI probability {:.2}\">{}</span>",
            ai_probability, text
        ),
        HighlightFormat::Plain => {
            format!("[AI-FLAGGED {:.2}] {} [/AI-FLAGGED]", ai_probability, text)
        }
    }
}

/// Wrap every locatable flagged unit in the requested marker.
///
/// Units are ordered by descending first-occurrence offset in the original
/// text and spliced back to front, so earlier offsets stay valid while
/// later ones are rewritten. A unit whose text cannot be found (it may have
/// been trimmed differently than it appears in context) is skipped
/// silently. With no flagged units the text comes back unchanged.
pub fn highlight(text: &str, flagged: &[FlaggedUnit], format: HighlightFormat) -> String {
    let mut located: Vec<(usize, &FlaggedUnit)> = flagged
        .iter()
        .filter(|unit| !unit.text.is_empty())
        .filter_map(|unit| text.find(&unit.text).map(|offset| (offset, unit)))
        .collect();
    located.sort_by(|a, b| b.0.cmp(&a.0));

    let mut out = text.to_string();
    for (_, unit) in located {
        if let Some(pos) = out.find(&unit.text) {
            let marked = render(format, &unit.text, unit.ai_probability);
            out.replace_range(pos..pos + unit.text.len(), &marked);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagged(text: &str, p: f64) -> FlaggedUnit {
        FlaggedUnit {
            text: text.to_string(),
            ai_probability: p,
        }
    }

    #[test]
    fn test_markdown_marker_with_two_decimals() {
        let out = highlight(
            "alpha beta gamma",
            &[flagged("beta", 0.8765)],
            HighlightFormat::Markdown,
        );
        assert_eq!(out, "alpha **beta** [AI: 0.88] gamma");
    }

    #[test]
    fn test_plain_and_html_markers() {
        let out = highlight("say hi", &[flagged("hi", 0.9)], HighlightFormat::Plain);
        assert_eq!(out, "say [AI-FLAGGED 0.90] hi [/AI-FLAGGED]");

        let out = highlight("say hi", &[flagged("hi", 0.9)], HighlightFormat::Html);
        assert!(out.contains("<span class=\"ai-flagged\""));
        assert!(out.contains(">hi</span>"));
    }

    #[test]
    fn test_multiple_units_marked_back_to_front() {
        let text = "first part here. second part there.";
        let out = highlight(
            text,
            &[
                flagged("first part here", 0.8),
                flagged("second part there", 0.9),
            ],
            HighlightFormat::Markdown,
        );
        assert_eq!(
            out,
            "**first part here** [AI: 0.80]. **second part there** [AI: 0.90]."
        );
    }

    #[test]
    fn test_unlocatable_unit_is_skipped() {
        let out = highlight(
            "nothing to see",
            &[flagged("missing text", 0.99)],
            HighlightFormat::Markdown,
        );
        assert_eq!(out, "nothing to see");
    }

    #[test]
    fn test_no_flagged_units_leaves_text_unchanged() {
        let out = highlight("untouched text", &[], HighlightFormat::Markdown);
        assert_eq!(out, "untouched text");
    }

    #[test]
    fn test_duplicate_text_marks_first_occurrence() {
        let out = highlight(
            "echo. echo.",
            &[flagged("echo", 0.8)],
            HighlightFormat::Plain,
        );
        assert_eq!(out, "[AI-FLAGGED 0.80] echo [/AI-FLAGGED]. echo.");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(HighlightFormat::parse("markdown"), Some(HighlightFormat::Markdown));
        assert_eq!(HighlightFormat::parse("html"), Some(HighlightFormat::Html));
        assert_eq!(HighlightFormat::parse("latex"), None);
    }
}
