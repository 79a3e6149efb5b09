// Fixed word tables for the rewriting engine.
// The common-word exclusion list is shared by synonym substitution and
// keyword extraction; both must honor it identically.

/// Function words plus academic/technology terms that are never substituted
/// and never picked as filler keywords.
pub const COMMON_WORDS: &[&str] = &[
    "the", "and", "that", "this", "with", "have", "will", "been",
    "from", "they", "know", "want", "good", "much", "some",
    "time", "very", "when", "come", "here", "just", "like", "long",
    "make", "many", "over", "such", "take", "than", "them", "well",
    "were", "work", "about", "could", "would", "there", "their",
    "which", "should", "think", "where", "through", "because",
    "between", "important", "different", "following", "around",
    "though", "without", "another", "example", "however", "therefore",
    // Academic terms to preserve
    "research", "study", "analysis", "data", "method", "result",
    "conclusion", "evidence", "theory", "hypothesis", "findings",
    "literature", "methodology", "framework", "approach", "concept",
    "significant", "substantial", "considerable", "demonstrate",
    "indicate", "suggest", "reveal", "establish", "examine",
    // Technology terms to preserve
    "ai", "iot", "ml", "nlp", "blockchain", "cybersecurity",
    "automation", "sustainability", "innovation", "disruption", "technology",
];

pub fn is_common_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    COMMON_WORDS.contains(&lower.as_str())
}

/// Academic transition openers for sentence-structure variation.
pub const TRANSITIONS: &[&str] = &[
    "Furthermore, ", "Additionally, ", "Moreover, ", "Notably, ",
    "Significantly, ", "Importantly, ", "Specifically, ", "Indeed, ",
    "Particularly, ", "Evidently, ", "Consequently, ", "Subsequently, ",
    "Interestingly, ", "Remarkably, ", "Essentially, ", "Ultimately, ",
    "Clearly, ", "Obviously, ", "Undoubtedly, ", "Certainly, ",
];

/// Sentence-opener upgrades used by the refiner (original opener -> choices).
pub const TRANSITION_UPGRADES: &[(&str, &[&str])] = &[
    ("Also", &["Furthermore", "Additionally", "Moreover", "In addition"]),
    ("But", &["However", "Nevertheless", "Nonetheless", "Conversely"]),
    ("So", &["Therefore", "Consequently", "Thus", "Hence"]),
    ("And", &["Furthermore", "Additionally", "Moreover"]),
    ("First", &["Initially", "Primarily", "To begin with"]),
    ("Finally", &["In conclusion", "Ultimately", "Lastly"]),
];

/// Contractions expanded for academic formality.
pub const CONTRACTIONS: &[(&str, &str)] = &[
    ("don't", "do not"),
    ("won't", "will not"),
    ("can't", "cannot"),
    ("isn't", "is not"),
    ("aren't", "are not"),
    ("wasn't", "was not"),
    ("weren't", "were not"),
    ("hasn't", "has not"),
    ("haven't", "have not"),
    ("wouldn't", "would not"),
    ("couldn't", "could not"),
    ("shouldn't", "should not"),
    ("it's", "it is"),
    ("that's", "that is"),
    ("there's", "there is"),
    ("what's", "what is"),
    ("you're", "you are"),
    ("we're", "we are"),
    ("they're", "they are"),
];

/// Connector/verb/adjective phrases with higher-register alternatives.
/// Keys keep their surrounding spaces so only whole words match.
pub const NOISE_REPLACEMENTS: &[(&str, &[&str])] = &[
    (" and ", &[" as well as ", " along with ", " in addition to ", " together with "]),
    (" but ", &[" however, ", " nevertheless, ", " nonetheless, ", " conversely, "]),
    (" because ", &[" due to the fact that ", " given that ", " since ", " as "]),
    (" so ", &[" therefore, ", " consequently, ", " thus, ", " hence, "]),
    (" also ", &[" furthermore, ", " additionally, ", " moreover, ", " likewise, "]),
    (" use ", &[" utilize ", " employ ", " implement ", " apply "]),
    (" show ", &[" demonstrate ", " illustrate ", " reveal ", " display "]),
    (" help ", &[" facilitate ", " assist ", " aid ", " support "]),
    (" get ", &[" obtain ", " acquire ", " achieve ", " secure "]),
    (" make ", &[" create ", " establish ", " generate ", " produce "]),
    (" find ", &[" discover ", " identify ", " determine ", " locate "]),
    (" think ", &[" consider ", " believe ", " suggest ", " propose "]),
    (" very ", &[" significantly ", " considerably ", " substantially ", " remarkably "]),
    (" big ", &[" substantial ", " significant ", " considerable ", " extensive "]),
    (" small ", &[" minimal ", " limited ", " modest ", " slight "]),
    (" good ", &[" excellent ", " effective ", " beneficial ", " advantageous "]),
    (" bad ", &[" detrimental ", " problematic ", " unfavorable ", " adverse "]),
    (" new ", &[" novel ", " innovative ", " contemporary ", " recent "]),
    (" old ", &[" traditional ", " established ", " conventional ", " previous "]),
    (" many ", &[" numerous ", " multiple ", " various ", " several "]),
    (" few ", &[" limited ", " minimal ", " sparse ", " scarce "]),
];

/// Templates for the contextual filler sentence; `{keyword}` is substituted.
pub const FILLER_TEMPLATES: &[&str] = &[
    "This analysis underscores the significance of {keyword}.",
    "The examination of {keyword} reveals important insights.",
    "Such findings regarding {keyword} warrant further consideration.",
    "The implications of {keyword} are particularly noteworthy.",
    "This investigation into {keyword} provides valuable understanding.",
    "The study of {keyword} demonstrates considerable importance.",
    "These observations concerning {keyword} merit attention.",
];

/// Generic fillers used when no keyword can be extracted.
pub const FILLER_SENTENCES: &[&str] = &[
    "This analysis provides valuable insights into the subject matter.",
    "Such examination proves particularly enlightening for understanding the topic.",
    "These considerations merit further scholarly attention.",
    "The implications of this research become increasingly evident.",
    "This methodological approach yields meaningful academic results.",
    "The findings contribute significantly to the existing body of knowledge.",
    "This investigation enhances our understanding of the phenomenon.",
    "The research demonstrates the complexity of the underlying issues.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_word_is_case_insensitive() {
        assert!(is_common_word("The"));
        assert!(is_common_word("RESEARCH"));
        assert!(!is_common_word("quantum"));
    }

    #[test]
    fn test_noise_keys_are_space_delimited() {
        for (key, alternatives) in NOISE_REPLACEMENTS {
            assert!(key.starts_with(' ') && key.ends_with(' '), "bad key: {:?}", key);
            assert!(!alternatives.is_empty());
        }
    }

    #[test]
    fn test_filler_templates_have_keyword_slot() {
        for template in FILLER_TEMPLATES {
            assert!(template.contains("{keyword}"));
        }
    }
}
