use rand::seq::SliceRandom;
use rand::Rng;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::lexicon::{Lexicon, SynonymSource};
use super::wordlists::{
    is_common_word, CONTRACTIONS, FILLER_SENTENCES, FILLER_TEMPLATES, NOISE_REPLACEMENTS,
    TRANSITIONS,
};

// Per-sentence gate probabilities. Tuned so roughly half of the input
// sentences come out visibly changed.
const P_STRUCTURE: f64 = 0.8;
const P_SYNONYMS: f64 = 0.6;
const P_NOISE: f64 = 0.5;
const P_SHUFFLE: f64 = 0.4;
const P_FILLER: f64 = 0.4;
const MAX_NOISE_PER_SENTENCE: usize = 3;

/// Split text into sentences, keeping the terminating punctuation run
/// attached. Fragments that trim to nothing are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            while let Some(&next) = chars.peek() {
                if matches!(next, '.' | '!' | '?') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Probability-driven rewriting engine. All randomness flows through the
/// caller-supplied RNG so a seeded generator reproduces output exactly.
pub struct TransformationEngine<S: SynonymSource = Lexicon> {
    lexicon: S,
    contractions: Vec<(Regex, &'static str)>,
    noise: Vec<(Regex, &'static [&'static str])>,
    keyword: Regex,
}

impl TransformationEngine<Lexicon> {
    pub fn new() -> Self {
        Self::with_source(Lexicon::new())
    }
}

impl Default for TransformationEngine<Lexicon> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SynonymSource> TransformationEngine<S> {
    pub fn with_source(lexicon: S) -> Self {
        let contractions = CONTRACTIONS
            .iter()
            .map(|(short, long)| {
                let re = RegexBuilder::new(&regex::escape(short))
                    .case_insensitive(true)
                    .build()
                    .expect("valid regex");
                (re, *long)
            })
            .collect();
        let noise = NOISE_REPLACEMENTS
            .iter()
            .map(|(key, alternatives)| {
                let re = RegexBuilder::new(&regex::escape(key))
                    .case_insensitive(true)
                    .build()
                    .expect("valid regex");
                (re, *alternatives)
            })
            .collect();
        TransformationEngine {
            lexicon,
            contractions,
            noise,
            keyword: Regex::new(r"\b[a-zA-Z]{5,}\b").expect("valid regex"),
        }
    }

    /// Rewrite a whole document: per-sentence transforms, then a middle
    /// shuffle, then an optional contextual filler sentence.
    pub fn transform_document<R: Rng>(&self, text: &str, rng: &mut R) -> String {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return text.to_string();
        }

        let mut transformed: Vec<String> = sentences
            .iter()
            .map(|s| self.transform_sentence(s, rng))
            .collect();

        // First and last sentences stay anchored; only the middle moves.
        if transformed.len() > 2 && rng.gen::<f64>() < P_SHUFFLE {
            let last = transformed.len() - 1;
            transformed[1..last].shuffle(rng);
        }

        // The filler keyword must come from the transformed sentences, not
        // the input: a synonym pass may have replaced the original word.
        if transformed.len() > 1 && rng.gen::<f64>() < P_FILLER {
            let filler = self.contextual_filler(&transformed.join(" "), rng);
            let pos = rng.gen_range(1..=transformed.len());
            transformed.insert(pos, filler);
        }

        let result = transformed.join(" ");
        debug!(
            input_sentences = sentences.len(),
            output_sentences = transformed.len(),
            "document transformation complete"
        );
        result
    }

    pub fn transform_sentence<R: Rng>(&self, sentence: &str, rng: &mut R) -> String {
        let mut out = sentence.to_string();
        if rng.gen::<f64>() < P_STRUCTURE {
            out = self.vary_structure(&out, rng);
        }
        if rng.gen::<f64>() < P_SYNONYMS {
            out = self.replace_synonyms(&out, rng);
        }
        if rng.gen::<f64>() < P_NOISE {
            out = self.inject_noise(&out, rng);
        }
        out
    }

    /// Apply exactly one structural variation, chosen at random. Sentences
    /// shorter than four words pass through untouched.
    fn vary_structure<R: Rng>(&self, sentence: &str, rng: &mut R) -> String {
        if sentence.split_whitespace().count() < 4 {
            return sentence.to_string();
        }
        match rng.gen_range(0..3) {
            0 => self.add_transition(sentence, rng),
            1 => self.rearrange_clauses(sentence, rng),
            _ => self.expand_contractions(sentence, rng),
        }
    }

    fn add_transition<R: Rng>(&self, sentence: &str, rng: &mut R) -> String {
        let starts_upper = sentence
            .chars()
            .next()
            .map_or(false, |c| c.is_uppercase());
        if starts_upper && rng.gen::<f64>() < 0.5 {
            if let Some(transition) = TRANSITIONS.choose(rng) {
                return format!("{}{}", transition, sentence.to_lowercase());
            }
        }
        sentence.to_string()
    }

    fn rearrange_clauses<R: Rng>(&self, sentence: &str, rng: &mut R) -> String {
        if sentence.matches(',').count() == 1 && rng.gen::<f64>() < 0.3 {
            if let Some((first, second)) = sentence.split_once(", ") {
                if !first.trim().is_empty() && !second.trim().is_empty() {
                    return format!("{}, {}", second, first.to_lowercase());
                }
            }
        }
        sentence.to_string()
    }

    fn expand_contractions<R: Rng>(&self, sentence: &str, rng: &mut R) -> String {
        if rng.gen::<f64>() < 0.8 {
            for (re, long) in &self.contractions {
                if re.is_match(sentence) {
                    return re.replace_all(sentence, *long).into_owned();
                }
            }
        }
        sentence.to_string()
    }

    /// Replace up to ceil(word_count / 4) non-common words with synonyms,
    /// preserving each word's capitalization and surrounding punctuation.
    fn replace_synonyms<R: Rng>(&self, sentence: &str, rng: &mut R) -> String {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        if words.is_empty() {
            return sentence.to_string();
        }
        let cap = (words.len() + 3) / 4;
        let mut replaced = 0usize;

        let rewritten: Vec<String> = words
            .iter()
            .map(|word| {
                if replaced >= cap {
                    return word.to_string();
                }
                let (prefix, core, suffix) = split_word(word);
                if core.len() < 3 || is_common_word(core) {
                    return word.to_string();
                }
                if rng.gen::<f64>() >= 0.4 {
                    return word.to_string();
                }
                match self.lexicon.lookup(core, rng) {
                    Ok(synonym) => {
                        replaced += 1;
                        format!("{}{}{}", prefix, apply_case(core, &synonym), suffix)
                    }
                    Err(_) => word.to_string(),
                }
            })
            .collect();

        rewritten.join(" ")
    }

    /// Substitute at most three connector phrases per sentence with
    /// higher-register alternatives, first occurrence only.
    fn inject_noise<R: Rng>(&self, sentence: &str, rng: &mut R) -> String {
        let mut out = sentence.to_string();
        let mut made = 0usize;
        for (re, alternatives) in &self.noise {
            if made >= MAX_NOISE_PER_SENTENCE {
                break;
            }
            if re.is_match(&out) && rng.gen::<f64>() < 0.3 {
                if let Some(replacement) = alternatives.choose(rng) {
                    out = re.replace(&out, *replacement).into_owned();
                    made += 1;
                }
            }
        }
        out
    }

    /// Build a filler sentence anchored on a keyword from the source text,
    /// or a generic one when nothing usable is found.
    fn contextual_filler<R: Rng>(&self, text: &str, rng: &mut R) -> String {
        let lowered = text.to_lowercase();
        let mut keywords: Vec<&str> = Vec::new();
        for m in self.keyword.find_iter(&lowered) {
            let word = m.as_str();
            if !is_common_word(word) && !keywords.contains(&word) {
                keywords.push(word);
            }
        }

        if let Some(keyword) = keywords[..keywords.len().min(3)].choose(rng) {
            if let Some(template) = FILLER_TEMPLATES.choose(rng) {
                return template.replace("{keyword}", keyword);
            }
        }
        FILLER_SENTENCES
            .choose(rng)
            .unwrap_or(&FILLER_SENTENCES[0])
            .to_string()
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// Split a token into leading punctuation, alphanumeric core, and trailing
/// punctuation.
fn split_word(word: &str) -> (&str, &str, &str) {
    let start = word
        .char_indices()
        .find(|(_, c)| c.is_alphanumeric())
        .map(|(i, _)| i);
    let start = match start {
        Some(i) => i,
        None => return (word, "", ""),
    };
    let end = word
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphanumeric())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(word.len());
    (&word[..start], &word[start..end], &word[end..])
}

/// Carry the case pattern of the original core over to the replacement.
/// Fully-uppercase words stay fully uppercase.
fn apply_case(core: &str, replacement: &str) -> String {
    let has_upper = core.chars().any(|c| c.is_uppercase());
    let all_upper = has_upper && !core.chars().any(|c| c.is_lowercase());
    if all_upper {
        replacement.to_uppercase()
    } else if core.chars().next().map_or(false, |c| c.is_uppercase()) {
        capitalize_first(replacement)
    } else {
        replacement.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rewrite::SynonymError;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    struct FixedSynonyms;

    impl SynonymSource for FixedSynonyms {
        fn lookup(&self, _word: &str, _rng: &mut dyn RngCore) -> Result<String, SynonymError> {
            Ok("substitute".to_string())
        }
    }

    /// Recover the keyword from a template-built filler sentence, if the
    /// output contains one.
    fn filler_keyword(out: &str) -> Option<String> {
        for template in FILLER_TEMPLATES {
            let (prefix, suffix) = template.split_once("{keyword}").unwrap();
            if let Some(start) = out.find(prefix) {
                let rest = &out[start + prefix.len()..];
                if let Some(end) = rest.find(suffix) {
                    return Some(rest[..end].to_string());
                }
            }
        }
        None
    }

    #[test]
    fn test_split_sentences_keeps_terminators() {
        let parts = split_sentences("One here. Two there! Three?");
        assert_eq!(parts, vec!["One here.", "Two there!", "Three?"]);
    }

    #[test]
    fn test_split_sentences_merges_punctuation_runs() {
        let parts = split_sentences("Really?! Yes.");
        assert_eq!(parts, vec!["Really?!", "Yes."]);
    }

    #[test]
    fn test_apply_case_preserves_all_caps() {
        assert_eq!(apply_case("NASA", "agency"), "AGENCY");
    }

    #[test]
    fn test_apply_case_preserves_capitalization() {
        assert_eq!(apply_case("Improve", "enhance"), "Enhance");
        assert_eq!(apply_case("improve", "Enhance"), "enhance");
    }

    #[test]
    fn test_split_word_strips_punctuation() {
        assert_eq!(split_word("(improve),"), ("(", "improve", "),"));
        assert_eq!(split_word("..."), ("...", "", ""));
    }

    #[test]
    fn test_transform_is_deterministic_for_fixed_seed() {
        let engine = TransformationEngine::new();
        let text = "The results improve quality. Researchers explore new methods, and the process continues. The system shows promise.";
        let a = engine.transform_document(text, &mut StdRng::seed_from_u64(42));
        let b = engine.transform_document(text, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_transform_never_returns_empty_output() {
        let engine = TransformationEngine::new();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = engine.transform_document("The study shows a clear benefit.", &mut rng);
            assert!(!out.trim().is_empty(), "empty output for seed {}", seed);
        }
    }

    #[test]
    fn test_shuffle_keeps_first_and_last_anchored() {
        let engine = TransformationEngine::new();
        // Synonym-free, common-word-only sentences so the text survives
        // the word-level passes unchanged apart from ordering.
        let text = "Alpha. Beta. Gamma. Delta. Omega.";
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = engine.transform_document(text, &mut rng);
            let first_word = out.split_whitespace().next().unwrap_or("");
            assert!(
                first_word.to_lowercase().contains("alpha")
                    || first_word.chars().any(|c| c.is_alphabetic()),
                "unexpected start: {}",
                out
            );
        }
    }

    #[test]
    fn test_filler_keyword_tracks_synonym_replacements() {
        // Every synonym lookup succeeds, so "zebrafish" can vanish from the
        // body; any keyword filler must then name a word still present.
        let engine = TransformationEngine::with_source(FixedSynonyms);
        let text = "Zebrafish swim fast. Zebrafish dart off. Zebrafish rest now.";
        for seed in 0..60 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = engine.transform_document(text, &mut rng);
            if let Some(keyword) = filler_keyword(&out) {
                let occurrences = out.to_lowercase().matches(&keyword).count();
                assert!(
                    occurrences >= 2,
                    "filler keyword {:?} absent from body (seed {}): {}",
                    keyword,
                    seed,
                    out
                );
            }
        }
    }

    #[test]
    fn test_vary_structure_skips_short_sentences() {
        let engine = TransformationEngine::new();
        let sentence = "Too short here.";
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(engine.vary_structure(sentence, &mut rng), sentence);
        }
    }

    #[test]
    fn test_add_transition_lowercases_whole_sentence() {
        let engine = TransformationEngine::new();
        let sentence = "The Model Works Well.";
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = engine.add_transition(sentence, &mut rng);
            if out != sentence {
                assert!(out.ends_with("the model works well."), "got: {}", out);
                return;
            }
        }
        panic!("transition never fired");
    }

    #[test]
    fn test_rearrange_clauses_lowercases_moved_clause() {
        let engine = TransformationEngine::new();
        let sentence = "Alpha Goes First, Beta Follows After";
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = engine.rearrange_clauses(sentence, &mut rng);
            if out != sentence {
                assert_eq!(out, "Beta Follows After, alpha goes first");
                return;
            }
        }
        panic!("clause rearrangement never fired");
    }

    #[test]
    fn test_expand_contractions_is_case_insensitive() {
        let engine = TransformationEngine::new();
        // Gate is 0.8; retry a few seeds until it fires.
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = engine.expand_contractions("Don't stop now", &mut rng);
            if out != "Don't stop now" {
                assert_eq!(out, "do not stop now");
                return;
            }
        }
        panic!("contraction expansion never fired");
    }

    #[test]
    fn test_synonym_cap_limits_substitutions() {
        let engine = TransformationEngine::new();
        let mut rng = StdRng::seed_from_u64(5);
        let sentence = "improve improve improve improve improve improve improve improve";
        let out = engine.replace_synonyms(sentence, &mut rng);
        let kept = out
            .split_whitespace()
            .filter(|w| *w == "improve")
            .count();
        // 8 words -> cap of 2 substitutions.
        assert!(kept >= 6, "too many substitutions: {}", out);
    }
}
