use rand::seq::SliceRandom;
use rand::RngCore;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SynonymError {
    #[error("word must be at least 3 characters")]
    TooShort,

    #[error("no synonym found for '{0}'")]
    NotFound(String),
}

/// Single-word synonym lookup. Implementations must return a lowercase
/// alphabetic word or an error, never the input word itself.
pub trait SynonymSource: Send + Sync {
    fn lookup(&self, word: &str, rng: &mut dyn RngCore) -> Result<String, SynonymError>;
}

/// Embedded thesaurus keyed by lowercase word. Each entry carries several
/// candidates so repeated substitution does not collapse to one choice.
static THESAURUS: &[(&str, &[&str])] = &[
    ("ability", &["capacity", "capability", "skill", "aptitude"]),
    ("achieve", &["attain", "accomplish", "realize", "reach"]),
    ("advantage", &["benefit", "edge", "gain", "asset"]),
    ("allow", &["permit", "enable", "grant"]),
    ("amazing", &["astonishing", "remarkable", "extraordinary"]),
    ("answer", &["response", "reply", "solution"]),
    ("area", &["region", "zone", "field", "domain"]),
    ("argue", &["contend", "assert", "maintain", "claim"]),
    ("basic", &["fundamental", "essential", "elementary", "core"]),
    ("begin", &["start", "commence", "initiate"]),
    ("belief", &["conviction", "view", "opinion", "notion"]),
    ("benefit", &["advantage", "gain", "profit"]),
    ("build", &["construct", "assemble", "erect", "form"]),
    ("change", &["alter", "modify", "adjust", "transform"]),
    ("choose", &["select", "pick", "elect"]),
    ("clear", &["evident", "obvious", "apparent", "plain"]),
    ("common", &["frequent", "widespread", "prevalent", "usual"]),
    ("complex", &["intricate", "complicated", "elaborate"]),
    ("consider", &["examine", "weigh", "contemplate", "regard"]),
    ("create", &["produce", "generate", "form", "devise"]),
    ("crucial", &["critical", "vital", "essential", "pivotal"]),
    ("describe", &["depict", "portray", "characterize", "detail"]),
    ("develop", &["evolve", "advance", "cultivate", "expand"]),
    ("difficult", &["challenging", "demanding", "arduous", "tough"]),
    ("discover", &["uncover", "detect", "unearth", "find"]),
    ("discuss", &["examine", "debate", "address", "explore"]),
    ("effect", &["impact", "consequence", "outcome", "result"]),
    ("effective", &["efficient", "productive", "potent"]),
    ("encourage", &["promote", "foster", "stimulate", "urge"]),
    ("enhance", &["improve", "strengthen", "augment", "boost"]),
    ("ensure", &["guarantee", "secure", "confirm"]),
    ("entire", &["whole", "complete", "total", "full"]),
    ("explain", &["clarify", "elucidate", "describe", "interpret"]),
    ("explore", &["investigate", "examine", "probe", "survey"]),
    ("fast", &["rapid", "quick", "swift", "speedy"]),
    ("feature", &["attribute", "characteristic", "trait", "aspect"]),
    ("focus", &["concentrate", "center", "emphasize"]),
    ("goal", &["objective", "aim", "target", "purpose"]),
    ("grow", &["expand", "increase", "develop", "rise"]),
    ("happen", &["occur", "transpire", "arise"]),
    ("hard", &["difficult", "arduous", "tough", "demanding"]),
    ("idea", &["concept", "notion", "thought", "proposition"]),
    ("improve", &["enhance", "refine", "strengthen", "upgrade"]),
    ("increase", &["rise", "growth", "expansion", "escalation"]),
    ("issue", &["matter", "concern", "problem", "topic"]),
    ("keep", &["retain", "maintain", "preserve", "hold"]),
    ("key", &["central", "essential", "critical", "pivotal"]),
    ("large", &["substantial", "sizable", "extensive", "vast"]),
    ("learn", &["acquire", "absorb", "grasp", "master"]),
    ("main", &["primary", "principal", "chief", "central"]),
    ("measure", &["assess", "gauge", "evaluate", "quantify"]),
    ("modern", &["contemporary", "current", "recent"]),
    ("necessary", &["essential", "required", "indispensable", "vital"]),
    ("obtain", &["acquire", "secure", "procure", "gain"]),
    ("often", &["frequently", "regularly", "commonly", "repeatedly"]),
    ("part", &["portion", "segment", "component", "element"]),
    ("people", &["individuals", "persons", "citizens"]),
    ("popular", &["prevalent", "widespread", "favored"]),
    ("power", &["strength", "force", "capacity", "influence"]),
    ("problem", &["difficulty", "obstacle", "challenge", "dilemma"]),
    ("process", &["procedure", "operation", "mechanism", "course"]),
    ("provide", &["supply", "furnish", "deliver", "offer"]),
    ("purpose", &["aim", "objective", "intent", "goal"]),
    ("question", &["query", "inquiry", "issue"]),
    ("quick", &["rapid", "swift", "prompt", "speedy"]),
    ("reason", &["cause", "motive", "rationale", "grounds"]),
    ("reduce", &["decrease", "lessen", "diminish", "lower"]),
    ("require", &["demand", "necessitate", "need"]),
    ("role", &["function", "part", "position", "capacity"]),
    ("serious", &["grave", "severe", "critical", "weighty"]),
    ("simple", &["straightforward", "uncomplicated", "plain", "basic"]),
    ("solve", &["resolve", "settle", "remedy", "address"]),
    ("strong", &["robust", "powerful", "sturdy", "potent"]),
    ("support", &["backing", "assistance", "endorsement", "aid"]),
    ("system", &["framework", "structure", "mechanism", "scheme"]),
    ("topic", &["subject", "theme", "matter", "issue"]),
    ("understand", &["comprehend", "grasp", "perceive", "fathom"]),
    ("useful", &["beneficial", "valuable", "helpful", "practical"]),
    ("value", &["worth", "merit", "importance", "significance"]),
    ("weak", &["feeble", "fragile", "frail", "insubstantial"]),
    ("whole", &["entire", "complete", "total", "full"]),
    ("wide", &["broad", "extensive", "expansive", "vast"]),
    ("world", &["globe", "planet", "earth"]),
];

/// In-process synonym source backed by [`THESAURUS`]. Candidates within
/// three characters of the input length are preferred so replacements do
/// not visibly distort line lengths.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lexicon;

impl Lexicon {
    pub fn new() -> Self {
        Lexicon
    }
}

impl SynonymSource for Lexicon {
    fn lookup(&self, word: &str, rng: &mut dyn RngCore) -> Result<String, SynonymError> {
        let clean: String = word
            .trim()
            .chars()
            .filter(|c| c.is_alphabetic())
            .collect::<String>()
            .to_lowercase();
        if clean.len() < 3 {
            return Err(SynonymError::TooShort);
        }

        let candidates = THESAURUS
            .iter()
            .find(|(key, _)| *key == clean)
            .map(|(_, synonyms)| *synonyms)
            .ok_or_else(|| SynonymError::NotFound(clean.clone()))?;

        let similar_length: Vec<&&str> = candidates
            .iter()
            .filter(|s| {
                let diff = (s.len() as i64 - clean.len() as i64).abs();
                diff <= 3
            })
            .collect();

        if let Some(synonym) = similar_length.choose(rng) {
            return Ok(synonym.to_string());
        }
        candidates
            .choose(rng)
            .map(|s| s.to_string())
            .ok_or(SynonymError::NotFound(clean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_lookup_returns_known_synonym() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = Lexicon::new().lookup("improve", &mut rng).unwrap();
        assert!(["enhance", "refine", "strengthen", "upgrade"].contains(&result.as_str()));
    }

    #[test]
    fn test_lookup_rejects_short_words() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(Lexicon::new().lookup("at", &mut rng), Err(SynonymError::TooShort));
    }

    #[test]
    fn test_lookup_strips_punctuation_and_case() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = Lexicon::new().lookup("Improve,", &mut rng).unwrap();
        assert_ne!(result, "improve");
    }

    #[test]
    fn test_lookup_unknown_word_errors() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            Lexicon::new().lookup("zyzzyva", &mut rng),
            Err(SynonymError::NotFound(_))
        ));
    }
}
