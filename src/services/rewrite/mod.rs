pub mod engine;
pub mod lexicon;
pub mod refiner;
pub mod wordlists;

pub use engine::{split_sentences, TransformationEngine};
pub use lexicon::{Lexicon, SynonymError, SynonymSource};
pub use refiner::Refiner;
