pub mod matching;
pub mod normalize;
pub mod relation;
pub mod request;
pub mod sequence;
pub mod strategies;
pub mod traits;

pub use normalize::NfkdNormalizer;
pub use relation::SubstringRelationScorer;
pub use request::ScoreRequest;
pub use sequence::ScorerSequence;
pub use traits::{LiteralNormalizer, RelationScorer, StatementScorer};
