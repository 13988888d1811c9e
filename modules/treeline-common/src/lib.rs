pub mod error;
pub mod score;
pub mod types;
pub mod vocab;

pub use error::TreelineError;
pub use score::{Score, ScoreValue};
pub use types::{
    compare_ranked, ExpectedValues, Location, RankedSubject, RelationValues, ResultSnapshot,
};
