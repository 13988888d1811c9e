//! The stock statement scoring strategies.

mod bigram;
mod common_prefix;
mod exact_prefix;
mod string_length;
mod substring;

pub use bigram::BigramScorer;
pub use common_prefix::CommonPrefixScorer;
pub use exact_prefix::ExactPrefixScorer;
pub use string_length::StringLengthScorer;
pub use substring::SubstringScorer;
