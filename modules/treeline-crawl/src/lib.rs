pub mod crawl;
pub mod fetch;
pub mod frontier;
pub mod metadata;
pub mod path;
pub mod processor;
pub mod query;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use crawl::Crawl;
pub use fetch::{Dereferencer, HttpDereferencer};
pub use path::{evaluate_path, RelationPath};
pub use query::{start_query, Collaborators, QueryArgs};
