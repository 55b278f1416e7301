pub mod collect;
pub mod error;
pub mod input;
pub mod output;

pub use collect::{
    CollectOptions, CollectProgressCallback, CollectionReport, SeedOutcome, SeedStatus,
    execute_collection, format_elapsed, generate_collection_report,
};
pub use error::CollectError;
pub use input::{parse_questions, read_questions};
pub use output::{OutputFormat, artifact_name};
