pub mod answer;
pub mod error;
pub mod explorer;
mod frontier;
pub mod google;
pub mod parse;
pub mod source;
pub mod throttle;

pub use answer::Answer;
pub use error::{ScanError, SourceError};
pub use explorer::{Answers, Explorer, RelatedQuestions};
pub use frontier::Selection;
pub use google::GoogleSource;
pub use source::{QuestionSource, RelatedQuestionMap, SearchPage, Snippet, SnippetKind};
pub use throttle::Throttle;

pub use tokio_util::sync::CancellationToken;
