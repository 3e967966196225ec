use std::sync::Arc;

use nm_core::SentimentScorer;

pub mod annotator;
pub mod lexicon;
pub mod scorer;

pub use annotator::{Annotation, Annotator, BackfillReport, Stage};
pub use scorer::LexiconScorer;

/// The scorer the annotator uses unless told otherwise.
pub fn default_scorer() -> Arc<dyn SentimentScorer> {
    Arc::new(LexiconScorer::new())
}

pub mod prelude {
    pub use super::{default_scorer, Annotation, Annotator, BackfillReport, LexiconScorer, Stage};
    pub use nm_core::{AnnotatedArticle, Article, Error, Result, Sentiment, SentimentScorer};
}
