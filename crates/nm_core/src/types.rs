use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::models::Sentiment;
use crate::{Error, Result};

/// Fields the annotator appends to a raw article.
pub const SENTIMENT_FIELDS: [&str; 2] = ["polarity", "subjectivity"];

/// A raw article as written to the raw-articles container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub url: String,
    /// Fields written by other producers, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    pub fn new(title: impl Into<String>, content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            url: url.into(),
            extra: Map::new(),
        }
    }

    /// Decodes a raw article blob. Anything that is not a JSON object with
    /// string `title`, `content` and `url` fields is malformed input.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::MalformedInput(format!("not valid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(Error::MalformedInput("expected a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| Error::MalformedInput(e.to_string()))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        to_json_bytes(self)
    }
}

/// A raw article plus its sentiment scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub polarity: f64,
    pub subjectivity: f64,
}

impl AnnotatedArticle {
    /// Appends `sentiment` to `article`. Sentiment fields already present in
    /// the raw document are replaced rather than duplicated.
    pub fn new(mut article: Article, sentiment: Sentiment) -> Self {
        for field in SENTIMENT_FIELDS {
            article.extra.remove(field);
        }
        Self {
            article,
            polarity: sentiment.polarity,
            subjectivity: sentiment.subjectivity,
        }
    }

    pub fn sentiment(&self) -> Sentiment {
        Sentiment {
            polarity: self.polarity,
            subjectivity: self.subjectivity,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        to_json_bytes(self)
    }
}

/// Encodes `value` as pretty JSON with a four-space indent. Output is
/// deterministic for a given value.
pub fn to_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}
