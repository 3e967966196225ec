use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Tone in [-1.0, 1.0]; negative values are negative tone.
    pub polarity: f64,
    /// Opinion content in [0.0, 1.0]; 0 is objective.
    pub subjectivity: f64,
}

impl Sentiment {
    pub const NEUTRAL: Sentiment = Sentiment {
        polarity: 0.0,
        subjectivity: 0.0,
    };

    /// Builds a score, clamping into range. Non-finite inputs are rejected.
    pub fn new(polarity: f64, subjectivity: f64) -> Result<Self> {
        if !polarity.is_finite() || !subjectivity.is_finite() {
            return Err(Error::Scoring(format!(
                "non-finite score (polarity={}, subjectivity={})",
                polarity, subjectivity
            )));
        }
        Ok(Self {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        })
    }

    pub fn overall(&self) -> &'static str {
        if self.polarity > 0.0 {
            "positive"
        } else if self.polarity < 0.0 {
            "negative"
        } else {
            "neutral"
        }
    }
}

pub trait SentimentScorer: Send + Sync + fmt::Debug {
    /// Returns the name of the scoring model
    fn name(&self) -> &str;

    /// Scores a piece of text. Must accept the empty string.
    fn score(&self, text: &str) -> Result<Sentiment>;
}
