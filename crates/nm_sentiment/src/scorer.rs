use nm_core::{Result, Sentiment, SentimentScorer};

use crate::lexicon;

/// How far back a negation word still flips a sentiment word.
const NEGATION_WINDOW: usize = 3;
/// Negated words keep half their strength with the opposite sign.
const NEGATION_FACTOR: f64 = -0.5;

/// Averages the lexicon scores of the sentiment-bearing words in a text,
/// adjusting each one for a preceding intensifier or negation.
#[derive(Debug, Default, Clone)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .filter(|t| !t.is_empty())
        .map(|t| t.replace('’', "'").trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn score(&self, text: &str) -> Result<Sentiment> {
        let tokens = tokenize(text);
        let mut assessments = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some((mut polarity, mut subjectivity)) = lexicon::lookup(token) else {
                continue;
            };

            if let Some(factor) = i.checked_sub(1).and_then(|j| lexicon::intensity(&tokens[j])) {
                polarity = (polarity * factor).clamp(-1.0, 1.0);
                subjectivity = (subjectivity * factor).clamp(0.0, 1.0);
            }

            let window = &tokens[i.saturating_sub(NEGATION_WINDOW)..i];
            if window.iter().any(|t| lexicon::is_negation(t)) {
                polarity *= NEGATION_FACTOR;
            }

            assessments.push((polarity, subjectivity));
        }

        if assessments.is_empty() {
            return Ok(Sentiment::NEUTRAL);
        }

        let n = assessments.len() as f64;
        let polarity = assessments.iter().map(|(p, _)| p).sum::<f64>() / n;
        let subjectivity = assessments.iter().map(|(_, s)| s).sum::<f64>() / n;
        Sentiment::new(polarity, subjectivity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> Sentiment {
        LexiconScorer::new().score(text).unwrap()
    }

    #[test]
    fn test_empty_text_is_neutral() {
        assert_eq!(score(""), Sentiment::NEUTRAL);
        assert_eq!(score("   \n\t"), Sentiment::NEUTRAL);
        assert_eq!(score("The committee met on Tuesday."), Sentiment::NEUTRAL);
    }

    #[test]
    fn test_positive_text() {
        let s = score("Great news today!");
        assert!(s.polarity > 0.0);
        assert!((0.0..=1.0).contains(&s.subjectivity));
        assert_eq!(s.polarity, 0.8);
        assert_eq!(s.subjectivity, 0.75);
    }

    #[test]
    fn test_negative_text() {
        let s = score("A terrible crash left the town in crisis.");
        assert!(s.polarity < 0.0);
        assert_eq!(s.overall(), "negative");
    }

    #[test]
    fn test_negation_flips_polarity() {
        assert!(score("The results were not good.").polarity < 0.0);
        assert!(score("It isn't bad at all").polarity > 0.0);
    }

    #[test]
    fn test_intensifier_scales() {
        assert!(score("very good").polarity > score("good").polarity);
        assert!(score("slightly good").polarity < score("good").polarity);
        assert!(score("extremely excellent").polarity <= 1.0);
    }

    #[test]
    fn test_is_deterministic() {
        let text = "A good day, though the worst storm in years caused serious damage.";
        assert_eq!(score(text), score(text));
    }

    #[test]
    fn test_news_prose_is_not_neutral() {
        let fire = "Firefighters battled a blaze that destroyed dozens of homes overnight. \
                    Three people were injured and families have been left homeless, \
                    with residents describing scenes of devastation.";
        assert_eq!(score(fire).overall(), "negative");

        let appeal = "Volunteers helped the charity raise record donations for the hospital appeal, \
                      and staff said they were delighted and grateful for the support.";
        assert_eq!(score(appeal).overall(), "positive");

        let court = "The former director was jailed after being convicted of fraud and bribery.";
        assert_eq!(score(court).overall(), "negative");
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Don’t PANIC, it's 'fine'!"), ["don't", "panic", "it's", "fine"]);
    }
}
