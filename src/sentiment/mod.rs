// =============================================================================
// Headline Sentiment
// =============================================================================
//
// Any scorer that maps text to a polarity in [-1, 1] can drive the labeling;
// the lexicon is the built-in one. Labels come from `SentimentLabel::from_score`.

pub mod lexicon;

use serde::Serialize;

use crate::types::SentimentLabel;

pub use lexicon::FinancialLexicon;

/// Headlines shown in the sentiment section.
pub const HEADLINES: &[&str] = &[
    "Tech stocks rally as AI optimism boosts NASDAQ",
    "Fed rate hike concerns weigh on tech sector",
    "Microsoft announces breakthrough in quantum computing",
    "Inflation data comes in hotter than expected",
    "Apple unveils new AI features at WWDC",
];

/// Maps free text to a polarity score in [-1, 1].
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

/// One row of the sentiment section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineSentiment {
    pub headline: String,
    pub sentiment: SentimentLabel,
    pub score: f64,
}

/// Score and label every headline, preserving input order.
pub fn score_headlines<S>(scorer: &S, headlines: &[&str]) -> Vec<HeadlineSentiment>
where
    S: PolarityScorer + ?Sized,
{
    headlines
        .iter()
        .map(|h| {
            let score = scorer.polarity(h).clamp(-1.0, 1.0);
            HeadlineSentiment {
                headline: h.to_string(),
                sentiment: SentimentLabel::from_score(score),
                score,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl PolarityScorer for Fixed {
        fn polarity(&self, _text: &str) -> f64 {
            self.0
        }
    }

    #[test]
    fn labels_follow_thresholds() {
        let cases = [
            (0.05, SentimentLabel::Neutral),
            (0.5, SentimentLabel::Bullish),
            (-0.3, SentimentLabel::Bearish),
            (0.1, SentimentLabel::Neutral),
        ];
        for (score, expected) in cases {
            let rows = score_headlines(&Fixed(score), &["anything"]);
            assert_eq!(rows[0].sentiment, expected, "score {score}");
            assert_eq!(rows[0].score, score);
        }
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let rows = score_headlines(&Fixed(3.0), &["x"]);
        assert_eq!(rows[0].score, 1.0);
        assert_eq!(rows[0].sentiment, SentimentLabel::Bullish);
    }

    #[test]
    fn default_headlines_with_lexicon() {
        let rows = score_headlines(&FinancialLexicon::new(), HEADLINES);
        assert_eq!(rows.len(), 5);
        let labels: Vec<SentimentLabel> = rows.iter().map(|r| r.sentiment).collect();
        assert_eq!(
            labels,
            vec![
                SentimentLabel::Bullish,
                SentimentLabel::Bearish,
                SentimentLabel::Bullish,
                SentimentLabel::Bearish,
                SentimentLabel::Neutral,
            ]
        );
        assert_eq!(rows[0].headline, HEADLINES[0]);
    }

    #[test]
    fn works_through_trait_object() {
        let scorer: Box<dyn PolarityScorer> = Box::new(FinancialLexicon::new());
        let rows = score_headlines(scorer.as_ref(), &["Markets crash"]);
        assert_eq!(rows[0].sentiment, SentimentLabel::Bearish);
    }
}
