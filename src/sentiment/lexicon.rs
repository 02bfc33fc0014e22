// =============================================================================
// Financial Lexicon — rule-based polarity scoring
// =============================================================================
//
// Scoring rules:
//   1. Look up each token (lower-cased, punctuation trimmed; a trailing plural
//      "s" is dropped when the plural form itself is unknown).
//   2. A negation word flips the sign of the next sentiment word.
//   3. An intensifier scales the next sentiment word.
//   4. Polarity = mean of matched word scores, clamped to [-1, 1]; 0 when
//      nothing matched.
//
// Modifiers only reach the immediately following token; any unknown word in
// between resets them.
// =============================================================================

use std::collections::HashMap;

use tracing::debug;

use super::PolarityScorer;

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("bullish", 0.8),
    ("surge", 0.7),
    ("rally", 0.7),
    ("soar", 0.8),
    ("gain", 0.5),
    ("profit", 0.6),
    ("growth", 0.6),
    ("rise", 0.5),
    ("boost", 0.5),
    ("optimism", 0.6),
    ("optimistic", 0.6),
    ("breakthrough", 0.6),
    ("improve", 0.5),
    ("outperform", 0.7),
    ("beat", 0.6),
    ("exceed", 0.6),
    ("strong", 0.5),
    ("positive", 0.5),
    ("confident", 0.5),
    ("record", 0.6),
    ("upgrade", 0.6),
    ("breakout", 0.6),
    ("recovery", 0.5),
    ("rebound", 0.5),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("bearish", -0.8),
    ("crash", -0.9),
    ("plunge", -0.8),
    ("drop", -0.6),
    ("fall", -0.5),
    ("decline", -0.6),
    ("loss", -0.6),
    ("weak", -0.5),
    ("negative", -0.5),
    ("pessimistic", -0.6),
    ("concern", -0.5),
    ("weigh", -0.4),
    ("worry", -0.5),
    ("fear", -0.6),
    ("inflation", -0.4),
    ("recession", -0.7),
    ("uncertainty", -0.5),
    ("miss", -0.6),
    ("disappoint", -0.7),
    ("underperform", -0.6),
    ("downgrade", -0.6),
    ("selloff", -0.7),
    ("correction", -0.4),
    ("crisis", -0.8),
    ("warning", -0.5),
    ("fraud", -0.9),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "none", "cannot", "cant", "don't", "dont", "doesn't",
    "doesnt", "didn't", "didnt", "won't", "wont", "isn't", "isnt", "aren't", "arent", "wasn't",
    "wasnt", "hardly", "barely",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("extremely", 2.0),
    ("highly", 1.5),
    ("significantly", 1.5),
    ("sharply", 1.5),
    ("dramatically", 1.8),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("marginally", 0.5),
];

/// Word-level financial sentiment lexicon.
pub struct FinancialLexicon {
    words: HashMap<String, f64>,
    negations: Vec<String>,
    intensifiers: HashMap<String, f64>,
}

impl Default for FinancialLexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl FinancialLexicon {
    pub fn new() -> Self {
        let words = POSITIVE_WORDS
            .iter()
            .chain(NEGATIVE_WORDS)
            .map(|&(w, s)| (w.to_string(), s))
            .collect();
        let negations = NEGATIONS.iter().map(|w| w.to_string()).collect();
        let intensifiers = INTENSIFIERS
            .iter()
            .map(|&(w, m)| (w.to_string(), m))
            .collect();

        Self {
            words,
            negations,
            intensifiers,
        }
    }

    /// Score for a single (already normalized) token, trying the singular form
    /// when the token itself is unknown.
    pub fn get_score(&self, token: &str) -> Option<f64> {
        self.words.get(token).copied().or_else(|| {
            token
                .strip_suffix('s')
                .filter(|stem| !stem.is_empty())
                .and_then(|stem| self.words.get(stem).copied())
        })
    }

    pub fn is_negation(&self, token: &str) -> bool {
        self.negations.iter().any(|n| n == token)
    }

    pub fn get_intensifier(&self, token: &str) -> Option<f64> {
        self.intensifiers.get(token).copied()
    }

    /// Analyze `text` and report the polarity plus the words that matched.
    pub fn analyze(&self, text: &str) -> LexiconResult {
        let mut matched_words: Vec<(String, f64)> = Vec::new();
        let mut negate_next = false;
        let mut intensifier = 1.0_f64;

        for token in text.split_whitespace().map(normalize_token) {
            if token.is_empty() {
                continue;
            }

            if self.is_negation(&token) {
                negate_next = true;
                continue;
            }

            if let Some(mult) = self.get_intensifier(&token) {
                intensifier = mult;
                continue;
            }

            if let Some(mut score) = self.get_score(&token) {
                if negate_next {
                    score = -score;
                }
                score *= intensifier;
                matched_words.push((token, score));
            }
            negate_next = false;
            intensifier = 1.0;
        }

        let score = if matched_words.is_empty() {
            0.0
        } else {
            matched_words.iter().map(|(_, s)| s).sum::<f64>() / matched_words.len() as f64
        };

        LexiconResult {
            score: score.clamp(-1.0, 1.0),
            matched_words,
        }
    }
}

impl PolarityScorer for FinancialLexicon {
    fn polarity(&self, text: &str) -> f64 {
        let result = self.analyze(text);
        debug!(matched = ?result.matched_words, score = result.score, "text scored");
        result.score
    }
}

/// Result from lexicon-based analysis.
#[derive(Debug, Clone)]
pub struct LexiconResult {
    /// Overall polarity in [-1, 1].
    pub score: f64,
    /// Words that matched, with their effective (negated / scaled) scores.
    pub matched_words: Vec<(String, f64)>,
}

fn normalize_token(raw: &str) -> String {
    raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .to_lowercase()
}
