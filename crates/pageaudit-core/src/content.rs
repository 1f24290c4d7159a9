//! Body-text analysis: tokens, keyword frequency, n-grams, density,
//! sentiment and reading time.
//!
//! Sentiment scoring and reading-time estimation sit behind traits so a
//! caller can plug in a different lexicon or reading model.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::AnalyzerConfig;

// Runs of ASCII word characters; anything else (including non-ASCII
// letters) separates words.
static RE_WORD_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9_]+").expect("invalid word regex"));

/// N-gram sizes reported by the analyzer
pub const NGRAM_SIZES: [usize; 3] = [2, 3, 4];

/// How many keywords `top_keywords` keeps
pub const TOP_KEYWORDS: usize = 10;

const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves", "s", "t", "don", "also", "may", "might", "must", "shall",
];

// AFINN-style word weights in [-5, 5]
const SENTIMENT_LEXICON: &[(&str, i32)] = &[
    ("abandon", -2), ("amazing", 4), ("angry", -3), ("annoying", -2), ("awesome", 4),
    ("awful", -3), ("bad", -3), ("beautiful", 3), ("best", 3), ("better", 2), ("boring", -3),
    ("broken", -1), ("bug", -2), ("care", 2), ("cheap", -2), ("clean", 2), ("confused", -2),
    ("cool", 1), ("crash", -2), ("danger", -2), ("dead", -3), ("delight", 3), ("disappointed", -2),
    ("easy", 1), ("effective", 2), ("efficient", 2), ("enjoy", 2), ("error", -2), ("excellent", 3),
    ("excited", 3), ("fail", -2), ("failed", -2), ("failure", -2), ("fantastic", 4), ("fast", 1),
    ("fear", -2), ("fine", 2), ("free", 1), ("fun", 4), ("good", 3), ("great", 3), ("happy", 3),
    ("hate", -3), ("help", 2), ("helpful", 2), ("horrible", -3), ("hurt", -2), ("ideal", 2),
    ("important", 2), ("impressive", 3), ("improve", 2), ("inspiring", 3), ("interesting", 2),
    ("issue", -1), ("kind", 2), ("lack", -2), ("like", 2), ("lose", -3), ("love", 3), ("loved", 3),
    ("lucky", 3), ("mess", -2), ("miss", -2), ("nice", 3), ("outstanding", 5), ("pain", -2),
    ("perfect", 3), ("pleasant", 3), ("poor", -2), ("problem", -2), ("promising", 3),
    ("protect", 1), ("recommend", 2), ("reliable", 2), ("risk", -2), ("sad", -2), ("safe", 1),
    ("secure", 2), ("simple", 1), ("slow", -2), ("smart", 1), ("smooth", 2), ("sorry", -1),
    ("strong", 2), ("stupid", -2), ("success", 2), ("successful", 3), ("superb", 5),
    ("support", 2), ("terrible", -3), ("thank", 2), ("thanks", 2), ("trust", 1), ("ugly", -3),
    ("useful", 2), ("useless", -2), ("valuable", 2), ("win", 4), ("wonderful", 4), ("worse", -3),
    ("worst", -3), ("wrong", -2),
];

/// Words excluded from frequency counts and n-grams
#[derive(Debug, Clone)]
pub struct Stopwords(HashSet<String>);

impl Stopwords {
    pub fn english() -> Self {
        ENGLISH_STOPWORDS.iter().copied().collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::english()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Stopwords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|w| w.as_ref().to_ascii_lowercase())
                .collect(),
        )
    }
}

/// Polarity of a text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub score: i32,
    pub comparative: f64,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

pub trait SentimentScorer {
    fn score(&self, tokens: &[String]) -> Sentiment;
}

/// Sums per-word weights from a lexicon
#[derive(Debug, Clone)]
pub struct LexiconSentiment {
    lexicon: HashMap<String, i32>,
}

impl LexiconSentiment {
    pub fn with_lexicon(lexicon: HashMap<String, i32>) -> Self {
        Self { lexicon }
    }
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self::with_lexicon(
            SENTIMENT_LEXICON
                .iter()
                .map(|(word, weight)| (word.to_string(), *weight))
                .collect(),
        )
    }
}

impl SentimentScorer for LexiconSentiment {
    fn score(&self, tokens: &[String]) -> Sentiment {
        let mut sentiment = Sentiment::default();
        for token in tokens {
            match self.lexicon.get(token) {
                Some(&weight) if weight > 0 => {
                    sentiment.score += weight;
                    sentiment.positive.push(token.clone());
                }
                Some(&weight) if weight < 0 => {
                    sentiment.score += weight;
                    sentiment.negative.push(token.clone());
                }
                _ => {}
            }
        }
        if !tokens.is_empty() {
            sentiment.comparative = sentiment.score as f64 / tokens.len() as f64;
        }
        sentiment
    }
}

/// Estimated reading duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingTime {
    pub text: String,
    pub minutes: f64,
    pub words: usize,
}

pub trait ReadingTimeEstimator {
    fn estimate(&self, text: &str) -> ReadingTime;
}

/// Fixed reading speed over whitespace-separated words
#[derive(Debug, Clone, Copy)]
pub struct WordsPerMinute(pub f64);

impl Default for WordsPerMinute {
    fn default() -> Self {
        Self(200.0)
    }
}

impl ReadingTimeEstimator for WordsPerMinute {
    fn estimate(&self, text: &str) -> ReadingTime {
        let words = text.split_whitespace().count();
        let minutes = if self.0 > 0.0 {
            words as f64 / self.0
        } else {
            0.0
        };
        let minutes = (minutes * 100.0).round() / 100.0;
        ReadingTime {
            text: format!("{} min read", minutes.ceil() as u64),
            minutes,
            words,
        }
    }
}

/// Frequency of one word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// Stopword-free n-grams with their counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NGramSummary {
    pub bigrams: BTreeMap<String, usize>,
    pub trigrams: BTreeMap<String, usize>,
    pub fourgrams: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub total_words: usize,
    pub unique_words: usize,
    pub word_frequency: BTreeMap<String, usize>,
    pub top_keywords: Vec<KeywordCount>,
    pub ngrams: NGramSummary,
    pub keyword_density: BTreeMap<String, String>,
    pub sentiment: Sentiment,
    pub reading_time: ReadingTime,
}

/// Lower-cased alphabetic tokens
///
/// A run of ASCII word characters only counts when it is made of letters,
/// so `abc123` and `snake_case` produce nothing.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    RE_WORD_RUN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|run| run.bytes().all(|b| b.is_ascii_lowercase()))
        .map(str::to_string)
        .collect()
}

pub fn word_frequency(tokens: &[String], stopwords: &Stopwords) -> BTreeMap<String, usize> {
    let mut freq = BTreeMap::new();
    for token in tokens.iter().filter(|t| !stopwords.contains(t)) {
        *freq.entry(token.clone()).or_insert(0) += 1;
    }
    freq
}

/// All contiguous windows of `n` tokens, joined by a space
pub fn ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    tokens.windows(n).map(|window| window.join(" ")).collect()
}

/// Counted n-grams for each size in [`NGRAM_SIZES`], dropping any window
/// that contains a stopword
pub fn content_ngrams(tokens: &[String], stopwords: &Stopwords) -> NGramSummary {
    let count = |n: usize| {
        let mut counts = BTreeMap::new();
        for window in tokens.windows(n) {
            if window.iter().any(|t| stopwords.contains(t)) {
                continue;
            }
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
        counts
    };

    NGramSummary {
        bigrams: count(NGRAM_SIZES[0]),
        trigrams: count(NGRAM_SIZES[1]),
        fourgrams: count(NGRAM_SIZES[2]),
    }
}

/// `count / total * 100` as a two-decimal percentage string
pub fn keyword_density(
    frequency: &BTreeMap<String, usize>,
    total_words: usize,
) -> BTreeMap<String, String> {
    frequency
        .iter()
        .map(|(word, count)| {
            let density = if total_words == 0 {
                0.0
            } else {
                *count as f64 / total_words as f64 * 100.0
            };
            (word.clone(), format!("{density:.2}%"))
        })
        .collect()
}

/// Most frequent words, ties broken alphabetically
pub fn top_keywords(frequency: &BTreeMap<String, usize>, limit: usize) -> Vec<KeywordCount> {
    let mut keywords: Vec<KeywordCount> = frequency
        .iter()
        .map(|(word, count)| KeywordCount {
            word: word.clone(),
            count: *count,
        })
        .collect();
    keywords.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    keywords.truncate(limit);
    keywords
}

/// Runs the full text analysis with injected collaborators
pub struct ContentAnalyzer<S = LexiconSentiment, R = WordsPerMinute> {
    stopwords: Stopwords,
    scorer: S,
    estimator: R,
}

impl ContentAnalyzer {
    /// English stopwords, the built-in lexicon and the configured reading speed
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(
            Stopwords::english(),
            LexiconSentiment::default(),
            WordsPerMinute(config.words_per_minute),
        )
    }
}

impl Default for ContentAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalyzerConfig::default())
    }
}

impl<S: SentimentScorer, R: ReadingTimeEstimator> ContentAnalyzer<S, R> {
    pub fn new(stopwords: Stopwords, scorer: S, estimator: R) -> Self {
        Self {
            stopwords,
            scorer,
            estimator,
        }
    }

    pub fn analyze(&self, text: &str) -> ContentAnalysis {
        let tokens = tokenize(text);
        let word_frequency = word_frequency(&tokens, &self.stopwords);

        ContentAnalysis {
            total_words: tokens.len(),
            unique_words: word_frequency.len(),
            top_keywords: top_keywords(&word_frequency, TOP_KEYWORDS),
            ngrams: content_ngrams(&tokens, &self.stopwords),
            keyword_density: keyword_density(&word_frequency, tokens.len()),
            sentiment: self.scorer.score(&tokens),
            reading_time: self.estimator.estimate(text),
            word_frequency,
        }
    }
}
