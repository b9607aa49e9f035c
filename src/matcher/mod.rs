//! Fuzzy intent matching.
//!
//! Input is normalized with [`tokenize`] and scored against every phrasing in the
//! intent library with [`similarity`]. Two tokens match when one contains the other
//! or their [`levenshtein`] distance is at most 1. [`PatternMatcher::respond`] turns
//! the best score into one of three response tiers: direct, hedged, or help.

pub mod patterns;

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::{Duration, Instant};

use crate::config::MatcherConfig;
use crate::response::{EngineResponse, ResponseType};
pub use patterns::TrainingPattern;

/// Scores at or below this never count as a match.
pub const MATCH_THRESHOLD: f64 = 0.3;
/// Scores above this get a direct reply instead of a hedged one.
pub const DIRECT_THRESHOLD: f64 = 0.5;
/// Confidence reported on the help fallback for unmatched input.
pub const FALLBACK_CONFIDENCE: f64 = 0.1;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Lower-case, strip non-word characters, split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Classic dynamic-programming edit distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            matrix[i + 1][j + 1] = (matrix[i][j + 1] + 1)
                .min(matrix[i + 1][j] + 1)
                .min(matrix[i][j] + cost);
        }
    }

    matrix[a.len()][b.len()]
}

fn tokens_match(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a) || levenshtein(a, b) <= 1
}

/// Fraction of input tokens that match some pattern token, over the longer side.
pub fn similarity(input: &str, pattern: &str) -> f64 {
    let input_tokens = tokenize(input);
    let pattern_tokens = tokenize(pattern);
    if input_tokens.is_empty() || pattern_tokens.is_empty() {
        return 0.0;
    }

    let matched = input_tokens
        .iter()
        .filter(|it| pattern_tokens.iter().any(|pt| tokens_match(it, pt)))
        .count();

    matched as f64 / input_tokens.len().max(pattern_tokens.len()) as f64
}

/// The winning `(tag, pattern)` pair of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub tag: String,
    pub pattern: String,
    pub score: f64,
}

pub struct PatternMatcher {
    library: Vec<TrainingPattern>,
    max_input_chars: usize,
    scan_deadline: Option<Duration>,
}

impl PatternMatcher {
    pub fn new(library: Vec<TrainingPattern>, config: &MatcherConfig) -> Self {
        Self {
            library,
            max_input_chars: config.max_input_chars,
            scan_deadline: config.scan_deadline(),
        }
    }

    pub fn with_default_library(config: &MatcherConfig) -> Self {
        Self::new(patterns::default_library(), config)
    }

    pub fn library(&self) -> &[TrainingPattern] {
        &self.library
    }

    /// Total number of phrasings across all intents.
    pub fn pattern_count(&self) -> usize {
        self.library.iter().map(|p| p.patterns.len()).sum()
    }

    /// Intent tags, in library order.
    pub fn categories(&self) -> Vec<&str> {
        self.library.iter().map(|p| p.tag.as_str()).collect()
    }

    fn bounded<'a>(&self, input: &'a str) -> &'a str {
        match input.char_indices().nth(self.max_input_chars) {
            Some((cut, _)) => {
                tracing::debug!(limit = self.max_input_chars, "input truncated before matching");
                &input[..cut]
            }
            None => input,
        }
    }

    /// Highest-scoring pattern above [`MATCH_THRESHOLD`]. Ties keep the first seen.
    ///
    /// If the scan deadline passes, the best match found so far is returned.
    pub fn find_best_match(&self, input: &str) -> Option<PatternMatch> {
        let input = self.bounded(input);
        let started = Instant::now();
        let mut best: Option<PatternMatch> = None;

        for intent in &self.library {
            if let Some(deadline) = self.scan_deadline {
                if started.elapsed() > deadline {
                    tracing::warn!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "pattern scan deadline exceeded, using best match so far"
                    );
                    break;
                }
            }

            for pattern in &intent.patterns {
                let score = similarity(input, pattern);
                if score <= MATCH_THRESHOLD {
                    continue;
                }
                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(PatternMatch {
                        tag: intent.tag.clone(),
                        pattern: pattern.clone(),
                        score,
                    });
                }
            }
        }

        best
    }

    /// Match `input` and build the tiered response.
    pub fn respond(&self, input: &str) -> EngineResponse {
        if input.trim().is_empty() {
            return self.help_response(1.0);
        }

        let Some(best) = self.find_best_match(input) else {
            return self.help_response(FALLBACK_CONFIDENCE);
        };
        let Some(intent) = self.library.iter().find(|p| p.tag == best.tag) else {
            return self.help_response(FALLBACK_CONFIDENCE);
        };
        let Some(reply) = pick_reply(&intent.responses, input) else {
            return self.help_response(FALLBACK_CONFIDENCE);
        };

        tracing::debug!(tag = %best.tag, score = best.score, "intent matched");

        if best.score > DIRECT_THRESHOLD {
            let mut response = EngineResponse::new(reply, ResponseType::Text, best.score);
            response.intent = Some(best.tag);
            response
        } else {
            let text = format!(
                "I think you're asking about {}. {reply}",
                readable_tag(&best.tag)
            );
            let mut response = EngineResponse::new(text, ResponseType::Suggestion, best.score);
            response.suggestions = Some(intent.patterns.iter().take(3).cloned().collect());
            response.intent = Some(best.tag);
            response
        }
    }

    fn help_response(&self, confidence: f64) -> EngineResponse {
        let topics: Vec<String> = self.library.iter().map(|p| readable_tag(&p.tag)).collect();
        let text = format!(
            "I'm not sure I understood that. I can help with: {}. Try asking about one of these.",
            topics.join(", ")
        );
        let mut response = EngineResponse::new(text, ResponseType::Help, confidence);
        response.suggestions = Some(topics);
        response
    }
}

/// Deterministic pick so the same input always gets the same reply.
fn pick_reply(responses: &[String], input: &str) -> Option<String> {
    if responses.is_empty() {
        return None;
    }
    responses.get(input.len() % responses.len()).cloned()
}

fn readable_tag(tag: &str) -> String {
    tag.replace('_', " ")
}
