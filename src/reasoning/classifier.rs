//! Reasoning-style classification by trigger phrases.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningStyle {
    Causal,
    Comparative,
    Analytical,
    Temporal,
    Hypothetical,
    General,
}

impl ReasoningStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Causal => "causal",
            Self::Comparative => "comparative",
            Self::Analytical => "analytical",
            Self::Temporal => "temporal",
            Self::Hypothetical => "hypothetical",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for ReasoningStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger table in priority order: the first style with any hit wins.
pub const REASONING_PRIORITY: &[(ReasoningStyle, &[&str])] = &[
    (
        ReasoningStyle::Causal,
        &["why", "because", "cause", "reason", "due to", "leads to", "result in"],
    ),
    (
        ReasoningStyle::Comparative,
        &["compare", "versus", " vs ", "difference", "better", "similar", "contrast"],
    ),
    (
        ReasoningStyle::Analytical,
        &["analyze", "analyse", "break down", "examine", "evaluate", "components"],
    ),
    (
        ReasoningStyle::Temporal,
        &["when", "before", "after", "history", "timeline", "future", "sequence"],
    ),
    (
        ReasoningStyle::Hypothetical,
        &["what if", "suppose", "imagine", "would happen", "hypothetically", "if "],
    ),
];

/// Confidence reported when no trigger matches.
pub const GENERAL_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub style: ReasoningStyle,
    /// Share of the winning style's triggers found in the query.
    pub confidence: f64,
}

pub fn classify(query: &str) -> Classification {
    let lower = query.to_lowercase();
    for (style, triggers) in REASONING_PRIORITY {
        let hits = triggers.iter().filter(|t| lower.contains(*t)).count();
        if hits > 0 {
            return Classification {
                style: *style,
                confidence: hits as f64 / triggers.len() as f64,
            };
        }
    }
    Classification {
        style: ReasoningStyle::General,
        confidence: GENERAL_CONFIDENCE,
    }
}
