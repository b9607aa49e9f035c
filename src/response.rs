//! The structured response handed back to collaborators.
//!
//! [`EngineResponse`] serializes to the JSON shape collaborators expect:
//! `{text, type, confidence, intent?, suggestions?, reasoning?, followUp?,
//! complexity?, sources?}`.

use serde::{Deserialize, Serialize};

/// What kind of answer a response is.
///
/// The first three come from the pattern matcher, the rest from the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Direct reply to a confidently matched intent.
    Text,
    /// Hedged best guess for a weak match.
    Suggestion,
    /// Fallback help listing known topics.
    Help,
    Reasoning,
    Factual,
    Creative,
    Analytical,
    Conversational,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Suggestion => "suggestion",
            Self::Help => "help",
            Self::Reasoning => "reasoning",
            Self::Factual => "factual",
            Self::Creative => "creative",
            Self::Analytical => "analytical",
            Self::Conversational => "conversational",
        }
    }
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complexity grade, shared by composed responses and training records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
    Expert,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
            Self::Expert => "expert",
        }
    }

    /// Bucket a raw complexity score: simple < 2 ≤ moderate < 5 ≤ complex < 10 ≤ expert.
    pub fn from_score(score: f64) -> Self {
        if score < 2.0 {
            Self::Simple
        } else if score < 5.0 {
            Self::Moderate
        } else if score < 10.0 {
            Self::Complex
        } else {
            Self::Expert
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "moderate" => Ok(Self::Moderate),
            "complex" => Ok(Self::Complex),
            "expert" => Ok(Self::Expert),
            _ => Err(format!("unknown complexity: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResponse {
    pub text: String,
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub confidence: f64,
    /// Tag of the matched intent, when the matcher produced this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl EngineResponse {
    /// A bare response with no optional fields set.
    pub fn new(text: impl Into<String>, response_type: ResponseType, confidence: f64) -> Self {
        Self {
            text: text.into(),
            response_type,
            confidence,
            intent: None,
            suggestions: None,
            reasoning: None,
            follow_up: None,
            complexity: None,
            sources: None,
        }
    }
}
