//! Per-user conversation state.
//!
//! Defines [`ConversationContext`] (history, preferences, mood), the preference enums,
//! and the tone table the composer reads from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    Formal,
    Casual,
    Technical,
    Friendly,
}

impl CommunicationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Casual => "casual",
            Self::Technical => "technical",
            Self::Friendly => "friendly",
        }
    }
}

impl std::fmt::Display for CommunicationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommunicationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "formal" => Ok(Self::Formal),
            "casual" => Ok(Self::Casual),
            "technical" => Ok(Self::Technical),
            "friendly" => Ok(Self::Friendly),
            _ => Err(format!("unknown communication style: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLength {
    Brief,
    Detailed,
    Comprehensive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub communication_style: CommunicationStyle,
    pub expertise_level: ExpertiseLevel,
    pub preferred_topics: Vec<String>,
    pub response_length: ResponseLength,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            communication_style: CommunicationStyle::Friendly,
            expertise_level: ExpertiseLevel::Intermediate,
            preferred_topics: Vec::new(),
            response_length: ResponseLength::Brief,
        }
    }
}

/// One completed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub input: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
    /// Feedback score in `[0, 1]`, once the user has rated this turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satisfaction: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    pub user_id: String,
    pub session_id: String,
    pub history: Vec<HistoryEntry>,
    pub user_preferences: UserPreferences,
    pub current_mood: String,
    pub learning_goals: Vec<String>,
}

pub const NEUTRAL_MOOD: &str = "neutral";

impl ConversationContext {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            session_id: uuid::Uuid::now_v7().to_string(),
            history: Vec::new(),
            user_preferences: UserPreferences::default(),
            current_mood: NEUTRAL_MOOD.to_string(),
            learning_goals: Vec::new(),
        }
    }

    pub fn record_turn(&mut self, input: &str, response: &str) {
        self.history.push(HistoryEntry {
            input: input.to_string(),
            response: response.to_string(),
            timestamp: Utc::now(),
            satisfaction: None,
        });
    }

    /// Attach a feedback score to the most recent turn with this input.
    pub fn rate_turn(&mut self, input: &str, satisfaction: f64) -> bool {
        match self.history.iter_mut().rev().find(|h| h.input == input) {
            Some(entry) => {
                entry.satisfaction = Some(satisfaction);
                true
            }
            None => false,
        }
    }
}

const MOOD_CUES: &[(&str, &[&str])] = &[
    ("frustrated", &["frustrat", "annoy", "stuck", "confus", "doesn't work", "not working"]),
    ("excited", &["awesome", "excited", "amazing", "love", "can't wait"]),
    ("curious", &["curious", "wonder", "interested"]),
];

/// Mood signalled by `query`, if any cue is present.
pub fn detect_mood(query: &str) -> Option<&'static str> {
    let lower = query.to_lowercase();
    MOOD_CUES
        .iter()
        .find(|(_, cues)| cues.iter().any(|c| lower.contains(c)))
        .map(|(mood, _)| *mood)
}

/// Opening phrase for a reply, keyed by style and mood.
pub fn tone_prefix(style: CommunicationStyle, mood: &str) -> &'static str {
    use CommunicationStyle::*;
    match (style, mood) {
        (Formal, "frustrated") => "I understand this has been difficult. Let me address it carefully.",
        (Formal, "excited") => "I am pleased to see your enthusiasm.",
        (Formal, "curious") => "That is an excellent question.",
        (Formal, _) => "Certainly.",
        (Casual, "frustrated") => "Ugh, that sounds annoying. Let's sort it out.",
        (Casual, "excited") => "Love the energy!",
        (Casual, "curious") => "Ooh, good one.",
        (Casual, _) => "Sure thing!",
        (Technical, "frustrated") => "Let's debug this systematically.",
        (Technical, "curious") => "Here's the technical picture.",
        (Technical, _) => "Here are the details.",
        (Friendly, "frustrated") => "No worries, we'll figure this out together.",
        (Friendly, "excited") => "That's exciting!",
        (Friendly, "curious") => "Great question!",
        (Friendly, _) => "Happy to help!",
    }
}
