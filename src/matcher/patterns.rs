//! The intent library the matcher scores input against.

use serde::{Deserialize, Serialize};

/// A named intent with example phrasings and candidate replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPattern {
    pub tag: String,
    pub patterns: Vec<String>,
    pub responses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<String>>,
}

impl TrainingPattern {
    pub fn new(tag: &str, patterns: &[&str], responses: &[&str]) -> Self {
        Self {
            tag: tag.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            responses: responses.iter().map(|r| r.to_string()).collect(),
            context: None,
        }
    }

    fn with_context(mut self, context: &[&str]) -> Self {
        self.context = Some(context.iter().map(|c| c.to_string()).collect());
        self
    }
}

/// The built-in library. Order matters: ties go to the earlier pattern.
///
/// Phrasings avoid one-letter and filler tokens: token matching accepts substrings,
/// so a token like `i` or `me` would match most questions.
pub fn default_library() -> Vec<TrainingPattern> {
    vec![
        TrainingPattern::new(
            "greeting",
            &["hi", "hello", "hey", "good morning", "good evening", "howdy"],
            &[
                "Hello! How can I help you today?",
                "Hi there! What would you like to talk about?",
                "Hey! Ask me anything and I'll do my best.",
            ],
        ),
        TrainingPattern::new(
            "farewell",
            &["bye", "goodbye", "farewell", "good night", "talk later"],
            &[
                "Goodbye! Come back any time.",
                "See you later! It was good talking with you.",
            ],
        ),
        TrainingPattern::new(
            "thanks",
            &["thanks", "thank you", "many thanks", "much appreciated"],
            &[
                "You're welcome!",
                "Happy to help. Anything else on your mind?",
            ],
        ),
        TrainingPattern::new(
            "help",
            &["help", "need help", "help please", "need assistance"],
            &[
                "Of course. Tell me what you're working on and I'll point you in the right direction.",
                "I'm here to help. What do you need?",
            ],
        ),
        TrainingPattern::new(
            "capabilities",
            &[
                "what can you do",
                "your capabilities",
                "list your features",
                "show your skills",
                "abilities",
            ],
            &[
                "I can answer questions from my knowledge graph, explain concepts step by step, and learn from feedback.",
            ],
        ),
        TrainingPattern::new(
            "identity",
            &["who are you", "your name", "introduce yourself", "chatbot"],
            &["I'm Parley, a conversational reasoning assistant."],
        ),
        TrainingPattern::new(
            "feedback_positive",
            &["great answer", "very helpful", "nicely done", "perfect"],
            &["Glad that was useful! I'll remember what worked."],
        )
        .with_context(&["feedback"]),
        TrainingPattern::new(
            "feedback_negative",
            &["wrong answer", "not helpful", "incorrect", "bad response"],
            &["Sorry about that. Could you tell me what was off so I can do better?"],
        )
        .with_context(&["feedback"]),
        TrainingPattern::new(
            "learning",
            &["teach", "want to learn", "start learning", "study plan"],
            &[
                "Let's build a plan. Which topic would you like to start with?",
                "Learning works best in small steps. What's the first thing you want to understand?",
            ],
        ),
        TrainingPattern::new(
            "reasoning",
            &["walk through", "step by step", "think through", "break down"],
            &["Sure, let's break it down one step at a time. What's the problem?"],
        ),
    ]
}
