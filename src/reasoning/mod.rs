//! Query understanding and answer composition.
//!
//! - [`classifier`] labels a query with a reasoning style
//! - [`context`] holds per-user conversation state and the tone table
//! - [`composer`] turns graph knowledge into a scored, toned answer

pub mod classifier;
pub mod composer;
pub mod context;

pub use classifier::{classify, Classification, ReasoningStyle};
pub use composer::{compose, ComposedResponse};
pub use context::{CommunicationStyle, ConversationContext, ExpertiseLevel, ResponseLength};
