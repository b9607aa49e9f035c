//! A conversational reasoning engine with a self-training knowledge graph.
//!
//! Parley answers utterances in two tiers. Short conversational inputs are handled by a
//! fuzzy intent matcher; anything that touches what the engine knows is answered by
//! walking a confidence-weighted knowledge graph and composing a reply from its facts.
//! User feedback and bulk training data both feed back into node confidence.
//!
//! # Architecture
//!
//! - **Matching**: token-level substring / edit-distance scoring against an intent library
//! - **Knowledge**: concept nodes with facts, examples, and bidirectional relations
//! - **Reasoning**: reasoning-style classification, tone, excerpts, follow-ups
//! - **Learning**: feedback nudges confidence within `[0.1, 1.0]` and adapts preferences
//! - **Training**: batched, cancellable bulk training with knowledge mining
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`engine`]: The [`engine::Engine`] that owns all shared state
//! - [`matcher`]: Tokenizer, edit distance, and the intent matcher
//! - [`graph`]: The knowledge graph store and its traversal
//! - [`reasoning`]: Classification, conversation context, and response composition
//! - [`learning`]: Feedback-driven confidence and preference updates
//! - [`training`]: The auto-trainer and knowledge mining

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod learning;
pub mod matcher;
pub mod reasoning;
pub mod response;
pub mod training;
