mod helpers;

use std::sync::Arc;
use std::thread;

use helpers::{empty_engine, seeded_engine};
use parley::config::ParleyConfig;
use parley::engine::{ConversationEngine, Engine, EngineSnapshot};
use parley::reasoning::{CommunicationStyle, ResponseLength};
use parley::response::ResponseType;

#[test]
fn greeting_gets_a_direct_reply() {
    let engine = seeded_engine();
    let response = engine.respond("hi", None).unwrap();
    assert_eq!(response.response_type, ResponseType::Text);
    assert_eq!(response.intent.as_deref(), Some("greeting"));
    assert!(response.confidence > 0.5);
}

#[test]
fn empty_input_gets_help() {
    let engine = seeded_engine();
    let response = engine.respond("   ", None).unwrap();
    assert_eq!(response.response_type, ResponseType::Help);
    assert_eq!(response.confidence, 1.0);
}

#[test]
fn known_topics_are_composed_from_the_graph() {
    let engine = seeded_engine();
    let response = engine.respond("Why do neural networks overfit", Some("ada")).unwrap();

    assert_eq!(response.response_type, ResponseType::Reasoning);
    assert!(response.text.contains("**Neural Networks**"));
    assert!(response
        .sources
        .as_ref()
        .unwrap()
        .contains(&"Neural Networks".to_string()));
    assert!(response.reasoning.as_ref().is_some_and(|steps| !steps.is_empty()));
    assert!((0.0..=1.0).contains(&response.confidence));

    let context = engine.context("ada").unwrap().unwrap();
    assert_eq!(context.history.len(), 1);
    assert_eq!(context.history[0].input, "Why do neural networks overfit");
}

#[test]
fn knowledge_questions_are_not_taken_by_intents() {
    let engine = seeded_engine();

    let response = engine.respond("what is machine learning", None).unwrap();
    assert_eq!(response.response_type, ResponseType::Factual);
    assert!(response.intent.is_none());
    let sources = response.sources.unwrap();
    assert_eq!(sources[0], "Machine Learning");

    let response = engine.respond("how does reasoning work", None).unwrap();
    assert_ne!(response.response_type, ResponseType::Text);
}

#[test]
fn the_asked_about_concept_is_quoted_first() {
    let engine = seeded_engine();
    let response = engine.respond("tell me about python", None).unwrap();
    let sources = response.sources.unwrap();
    assert_eq!(sources[0], "Python Programming");
    assert!(sources.contains(&"Rust Programming".to_string()));
}

#[test]
fn unknown_topics_fall_back_to_the_matcher() {
    let engine = empty_engine();
    let response = engine.respond("qwerty zxcvb", None).unwrap();
    assert_eq!(response.response_type, ResponseType::Help);
    assert!(response.sources.is_none());
}

#[test]
fn feedback_adjusts_confidence_and_preferences() {
    let engine = seeded_engine();
    let outcome = engine
        .learn_from_interaction("ada", "tell me about rust", "Rust is fast.", 1.0)
        .unwrap();
    assert_eq!(outcome.nodes_updated, 1);
    assert!(outcome.preferences_changed);

    let node = engine.node("Rust Programming").unwrap().unwrap();
    assert!((node.confidence - 0.75).abs() < 1e-9);
    let context = engine.context("ada").unwrap().unwrap();
    assert_eq!(context.user_preferences.response_length, ResponseLength::Detailed);

    engine
        .learn_from_interaction("ada", "tell me about rust", "Rust is fast.", 0.0)
        .unwrap();
    let context = engine.context("ada").unwrap().unwrap();
    assert_eq!(context.user_preferences.communication_style, CommunicationStyle::Formal);
    assert_eq!(context.history.len(), 1);
    assert_eq!(context.history[0].satisfaction, Some(0.0));
}

#[test]
fn concurrent_feedback_loses_no_updates() {
    let mut config = ParleyConfig::default();
    config.graph.learning_rate = 0.001;
    let engine = Arc::new(Engine::new(config));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..25 {
                    engine
                        .learn_from_interaction(&format!("user-{i}"), "rust", "..", 1.0)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // 200 updates of 0.001 × 0.5
    let node = engine.node("Rust Programming").unwrap().unwrap();
    assert!((node.confidence - 0.8).abs() < 1e-6, "{}", node.confidence);
    assert_eq!(engine.metrics().feedback_events, 200);
    assert_eq!(engine.metrics().active_contexts, 8);
}

#[test]
fn knowledge_added_at_runtime_is_reachable() {
    let engine = empty_engine();
    engine
        .add_knowledge("Testing", "qa", vec!["Testing is checking behaviour.".into()], vec![])
        .unwrap();

    let nodes = engine.traverse(&["testing".to_string()], None).unwrap();
    assert!(nodes.iter().any(|n| n.concept == "Testing"));
}

#[test]
fn snapshot_restores_into_a_fresh_engine() {
    let engine = seeded_engine();
    engine
        .add_knowledge("Borrow Checker", "programming", vec!["It is strict.".into()], vec![])
        .unwrap();
    engine
        .learn_from_interaction("ada", "tell me about rust", "..", 1.0)
        .unwrap();
    engine.respond("hello", Some("ada")).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.json");
    std::fs::write(&path, serde_json::to_string(&engine.snapshot().unwrap()).unwrap()).unwrap();

    let loaded: EngineSnapshot =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let restored = empty_engine();
    restored.restore(loaded).unwrap();

    let before = engine.metrics();
    let after = restored.metrics();
    assert_eq!(after.knowledge_nodes, before.knowledge_nodes);
    assert_eq!(after.relations, before.relations);
    assert_eq!(after.total_turns, before.total_turns);
    assert_eq!(after.feedback_events, 1);

    let node = restored.node("Rust Programming").unwrap().unwrap();
    assert!((node.confidence - 0.75).abs() < 1e-9);
    assert!(restored.node("Borrow Checker").unwrap().is_some());
    let context = restored.context("ada").unwrap().unwrap();
    assert_eq!(context.user_preferences.response_length, ResponseLength::Detailed);
}

#[test]
fn reset_returns_to_the_seed_graph() {
    let engine = seeded_engine();
    let seeded_nodes = engine.metrics().knowledge_nodes;

    engine
        .add_knowledge("Borrow Checker", "programming", vec!["It is strict.".into()], vec![])
        .unwrap();
    engine.respond("hello", Some("ada")).unwrap();
    engine.reset().unwrap();

    let metrics = engine.metrics();
    assert_eq!(metrics.knowledge_nodes, seeded_nodes);
    assert_eq!(metrics.active_contexts, 0);
    assert_eq!(metrics.queries_answered, 0);
    assert!(engine.node("Borrow Checker").unwrap().is_none());

    let empty = empty_engine();
    empty.add_knowledge("Alpha", "x", vec!["Alpha is first.".into()], vec![]).unwrap();
    empty.reset().unwrap();
    assert_eq!(empty.metrics().knowledge_nodes, 0);
}

#[test]
fn metrics_describe_the_seed_graph() {
    let metrics = seeded_engine().metrics();
    assert_eq!(metrics.knowledge_nodes, 8);
    assert_eq!(metrics.by_category.get("programming"), Some(&3));
    assert_eq!(metrics.by_category.get("ai"), Some(&3));
    assert_eq!(metrics.by_category.get("learning"), Some(&2));
    assert_eq!(metrics.intents, 10);
    assert!((metrics.average_confidence - 0.7).abs() < 1e-9);
    assert!(metrics.relations > 0);
}

#[test]
fn metrics_serialize_in_camel_case() {
    let json = serde_json::to_value(seeded_engine().metrics()).unwrap();
    assert_eq!(json["knowledgeNodes"], 8);
    assert!(json.get("averageConfidence").is_some());
    assert!(json.get("byCategory").is_some());
    assert!(json.get("knowledge_nodes").is_none());
}
