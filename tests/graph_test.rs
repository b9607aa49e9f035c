use parley::config::GraphConfig;
use parley::graph::types::{MAX_CONFIDENCE, MIN_CONFIDENCE};
use parley::graph::KnowledgeGraph;
use parley::learning::learn_from_interaction;
use parley::reasoning::ConversationContext;

fn seeded() -> KnowledgeGraph {
    KnowledgeGraph::seeded(&GraphConfig::default())
}

#[test]
fn seed_graph_is_linked_both_ways() {
    let graph = seeded();
    for node in graph.nodes() {
        for relation in &node.relations {
            let other = graph.find_concept(relation).expect("relation names a node");
            assert!(
                other.relations.contains(&node.concept),
                "{} -> {} is one-way",
                node.concept,
                other.concept
            );
        }
    }
}

#[test]
fn traversal_terminates_on_cyclic_seed_graph() {
    let graph = seeded();
    let seeds: Vec<String> = graph.all_concepts().iter().map(|c| c.to_lowercase()).collect();
    for depth in 0..=5 {
        let hits = graph.traverse_hits(&seeds, depth);
        assert!(hits.iter().all(|h| h.depth < depth));
        if depth == 0 {
            assert!(hits.is_empty());
        }
    }
}

#[test]
fn testing_is_reachable_from_its_own_name() {
    let mut graph = KnowledgeGraph::new(&GraphConfig::default());
    graph
        .add_knowledge("Testing", "qa", vec!["Testing is checking behaviour.".into()], vec![])
        .unwrap();
    let found = graph.traverse_knowledge_graph(&["testing".to_string()], 3);
    assert!(found.iter().any(|n| n.concept == "Testing"));
}

#[test]
fn confidence_stays_in_range_under_mixed_feedback() {
    let mut graph = seeded();
    let mut context = ConversationContext::new("prop");
    let queries = ["rust", "machine learning", "python testing", "active recall", "neural"];

    // deterministic pseudo-random feedback, including out-of-range values
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    for step in 0..500 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let feedback = (state % 1400) as f64 / 1000.0 - 0.2;
        let query = queries[step % queries.len()];
        learn_from_interaction(&mut graph, query, "..", feedback, &mut context, 0.3);

        for node in graph.nodes() {
            assert!(
                (MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&node.confidence),
                "{} has confidence {}",
                node.concept,
                node.confidence
            );
        }
    }
}

#[test]
fn merging_keeps_confidence_and_relations() {
    let mut graph = seeded();
    let before = graph.find_concept("Rust Programming").unwrap().clone();

    let mut context = ConversationContext::new("u");
    learn_from_interaction(&mut graph, "rust", "..", 1.0, &mut context, 0.1);
    let result = graph
        .add_knowledge(
            "rust programming",
            "programming",
            vec!["Rust has no garbage collector.".into()],
            vec![],
        )
        .unwrap();

    assert!(result.merged);
    let after = graph.find_concept("Rust Programming").unwrap();
    assert_eq!(after.concept, "Rust Programming");
    assert!((after.confidence - 0.75).abs() < 1e-9);
    assert_eq!(after.relations.len(), before.relations.len());
    assert_eq!(after.facts.len(), before.facts.len() + 1);
}
