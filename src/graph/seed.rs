//! Built-in bootstrap knowledge.

pub struct SeedItem {
    pub concept: String,
    pub category: String,
    pub facts: Vec<String>,
    pub examples: Vec<String>,
}

fn item(concept: &str, category: &str, facts: &[&str], examples: &[&str]) -> SeedItem {
    SeedItem {
        concept: concept.into(),
        category: category.into(),
        facts: facts.iter().map(|f| f.to_string()).collect(),
        examples: examples.iter().map(|e| e.to_string()).collect(),
    }
}

pub fn seed_knowledge() -> Vec<SeedItem> {
    vec![
        item(
            "Rust Programming",
            "programming",
            &[
                "Rust is a systems language that guarantees memory safety without a garbage collector.",
                "The borrow checker enforces ownership rules at compile time.",
            ],
            &["ripgrep", "the Servo browser engine"],
        ),
        item(
            "Python Programming",
            "programming",
            &[
                "Python is a dynamically typed language known for readable syntax.",
                "Python has a large ecosystem for data science.",
            ],
            &["Django web apps", "Jupyter notebooks"],
        ),
        item(
            "Software Testing",
            "programming",
            &["Software testing verifies that code behaves as intended."],
            &["unit tests", "property-based tests"],
        ),
        item(
            "Machine Learning",
            "ai",
            &[
                "Machine learning builds models that improve with data rather than explicit rules.",
                "Supervised learning fits a model to labeled examples.",
            ],
            &["spam filters", "recommendation systems"],
        ),
        item(
            "Neural Networks",
            "ai",
            &["Neural networks are layered function approximators trained by gradient descent."],
            &["image classifiers"],
        ),
        item(
            "Knowledge Graphs",
            "ai",
            &["A knowledge graph stores entities as nodes and their relationships as edges."],
            &["Wikidata"],
        ),
        item(
            "Spaced Repetition",
            "learning",
            &["Spaced repetition reviews material at growing intervals to strengthen memory."],
            &["Anki flashcards"],
        ),
        item(
            "Active Recall",
            "learning",
            &["Active recall is the practice of retrieving information from memory instead of rereading it."],
            &["self-quizzing"],
        ),
    ]
}
