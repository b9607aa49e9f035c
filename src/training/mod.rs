pub mod extract;
pub mod trainer;
pub mod types;

pub use extract::mine_domain_knowledge;
pub use trainer::{AutoTrainer, ProgressHandle};
pub use types::{
    AutoTrainerConfig, DomainKnowledge, TrainingConversation, TrainingProgress, TrainingStatus,
};
