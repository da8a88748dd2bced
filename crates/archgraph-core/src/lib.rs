pub mod complexity;
pub mod config;
pub mod context;
pub mod cycles;
pub mod engine;
pub mod error;
pub mod facts;
pub mod graph;
pub mod layer;
pub mod preset;
pub mod report;
pub mod resolver;
pub mod rules;
pub mod score;
pub mod types;

pub use config::Config;
pub use context::AnalysisContext;
pub use engine::{analyze, AnalysisEngine, AnalysisOutcome, CancellationToken, Phase};
pub use error::{ConfigError, EngineError, GraphIntegrityError};
pub use facts::{FactSet, FileFacts, FunctionFact, ImportFact};
pub use graph::DependencyGraph;
pub use layer::LayerClassifier;
pub use preset::ArchitecturePattern;
pub use report::{CategoryBreakdown, Report, Summary};
pub use score::{HealthScore, ScoringModel};
pub use types::*;
