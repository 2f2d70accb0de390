//! Request-scoped orchestration: rank, score, route, run the capability
//! domains as a two-level graph, then merge under the mode guard.

pub mod executor;
pub mod merge;
pub mod orchestrator;
pub mod ranker;
pub mod result;
pub mod router;
pub mod triggers;

pub use executor::DomainExecutor;
pub use merge::{merge, Authority, CombinedDecision, FinalRecommendation, IfContinues, NextSafePlayer};
pub use orchestrator::{DomainResults, OrchestrationResponse, Orchestrator};
pub use ranker::rank;
pub use result::{CapabilityResult, DomainError, DomainRun, ResultStatus};
pub use router::{decide, AnalysisMode};
pub use triggers::{compute_triggers, TriggerScores};
