pub mod candidate;
pub mod config;
pub mod decision;
pub mod error;
pub mod match_state;
pub mod roster;
pub mod snapshot;
pub mod tuning;

pub use candidate::*;
pub use config::Config;
pub use decision::*;
pub use error::*;
pub use match_state::*;
pub use roster::*;
pub use snapshot::OrchestrationSnapshot;
